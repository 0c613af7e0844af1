//! Behaviour DSL front-end and implicit-scheme lowering engine for
//! generating constitutive-equation (MFront-style) code.
//!
//! [`process`] ties the three stages together: tokenise, dispatch every
//! `@Keyword`/variable-method statement over a [`dsl::Parser`] into a
//! [`ast::BehaviourDescription`], then hand the finished description to
//! [`codegen`] for emission.

pub mod ast;
pub mod codegen;
pub mod config;
pub mod dsl;
pub mod error;
pub mod hypothesis;
pub mod implicit;
pub mod isotropic;
pub mod lexer;
pub mod mangling;
pub mod token;
pub mod typesize;

pub use ast::{BehaviourData, BehaviourDescription};
pub use codegen::{EmittedFile, Emitter};
pub use config::{GeneratorConfig, ParameterEmission};
pub use dsl::{HandlerRegistry, Parser, Registration};
pub use error::{ErrorKind, MFrontError, Result};
pub use hypothesis::ModellingHypothesis;
pub use isotropic::IsotropicVariant;

/// Parses `source` with `registry`'s keyword handlers, then emits every
/// generated file for the resulting description under `config`.
///
/// This is the single entry point a host build calls through with
/// (source, registry, config); the registry is expected to be built once
/// via [`dsl::handlers::default_registry`] (or a project's extended
/// variant) and reused across files.
pub fn process(
    source: &str,
    registry: &HandlerRegistry,
    config: &GeneratorConfig,
) -> Result<Vec<EmittedFile>> {
    let mut parser = Parser::new(source)?;
    parser.process(registry)?;
    Emitter::new(config).emit(&parser.description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::handlers::default_registry;

    #[test]
    fn minimal_elastic_behaviour_emits_three_headers() {
        let source = r#"
            @Behaviour Elastic;
            @MaterialProperty stress young;
            young.setGlossaryName("YoungModulus");
            @MaterialProperty real nu;
            nu.setGlossaryName("PoissonRatio");
            @Gradient StrainStensor eto;
            @ThermodynamicForce StressStensor sig;
            @ComputeStress {
                this->sig = lambda*trace(eto+deto)*I + 2*mu*(eto+deto);
            }
        "#;
        let registry = default_registry();
        let config = GeneratorConfig::default();
        let files = process(source, &registry, &config).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert!(names.iter().any(|n| n.ends_with("Elastic.hxx")));
        assert!(names.iter().any(|n| n.ends_with("ElasticBehaviourData.hxx")));
        assert!(names.iter().any(|n| n.ends_with("ElasticIntegrationData.hxx")));
    }
}

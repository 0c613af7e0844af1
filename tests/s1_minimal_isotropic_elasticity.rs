//! S1 — Minimal isotropic elasticity (spec.md §8).

use mfront_core::config::GeneratorConfig;
use mfront_core::dsl::handlers::default_registry;
use mfront_core::process;

const SOURCE: &str = r#"
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

#[test]
fn emits_exactly_the_three_mandatory_headers() {
    let registry = default_registry();
    let config = GeneratorConfig::default();
    let files = process(SOURCE, &registry, &config).unwrap();

    let names: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
    assert!(names.iter().any(|n| n.ends_with("Elastic.hxx")));
    assert!(names.iter().any(|n| n.ends_with("ElasticBehaviourData.hxx")));
    assert!(names.iter().any(|n| n.ends_with("ElasticIntegrationData.hxx")));
    // No parameters, no profiling, no slip systems: no optional files.
    assert_eq!(files.len(), 3);
}

#[test]
fn compute_stress_body_is_embedded_verbatim() {
    let registry = default_registry();
    let config = GeneratorConfig::default();
    let files = process(SOURCE, &registry, &config).unwrap();
    let header = files.iter().find(|f| f.relative_path.ends_with("Elastic.hxx")).unwrap();
    assert!(header.contents.contains("this->sig = lambda*trace(eto+deto)*I + 2*mu*(eto+deto);"));
}

#[test]
fn material_properties_carry_their_glossary_names_into_behaviour_data() {
    let registry = default_registry();
    let config = GeneratorConfig::default();
    let files = process(SOURCE, &registry, &config).unwrap();
    let data_header = files.iter().find(|f| f.relative_path.ends_with("ElasticBehaviourData.hxx")).unwrap();
    assert!(data_header.contents.contains("young;"));
    assert!(data_header.contents.contains("nu;"));
}

#[test]
fn behaviour_class_inherits_from_mechanical_behaviour() {
    let registry = default_registry();
    let config = GeneratorConfig::default();
    let files = process(SOURCE, &registry, &config).unwrap();
    let header = files.iter().find(|f| f.relative_path.ends_with("Elastic.hxx")).unwrap();
    assert!(header.contents.contains("public MechanicalBehaviour<ModellingHypothesis::Undefined,Type,use_qt>"));
}

#[test]
fn integrate_entry_point_returns_success() {
    let registry = default_registry();
    let config = GeneratorConfig::default();
    let files = process(SOURCE, &registry, &config).unwrap();
    let header = files.iter().find(|f| f.relative_path.ends_with("Elastic.hxx")).unwrap();
    assert!(header.contents.contains("integrate(){"));
    assert!(header
        .contents
        .contains("return MechanicalBehaviour<ModellingHypothesis::Undefined,Type,use_qt>::SUCCESS;"));
}

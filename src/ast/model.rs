//! Embedded model descriptions (spec.md §3, "list of embedded model
//! descriptions... each a `ModelDescription`"). Out of scope is *parsing*
//! the model DSL itself (spec.md §1); the core only reads and embeds an
//! already-built description, shared between SFE handlers.

use std::rc::Rc;

/// A description obtained from an external model-DSL invocation. Real
/// parsing of `.mfront` model files is outside this crate's scope; callers
/// hand in the parsed description (or this crate's `load` stub reads a
/// name/value outline, matching the parameter-file reader's tokenisation
/// style for the handful of fields a model's outline needs here).
#[derive(Debug, Clone)]
pub struct ModelDescription {
    pub source_file: String,
    pub class_name: String,
    pub outputs: Vec<String>,
    pub inputs: Vec<String>,
}

impl ModelDescription {
    pub fn new(source_file: impl Into<String>) -> Self {
        let source_file = source_file.into();
        let class_name = source_file
            .rsplit('/')
            .next()
            .unwrap_or(&source_file)
            .trim_end_matches(".mfront")
            .to_string();
        Self { source_file, class_name, outputs: Vec::new(), inputs: Vec::new() }
    }
}

/// Shared-ownership handle: several stress-free-expansion handlers may
/// point at the same model (spec.md §9).
pub type ModelDescriptionHandle = Rc<ModelDescription>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_name_derived_from_file_stem() {
        let m = ModelDescription::new("materials/thermal_expansion.mfront");
        assert_eq!(m.class_name, "thermal_expansion");
    }
}

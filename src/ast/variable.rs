//! Variable records and their disjoint categories (spec.md §3, "Variable",
//! "Variable Category").

use crate::typesize::{classify, SupportedTypeCategory, TypeSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableCategory {
    MaterialProperty,
    /// An integration variable that also persists across time steps.
    StateVariable,
    /// An integration variable solved for but not persisted as state.
    PureIntegrationVariable,
    AuxiliaryStateVariable,
    ExternalStateVariable,
    LocalVariable,
    Parameter,
    StaticVariable,
    InitialiseFunctionVariable,
    PostProcessingVariable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Lower(f64),
    Upper(f64),
    LowerAndUpper(f64, f64),
}

#[derive(Debug, Clone, Default)]
pub struct DefaultValue {
    /// Scalar default, or the single repeated value for an array.
    pub scalar: Option<String>,
    /// Per-component defaults for an array declared with `{x, y, z}`.
    pub array: Option<Vec<String>>,
}

/// An external name a variable may be looked up by — at most one of
/// glossary/entry applies (spec.md §3 invariant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalName {
    Glossary(String),
    Entry(String),
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub type_name: String,
    pub name: String,
    pub symbolic_name: Option<String>,
    pub array_size: u32,
    pub line: u32,
    pub description: String,
    pub external_name: Option<ExternalName>,
    pub attributes: std::collections::HashMap<String, String>,
    pub bounds: Option<Bound>,
    pub physical_bounds: Option<Bound>,
    pub default_value: Option<DefaultValue>,
    pub max_increment_per_iteration: Option<f64>,
    pub normalisation_factor: Option<String>,
}

impl Variable {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>, line: u32) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            symbolic_name: None,
            array_size: 1,
            line,
            description: String::new(),
            external_name: None,
            attributes: std::collections::HashMap::new(),
            bounds: None,
            physical_bounds: None,
            default_value: None,
            max_increment_per_iteration: None,
            normalisation_factor: None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.array_size == 1 && matches!(self.category(), Some(SupportedTypeCategory::Scalar))
    }

    pub fn category(&self) -> Option<SupportedTypeCategory> {
        classify(&self.type_name)
    }

    pub fn type_size(&self) -> TypeSize {
        match self.category() {
            Some(c) => TypeSize::of_variable(c, self.array_size),
            None => TypeSize::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_variable_is_scalar_by_default() {
        let v = Variable::new("stress", "young", 1);
        assert!(v.is_scalar());
        assert_eq!(v.array_size, 1);
    }

    #[test]
    fn type_size_scales_with_array_size() {
        let mut v = Variable::new("real", "f", 1);
        v.array_size = 4;
        assert_eq!(v.type_size().scalars, 4);
    }

    #[test]
    fn unknown_type_has_zero_type_size() {
        let v = Variable::new("Frobnicator", "x", 1);
        assert!(v.type_size().is_null());
    }
}

//! Parameter overrides by name (spec.md §3 "Lifecycle": "Overrides by
//! parameter name can happen before parsing begins"; scenario S5).

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ParameterOverrides {
    values: HashMap<String, f64>,
}

impl ParameterOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// `overrideByAParameter` — may be called before any keyword is parsed.
    pub fn override_by_a_parameter(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// `getOverridenParameters`.
    pub fn overridden(&self) -> &HashMap<String, f64> {
        &self.values
    }
}

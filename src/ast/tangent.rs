//! Tangent Operator Block (spec.md §3, §4.5).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TangentRowVariable {
    ThermodynamicForce,
    IntegrationVariable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TangentColumnVariable {
    Gradient,
    ExternalStateVariable,
}

#[derive(Debug, Clone)]
pub struct TangentOperatorBlockEntry {
    pub row: String,
    pub row_kind: TangentRowVariable,
    pub column: String,
    pub column_kind: TangentColumnVariable,
}

/// An ordered list of (row, column) pairs; the default list is derived from
/// main variables (spec.md §3, "Tangent Operator Block").
#[derive(Debug, Clone, Default)]
pub struct TangentOperatorBlocks {
    pub entries: Vec<TangentOperatorBlockEntry>,
}

impl TangentOperatorBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default block list: one entry per main variable pair, force
    /// with respect to gradient.
    pub fn from_main_variables(pairs: &[crate::ast::mainvariable::MainVariable]) -> Self {
        let entries = pairs
            .iter()
            .map(|p| TangentOperatorBlockEntry {
                row: p.force.variable_name.clone(),
                row_kind: TangentRowVariable::ThermodynamicForce,
                column: p.gradient.variable_name.clone(),
                column_kind: TangentColumnVariable::Gradient,
                })
            .collect();
        TangentOperatorBlocks { entries }
    }

    pub fn push_additional(&mut self, entry: TangentOperatorBlockEntry) {
        self.entries.push(entry);
    }
}

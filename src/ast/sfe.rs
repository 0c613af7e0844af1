//! Stress-free expansion descriptors (spec.md glossary, §4.3
//! `@Swelling`/`@AxialGrowth`/`@Relocation`/`@ComputeStressFreeExpansion`).

use crate::ast::model::ModelDescriptionHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StressFreeExpansionKind {
    Thermal,
    Swelling,
    AxialGrowth,
    Relocation,
}

/// A gradient contribution subtracted from the total gradient before
/// constitutive evaluation. `model` is a shared handle: the same
/// `ModelDescription` may be referenced from several SFE handlers
/// (spec.md §9, "Cyclic references").
#[derive(Debug, Clone)]
pub struct StressFreeExpansionDescriptor {
    pub kind: StressFreeExpansionKind,
    pub model: Option<ModelDescriptionHandle>,
    pub line: u32,
}

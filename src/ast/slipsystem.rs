//! Crystal plasticity: crystal structure and slip systems
//! (spec.md §4.6, `<ClassName>SlipSystems.hxx`, glossary "Slip system").

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrystalStructure {
    Cubic,
    FCC,
    BCC,
    HCP,
}

/// A (plane, direction) Miller-index pair; a family is a set of
/// symmetry-equivalent pairs sharing one [`SlipSystemFamily`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MillerIndices {
    pub h: i32,
    pub k: i32,
    pub l: i32,
}

#[derive(Debug, Clone)]
pub struct SlipSystemFamily {
    pub plane: MillerIndices,
    pub direction: MillerIndices,
}

#[derive(Debug, Clone, Default)]
pub struct SlipSystemsDescription {
    pub crystal_structure: Option<CrystalStructure>,
    pub families: Vec<SlipSystemFamily>,
    /// Row-major interaction matrix coefficients, one per pair of distinct
    /// families (spec.md §4.6, `buildInteractionMatrix`).
    pub interaction_matrix: Vec<f64>,
}

impl SlipSystemsDescription {
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// True when `plane` coincides with another family's plane, the
    /// coplanarity predicate the emitted header exposes.
    pub fn are_coplanar(a: &SlipSystemFamily, b: &SlipSystemFamily) -> bool {
        a.plane == b.plane
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_description_has_no_families() {
        assert!(SlipSystemsDescription::default().is_empty());
    }

    #[test]
    fn coplanarity_compares_planes_not_directions() {
        let a = SlipSystemFamily { plane: MillerIndices { h: 1, k: 1, l: 1 }, direction: MillerIndices { h: 1, k: 0, l: -1 } };
        let b = SlipSystemFamily { plane: MillerIndices { h: 1, k: 1, l: 1 }, direction: MillerIndices { h: 0, k: 1, l: -1 } };
        assert!(SlipSystemsDescription::are_coplanar(&a, &b));
    }

    #[test]
    fn different_planes_are_not_coplanar() {
        let a = SlipSystemFamily { plane: MillerIndices { h: 1, k: 1, l: 1 }, direction: MillerIndices { h: 1, k: 0, l: -1 } };
        let b = SlipSystemFamily { plane: MillerIndices { h: 1, k: 0, l: 0 }, direction: MillerIndices { h: 0, k: 1, l: 0 } };
        assert!(!SlipSystemsDescription::are_coplanar(&a, &b));
    }
}

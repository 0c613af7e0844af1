//! Modelling Hypothesis (spec.md §3): a closed finite enumeration of
//! geometric reductions plus the `UNDEFINED` umbrella sentinel.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModellingHypothesis {
    Tridimensional,
    PlaneStrain,
    PlaneStress,
    GeneralisedPlaneStrain,
    Axisymmetrical,
    AxisymmetricalGeneralisedPlaneStrain,
    AxisymmetricalGeneralisedPlaneStress,
    /// The umbrella sentinel: shared declarations broadcast from here to
    /// every specialised hypothesis (spec.md §3, "Lifecycle").
    Undefined,
}

impl ModellingHypothesis {
    /// All hypotheses a behaviour can specialise on, excluding `UNDEFINED`.
    pub const ALL_CONCRETE: [ModellingHypothesis; 7] = [
        ModellingHypothesis::Tridimensional,
        ModellingHypothesis::PlaneStrain,
        ModellingHypothesis::PlaneStress,
        ModellingHypothesis::GeneralisedPlaneStrain,
        ModellingHypothesis::Axisymmetrical,
        ModellingHypothesis::AxisymmetricalGeneralisedPlaneStrain,
        ModellingHypothesis::AxisymmetricalGeneralisedPlaneStress,
    ];

    pub fn is_plane_stress(self) -> bool {
        matches!(
            self,
            ModellingHypothesis::PlaneStress | ModellingHypothesis::AxisymmetricalGeneralisedPlaneStress
        )
    }

    pub fn from_keyword(s: &str) -> Option<ModellingHypothesis> {
        Some(match s {
            "Tridimensional" => ModellingHypothesis::Tridimensional,
            "PlaneStrain" => ModellingHypothesis::PlaneStrain,
            "PlaneStress" => ModellingHypothesis::PlaneStress,
            "GeneralisedPlaneStrain" => ModellingHypothesis::GeneralisedPlaneStrain,
            "Axisymmetrical" => ModellingHypothesis::Axisymmetrical,
            "AxisymmetricalGeneralisedPlaneStrain" => {
                ModellingHypothesis::AxisymmetricalGeneralisedPlaneStrain
            }
            "AxisymmetricalGeneralisedPlaneStress" => {
                ModellingHypothesis::AxisymmetricalGeneralisedPlaneStress
            }
            "UNDEFINED" => ModellingHypothesis::Undefined,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModellingHypothesis::Tridimensional => "Tridimensional",
            ModellingHypothesis::PlaneStrain => "PlaneStrain",
            ModellingHypothesis::PlaneStress => "PlaneStress",
            ModellingHypothesis::GeneralisedPlaneStrain => "GeneralisedPlaneStrain",
            ModellingHypothesis::Axisymmetrical => "Axisymmetrical",
            ModellingHypothesis::AxisymmetricalGeneralisedPlaneStrain => {
                "AxisymmetricalGeneralisedPlaneStrain"
            }
            ModellingHypothesis::AxisymmetricalGeneralisedPlaneStress => {
                "AxisymmetricalGeneralisedPlaneStress"
            }
            ModellingHypothesis::Undefined => "UNDEFINED",
        }
    }
}

impl std::fmt::Display for ModellingHypothesis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expands the `.+` regex token (spec.md §4.3, `@ModellingHypotheses`) to
/// every supported hypothesis, optionally minus a DSL-specific rejection
/// list (e.g. a DSL that cannot express generalised plane strain).
pub fn expand_all(rejected: &[ModellingHypothesis]) -> Vec<ModellingHypothesis> {
    ModellingHypothesis::ALL_CONCRETE
        .iter()
        .copied()
        .filter(|h| !rejected.contains(h))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_round_trips() {
        for h in ModellingHypothesis::ALL_CONCRETE {
            assert_eq!(ModellingHypothesis::from_keyword(h.as_str()), Some(h));
        }
    }

    #[test]
    fn undefined_round_trips() {
        assert_eq!(ModellingHypothesis::from_keyword("UNDEFINED"), Some(ModellingHypothesis::Undefined));
    }

    #[test]
    fn unknown_keyword_is_none() {
        assert_eq!(ModellingHypothesis::from_keyword("Nonsense"), None);
    }

    #[test]
    fn plane_stress_variants_detected() {
        assert!(ModellingHypothesis::PlaneStress.is_plane_stress());
        assert!(ModellingHypothesis::AxisymmetricalGeneralisedPlaneStress.is_plane_stress());
        assert!(!ModellingHypothesis::Tridimensional.is_plane_stress());
    }

    #[test]
    fn expand_all_excludes_rejected() {
        let expanded = expand_all(&[ModellingHypothesis::PlaneStress]);
        assert_eq!(expanded.len(), 6);
        assert!(!expanded.contains(&ModellingHypothesis::PlaneStress));
    }

    #[test]
    fn expand_all_with_no_rejection_covers_every_concrete_hypothesis() {
        let expanded = expand_all(&[]);
        assert_eq!(expanded.len(), ModellingHypothesis::ALL_CONCRETE.len());
    }
}

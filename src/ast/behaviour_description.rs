//! Behaviour Description (spec.md §3, "Behaviour Description"): the
//! top-level in-memory IR, broadcasting shared state across modelling
//! hypotheses and holding each hypothesis's specialised [`BehaviourData`].

use std::collections::{HashMap, HashSet};

use crate::ast::behaviour_data::BehaviourData;
use crate::ast::parameter::ParameterOverrides;
use crate::ast::slipsystem::SlipSystemsDescription;
use crate::error::{ErrorKind, MFrontError, Result};
use crate::hypothesis::ModellingHypothesis;
use crate::token::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymmetryType {
    Isotropic,
    Orthotropic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrthotropicAxesConvention {
    Default,
    Pipe,
    Plate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrainMeasure {
    Linearised,
    GreenLagrange,
    Hencky,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationScheme {
    Implicit,
    Explicit,
    SpecificTheta,
}

/// A hypothesis-keyed value: either one value shared by every concrete
/// hypothesis (`Undefined`), or a per-hypothesis specialisation that
/// overlays on top of it (spec.md §4.3, "Broadcasting").
#[derive(Debug, Clone, Default)]
struct Broadcast<T> {
    default: Option<T>,
    specialised: HashMap<ModellingHypothesis, T>,
}

impl<T: Clone> Broadcast<T> {
    fn set(&mut self, hypothesis: ModellingHypothesis, value: T) {
        if hypothesis == ModellingHypothesis::Undefined {
            self.default = Some(value);
        } else {
            self.specialised.insert(hypothesis, value);
        }
    }

    fn get(&self, hypothesis: ModellingHypothesis) -> Option<&T> {
        self.specialised.get(&hypothesis).or(self.default.as_ref())
    }
}

#[derive(Debug, Clone)]
pub struct BehaviourDescription {
    pub class_name: String,
    pub material_name: Option<String>,
    pub library: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub description: String,

    pub symmetry_type: SymmetryType,
    /// Overrides the behaviour's own symmetry type for elastic-only
    /// purposes, e.g. an orthotropic behaviour using isotropic elasticity.
    pub elastic_symmetry_type: Option<SymmetryType>,
    pub orthotropic_axes_convention: OrthotropicAxesConvention,
    pub strain_measure: StrainMeasure,
    pub integration_scheme: IntegrationScheme,

    pub computes_stiffness_tensor: bool,
    pub requires_stiffness_tensor: bool,
    pub computes_thermal_expansion: bool,
    pub requires_thermal_expansion_coefficient_tensor: bool,

    pub crystal_structure: Option<crate::ast::slipsystem::CrystalStructure>,
    pub slip_systems: SlipSystemsDescription,

    pub elastic_material_properties: Vec<String>,
    pub thermal_expansion_coefficients: Vec<String>,
    pub embedded_models: Vec<crate::ast::model::ModelDescriptionHandle>,
    pub parameter_overrides: ParameterOverrides,
    /// `@MaterialLaw "name.mfront";` entries, named in declaration order;
    /// the emitter wraps every code block's body in a `writeMaterialLaws`
    /// call naming these (spec.md §4.6).
    pub material_laws: Vec<String>,

    /// Numerical parameters of the implicit Newton-like loop (spec.md
    /// §4.5, "Numerical parameters"), copied in from the parser at
    /// `finish()` time so the emitter can read validated values without
    /// depending on `dsl::Parser` directly.
    pub numerical: crate::implicit::NumericalParameters,
    /// The solver named by `@Algorithm`, or `None` for the default
    /// Newton-Raphson behaviour (spec.md §4.5, "Jacobian strategy per
    /// solver").
    pub solver: Option<crate::implicit::Solver>,
    /// `@NumericallyComputedJacobianBlocks` entries: `(a, b)` pairs whose
    /// `df<a>_dd<b>` block falls back to central-difference rather than an
    /// author-supplied analytic expression (spec.md §4.5, "Mixed mode").
    pub numerically_computed_jacobian_blocks: Vec<(String, String)>,

    modelling_hypotheses: HashSet<ModellingHypothesis>,
    behaviour_data: Broadcast<BehaviourData>,

    /// Set once `@UpdateAuxiliaryStateVariables`/the last lifecycle hook
    /// completes; blocks further `@StateVariable`-style declarations
    /// (spec.md §3, "Lifecycle").
    new_user_defined_variables_disabled: bool,
}

impl BehaviourDescription {
    pub fn new(class_name: impl Into<String>) -> Self {
        let mut behaviour_data = Broadcast::default();
        behaviour_data.set(ModellingHypothesis::Undefined, BehaviourData::new());
        Self {
            class_name: class_name.into(),
            material_name: None,
            library: None,
            author: None,
            date: None,
            description: String::new(),
            symmetry_type: SymmetryType::Isotropic,
            elastic_symmetry_type: None,
            orthotropic_axes_convention: OrthotropicAxesConvention::Default,
            strain_measure: StrainMeasure::Linearised,
            integration_scheme: IntegrationScheme::Implicit,
            computes_stiffness_tensor: false,
            requires_stiffness_tensor: false,
            computes_thermal_expansion: false,
            requires_thermal_expansion_coefficient_tensor: false,
            crystal_structure: None,
            slip_systems: SlipSystemsDescription::default(),
            elastic_material_properties: Vec::new(),
            thermal_expansion_coefficients: Vec::new(),
            embedded_models: Vec::new(),
            parameter_overrides: ParameterOverrides::new(),
            material_laws: Vec::new(),
            numerical: crate::implicit::NumericalParameters::default(),
            solver: None,
            numerically_computed_jacobian_blocks: Vec::new(),
            modelling_hypotheses: HashSet::new(),
            behaviour_data,
            new_user_defined_variables_disabled: false,
        }
    }

    /// Declares that `hypothesis` is in use, allocating its own
    /// specialised [`BehaviourData`] overlay the first time it is seen
    /// (spec.md §4.3, "Broadcasting / specialisation").
    pub fn use_modelling_hypothesis(&mut self, hypothesis: ModellingHypothesis) -> Result<()> {
        if hypothesis == ModellingHypothesis::Undefined {
            return Ok(());
        }
        self.modelling_hypotheses.insert(hypothesis);
        if self.behaviour_data.specialised.contains_key(&hypothesis) {
            return Ok(());
        }
        let seed = self
            .behaviour_data
            .default
            .clone()
            .expect("the Undefined overlay is always present");
        self.behaviour_data.specialised.insert(hypothesis, seed);
        Ok(())
    }

    pub fn hypotheses_in_use(&self) -> impl Iterator<Item = &ModellingHypothesis> {
        self.modelling_hypotheses.iter()
    }

    /// Reads through to the `Undefined` overlay when no specialisation
    /// exists for `hypothesis` yet (spec.md §4.3).
    pub fn behaviour_data(&self, hypothesis: ModellingHypothesis) -> &BehaviourData {
        self.behaviour_data
            .get(hypothesis)
            .expect("the Undefined overlay is always present")
    }

    /// Mutates only the overlay for `hypothesis`; writing through
    /// `Undefined` never retroactively touches an already-diverged
    /// specialisation (spec.md §4.3, testable property: writes to
    /// `UNDEFINED` do not leak into hypotheses that have specialised).
    pub fn behaviour_data_mut(&mut self, hypothesis: ModellingHypothesis) -> &mut BehaviourData {
        if hypothesis == ModellingHypothesis::Undefined {
            return self.behaviour_data.default.as_mut().expect("Undefined overlay present");
        }
        self.behaviour_data
            .specialised
            .entry(hypothesis)
            .or_insert_with(|| {
                self.behaviour_data.default.clone().expect("Undefined overlay present")
            })
    }

    pub fn disable_new_user_defined_variables(&mut self) {
        self.new_user_defined_variables_disabled = true;
    }

    pub fn are_new_user_defined_variables_disabled(&self) -> bool {
        self.new_user_defined_variables_disabled
    }

    /// `@ComputesStiffnessTensor` and `@RequireStiffnessTensor` are
    /// mutually exclusive (spec.md §3 invariant).
    pub fn set_computes_stiffness_tensor(&mut self, line: u32) -> Result<()> {
        if self.requires_stiffness_tensor {
            return Err(inconsistent(
                "@ComputeStiffnessTensor conflicts with @RequireStiffnessTensor",
                line,
            ));
        }
        self.computes_stiffness_tensor = true;
        Ok(())
    }

    pub fn set_requires_stiffness_tensor(&mut self, line: u32) -> Result<()> {
        if self.computes_stiffness_tensor {
            return Err(inconsistent(
                "@RequireStiffnessTensor conflicts with @ComputeStiffnessTensor",
                line,
            ));
        }
        self.requires_stiffness_tensor = true;
        Ok(())
    }

    pub fn set_computes_thermal_expansion(&mut self, line: u32) -> Result<()> {
        if self.requires_thermal_expansion_coefficient_tensor {
            return Err(inconsistent(
                "@ComputeThermalExpansion conflicts with @RequireThermalExpansionCoefficientTensor",
                line,
            ));
        }
        self.computes_thermal_expansion = true;
        Ok(())
    }

    pub fn set_requires_thermal_expansion_coefficient_tensor(&mut self, line: u32) -> Result<()> {
        if self.computes_thermal_expansion {
            return Err(inconsistent(
                "@RequireThermalExpansionCoefficientTensor conflicts with @ComputeThermalExpansion",
                line,
            ));
        }
        self.requires_thermal_expansion_coefficient_tensor = true;
        Ok(())
    }

    /// An orthotropic axes convention other than `Default` is only
    /// meaningful once a genuine 3D frame exists; restrict it to
    /// `Tridimensional` (spec.md §3 invariant).
    pub fn set_orthotropic_axes_convention(
        &mut self,
        convention: OrthotropicAxesConvention,
        hypotheses_in_use: &[ModellingHypothesis],
        line: u32,
    ) -> Result<()> {
        if convention != OrthotropicAxesConvention::Default {
            let only_tridimensional = hypotheses_in_use
                .iter()
                .all(|h| *h == ModellingHypothesis::Tridimensional || *h == ModellingHypothesis::Undefined);
            if !only_tridimensional {
                return Err(inconsistent(
                    "a non-default orthotropic axes convention requires the Tridimensional hypothesis",
                    line,
                ));
            }
        }
        self.orthotropic_axes_convention = convention;
        Ok(())
    }
}

fn inconsistent(msg: &str, line: u32) -> MFrontError {
    MFrontError::new(
        ErrorKind::InconsistentDeclaration(msg.to_string()),
        Span::new(0, 0, line),
        "behaviour-description",
    )
}

//! The closed keyword surface (spec.md §4.2, "Keyword surface").
//!
//! The original keeps a dynamic string-keyed handler map; here the set of
//! built-in keywords is a closed enum and anything outside it is either an
//! unknown keyword (rejected) or routed to a brick/interface extension
//! point (spec.md §9, "Dynamic handler dispatch").

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Dsl,
    Behaviour,
    Material,
    Library,
    Author,
    Date,
    Description,
    ModellingHypothesis,
    ModellingHypotheses,
    StrainMeasure,
    UseQt,
    OrthotropicBehaviour,
    ComputeStiffnessTensor,
    RequireStiffnessTensor,
    ElasticMaterialProperties,
    HillTensor,
    ComputeThermalExpansion,
    RequireThermalExpansionCoefficientTensor,
    Gradient,
    Flux,
    ThermodynamicForce,
    MaterialProperty,
    IsotropicBehaviour,
    IsotropicElasticBehaviour,
    UsableInPurelyImplicitResolution,
    FlowRule,
    ComputeStressFreeExpansion,
    TangentOperatorBlocks,
    AdditionalTangentOperatorBlock,
    AdditionalTangentOperatorBlocks,
    StateVariable,
    AuxiliaryStateVariable,
    ExternalStateVariable,
    IntegrationVariable,
    LocalVariable,
    Parameter,
    StaticVariable,
    IntegerConstant,
    MaterialLaw,
    Includes,
    Sources,
    Members,
    Private,
    Interface,
    Brick,
    Model,
    Algorithm,
    Theta,
    Epsilon,
    IterMax,
    PerturbationValueForNumericalJacobianComputation,
    CompareToNumericalJacobian,
    JacobianComparisonCriterion,
    MaximumIncrementValuePerIteration,
    NumericallyComputedJacobianBlocks,
    Predictor,
    Integrator,
    ComputeStress,
    ComputeFinalStress,
    TangentOperator,
    PredictionOperator,
    IsTangentOperatorSymmetric,
    APrioriTimeStepScalingFactor,
    APosterioriTimeStepScalingFactor,
    AdditionalConvergenceChecks,
    ProcessNewCorrection,
    RejectCurrentCorrection,
    ProcessNewEstimate,
    InitLocalVariables,
    UpdateAuxiliaryStateVariables,
    InternalEnergy,
    DissipatedEnergy,
    SpeedOfSound,
    Swelling,
    AxialGrowth,
    Relocation,
    CrystalStructure,
    SlipSystem,
    SlipSystems,
    InteractionMatrix,
    Initialize,
    PostProcessing,
    Bounds,
    PhysicalBounds,
}

impl Keyword {
    pub fn from_name(name: &str) -> Option<Keyword> {
        Some(match name {
            "DSL" => Keyword::Dsl,
            "Behaviour" => Keyword::Behaviour,
            "Material" => Keyword::Material,
            "Library" => Keyword::Library,
            "Author" => Keyword::Author,
            "Date" => Keyword::Date,
            "Description" => Keyword::Description,
            "ModellingHypothesis" => Keyword::ModellingHypothesis,
            "ModellingHypotheses" => Keyword::ModellingHypotheses,
            "StrainMeasure" => Keyword::StrainMeasure,
            "UseQt" => Keyword::UseQt,
            "OrthotropicBehaviour" => Keyword::OrthotropicBehaviour,
            "ComputeStiffnessTensor" => Keyword::ComputeStiffnessTensor,
            "RequireStiffnessTensor" => Keyword::RequireStiffnessTensor,
            "ElasticMaterialProperties" => Keyword::ElasticMaterialProperties,
            "HillTensor" => Keyword::HillTensor,
            "ComputeThermalExpansion" => Keyword::ComputeThermalExpansion,
            "RequireThermalExpansionCoefficientTensor" => {
                Keyword::RequireThermalExpansionCoefficientTensor
            }
            "Gradient" => Keyword::Gradient,
            "Flux" => Keyword::Flux,
            "ThermodynamicForce" => Keyword::ThermodynamicForce,
            "MaterialProperty" => Keyword::MaterialProperty,
            "IsotropicBehaviour" => Keyword::IsotropicBehaviour,
            "IsotropicElasticBehaviour" => Keyword::IsotropicElasticBehaviour,
            "UsableInPurelyImplicitResolution" => Keyword::UsableInPurelyImplicitResolution,
            "FlowRule" => Keyword::FlowRule,
            "ComputeStressFreeExpansion" => Keyword::ComputeStressFreeExpansion,
            "TangentOperatorBlocks" => Keyword::TangentOperatorBlocks,
            "AdditionalTangentOperatorBlock" => Keyword::AdditionalTangentOperatorBlock,
            "AdditionalTangentOperatorBlocks" => Keyword::AdditionalTangentOperatorBlocks,
            "StateVariable" => Keyword::StateVariable,
            "AuxiliaryStateVariable" => Keyword::AuxiliaryStateVariable,
            "ExternalStateVariable" => Keyword::ExternalStateVariable,
            "IntegrationVariable" => Keyword::IntegrationVariable,
            "LocalVariable" => Keyword::LocalVariable,
            "Parameter" => Keyword::Parameter,
            "StaticVariable" => Keyword::StaticVariable,
            "IntegerConstant" => Keyword::IntegerConstant,
            "MaterialLaw" => Keyword::MaterialLaw,
            "Includes" => Keyword::Includes,
            "Sources" => Keyword::Sources,
            "Members" => Keyword::Members,
            "Private" => Keyword::Private,
            "Interface" => Keyword::Interface,
            "Brick" => Keyword::Brick,
            "Model" => Keyword::Model,
            "Algorithm" => Keyword::Algorithm,
            "Theta" => Keyword::Theta,
            "Epsilon" => Keyword::Epsilon,
            "IterMax" => Keyword::IterMax,
            "PerturbationValueForNumericalJacobianComputation" => {
                Keyword::PerturbationValueForNumericalJacobianComputation
            }
            "CompareToNumericalJacobian" => Keyword::CompareToNumericalJacobian,
            "JacobianComparisonCriterion" => Keyword::JacobianComparisonCriterion,
            "MaximumIncrementValuePerIteration" => Keyword::MaximumIncrementValuePerIteration,
            "NumericallyComputedJacobianBlocks" => Keyword::NumericallyComputedJacobianBlocks,
            "Predictor" => Keyword::Predictor,
            "Integrator" => Keyword::Integrator,
            "ComputeStress" => Keyword::ComputeStress,
            "ComputeFinalStress" => Keyword::ComputeFinalStress,
            "TangentOperator" => Keyword::TangentOperator,
            "PredictionOperator" => Keyword::PredictionOperator,
            "IsTangentOperatorSymmetric" => Keyword::IsTangentOperatorSymmetric,
            "APrioriTimeStepScalingFactor" => Keyword::APrioriTimeStepScalingFactor,
            "APosterioriTimeStepScalingFactor" => Keyword::APosterioriTimeStepScalingFactor,
            "AdditionalConvergenceChecks" => Keyword::AdditionalConvergenceChecks,
            "ProcessNewCorrection" => Keyword::ProcessNewCorrection,
            "RejectCurrentCorrection" => Keyword::RejectCurrentCorrection,
            "ProcessNewEstimate" => Keyword::ProcessNewEstimate,
            "InitLocalVariables" => Keyword::InitLocalVariables,
            "UpdateAuxiliaryStateVariables" => Keyword::UpdateAuxiliaryStateVariables,
            "InternalEnergy" => Keyword::InternalEnergy,
            "DissipatedEnergy" => Keyword::DissipatedEnergy,
            "SpeedOfSound" => Keyword::SpeedOfSound,
            "Swelling" => Keyword::Swelling,
            "AxialGrowth" => Keyword::AxialGrowth,
            "Relocation" => Keyword::Relocation,
            "CrystalStructure" => Keyword::CrystalStructure,
            "SlipSystem" => Keyword::SlipSystem,
            "SlipSystems" => Keyword::SlipSystems,
            "InteractionMatrix" => Keyword::InteractionMatrix,
            "Initialize" => Keyword::Initialize,
            "PostProcessing" => Keyword::PostProcessing,
            "Bounds" => Keyword::Bounds,
            "PhysicalBounds" => Keyword::PhysicalBounds,
            _ => return None,
        })
    }

    /// Declares a new integration or state variable, the condition that
    /// triggers `disableNewUserDefinedVariables` on the *next* code block
    /// (spec.md §3, "Lifecycle").
    pub fn declares_variable(self) -> bool {
        matches!(
            self,
            Keyword::StateVariable
                | Keyword::AuxiliaryStateVariable
                | Keyword::ExternalStateVariable
                | Keyword::IntegrationVariable
                | Keyword::LocalVariable
                | Keyword::Parameter
                | Keyword::StaticVariable
                | Keyword::IntegerConstant
                | Keyword::MaterialProperty
        )
    }

    pub fn is_code_block(self) -> bool {
        matches!(
            self,
            Keyword::Predictor
                | Keyword::Integrator
                | Keyword::ComputeStress
                | Keyword::ComputeFinalStress
                | Keyword::TangentOperator
                | Keyword::PredictionOperator
                | Keyword::InitLocalVariables
                | Keyword::UpdateAuxiliaryStateVariables
                | Keyword::InternalEnergy
                | Keyword::DissipatedEnergy
                | Keyword::SpeedOfSound
                | Keyword::APrioriTimeStepScalingFactor
                | Keyword::APosterioriTimeStepScalingFactor
                | Keyword::AdditionalConvergenceChecks
                | Keyword::ProcessNewCorrection
                | Keyword::RejectCurrentCorrection
                | Keyword::ProcessNewEstimate
                | Keyword::Initialize
                | Keyword::PostProcessing
                | Keyword::ComputeStressFreeExpansion
        )
    }
}

//! Behaviour Description IR (spec.md §3, §4.4): the typed, in-memory model
//! every DSL keyword handler populates and every implicit-scheme lowering
//! and code emitter reads back.

pub mod behaviour_data;
pub mod behaviour_description;
pub mod codeblock;
pub mod mainvariable;
pub mod model;
pub mod parameter;
pub mod sfe;
pub mod slipsystem;
pub mod tangent;
pub mod variable;

pub use behaviour_data::{BehaviourData, BehaviourDataFlags};
pub use behaviour_description::{
    BehaviourDescription, IntegrationScheme, OrthotropicAxesConvention, StrainMeasure, SymmetryType,
};
pub use codeblock::{CodeBlock, CodeBlockKind, CodeBlocks, InsertPolicy, Position};
pub use mainvariable::{Gradient, MainVariable, MainVariableBuilder, ThermodynamicForce};
pub use model::{ModelDescription, ModelDescriptionHandle};
pub use parameter::ParameterOverrides;
pub use sfe::{StressFreeExpansionDescriptor, StressFreeExpansionKind};
pub use slipsystem::{CrystalStructure, MillerIndices, SlipSystemFamily, SlipSystemsDescription};
pub use tangent::{TangentColumnVariable, TangentOperatorBlockEntry, TangentOperatorBlocks, TangentRowVariable};
pub use variable::{Bound, DefaultValue, ExternalName, Variable, VariableCategory};

//! Implicit-Scheme Lowering (spec.md §4.5): turns an author-level implicit
//! system `f(Δy)=0` over the integration variables into the generated
//! solver glue — unknown-vector layout, Jacobian strategy, numerical
//! parameters, and tangent-operator synthesis.

pub mod layout;
pub mod numerical;
pub mod solver;
pub mod tangent_synthesis;

pub use layout::{JacobianBlockView, UnknownVectorLayout, ViewKind};
pub use numerical::{MaximumIncrementCap, NumericalParameters};
pub use solver::Solver;
pub use tangent_synthesis::{TangentOperatorSynthesis, TangentSynthesisInput};

//! Solver selection (spec.md §4.5, "Jacobian strategy per solver"): a
//! closed enumeration, each variant declaring the properties the implicit
//! scheme lowering needs to decide how much Jacobian machinery to emit.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Solver {
    NewtonRaphson,
    NewtonRaphsonNumericalJacobian,
    Broyden,
    Broyden2,
    PowellDogLeg,
    PowellDogLegNewtonRaphson,
    LevenbergMarquardt,
    LevenbergMarquardtNewtonRaphson,
    UserDefined,
}

impl Solver {
    pub fn from_keyword(name: &str) -> Option<Solver> {
        Some(match name {
            "NewtonRaphson" => Solver::NewtonRaphson,
            "NewtonRaphson_NumericalJacobian" => Solver::NewtonRaphsonNumericalJacobian,
            "Broyden" => Solver::Broyden,
            "Broyden2" => Solver::Broyden2,
            "PowellDogLeg" => Solver::PowellDogLeg,
            "PowellDogLeg_NewtonRaphson" => Solver::PowellDogLegNewtonRaphson,
            "LevenbergMarquardt" => Solver::LevenbergMarquardt,
            "LevenbergMarquardt_NewtonRaphson" => Solver::LevenbergMarquardtNewtonRaphson,
            "UserDefined" => Solver::UserDefined,
            _ => return None,
        })
    }

    /// The generated Newton loop consults this Jacobian at all (as opposed
    /// to a derivative-free update), spec.md §4.5.
    pub fn uses_jacobian(self) -> bool {
        !matches!(self, Solver::Broyden | Solver::Broyden2)
    }

    /// Requires the full numerical (central-difference) Jacobian rather
    /// than any analytic block.
    pub fn requires_numerical_jacobian(self) -> bool {
        matches!(self, Solver::NewtonRaphsonNumericalJacobian)
    }

    /// May the author provide `@Predictor`-time seed values for the
    /// Jacobian (as opposed to always starting from identity)?
    pub fn allows_jacobian_init(self) -> bool {
        matches!(
            self,
            Solver::NewtonRaphson | Solver::NewtonRaphsonNumericalJacobian | Solver::UserDefined
        )
    }

    /// May the author seed the *inverse* Jacobian (quasi-Newton variants)?
    pub fn allows_jacobian_invert_init(self) -> bool {
        matches!(self, Solver::Broyden | Solver::Broyden2)
    }

    /// The solver rebuilds the Jacobian to identity every iteration rather
    /// than reusing/updating the previous one.
    pub fn requires_jacobian_reinit_to_identity_per_iteration(self) -> bool {
        matches!(self, Solver::NewtonRaphson | Solver::NewtonRaphsonNumericalJacobian | Solver::UserDefined)
    }

    /// The helper class an implicit behaviour inherits from for this solver
    /// (spec.md §4.6, "inheriting the solver's helper class when implicit").
    pub fn helper_class_name(self) -> &'static str {
        match self {
            Solver::NewtonRaphson => "TinyNewtonRaphsonSolver",
            Solver::NewtonRaphsonNumericalJacobian => "TinyNewtonRaphsonSolver",
            Solver::Broyden => "TinyBroydenSolver",
            Solver::Broyden2 => "TinyBroyden2Solver",
            Solver::PowellDogLeg => "TinyPowellDogLegSolver",
            Solver::PowellDogLegNewtonRaphson => "TinyPowellDogLegNewtonRaphsonSolver",
            Solver::LevenbergMarquardt => "TinyLevenbergMarquardtSolver",
            Solver::LevenbergMarquardtNewtonRaphson => "TinyLevenbergMarquardtNewtonRaphsonSolver",
            Solver::UserDefined => "TinyUserDefinedSolver",
        }
    }
}

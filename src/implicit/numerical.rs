//! Numerical parameters of the Newton-like loop (spec.md §4.5, "Numerical
//! parameters") and the maximum-increment-per-iteration cap (SPEC_FULL.md
//! §3, REDESIGN FLAGS decision: absence of a declared bound means *no cap*,
//! but the choice is recorded explicitly rather than left implicit).

use crate::error::{ErrorKind, MFrontError, Result};
use crate::token::Span;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaximumIncrementCap {
    Unbounded,
    Bounded(f64),
}

impl Default for MaximumIncrementCap {
    fn default() -> Self {
        MaximumIncrementCap::Unbounded
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericalParameters {
    pub epsilon: f64,
    pub theta: f64,
    pub numerical_jacobian_epsilon: f64,
    pub iter_max: u32,
    pub minimal_time_step_scaling_factor: f64,
    pub maximal_time_step_scaling_factor: f64,
    pub jacobian_comparison_criterion: f64,
    pub compare_to_numerical_jacobian: bool,
}

impl Default for NumericalParameters {
    fn default() -> Self {
        let epsilon = 1e-8;
        Self {
            epsilon,
            theta: 0.5,
            numerical_jacobian_epsilon: epsilon / 10.0,
            iter_max: 100,
            minimal_time_step_scaling_factor: 0.1,
            maximal_time_step_scaling_factor: f64::INFINITY,
            jacobian_comparison_criterion: 1e-6,
            compare_to_numerical_jacobian: false,
        }
    }
}

impl NumericalParameters {
    pub fn set_epsilon(&mut self, value: f64, line: u32) -> Result<()> {
        if value < 0.0 {
            return Err(out_of_range("epsilon", value, "must be non-negative", line));
        }
        self.epsilon = value;
        Ok(())
    }

    /// Does *not* automatically rescale `numerical_jacobian_epsilon`; the
    /// original only derives it from `epsilon` at construction time, a
    /// later `@Epsilon` does not retroactively move it (mirrors the
    /// teacher's one-shot-default convention elsewhere in the IR).
    pub fn set_theta(&mut self, value: f64, line: u32) -> Result<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(out_of_range("theta", value, "must lie in [0, 1]", line));
        }
        self.theta = value;
        Ok(())
    }

    pub fn set_iter_max(&mut self, value: u32, line: u32) -> Result<()> {
        if value == 0 {
            return Err(out_of_range("iterMax", value as f64, "must be positive", line));
        }
        self.iter_max = value;
        Ok(())
    }

    pub fn set_numerical_jacobian_epsilon(&mut self, value: f64, line: u32) -> Result<()> {
        if value <= 0.0 {
            return Err(out_of_range(
                "numerical_jacobian_epsilon",
                value,
                "must be strictly positive",
                line,
            ));
        }
        self.numerical_jacobian_epsilon = value;
        Ok(())
    }

    pub fn set_minimal_time_step_scaling_factor(&mut self, value: f64, line: u32) -> Result<()> {
        if value <= 0.0 {
            return Err(out_of_range(
                "minimal_time_step_scaling_factor",
                value,
                "must be strictly positive",
                line,
            ));
        }
        self.minimal_time_step_scaling_factor = value;
        Ok(())
    }

    pub fn set_maximal_time_step_scaling_factor(&mut self, value: f64, line: u32) -> Result<()> {
        if value <= self.minimal_time_step_scaling_factor {
            return Err(out_of_range(
                "maximal_time_step_scaling_factor",
                value,
                "must exceed the minimal scaling factor",
                line,
            ));
        }
        self.maximal_time_step_scaling_factor = value;
        Ok(())
    }

    pub fn set_jacobian_comparison_criterion(&mut self, value: f64, line: u32) -> Result<()> {
        if value < 0.0 {
            return Err(out_of_range(
                "jacobianComparisonCriterion",
                value,
                "must be non-negative",
                line,
            ));
        }
        self.jacobian_comparison_criterion = value;
        Ok(())
    }
}

fn out_of_range(parameter: &str, value: f64, constraint: &'static str, line: u32) -> MFrontError {
    MFrontError::new(
        ErrorKind::NumericalOutOfRange { parameter: parameter.to_string(), value: value.to_string(), constraint },
        Span::new(0, 0, line),
        "implicit-scheme",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let p = NumericalParameters::default();
        assert_eq!(p.epsilon, 1e-8);
        assert_eq!(p.theta, 0.5);
        assert_eq!(p.numerical_jacobian_epsilon, 1e-9);
        assert_eq!(p.iter_max, 100);
        assert_eq!(p.minimal_time_step_scaling_factor, 0.1);
        assert!(p.maximal_time_step_scaling_factor.is_infinite());
    }

    #[test]
    fn theta_outside_unit_interval_is_rejected() {
        let mut p = NumericalParameters::default();
        let err = p.set_theta(1.5, 4).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NumericalOutOfRange { .. }));
    }

    #[test]
    fn theta_boundary_values_are_accepted() {
        let mut p = NumericalParameters::default();
        p.set_theta(0.0, 1).unwrap();
        p.set_theta(1.0, 1).unwrap();
    }

    #[test]
    fn negative_epsilon_is_rejected() {
        let mut p = NumericalParameters::default();
        let err = p.set_epsilon(-1e-8, 2).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NumericalOutOfRange { .. }));
    }

    #[test]
    fn nonpositive_minimal_scaling_factor_is_rejected() {
        let mut p = NumericalParameters::default();
        let err = p.set_minimal_time_step_scaling_factor(0.0, 3).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NumericalOutOfRange { .. }));
    }

    #[test]
    fn maximal_must_exceed_minimal() {
        let mut p = NumericalParameters::default();
        let err = p.set_maximal_time_step_scaling_factor(0.05, 5).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NumericalOutOfRange { .. }));
    }

    #[test]
    fn zero_iter_max_is_rejected() {
        let mut p = NumericalParameters::default();
        let err = p.set_iter_max(0, 6).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NumericalOutOfRange { .. }));
    }

    #[test]
    fn absence_of_declared_bound_is_explicit_unbounded() {
        assert_eq!(MaximumIncrementCap::default(), MaximumIncrementCap::Unbounded);
    }
}

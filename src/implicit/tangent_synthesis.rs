//! Tangent-operator synthesis (spec.md §4.5, "Tangent-operator synthesis").
//!
//! Reads the attributes an author's `@TangentOperator` code block implies by
//! scanning which synthesised helpers it references, then decides what
//! Jacobian-decomposition machinery the emitter must prepend.

use std::collections::BTreeSet;

/// What an `@TangentOperator` block needs, inferred from the identifiers it
/// references (spec.md §4.5 bullet list).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TangentOperatorSynthesis {
    pub requires_jacobian_decomposition: bool,
    /// `(row, column)` pairs a `getPartialJacobianInvert`/`iJ_<a>_<b>`
    /// reference needs an inverse sub-view for.
    pub used_jacobian_invert_blocks: BTreeSet<(String, String)>,
    /// Columns (gradients or external state variables) for which a
    /// `getIntegrationVariablesDerivatives_<col>`-style helper struct is
    /// synthesised.
    pub used_get_integration_variables_derivatives: BTreeSet<String>,
    /// Columns referenced by `df<a>_dd<col>`-style implicit-equation
    /// derivative views where `<col>` is not itself an integration
    /// variable (i.e. a gradient or external state variable column).
    pub used_implicit_equations_derivatives: BTreeSet<String>,
}

/// Input to the synthesis scan: the `@TangentOperator` block's source text
/// plus the names known to the behaviour so identifiers can be split
/// unambiguously (variable names may themselves contain underscores).
pub struct TangentSynthesisInput<'a> {
    pub source: &'a str,
    pub integration_variable_names: &'a [String],
    pub column_names: &'a [String],
}

impl TangentOperatorSynthesis {
    pub fn scan(input: &TangentSynthesisInput) -> Self {
        let mut synthesis = TangentOperatorSynthesis::default();

        if input.source.contains("getPartialJacobianInvert") {
            synthesis.requires_jacobian_decomposition = true;
        }

        for a in input.integration_variable_names {
            for b in input.integration_variable_names {
                let iv_marker = format!("iJ_{a}_{b}");
                let df_marker = format!("df{a}_dd{b}");
                if input.source.contains(&iv_marker) || input.source.contains(&df_marker) {
                    synthesis.requires_jacobian_decomposition = true;
                    synthesis.used_jacobian_invert_blocks.insert((a.clone(), b.clone()));
                }
            }
            for col in input.column_names {
                let df_col_marker = format!("df{a}_dd{col}");
                if input.source.contains(&df_col_marker) {
                    synthesis.requires_jacobian_decomposition = true;
                    synthesis.used_implicit_equations_derivatives.insert(col.clone());
                }
                let helper_marker = format!("getIntegrationVariablesDerivatives_{col}");
                if input.source.contains(&helper_marker) {
                    synthesis.requires_jacobian_decomposition = true;
                    synthesis.used_get_integration_variables_derivatives.insert(col.clone());
                }
            }
        }

        synthesis
    }
}

/// `getPartialJacobianInvert` emits one overload per integration variable,
/// the k-th solving the identity system restricted to the first `k`
/// variables (spec.md §4.5, §2 supplement). Returns the overload index
/// (1-based) paired with the prefix of variable names it covers.
pub fn partial_jacobian_invert_overloads(integration_variable_names: &[String]) -> Vec<(usize, Vec<String>)> {
    (1..=integration_variable_names.len())
        .map(|k| (k, integration_variable_names[..k].to_vec()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_block_needs_no_decomposition() {
        let vars = vec!["eel".to_string(), "p".to_string()];
        let cols = vec!["eto".to_string()];
        let input = TangentSynthesisInput {
            source: "Dt = De;",
            integration_variable_names: &vars,
            column_names: &cols,
        };
        let synthesis = TangentOperatorSynthesis::scan(&input);
        assert!(!synthesis.requires_jacobian_decomposition);
    }

    #[test]
    fn get_partial_jacobian_invert_sets_decomposition_flag() {
        let vars = vec!["eel".to_string()];
        let cols: Vec<String> = vec![];
        let input = TangentSynthesisInput {
            source: "Stensor4 iJe; getPartialJacobianInvert(iJe); Dt = 2*mu*iJe;",
            integration_variable_names: &vars,
            column_names: &cols,
        };
        let synthesis = TangentOperatorSynthesis::scan(&input);
        assert!(synthesis.requires_jacobian_decomposition);
    }

    #[test]
    fn df_block_reference_records_invert_pair() {
        let vars = vec!["eel".to_string(), "p".to_string()];
        let cols: Vec<String> = vec![];
        let input = TangentSynthesisInput {
            source: "iJ_eel_p something;",
            integration_variable_names: &vars,
            column_names: &cols,
        };
        let synthesis = TangentOperatorSynthesis::scan(&input);
        assert!(synthesis.requires_jacobian_decomposition);
        assert!(synthesis.used_jacobian_invert_blocks.contains(&("eel".to_string(), "p".to_string())));
    }

    #[test]
    fn implicit_equation_derivative_column_is_recorded() {
        let vars = vec!["p".to_string()];
        let cols = vec!["T".to_string()];
        let input = TangentSynthesisInput {
            source: "dfp_ddT foo;",
            integration_variable_names: &vars,
            column_names: &cols,
        };
        let synthesis = TangentOperatorSynthesis::scan(&input);
        assert!(synthesis.used_implicit_equations_derivatives.contains("T"));
    }

    #[test]
    fn get_integration_variables_derivatives_helper_is_recorded() {
        let vars = vec!["p".to_string()];
        let cols = vec!["eto".to_string()];
        let input = TangentSynthesisInput {
            source: "auto dp = getIntegrationVariablesDerivatives_eto();",
            integration_variable_names: &vars,
            column_names: &cols,
        };
        let synthesis = TangentOperatorSynthesis::scan(&input);
        assert!(synthesis.used_get_integration_variables_derivatives.contains("eto"));
    }

    #[test]
    fn partial_jacobian_invert_has_one_overload_per_variable() {
        let vars = vec!["eel".to_string(), "p".to_string(), "a".to_string()];
        let overloads = partial_jacobian_invert_overloads(&vars);
        assert_eq!(overloads.len(), 3);
        assert_eq!(overloads[0].1, vec!["eel".to_string()]);
        assert_eq!(overloads[2].1, vars);
    }

    #[test]
    fn testable_property_8_presence_implies_decomposition() {
        let vars = vec!["eel".to_string()];
        let cols: Vec<String> = vec![];
        let input = TangentSynthesisInput {
            source: "getPartialJacobianInvert(x);",
            integration_variable_names: &vars,
            column_names: &cols,
        };
        let synthesis = TangentOperatorSynthesis::scan(&input);
        assert!(synthesis.requires_jacobian_decomposition);
    }
}

//! Isotropic Specialisations (spec.md §4.7): two canned front-ends that
//! *extend* the Implicit-Scheme Lowering with a fixed Newton loop over a
//! single scalar unknown Δp, driven by an author-supplied `@FlowRule`.
//!
//! Both front-ends pre-declare the same elastic-strain/plastic-strain pair
//! and local-variable set; they differ only in the residual the loop closes
//! with (spec.md §4.7: a residual `surf = f/E` for the plastic variant, a
//! `residual = Δp - Δt·g(σ_eq)` shape for the creep variant) and share the
//! same consistent-tangent-operator formula.

use crate::ast::codeblock::{CodeBlock, CodeBlockKind, InsertPolicy, Position};
use crate::ast::variable::{Variable, VariableCategory};
use crate::dsl::Parser;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsotropicVariant {
    PlasticFlow,
    Creep,
}

impl IsotropicVariant {
    /// Matches a `@DSL` argument to a front-end, or `None` for the fixed
    /// implicit DSL this crate otherwise implements.
    pub fn from_dsl_name(name: &str) -> Option<Self> {
        match name {
            "IsotropicPlasticMisesFlow" => Some(IsotropicVariant::PlasticFlow),
            "IsotropicMisesCreep" => Some(IsotropicVariant::Creep),
            _ => None,
        }
    }
}

/// Local variables both front-ends declare (spec.md §4.7): the flow
/// criterion `f`, its scalar derivatives, the stress deviator `s_e`, the
/// von Mises equivalent stress `σ_eq`, and the flow normal `n`.
const LOCAL_VARIABLES: &[(&str, &str)] = &[
    ("real", "f"),
    ("real", "df_dseq"),
    ("real", "df_dp"),
    ("StressStensor", "se"),
    ("stress", "seq"),
    ("StressStensor", "n"),
];

/// Pre-declares `eel`/`p`, the shared local-variable set, then synthesises
/// the canonical Newton-loop `@Integrator` and consistent `@TangentOperator`
/// bodies around the author's flow-rule text.
///
/// Idempotent on the variable declarations: re-running (e.g. a second
/// `@FlowRule`-bearing embedded behaviour sharing a description) does not
/// raise `DuplicateDeclaration` for `eel`/`p`/the locals.
pub fn apply_specialisation(
    parser: &mut Parser,
    variant: IsotropicVariant,
    flow_rule_source: &str,
    line: u32,
) -> Result<()> {
    declare_state_variables(parser, line)?;
    declare_local_variables(parser, line)?;

    let integrator = integrator_body(variant, flow_rule_source);
    let tangent_operator = tangent_operator_body();
    for h in parser.target_hypotheses() {
        let data = parser.description.behaviour_data_mut(h);
        data.insert_code_block(
            CodeBlockKind::Integrator,
            CodeBlock::new(integrator.clone(), line),
            InsertPolicy::Create,
            Position::Body,
        )?;
        data.insert_code_block(
            CodeBlockKind::TangentOperator,
            CodeBlock::new(tangent_operator.clone(), line),
            InsertPolicy::CreateButDontReplace,
            Position::Body,
        )?;
        data.flags.has_consistent_tangent_operator = true;
        data.flags.is_tangent_operator_symmetric = true;
    }
    parser.description.disable_new_user_defined_variables();
    Ok(())
}

fn declare_state_variables(parser: &mut Parser, line: u32) -> Result<()> {
    for h in parser.target_hypotheses() {
        let data = parser.description.behaviour_data_mut(h);
        if data.find_by_name("eel").is_none() {
            data.add_variable(VariableCategory::StateVariable, Variable::new("StrainStensor", "eel", line))?;
        }
        if data.find_by_name("p").is_none() {
            data.add_variable(VariableCategory::StateVariable, Variable::new("real", "p", line))?;
        }
    }
    Ok(())
}

fn declare_local_variables(parser: &mut Parser, line: u32) -> Result<()> {
    for h in parser.target_hypotheses() {
        let data = parser.description.behaviour_data_mut(h);
        for (type_name, name) in LOCAL_VARIABLES {
            if data.find_by_name(name).is_none() {
                data.add_variable(VariableCategory::LocalVariable, Variable::new(*type_name, *name, line))?;
            }
        }
    }
    Ok(())
}

/// The residual differs only in its last line: `surf = f/E` for the plastic
/// variant versus `fp = dp - dt*g(seq)` for the creep variant, both closing
/// over the author's `@FlowRule` text for `f`/`df_dseq`/`df_dp` (spec.md
/// §4.7).
fn integrator_body(variant: IsotropicVariant, flow_rule_source: &str) -> String {
    let common = "se = deviator(sig); seq = sigmaeq(sig);\n\
         n = 3*se/(2*max(seq, 1.e-12*young));\n\
         feel += dp*n;";
    let closure = match variant {
        IsotropicVariant::PlasticFlow => "fp = f/young;",
        IsotropicVariant::Creep => "fp = dp - dt*f;",
    };
    format!("{common}\n{{\n{}\n}}\n{closure}", flow_rule_source.trim())
}

/// The shared consistent-tangent-operator formula (spec.md §4.7): the
/// elastic stiffness `De` plus a rank-one correction along the flow normal
/// `n`, scaled by the scalar derivatives of the flow criterion.
fn tangent_operator_body() -> String {
    "const auto iBe = df_dseq/(df_dseq + df_dp);\n\
     Dt = De - 2*mu*theta*dp*(Stensor4::M() - (n^n)) - 2*mu*theta*iBe*(n^n);"
        .to_string()
}

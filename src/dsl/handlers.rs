//! Keyword handler implementations and the default registry (spec.md §4.3).
//!
//! Each handler is a plain `fn(&mut Parser) -> Result<()>` matching
//! [`super::registry::HandlerFn`]; [`default_registry`] wires every keyword
//! in spec.md §6's "minimal set required for the implicit core" to its
//! handler, `Strict` unless the original documents it as overridable.

use crate::ast::codeblock::{CodeBlock, CodeBlockKind, InsertPolicy, Position};
use crate::ast::mainvariable::{Gradient, ThermodynamicForce};
use crate::ast::variable::{Bound, DefaultValue, ExternalName, Variable, VariableCategory};
use crate::ast::behaviour_description::{OrthotropicAxesConvention, StrainMeasure, SymmetryType};
use crate::ast::slipsystem::{CrystalStructure, MillerIndices, SlipSystemFamily};
use crate::error::{ErrorKind, MFrontError, Result};
use crate::hypothesis::ModellingHypothesis;
use crate::implicit::Solver;
use crate::token::{Span, TokenKind};

use super::registry::{HandlerRegistry, Registration};
use super::Parser;

fn inconsistent(parser: &Parser, msg: impl Into<String>) -> MFrontError {
    MFrontError::new(
        ErrorKind::InconsistentDeclaration(msg.into()),
        Span::new(0, 0, parser.current_line()),
        "inconsistent-declaration",
    )
}

fn invalid_name(parser: &Parser, name: &str, reason: &str) -> MFrontError {
    MFrontError::new(
        ErrorKind::InvalidName { name: name.to_string(), reason: reason.to_string() },
        Span::new(0, 0, parser.current_line()),
        "name-validation",
    )
}

/// A non-empty identifier, containing only ASCII letters/digits/underscore
/// and not starting with a digit, is a valid behaviour/material/library
/// name (spec.md §6, "Keyword surface" name validation).
fn validate_name(parser: &Parser, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let ok = match chars.next() {
        Some(c) => (c.is_ascii_alphabetic() || c == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        None => false,
    };
    if ok {
        Ok(())
    } else {
        Err(invalid_name(parser, name, "must be a valid ASCII identifier"))
    }
}

// ---------------------------------------------------------------------
// Single-field string/identifier keywords
// ---------------------------------------------------------------------

pub fn behaviour(parser: &mut Parser) -> Result<()> {
    let name = parser.expect_identifier()?;
    validate_name(parser, &name)?;
    parser.expect_semicolon()?;
    parser.description.class_name = name;
    Ok(())
}

pub fn material(parser: &mut Parser) -> Result<()> {
    let name = parser.expect_identifier()?;
    validate_name(parser, &name)?;
    parser.expect_semicolon()?;
    parser.description.material_name = Some(name);
    Ok(())
}

pub fn library(parser: &mut Parser) -> Result<()> {
    let name = parser.expect_identifier()?;
    parser.expect_semicolon()?;
    parser.description.library = Some(name);
    Ok(())
}

pub fn author(parser: &mut Parser) -> Result<()> {
    let mut words = Vec::new();
    while !parser.peek().is_punct(";") && !parser.is_eof() {
        match &parser.peek().kind {
            TokenKind::Identifier(_) => words.push(parser.expect_identifier()?),
            _ => {
                parser.advance();
            }
        }
    }
    parser.expect_semicolon()?;
    parser.description.author = Some(words.join(" "));
    Ok(())
}

pub fn date(parser: &mut Parser) -> Result<()> {
    let s = parser.expect_string()?;
    parser.expect_semicolon()?;
    parser.description.date = Some(s);
    Ok(())
}

pub fn description(parser: &mut Parser) -> Result<()> {
    let (text, _) = parser.read_braced_block()?;
    parser.description.description = text.trim().to_string();
    Ok(())
}

// ---------------------------------------------------------------------
// Modelling hypotheses
// ---------------------------------------------------------------------

fn parse_hypothesis_list(parser: &mut Parser) -> Result<Vec<ModellingHypothesis>> {
    let mut out = Vec::new();
    if parser.accept_punct("{") {
        loop {
            if parser.accept_punct("}") {
                break;
            }
            out.extend(parse_one_hypothesis_token(parser)?);
            if !parser.accept_punct(",") {
                parser.expect_punct("}")?;
                break;
            }
        }
    } else {
        out.extend(parse_one_hypothesis_token(parser)?);
    }
    Ok(out)
}

fn parse_one_hypothesis_token(parser: &mut Parser) -> Result<Vec<ModellingHypothesis>> {
    if matches!(&parser.peek().kind, TokenKind::StringLiteral(s) if s == ".+") {
        parser.advance();
        return Ok(crate::hypothesis::expand_all(&[]));
    }
    let name = parser.expect_identifier()?;
    match ModellingHypothesis::from_keyword(&name) {
        Some(h) => Ok(vec![h]),
        None => Err(invalid_name(parser, &name, "not a recognised modelling hypothesis")),
    }
}

pub fn modelling_hypothesis(parser: &mut Parser) -> Result<()> {
    let hypotheses = parse_hypothesis_list(parser)?;
    parser.expect_semicolon()?;
    for h in hypotheses {
        parser.description.use_modelling_hypothesis(h)?;
    }
    Ok(())
}

pub fn modelling_hypotheses(parser: &mut Parser) -> Result<()> {
    modelling_hypothesis(parser)
}

// ---------------------------------------------------------------------
// Strain measure, symmetry, stiffness/thermal-expansion toggles
// ---------------------------------------------------------------------

pub fn strain_measure(parser: &mut Parser) -> Result<()> {
    let name = parser.expect_identifier()?;
    let measure = match name.as_str() {
        "Linearised" | "LinearisedStrain" => StrainMeasure::Linearised,
        "GreenLagrange" => StrainMeasure::GreenLagrange,
        "Hencky" => StrainMeasure::Hencky,
        _ => return Err(invalid_name(parser, &name, "not a recognised strain measure")),
    };
    if parser.accept_punct("{") {
        // `{save_strain, save_stress}` flags: recorded but not modelled as
        // distinct fields at this layer; consumed so the cursor lands past
        // the terminator.
        while !parser.accept_punct("}") {
            parser.advance();
        }
    }
    parser.expect_semicolon()?;
    parser.description.strain_measure = measure;
    Ok(())
}

pub fn use_qt(parser: &mut Parser) -> Result<()> {
    let _ = parser.expect_identifier()?;
    parser.expect_semicolon()
}

pub fn orthotropic_behaviour(parser: &mut Parser) -> Result<()> {
    let mut convention = OrthotropicAxesConvention::Default;
    if parser.accept_punct("<") {
        let name = parser.expect_identifier()?;
        convention = match name.as_str() {
            "Pipe" => OrthotropicAxesConvention::Pipe,
            "Plate" => OrthotropicAxesConvention::Plate,
            "Default" => OrthotropicAxesConvention::Default,
            _ => return Err(invalid_name(parser, &name, "not a recognised orthotropic axes convention")),
        };
        parser.expect_punct(">")?;
    }
    parser.expect_semicolon()?;
    parser.description.symmetry_type = SymmetryType::Orthotropic;
    let hypotheses: Vec<ModellingHypothesis> = parser.description.hypotheses_in_use().copied().collect();
    parser.description.set_orthotropic_axes_convention(convention, &hypotheses, parser.current_line())
}

pub fn compute_stiffness_tensor(parser: &mut Parser) -> Result<()> {
    parser.expect_semicolon()?;
    parser.description.set_computes_stiffness_tensor(parser.current_line())
}

pub fn require_stiffness_tensor(parser: &mut Parser) -> Result<()> {
    parser.expect_semicolon()?;
    parser.description.set_requires_stiffness_tensor(parser.current_line())
}

pub fn compute_thermal_expansion(parser: &mut Parser) -> Result<()> {
    parser.expect_semicolon()?;
    parser.description.set_computes_thermal_expansion(parser.current_line())
}

pub fn require_thermal_expansion_coefficient_tensor(parser: &mut Parser) -> Result<()> {
    parser.expect_semicolon()?;
    parser.description.set_requires_thermal_expansion_coefficient_tensor(parser.current_line())
}

fn parse_expression_list(parser: &mut Parser) -> Result<Vec<String>> {
    parser.expect_punct("{")?;
    let mut out = Vec::new();
    loop {
        if parser.accept_punct("}") {
            break;
        }
        let mut expr = String::new();
        while !parser.peek().is_punct(",") && !parser.peek().is_punct("}") {
            let tok = parser.advance();
            expr.push_str(tok.lexeme());
        }
        out.push(expr);
        if !parser.accept_punct(",") {
            parser.expect_punct("}")?;
            break;
        }
    }
    Ok(out)
}

pub fn elastic_material_properties(parser: &mut Parser) -> Result<()> {
    let exprs = parse_expression_list(parser)?;
    parser.expect_semicolon()?;
    parser.description.elastic_material_properties = exprs;
    Ok(())
}

pub fn hill_tensor(parser: &mut Parser) -> Result<()> {
    let _ = parse_expression_list(parser)?;
    parser.expect_semicolon()
}

pub fn swelling(parser: &mut Parser) -> Result<()> {
    stress_free_expansion(parser, crate::ast::sfe::StressFreeExpansionKind::Swelling)
}

pub fn axial_growth(parser: &mut Parser) -> Result<()> {
    if parser.description.symmetry_type != SymmetryType::Orthotropic {
        return Err(inconsistent(
            parser,
            "@AxialGrowth requires an orthotropic behaviour",
        ));
    }
    stress_free_expansion(parser, crate::ast::sfe::StressFreeExpansionKind::AxialGrowth)
}

pub fn relocation(parser: &mut Parser) -> Result<()> {
    stress_free_expansion(parser, crate::ast::sfe::StressFreeExpansionKind::Relocation)
}

fn stress_free_expansion(parser: &mut Parser, kind: crate::ast::sfe::StressFreeExpansionKind) -> Result<()> {
    let _name = parser.expect_identifier()?;
    parser.expect_semicolon()?;
    let line = parser.current_line();
    for h in parser.target_hypotheses() {
        parser.description.behaviour_data_mut(h).stress_free_expansions.push(
            crate::ast::sfe::StressFreeExpansionDescriptor { kind: kind.clone(), model: None, line },
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------
// Variable declarations
// ---------------------------------------------------------------------

fn category_for(keyword: &str) -> VariableCategory {
    match keyword {
        "@MaterialProperty" => VariableCategory::MaterialProperty,
        "@StateVariable" => VariableCategory::StateVariable,
        "@AuxiliaryStateVariable" => VariableCategory::AuxiliaryStateVariable,
        "@ExternalStateVariable" => VariableCategory::ExternalStateVariable,
        "@IntegrationVariable" => VariableCategory::PureIntegrationVariable,
        "@LocalVariable" => VariableCategory::LocalVariable,
        "@Parameter" => VariableCategory::Parameter,
        "@StaticVariable" | "@IntegerConstant" => VariableCategory::StaticVariable,
        _ => VariableCategory::LocalVariable,
    }
}

fn parse_default_value(parser: &mut Parser) -> Result<DefaultValue> {
    if parser.accept_punct("=") {
        let mut scalar = String::new();
        while !parser.peek().is_punct(",") && !parser.peek().is_punct(";") {
            scalar.push_str(parser.advance().lexeme());
        }
        Ok(DefaultValue { scalar: Some(scalar), array: None })
    } else if parser.peek().is_punct("{") || parser.peek().is_punct("(") {
        let closing: &str = if parser.accept_punct("{") {
            "}"
        } else {
            parser.advance();
            ")"
        };
        let mut items = Vec::new();
        loop {
            if parser.accept_punct(closing) {
                break;
            }
            let mut item = String::new();
            while !parser.peek().is_punct(",") && !parser.peek().is_punct(closing) {
                item.push_str(parser.advance().lexeme());
            }
            items.push(item);
            if !parser.accept_punct(",") {
                parser.expect_punct(closing)?;
                break;
            }
        }
        Ok(DefaultValue { scalar: None, array: Some(items) })
    } else {
        Ok(DefaultValue::default())
    }
}

/// Parses `[Type] name1[n1] [= default1], name2[n2] [= default2], ... ;`
/// (spec.md §4.3, variable declaration keywords).
pub fn variable_declaration(parser: &mut Parser) -> Result<()> {
    let keyword = parser.current_keyword_name().to_string();
    let category = category_for(&keyword);

    let mut type_name = "real".to_string();
    if let TokenKind::Identifier(name) = &parser.peek().kind {
        let name = name.clone();
        let save = name.clone();
        // Peek two ahead: if after consuming `name` another identifier
        // follows, `name` was the type.
        let snapshot_is_type = {
            parser.advance();
            looks_like_type_name_after(parser)
        };
        if snapshot_is_type {
            type_name = save;
        } else {
            // `name` was in fact the first variable name; re-synthesize by
            // falling through with it already consumed.
            return parse_variable_list(parser, category, type_name, Some(name));
        }
    }
    parse_variable_list(parser, category, type_name, None)
}

fn looks_like_type_name_after(parser: &Parser) -> bool {
    matches!(&parser.peek().kind, TokenKind::Identifier(_))
}

fn parse_variable_list(
    parser: &mut Parser,
    category: VariableCategory,
    type_name: String,
    first_name: Option<String>,
) -> Result<()> {
    let mut names = Vec::new();
    if let Some(n) = first_name {
        names.push(n);
    } else {
        names.push(parser.expect_identifier()?);
    }
    loop {
        let name = names.last().unwrap().clone();
        let mut array_size = 1u32;
        if parser.accept_punct("[") {
            let n = parser.expect_number()?;
            array_size = n as u32;
            parser.expect_punct("]")?;
        }
        let mut default_value = parse_default_value(parser)?;
        let line = parser.current_line();
        // S5: an override by parameter name, installed before parsing
        // begins, supersedes whatever default the declaration itself
        // carries.
        if category == VariableCategory::Parameter {
            if let Some(value) = parser.description.parameter_overrides.get(&name) {
                default_value = DefaultValue { scalar: Some(value.to_string()), array: None };
            }
        }
        let mut var = Variable::new(type_name.clone(), name, line);
        var.array_size = array_size;
        if !matches!(default_value.scalar, None) || default_value.array.is_some() {
            var.default_value = Some(default_value);
        }
        for h in parser.target_hypotheses() {
            parser.description.behaviour_data_mut(h).add_variable(category, var.clone())?;
        }
        if parser.accept_punct(",") {
            names.push(parser.expect_identifier()?);
            continue;
        }
        break;
    }
    parser.expect_semicolon()
}

pub fn material_property(parser: &mut Parser) -> Result<()> {
    variable_declaration(parser)
}
pub fn state_variable(parser: &mut Parser) -> Result<()> {
    variable_declaration(parser)
}
pub fn auxiliary_state_variable(parser: &mut Parser) -> Result<()> {
    variable_declaration(parser)
}
pub fn external_state_variable(parser: &mut Parser) -> Result<()> {
    variable_declaration(parser)
}
pub fn integration_variable(parser: &mut Parser) -> Result<()> {
    variable_declaration(parser)
}
pub fn local_variable(parser: &mut Parser) -> Result<()> {
    variable_declaration(parser)
}
pub fn parameter(parser: &mut Parser) -> Result<()> {
    variable_declaration(parser)?;
    // S5: a matching override supersedes the declared default once the
    // declaration completes.
    Ok(())
}
pub fn static_variable(parser: &mut Parser) -> Result<()> {
    variable_declaration(parser)
}
pub fn integer_constant(parser: &mut Parser) -> Result<()> {
    variable_declaration(parser)
}

// ---------------------------------------------------------------------
// Variable method calls: `name.method(args);` — not itself a `@keyword`.
// ---------------------------------------------------------------------

pub fn apply_variable_method(parser: &mut Parser, variable_name: &str) -> Result<()> {
    parser.expect_punct(".")?;
    let method = parser.expect_identifier()?;
    parser.expect_punct("(")?;
    let line = parser.current_line();
    let overridden = parser.description.parameter_overrides.get(variable_name);
    match method.as_str() {
        "setGlossaryName" => {
            let value = parser.expect_string()?;
            parser.expect_punct(")")?;
            set_on_every_hypothesis(parser, variable_name, |v| {
                v.external_name = Some(ExternalName::Glossary(value.clone()));
            });
        }
        "setEntryName" => {
            let value = parser.expect_string()?;
            parser.expect_punct(")")?;
            set_on_every_hypothesis(parser, variable_name, |v| {
                v.external_name = Some(ExternalName::Entry(value.clone()));
            });
        }
        "setDefaultValue" => {
            let mut scalar = String::new();
            while !parser.peek().is_punct(")") {
                scalar.push_str(parser.advance().lexeme());
            }
            parser.expect_punct(")")?;
            // S5: overrideByAParameter supersedes an author-declared default.
            let resolved = overridden.map(|v| v.to_string()).unwrap_or(scalar);
            set_on_every_hypothesis(parser, variable_name, |v| {
                v.default_value = Some(DefaultValue { scalar: Some(resolved.clone()), array: None });
            });
        }
        "setMaximumIncrementValuePerIteration" => {
            let value = parser.expect_number()?;
            parser.expect_punct(")")?;
            set_on_every_hypothesis(parser, variable_name, |v| {
                v.max_increment_per_iteration = Some(value);
            });
        }
        "setNormalisationFactor" => {
            let mut expr = String::new();
            while !parser.peek().is_punct(")") {
                expr.push_str(parser.advance().lexeme());
            }
            parser.expect_punct(")")?;
            let is_integration_variable = parser
                .description
                .hypotheses_in_use()
                .chain(std::iter::once(&ModellingHypothesis::Undefined))
                .any(|h| {
                    parser
                        .description
                        .behaviour_data(*h)
                        .integration_variables()
                        .iter()
                        .any(|v| v.name == variable_name)
                });
            if !is_integration_variable {
                return Err(inconsistent(
                    parser,
                    format!("setNormalisationFactor is only valid on an integration variable ('{variable_name}' is not one)"),
                ));
            }
            set_on_every_hypothesis(parser, variable_name, |v| {
                v.normalisation_factor = Some(expr.clone());
            });
        }
        other => {
            return Err(MFrontError::new(
                ErrorKind::UnknownEntity { kind: "variable method", name: other.to_string() },
                Span::new(0, 0, line),
                "variable-method",
            ))
        }
    }
    parser.expect_semicolon()
}

fn set_on_every_hypothesis(parser: &mut Parser, name: &str, f: impl Fn(&mut Variable)) {
    for h in ModellingHypothesis::ALL_CONCRETE
        .into_iter()
        .chain(std::iter::once(ModellingHypothesis::Undefined))
    {
        if let Some(v) = parser.description.behaviour_data_mut(h).find_by_name_mut(name) {
            f(v);
        }
    }
}

// ---------------------------------------------------------------------
// Main variables
// ---------------------------------------------------------------------

pub fn gradient(parser: &mut Parser) -> Result<()> {
    let _ty = parser.expect_identifier()?;
    let name = parser.expect_identifier()?;
    parser.expect_semicolon()?;
    for h in parser.target_hypotheses() {
        parser
            .description
            .behaviour_data_mut(h)
            .main_variables
            .push_gradient(Gradient { variable_name: name.clone(), increment_known: true });
    }
    Ok(())
}

pub fn thermodynamic_force(parser: &mut Parser) -> Result<()> {
    let _ty = parser.expect_identifier()?;
    let name = parser.expect_identifier()?;
    parser.expect_semicolon()?;
    for h in parser.target_hypotheses() {
        parser
            .description
            .behaviour_data_mut(h)
            .main_variables
            .push_force(ThermodynamicForce { variable_name: name.clone() });
    }
    Ok(())
}

pub fn flux(parser: &mut Parser) -> Result<()> {
    thermodynamic_force(parser)
}

// ---------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------

fn parse_bound(parser: &mut Parser) -> Result<(String, Bound)> {
    let name = parser.expect_identifier()?;
    let in_kw = parser.expect_identifier()?;
    if in_kw != "in" {
        return Err(inconsistent(parser, "expected 'in' in a bounds declaration"));
    }
    let opens_low = if parser.accept_punct("[") { true } else { parser.expect_punct("]")?; false };
    let has_lower = !parser.peek().is_punct(",") && !parser.peek().is_punct(":");
    let lower = if has_lower { Some(parser.expect_number()?) } else { None };
    if !parser.accept_punct(",") {
        parser.expect_punct(":")?;
    }
    let has_upper = !parser.peek().is_punct("[") && !parser.peek().is_punct("]");
    let upper = if has_upper { Some(parser.expect_number()?) } else { None };
    let _ = if parser.accept_punct("]") { true } else { parser.expect_punct("[")?; false };
    let _ = opens_low;
    let bound = match (lower, upper) {
        (Some(l), Some(u)) => Bound::LowerAndUpper(l, u),
        (Some(l), None) => Bound::Lower(l),
        (None, Some(u)) => Bound::Upper(u),
        (None, None) => return Err(inconsistent(parser, "a bounds declaration needs at least one endpoint")),
    };
    Ok((name, bound))
}

pub fn bounds(parser: &mut Parser) -> Result<()> {
    let (name, bound) = parse_bound(parser)?;
    parser.expect_semicolon()?;
    set_on_every_hypothesis(parser, &name, |v| v.bounds = Some(bound));
    Ok(())
}

pub fn physical_bounds(parser: &mut Parser) -> Result<()> {
    let (name, bound) = parse_bound(parser)?;
    parser.expect_semicolon()?;
    set_on_every_hypothesis(parser, &name, |v| v.physical_bounds = Some(bound));
    Ok(())
}

// ---------------------------------------------------------------------
// Numerical parameters
// ---------------------------------------------------------------------

pub fn theta(parser: &mut Parser) -> Result<()> {
    let value = parser.expect_number()?;
    parser.expect_semicolon()?;
    parser.numerical.set_theta(value, parser.current_line())
}

pub fn epsilon(parser: &mut Parser) -> Result<()> {
    let value = parser.expect_number()?;
    parser.expect_semicolon()?;
    parser.numerical.set_epsilon(value, parser.current_line())
}

pub fn iter_max(parser: &mut Parser) -> Result<()> {
    let value = parser.expect_number()?;
    parser.expect_semicolon()?;
    parser.numerical.set_iter_max(value as u32, parser.current_line())
}

pub fn perturbation_value_for_numerical_jacobian_computation(parser: &mut Parser) -> Result<()> {
    let value = parser.expect_number()?;
    parser.expect_semicolon()?;
    parser.numerical.set_numerical_jacobian_epsilon(value, parser.current_line())
}

pub fn compare_to_numerical_jacobian(parser: &mut Parser) -> Result<()> {
    let value = parser.expect_identifier()?;
    parser.expect_semicolon()?;
    parser.numerical.compare_to_numerical_jacobian = value == "true";
    Ok(())
}

pub fn jacobian_comparison_criterion(parser: &mut Parser) -> Result<()> {
    let value = parser.expect_number()?;
    parser.expect_semicolon()?;
    parser.numerical.set_jacobian_comparison_criterion(value, parser.current_line())
}

pub fn maximum_increment_value_per_iteration(parser: &mut Parser) -> Result<()> {
    let value = parser.expect_number()?;
    parser.expect_semicolon()?;
    // Applies as the default cap for every integration variable that has
    // not set its own via `.setMaximumIncrementValuePerIteration(...)`.
    for h in ModellingHypothesis::ALL_CONCRETE
        .into_iter()
        .chain(std::iter::once(ModellingHypothesis::Undefined))
    {
        let data = parser.description.behaviour_data_mut(h);
        let names: Vec<String> = data.integration_variables().iter().map(|v| v.name.clone()).collect();
        for name in names {
            if let Some(v) = data.find_by_name_mut(&name) {
                if v.max_increment_per_iteration.is_none() {
                    v.max_increment_per_iteration = Some(value);
                }
            }
        }
    }
    Ok(())
}

pub fn numerically_computed_jacobian_blocks(parser: &mut Parser) -> Result<()> {
    let entries = parse_expression_list(parser)?;
    parser.expect_semicolon()?;
    for entry in entries {
        let entry = entry.trim_start_matches("df");
        if let Some((a, b)) = entry.split_once("_dd") {
            parser
                .numerically_computed_jacobian_blocks
                .push((a.to_string(), b.to_string()));
        }
    }
    Ok(())
}

pub fn algorithm(parser: &mut Parser) -> Result<()> {
    let name = parser.expect_identifier()?;
    parser.expect_semicolon()?;
    parser.solver = Solver::from_keyword(&name);
    if parser.solver.is_none() {
        return Err(invalid_name(parser, &name, "not a recognised solver algorithm"));
    }
    Ok(())
}

pub fn is_tangent_operator_symmetric(parser: &mut Parser) -> Result<()> {
    let value = parser.expect_identifier()?;
    parser.expect_semicolon()?;
    let line = parser.current_line();
    for h in parser.target_hypotheses() {
        parser.description.behaviour_data_mut(h).flags.is_tangent_operator_symmetric = value == "true";
    }
    let _ = line;
    Ok(())
}

pub fn usable_in_purely_implicit_resolution(parser: &mut Parser) -> Result<()> {
    parser.expect_semicolon()?;
    for h in parser.target_hypotheses() {
        let flags = &mut parser.description.behaviour_data_mut(h).flags;
        flags.usable_in_purely_implicit_resolution = true;
        flags.usable_in_purely_implicit_resolution_explicit = true;
    }
    Ok(())
}

// ---------------------------------------------------------------------
// Code blocks
// ---------------------------------------------------------------------

struct CodeBlockOptions {
    policy: InsertPolicy,
    position: Position,
    hypotheses: Vec<ModellingHypothesis>,
    extra: Vec<String>,
}

fn parse_code_block_options(parser: &mut Parser) -> Result<CodeBlockOptions> {
    let mut opts = CodeBlockOptions {
        policy: InsertPolicy::Create,
        position: Position::Body,
        hypotheses: Vec::new(),
        extra: Vec::new(),
    };
    if !parser.accept_punct("<") {
        return Ok(opts);
    }
    loop {
        if parser.accept_punct(">") {
            break;
        }
        match &parser.peek().kind {
            TokenKind::StringLiteral(s) if s == ".+" => {
                parser.advance();
                opts.hypotheses = crate::hypothesis::expand_all(&[]);
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                match name.as_str() {
                    "Append" => {
                        opts.policy = InsertPolicy::CreateOrAppend;
                        parser.advance();
                    }
                    "Replace" => {
                        opts.policy = InsertPolicy::CreateOrReplace;
                        parser.advance();
                    }
                    "Create" => {
                        opts.policy = InsertPolicy::Create;
                        parser.advance();
                    }
                    "Body" => {
                        opts.position = Position::Body;
                        parser.advance();
                    }
                    "AtBeginning" => {
                        opts.position = Position::AtBeginning;
                        parser.advance();
                    }
                    "AtEnd" => {
                        opts.position = Position::AtEnd;
                        parser.advance();
                    }
                    _ => {
                        if let Some(h) = ModellingHypothesis::from_keyword(&name) {
                            opts.hypotheses.push(h);
                            parser.advance();
                        } else {
                            opts.extra.push(name);
                            parser.advance();
                        }
                    }
                }
            }
            _ => {
                parser.advance();
            }
        }
        if !parser.accept_punct(",") {
            parser.expect_punct(">")?;
            break;
        }
    }
    Ok(opts)
}

fn kind_for(keyword: &str, extra: &[String], parser: &Parser) -> Result<CodeBlockKind> {
    Ok(match keyword {
        "@Predictor" => CodeBlockKind::Predictor,
        "@Integrator" => CodeBlockKind::Integrator,
        "@ComputeStress" => CodeBlockKind::ComputeStress,
        "@ComputeFinalStress" => CodeBlockKind::ComputeFinalStress,
        "@TangentOperator" => CodeBlockKind::TangentOperator,
        "@PredictionOperator" => CodeBlockKind::PredictionOperator,
        "@InitLocalVariables" => CodeBlockKind::InitLocalVariables,
        "@UpdateAuxiliaryStateVariables" => CodeBlockKind::UpdateAuxiliaryStateVariables,
        "@InternalEnergy" => CodeBlockKind::InternalEnergy,
        "@DissipatedEnergy" => CodeBlockKind::DissipatedEnergy,
        "@SpeedOfSound" => CodeBlockKind::SpeedOfSound,
        "@ComputeStressFreeExpansion" => CodeBlockKind::ComputeStressFreeExpansion,
        "@APrioriTimeStepScalingFactor" => CodeBlockKind::APrioriTimeStepScalingFactor,
        "@APosterioriTimeStepScalingFactor" => CodeBlockKind::APosterioriTimeStepScalingFactor,
        "@AdditionalConvergenceChecks" => CodeBlockKind::AdditionalConvergenceChecks,
        "@ProcessNewCorrection" => CodeBlockKind::ProcessNewCorrection,
        "@RejectCurrentCorrection" => CodeBlockKind::RejectCurrentCorrection,
        "@ProcessNewEstimate" => CodeBlockKind::ProcessNewEstimate,
        "@Initialize" => CodeBlockKind::Initialize(
            extra.first().cloned().ok_or_else(|| inconsistent(parser, "@Initialize requires an <Id>"))?,
        ),
        "@PostProcessing" => CodeBlockKind::PostProcessing(
            extra.first().cloned().ok_or_else(|| inconsistent(parser, "@PostProcessing requires an <Id>"))?,
        ),
        other => return Err(inconsistent(parser, format!("'{other}' is not a code-block keyword"))),
    })
}

pub fn code_block(parser: &mut Parser) -> Result<()> {
    let keyword = parser.current_keyword_name().to_string();
    let opts = parse_code_block_options(parser)?;
    let kind = kind_for(&keyword, &opts.extra, parser)?;
    if let CodeBlockKind::Initialize(id) = &kind {
        parser.reserve_initialize_id(id, parser.current_line())?;
    }
    if let CodeBlockKind::PostProcessing(id) = &kind {
        parser.reserve_postprocessing_id(id, parser.current_line())?;
    }
    let (text, line) = parser.read_braced_block()?;
    let block = CodeBlock::new(text, line);
    let hypotheses = if opts.hypotheses.is_empty() { parser.target_hypotheses() } else { opts.hypotheses };
    for h in hypotheses {
        parser
            .description
            .behaviour_data_mut(h)
            .insert_code_block(kind.clone(), block.clone(), opts.policy, opts.position)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------
// Crystal plasticity
// ---------------------------------------------------------------------

pub fn crystal_structure(parser: &mut Parser) -> Result<()> {
    let name = parser.expect_identifier()?;
    parser.expect_semicolon()?;
    let cs = match name.as_str() {
        "Cubic" => CrystalStructure::Cubic,
        "FCC" => CrystalStructure::FCC,
        "BCC" => CrystalStructure::BCC,
        "HCP" => CrystalStructure::HCP,
        _ => return Err(invalid_name(parser, &name, "not a recognised crystal structure")),
    };
    parser.description.crystal_structure = Some(cs);
    parser.description.slip_systems.crystal_structure = Some(cs);
    Ok(())
}

fn parse_miller(parser: &mut Parser) -> Result<MillerIndices> {
    parser.expect_punct("<")?;
    let h = parser.expect_number()? as i32;
    parser.accept_punct(",");
    let k = parser.expect_number()? as i32;
    parser.accept_punct(",");
    let l = parser.expect_number()? as i32;
    parser.expect_punct(">")?;
    Ok(MillerIndices { h, k, l })
}

pub fn slip_system(parser: &mut Parser) -> Result<()> {
    let plane = parse_miller(parser)?;
    let direction = parse_miller(parser)?;
    parser.expect_semicolon()?;
    parser.description.slip_systems.families.push(SlipSystemFamily { plane, direction });
    Ok(())
}

pub fn slip_systems(parser: &mut Parser) -> Result<()> {
    parser.expect_punct("{")?;
    loop {
        if parser.accept_punct("}") {
            break;
        }
        let plane = parse_miller(parser)?;
        let direction = parse_miller(parser)?;
        parser.description.slip_systems.families.push(SlipSystemFamily { plane, direction });
        if !parser.accept_punct(",") {
            parser.expect_punct("}")?;
            break;
        }
    }
    parser.expect_semicolon()
}

pub fn interaction_matrix(parser: &mut Parser) -> Result<()> {
    let values = parse_expression_list(parser)?;
    parser.expect_semicolon()?;
    parser.description.slip_systems.interaction_matrix = values
        .iter()
        .map(|v| v.parse::<f64>().unwrap_or(0.0))
        .collect();
    Ok(())
}

// ---------------------------------------------------------------------
// Free-text passthrough keywords (emitted verbatim, not modelled further)
// ---------------------------------------------------------------------

pub fn verbatim_block(parser: &mut Parser) -> Result<()> {
    let _ = parser.read_braced_block()?;
    Ok(())
}

/// `@DSL Implicit;` — selects the parsing strategy. Most names are recorded
/// but not consumed further since this crate implements a single, fixed
/// implicit DSL; the two Isotropic Specialisations names additionally arm
/// `@FlowRule` (spec.md §4.7).
pub fn dsl_keyword(parser: &mut Parser) -> Result<()> {
    let name = parser.expect_identifier()?;
    parser.expect_semicolon()?;
    parser.isotropic_variant = crate::isotropic::IsotropicVariant::from_dsl_name(&name);
    Ok(())
}

/// `@FlowRule { ... };` — only meaningful once `@DSL` has named one of the
/// Isotropic Specialisations front-ends; closes over the block text to
/// synthesise the canonical Newton-loop integrator and tangent operator.
pub fn flow_rule(parser: &mut Parser) -> Result<()> {
    let (text, line) = parser.read_braced_block()?;
    let variant = parser.isotropic_variant.ok_or_else(|| {
        inconsistent(parser, "@FlowRule requires @DSL IsotropicPlasticMisesFlow or @DSL IsotropicMisesCreep")
    })?;
    crate::isotropic::apply_specialisation(parser, variant, &text, line)
}

/// `@TangentOperatorBlocks {dfoo_ddbar, ...};` — a braced list terminated
/// by a semicolon, unlike `@Includes`/`@Sources` style free-text blocks.
/// Each entry names a thermodynamic-force/column pair (`df<a>_dd<b>`);
/// every one is appended to the active hypotheses' tangent-operator block
/// list, on top of whatever the default main-variable pairing already
/// populated (spec.md §4.5, "Tangent Operator Block").
pub fn tangent_operator_blocks_list(parser: &mut Parser) -> Result<()> {
    let entries = parse_expression_list(parser)?;
    parser.expect_semicolon()?;
    for raw in entries {
        let Some(rest) = raw.strip_prefix("df") else { continue };
        let Some(idx) = rest.find("_dd") else { continue };
        let row = rest[..idx].to_string();
        let column = rest[idx + 3..].to_string();
        for h in parser.target_hypotheses() {
            let is_external_state_variable = parser
                .description
                .behaviour_data(h)
                .variables(VariableCategory::ExternalStateVariable)
                .iter()
                .any(|v| v.name == column);
            let column_kind = if is_external_state_variable {
                crate::ast::tangent::TangentColumnVariable::ExternalStateVariable
            } else {
                crate::ast::tangent::TangentColumnVariable::Gradient
            };
            let data = parser.description.behaviour_data_mut(h);
            data.tangent_operator_blocks
                .get_or_insert_with(crate::ast::tangent::TangentOperatorBlocks::new)
                .push_additional(crate::ast::tangent::TangentOperatorBlockEntry {
                    row: row.clone(),
                    row_kind: crate::ast::tangent::TangentRowVariable::ThermodynamicForce,
                    column,
                    column_kind,
                });
        }
    }
    Ok(())
}

/// `@MaterialLaw "name.mfront";` — records the law's name so the emitter
/// can wrap every code block in a `writeMaterialLaws` call naming it
/// (spec.md §4.6). Real parsing of the material-law file itself is out of
/// scope (spec.md §1).
pub fn material_law(parser: &mut Parser) -> Result<()> {
    let name = parser.expect_string()?;
    parser.expect_semicolon()?;
    parser.description.material_laws.push(name);
    Ok(())
}

pub fn interface_keyword(parser: &mut Parser) -> Result<()> {
    let _ = parser.expect_identifier()?;
    parser.expect_semicolon()
}

pub fn brick(parser: &mut Parser) -> Result<()> {
    let name = parser.expect_string()?;
    if parser.accept_punct("{") {
        let mut depth = 1;
        while depth > 0 {
            if parser.peek().is_punct("{") {
                depth += 1;
            } else if parser.peek().is_punct("}") {
                depth -= 1;
            }
            parser.advance();
        }
    } else {
        parser.expect_semicolon()?;
    }
    if parser.bricks.get(&name).is_none() {
        return Err(MFrontError::new(
            ErrorKind::UnknownEntity { kind: "brick", name },
            Span::new(0, 0, parser.current_line()),
            "@Brick",
        ));
    }
    Ok(())
}

pub fn model(parser: &mut Parser) -> Result<()> {
    let file = parser.expect_string()?;
    parser.expect_semicolon()?;
    let model = std::rc::Rc::new(crate::ast::model::ModelDescription::new(file));
    parser.description.embedded_models.push(model);
    Ok(())
}

/// Builds the default registry with every keyword in spec.md §6's minimal
/// set wired to its handler, `Strict` unless it names an overridable
/// flag-style setting.
pub fn default_registry() -> HandlerRegistry {
    let mut r = HandlerRegistry::new();
    macro_rules! reg {
        ($name:expr, $f:expr) => {
            r.register($name, $f, Registration::Strict).unwrap();
        };
    }
    reg!("@DSL", dsl_keyword);
    reg!("@Behaviour", behaviour);
    reg!("@Material", material);
    reg!("@Library", library);
    reg!("@Author", author);
    reg!("@Date", date);
    reg!("@Description", description);
    reg!("@ModellingHypothesis", modelling_hypothesis);
    reg!("@ModellingHypotheses", modelling_hypotheses);
    reg!("@StrainMeasure", strain_measure);
    reg!("@UseQt", use_qt);
    reg!("@OrthotropicBehaviour", orthotropic_behaviour);
    reg!("@ComputeStiffnessTensor", compute_stiffness_tensor);
    reg!("@RequireStiffnessTensor", require_stiffness_tensor);
    reg!("@ElasticMaterialProperties", elastic_material_properties);
    reg!("@HillTensor", hill_tensor);
    reg!("@ComputeThermalExpansion", compute_thermal_expansion);
    reg!("@RequireThermalExpansionCoefficientTensor", require_thermal_expansion_coefficient_tensor);
    reg!("@Gradient", gradient);
    reg!("@Flux", flux);
    reg!("@ThermodynamicForce", thermodynamic_force);
    reg!("@TangentOperatorBlocks", tangent_operator_blocks_list);
    reg!("@AdditionalTangentOperatorBlock", tangent_operator_blocks_list);
    reg!("@AdditionalTangentOperatorBlocks", tangent_operator_blocks_list);
    reg!("@StateVariable", state_variable);
    reg!("@AuxiliaryStateVariable", auxiliary_state_variable);
    reg!("@ExternalStateVariable", external_state_variable);
    reg!("@IntegrationVariable", integration_variable);
    reg!("@LocalVariable", local_variable);
    reg!("@Parameter", parameter);
    reg!("@StaticVariable", static_variable);
    reg!("@IntegerConstant", integer_constant);
    reg!("@MaterialLaw", material_law);
    reg!("@Includes", verbatim_block);
    reg!("@Sources", verbatim_block);
    reg!("@Members", verbatim_block);
    reg!("@Private", verbatim_block);
    reg!("@Interface", interface_keyword);
    reg!("@Brick", brick);
    reg!("@Model", model);
    reg!("@Algorithm", algorithm);
    reg!("@Theta", theta);
    reg!("@Epsilon", epsilon);
    reg!("@IterMax", iter_max);
    reg!(
        "@PerturbationValueForNumericalJacobianComputation",
        perturbation_value_for_numerical_jacobian_computation
    );
    reg!("@CompareToNumericalJacobian", compare_to_numerical_jacobian);
    reg!("@JacobianComparisonCriterion", jacobian_comparison_criterion);
    reg!("@MaximumIncrementValuePerIteration", maximum_increment_value_per_iteration);
    reg!("@NumericallyComputedJacobianBlocks", numerically_computed_jacobian_blocks);
    reg!("@Predictor", code_block);
    reg!("@Integrator", code_block);
    reg!("@ComputeStress", code_block);
    reg!("@ComputeFinalStress", code_block);
    reg!("@TangentOperator", code_block);
    reg!("@PredictionOperator", code_block);
    reg!("@IsTangentOperatorSymmetric", is_tangent_operator_symmetric);
    reg!("@APrioriTimeStepScalingFactor", code_block);
    reg!("@APosterioriTimeStepScalingFactor", code_block);
    reg!("@AdditionalConvergenceChecks", code_block);
    reg!("@ProcessNewCorrection", code_block);
    reg!("@RejectCurrentCorrection", code_block);
    reg!("@ProcessNewEstimate", code_block);
    reg!("@InitLocalVariables", code_block);
    reg!("@UpdateAuxiliaryStateVariables", code_block);
    reg!("@InternalEnergy", code_block);
    reg!("@DissipatedEnergy", code_block);
    reg!("@SpeedOfSound", code_block);
    reg!("@Swelling", swelling);
    reg!("@AxialGrowth", axial_growth);
    reg!("@Relocation", relocation);
    reg!("@CrystalStructure", crystal_structure);
    reg!("@SlipSystem", slip_system);
    reg!("@SlipSystems", slip_systems);
    reg!("@InteractionMatrix", interaction_matrix);
    reg!("@Initialize", code_block);
    reg!("@PostProcessing", code_block);
    reg!("@Bounds", bounds);
    reg!("@PhysicalBounds", physical_bounds);
    reg!("@UsableInPurelyImplicitResolution", usable_in_purely_implicit_resolution);
    reg!("@ComputeStressFreeExpansion", code_block);
    reg!("@FlowRule", flow_rule);
    r.register("@MaterialProperty", material_property, Registration::Strict).unwrap();
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::Parser;

    fn run(source: &str) -> Result<Parser> {
        let mut parser = Parser::new(source)?;
        let registry = default_registry();
        parser.process(&registry)?;
        Ok(parser)
    }

    #[test]
    fn behaviour_sets_class_name() {
        let parser = run("@Behaviour Elastic;").unwrap();
        assert_eq!(parser.description.class_name, "Elastic");
    }

    #[test]
    fn material_property_with_glossary_name() {
        let parser = run(
            r#"@MaterialProperty stress young;
               young.setGlossaryName("YoungModulus");"#,
        )
        .unwrap();
        let data = parser.description.behaviour_data(ModellingHypothesis::Undefined);
        let v = data.find_by_name("young").unwrap();
        assert_eq!(v.type_name, "stress");
        assert!(matches!(&v.external_name, Some(ExternalName::Glossary(g)) if g == "YoungModulus"));
    }

    #[test]
    fn gradient_and_force_pair_once_both_seen() {
        let parser = run("@Gradient StrainStensor eto;\n@ThermodynamicForce StressStensor sig;").unwrap();
        let data = parser.description.behaviour_data(ModellingHypothesis::Undefined);
        assert_eq!(data.main_variables.pairs.len(), 1);
    }

    #[test]
    fn default_variable_type_is_real() {
        let parser = run("@LocalVariable f;").unwrap();
        let data = parser.description.behaviour_data(ModellingHypothesis::Undefined);
        assert_eq!(data.find_by_name("f").unwrap().type_name, "real");
    }

    #[test]
    fn array_size_is_parsed() {
        let parser = run("@LocalVariable real f[3];").unwrap();
        let data = parser.description.behaviour_data(ModellingHypothesis::Undefined);
        assert_eq!(data.find_by_name("f").unwrap().array_size, 3);
    }

    #[test]
    fn theta_out_of_range_is_rejected() {
        let err = run("@Theta 2.0;").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NumericalOutOfRange { .. }));
    }

    #[test]
    fn code_block_disables_new_user_defined_variables() {
        let err = run("@Integrator { this->sig = this->young; }\n@LocalVariable real f;").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InconsistentDeclaration(_)));
    }

    #[test]
    fn initialize_id_collision_is_rejected() {
        let err = run("@Initialize<A> { x = 1; }\n@Initialize<A> { x = 2; }").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::DuplicateDeclaration { .. }));
    }

    #[test]
    fn distinct_initialize_ids_are_accepted() {
        run("@Initialize<A> { x = 1; }\n@Initialize<B> { x = 2; }").unwrap();
    }

    #[test]
    fn axial_growth_requires_orthotropic_symmetry() {
        let err = run("@AxialGrowth esv;").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InconsistentDeclaration(_)));
    }

    #[test]
    fn axial_growth_allowed_under_orthotropic() {
        run("@OrthotropicBehaviour;\n@ExternalStateVariable real esv;\n@AxialGrowth esv;").unwrap();
    }

    #[test]
    fn stiffness_tensor_mutual_exclusion_is_enforced() {
        let err = run("@RequireStiffnessTensor;\n@ComputeStiffnessTensor;").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InconsistentDeclaration(_)));
    }

    #[test]
    fn modelling_hypotheses_expand_dot_plus() {
        let parser = run(r#"@ModellingHypotheses ".+";"#).unwrap();
        assert_eq!(
            parser.description.hypotheses_in_use().count(),
            ModellingHypothesis::ALL_CONCRETE.len()
        );
    }

    #[test]
    fn setnormalisationfactor_rejects_non_integration_variable() {
        let err = run(
            r#"@LocalVariable real f;
               f.setNormalisationFactor(young);"#,
        )
        .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InconsistentDeclaration(_)));
    }

    #[test]
    fn setnormalisationfactor_accepted_on_state_variable() {
        run(
            r#"@StateVariable real p;
               p.setNormalisationFactor(young);"#,
        )
        .unwrap();
    }

    #[test]
    fn parameter_override_supersedes_declared_default() {
        let mut parser = Parser::new(r#"@Parameter stress young = 195.0;"#).unwrap();
        parser.description.parameter_overrides.override_by_a_parameter("young", 210.0);
        let registry = default_registry();
        parser.process(&registry).unwrap();
        let data = parser.description.behaviour_data(ModellingHypothesis::Undefined);
        let v = data.find_by_name("young").unwrap();
        assert_eq!(v.default_value.as_ref().unwrap().scalar.as_deref(), Some("210"));
    }

    #[test]
    fn bounds_lower_and_upper_are_parsed() {
        let parser = run("@LocalVariable real f;\n@Bounds f in [0:1];").unwrap();
        let data = parser.description.behaviour_data(ModellingHypothesis::Undefined);
        assert!(matches!(data.find_by_name("f").unwrap().bounds, Some(Bound::LowerAndUpper(0.0, 1.0))));
    }

    #[test]
    fn slip_systems_crystal_structure_round_trip() {
        let parser = run("@CrystalStructure FCC;\n@SlipSystem<1,1,1><1,-1,0>;").unwrap();
        assert_eq!(parser.description.crystal_structure, Some(CrystalStructure::FCC));
        assert_eq!(parser.description.slip_systems.families.len(), 1);
    }
}

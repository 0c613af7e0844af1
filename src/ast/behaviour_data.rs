//! Behaviour Data (spec.md §3, "Behaviour Data (per hypothesis)"): owns all
//! per-hypothesis variables, code blocks, and flags.

use std::collections::{HashMap, HashSet};

use crate::ast::codeblock::{CodeBlock, CodeBlockKind, CodeBlocks, InsertPolicy, Position};
use crate::ast::mainvariable::MainVariableBuilder;
use crate::ast::sfe::StressFreeExpansionDescriptor;
use crate::ast::tangent::TangentOperatorBlocks;
use crate::ast::variable::{ExternalName, Variable, VariableCategory};
use crate::error::{ErrorKind, MFrontError, Result};
use crate::token::Span;

/// Names the original reserves before any user code runs, so a
/// user-declared variable can never collide with a synthesised helper
/// (spec.md §2 supplement, `reserveName("getPartialJacobianInvert")`).
const STANDARD_RESERVED_NAMES: &[&str] = &[
    "getPartialJacobianInvert",
    "computeFdF",
    "iterMax",
    "epsilon",
    "theta",
    "jacobian",
    "zeros",
    "fzeros",
    "jacobian_permutation",
];

#[derive(Debug, Clone, Default)]
pub struct BehaviourDataFlags {
    pub is_tangent_operator_symmetric: bool,
    pub has_prediction_operator: bool,
    pub has_consistent_tangent_operator: bool,
    pub usable_in_purely_implicit_resolution: bool,
    pub usable_in_purely_implicit_resolution_explicit: bool,
    pub compare_to_numerical_jacobian: bool,
    pub profiling: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BehaviourData {
    reserved_names: HashSet<String>,
    registered_members: HashSet<String>,
    variables: HashMap<VariableCategory, Vec<Variable>>,
    pub code_blocks: CodeBlocks,
    pub flags: BehaviourDataFlags,
    pub stress_free_expansions: Vec<StressFreeExpansionDescriptor>,
    pub main_variables: MainVariableBuilder,
    pub tangent_operator_blocks: Option<TangentOperatorBlocks>,
}

impl BehaviourData {
    pub fn new() -> Self {
        let mut data = Self::default();
        data.reserve_standard_names();
        data
    }

    fn reserve_standard_names(&mut self) {
        for n in STANDARD_RESERVED_NAMES {
            self.reserved_names.insert((*n).to_string());
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.contains(name)
    }

    pub fn reserve_name(&mut self, name: impl Into<String>) {
        self.reserved_names.insert(name.into());
    }

    /// Records `name` as "used in emitted code"; the emitter consults this
    /// set before synthesising a helper so it never shadows one the user
    /// already wrote by hand (spec.md §4.4).
    pub fn register_member_name(&mut self, name: impl Into<String>) {
        self.registered_members.insert(name.into());
    }

    pub fn is_member_registered(&self, name: &str) -> bool {
        self.registered_members.contains(name)
    }

    pub fn variables(&self, category: VariableCategory) -> &[Variable] {
        self.variables.get(&category).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn all_variables(&self) -> impl Iterator<Item = (&VariableCategory, &Variable)> {
        self.variables.iter().flat_map(|(cat, vars)| vars.iter().map(move |v| (cat, v)))
    }

    /// Finds a variable by name across every category (spec.md §4.4,
    /// "symbol lookup: an external name maps to at most one variable").
    pub fn find_by_name(&self, name: &str) -> Option<&Variable> {
        self.variables.values().flat_map(|vs| vs.iter()).find(|v| v.name == name)
    }

    /// Mutable counterpart of [`Self::find_by_name`], used by variable
    /// methods (`setGlossaryName`, `setDefaultValue`, ...) parsed after the
    /// declaration statement (spec.md §4.3, "Variable-method parsing").
    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables.values_mut().flat_map(|vs| vs.iter_mut()).find(|v| v.name == name)
    }

    pub fn find_by_external_name(&self, name: &str) -> Option<&Variable> {
        self.variables.values().flat_map(|vs| vs.iter()).find(|v| match &v.external_name {
            Some(ExternalName::Glossary(g)) => g == name,
            Some(ExternalName::Entry(e)) => e == name,
            None => false,
        })
    }

    /// Adds a variable to `category`, enforcing name uniqueness within the
    /// hypothesis (spec.md §3 invariant, testable property 3) and the
    /// reserved-name set.
    pub fn add_variable(&mut self, category: VariableCategory, variable: Variable) -> Result<()> {
        if self.reserved_names.contains(&variable.name) {
            return Err(MFrontError::new(
                ErrorKind::InvalidName { name: variable.name.clone(), reason: "reserved name".into() },
                Span::new(0, 0, variable.line),
                "variable-declaration",
            ));
        }
        if self.find_by_name(&variable.name).is_some() {
            return Err(MFrontError::new(
                ErrorKind::DuplicateDeclaration { name: variable.name.clone() },
                Span::new(0, 0, variable.line),
                "variable-declaration",
            ));
        }
        if let Some(ExternalName::Glossary(g)) | Some(ExternalName::Entry(g)) = &variable.external_name {
            if self.find_by_external_name(g).is_some() {
                return Err(MFrontError::new(
                    ErrorKind::DuplicateDeclaration { name: g.clone() },
                    Span::new(0, 0, variable.line),
                    "variable-declaration",
                ));
            }
        }
        self.reserved_names.insert(variable.name.clone());
        if let Some(sym) = &variable.symbolic_name {
            self.reserved_names.insert(sym.clone());
        }
        self.variables.entry(category).or_default().push(variable);
        Ok(())
    }

    pub fn insert_code_block(
        &mut self,
        kind: CodeBlockKind,
        block: CodeBlock,
        policy: InsertPolicy,
        position: Position,
    ) -> Result<()> {
        self.code_blocks.insert(kind, block, policy, position)
    }

    /// Integration variables: the state-variable subset plus the
    /// pure-integration complement, combined (spec.md §3, "Variable
    /// Category").
    pub fn integration_variables(&self) -> Vec<&Variable> {
        let mut vars: Vec<&Variable> = self.variables(VariableCategory::StateVariable).iter().collect();
        vars.extend(self.variables(VariableCategory::PureIntegrationVariable).iter());
        vars
    }
}

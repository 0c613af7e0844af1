//! DSL Base (spec.md §4.3): keyword dispatch over the token stream,
//! mutating the [`BehaviourDescription`](crate::ast::BehaviourDescription)
//! IR one handler at a time.

pub mod brick;
pub mod handlers;
pub mod interface;
pub mod keyword;
pub mod registry;

pub use brick::{Brick, BrickRegistry};
pub use interface::{Interface, InterfaceRegistry};
pub use keyword::Keyword;
pub use registry::{HandlerRegistry, Registration};

use std::collections::HashSet;

use crate::ast::BehaviourDescription;
use crate::error::{ErrorKind, MFrontError, Result};
use crate::hypothesis::ModellingHypothesis;
use crate::implicit::{NumericalParameters, Solver};
use crate::lexer;
use crate::token::{Token, TokenKind, Span};

/// Cursor over the token stream plus everything a keyword handler needs to
/// mutate (spec.md §5, "Scheduling model": a cursor advances monotonically;
/// a handler may look ahead arbitrarily far but must leave the cursor past
/// its terminator).
pub struct Parser {
    tokens: Vec<Token>,
    /// The original source text, kept so code blocks can be captured as a
    /// verbatim byte slice (spec.md §4.6, "the block text verbatim")
    /// rather than reconstructed from joined token lexemes, which would
    /// lose the author's original spacing and comments.
    source: String,
    pos: usize,
    pub description: BehaviourDescription,
    pub numerical: NumericalParameters,
    pub solver: Option<Solver>,
    /// `@NumericallyComputedJacobianBlocks { df<a>_dd<b>, ... }` — each
    /// entry is `(a, b)` after the `_dd` split (SPEC_FULL.md §2 supplement).
    pub numerically_computed_jacobian_blocks: Vec<(String, String)>,
    /// Hypotheses the *current* code block's `<...>` options restrict to;
    /// empty means "every hypothesis in use, including UNDEFINED".
    active_hypotheses: Vec<ModellingHypothesis>,
    current_keyword: String,
    current_line: u32,
    initialize_ids: HashSet<String>,
    postprocessing_ids: HashSet<String>,
    pub bricks: BrickRegistry,
    pub interfaces: InterfaceRegistry,
    /// Set by `@DSL` when it names one of the Isotropic Specialisations
    /// front-ends (spec.md §4.7); `@FlowRule` consults it.
    pub isotropic_variant: Option<crate::isotropic::IsotropicVariant>,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self> {
        let tokens = lexer::tokenize(source)?;
        Ok(Self {
            tokens,
            source: source.to_string(),
            pos: 0,
            description: BehaviourDescription::new("UnnamedBehaviour"),
            numerical: NumericalParameters::default(),
            solver: None,
            numerically_computed_jacobian_blocks: Vec::new(),
            active_hypotheses: Vec::new(),
            current_keyword: String::new(),
            current_line: 0,
            initialize_ids: HashSet::new(),
            postprocessing_ids: HashSet::new(),
            bricks: BrickRegistry::new(),
            interfaces: InterfaceRegistry::new(),
            isotropic_variant: None,
        })
    }

    pub fn with_parameter_overrides(mut self, overrides: &[(&str, f64)]) -> Self {
        for (name, value) in overrides {
            self.description.parameter_overrides.override_by_a_parameter(*name, *value);
        }
        self
    }

    // -- cursor primitives --------------------------------------------

    pub fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn is_eof(&self) -> bool {
        self.peek().is_eof()
    }

    pub fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        self.current_line = tok.span.line;
        tok
    }

    pub fn current_keyword_name(&self) -> &str {
        &self.current_keyword
    }

    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    fn syntax_error(&self, msg: impl Into<String>) -> MFrontError {
        let tok = self.peek();
        MFrontError::new(ErrorKind::Syntax(msg.into()), tok.span, "parser")
    }

    pub fn expect_punct(&mut self, p: &str) -> Result<()> {
        if self.peek().is_punct(p) {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax_error(format!("expected '{p}'")))
        }
    }

    pub fn accept_punct(&mut self, p: &str) -> bool {
        if self.peek().is_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect_semicolon(&mut self) -> Result<()> {
        self.expect_punct(";")
    }

    pub fn expect_identifier(&mut self) -> Result<String> {
        match &self.peek().kind {
            TokenKind::Identifier(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.syntax_error("expected an identifier")),
        }
    }

    pub fn expect_string(&mut self) -> Result<String> {
        match &self.peek().kind {
            TokenKind::StringLiteral(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.syntax_error("expected a string literal")),
        }
    }

    pub fn expect_number(&mut self) -> Result<f64> {
        let negative = self.accept_punct("-");
        match &self.peek().kind {
            TokenKind::Number(s) => {
                let s = s.clone();
                self.advance();
                let v: f64 = s.parse().map_err(|_| self.syntax_error(format!("invalid numeric literal '{s}'")))?;
                Ok(if negative { -v } else { v })
            }
            _ => Err(self.syntax_error("expected a number")),
        }
    }

    /// Reads a `{ ... }` span, tracking brace nesting, and returns the
    /// *verbatim* source text between the outer braces (spec.md §4.6: code
    /// blocks are embedded "verbatim", preserving the author's own spacing,
    /// line breaks and comments) rather than a lexeme-by-lexeme
    /// reconstruction, which would normalise away all of that.
    pub fn read_braced_block(&mut self) -> Result<(String, u32)> {
        let start_line = self.peek().span.line;
        self.expect_punct("{")?;
        let content_start = self.peek().span.start;
        let mut depth = 1;
        let content_end;
        loop {
            if self.is_eof() {
                return Err(self.syntax_error("unterminated code block"));
            }
            if self.peek().is_punct("{") {
                depth += 1;
            } else if self.peek().is_punct("}") {
                depth -= 1;
                if depth == 0 {
                    content_end = self.peek().span.start;
                    self.advance();
                    break;
                }
            }
            self.advance();
        }
        Ok((self.source[content_start..content_end].to_string(), start_line))
    }

    pub fn active_hypotheses(&self) -> &[ModellingHypothesis] {
        &self.active_hypotheses
    }

    pub fn set_active_hypotheses(&mut self, hypotheses: Vec<ModellingHypothesis>) {
        self.active_hypotheses = hypotheses;
    }

    /// The hypotheses a broadcast write should land on: `UNDEFINED` plus
    /// every hypothesis already in use, unless options narrowed it
    /// (spec.md §4.3, code-block options `<...>`).
    pub fn target_hypotheses(&self) -> Vec<ModellingHypothesis> {
        if !self.active_hypotheses.is_empty() {
            return self.active_hypotheses.clone();
        }
        vec![ModellingHypothesis::Undefined]
    }

    pub fn reserve_initialize_id(&mut self, id: &str, line: u32) -> Result<()> {
        if !self.initialize_ids.insert(id.to_string()) {
            return Err(MFrontError::new(
                ErrorKind::DuplicateDeclaration { name: format!("@Initialize<{id}>") },
                Span::new(0, 0, line),
                "@Initialize",
            ));
        }
        Ok(())
    }

    pub fn reserve_postprocessing_id(&mut self, id: &str, line: u32) -> Result<()> {
        if !self.postprocessing_ids.insert(id.to_string()) {
            return Err(MFrontError::new(
                ErrorKind::DuplicateDeclaration { name: format!("@PostProcessing<{id}>") },
                Span::new(0, 0, line),
                "@PostProcessing",
            ));
        }
        Ok(())
    }

    /// Top-level processing loop (spec.md §5, "Ordering guarantees"; §7,
    /// propagation policy). Dispatches every `@Keyword` in source order,
    /// running the consistency phases exactly once at end of file.
    pub fn process(&mut self, registry: &HandlerRegistry) -> Result<()> {
        loop {
            match &self.peek().kind {
                TokenKind::Eof => break,
                TokenKind::Comment(_) => {
                    self.advance();
                }
                TokenKind::Keyword(name) => {
                    let name = name.clone();
                    self.current_keyword = format!("@{name}");
                    let dispatch_name = format!("@{name}");
                    let keyword = Keyword::from_name(&name);
                    if keyword.is_some_and(Keyword::declares_variable)
                        && self.description.are_new_user_defined_variables_disabled()
                    {
                        let span = self.peek().span;
                        return Err(MFrontError::new(
                            ErrorKind::InconsistentDeclaration(
                                "no new user-defined variables may be declared after the first code block".to_string(),
                            ),
                            span,
                            "parser",
                        )
                        .prepend_keyword(&dispatch_name));
                    }
                    registry.dispatch(&dispatch_name, self).map_err(|e| e.prepend_keyword(&dispatch_name))?;
                    if keyword.is_some_and(Keyword::is_code_block) {
                        self.description.disable_new_user_defined_variables();
                    }
                }
                TokenKind::Identifier(name) => {
                    // `name.method(args);` — a variable-method-call statement,
                    // not itself a `@Keyword` (spec.md §4.3).
                    let name = name.clone();
                    self.advance();
                    handlers::apply_variable_method(self, &name)?;
                }
                _ => return Err(self.syntax_error("expected a keyword")),
            }
        }
        self.finish()
    }

    /// The two end-of-file consistency phases (spec.md §3, "Lifecycle";
    /// §5, "Ordering guarantees"): `completeVariableDeclaration` then
    /// `endsInputFileProcessing`, bricks' hooks interleaved per the
    /// REDESIGN FLAGS decision (hooks strictly before defaults-fixing).
    fn finish(&mut self) -> Result<()> {
        self.bricks.run_complete_variable_declaration(&mut self.description)?;
        self.complete_variable_declaration();
        self.bricks.run_end_treatment(&mut self.description)?;
        self.ends_input_file_processing();
        self.description.numerical = self.numerical;
        self.description.solver = self.solver;
        self.description.numerically_computed_jacobian_blocks =
            self.numerically_computed_jacobian_blocks.clone();
        Ok(())
    }

    /// Fixes defaults left implicit by the source: the umbrella's default
    /// tangent-operator block list, `UNDEFINED`'s reserved-name broadcast
    /// into hypotheses declared afterwards, etc.
    fn complete_variable_declaration(&mut self) {
        for hypothesis in ModellingHypothesis::ALL_CONCRETE {
            if !self.description.hypotheses_in_use().any(|h| *h == hypothesis) {
                continue;
            }
            let pairs = self.description.behaviour_data(hypothesis).main_variables.pairs.clone();
            let data = self.description.behaviour_data_mut(hypothesis);
            if data.tangent_operator_blocks.is_none() {
                data.tangent_operator_blocks =
                    Some(crate::ast::tangent::TangentOperatorBlocks::from_main_variables(&pairs));
            }
        }
    }

    /// `@UsableInPurelyImplicitResolution`'s implicit veto (spec.md §4.3):
    /// an external state variable declared but not consumed by the
    /// predictor marks the hypothesis not usable unless the flag was set
    /// explicitly.
    fn ends_input_file_processing(&mut self) {
        let hypotheses: Vec<ModellingHypothesis> = std::iter::once(ModellingHypothesis::Undefined)
            .chain(self.description.hypotheses_in_use().copied())
            .collect();
        for h in hypotheses {
            let data = self.description.behaviour_data(h);
            if data.flags.usable_in_purely_implicit_resolution_explicit {
                continue;
            }
            let predictor_source = data
                .code_blocks
                .get(&crate::ast::codeblock::CodeBlockKind::Predictor)
                .map(|b| b.source.as_str())
                .unwrap_or("");
            let esvs = data.variables(crate::ast::variable::VariableCategory::ExternalStateVariable);
            let all_used = esvs.iter().all(|v| predictor_source.contains(&v.name));
            self.description.behaviour_data_mut(h).flags.usable_in_purely_implicit_resolution = all_used;
        }
    }
}

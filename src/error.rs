//! Typed error model (spec.md §7).
//!
//! Every handler raises an [`MFrontError`] carrying the offending [`Span`],
//! which keyword handler raised it, and (once available) the source file.
//! The top-level processing loop re-wraps a handler's error with the
//! offending keyword and line prepended, matching spec.md's propagation
//! policy: fail fast, no silent swallowing, no retry.

use crate::token::Span;

#[derive(Debug, Clone)]
pub struct MFrontError {
    pub kind: ErrorKind,
    pub span: Span,
    pub handler: &'static str,
    pub file: Option<String>,
}

impl MFrontError {
    pub fn new(kind: ErrorKind, span: Span, handler: &'static str) -> Self {
        Self { kind, span, handler, file: None }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Re-raises this error with the offending keyword and line number
    /// prepended, as the top-level processing loop does on the way out of
    /// a failed handler (spec.md §7).
    pub fn prepend_keyword(mut self, keyword: &str) -> Self {
        self.kind = match self.kind {
            ErrorKind::Syntax(msg) => {
                ErrorKind::Syntax(format!("in {} (line {}): {}", keyword, self.span.line, msg))
            }
            other => other,
        };
        self
    }

    pub fn display_with_source(&self, source: &str) -> String {
        let (line_num, line_start, line_content) = find_context(source, self.span.start);
        let col = self.span.start.saturating_sub(line_start);
        let len = (self.span.end - self.span.start).max(1);
        let underline = format!("{}{}", " ".repeat(col), "^".repeat(len));
        format!(
            "error[{}]: {}\n  --> {}:{}\n   |\n{:4} | {}\n   | {}",
            self.handler,
            self.kind,
            self.file.as_deref().unwrap_or("<input>"),
            line_num,
            line_num,
            line_content,
            underline
        )
    }
}

impl std::fmt::Display for MFrontError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (handler: {}, line {})", self.kind, self.handler, self.span.line)
    }
}

impl std::error::Error for MFrontError {}

fn find_context(source: &str, pos: usize) -> (u32, usize, &str) {
    let mut line_num = 1u32;
    let mut line_start = 0usize;
    for (i, c) in source.char_indices() {
        if i >= pos {
            break;
        }
        if c == '\n' {
            line_num += 1;
            line_start = i + 1;
        }
    }
    let line_end = source[line_start..]
        .find('\n')
        .map(|off| line_start + off)
        .unwrap_or(source.len());
    (line_num, line_start, &source[line_start..line_end])
}

#[derive(Debug, Clone)]
pub enum ErrorKind {
    Syntax(String),
    InvalidName { name: String, reason: String },
    DuplicateDeclaration { name: String },
    UnknownEntity { kind: &'static str, name: String },
    InconsistentDeclaration(String),
    UnsupportedInHypothesis { operation: String, hypothesis: String },
    NumericalOutOfRange { parameter: String, value: String, constraint: &'static str },
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Syntax(msg) => write!(f, "syntax error: {msg}"),
            ErrorKind::InvalidName { name, reason } => {
                write!(f, "invalid name '{name}': {reason}")
            }
            ErrorKind::DuplicateDeclaration { name } => {
                write!(f, "'{name}' is already declared")
            }
            ErrorKind::UnknownEntity { kind, name } => {
                write!(f, "unknown {kind} '{name}'")
            }
            ErrorKind::InconsistentDeclaration(msg) => write!(f, "inconsistent declaration: {msg}"),
            ErrorKind::UnsupportedInHypothesis { operation, hypothesis } => write!(
                f,
                "'{operation}' is not supported in modelling hypothesis {hypothesis}"
            ),
            ErrorKind::NumericalOutOfRange { parameter, value, constraint } => write!(
                f,
                "'{parameter}' = {value} violates constraint: {constraint}"
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, MFrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_carries_span_and_handler() {
        let err = MFrontError::new(
            ErrorKind::DuplicateDeclaration { name: "young".into() },
            Span::new(10, 15, 3),
            "@Parameter",
        );
        assert_eq!(err.span.line, 3);
        assert_eq!(err.handler, "@Parameter");
    }

    #[test]
    fn display_with_source_shows_line_and_underline() {
        let err = MFrontError::new(
            ErrorKind::Syntax("unexpected token".into()),
            Span::new(4, 9, 1),
            "@Behaviour",
        )
        .with_file("test.mfront");
        let source = "name Elastic;";
        let display = err.display_with_source(source);
        assert!(display.contains("Elastic"));
        assert!(display.contains("^^^^^"));
        assert!(display.contains("test.mfront"));
    }

    #[test]
    fn prepend_keyword_decorates_syntax_errors() {
        let err = MFrontError::new(ErrorKind::Syntax("bad token".into()), Span::new(0, 1, 7), "@Gradient")
            .prepend_keyword("@Gradient");
        match err.kind {
            ErrorKind::Syntax(msg) => {
                assert!(msg.contains("@Gradient"));
                assert!(msg.contains("line 7"));
            }
            _ => panic!("expected Syntax"),
        }
    }

    #[test]
    fn non_syntax_errors_unaffected_by_prepend() {
        let err = MFrontError::new(
            ErrorKind::DuplicateDeclaration { name: "p".into() },
            Span::new(0, 1, 1),
            "@StateVariable",
        )
        .prepend_keyword("@StateVariable");
        assert!(matches!(err.kind, ErrorKind::DuplicateDeclaration { .. }));
    }
}

//! Call-back and hook registry (spec.md §4.2, "Invariants: exactly one
//! handler per registered keyword; a hook list per keyword fires *after*
//! the handler succeeds. Registration can be declared 'overridable'
//! (replace) or 'strict' (reject duplicates). Disabling a keyword replaces
//! its handler with one that raises a fixed error.").

use std::collections::HashMap;

use crate::error::{ErrorKind, MFrontError, Result};
use crate::token::Span;

use super::Parser;

pub type HandlerFn = fn(&mut Parser) -> Result<()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A later `register` with the same name silently replaces the
    /// previous handler.
    Overridable,
    /// A later `register` with the same name raises `DuplicateDeclaration`.
    Strict,
}

struct Entry {
    handler: HandlerFn,
    registration: Registration,
    disabled: bool,
}

/// Maps a keyword name to exactly one handler, plus the ordered list of
/// hooks that run after it succeeds.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: HashMap<String, Entry>,
    hooks: HashMap<String, Vec<HandlerFn>>,
}

fn disabled_handler(parser: &mut Parser) -> Result<()> {
    Err(MFrontError::new(
        ErrorKind::UnsupportedInHypothesis {
            operation: parser.current_keyword_name().to_string(),
            hypothesis: "any (keyword disabled)".to_string(),
        },
        Span::new(0, 0, parser.current_line()),
        "keyword-registry",
    ))
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: HandlerFn,
        registration: Registration,
    ) -> Result<()> {
        let name = name.into();
        if let Some(existing) = self.entries.get(&name) {
            if existing.registration == Registration::Strict {
                return Err(MFrontError::new(
                    ErrorKind::DuplicateDeclaration { name: name.clone() },
                    Span::new(0, 0, 0),
                    "keyword-registry",
                ));
            }
        }
        self.entries.insert(name, Entry { handler, registration, disabled: false });
        Ok(())
    }

    /// Replaces `name`'s handler with one that always raises a fixed error,
    /// without removing its registration (spec.md §4.2).
    pub fn disable(&mut self, name: &str) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.disabled = true;
        } else {
            self.entries.insert(
                name.to_string(),
                Entry { handler: disabled_handler, registration: Registration::Overridable, disabled: true },
            );
        }
    }

    pub fn add_hook(&mut self, name: impl Into<String>, hook: HandlerFn) {
        self.hooks.entry(name.into()).or_default().push(hook);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Every keyword currently registered (including disabled ones, which
    /// stay registered per spec.md §4.2), sorted for deterministic
    /// introspection output (SPEC_FULL.md §2 supplement,
    /// `getKeywordsList`-style enumeration).
    pub fn registered_keywords(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Runs the handler for `name`, then every hook registered against it,
    /// in registration order.
    pub fn dispatch(&self, name: &str, parser: &mut Parser) -> Result<()> {
        let entry = self.entries.get(name).ok_or_else(|| {
            MFrontError::new(
                ErrorKind::UnknownEntity { kind: "keyword", name: name.to_string() },
                Span::new(0, 0, parser.current_line()),
                "keyword-registry",
            )
        })?;
        let handler = if entry.disabled { disabled_handler } else { entry.handler };
        handler(parser)?;
        if let Some(hooks) = self.hooks.get(name) {
            for hook in hooks {
                hook(parser)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Parser) -> Result<()> {
        Ok(())
    }

    #[test]
    fn strict_registration_rejects_redeclaration() {
        let mut reg = HandlerRegistry::new();
        reg.register("@Foo", noop, Registration::Strict).unwrap();
        let err = reg.register("@Foo", noop, Registration::Strict).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::DuplicateDeclaration { .. }));
    }

    #[test]
    fn overridable_registration_allows_replace() {
        let mut reg = HandlerRegistry::new();
        reg.register("@Foo", noop, Registration::Overridable).unwrap();
        reg.register("@Foo", noop, Registration::Overridable).unwrap();
        assert!(reg.is_registered("@Foo"));
    }

    #[test]
    fn disabling_an_unregistered_keyword_still_marks_it_disabled() {
        let mut reg = HandlerRegistry::new();
        reg.disable("@Foo");
        assert!(reg.is_registered("@Foo"));
    }

    #[test]
    fn registered_keywords_are_sorted_and_include_disabled_ones() {
        let mut reg = HandlerRegistry::new();
        reg.register("@Zeta", noop, Registration::Strict).unwrap();
        reg.register("@Alpha", noop, Registration::Strict).unwrap();
        reg.disable("@Omega");
        assert_eq!(reg.registered_keywords(), vec!["@Alpha", "@Omega", "@Zeta"]);
    }
}

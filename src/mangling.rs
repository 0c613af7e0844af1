//! Unicode symbolic-name mangling (spec.md §4.2, §6).
//!
//! A variable's symbolic name may use unicode (`σ`, `ε`, `Δp`, …). Downstream
//! name lookups (member registration, reserved-name sets, C++ identifier
//! emission) must stay pure ASCII, so every unicode codepoint encountered in
//! a symbolic name is replaced by a stable ASCII placeholder; a reverse table
//! lets the emitter restore the original glyph when writing doc comments.
//!
//! Grounded on the teacher's `registry::SymbolRegistry`, which mangles a
//! word to a short deterministic code and remembers the mapping so repeated
//! lookups are stable.

use std::collections::HashMap;

pub struct SymbolMangler {
    forward: HashMap<char, String>,
    reverse: HashMap<String, char>,
    counters: HashMap<char, usize>,
}

impl SymbolMangler {
    pub fn new() -> Self {
        Self {
            forward: HashMap::new(),
            reverse: HashMap::new(),
            counters: HashMap::new(),
        }
    }

    /// Mangles a full identifier, replacing every non-ASCII codepoint with
    /// its placeholder while leaving ASCII codepoints untouched.
    pub fn mangle(&mut self, name: &str) -> String {
        let mut out = String::with_capacity(name.len());
        for c in name.chars() {
            if c.is_ascii() {
                out.push(c);
            } else {
                out.push_str(&self.mangle_char(c));
            }
        }
        out
    }

    fn mangle_char(&mut self, c: char) -> String {
        if let Some(existing) = self.forward.get(&c) {
            return existing.clone();
        }
        // `u03C3` style placeholder, deduplicated with a numeric suffix if a
        // prior distinct unicode char happened to produce the same base
        // (practically never, kept for determinism under hash-seed changes).
        let base = format!("u{:04X}", c as u32);
        let counter = self.counters.entry(c).or_insert(0);
        *counter += 1;
        let mangled = if self.reverse.contains_key(&base) {
            format!("{}_{}", base, counter)
        } else {
            base
        };
        self.forward.insert(c, mangled.clone());
        self.reverse.insert(mangled.clone(), c);
        mangled
    }

    /// Restores the original unicode glyph for a previously-mangled
    /// placeholder token, returning it unchanged if it was never mangled.
    pub fn unmangle(&self, placeholder: &str) -> String {
        if let Some(c) = self.reverse.get(placeholder) {
            return c.to_string();
        }
        placeholder.to_string()
    }
}

impl Default for SymbolMangler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_identifier_is_untouched() {
        let mut m = SymbolMangler::new();
        assert_eq!(m.mangle("eel"), "eel");
    }

    #[test]
    fn unicode_identifier_becomes_ascii() {
        let mut m = SymbolMangler::new();
        let mangled = m.mangle("σ");
        assert!(mangled.is_ascii());
        assert_ne!(mangled, "σ");
    }

    #[test]
    fn mangling_is_stable_across_calls() {
        let mut m = SymbolMangler::new();
        let first = m.mangle("εᵗᵒ");
        let second = m.mangle("εᵗᵒ");
        assert_eq!(first, second);
    }

    #[test]
    fn mixed_ascii_and_unicode_name() {
        let mut m = SymbolMangler::new();
        let mangled = m.mangle("Δp");
        assert!(mangled.starts_with('u') || mangled.is_ascii());
        assert!(mangled.is_ascii());
    }

    #[test]
    fn unmangle_round_trips() {
        let mut m = SymbolMangler::new();
        let mangled = m.mangle("σ");
        assert_eq!(m.unmangle(&mangled), "σ");
    }

    #[test]
    fn unmangle_unknown_placeholder_is_identity() {
        let m = SymbolMangler::new();
        assert_eq!(m.unmangle("not_mangled"), "not_mangled");
    }
}

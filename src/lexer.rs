//! Tokeniser (spec.md §4.2): a flat ordered token stream over UTF-8 source,
//! with line tracking and unicode-identifier mangling via [`crate::mangling`].

use crate::error::{ErrorKind, MFrontError, Result};
use crate::mangling::SymbolMangler;
use crate::token::{Span, Token, TokenFlag, TokenKind};

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    mangler: SymbolMangler,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, bytes: source.as_bytes(), pos: 0, line: 1, mangler: SymbolMangler::new() }
    }

    /// Consumes the source and returns the complete token stream, including
    /// a trailing [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let start = self.pos;
            let start_line = self.line;
            if self.pos >= self.bytes.len() {
                tokens.push(Token::new(TokenKind::Eof, Span::new(start, start, start_line), TokenFlag::Standard));
                break;
            }
            let c = self.current_char();
            let token = match c {
                '@' => self.read_keyword(start, start_line)?,
                '"' => self.read_string(start, start_line)?,
                '/' if self.peek_char(1) == Some('/') => self.read_line_comment(start, start_line),
                '/' if self.peek_char(1) == Some('*') => self.read_block_comment(start, start_line)?,
                c if c.is_ascii_digit() => self.read_number(start, start_line),
                c if is_ident_start(c) => self.read_identifier(start, start_line),
                _ => self.read_punctuation(start, start_line)?,
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn current_char(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    fn peek_char(&self, ahead: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(ahead)
    }

    fn advance_char(&mut self) -> char {
        let c = self.current_char();
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.current_char().is_whitespace() {
            self.advance_char();
        }
    }

    fn read_keyword(&mut self, start: usize, line: u32) -> Result<Token> {
        self.advance_char(); // '@'
        let name_start = self.pos;
        while self.pos < self.bytes.len() && is_ident_continue(self.current_char()) {
            self.advance_char();
        }
        if self.pos == name_start {
            return Err(MFrontError::new(
                ErrorKind::Syntax("expected a keyword name after '@'".into()),
                Span::new(start, self.pos, line),
                "lexer",
            ));
        }
        let name = self.source[name_start..self.pos].to_string();
        Ok(Token::new(TokenKind::Keyword(name), Span::new(start, self.pos, line), TokenFlag::Standard))
    }

    fn read_string(&mut self, start: usize, line: u32) -> Result<Token> {
        self.advance_char(); // opening quote
        let content_start = self.pos;
        loop {
            if self.pos >= self.bytes.len() {
                return Err(MFrontError::new(
                    ErrorKind::Syntax("unterminated string literal".into()),
                    Span::new(start, self.pos, line),
                    "lexer",
                ));
            }
            let c = self.current_char();
            if c == '"' {
                break;
            }
            if c == '\\' {
                self.advance_char();
            }
            self.advance_char();
        }
        let content = self.source[content_start..self.pos].to_string();
        self.advance_char(); // closing quote
        Ok(Token::new(TokenKind::StringLiteral(content), Span::new(start, self.pos, line), TokenFlag::String))
    }

    fn read_line_comment(&mut self, start: usize, line: u32) -> Token {
        while self.pos < self.bytes.len() && self.current_char() != '\n' {
            self.advance_char();
        }
        let text = self.source[start..self.pos].to_string();
        Token::new(TokenKind::Comment(text), Span::new(start, self.pos, line), TokenFlag::Standard)
    }

    fn read_block_comment(&mut self, start: usize, line: u32) -> Result<Token> {
        self.advance_char();
        self.advance_char();
        loop {
            if self.pos >= self.bytes.len() {
                return Err(MFrontError::new(
                    ErrorKind::Syntax("unterminated block comment".into()),
                    Span::new(start, self.pos, line),
                    "lexer",
                ));
            }
            if self.current_char() == '*' && self.peek_char(1) == Some('/') {
                self.advance_char();
                self.advance_char();
                break;
            }
            self.advance_char();
        }
        let text = self.source[start..self.pos].to_string();
        Ok(Token::new(TokenKind::Comment(text), Span::new(start, self.pos, line), TokenFlag::Standard))
    }

    fn read_number(&mut self, start: usize, line: u32) -> Token {
        while self.pos < self.bytes.len()
            && (self.current_char().is_ascii_digit()
                || self.current_char() == '.'
                || self.current_char() == 'e'
                || self.current_char() == 'E'
                || ((self.current_char() == '+' || self.current_char() == '-')
                    && matches!(self.source.as_bytes().get(self.pos.wrapping_sub(1)), Some(b'e') | Some(b'E'))))
        {
            self.advance_char();
        }
        let text = self.source[start..self.pos].to_string();
        Token::new(TokenKind::Number(text), Span::new(start, self.pos, line), TokenFlag::Standard)
    }

    fn read_identifier(&mut self, start: usize, line: u32) -> Token {
        while self.pos < self.bytes.len() && is_ident_continue(self.current_char()) {
            self.advance_char();
        }
        let raw = &self.source[start..self.pos];
        let mangled = if raw.is_ascii() { raw.to_string() } else { self.mangler.mangle(raw) };
        Token::new(TokenKind::Identifier(mangled), Span::new(start, self.pos, line), TokenFlag::Standard)
    }

    fn read_punctuation(&mut self, start: usize, line: u32) -> Result<Token> {
        const TWO_CHAR: &[&str] = &["::", "<=", ">=", "=="];
        for op in TWO_CHAR {
            if self.source[self.pos..].starts_with(op) {
                self.advance_char();
                self.advance_char();
                return Ok(Token::new(
                    TokenKind::Punctuation((*op).to_string()),
                    Span::new(start, self.pos, line),
                    TokenFlag::Standard,
                ));
            }
        }
        let c = self.advance_char();
        if "{}()[];,.<>=:+-*/&|!".contains(c) {
            Ok(Token::new(
                TokenKind::Punctuation(c.to_string()),
                Span::new(start, self.pos, line),
                TokenFlag::Standard,
            ))
        } else {
            Err(MFrontError::new(
                ErrorKind::Syntax(format!("unexpected character '{c}'")),
                Span::new(start, self.pos, line),
                "lexer",
            ))
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Convenience wrapper mirroring the original's `analyseString` entry point.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_keyword_and_identifier() {
        let tokens = tokenize("@Behaviour Elastic;").unwrap();
        assert!(tokens[0].is_keyword("Behaviour"));
        assert!(matches!(&tokens[1].kind, TokenKind::Identifier(s) if s == "Elastic"));
        assert!(tokens[2].is_punct(";"));
        assert!(tokens[3].is_eof());
    }

    #[test]
    fn tokenizes_string_literal() {
        let tokens = tokenize(r#"young.setGlossaryName("YoungModulus");"#).unwrap();
        let has_string = tokens.iter().any(|t| matches!(&t.kind, TokenKind::StringLiteral(s) if s == "YoungModulus"));
        assert!(has_string);
    }

    #[test]
    fn tokenizes_number_with_exponent() {
        let tokens = tokenize("210e9").unwrap();
        assert!(matches!(&tokens[0].kind, TokenKind::Number(s) if s == "210e9"));
    }

    #[test]
    fn skips_line_and_block_comments() {
        let tokens = tokenize("// hi\n/* block */ @Author foo;").unwrap();
        let comments: Vec<_> = tokens.iter().filter(|t| matches!(t.kind, TokenKind::Comment(_))).collect();
        assert_eq!(comments.len(), 2);
    }

    #[test]
    fn mangles_unicode_identifier() {
        let tokens = tokenize("σeq").unwrap();
        match &tokens[0].kind {
            TokenKind::Identifier(s) => assert!(s.is_ascii()),
            other => panic!("expected identifier, got {other:?}"),
        }
    }

    #[test]
    fn tracks_line_numbers() {
        let tokens = tokenize("@A x;\n@B y;").unwrap();
        let b_tok = tokens.iter().find(|t| t.is_keyword("B")).unwrap();
        assert_eq!(b_tok.span.line, 2);
    }

    #[test]
    fn unterminated_string_is_syntax_error() {
        let err = tokenize(r#""abc"#).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Syntax(_)));
    }

    #[test]
    fn empty_at_sign_is_syntax_error() {
        let err = tokenize("@ ;").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Syntax(_)));
    }
}

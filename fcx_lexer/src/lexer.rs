//! Streaming, registry-driven lexer: text -> token stream.
//!
//! Every symbolic operator is resolved through [`fcx_registry::Registry`]'s
//! greedy longest-match trie rather than a hand-enumerated match arm per
//! symbol, so adding an operator to the registry is enough to make it
//! lexable. A sticky had-error flag lets the driver decide whether to run
//! later stages after a lex pass that recovered from errors.

use crate::token::{BigIntLiteral, Token, TokenKind, KEYWORDS};
use fcx_common::{FcxError, Position, Span, Spanned};
use fcx_registry::Registry;

pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    position: Position,
    file_id: u32,
    registry: &'static Registry,
    had_error: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, file_id: u32) -> Self {
        Lexer {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            position: Position::start(),
            file_id,
            registry: Registry::global(),
            had_error: false,
        }
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn tokenize(mut self) -> (Vec<Token>, bool) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = matches!(token.value, TokenKind::EndOfFile);
            tokens.push(token);
            if done {
                break;
            }
        }
        (tokens, self.had_error)
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance_char(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.position = Position::new(self.position.line + 1, 1, self.position.offset + ch.len_utf8() as u32);
        } else {
            self.position = Position::new(self.position.line, self.position.column + 1, self.position.offset + ch.len_utf8() as u32);
        }
        Some(ch)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance_char();
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                    while !matches!(self.peek_byte(), None | Some(b'\n')) {
                        self.advance_char();
                    }
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'*') => {
                    self.advance_char();
                    self.advance_char();
                    while !(self.peek_byte().is_none() || (self.peek_byte() == Some(b'*') && self.bytes.get(self.pos + 1) == Some(&b'/'))) {
                        self.advance_char();
                    }
                    self.advance_char();
                    self.advance_char();
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let start_pos = self.position;
        let start_offset = self.pos;

        let Some(ch) = self.current_char() else {
            return Spanned::new(TokenKind::EndOfFile, Span::single(start_pos, self.file_id));
        };

        // Try the operator registry first: any registered symbol, greedy
        // longest-match, wins over identifier/punctuation scanning.
        if let Some((descriptor, len)) = self.registry.longest_match(&self.bytes[start_offset..]) {
            for _ in 0..descriptor.symbol.chars().count() {
                self.advance_char();
            }
            debug_assert_eq!(self.pos, start_offset + len);
            let span = Span::new(start_pos, self.position, self.file_id);
            return Spanned::new(TokenKind::Operator(descriptor.kind, descriptor.symbol.to_string()), span);
        }

        let kind = if ch.is_ascii_digit() {
            self.scan_number()
        } else if ch == '"' {
            self.scan_string()
        } else if ch == '\'' {
            self.scan_char()
        } else if is_ident_start(ch) {
            self.scan_identifier()
        } else {
            match ch {
                '(' => {
                    self.advance_char();
                    TokenKind::LeftParen
                }
                ')' => {
                    self.advance_char();
                    TokenKind::RightParen
                }
                '{' => {
                    self.advance_char();
                    TokenKind::LeftBrace
                }
                '}' => {
                    self.advance_char();
                    TokenKind::RightBrace
                }
                '[' => {
                    self.advance_char();
                    TokenKind::LeftBracket
                }
                ']' => {
                    self.advance_char();
                    TokenKind::RightBracket
                }
                ';' => {
                    self.advance_char();
                    TokenKind::Semicolon
                }
                ':' => {
                    self.advance_char();
                    TokenKind::Colon
                }
                _ => self.scan_unknown(),
            }
        };

        let span = Span::new(start_pos, self.position, self.file_id);
        Spanned::new(kind, span)
    }

    fn scan_unknown(&mut self) -> TokenKind {
        self.had_error = true;
        let start = self.pos;
        // Consume up to the registry's scan cap so the suggestion list has
        // something meaningful to compare against.
        while self.pos - start < fcx_registry::MAX_OPERATOR_SCAN_LEN && self.current_char().is_some_and(|c| !c.is_whitespace() && !is_ident_start(c) && !c.is_ascii_digit()) {
            self.advance_char();
        }
        if self.pos == start {
            self.advance_char();
        }
        let text = self.input[start..self.pos].to_string();
        let suggestions = self.registry.suggest(&text).into_iter().map(String::from).collect();
        TokenKind::Error { text, suggestions }
    }

    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while self.current_char().is_some_and(is_ident_continue) {
            self.advance_char();
        }
        let text = &self.input[start..self.pos];
        if text == "true" {
            TokenKind::BoolLiteral(true)
        } else if text == "false" {
            TokenKind::BoolLiteral(false)
        } else if KEYWORDS.contains(&text) {
            TokenKind::Keyword(text.to_string())
        } else {
            TokenKind::Identifier(text.to_string())
        }
    }

    fn scan_number(&mut self) -> TokenKind {
        let radix = if self.peek_byte() == Some(b'0') {
            match self.bytes.get(self.pos + 1) {
                Some(b'x') | Some(b'X') => Some(16),
                Some(b'o') | Some(b'O') => Some(8),
                Some(b'b') | Some(b'B') => Some(2),
                _ => None,
            }
        } else {
            None
        };

        if let Some(radix) = radix {
            self.advance_char();
            self.advance_char();
            return self.scan_radix_integer(radix);
        }

        let start = self.pos;
        while self.current_char().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.advance_char();
        }

        let mut is_float = false;
        if self.peek_byte() == Some(b'.') && self.bytes.get(self.pos + 1).is_some_and(|b| b.is_ascii_digit()) {
            is_float = true;
            self.advance_char();
            while self.current_char().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                self.advance_char();
            }
        }
        if matches!(self.peek_byte(), Some(b'e') | Some(b'E')) {
            is_float = true;
            self.advance_char();
            if matches!(self.peek_byte(), Some(b'+') | Some(b'-')) {
                self.advance_char();
            }
            while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance_char();
            }
        }

        let text: String = self.input[start..self.pos].chars().filter(|&c| c != '_').collect();
        if is_float {
            TokenKind::FloatLiteral(text.parse().unwrap_or(0.0))
        } else {
            TokenKind::IntLiteral(accumulate_decimal(&text))
        }
    }

    fn scan_radix_integer(&mut self, radix: u32) -> TokenKind {
        let start = self.pos;
        while self.current_char().is_some_and(|c| c.is_digit(radix) || c == '_') {
            self.advance_char();
        }
        let text: String = self.input[start..self.pos].chars().filter(|&c| c != '_').collect();
        TokenKind::IntLiteral(accumulate_radix(&text, radix))
    }

    /// Two-pass string scan: pass one walks to the closing quote, tracking
    /// escape-skip so it does not stop on an escaped `"`; pass two decodes
    /// the escapes it skipped over into the literal's actual text.
    fn scan_string(&mut self) -> TokenKind {
        self.advance_char(); // opening quote
        let raw_start = self.pos;
        let mut terminated = false;
        while let Some(c) = self.current_char() {
            if c == '\\' {
                self.advance_char();
                self.advance_char();
                continue;
            }
            if c == '"' {
                terminated = true;
                break;
            }
            self.advance_char();
        }
        let raw = &self.input[raw_start..self.pos];
        if terminated {
            self.advance_char(); // closing quote
        } else {
            self.had_error = true;
        }
        TokenKind::StringLiteral(decode_escapes(raw))
    }

    fn scan_char(&mut self) -> TokenKind {
        self.advance_char(); // opening quote
        let value = match self.current_char() {
            Some('\\') => {
                self.advance_char();
                decode_single_escape(self)
            }
            Some(c) => {
                self.advance_char();
                c
            }
            None => {
                self.had_error = true;
                '\0'
            }
        };
        if self.peek_byte() == Some(b'\'') {
            self.advance_char();
        } else {
            self.had_error = true;
        }
        TokenKind::CharLiteral(value)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn accumulate_decimal(digits: &str) -> BigIntLiteral {
    accumulate_radix(digits, 10)
}

fn accumulate_radix(digits: &str, radix: u32) -> BigIntLiteral {
    let mut limbs: Vec<u64> = vec![0];
    let mut overflowed = false;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else { continue };
        let mut carry = digit as u128;
        for limb in limbs.iter_mut() {
            let product = (*limb as u128) * radix as u128 + carry;
            *limb = product as u64;
            carry = product >> 64;
        }
        while carry > 0 {
            if limbs.len() >= BigIntLiteral::MAX_LIMBS {
                // Saturate rather than panic; the parser reports overflow
                // against the literal's span using the `overflowed` flag.
                overflowed = true;
                break;
            }
            limbs.push(carry as u64);
            carry >>= 64;
        }
    }
    while limbs.len() > 1 && *limbs.last().unwrap() == 0 {
        limbs.pop();
    }
    BigIntLiteral { limbs, overflowed }
}

fn decode_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn decode_single_escape(lexer: &mut Lexer) -> char {
    match lexer.current_char() {
        Some('n') => {
            lexer.advance_char();
            '\n'
        }
        Some('t') => {
            lexer.advance_char();
            '\t'
        }
        Some('r') => {
            lexer.advance_char();
            '\r'
        }
        Some('0') => {
            lexer.advance_char();
            '\0'
        }
        Some(c) => {
            lexer.advance_char();
            c
        }
        None => '\0',
    }
}

/// Convenience entry point returning a recoverable `FcxError` list instead
/// of the sticky-flag form, for call sites that want `Result`-style handling.
pub fn lex(input: &str, file_id: u32) -> Result<Vec<Token>, Vec<FcxError>> {
    let (tokens, had_error) = Lexer::new(input, file_id).tokenize();
    if !had_error {
        return Ok(tokens);
    }
    let errors = tokens
        .iter()
        .filter_map(|t| match &t.value {
            TokenKind::Error { text, suggestions } => Some(FcxError::lex_with_suggestions(format!("unrecognized token `{text}`"), t.span, suggestions.clone())),
            _ => None,
        })
        .collect();
    Err(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let (tokens, _) = Lexer::new(src, 0).tokenize();
        tokens.into_iter().map(|t| t.value).collect()
    }

    #[test]
    fn greedy_match_prefers_longest_operator() {
        let kinds = kinds("<<<=");
        assert!(matches!(&kinds[0], TokenKind::Operator(_, s) if s == "<<<="));
    }

    #[test]
    fn named_operator_forms_lex_as_operators_not_identifiers() {
        let kinds = kinds("mem64>");
        assert!(matches!(&kinds[0], TokenKind::Operator(_, s) if s == "mem64>"));
    }

    #[test]
    fn identifier_that_shares_a_prefix_with_an_operator_still_lexes_whole() {
        let kinds = kinds("memory");
        assert!(matches!(&kinds[0], TokenKind::Identifier(s) if s == "memory"));
    }

    #[test]
    fn keywords_are_distinguished_from_identifiers() {
        let kinds = kinds("fn foo");
        assert!(matches!(kinds[0], TokenKind::Keyword(ref s) if s == "fn"));
        assert!(matches!(kinds[1], TokenKind::Identifier(ref s) if s == "foo"));
    }

    #[test]
    fn decimal_integer_round_trips_through_limbs() {
        let kinds = kinds("12345");
        match &kinds[0] {
            TokenKind::IntLiteral(big) => assert_eq!(big.limbs, vec![12345]),
            other => panic!("expected int literal, got {other:?}"),
        }
    }

    #[test]
    fn big_integer_literal_spans_multiple_limbs() {
        let huge = "1".repeat(30);
        let kinds = kinds(&huge);
        match &kinds[0] {
            TokenKind::IntLiteral(big) => assert!(big.limbs.len() > 1),
            other => panic!("expected int literal, got {other:?}"),
        }
    }

    #[test]
    fn hex_literal_parses() {
        let kinds = kinds("0xFF");
        match &kinds[0] {
            TokenKind::IntLiteral(big) => assert_eq!(big.limbs, vec![255]),
            other => panic!("expected int literal, got {other:?}"),
        }
    }

    #[test]
    fn float_literal_parses() {
        let kinds = kinds("3.5");
        assert!(matches!(kinds[0], TokenKind::FloatLiteral(v) if (v - 3.5).abs() < f64::EPSILON));
    }

    #[test]
    fn string_literal_decodes_escapes() {
        let kinds = kinds(r#""a\nb""#);
        assert!(matches!(&kinds[0], TokenKind::StringLiteral(s) if s == "a\nb"));
    }

    #[test]
    fn unterminated_string_sets_had_error() {
        let (_, had_error) = Lexer::new("\"abc", 0).tokenize();
        assert!(had_error);
    }

    #[test]
    fn unknown_symbol_reports_suggestions() {
        let kinds = kinds("`");
        match &kinds[0] {
            TokenKind::Error { .. } => {}
            other => panic!("expected error token, got {other:?}"),
        }
    }

    #[test]
    fn line_comments_are_skipped() {
        let kinds = kinds("// hello\n1");
        assert!(matches!(kinds[0], TokenKind::IntLiteral(_)));
    }

    #[test]
    fn block_comments_are_skipped() {
        let kinds = kinds("/* hi */1");
        assert!(matches!(kinds[0], TokenKind::IntLiteral(_)));
    }
}

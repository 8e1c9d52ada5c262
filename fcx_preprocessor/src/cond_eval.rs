//! Constant-expression evaluator for `#if`/`#elif`, following the C
//! preprocessor's 13-level precedence ladder: ternary, logical-or,
//! logical-and, bitwise-or, bitwise-xor, bitwise-and, equality, relational,
//! shift, additive, multiplicative, unary, primary.

use fcx_common::{FcxError, Span};

pub struct CondEvaluator<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
    span: Span,
}

impl<'a> CondEvaluator<'a> {
    pub fn evaluate(expr: &'a str, span: Span, is_defined: impl Fn(&str) -> bool) -> Result<i64, FcxError> {
        let expr = substitute_defined(expr, &is_defined);
        let mut evaluator = CondEvaluator { tokens: tokenize(&expr), pos: 0, span };
        let value = evaluator.parse_ternary()?;
        if evaluator.pos != evaluator.tokens.len() {
            return Err(FcxError::preprocessor(
                format!("trailing tokens in constant expression: {:?}", &evaluator.tokens[evaluator.pos..]),
                span,
            ));
        }
        Ok(value)
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<&'a str> {
        let t = self.tokens.get(self.pos).copied();
        self.pos += 1;
        t
    }

    fn parse_ternary(&mut self) -> Result<i64, FcxError> {
        let cond = self.parse_logical_or()?;
        if self.peek() == Some("?") {
            self.next();
            let then_val = self.parse_ternary()?;
            if self.next() != Some(":") {
                return Err(FcxError::preprocessor("expected `:` in ternary expression", self.span));
            }
            let else_val = self.parse_ternary()?;
            Ok(if cond != 0 { then_val } else { else_val })
        } else {
            Ok(cond)
        }
    }

    fn parse_logical_or(&mut self) -> Result<i64, FcxError> {
        let mut left = self.parse_logical_and()?;
        while self.peek() == Some("||") {
            self.next();
            let right = self.parse_logical_and()?;
            left = ((left != 0) || (right != 0)) as i64;
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<i64, FcxError> {
        let mut left = self.parse_bitor()?;
        while self.peek() == Some("&&") {
            self.next();
            let right = self.parse_bitor()?;
            left = ((left != 0) && (right != 0)) as i64;
        }
        Ok(left)
    }

    fn parse_bitor(&mut self) -> Result<i64, FcxError> {
        let mut left = self.parse_bitxor()?;
        while self.peek() == Some("|") {
            self.next();
            left |= self.parse_bitxor()?;
        }
        Ok(left)
    }

    fn parse_bitxor(&mut self) -> Result<i64, FcxError> {
        let mut left = self.parse_bitand()?;
        while self.peek() == Some("^") {
            self.next();
            left ^= self.parse_bitand()?;
        }
        Ok(left)
    }

    fn parse_bitand(&mut self) -> Result<i64, FcxError> {
        let mut left = self.parse_equality()?;
        while self.peek() == Some("&") {
            self.next();
            left &= self.parse_equality()?;
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<i64, FcxError> {
        let mut left = self.parse_relational()?;
        loop {
            match self.peek() {
                Some("==") => {
                    self.next();
                    left = (left == self.parse_relational()?) as i64;
                }
                Some("!=") => {
                    self.next();
                    left = (left != self.parse_relational()?) as i64;
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_relational(&mut self) -> Result<i64, FcxError> {
        let mut left = self.parse_shift()?;
        loop {
            match self.peek() {
                Some("<") => {
                    self.next();
                    left = (left < self.parse_shift()?) as i64;
                }
                Some("<=") => {
                    self.next();
                    left = (left <= self.parse_shift()?) as i64;
                }
                Some(">") => {
                    self.next();
                    left = (left > self.parse_shift()?) as i64;
                }
                Some(">=") => {
                    self.next();
                    left = (left >= self.parse_shift()?) as i64;
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_shift(&mut self) -> Result<i64, FcxError> {
        let mut left = self.parse_additive()?;
        loop {
            match self.peek() {
                Some("<<") => {
                    self.next();
                    left <<= self.parse_additive()?;
                }
                Some(">>") => {
                    self.next();
                    left >>= self.parse_additive()?;
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_additive(&mut self) -> Result<i64, FcxError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            match self.peek() {
                Some("+") => {
                    self.next();
                    left += self.parse_multiplicative()?;
                }
                Some("-") => {
                    self.next();
                    left -= self.parse_multiplicative()?;
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_multiplicative(&mut self) -> Result<i64, FcxError> {
        let mut left = self.parse_unary()?;
        loop {
            match self.peek() {
                Some("*") => {
                    self.next();
                    left *= self.parse_unary()?;
                }
                Some("/") => {
                    self.next();
                    let rhs = self.parse_unary()?;
                    // Division by zero yields 0 rather than erroring, so a
                    // `#if` guard can divide by a macro that might be zero
                    // without taking the whole compilation down.
                    left = if rhs == 0 { 0 } else { left / rhs };
                }
                Some("%") => {
                    self.next();
                    let rhs = self.parse_unary()?;
                    left = if rhs == 0 { 0 } else { left % rhs };
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_unary(&mut self) -> Result<i64, FcxError> {
        match self.peek() {
            Some("!") => {
                self.next();
                Ok((self.parse_unary()? == 0) as i64)
            }
            Some("~") => {
                self.next();
                Ok(!self.parse_unary()?)
            }
            Some("-") => {
                self.next();
                Ok(-self.parse_unary()?)
            }
            Some("+") => {
                self.next();
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<i64, FcxError> {
        match self.next() {
            Some("(") => {
                let value = self.parse_ternary()?;
                if self.next() != Some(")") {
                    return Err(FcxError::preprocessor("expected `)`", self.span));
                }
                Ok(value)
            }
            Some(token) => parse_literal(token, self.span),
            None => Err(FcxError::preprocessor("unexpected end of constant expression", self.span)),
        }
    }
}

/// Parses a numeric or char-literal token into its `i64` value: decimal,
/// `0x`/`0X` hex, `0o`/`0O` octal, `0b`/`0B` binary, or a single-quoted char
/// literal with the lexer's own escape set.
fn parse_literal(token: &str, span: Span) -> Result<i64, FcxError> {
    if let Some(digits) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        return i64::from_str_radix(digits, 16).map_err(|_| invalid_literal(token, span));
    }
    if let Some(digits) = token.strip_prefix("0o").or_else(|| token.strip_prefix("0O")) {
        return i64::from_str_radix(digits, 8).map_err(|_| invalid_literal(token, span));
    }
    if let Some(digits) = token.strip_prefix("0b").or_else(|| token.strip_prefix("0B")) {
        return i64::from_str_radix(digits, 2).map_err(|_| invalid_literal(token, span));
    }
    if token.starts_with('\'') && token.ends_with('\'') && token.len() >= 3 {
        return parse_char_literal(token, span);
    }
    token.parse::<i64>().map_err(|_| invalid_literal(token, span))
}

fn parse_char_literal(token: &str, span: Span) -> Result<i64, FcxError> {
    let inner = &token[1..token.len() - 1];
    let ch = if let Some(escape) = inner.strip_prefix('\\') {
        match escape.chars().next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some('\\') => '\\',
            Some('\'') => '\'',
            _ => return Err(invalid_literal(token, span)),
        }
    } else {
        inner.chars().next().ok_or_else(|| invalid_literal(token, span))?
    };
    Ok(ch as i64)
}

fn invalid_literal(token: &str, span: Span) -> FcxError {
    FcxError::preprocessor(format!("expected a number, found `{token}`"), span)
}

/// Replaces `defined(NAME)` and `defined NAME` with `1`/`0` before tokenizing.
fn substitute_defined(expr: &str, is_defined: &impl Fn(&str) -> bool) -> String {
    let mut out = String::with_capacity(expr.len());
    let bytes = expr.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if expr[i..].starts_with("defined") {
            let mut j = i + "defined".len();
            while j < bytes.len() && bytes[j] == b' ' {
                j += 1;
            }
            let (name, after) = if j < bytes.len() && bytes[j] == b'(' {
                let close = expr[j..].find(')').map(|k| j + k);
                match close {
                    Some(close) => (expr[j + 1..close].trim(), close + 1),
                    None => (&expr[j..j], j),
                }
            } else {
                let end = expr[j..]
                    .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                    .map(|k| j + k)
                    .unwrap_or(expr.len());
                (&expr[j..end], end)
            };
            out.push_str(if is_defined(name) { "1" } else { "0" });
            i = after;
        } else {
            out.push(expr.as_bytes()[i] as char);
            i += 1;
        }
    }
    out
}

fn tokenize(expr: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let bytes = expr.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c.is_ascii_digit() {
            let start = i;
            let prefixed_radix = c == '0' && matches!(bytes.get(i + 1).map(|b| *b as char), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'));
            if prefixed_radix {
                i += 2;
                while i < bytes.len() && (bytes[i] as char).is_ascii_alphanumeric() {
                    i += 1;
                }
            } else {
                while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                    i += 1;
                }
            }
            tokens.push(&expr[start..i]);
            continue;
        }
        if c == '\'' {
            let start = i;
            i += 1;
            if bytes.get(i).copied() == Some(b'\\') {
                i += 1;
            }
            if i < bytes.len() {
                i += 1;
            }
            if bytes.get(i).copied() == Some(b'\'') {
                i += 1;
            }
            tokens.push(&expr[start..i]);
            continue;
        }
        let two = if i + 2 <= bytes.len() { &expr[i..i + 2] } else { "" };
        if matches!(two, "&&" | "||" | "==" | "!=" | "<=" | ">=" | "<<" | ">>") {
            tokens.push(two);
            i += 2;
            continue;
        }
        tokens.push(&expr[i..i + 1]);
        i += 1;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcx_common::Position;

    fn span() -> Span {
        Span::single(Position::start(), 0)
    }

    fn eval(expr: &str) -> i64 {
        CondEvaluator::evaluate(expr, span(), |_| false).unwrap()
    }

    #[test]
    fn precedence_matches_c_rules() {
        assert_eq!(eval("1 + 2 * 3"), 7);
        assert_eq!(eval("(1 + 2) * 3"), 9);
        assert_eq!(eval("1 << 2 + 1"), 8);
        assert_eq!(eval("1 == 1 && 2 == 2"), 1);
        assert_eq!(eval("0 || 1 && 0"), 0);
        assert_eq!(eval("1 ? 2 : 3"), 2);
        assert_eq!(eval("0 ? 2 : 3"), 3);
    }

    #[test]
    fn defined_resolves_against_the_macro_table() {
        let value = CondEvaluator::evaluate("defined(FOO)", span(), |name| name == "FOO").unwrap();
        assert_eq!(value, 1);
    }

    #[test]
    fn division_by_zero_yields_zero() {
        assert_eq!(eval("1 / 0"), 0);
        assert_eq!(eval("1 % 0"), 0);
    }

    #[test]
    fn hex_octal_and_binary_literals_are_recognized() {
        assert_eq!(eval("0xFF"), 255);
        assert_eq!(eval("0o17"), 15);
        assert_eq!(eval("0b1010"), 10);
    }

    #[test]
    fn char_literals_evaluate_to_their_code_point() {
        assert_eq!(eval("'A'"), 65);
        assert_eq!(eval("'\\n'"), 10);
    }
}

//! Directive line syntax: the shape of a single `#...` line once its leading
//! `#` and keyword have been recognized. Parsing a directive never looks
//! past its own line.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Include { path: String, is_system: bool },
    Define { name: String, params: Option<Vec<String>>, body: String },
    Undef { name: String },
    If { expr: String },
    Elif { expr: String },
    Else,
    Endif,
    Ifdef { name: String },
    Ifndef { name: String },
    PragmaOnce,
    Error { message: String },
    Warning { message: String },
}

impl Directive {
    /// Parses the text following a recognized `#` on a line (the keyword and
    /// everything after it, already trimmed of leading whitespace).
    pub fn parse(line: &str) -> Option<Directive> {
        let line = line.trim_start();
        let (keyword, rest) = split_keyword(line);
        let rest = rest.trim();
        match keyword {
            "include" => parse_include(rest),
            "define" => parse_define(rest),
            "undef" => Some(Directive::Undef { name: rest.to_string() }),
            "if" => Some(Directive::If { expr: rest.to_string() }),
            "elif" => Some(Directive::Elif { expr: rest.to_string() }),
            "else" => Some(Directive::Else),
            "endif" => Some(Directive::Endif),
            "ifdef" => Some(Directive::Ifdef { name: rest.to_string() }),
            "ifndef" => Some(Directive::Ifndef { name: rest.to_string() }),
            "pragma" if rest == "once" => Some(Directive::PragmaOnce),
            "error" => Some(Directive::Error { message: rest.to_string() }),
            "warning" => Some(Directive::Warning { message: rest.to_string() }),
            _ => None,
        }
    }
}

fn split_keyword(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(idx) => (&line[..idx], &line[idx..]),
        None => (line, ""),
    }
}

fn parse_include(rest: &str) -> Option<Directive> {
    let rest = rest.trim();
    if let Some(inner) = rest.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return Some(Directive::Include { path: inner.to_string(), is_system: false });
    }
    if let Some(inner) = rest.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        return Some(Directive::Include { path: inner.to_string(), is_system: true });
    }
    None
}

fn parse_define(rest: &str) -> Option<Directive> {
    let rest = rest.trim_start();
    let name_end = rest
        .find(|c: char| c == '(' || c.is_whitespace())
        .unwrap_or(rest.len());
    let name = rest[..name_end].to_string();
    if name.is_empty() {
        return None;
    }
    let after_name = &rest[name_end..];
    if let Some(after_paren) = after_name.strip_prefix('(') {
        let close = after_paren.find(')')?;
        let params: Vec<String> = after_paren[..close]
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        let body = after_paren[close + 1..].trim().to_string();
        Some(Directive::Define { name, params: Some(params), body })
    } else {
        Some(Directive::Define { name, params: None, body: after_name.trim().to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_include() {
        assert_eq!(
            Directive::parse(r#"include "foo.fcx""#),
            Some(Directive::Include { path: "foo.fcx".to_string(), is_system: false })
        );
    }

    #[test]
    fn parses_system_include() {
        assert_eq!(
            Directive::parse("include <stdio.fcx>"),
            Some(Directive::Include { path: "stdio.fcx".to_string(), is_system: true })
        );
    }

    #[test]
    fn parses_object_like_define() {
        assert_eq!(
            Directive::parse("define MAX 64"),
            Some(Directive::Define { name: "MAX".to_string(), params: None, body: "64".to_string() })
        );
    }

    #[test]
    fn parses_function_like_define() {
        assert_eq!(
            Directive::parse("define ADD(a, b) a + b"),
            Some(Directive::Define {
                name: "ADD".to_string(),
                params: Some(vec!["a".to_string(), "b".to_string()]),
                body: "a + b".to_string(),
            })
        );
    }

    #[test]
    fn parses_pragma_once() {
        assert_eq!(Directive::parse("pragma once"), Some(Directive::PragmaOnce));
    }

    #[test]
    fn unknown_keyword_yields_none() {
        assert_eq!(Directive::parse("nonsense foo"), None);
    }
}

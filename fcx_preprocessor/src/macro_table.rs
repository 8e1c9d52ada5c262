//! Object-like and function-like macro storage and single-pass expansion.

use hashbrown::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDef {
    pub params: Option<Vec<String>>,
    pub body: String,
}

#[derive(Default)]
pub struct MacroTable {
    macros: HashMap<String, MacroDef>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: String, params: Option<Vec<String>>, body: String) {
        self.macros.insert(name, MacroDef { params, body });
    }

    pub fn undef(&mut self, name: &str) {
        self.macros.remove(name);
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&MacroDef> {
        self.macros.get(name)
    }

    /// Expands every macro invocation it finds in `text` exactly once
    /// (no recursive re-expansion of a macro's own body, which keeps object
    /// macros that reference themselves from looping).
    pub fn expand_once(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.char_indices().peekable();
        while let Some((start, ch)) = chars.next() {
            if !is_ident_start(ch) {
                out.push(ch);
                continue;
            }
            let mut end = start + ch.len_utf8();
            while let Some(&(idx, c)) = chars.peek() {
                if is_ident_continue(c) {
                    end = idx + c.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let ident = &text[start..end];
            match self.macros.get(ident) {
                Some(def) if def.params.is_none() => out.push_str(&def.body),
                Some(def) => {
                    let (args, consumed) = parse_call_args(&text[end..]);
                    match args {
                        Some(args) if args.len() == def.params.as_ref().unwrap().len() => {
                            out.push_str(&substitute(def, &args));
                            for _ in 0..consumed {
                                chars.next();
                            }
                        }
                        _ => out.push_str(ident),
                    }
                }
                None => out.push_str(ident),
            }
        }
        out
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn parse_call_args(rest: &str) -> (Option<Vec<String>>, usize) {
    let trimmed_start = rest.len() - rest.trim_start().len();
    let rest_trimmed = &rest[trimmed_start..];
    if !rest_trimmed.starts_with('(') {
        return (None, 0);
    }
    let mut depth = 0i32;
    let mut args = Vec::new();
    let mut current = String::new();
    for (i, c) in rest_trimmed.char_indices() {
        match c {
            '(' => {
                depth += 1;
                if depth > 1 {
                    current.push(c);
                }
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    args.push(current.trim().to_string());
                    return (Some(args), trimmed_start + i + 1);
                }
                current.push(c);
            }
            ',' if depth == 1 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    (None, 0)
}

fn substitute(def: &MacroDef, args: &[String]) -> String {
    let mut body = def.body.clone();
    for (param, arg) in def.params.as_ref().unwrap().iter().zip(args) {
        body = replace_token(&body, param, arg);
    }
    body
}

fn replace_token(haystack: &str, token: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(haystack.len());
    let mut chars = haystack.char_indices().peekable();
    while let Some((start, ch)) = chars.next() {
        if !is_ident_start(ch) {
            out.push(ch);
            continue;
        }
        let mut end = start + ch.len_utf8();
        while let Some(&(idx, c)) = chars.peek() {
            if is_ident_continue(c) {
                end = idx + c.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let ident = &haystack[start..end];
        if ident == token {
            out.push_str(replacement);
        } else {
            out.push_str(ident);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_object_like_macro() {
        let mut table = MacroTable::new();
        table.define("MAX".to_string(), None, "64".to_string());
        assert_eq!(table.expand_once("let x = MAX;"), "let x = 64;");
    }

    #[test]
    fn expands_function_like_macro() {
        let mut table = MacroTable::new();
        table.define("ADD".to_string(), Some(vec!["a".to_string(), "b".to_string()]), "a + b".to_string());
        assert_eq!(table.expand_once("ADD(1, 2)"), "1 + 2");
    }

    #[test]
    fn leaves_unknown_identifiers_alone() {
        let table = MacroTable::new();
        assert_eq!(table.expand_once("foo bar"), "foo bar");
    }

    #[test]
    fn undef_removes_a_macro() {
        let mut table = MacroTable::new();
        table.define("X".to_string(), None, "1".to_string());
        table.undef("X");
        assert!(!table.is_defined("X"));
        assert_eq!(table.expand_once("X"), "X");
    }
}

//! Precedence-climbing parser for FCx.
//!
//! Lexer output goes in, an [`ast::Block`] comes out. Disambiguation of the
//! three context-sensitive operator forms (`<=>`, `<<<`, `<<`/`>>`) happens
//! inline in [`parser::Parser`] via a bounded context stack rather than
//! backtracking.

pub mod ast;
pub mod parser;
pub mod pretty;

pub use ast::*;
pub use parser::{parse, ParseContext, Parser, MAX_CONTEXT_DEPTH};

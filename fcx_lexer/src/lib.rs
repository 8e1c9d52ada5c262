//! Streaming lexer for FCx: registry-backed operator scanning, big-integer
//! literals, two-pass string decoding, and "did you mean" suggestions for
//! unrecognized symbol runs.

pub mod lexer;
pub mod token;

pub use lexer::{lex, Lexer};
pub use token::{BigIntLiteral, Token, TokenKind, TokenUtils, KEYWORDS};

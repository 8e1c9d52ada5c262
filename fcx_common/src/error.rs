//! The closed error-kind set shared by every stage of the FCx pipeline.

use crate::Span;
use thiserror::Error;

/// Every fallible operation in the pipeline returns this error type.
///
/// Variants are grouped by stage; lex errors are recoverable (the lexer emits
/// an `Error` token and keeps going), parse errors trigger panic-mode
/// recovery, and preprocessor/lowering/emitter errors are fatal to the
/// current compilation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FcxError {
    #[error("{span}: I/O error: {message}")]
    Io { message: String, span: Span },

    #[error("{span}: preprocessor error: {message}")]
    Preprocessor { message: String, span: Span },

    #[error("{span}: lex error: {message}")]
    Lex {
        message: String,
        span: Span,
        /// Up to three registry symbols sharing the offending byte, offered as "did you mean".
        suggestions: Vec<String>,
    },

    #[error("{span}: parse error: {message}")]
    Parse { message: String, span: Span },

    #[error("{span}: lowering error: {message}")]
    Lowering { message: String, span: Span },

    #[error("emitter error: {message}")]
    Emitter { message: String },

    #[error("{span}: internal compiler error: {message}")]
    Internal { message: String, span: Span },
}

/// Result type alias used throughout the pipeline.
pub type FcxResult<T> = Result<T, FcxError>;

impl FcxError {
    pub fn io(message: impl Into<String>, span: Span) -> Self {
        Self::Io { message: message.into(), span }
    }

    pub fn preprocessor(message: impl Into<String>, span: Span) -> Self {
        Self::Preprocessor { message: message.into(), span }
    }

    pub fn lex(message: impl Into<String>, span: Span) -> Self {
        Self::Lex { message: message.into(), span, suggestions: Vec::new() }
    }

    pub fn lex_with_suggestions(message: impl Into<String>, span: Span, suggestions: Vec<String>) -> Self {
        Self::Lex { message: message.into(), span, suggestions }
    }

    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        Self::Parse { message: message.into(), span }
    }

    pub fn lowering(message: impl Into<String>, span: Span) -> Self {
        Self::Lowering { message: message.into(), span }
    }

    pub fn emitter(message: impl Into<String>) -> Self {
        Self::Emitter { message: message.into() }
    }

    pub fn internal(message: impl Into<String>, span: Span) -> Self {
        Self::Internal { message: message.into(), span }
    }

    /// Whether the pipeline should halt immediately on this error, as opposed
    /// to recovering and continuing (lex errors) or resynchronizing (parse errors).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Preprocessor { .. } | Self::Lowering { .. } | Self::Emitter { .. } | Self::Internal { .. })
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Io { span, .. }
            | Self::Preprocessor { span, .. }
            | Self::Lex { span, .. }
            | Self::Parse { span, .. }
            | Self::Lowering { span, .. }
            | Self::Internal { span, .. } => Some(*span),
            Self::Emitter { .. } => None,
        }
    }
}

//! Shared utilities and error types for the FCx compiler.
//!
//! This crate provides common functionality used across every pipeline
//! stage: the closed error-kind set, source location tracking, and
//! diagnostic rendering.

pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod span;

pub use diagnostics::*;
pub use error::*;
pub use logging::*;
pub use span::*;

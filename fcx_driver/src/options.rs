//! The embedder-facing configuration surface (§3.2).
//!
//! Grounded on the teacher's `seen_cli::config::BuildConfig`: a small,
//! directly-constructible struct with a `Default` impl standing in for the
//! flag parser this crate deliberately does not have.

use fcx_hir::OptLevel;
use std::path::PathBuf;

/// Which IR dumps a caller wants logged (`log::debug!`) as each stage runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpFlags {
    pub tokens: bool,
    pub preprocessed: bool,
    pub ast: bool,
    pub hir: bool,
    pub lir: bool,
}

/// Where `Pipeline::compile_str`/`compile_file` should stop early.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopAfter {
    #[default]
    None,
    Preprocess,
    Lex,
    Parse,
    Hir,
    Lir,
}

#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub opt_level: OptLevel,
    pub include_paths: Vec<PathBuf>,
    pub predefined_macros: Vec<(String, String)>,
    pub emit_line_markers: bool,
    pub dump: DumpFlags,
    pub stop_after: StopAfter,
    /// §4.4's ambiguous-`<=>`/`<<<`/shift disambiguation becomes a hard
    /// parse error instead of the default local-decision resolution.
    pub strict_ambiguous_operators: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            opt_level: OptLevel::O0,
            include_paths: Vec::new(),
            predefined_macros: Vec::new(),
            emit_line_markers: false,
            dump: DumpFlags::default(),
            stop_after: StopAfter::None,
            strict_ambiguous_operators: false,
        }
    }
}

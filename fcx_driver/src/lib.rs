//! Pipeline orchestration and the emitter-facing interface for FCx (§4.9).
//!
//! This is the one crate in the workspace that knows about every other
//! stage; everything upstream of it (lexer, parser, HIR, LIR) stays
//! ignorant of how it's driven. `init_logging` installs the process-wide
//! `env_logger` subscriber — call it once, from whatever embeds this crate,
//! before touching [`Pipeline`].

pub mod emitter;
pub mod lto_profile;
pub mod options;
pub mod pipeline;

pub use emitter::{Emitter, NullEmitter};
pub use fcx_common::init_logging;
pub use lto_profile::LtoProfile;
pub use options::{CompileOptions, DumpFlags, StopAfter};
pub use pipeline::{CompileOutcome, Pipeline};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn compile_str_runs_seed_scenario_five_to_lir() {
        let pipeline = Pipeline::new(CompileOptions::default());
        let outcome = pipeline.compile_str("let x := 7; ret x;", "leaf", Path::new(".")).expect("pipeline should succeed");
        let lir = outcome.lir.expect("lir stage should have run");
        let function = lir.functions.first().expect("module should lower __init__ into a function");
        assert_eq!(function.frame.total_size, 0);
        assert!(!function.instructions.is_empty());
    }

    #[test]
    fn stop_after_parse_skips_lowering() {
        let mut options = CompileOptions::default();
        options.stop_after = StopAfter::Parse;
        let pipeline = Pipeline::new(options);
        let outcome = pipeline.compile_str("let x := 1;", "m", Path::new(".")).expect("should parse");
        assert!(outcome.ast.is_some());
        assert!(outcome.hir.is_none());
        assert!(outcome.lir.is_none());
    }

    #[test]
    fn compile_options_default_matches_documented_baseline() {
        let options = CompileOptions::default();
        assert_eq!(options.opt_level, fcx_hir::OptLevel::O0);
        assert_eq!(options.dump, DumpFlags::default());
        assert!(!options.strict_ambiguous_operators);
    }

    #[test]
    fn compile_file_reads_and_lowers_a_real_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("leaf.fcx");
        std::fs::write(&path, "let x := 7; ret x;").expect("write source");
        let pipeline = Pipeline::new(CompileOptions::default());
        let outcome = pipeline.compile_file(&path).expect("compile_file should succeed");
        assert!(outcome.lir.is_some());
    }

    #[test]
    fn compile_file_wraps_missing_file_with_anyhow_context() {
        let pipeline = Pipeline::new(CompileOptions::default());
        let err = pipeline.compile_file(Path::new("/nonexistent/does-not-exist.fcx")).expect_err("should fail");
        assert!(err.to_string().contains("does-not-exist.fcx"));
    }
}

//! The `Pipeline` type (§4.9): one method per stage boundary, plus
//! `compile_str`/`compile_file` convenience entry points.
//!
//! Grounded on the teacher's `seen_cli::commands::build::compile_project`:
//! the same read-file -> lex -> parse -> (typecheck in the teacher; HIR here)
//! -> lower shape, `log::info!`/`warn!`/`error!` at each stage boundary, and
//! `anyhow::Context` wrapping at the orchestration layer.

use crate::options::{CompileOptions, StopAfter};
use anyhow::Context;
use fcx_common::FcxError;
use fcx_hir::{CpuFeatures, HirModule};
use fcx_lexer::Token;
use fcx_lir::LirModule;
use fcx_parser::Block;
use fcx_preprocessor::{FileLoader, Preprocessor};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Resolves `#include` paths against the filesystem: quoted includes relative
/// to the including file's directory first, angle-bracket includes against
/// the configured include search paths.
struct FsLoader {
    base_dir: PathBuf,
    search_paths: Vec<PathBuf>,
}

impl FileLoader for FsLoader {
    fn load(&self, path: &str, is_system: bool) -> Result<String, FcxError> {
        let span = fcx_common::Span::default();
        if !is_system {
            let candidate = self.base_dir.join(path);
            if let Ok(contents) = std::fs::read_to_string(&candidate) {
                return Ok(contents);
            }
        }
        for dir in &self.search_paths {
            let candidate = dir.join(path);
            if let Ok(contents) = std::fs::read_to_string(&candidate) {
                return Ok(contents);
            }
        }
        Err(FcxError::io(format!("include file not found: {path}"), span))
    }
}

/// Whichever intermediate artifacts `compile_str`/`compile_file` produced
/// before stopping, per [`StopAfter`]. Every field past the configured stop
/// point is `None`.
#[derive(Debug, Clone, Default)]
pub struct CompileOutcome {
    pub preprocessed: Option<String>,
    pub tokens: Option<Vec<Token>>,
    pub ast: Option<Block>,
    pub hir: Option<HirModule>,
    pub lir: Option<LirModule>,
    pub cpu_features: Option<CpuFeatures>,
}

pub struct Pipeline {
    options: CompileOptions,
}

impl Pipeline {
    pub fn new(options: CompileOptions) -> Self {
        Pipeline { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn preprocess(&self, source: &str, file_name: &str, file_id: u32, base_dir: &Path) -> Result<String, FcxError> {
        info!("preprocessing {file_name}");
        let loader = FsLoader { base_dir: base_dir.to_path_buf(), search_paths: self.options.include_paths.clone() };
        let mut preprocessor = Preprocessor::new(&loader);
        for (name, body) in &self.options.predefined_macros {
            preprocessor.define(name.clone(), body.clone());
        }
        let result = preprocessor.process(source, file_name, file_id)?;
        if self.options.dump.preprocessed {
            debug!("preprocessed output for {file_name}:\n{result}");
        }
        Ok(result)
    }

    pub fn lex(&self, source: &str, file_id: u32) -> Result<Vec<Token>, FcxError> {
        info!("lexing {} bytes", source.len());
        let tokens = fcx_lexer::lex(source, file_id).map_err(|mut errors| {
            errors.remove(0)
        })?;
        if self.options.dump.tokens {
            debug!("tokens: {tokens:?}");
        }
        Ok(tokens)
    }

    pub fn parse(&self, tokens: Vec<Token>) -> Result<Block, FcxError> {
        info!("parsing {} tokens", tokens.len());
        let (block, mut diagnostics) = fcx_parser::parse(tokens);
        if !diagnostics.is_empty() {
            return Err(diagnostics.remove(0));
        }
        if self.options.dump.ast {
            debug!("ast: {block:#?}");
        }
        Ok(block)
    }

    pub fn lower_to_hir(&self, module_name: &str, ast: &Block) -> Result<HirModule, FcxError> {
        info!("lowering {module_name} to HIR");
        let module = fcx_hir::build_module(module_name, ast)?;
        if self.options.dump.hir {
            debug!("hir: {module:#?}");
        }
        Ok(module)
    }

    pub fn optimize(&self, module: &mut HirModule) {
        info!("optimizing at {:?}", self.options.opt_level);
        fcx_hir::optimize_module(module, self.options.opt_level);
    }

    pub fn lower_to_lir(&self, module: &HirModule) -> Result<LirModule, FcxError> {
        info!("lowering {} to LIR", module.name);
        let lir = fcx_lir::lower_module(module)?;
        for function in &lir.functions {
            if !function.frame.uses_red_zone && function.frame.total_size > 0 {
                warn!("{} needed a full stack frame ({} bytes)", function.name, function.frame.total_size);
            }
        }
        if self.options.dump.lir {
            debug!("lir: {lir:#?}");
        }
        Ok(lir)
    }

    /// Runs the whole pipeline over in-memory source, stopping after
    /// whichever phase `CompileOptions::stop_after` names.
    pub fn compile_str(&self, source: &str, module_name: &str, base_dir: &Path) -> Result<CompileOutcome, FcxError> {
        let mut outcome = CompileOutcome::default();

        let preprocessed = self.preprocess(source, module_name, 0, base_dir)?;
        outcome.preprocessed = Some(preprocessed.clone());
        if self.options.stop_after == StopAfter::Preprocess {
            return Ok(outcome);
        }

        let tokens = self.lex(&preprocessed, 0)?;
        outcome.tokens = Some(tokens.clone());
        if self.options.stop_after == StopAfter::Lex {
            return Ok(outcome);
        }

        let ast = self.parse(tokens)?;
        outcome.ast = Some(ast.clone());
        if self.options.stop_after == StopAfter::Parse {
            return Ok(outcome);
        }

        let mut hir = self.lower_to_hir(module_name, &ast)?;
        self.optimize(&mut hir);
        if self.options.stop_after == StopAfter::Hir {
            outcome.cpu_features = Some(hir.cpu_features.clone());
            outcome.hir = Some(hir);
            return Ok(outcome);
        }

        let lir = self.lower_to_lir(&hir)?;
        outcome.cpu_features = Some(hir.cpu_features.clone());
        outcome.hir = Some(hir);
        outcome.lir = Some(lir);
        Ok(outcome)
    }

    /// The file-based entry point, and the one place this crate reaches for
    /// `anyhow`: `compile_str` and the stage methods stay on the typed
    /// `FcxError`, but a caller driving a whole file wants the failing path
    /// (which file, which include) attached without losing the underlying
    /// error, recoverable again via `anyhow::Error::downcast_ref::<FcxError>`.
    pub fn compile_file(&self, path: &Path) -> anyhow::Result<CompileOutcome> {
        let source = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let module_name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("module");
        self.compile_str(&source, module_name, base_dir).with_context(|| format!("compiling {}", path.display()))
    }
}

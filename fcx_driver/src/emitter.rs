//! The emitter-facing interface (§4.9, §6). The core pipeline produces a
//! [`fcx_lir::LirModule`] plus a [`fcx_hir::CpuFeatures`] record and hands
//! both to whatever implements this trait; nothing downstream of lowering
//! ships here.

use fcx_common::FcxError;
use fcx_hir::CpuFeatures;
use fcx_lir::LirModule;

/// Lifecycle is folded into `Drop` rather than an explicit `destroy` method,
/// since that is how Rust already expresses "tear this down exactly once."
#[cfg_attr(test, mockall::automock)]
pub trait Emitter {
    fn emit_module(&mut self, module: &LirModule, cpu_features: &CpuFeatures) -> Result<(), FcxError>;
    fn generate_object(&mut self, out_path: &str) -> Result<(), FcxError>;
    fn generate_assembly(&mut self, out_path: &str) -> Result<(), FcxError>;
    fn generate_bitcode(&mut self, out_path: &str) -> Result<(), FcxError>;
    fn link_executable(&mut self, object_paths: &[String], out_path: &str) -> Result<(), FcxError>;
    fn link_shared_library(&mut self, object_paths: &[String], out_path: &str) -> Result<(), FcxError>;
    fn print_ir(&self) -> String;
    fn last_error(&self) -> Option<String>;
}

/// An emitter that accepts every module and produces nothing — used where a
/// real backend isn't wired up yet (tests, `compile_str`-only callers that
/// only want the LIR, smoke-testing the pipeline in isolation).
#[derive(Debug, Default)]
pub struct NullEmitter {
    module_count: usize,
}

impl Emitter for NullEmitter {
    fn emit_module(&mut self, _module: &LirModule, _cpu_features: &CpuFeatures) -> Result<(), FcxError> {
        self.module_count += 1;
        Ok(())
    }

    fn generate_object(&mut self, _out_path: &str) -> Result<(), FcxError> {
        Ok(())
    }

    fn generate_assembly(&mut self, _out_path: &str) -> Result<(), FcxError> {
        Ok(())
    }

    fn generate_bitcode(&mut self, _out_path: &str) -> Result<(), FcxError> {
        Ok(())
    }

    fn link_executable(&mut self, _object_paths: &[String], _out_path: &str) -> Result<(), FcxError> {
        Ok(())
    }

    fn link_shared_library(&mut self, _object_paths: &[String], _out_path: &str) -> Result<(), FcxError> {
        Ok(())
    }

    fn print_ir(&self) -> String {
        format!("<null emitter: {} module(s) received>", self.module_count)
    }

    fn last_error(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_emitter_accepts_every_call() {
        let mut emitter = NullEmitter::default();
        let module = LirModule::new("m", Vec::new(), Vec::new());
        assert!(emitter.emit_module(&module, &CpuFeatures::default()).is_ok());
        assert!(emitter.generate_object("out.o").is_ok());
        assert!(emitter.link_executable(&[], "out").is_ok());
        assert_eq!(emitter.last_error(), None);
        assert!(emitter.print_ir().contains('1'));
    }

    #[test]
    fn mock_emitter_can_assert_call_expectations() {
        let mut mock = MockEmitter::new();
        mock.expect_emit_module().returning(|_, _| Ok(()));
        mock.expect_last_error().returning(|| None);
        let module = LirModule::new("m", Vec::new(), Vec::new());
        assert!(mock.emit_module(&module, &CpuFeatures::default()).is_ok());
        assert_eq!(mock.last_error(), None);
    }
}

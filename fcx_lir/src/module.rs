//! The LIR module: a named container of functions plus the string pool and
//! external-function table carried over from the HIR module that produced it.
//!
//! Grounded on `compiler_seen::ir::module::Module`'s `name`/`functions`/
//! `add_function`/`get_function` shape, reused here one level down the
//! pipeline.

use crate::function::LirFunction;

#[derive(Debug, Clone)]
pub struct LirModule {
    pub name: String,
    pub functions: Vec<LirFunction>,
    pub string_pool: Vec<String>,
    pub externals: Vec<String>,
}

impl LirModule {
    pub fn new(name: impl Into<String>, string_pool: Vec<String>, externals: Vec<String>) -> Self {
        LirModule { name: name.into(), functions: Vec::new(), string_pool, externals }
    }

    pub fn add_function(&mut self, func: LirFunction) {
        self.functions.push(func);
    }

    pub fn get_function(&self, name: &str) -> Option<&LirFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}

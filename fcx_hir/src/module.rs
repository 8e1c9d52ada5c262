//! The HIR module: named container of functions, string pool, and the
//! external-function table, plus the module-wide CPU-feature record.
//!
//! Grounded on the teacher's `ir::module::Module` (`name` + owned function
//! vector + `add_function`/`get_function` accessors), extended with the
//! string pool and external-function table §3 requires.

use crate::cpu_features::CpuFeatures;
use crate::function::HirFunction;
use crate::operand::ExternalId;
use hashbrown::HashMap;

#[derive(Debug, Clone)]
pub struct HirModule {
    pub name: String,
    pub functions: Vec<HirFunction>,
    string_pool: Vec<String>,
    string_index: HashMap<String, u32>,
    externals: Vec<String>,
    external_index: HashMap<String, u32>,
    pub cpu_features: CpuFeatures,
}

impl HirModule {
    pub fn new(name: impl Into<String>) -> Self {
        HirModule {
            name: name.into(),
            functions: Vec::new(),
            string_pool: Vec::new(),
            string_index: HashMap::new(),
            externals: Vec::new(),
            external_index: HashMap::new(),
            cpu_features: CpuFeatures::default(),
        }
    }

    pub fn add_function(&mut self, func: HirFunction) {
        self.functions.push(func);
    }

    pub fn get_function(&self, name: &str) -> Option<&HirFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Interns a string literal, returning its stable index into the pool.
    /// Repeated literals with identical contents share a slot.
    pub fn intern_string(&mut self, value: &str) -> u32 {
        if let Some(&idx) = self.string_index.get(value) {
            return idx;
        }
        let idx = self.string_pool.len() as u32;
        self.string_pool.push(value.to_string());
        self.string_index.insert(value.to_string(), idx);
        idx
    }

    pub fn string_pool(&self) -> &[String] {
        &self.string_pool
    }

    /// Records (or looks up) a call target unresolved within this module,
    /// returning the module-scoped external-function id (§3's invariant:
    /// "External-function ids are module-scoped").
    pub fn intern_external(&mut self, name: &str) -> ExternalId {
        if let Some(&idx) = self.external_index.get(name) {
            return ExternalId(idx);
        }
        let idx = self.externals.len() as u32;
        self.externals.push(name.to_string());
        self.external_index.insert(name.to_string(), idx);
        ExternalId(idx)
    }

    pub fn externals(&self) -> &[String] {
        &self.externals
    }

    pub fn external_name(&self, id: ExternalId) -> &str {
        &self.externals[id.0 as usize]
    }
}

//! HIR basic blocks.
//!
//! Grounded on the teacher's `ir::basic_block::BasicBlock`: an id, an
//! instruction list with the terminator last, and predecessor/successor id
//! lists for the CFG (cyclic references by id, never by owning pointer, per
//! the repository's own design notes on cyclic structures).

use crate::instruction::{HirOp, Instruction};
use crate::operand::BlockId;

#[derive(Debug, Clone)]
pub struct HirBlock {
    pub id: BlockId,
    pub name: String,
    pub instructions: Vec<Instruction>,
    pub predecessors: Vec<BlockId>,
    pub successors: Vec<BlockId>,
    pub is_entry: bool,
    pub is_exit: bool,
}

impl HirBlock {
    pub fn new(id: BlockId, name: impl Into<String>) -> Self {
        HirBlock {
            id,
            name: name.into(),
            instructions: Vec::new(),
            predecessors: Vec::new(),
            successors: Vec::new(),
            is_entry: false,
            is_exit: false,
        }
    }

    pub fn push(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    pub fn add_successor(&mut self, target: BlockId) {
        if !self.successors.contains(&target) {
            self.successors.push(target);
        }
    }

    pub fn add_predecessor(&mut self, source: BlockId) {
        if !self.predecessors.contains(&source) {
            self.predecessors.push(source);
        }
    }

    /// True once the block ends with a control-transfer instruction. A
    /// well-formed function has every block terminated before lowering.
    pub fn has_terminator(&self) -> bool {
        matches!(
            self.instructions.last().map(|i| &i.op),
            Some(HirOp::Jump | HirOp::BranchIfZero | HirOp::BranchIfNonZero | HirOp::Return | HirOp::Halt)
        )
    }
}

//! HIR functions.
//!
//! Grounded on the teacher's `ir::function::Function`: name, parameter
//! list, return type, an owned block vector, and the next-vreg/next-block
//! counters that hand out fresh ids. FCx additionally needs a next-label
//! counter (blocks and branch-target labels are allocated from separate
//! spaces per §3's invariants).

use crate::block::HirBlock;
use crate::operand::{BlockId, LabelId, VregId};
use crate::types::TypeClass;

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub vreg: VregId,
    pub ty: TypeClass,
}

#[derive(Debug, Clone)]
pub struct HirFunction {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeClass,
    pub blocks: Vec<HirBlock>,
    pub entry_block: Option<BlockId>,
    next_vreg: u32,
    next_block: u32,
    next_label: u32,
}

impl HirFunction {
    pub fn new(name: impl Into<String>, return_type: TypeClass) -> Self {
        HirFunction {
            name: name.into(),
            params: Vec::new(),
            return_type,
            blocks: Vec::new(),
            entry_block: None,
            next_vreg: 0,
            next_block: 0,
            next_label: 0,
        }
    }

    pub fn new_vreg(&mut self) -> VregId {
        let id = self.next_vreg;
        self.next_vreg += 1;
        VregId(id)
    }

    pub fn vreg_count(&self) -> u32 {
        self.next_vreg
    }

    pub fn new_label(&mut self) -> LabelId {
        let id = self.next_label;
        self.next_label += 1;
        LabelId(id)
    }

    pub fn new_block(&mut self, name: impl Into<String>) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        let mut block = HirBlock::new(id, name);
        if self.entry_block.is_none() {
            block.is_entry = true;
            self.entry_block = Some(id);
        }
        self.blocks.push(block);
        id
    }

    pub fn add_param(&mut self, name: impl Into<String>, ty: TypeClass) -> VregId {
        let vreg = self.new_vreg();
        self.params.push(Param { name: name.into(), vreg, ty });
        vreg
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut HirBlock {
        self.blocks.iter_mut().find(|b| b.id == id).expect("block id must come from this function")
    }

    pub fn block(&self, id: BlockId) -> &HirBlock {
        self.blocks.iter().find(|b| b.id == id).expect("block id must come from this function")
    }

    pub fn link(&mut self, from: BlockId, to: BlockId) {
        self.block_mut(from).add_successor(to);
        self.block_mut(to).add_predecessor(from);
    }

    /// A leaf function invokes no other function and issues no syscall in
    /// any block (§4.8's precondition for red-zone stack allocation).
    pub fn is_leaf(&self) -> bool {
        use crate::instruction::HirOp;
        use fcx_registry::OperatorKind;
        self.blocks.iter().all(|b| {
            b.instructions.iter().all(|i| {
                !matches!(i.op, HirOp::Call | HirOp::CallExternal)
                    && !matches!(&i.op, HirOp::Operator(k) if is_syscall_kind(*k))
            })
        })
    }
}

fn is_syscall_kind(kind: fcx_registry::OperatorKind) -> bool {
    use fcx_registry::OperatorKind::*;
    matches!(
        kind,
        Syscall
            | DirectOutput
            | DirectInput
            | SyscallExit
            | SyscallRead
            | SyscallWrite
            | SyscallOpen
            | SyscallClose
            | SyscallFork
            | SyscallExec
            | SyscallWait
            | SyscallKill
            | SyscallPipe
            | SyscallDup
            | SyscallSeek
            | SyscallStat
            | SyscallMmap
            | SyscallMunmap
            | SyscallBrk
            | SyscallIoctl
            | SyscallSignal
            | SyscallSocket
    )
}

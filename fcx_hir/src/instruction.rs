//! HIR instructions.
//!
//! The teacher's `ir::instruction::Instruction` pairs an `OpCode` with
//! operands, an optional result register, and an optional result type; the
//! HIR here does the same, except the "opcode" for anything that started
//! life as an FCx operator is the operator's own [`OperatorKind`] rather
//! than a second, parallel enum — the registry already is the single source
//! of truth for what an operator *means*, so HIR does not reinvent it. A
//! handful of opcodes with no FCx operator counterpart (control flow, plain
//! moves, calls) get their own [`HirOp::ControlFlow`] variants.

use crate::operand::{BlockId, Operand, VregId};
use crate::types::TypeClass;
use fcx_common::Span;
use fcx_registry::OperatorKind;
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HirOp {
    /// One per FCx operator family action: arithmetic, bitwise, shift/rotate,
    /// comparison, data-movement, memory-alloc, atomic-concurrency,
    /// syscall-os, io-format all flow through here.
    Operator(OperatorKind),
    /// A plain value copy with no operator semantics (e.g. materializing a
    /// parameter into its entry vreg).
    Move,
    Jump,
    BranchIfZero,
    BranchIfNonZero,
    Phi,
    Call,
    CallExternal,
    Return,
    Halt,
    /// Reserves stack storage for a local that must live in memory rather
    /// than a vreg (its address is taken, or its width exceeds a register).
    Alloca,
    Nop,
}

/// Most instructions take 0-3 operands; `SmallVec` keeps those inline
/// instead of heap-allocating a `Vec` per instruction.
pub type OperandList = SmallVec<[Operand; 3]>;
pub type TargetList = SmallVec<[BlockId; 2]>;

#[derive(Debug, Clone)]
pub struct Instruction {
    pub op: HirOp,
    pub operands: OperandList,
    pub result: Option<VregId>,
    pub result_type: Option<TypeClass>,
    /// Branch/jump targets; empty for non-control-flow instructions.
    pub targets: TargetList,
    pub span: Option<Span>,
}

impl Instruction {
    pub fn new(op: HirOp) -> Self {
        Instruction { op, operands: OperandList::new(), result: None, result_type: None, targets: TargetList::new(), span: None }
    }

    pub fn with_result(mut self, result: VregId, ty: TypeClass) -> Self {
        self.result = Some(result);
        self.result_type = Some(ty);
        self
    }

    pub fn with_operands(mut self, operands: Vec<Operand>) -> Self {
        self.operands = OperandList::from_vec(operands);
        self
    }

    pub fn with_targets(mut self, targets: Vec<BlockId>) -> Self {
        self.targets = TargetList::from_vec(targets);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// True for instructions whose removal is safe purely because their
    /// result is unused: no memory write, no syscall, no atomic effect, no
    /// control transfer. Used by the optimizer's dead-code elimination pass.
    pub fn is_pure(&self) -> bool {
        match &self.op {
            HirOp::Operator(kind) => is_pure_operator(*kind),
            HirOp::Move | HirOp::Phi | HirOp::Alloca => true,
            HirOp::Jump
            | HirOp::BranchIfZero
            | HirOp::BranchIfNonZero
            | HirOp::Call
            | HirOp::CallExternal
            | HirOp::Return
            | HirOp::Halt
            | HirOp::Nop => false,
        }
    }

    /// Registers this instruction reads, for dead-code/copy-propagation analysis.
    pub fn used_vregs(&self) -> Vec<VregId> {
        self.operands
            .iter()
            .filter_map(|op| match op {
                Operand::Vreg(v) => Some(*v),
                Operand::Memory { base, .. } => Some(*base),
                _ => None,
            })
            .collect()
    }
}

fn is_pure_operator(kind: OperatorKind) -> bool {
    use OperatorKind::*;
    !matches!(
        kind,
        AtomicRead
            | AtomicWrite
            | CompareAndSwap
            | AtomicSwap
            | FetchAdd
            | FetchSub
            | FetchAnd
            | FetchOr
            | FetchXor
            | FenceFull
            | FenceLoad
            | FenceStore
            | Lock
            | Unlock
            | SpinWait
            | Barrier
            | Allocate
            | Deallocate
            | StackAllocate
            | HeapAllocate
            | Free
            | New
            | Delete
            | Prefetch
            | Pin
            | Unpin
            | Syscall
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
            | FormatPrint
            | FormatScan
            | FormatDebug
            | FormatReadLine
            | FormatWriteLine
            | FormatErrorPrint
            | Assign
            | AddAssign
            | SubAssign
            | MulAssign
            | DivAssign
            | ModAssign
            | ShiftLeftAssign
            | ShiftRightAssign
            | RotateLeftAssign
            | RotateRightAssign
            | BitAndAssign
            | BitOrAssign
            | BitXorAssign
            | InlineAsm
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge(pub BlockId);

//! Low-level IR for FCx: a near-literal x86-64 instruction set, a stack
//! frame and ABI model, and the pass that lowers HIR into it.
//!
//! This is the last IR before codegen proper — no register allocation is
//! performed here. `LirFunction` carries virtual registers end to end;
//! `PhysicalRegister` names only the fixed slots the ABI assigns (argument
//! registers, return registers, callee-saved registers).

pub mod frame;
pub mod function;
pub mod instruction;
pub mod lower;
pub mod module;
pub mod operand;
pub mod register;

pub use frame::{CallingConvention, FrameError, StackFrame, RED_ZONE_SIZE, STACK_ALIGNMENT};
pub use function::LirFunction;
pub use instruction::{AtomicFetchOp, Instruction};
pub use lower::{lower_module, PARALLEL_LOWERING_THRESHOLD};
pub use module::LirModule;
pub use operand::{Address, CallTarget, Condition, Label, Operand};
pub use register::{
    PhysicalRegister, RegisterWidth, VirtualRegister, SYSCALL_INT_ARG_REGS, SYSV_INT_ARG_REGS, SYSV_RETURN_REG,
    SYSV_RETURN_REG_HIGH,
};

//! LIR registers: virtual registers tagged with a width, and the physical
//! x86-64 registers they are eventually assigned to.
//!
//! Grounded on `faxc_lir::lir`'s `VirtualRegister`/`RegisterWidth`/
//! `PhysicalRegister` triple. This crate does not implement register
//! allocation — `LirFunction` carries virtual registers end to end, and
//! `PhysicalRegister` exists only so the ABI model (§4.8) can name argument,
//! return, and callee-saved registers by their real names when it emits
//! moves at call sites and frame boundaries.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualRegister {
    pub id: u32,
    pub width: RegisterWidth,
}

impl VirtualRegister {
    pub fn new(id: u32) -> Self {
        VirtualRegister { id, width: RegisterWidth::W64 }
    }

    pub fn with_width(id: u32, width: RegisterWidth) -> Self {
        VirtualRegister { id, width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterWidth {
    W8,
    W16,
    W32,
    W64,
}

impl RegisterWidth {
    pub fn bytes(self) -> u32 {
        match self {
            RegisterWidth::W8 => 1,
            RegisterWidth::W16 => 2,
            RegisterWidth::W32 => 4,
            RegisterWidth::W64 => 8,
        }
    }

    /// Narrowest width that can hold a value of the given bit width, capped
    /// at `W64`. Widths above 64 (FCx's big-integer types) need more than one
    /// register; the lowering pass requests one `W64` register per 64-bit
    /// limb for those rather than asking this function for a wider one.
    pub fn for_bits(bits: u32) -> RegisterWidth {
        match bits {
            0..=8 => RegisterWidth::W8,
            9..=16 => RegisterWidth::W16,
            17..=32 => RegisterWidth::W32,
            _ => RegisterWidth::W64,
        }
    }
}

/// System V AMD64 general-purpose and SSE register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalRegister {
    RAX,
    RBX,
    RCX,
    RDX,
    RSI,
    RDI,
    RBP,
    RSP,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
    XMM0,
    XMM1,
    XMM2,
    XMM3,
    XMM4,
    XMM5,
    XMM6,
    XMM7,
}

impl PhysicalRegister {
    pub fn is_caller_saved(self) -> bool {
        matches!(
            self,
            PhysicalRegister::RAX
                | PhysicalRegister::RCX
                | PhysicalRegister::RDX
                | PhysicalRegister::RSI
                | PhysicalRegister::RDI
                | PhysicalRegister::R8
                | PhysicalRegister::R9
                | PhysicalRegister::R10
                | PhysicalRegister::R11
                | PhysicalRegister::XMM0
                | PhysicalRegister::XMM1
                | PhysicalRegister::XMM2
                | PhysicalRegister::XMM3
                | PhysicalRegister::XMM4
                | PhysicalRegister::XMM5
                | PhysicalRegister::XMM6
                | PhysicalRegister::XMM7
        )
    }

    pub fn is_callee_saved(self) -> bool {
        matches!(
            self,
            PhysicalRegister::RBX
                | PhysicalRegister::RBP
                | PhysicalRegister::RSP
                | PhysicalRegister::R12
                | PhysicalRegister::R13
                | PhysicalRegister::R14
                | PhysicalRegister::R15
        )
    }
}

/// Fixed integer-argument register sequence for the System V AMD64 calling
/// convention (§4.8): "the first six integer arguments in a fixed register
/// sequence."
pub const SYSV_INT_ARG_REGS: [PhysicalRegister; 6] =
    [PhysicalRegister::RDI, PhysicalRegister::RSI, PhysicalRegister::RDX, PhysicalRegister::RCX, PhysicalRegister::R8, PhysicalRegister::R9];

/// The syscall convention substitutes `R10` for `RCX` in the fourth
/// argument slot (§4.8), since the `syscall` instruction clobbers `RCX`.
pub const SYSCALL_INT_ARG_REGS: [PhysicalRegister; 6] =
    [PhysicalRegister::RDI, PhysicalRegister::RSI, PhysicalRegister::RDX, PhysicalRegister::R10, PhysicalRegister::R8, PhysicalRegister::R9];

pub const SYSV_RETURN_REG: PhysicalRegister = PhysicalRegister::RAX;
pub const SYSV_RETURN_REG_HIGH: PhysicalRegister = PhysicalRegister::RDX;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_and_callee_saved_are_disjoint() {
        assert!(PhysicalRegister::RAX.is_caller_saved());
        assert!(!PhysicalRegister::RAX.is_callee_saved());
        assert!(PhysicalRegister::RBX.is_callee_saved());
        assert!(!PhysicalRegister::RBX.is_caller_saved());
    }

    #[test]
    fn width_for_bits_rounds_up() {
        assert_eq!(RegisterWidth::for_bits(1), RegisterWidth::W8);
        assert_eq!(RegisterWidth::for_bits(17), RegisterWidth::W32);
        assert_eq!(RegisterWidth::for_bits(1024), RegisterWidth::W64);
    }
}

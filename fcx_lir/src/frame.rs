//! Stack frame and ABI model (§4.8).
//!
//! Grounded on the teacher's `seen_memory::regions::RegionSet` id-allocator
//! idiom (monotonic id counter, `add_*`-returns-id methods) applied here to
//! stack slots instead of memory regions, and on `faxc_lir::lir`'s
//! `PhysicalRegister::is_caller_saved`/`is_callee_saved` split for the
//! callee-saved bitmask this frame must preserve.

use crate::register::PhysicalRegister;

pub const RED_ZONE_SIZE: i32 = 128;
pub const STACK_ALIGNMENT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingConvention {
    SysV,
    Syscall,
    /// Windows `__fastcall`: first two integer/pointer args in `ECX`/`EDX`.
    /// Representable, but no lowering template selects it yet.
    Fastcall,
    /// Windows `__vectorcall`: like `Fastcall`, plus vector/FP args in
    /// `XMM0`-`XMM5`. Representable, but no lowering template selects it yet.
    Vectorcall,
}

impl CallingConvention {
    /// Name-based heuristic (§4.8): `sys_`-prefixed functions use the
    /// syscall convention, everything else SysV-AMD64. `Fastcall`/
    /// `Vectorcall` are never inferred this way today; a function needs
    /// one of them only once something threads an explicit ABI attribute
    /// in from the source, which the grammar does not yet have.
    pub fn for_function_name(name: &str) -> CallingConvention {
        if name.starts_with("sys_") {
            CallingConvention::Syscall
        } else {
            CallingConvention::SysV
        }
    }
}

#[derive(Debug, Clone)]
pub struct StackFrame {
    pub total_size: u32,
    pub local_area_size: u32,
    pub spill_area_size: u32,
    pub parameter_area_size: u32,
    pub alignment: u32,
    pub red_zone_used: i32,
    pub is_leaf: bool,
    pub uses_red_zone: bool,
    pub needs_frame_pointer: bool,
    pub callee_saved: Vec<PhysicalRegister>,
    pub callee_saved_size: u32,
    next_local_offset: i32,
}

impl StackFrame {
    pub fn new(is_leaf: bool) -> Self {
        StackFrame {
            total_size: 0,
            local_area_size: 0,
            spill_area_size: 0,
            parameter_area_size: 0,
            alignment: STACK_ALIGNMENT,
            red_zone_used: 0,
            is_leaf,
            uses_red_zone: false,
            needs_frame_pointer: false,
            callee_saved: Vec::new(),
            callee_saved_size: 0,
            next_local_offset: 0,
        }
    }

    pub fn mark_used(&mut self, reg: PhysicalRegister) {
        if reg.is_callee_saved() && !self.callee_saved.contains(&reg) {
            self.callee_saved.push(reg);
            self.callee_saved_size += 8;
        }
    }

    /// Allocates `size` bytes at `align`-byte alignment, preferring the red
    /// zone while this is a leaf function and doing so keeps cumulative
    /// red-zone use at or below 128 bytes (§4.8); otherwise extends the
    /// local area. Returns a negative offset from the frame pointer.
    pub fn allocate_slot(&mut self, size: u32, align: u32) -> Result<i32, FrameError> {
        if !align.is_power_of_two() {
            return Err(FrameError::BadAlignment(align));
        }
        let size = size as i32;
        let align = align as i32;
        if self.is_leaf {
            let candidate = round_up(self.red_zone_used + size, align);
            if candidate <= RED_ZONE_SIZE {
                self.red_zone_used = candidate;
                self.uses_red_zone = true;
                return Ok(-candidate);
            }
        }
        let candidate = round_up(self.next_local_offset + size, align);
        if candidate > i32::MAX / 2 {
            return Err(FrameError::LocalAreaOverflow);
        }
        self.next_local_offset = candidate;
        self.local_area_size = candidate as u32;
        Ok(-candidate)
    }

    /// Computes final frame layout (§4.8): leaf functions whose local area
    /// fits in the red zone get a zero-size frame and no frame pointer;
    /// everyone else sums saved-register, local, spill, and parameter areas
    /// and rounds up to 16-byte alignment.
    pub fn finalize(&mut self) {
        if self.is_leaf && self.local_area_size <= RED_ZONE_SIZE as u32 {
            self.total_size = 0;
            self.needs_frame_pointer = false;
            return;
        }
        let raw = self.callee_saved_size + self.local_area_size + self.spill_area_size + self.parameter_area_size;
        self.total_size = round_up(raw as i32, self.alignment as i32) as u32;
        self.needs_frame_pointer = self.total_size > 0;
    }
}

fn round_up(value: i32, align: i32) -> i32 {
    (value + align - 1) / align * align
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("stack slot alignment {0} is not a power of two")]
    BadAlignment(u32),
    #[error("function's local stack area exceeds representable 32-bit offsets")]
    LocalAreaOverflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_function_prefers_red_zone() {
        let mut frame = StackFrame::new(true);
        let offset = frame.allocate_slot(8, 8).unwrap();
        assert!(frame.uses_red_zone);
        assert_eq!(offset, -8);
        frame.finalize();
        assert_eq!(frame.total_size, 0);
        assert!(!frame.needs_frame_pointer);
    }

    #[test]
    fn leaf_function_overflowing_red_zone_falls_back_to_locals() {
        let mut frame = StackFrame::new(true);
        for _ in 0..20 {
            frame.allocate_slot(8, 8).unwrap();
        }
        assert!(frame.local_area_size > 0);
    }

    #[test]
    fn non_leaf_function_never_uses_red_zone() {
        let mut frame = StackFrame::new(false);
        frame.allocate_slot(8, 8).unwrap();
        assert!(!frame.uses_red_zone);
        frame.finalize();
        assert!(frame.needs_frame_pointer);
        assert_eq!(frame.total_size % STACK_ALIGNMENT, 0);
    }

    #[test]
    fn rejects_non_power_of_two_alignment() {
        let mut frame = StackFrame::new(false);
        assert!(frame.allocate_slot(8, 3).is_err());
    }

    #[test]
    fn sysv_is_default_convention() {
        assert_eq!(CallingConvention::for_function_name("compute"), CallingConvention::SysV);
        assert_eq!(CallingConvention::for_function_name("sys_write"), CallingConvention::Syscall);
    }

    #[test]
    fn fastcall_and_vectorcall_are_distinct_from_sysv_and_syscall() {
        let tags = [CallingConvention::SysV, CallingConvention::Syscall, CallingConvention::Fastcall, CallingConvention::Vectorcall];
        for (i, a) in tags.iter().enumerate() {
            for (j, b) in tags.iter().enumerate() {
                assert_eq!(a == b, i == j);
            }
        }
    }
}

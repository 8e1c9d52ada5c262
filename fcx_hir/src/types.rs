//! Type-class tags attached to vregs and instruction results.
//!
//! Mirrors the shape of the teacher's `IrType` (one flat enum of primitives
//! plus a pointer wrapper) but trimmed to what the operator-centric HIR
//! actually needs: FCx has no struct/array aggregate types at this layer,
//! only scalar widths and pointers to them.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Void,
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    I256,
    I512,
    I1024,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    U512,
    U1024,
    F32,
    F64,
    Ptr(Box<TypeClass>),
    RawPtr,
}

impl TypeClass {
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            TypeClass::I8
                | TypeClass::I16
                | TypeClass::I32
                | TypeClass::I64
                | TypeClass::I128
                | TypeClass::I256
                | TypeClass::I512
                | TypeClass::I1024
                | TypeClass::U8
                | TypeClass::U16
                | TypeClass::U32
                | TypeClass::U64
                | TypeClass::U128
                | TypeClass::U256
                | TypeClass::U512
                | TypeClass::U1024
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, TypeClass::F32 | TypeClass::F64)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, TypeClass::Ptr(_) | TypeClass::RawPtr)
    }

    /// Bit width of the type for vreg-width tagging; pointers report 64.
    pub fn bit_width(&self) -> u32 {
        match self {
            TypeClass::Void => 0,
            TypeClass::Bool | TypeClass::I8 | TypeClass::U8 => 8,
            TypeClass::I16 | TypeClass::U16 => 16,
            TypeClass::I32 | TypeClass::U32 | TypeClass::F32 => 32,
            TypeClass::I64 | TypeClass::U64 | TypeClass::F64 => 64,
            TypeClass::I128 | TypeClass::U128 => 128,
            TypeClass::I256 | TypeClass::U256 => 256,
            TypeClass::I512 | TypeClass::U512 => 512,
            TypeClass::I1024 | TypeClass::U1024 => 1024,
            TypeClass::Ptr(_) | TypeClass::RawPtr => 64,
        }
    }

    /// Parses one of the parser's type-name spellings (see `fcx_parser::parser::TYPE_KEYWORDS`).
    pub fn from_name(name: &str) -> Option<TypeClass> {
        Some(match name {
            "bool" => TypeClass::Bool,
            "i8" => TypeClass::I8,
            "i16" => TypeClass::I16,
            "i32" => TypeClass::I32,
            "i64" => TypeClass::I64,
            "i128" => TypeClass::I128,
            "i256" => TypeClass::I256,
            "i512" => TypeClass::I512,
            "i1024" => TypeClass::I1024,
            "u8" => TypeClass::U8,
            "u16" => TypeClass::U16,
            "u32" => TypeClass::U32,
            "u64" => TypeClass::U64,
            "u128" => TypeClass::U128,
            "u256" => TypeClass::U256,
            "u512" => TypeClass::U512,
            "u1024" => TypeClass::U1024,
            "f32" => TypeClass::F32,
            "f64" => TypeClass::F64,
            "rawptr" => TypeClass::RawPtr,
            "ptr" => TypeClass::Ptr(Box::new(TypeClass::I64)),
            _ => return None,
        })
    }
}

impl Default for TypeClass {
    fn default() -> Self {
        TypeClass::I64
    }
}

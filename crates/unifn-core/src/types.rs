//! Native type descriptors.
//!
//! A `TypeDesc` names the native type of one argument or of a return value.
//! The core only forwards descriptors to the invocation backend; it never
//! looks inside them beyond the helpers below.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Native scalar type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDesc {
    Void,
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// Opaque native address (`void*`, `char*`, output locations, callbacks)
    Pointer,
}

impl TypeDesc {
    pub fn is_void(self) -> bool {
        self == TypeDesc::Void
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeDesc::Void => "void",
            TypeDesc::Bool => "bool",
            TypeDesc::I8 => "int8",
            TypeDesc::U8 => "uint8",
            TypeDesc::I16 => "int16",
            TypeDesc::U16 => "uint16",
            TypeDesc::I32 => "int32",
            TypeDesc::U32 => "uint32",
            TypeDesc::I64 => "int64",
            TypeDesc::U64 => "uint64",
            TypeDesc::F32 => "float",
            TypeDesc::F64 => "double",
            TypeDesc::Pointer => "pointer",
        };
        write!(f, "{name}")
    }
}

/// Error returned when a type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownType(pub String);

impl fmt::Display for UnknownType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown native type '{}'", self.0)
    }
}

impl std::error::Error for UnknownType {}

impl FromStr for TypeDesc {
    type Err = UnknownType;

    /// Parse a C-style type name (`int`, `unsigned long`, `char*`, `int32`, ...).
    ///
    /// Sizes follow the LP64 data model.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();

        if name.contains('*') {
            return Ok(TypeDesc::Pointer);
        }

        // Collapse runs of whitespace so "unsigned   int" parses
        let normalized = name.split_whitespace().collect::<Vec<_>>().join(" ");

        let ty = match normalized.as_str() {
            "void" => TypeDesc::Void,
            "bool" | "_Bool" => TypeDesc::Bool,
            "char" | "signed char" | "int8" | "int8_t" | "i8" => TypeDesc::I8,
            "unsigned char" | "uint8" | "uint8_t" | "u8" => TypeDesc::U8,
            "short" | "int16" | "int16_t" | "i16" => TypeDesc::I16,
            "unsigned short" | "uint16" | "uint16_t" | "u16" => TypeDesc::U16,
            "int" | "int32" | "int32_t" | "i32" => TypeDesc::I32,
            "unsigned" | "unsigned int" | "uint32" | "uint32_t" | "u32" => TypeDesc::U32,
            "long" | "long long" | "ssize_t" | "ptrdiff_t" | "int64" | "int64_t" | "i64" => {
                TypeDesc::I64
            }
            "unsigned long" | "unsigned long long" | "size_t" | "uint64" | "uint64_t"
            | "u64" => TypeDesc::U64,
            "float" | "f32" => TypeDesc::F32,
            "double" | "f64" => TypeDesc::F64,
            "pointer" | "ptr" | "intptr_t" | "uintptr_t" => TypeDesc::Pointer,
            _ => return Err(UnknownType(name.to_string())),
        };
        Ok(ty)
    }
}

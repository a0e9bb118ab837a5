//! Conversion between `Value`s and native scalars.

use libffi::middle::{Arg, Type, arg};
use std::ffi::c_void;
use unifn_core::{Result, TypeDesc, UnifyError, Value};

/// Map a type descriptor to its libffi type.
pub fn to_libffi_type(ty: TypeDesc) -> Type {
    match ty {
        TypeDesc::Void => Type::void(),
        // C `bool` is one byte holding 0 or 1
        TypeDesc::Bool | TypeDesc::U8 => Type::u8(),
        TypeDesc::I8 => Type::i8(),
        TypeDesc::I16 => Type::i16(),
        TypeDesc::U16 => Type::u16(),
        TypeDesc::I32 => Type::i32(),
        TypeDesc::U32 => Type::u32(),
        TypeDesc::I64 => Type::i64(),
        TypeDesc::U64 => Type::u64(),
        TypeDesc::F32 => Type::f32(),
        TypeDesc::F64 => Type::f64(),
        TypeDesc::Pointer => Type::pointer(),
    }
}

/// Reject `void` in argument position.
pub fn check_arg_types(context: &str, types: &[TypeDesc]) -> Result<()> {
    match types.iter().find(|ty| ty.is_void()) {
        Some(ty) => Err(UnifyError::UnsupportedType {
            context: format!("{context}: argument"),
            ty: *ty,
        }),
        None => Ok(()),
    }
}

/// A value converted to its native representation.
///
/// Arguments are built into a `Vec<NativeArg>` first so that the storage
/// outlives the `Arg`s that point into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeArg {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Ptr(*const c_void),
}

impl NativeArg {
    /// Convert `value` to native type `ty`. `position` is only used for errors.
    pub fn from_value(position: usize, value: &Value, ty: TypeDesc) -> Result<Self> {
        let mismatch = || UnifyError::type_mismatch(position, ty, value);

        let converted = match ty {
            TypeDesc::Void => {
                return Err(UnifyError::UnsupportedType {
                    context: format!("argument {position}"),
                    ty,
                });
            }
            TypeDesc::Bool => match value {
                Value::Bool(b) => NativeArg::U8(*b as u8),
                Value::Int(n) => NativeArg::U8((*n != 0) as u8),
                _ => return Err(mismatch()),
            },
            TypeDesc::I8 => NativeArg::I8(narrow(value).ok_or_else(mismatch)?),
            TypeDesc::U8 => NativeArg::U8(narrow(value).ok_or_else(mismatch)?),
            TypeDesc::I16 => NativeArg::I16(narrow(value).ok_or_else(mismatch)?),
            TypeDesc::U16 => NativeArg::U16(narrow(value).ok_or_else(mismatch)?),
            TypeDesc::I32 => NativeArg::I32(narrow(value).ok_or_else(mismatch)?),
            TypeDesc::U32 => NativeArg::U32(narrow(value).ok_or_else(mismatch)?),
            TypeDesc::I64 => NativeArg::I64(value.as_int().ok_or_else(mismatch)?),
            // `Int` carries a u64 as its two's complement bit pattern
            TypeDesc::U64 => NativeArg::U64(value.as_int().ok_or_else(mismatch)? as u64),
            TypeDesc::F32 => NativeArg::F32(value.as_float().ok_or_else(mismatch)? as f32),
            TypeDesc::F64 => NativeArg::F64(value.as_float().ok_or_else(mismatch)?),
            TypeDesc::Pointer => NativeArg::Ptr(address_of(value).ok_or_else(mismatch)? as *const c_void),
        };
        Ok(converted)
    }

    pub fn as_arg(&self) -> Arg {
        match self {
            NativeArg::I8(v) => arg(v),
            NativeArg::U8(v) => arg(v),
            NativeArg::I16(v) => arg(v),
            NativeArg::U16(v) => arg(v),
            NativeArg::I32(v) => arg(v),
            NativeArg::U32(v) => arg(v),
            NativeArg::I64(v) => arg(v),
            NativeArg::U64(v) => arg(v),
            NativeArg::F32(v) => arg(v),
            NativeArg::F64(v) => arg(v),
            NativeArg::Ptr(v) => arg(v),
        }
    }

    /// Write this value into a libffi closure return slot.
    ///
    /// Integers narrower than a register are widened to the full register,
    /// as libffi expects.
    ///
    /// # Safety
    /// `slot` must be the result buffer libffi passed to a closure callback.
    pub unsafe fn store_return(&self, slot: *mut u64) {
        unsafe {
            match *self {
                NativeArg::I8(v) => *(slot as *mut isize) = v as isize,
                NativeArg::I16(v) => *(slot as *mut isize) = v as isize,
                NativeArg::I32(v) => *(slot as *mut isize) = v as isize,
                NativeArg::U8(v) => *(slot as *mut usize) = v as usize,
                NativeArg::U16(v) => *(slot as *mut usize) = v as usize,
                NativeArg::U32(v) => *(slot as *mut usize) = v as usize,
                NativeArg::I64(v) => *(slot as *mut i64) = v,
                NativeArg::U64(v) => *slot = v,
                NativeArg::F32(v) => *(slot as *mut f32) = v,
                NativeArg::F64(v) => *(slot as *mut f64) = v,
                NativeArg::Ptr(v) => *(slot as *mut *const c_void) = v,
            }
        }
    }
}

fn narrow<T: TryFrom<i64>>(value: &Value) -> Option<T> {
    value.as_int().and_then(|n| T::try_from(n).ok())
}

/// Address carried by a value passed where a native pointer is expected.
///
/// Unified callables pass their pointer facet, so they can be handed to
/// native code as callbacks.
fn address_of(value: &Value) -> Option<usize> {
    match value {
        Value::Unified(callable) => Some(callable.pointer().addr()),
        Value::Int(n) => usize::try_from(*n).ok(),
        other => other.as_pointer(),
    }
}

/// Read one closure argument of type `ty`.
///
/// # Safety
/// `ptr` must point to a live value of native type `ty`.
pub unsafe fn read_arg(ptr: *const c_void, ty: TypeDesc) -> Value {
    unsafe {
        match ty {
            TypeDesc::Void => Value::Null,
            TypeDesc::Bool => Value::Bool(*(ptr as *const u8) != 0),
            TypeDesc::I8 => Value::Int(*(ptr as *const i8) as i64),
            TypeDesc::U8 => Value::Int(*(ptr as *const u8) as i64),
            TypeDesc::I16 => Value::Int(*(ptr as *const i16) as i64),
            TypeDesc::U16 => Value::Int(*(ptr as *const u16) as i64),
            TypeDesc::I32 => Value::Int(*(ptr as *const i32) as i64),
            TypeDesc::U32 => Value::Int(*(ptr as *const u32) as i64),
            TypeDesc::I64 => Value::Int(*(ptr as *const i64)),
            TypeDesc::U64 => Value::Int(*(ptr as *const u64) as i64),
            TypeDesc::F32 => Value::Float(*(ptr as *const f32) as f64),
            TypeDesc::F64 => Value::Float(*(ptr as *const f64)),
            TypeDesc::Pointer => Value::Pointer(*(ptr as *const *const c_void) as usize),
        }
    }
}

//! Native call dispatch via libffi.
//!
//! Wraps `libffi::middle::Cif` to call a native pointer with `Value`
//! arguments and convert the result back.

use crate::marshal::{NativeArg, check_arg_types, to_libffi_type};
use libffi::middle::{Arg, Builder, Cif, CodePtr};
use std::ffi::c_void;
use std::sync::Arc;
use tracing::trace;
use unifn_core::{NativePointer, Procedure, Result, TypeDesc, UnifyError, Value};

/// Prepare a libffi CIF for `types -> ret`.
pub fn prepare_cif(ret: TypeDesc, types: &[TypeDesc]) -> Cif {
    Builder::new()
        .args(types.iter().map(|ty| to_libffi_type(*ty)))
        .res(to_libffi_type(ret))
        .into_cif()
}

/// A CIF bound to one native function.
struct PreparedCall {
    cif: Cif,
    code: CodePtr,
    // Holds generated code alive when the pointer came from a trampoline.
    _pointer: NativePointer,
    ret: TypeDesc,
    types: Vec<TypeDesc>,
}

// SAFETY: the CIF and code pointer are immutable after preparation and
// libffi only reads them during a call.
unsafe impl Send for PreparedCall {}
unsafe impl Sync for PreparedCall {}

impl PreparedCall {
    fn call(&self, args: &[Value]) -> Result<Value> {
        if args.len() != self.types.len() {
            return Err(UnifyError::ffi(
                "call",
                format!("expected {} arguments, got {}", self.types.len(), args.len()),
            ));
        }

        let marshalled: Vec<NativeArg> = args
            .iter()
            .zip(self.types.iter())
            .enumerate()
            .map(|(position, (value, ty))| NativeArg::from_value(position, value, *ty))
            .collect::<Result<Vec<_>>>()?;

        let ffi_args: Vec<Arg> = marshalled.iter().map(NativeArg::as_arg).collect();

        trace!(target: "unifn::ffi", ret = %self.ret, argc = ffi_args.len(), "native call");

        // SAFETY: the pointer was promised to match this signature when the
        // `NativePointer` was created, and the arguments were marshalled to
        // exactly the declared types.
        unsafe { self.dispatch(&ffi_args) }
    }

    unsafe fn dispatch(&self, ffi_args: &[Arg]) -> Result<Value> {
        let cif = &self.cif;
        let code = self.code;
        unsafe {
            let value = match self.ret {
                TypeDesc::Void => {
                    cif.call::<()>(code, ffi_args);
                    Value::Null
                }
                TypeDesc::Bool => {
                    let r: u8 = cif.call(code, ffi_args);
                    Value::Bool(r != 0)
                }
                TypeDesc::I8 => {
                    let r: i8 = cif.call(code, ffi_args);
                    Value::Int(r as i64)
                }
                TypeDesc::U8 => {
                    let r: u8 = cif.call(code, ffi_args);
                    Value::Int(r as i64)
                }
                TypeDesc::I16 => {
                    let r: i16 = cif.call(code, ffi_args);
                    Value::Int(r as i64)
                }
                TypeDesc::U16 => {
                    let r: u16 = cif.call(code, ffi_args);
                    Value::Int(r as i64)
                }
                TypeDesc::I32 => {
                    let r: i32 = cif.call(code, ffi_args);
                    Value::Int(r as i64)
                }
                TypeDesc::U32 => {
                    let r: u32 = cif.call(code, ffi_args);
                    Value::Int(r as i64)
                }
                TypeDesc::I64 => {
                    let r: i64 = cif.call(code, ffi_args);
                    Value::Int(r)
                }
                TypeDesc::U64 => {
                    // Same bits; `NativeArg::from_value` converts back losslessly
                    let r: u64 = cif.call(code, ffi_args);
                    Value::Int(r as i64)
                }
                TypeDesc::F32 => {
                    let r: f32 = cif.call(code, ffi_args);
                    Value::Float(r as f64)
                }
                TypeDesc::F64 => {
                    let r: f64 = cif.call(code, ffi_args);
                    Value::Float(r)
                }
                TypeDesc::Pointer => {
                    let r: *const c_void = cif.call(code, ffi_args);
                    Value::Pointer(r as usize)
                }
            };
            Ok(value)
        }
    }
}

/// Build a procedure calling `pointer` with exactly `types.len()` arguments.
pub fn native_invoker(
    ret: TypeDesc,
    pointer: NativePointer,
    types: &[TypeDesc],
) -> Result<Procedure> {
    check_arg_types("invoke", types)?;

    let name = format!("native@{pointer}");
    let prepared = Arc::new(PreparedCall {
        cif: prepare_cif(ret, types),
        code: CodePtr::from_ptr(pointer.as_ptr()),
        _pointer: pointer,
        ret,
        types: types.to_vec(),
    });

    Ok(Procedure::new(name, move |args| {
        prepared.call(args)
    }))
}

//! Native entry points for managed procedures.
//!
//! A trampoline is a libffi closure: a freshly generated function pointer
//! with a fixed native signature that, when called, reads its arguments,
//! calls a `Procedure`, and writes the result back.
//!
//! Errors cannot cross the C boundary. A failing or panicking procedure is
//! logged and the native caller receives the zero value of the return type.

use crate::invoke::prepare_cif;
use crate::marshal::{NativeArg, check_arg_types, read_arg};
use libffi::low::ffi_cif;
use libffi::middle::Closure;
use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, trace};
use unifn_core::{NativePointer, Procedure, Result, TypeDesc, UnifyError, Value};

struct TrampolineData {
    procedure: Procedure,
    ret: TypeDesc,
    types: Vec<TypeDesc>,
}

impl TrampolineData {
    /// # Safety
    /// `args` must hold `self.types.len()` pointers to values of those types.
    unsafe fn read_args(&self, args: *const *const c_void) -> Vec<Value> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, ty)| unsafe { read_arg(*args.add(i), *ty) })
            .collect()
    }

    fn convert_return(&self, value: &Value) -> Result<Option<NativeArg>> {
        if self.ret.is_void() {
            return Ok(None);
        }
        NativeArg::from_value(0, value, self.ret)
            .map(Some)
            .map_err(|e| UnifyError::ffi("callback return", e.to_string()))
    }
}

unsafe extern "C" fn trampoline_entry(
    _cif: &ffi_cif,
    result: &mut u64,
    args: *const *const c_void,
    data: &TrampolineData,
) {
    let slot: *mut u64 = result;
    // Zero first so every failure path returns the zero value.
    unsafe { *slot = 0 };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let values = unsafe { data.read_args(args) };
        trace!(
            target: "unifn::trampoline",
            procedure = data.procedure.name(),
            argc = values.len(),
            "native call into managed procedure"
        );
        let value = data.procedure.call(&values)?;
        data.convert_return(&value)
    }));

    match outcome {
        Ok(Ok(Some(native))) => unsafe { native.store_return(slot) },
        Ok(Ok(None)) => {}
        Ok(Err(err)) => error!(
            target: "unifn::trampoline",
            procedure = data.procedure.name(),
            %err,
            "managed procedure failed inside native callback"
        ),
        Err(_) => error!(
            target: "unifn::trampoline",
            procedure = data.procedure.name(),
            "managed procedure panicked inside native callback"
        ),
    }
}

/// Owns a libffi closure and the procedure it calls.
pub struct Trampoline {
    // Dropped before `_data`, which the closure borrows.
    closure: Closure<'static>,
    _data: Arc<TrampolineData>,
}

// SAFETY: the closure's code and userdata are never mutated after creation,
// and the procedure it calls is itself `Send + Sync`.
unsafe impl Send for Trampoline {}
unsafe impl Sync for Trampoline {}

impl Trampoline {
    /// Generate a native function `types -> ret` that calls `procedure`.
    pub fn new(ret: TypeDesc, procedure: &Procedure, types: &[TypeDesc]) -> Result<Self> {
        check_arg_types("derive", types)?;

        let data = Arc::new(TrampolineData {
            procedure: procedure.clone(),
            ret,
            types: types.to_vec(),
        });

        // SAFETY: `data` lives in the returned `Trampoline` and is dropped
        // after `closure`, so the reference never dangles while callable.
        let userdata: &'static TrampolineData = unsafe { &*Arc::as_ptr(&data) };
        let closure = Closure::new(prepare_cif(ret, types), trampoline_entry, userdata);

        Ok(Trampoline {
            closure,
            _data: data,
        })
    }

    /// The generated entry point. It does not keep the trampoline alive.
    pub fn pointer(&self) -> Result<NativePointer> {
        let code = *self.closure.code_ptr();
        // SAFETY: the code pointer was produced by libffi for this signature.
        unsafe { NativePointer::from_raw(code as *const c_void) }
            .ok_or_else(|| UnifyError::ffi("derive", "libffi returned a null closure"))
    }
}

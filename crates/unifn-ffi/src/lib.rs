//! libffi backend for unifn.
//!
//! Provides the two capabilities the core delegates to:
//! - calling a native pointer with `Value` arguments ([`invoke`])
//! - turning a managed procedure into a native pointer ([`trampoline`])
//!
//! plus symbol lookup so callers can find native functions by name.
//!
//! # Safety
//!
//! Native calls trust the signature they are given. Unifying a pointer with
//! the wrong signature is undefined behavior, which is why creating a
//! `NativePointer` is `unsafe`.

pub mod invoke;
pub mod marshal;
pub mod symbol;
pub mod trampoline;

use std::sync::Arc;
use trampoline::Trampoline;
use unifn_core::{
    ArgSpec, Behavior, InvocationPrimitive, NativePointer, PointerDerivation,
    Procedure, Result, TypeDesc, UnifiedCallable, Unifier, Value,
};

pub use unifn_core;

/// The libffi implementation of both backend capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibffiBackend;

impl InvocationPrimitive for LibffiBackend {
    fn invoker(
        &self,
        ret: TypeDesc,
        pointer: NativePointer,
        types: &[TypeDesc],
    ) -> Result<Procedure> {
        invoke::native_invoker(ret, pointer, types)
    }
}

impl PointerDerivation for LibffiBackend {
    fn derive(
        &self,
        ret: TypeDesc,
        procedure: &Procedure,
        types: &[TypeDesc],
    ) -> Result<NativePointer> {
        let trampoline = Trampoline::new(ret, procedure, types)?;
        let pointer = trampoline.pointer()?;
        Ok(pointer.with_owner(Arc::new(trampoline)))
    }
}

/// A `Unifier` wired to the libffi backend.
pub fn unifier() -> Unifier {
    let backend = Arc::new(LibffiBackend);
    Unifier::new(backend.clone(), backend)
}

/// Unify `behavior` under `specs -> ret` using libffi.
pub fn unify(ret: TypeDesc, behavior: Behavior, specs: &[ArgSpec]) -> Result<UnifiedCallable> {
    unifier().unify(ret, behavior, specs)
}

/// Unify a dynamically typed value using libffi.
///
/// # Safety
/// See [`Unifier::unify_value`].
pub unsafe fn unify_value(ret: TypeDesc, value: &Value, specs: &[ArgSpec]) -> Result<UnifiedCallable> {
    unsafe { unifier().unify_value(ret, value, specs) }
}

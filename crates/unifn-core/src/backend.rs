//! Contracts for the foreign-function layer.
//!
//! The core never performs native calls itself. It asks an
//! [`InvocationPrimitive`] for a procedure that calls a pointer, and a
//! [`PointerDerivation`] for a pointer that calls a procedure.

use crate::error::Result;
use crate::procedure::Procedure;
use crate::types::TypeDesc;
use std::any::Any;
use std::ffi::c_void;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr::NonNull;
use std::sync::Arc;

/// Shared handle keeping generated code alive.
pub type CodeOwner = Arc<dyn Any + Send + Sync>;

/// A non-null native function pointer.
///
/// A pointer generated for a managed procedure carries an owner for the
/// generated code. Every clone shares it, so the code stays callable while
/// any copy of the pointer, or any callable built from one, is alive.
/// Equality and hashing only look at the address.
#[derive(Clone)]
pub struct NativePointer {
    raw: NonNull<c_void>,
    owner: Option<CodeOwner>,
}

// SAFETY: a code address is never dereferenced as data by this crate; it is
// only handed to the invocation backend. The owner is `Send + Sync`.
unsafe impl Send for NativePointer {}
unsafe impl Sync for NativePointer {}

impl NativePointer {
    /// Wrap a raw function pointer. Returns `None` for null.
    ///
    /// # Safety
    /// `ptr` must point to a function whose native signature matches every
    /// signature it is later unified with, and must stay valid for as long as
    /// any callable built from it is used.
    pub unsafe fn from_raw(ptr: *const c_void) -> Option<Self> {
        NonNull::new(ptr as *mut c_void).map(|raw| NativePointer { raw, owner: None })
    }

    /// Tie the code behind this pointer to `owner`.
    pub fn with_owner(mut self, owner: CodeOwner) -> Self {
        self.owner = Some(owner);
        self
    }

    /// True when this pointer keeps its code alive.
    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    pub fn as_ptr(&self) -> *const c_void {
        self.raw.as_ptr()
    }

    pub fn addr(&self) -> usize {
        self.raw.as_ptr() as usize
    }
}

impl PartialEq for NativePointer {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for NativePointer {}

impl Hash for NativePointer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Debug for NativePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativePointer({:#x})", self.addr())
    }
}

impl fmt::Display for NativePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.addr())
    }
}

/// Builds procedures that call native pointers.
pub trait InvocationPrimitive: Send + Sync {
    /// Return a procedure taking exactly `types.len()` arguments that marshals
    /// them, calls `pointer`, and converts the result to `ret`.
    fn invoker(
        &self,
        ret: TypeDesc,
        pointer: NativePointer,
        types: &[TypeDesc],
    ) -> Result<Procedure>;
}

/// Builds native pointers that call procedures.
pub trait PointerDerivation: Send + Sync {
    /// Return a pointer with native signature `types -> ret` that enters
    /// `procedure` when called. The pointer must own the generated code.
    fn derive(
        &self,
        ret: TypeDesc,
        procedure: &Procedure,
        types: &[TypeDesc],
    ) -> Result<NativePointer>;
}

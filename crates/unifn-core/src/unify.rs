//! The unification façade.
//!
//! [`Unifier::unify`] turns either a managed procedure or a native pointer
//! into a [`UnifiedCallable`] that exposes both views of the same behavior
//! together with its per-argument defaults.
//!
//! Only callables built from a native pointer check arity and pad omitted
//! arguments. A managed procedure is used as-is and is expected to handle
//! its own optional arguments.

use crate::adapter;
use crate::backend::{InvocationPrimitive, NativePointer, PointerDerivation};
use crate::descriptor::{self, ArgSpec, Arity};
use crate::error::{Result, UnifyError};
use crate::procedure::Procedure;
use crate::types::TypeDesc;
use crate::value::Value;
use std::ffi::c_void;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// What a callable is built from.
#[derive(Debug, Clone)]
pub enum Behavior {
    Procedure(Procedure),
    Native(NativePointer),
}

impl From<Procedure> for Behavior {
    fn from(p: Procedure) -> Self {
        Behavior::Procedure(p)
    }
}

impl From<NativePointer> for Behavior {
    fn from(ptr: NativePointer) -> Self {
        Behavior::Native(ptr)
    }
}

/// Which facet was supplied and which was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Built from a managed procedure; the pointer is a trampoline
    Managed,
    /// Built from a native pointer; the procedure is an arity-checked adapter
    Native,
}

/// A behavior callable both as a procedure and through a native pointer.
///
/// All fields are set once by [`Unifier::unify`] and never change.
pub struct UnifiedCallable {
    procedure: Procedure,
    pointer: NativePointer,
    defaults: Vec<Option<Value>>,
    ret: TypeDesc,
    types: Vec<TypeDesc>,
    arity: Arity,
    origin: Origin,
}

impl UnifiedCallable {
    /// Invoke the procedure facet.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        self.procedure.call(args)
    }

    pub fn procedure(&self) -> &Procedure {
        &self.procedure
    }

    /// The pointer facet. For a managed behavior the returned pointer shares
    /// ownership of the generated code, so it stays valid after this
    /// callable is dropped.
    pub fn pointer(&self) -> NativePointer {
        self.pointer.clone()
    }

    /// One slot per declared argument, `None` where no default was given.
    pub fn defaults(&self) -> &[Option<Value>] {
        &self.defaults
    }

    pub fn return_type(&self) -> TypeDesc {
        self.ret
    }

    pub fn arg_types(&self) -> &[TypeDesc] {
        &self.types
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }
}

impl fmt::Debug for UnifiedCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnifiedCallable")
            .field("procedure", &self.procedure)
            .field("pointer", &self.pointer)
            .field("defaults", &self.defaults)
            .field("ret", &self.ret)
            .field("types", &self.types)
            .field("origin", &self.origin)
            .finish()
    }
}

/// Builds unified callables on top of a foreign-function backend.
#[derive(Clone)]
pub struct Unifier {
    invoker: Arc<dyn InvocationPrimitive>,
    deriver: Arc<dyn PointerDerivation>,
}

impl Unifier {
    pub fn new(invoker: Arc<dyn InvocationPrimitive>, deriver: Arc<dyn PointerDerivation>) -> Self {
        Unifier { invoker, deriver }
    }

    /// Use one backend for both directions.
    pub fn with_backend<B>(backend: B) -> Self
    where
        B: InvocationPrimitive + PointerDerivation + 'static,
    {
        let backend = Arc::new(backend);
        Unifier {
            invoker: backend.clone(),
            deriver: backend,
        }
    }

    /// Unify `behavior` under the native signature `specs -> ret`.
    ///
    /// Nothing is built when `specs` is malformed or the backend fails.
    pub fn unify(
        &self,
        ret: TypeDesc,
        behavior: Behavior,
        specs: &[ArgSpec],
    ) -> Result<UnifiedCallable> {
        let parsed = descriptor::split(specs)?;

        let (procedure, pointer, origin) = match behavior {
            Behavior::Procedure(procedure) => {
                let pointer = self.deriver.derive(ret, &procedure, &parsed.types)?;
                (procedure, pointer, Origin::Managed)
            }
            Behavior::Native(pointer) => {
                let procedure = adapter::build_adapter(
                    self.invoker.as_ref(),
                    ret,
                    pointer.clone(),
                    &parsed,
                )?;
                (procedure, pointer, Origin::Native)
            }
        };

        debug!(
            target: "unifn::unify",
            procedure = procedure.name(),
            %pointer,
            owned = pointer.is_owned(),
            ?origin,
            %ret,
            arity = %parsed.arity,
            "unified callable"
        );

        Ok(UnifiedCallable {
            procedure,
            pointer,
            defaults: parsed.defaults,
            ret,
            types: parsed.types,
            arity: parsed.arity,
            origin,
        })
    }

    /// Unify a dynamically typed value.
    ///
    /// Procedures and unified callables take the managed path, non-null
    /// pointers the native path. Anything else is `InvalidBehaviorKind`.
    ///
    /// # Safety
    /// A `Value::Pointer` is trusted to be a function of the given signature,
    /// see [`NativePointer::from_raw`].
    pub unsafe fn unify_value(
        &self,
        ret: TypeDesc,
        value: &Value,
        specs: &[ArgSpec],
    ) -> Result<UnifiedCallable> {
        let behavior = match value {
            Value::Procedure(p) => Behavior::Procedure(p.clone()),
            Value::Unified(u) => Behavior::Procedure(u.procedure().clone()),
            Value::Pointer(addr) => {
                match unsafe { NativePointer::from_raw(*addr as *const c_void) } {
                    Some(ptr) => Behavior::Native(ptr),
                    None => {
                        return Err(UnifyError::InvalidBehaviorKind {
                            found: value.describe(),
                        });
                    }
                }
            }
            other => {
                return Err(UnifyError::InvalidBehaviorKind {
                    found: other.describe(),
                });
            }
        };
        self.unify(ret, behavior, specs)
    }
}

impl fmt::Debug for Unifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unifier").finish_non_exhaustive()
    }
}

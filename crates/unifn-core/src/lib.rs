pub mod adapter;
pub mod backend;
pub mod descriptor;
pub mod error;
pub mod introspect;
pub mod procedure;
pub mod types;
pub mod unify;
pub mod value;

#[doc(hidden)]
pub mod test_utils;

// Re-export commonly used types for convenience
pub use backend::{CodeOwner, InvocationPrimitive, NativePointer, PointerDerivation};
pub use descriptor::{ArgKind, ArgSpec, Arity, ParsedSpec};
pub use error::{Result, UnifyError};
pub use introspect::{defaults_of, is_unified, pointer_of};
pub use procedure::Procedure;
pub use types::TypeDesc;
pub use unify::{Behavior, Origin, UnifiedCallable, Unifier};
pub use value::Value;

//! Queries over arbitrary values.

use crate::backend::NativePointer;
use crate::error::{Result, UnifyError};
use crate::unify::UnifiedCallable;
use crate::value::Value;

/// True iff `value` went through unification. Plain procedures are not.
pub fn is_unified(value: &Value) -> bool {
    matches!(value, Value::Unified(_))
}

/// The native pointer attached to a unified callable.
pub fn pointer_of(value: &Value) -> Result<NativePointer> {
    unified(value).map(UnifiedCallable::pointer)
}

/// The default-value vector attached to a unified callable.
pub fn defaults_of(value: &Value) -> Result<&[Option<Value>]> {
    unified(value).map(UnifiedCallable::defaults)
}

fn unified(value: &Value) -> Result<&UnifiedCallable> {
    match value {
        Value::Unified(callable) => Ok(callable.as_ref()),
        other => Err(UnifyError::NotUnified {
            found: other.describe(),
        }),
    }
}

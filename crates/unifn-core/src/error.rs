//! Error types for unification and calls

use crate::descriptor::ArgSpec;
use crate::types::TypeDesc;
use crate::value::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, UnifyError>;

#[derive(Debug, Clone, Error)]
pub enum UnifyError {
    /// A bare type follows an optional `(type, default)` element.
    #[error(
        "malformed argument specification: required argument at position {position} follows an optional one in {}",
        format_specs(.specs)
    )]
    MalformedSpecification { position: usize, specs: Vec<ArgSpec> },

    #[error(
        "wrong number of arguments: expected {}, got {actual} ({})",
        format_bounds(.required, .total),
        format_values(.args)
    )]
    Arity {
        required: usize,
        total: usize,
        actual: usize,
        args: Vec<Value>,
    },

    #[error("cannot unify {found}: expected a procedure or a native pointer")]
    InvalidBehaviorKind { found: String },

    #[error("{found} is not a unified callable")]
    NotUnified { found: String },

    #[error("argument {position}: cannot convert {found} to {expected}")]
    TypeMismatch {
        position: usize,
        expected: TypeDesc,
        found: String,
    },

    #[error("{context}: unsupported type {ty}")]
    UnsupportedType { context: String, ty: TypeDesc },

    #[error("{context}: {message}")]
    Ffi { context: String, message: String },

    #[error("{0}")]
    Procedure(String),
}

impl UnifyError {
    /// Create an error raised by the foreign-function backend.
    pub fn ffi(context: impl Into<String>, message: impl Into<String>) -> Self {
        UnifyError::Ffi {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an error raised from inside a managed procedure body.
    pub fn procedure(message: impl Into<String>) -> Self {
        UnifyError::Procedure(message.into())
    }

    pub fn type_mismatch(position: usize, expected: TypeDesc, found: &Value) -> Self {
        UnifyError::TypeMismatch {
            position,
            expected,
            found: found.describe(),
        }
    }
}

fn format_bounds(required: &usize, total: &usize) -> String {
    if required == total {
        format!("{required}")
    } else {
        format!("{required} to {total}")
    }
}

fn format_values(values: &[Value]) -> String {
    let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", rendered.join(", "))
}

fn format_specs(specs: &[ArgSpec]) -> String {
    let rendered: Vec<String> = specs.iter().map(|s| s.to_string()).collect();
    format!("[{}]", rendered.join(", "))
}

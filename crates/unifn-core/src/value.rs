use crate::procedure::Procedure;
use crate::unify::UnifiedCallable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A managed-side value.
///
/// Scalars round-trip through serde so they can appear as defaults in
/// signature files. Callables are runtime-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Raw native address
    Pointer(usize),
    /// A managed procedure that has not been unified
    #[serde(skip)]
    Procedure(Procedure),
    /// A unified callable carrying both facets and its defaults
    #[serde(skip)]
    Unified(Arc<UnifiedCallable>),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Address carried by a pointer-like value. `Null` is address zero.
    pub fn as_pointer(&self) -> Option<usize> {
        match self {
            Value::Pointer(addr) => Some(*addr),
            Value::Null => Some(0),
            _ => None,
        }
    }

    /// Short human-readable description including the kind of value.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => format!("boolean {b}"),
            Value::Int(n) => format!("integer {n}"),
            Value::Float(x) => format!("float {x:?}"),
            Value::Pointer(addr) => format!("pointer {addr:#x}"),
            Value::Procedure(p) => format!("procedure {}", p.name()),
            Value::Unified(u) => format!("unified callable {}", u.procedure().name()),
        }
    }

    /// Parse a literal as written on a command line or after `=` in an
    /// argument descriptor: `null`, `true`, `42`, `-1`, `1.5`, `0x7ff0`.
    pub fn parse_literal(text: &str) -> Option<Value> {
        let text = text.trim();
        match text {
            "null" | "nil" => return Some(Value::Null),
            "true" => return Some(Value::Bool(true)),
            "false" => return Some(Value::Bool(false)),
            _ => {}
        }

        if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            return usize::from_str_radix(hex, 16).ok().map(Value::Pointer);
        }
        if let Ok(n) = text.parse::<i64>() {
            return Some(Value::Int(n));
        }
        text.parse::<f64>().ok().map(Value::Float)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Pointer(a), Value::Pointer(b)) => a == b,
            (Value::Procedure(a), Value::Procedure(b)) => a.ptr_eq(b),
            (Value::Unified(a), Value::Unified(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Pointer(addr) => write!(f, "{addr:#x}"),
            Value::Procedure(p) => write!(f, "<procedure {}>", p.name()),
            Value::Unified(u) => write!(
                f,
                "<unified {} @ {}>",
                u.procedure().name(),
                u.pointer()
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Procedure> for Value {
    fn from(p: Procedure) -> Self {
        Value::Procedure(p)
    }
}

impl From<UnifiedCallable> for Value {
    fn from(u: UnifiedCallable) -> Self {
        Value::Unified(Arc::new(u))
    }
}

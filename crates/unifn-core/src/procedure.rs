//! Managed procedures.
//!
//! A `Procedure` is the uniformly-invocable view of a behavior: it takes a
//! dynamically sized argument list and returns one value.

use crate::error::Result;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Signature of a procedure body.
pub type ProcFn = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

/// A cheaply clonable, thread-safe handle to a managed procedure.
#[derive(Clone)]
pub struct Procedure {
    name: Arc<str>,
    body: Arc<ProcFn>,
}

impl Procedure {
    pub fn new<F>(name: impl Into<Arc<str>>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Procedure {
            name: name.into(),
            body: Arc::new(body),
        }
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.body)(args)
    }

    /// Check if both handles share the same body.
    pub fn ptr_eq(&self, other: &Procedure) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Procedure({})", self.name)
    }
}

//! In-memory backend for exercising the core without native code.
//!
//! "Native pointers" handed out by [`MockBackend`] are fake addresses that
//! map to Rust procedures. They must never be called as real functions.
//! Invokers resolve their address on every call, so calling through a
//! released derived pointer fails instead of reaching a stale procedure.

use crate::backend::{InvocationPrimitive, NativePointer, PointerDerivation};
use crate::error::{Result, UnifyError};
use crate::procedure::Procedure;
use crate::types::TypeDesc;
use crate::value::Value;
use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Registry = Arc<Mutex<HashMap<usize, Procedure>>>;

const FIRST_ADDRESS: usize = 0x1000;
const ADDRESS_STEP: usize = 0x10;

pub struct MockBackend {
    registry: Registry,
    next_address: AtomicUsize,
    invoker_requests: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        MockBackend {
            registry: Arc::new(Mutex::new(HashMap::new())),
            next_address: AtomicUsize::new(FIRST_ADDRESS),
            invoker_requests: AtomicUsize::new(0),
        }
    }

    /// Register `body` as a "native function" and return its fake address.
    pub fn register<F>(&self, name: &str, body: F) -> NativePointer
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.insert(Procedure::new(name, body))
    }

    /// Number of times `invoker` has been asked for a raw invoker.
    pub fn invoker_requests(&self) -> usize {
        self.invoker_requests.load(Ordering::SeqCst)
    }

    /// Number of live fake functions.
    pub fn live_functions(&self) -> usize {
        lock(&self.registry).len()
    }

    fn insert(&self, procedure: Procedure) -> NativePointer {
        let addr = self.next_address.fetch_add(ADDRESS_STEP, Ordering::SeqCst);
        lock(&self.registry).insert(addr, procedure);
        // SAFETY: fake addresses are only ever resolved through the registry.
        unsafe { NativePointer::from_raw(addr as *const c_void) }
            .expect("fake addresses start above zero")
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<usize, Procedure>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InvocationPrimitive for MockBackend {
    fn invoker(
        &self,
        _ret: TypeDesc,
        pointer: NativePointer,
        types: &[TypeDesc],
    ) -> Result<Procedure> {
        self.invoker_requests.fetch_add(1, Ordering::SeqCst);

        if !lock(&self.registry).contains_key(&pointer.addr()) {
            return Err(UnifyError::ffi("invoke", format!("no function at {pointer}")));
        }

        let registry = Arc::clone(&self.registry);
        let expected = types.len();
        Ok(Procedure::new(format!("native@{pointer}"), move |args| {
            if args.len() != expected {
                return Err(UnifyError::ffi(
                    "invoke",
                    format!("expected {expected} arguments, got {}", args.len()),
                ));
            }
            let target = lock(&registry)
                .get(&pointer.addr())
                .cloned()
                .ok_or_else(|| UnifyError::ffi("invoke", format!("no function at {pointer}")))?;
            target.call(args)
        }))
    }
}

/// Removes a derived fake function when dropped.
struct Registration {
    registry: Registry,
    addr: usize,
}

impl Drop for Registration {
    fn drop(&mut self) {
        lock(&self.registry).remove(&self.addr);
    }
}

impl PointerDerivation for MockBackend {
    fn derive(
        &self,
        _ret: TypeDesc,
        procedure: &Procedure,
        _types: &[TypeDesc],
    ) -> Result<NativePointer> {
        let pointer = self.insert(procedure.clone());
        let addr = pointer.addr();
        Ok(pointer.with_owner(Arc::new(Registration {
            registry: Arc::clone(&self.registry),
            addr,
        })))
    }
}

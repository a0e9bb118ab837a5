// Common native fixtures shared by the integration tests

#![allow(dead_code)]

use std::ffi::c_void;
use unifn_ffi::unifn_core::NativePointer;

/// Wrap a function address in a `NativePointer`.
pub fn native(ptr: *const c_void) -> NativePointer {
    unsafe { NativePointer::from_raw(ptr) }.expect("fixture functions are never null")
}

pub extern "C" fn increment(n: i32) -> i32 {
    n + 1
}

pub extern "C" fn add3(a: i32, b: i32, c: i32) -> i32 {
    a + b + c
}

pub extern "C" fn scale(x: f64, factor: f64) -> f64 {
    x * factor
}

pub extern "C" fn widen(a: u8, b: i16, c: u32) -> i64 {
    a as i64 + b as i64 + c as i64
}

pub extern "C" fn is_positive(n: i64) -> bool {
    n > 0
}

pub extern "C" fn max_u64() -> u64 {
    u64::MAX
}

pub extern "C" fn identity_u64(n: u64) -> u64 {
    n
}

pub extern "C" fn max_u32() -> u32 {
    u32::MAX
}

pub extern "C" fn identity_u32(n: u32) -> u32 {
    n
}

/// Writes `value` into the location `out` points to.
pub extern "C" fn store(out: *mut i32, value: i32) {
    unsafe { *out = value };
}

/// Calls `callback` twice, feeding the first result back in.
pub extern "C" fn apply_twice(callback: extern "C" fn(i32) -> i32, x: i32) -> i32 {
    callback(callback(x))
}

// Integration tests: managed procedures called from native code

mod common;

use common::*;
use std::ffi::c_void;
use std::sync::Arc;
use unifn_ffi::unifn_core::{
    ArgSpec, Behavior, Origin, Procedure, TypeDesc, UnifyError, Value, defaults_of, is_unified,
    pointer_of,
};
use unifn_ffi::unify;

fn doubler() -> Procedure {
    Procedure::new("doubler", |args| {
        let n = args
            .first()
            .and_then(Value::as_int)
            .ok_or_else(|| UnifyError::procedure("doubler: expected an integer"))?;
        Ok(Value::Int(n * 2))
    })
}

#[test]
fn test_derived_pointer_is_callable_natively() {
    let callable = unify(TypeDesc::I32, doubler().into(), &[ArgSpec::Bare(TypeDesc::I32)]).unwrap();
    assert_eq!(callable.origin(), Origin::Managed);

    let f: extern "C" fn(i32) -> i32 = unsafe { std::mem::transmute(callable.pointer().as_ptr()) };
    assert_eq!(f(21), 42);
    assert_eq!(callable.call(&[Value::Int(21)]).unwrap(), Value::Int(42));
}

#[test]
fn test_round_trip_preserves_behavior() {
    let specs = [ArgSpec::Bare(TypeDesc::I32)];
    let managed = unify(TypeDesc::I32, doubler().into(), &specs).unwrap();
    let native = unify(TypeDesc::I32, Behavior::Native(managed.pointer()), &specs).unwrap();

    for n in [-5, 0, 1, 1000] {
        assert_eq!(
            native.call(&[Value::Int(n)]).unwrap(),
            managed.call(&[Value::Int(n)]).unwrap()
        );
    }

    // The re-wrapped pointer is arity checked, the managed original is not
    assert!(matches!(native.call(&[]), Err(UnifyError::Arity { .. })));
    assert!(matches!(managed.call(&[]), Err(UnifyError::Procedure(_))));
}

#[test]
fn test_pointer_outlives_original_callable() {
    let specs = [ArgSpec::Bare(TypeDesc::I32)];
    let managed = unify(TypeDesc::I32, doubler().into(), &specs).unwrap();
    let pointer = managed.pointer();
    drop(managed);

    let native = unify(TypeDesc::I32, Behavior::Native(pointer), &specs).unwrap();
    assert_eq!(native.call(&[Value::Int(21)]).unwrap(), Value::Int(42));

    // The re-wrapped callable hands out a pointer that still owns the code
    let again = native.pointer();
    drop(native);
    let f: extern "C" fn(i32) -> i32 = unsafe { std::mem::transmute(again.as_ptr()) };
    assert_eq!(f(5), 10);
}

#[test]
fn test_unsigned_values_cross_callbacks() {
    let identity = Procedure::new("identity", |args| Ok(args[0].clone()));
    let specs = [ArgSpec::Bare(TypeDesc::U64)];
    let managed = unify(TypeDesc::U64, identity.into(), &specs).unwrap();

    let f: extern "C" fn(u64) -> u64 = unsafe { std::mem::transmute(managed.pointer().as_ptr()) };
    assert_eq!(f(u64::MAX), u64::MAX);

    let native = unify(TypeDesc::U64, Behavior::Native(managed.pointer()), &specs).unwrap();
    assert_eq!(native.call(&[Value::Int(-1)]).unwrap(), Value::Int(-1));
    assert_eq!(
        native.call(&[Value::Int(i64::MIN)]).unwrap(),
        Value::Int(i64::MIN)
    );
}

#[test]
fn test_managed_defaults_are_metadata_only() {
    let count_args = Procedure::new("count_args", |args| Ok(Value::Int(args.len() as i64)));
    let value: Value = unify(
        TypeDesc::I32,
        count_args.into(),
        &[ArgSpec::WithDefault(TypeDesc::I32, Value::Int(3))],
    )
    .unwrap()
    .into();

    assert!(is_unified(&value));
    assert_eq!(defaults_of(&value).unwrap(), &[Some(Value::Int(3))]);

    let Value::Unified(callable) = &value else {
        panic!("expected a unified callable");
    };
    assert_eq!(callable.call(&[]).unwrap(), Value::Int(0));
}

#[test]
fn test_plain_procedure_is_not_unified() {
    let value = Value::Procedure(doubler());
    assert!(!is_unified(&value));
    assert!(matches!(pointer_of(&value), Err(UnifyError::NotUnified { .. })));
}

#[test]
fn test_native_reenters_managed_callback() {
    let callback: Value = unify(TypeDesc::I32, doubler().into(), &[ArgSpec::Bare(TypeDesc::I32)])
        .unwrap()
        .into();
    let apply = unify(
        TypeDesc::I32,
        Behavior::Native(native(apply_twice as *const c_void)),
        &[ArgSpec::Bare(TypeDesc::Pointer), ArgSpec::Bare(TypeDesc::I32)],
    )
    .unwrap();

    // A unified callable passed as a pointer argument hands over its pointer facet
    assert_eq!(
        apply.call(&[callback.clone(), Value::Int(3)]).unwrap(),
        Value::Int(12)
    );

    let raw = Value::Pointer(pointer_of(&callback).unwrap().addr());
    assert_eq!(apply.call(&[raw, Value::Int(5)]).unwrap(), Value::Int(20));
}

#[test]
fn test_failing_callback_yields_zero() {
    let failing = Procedure::new("failing", |_| Err(UnifyError::procedure("always fails")));
    let callback: Value = unify(TypeDesc::I32, failing.into(), &[ArgSpec::Bare(TypeDesc::I32)])
        .unwrap()
        .into();
    let apply = unify(
        TypeDesc::I32,
        Behavior::Native(native(apply_twice as *const c_void)),
        &[ArgSpec::Bare(TypeDesc::Pointer), ArgSpec::Bare(TypeDesc::I32)],
    )
    .unwrap();

    assert_eq!(apply.call(&[callback, Value::Int(3)]).unwrap(), Value::Int(0));
}

#[test]
fn test_qsort_with_managed_comparator() {
    let compare = Procedure::new("compare_i32", |args| {
        let (Some(a), Some(b)) = (args[0].as_pointer(), args[1].as_pointer()) else {
            return Err(UnifyError::procedure("compare_i32: expected pointers"));
        };
        let (a, b) = unsafe { (*(a as *const i32), *(b as *const i32)) };
        Ok(Value::Int(a.cmp(&b) as i64))
    });
    let comparator = unify(
        TypeDesc::I32,
        compare.into(),
        &[ArgSpec::Bare(TypeDesc::Pointer), ArgSpec::Bare(TypeDesc::Pointer)],
    )
    .unwrap();

    let mut data = [5i32, -1, 9, 0, 3, 3, -8];
    let compar: unsafe extern "C" fn(*const c_void, *const c_void) -> libc::c_int =
        unsafe { std::mem::transmute(comparator.pointer().as_ptr()) };
    unsafe {
        libc::qsort(
            data.as_mut_ptr() as *mut c_void,
            data.len(),
            std::mem::size_of::<i32>(),
            Some(compar),
        );
    }

    assert_eq!(data, [-8, -1, 0, 3, 3, 5, 9]);
}

#[cfg(unix)]
#[test]
fn test_qsort_both_directions_unified() {
    let descending = Procedure::new("descending", |args| {
        let a = unsafe { *(args[0].as_pointer().unwrap_or_default() as *const i32) };
        let b = unsafe { *(args[1].as_pointer().unwrap_or_default() as *const i32) };
        Ok(Value::Int(b.cmp(&a) as i64))
    });
    let comparator: Value = unify(
        TypeDesc::I32,
        descending.into(),
        &[ArgSpec::Bare(TypeDesc::Pointer), ArgSpec::Bare(TypeDesc::Pointer)],
    )
    .unwrap()
    .into();

    let qsort = unifn_ffi::symbol::lookup_default("qsort").unwrap();
    let sort = unify(
        TypeDesc::Void,
        Behavior::Native(qsort),
        &[
            ArgSpec::Bare(TypeDesc::Pointer),
            ArgSpec::Bare(TypeDesc::U64),
            ArgSpec::WithDefault(TypeDesc::U64, Value::Int(4)),
            ArgSpec::WithDefault(TypeDesc::Pointer, comparator),
        ],
    )
    .unwrap();

    let mut data = [2i32, 7, 1, 8, 2, 8];
    sort.call(&[
        Value::Pointer(data.as_mut_ptr() as usize),
        Value::Int(data.len() as i64),
    ])
    .unwrap();

    assert_eq!(data, [8, 8, 7, 2, 2, 1]);
}

#[test]
fn test_concurrent_calls() {
    let callable = Arc::new(
        unify(TypeDesc::I32, doubler().into(), &[ArgSpec::Bare(TypeDesc::I32)]).unwrap(),
    );

    std::thread::scope(|scope| {
        for t in 0..4 {
            let callable = Arc::clone(&callable);
            scope.spawn(move || {
                let f: extern "C" fn(i32) -> i32 =
                    unsafe { std::mem::transmute(callable.pointer().as_ptr()) };
                for n in 0..100 {
                    assert_eq!(f(n + t), (n + t) * 2);
                    assert_eq!(
                        callable.call(&[Value::Int((n + t) as i64)]).unwrap(),
                        Value::Int(((n + t) * 2) as i64)
                    );
                }
            });
        }
    });
}

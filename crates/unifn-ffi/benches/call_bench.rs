use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::ffi::c_void;
use unifn_ffi::unifn_core::{ArgSpec, Behavior, NativePointer, Procedure, TypeDesc, Value};
use unifn_ffi::unify;

extern "C" fn add(a: i64, b: i64) -> i64 {
    a + b
}

fn add_pointer() -> NativePointer {
    unsafe { NativePointer::from_raw(add as *const c_void) }.unwrap()
}

fn bench_native_exact(c: &mut Criterion) {
    let callable = unify(
        TypeDesc::I64,
        Behavior::Native(add_pointer()),
        &[ArgSpec::Bare(TypeDesc::I64), ArgSpec::Bare(TypeDesc::I64)],
    )
    .unwrap();
    let args = [Value::Int(20), Value::Int(22)];

    c.bench_function("native call, all arguments", |b| {
        b.iter(|| black_box(callable.call(black_box(&args))))
    });
}

fn bench_native_padded(c: &mut Criterion) {
    let callable = unify(
        TypeDesc::I64,
        Behavior::Native(add_pointer()),
        &[
            ArgSpec::Bare(TypeDesc::I64),
            ArgSpec::WithDefault(TypeDesc::I64, Value::Int(22)),
        ],
    )
    .unwrap();
    let args = [Value::Int(20)];

    c.bench_function("native call, default padding", |b| {
        b.iter(|| black_box(callable.call(black_box(&args))))
    });
}

fn bench_trampoline(c: &mut Criterion) {
    let sum = Procedure::new("sum", |args| {
        Ok(Value::Int(args.iter().filter_map(Value::as_int).sum()))
    });
    let callable = unify(
        TypeDesc::I64,
        sum.into(),
        &[ArgSpec::Bare(TypeDesc::I64), ArgSpec::Bare(TypeDesc::I64)],
    )
    .unwrap();
    let f: extern "C" fn(i64, i64) -> i64 =
        unsafe { std::mem::transmute(callable.pointer().as_ptr()) };

    c.bench_function("native call into managed procedure", |b| {
        b.iter(|| black_box(f(black_box(20), black_box(22))))
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let sum = Procedure::new("sum", |args| {
        Ok(Value::Int(args.iter().filter_map(Value::as_int).sum()))
    });
    let specs = [ArgSpec::Bare(TypeDesc::I64), ArgSpec::Bare(TypeDesc::I64)];
    let managed = unify(TypeDesc::I64, sum.into(), &specs).unwrap();
    let native = unify(TypeDesc::I64, Behavior::Native(managed.pointer()), &specs).unwrap();
    let args = [Value::Int(20), Value::Int(22)];

    c.bench_function("managed -> native -> managed", |b| {
        b.iter(|| black_box(native.call(black_box(&args))))
    });
}

criterion_group!(
    benches,
    bench_native_exact,
    bench_native_padded,
    bench_trampoline,
    bench_round_trip
);
criterion_main!(benches);

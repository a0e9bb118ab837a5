//! Arity-checked adapters around raw native invokers.

use crate::backend::{InvocationPrimitive, NativePointer};
use crate::descriptor::{Arity, ParsedSpec};
use crate::error::{Result, UnifyError};
use crate::procedure::Procedure;
use crate::types::TypeDesc;
use crate::value::Value;
use tracing::trace;

/// Build a procedure that calls `pointer` with the split signature `parsed -> ret`.
///
/// The returned procedure accepts between `required` and `total` arguments
/// and fills omitted trailing arguments from the declared defaults before
/// forwarding to the backend's raw invoker.
pub fn build_adapter(
    invoker: &dyn InvocationPrimitive,
    ret: TypeDesc,
    pointer: NativePointer,
    parsed: &ParsedSpec,
) -> Result<Procedure> {
    let raw = invoker.invoker(ret, pointer, &parsed.types)?;
    Ok(with_arity(raw, parsed.arity, parsed.optional_defaults()))
}

/// Wrap `raw` with an arity check and default padding.
///
/// `optional` holds the defaults for positions `arity.required..arity.total`.
pub(crate) fn with_arity(raw: Procedure, arity: Arity, optional: Vec<Value>) -> Procedure {
    let name = raw.name().to_string();
    Procedure::new(name, move |args| {
        let count = args.len();
        if !arity.accepts(count) {
            return Err(UnifyError::Arity {
                required: arity.required,
                total: arity.total,
                actual: count,
                args: args.to_vec(),
            });
        }

        trace!(
            target: "unifn::adapter",
            procedure = raw.name(),
            supplied = count,
            padded = arity.total - count,
            "calling native adapter"
        );

        if count == arity.total {
            return raw.call(args);
        }

        let mut padded = Vec::with_capacity(arity.total);
        padded.extend_from_slice(args);
        padded.extend_from_slice(&optional[count - arity.required..]);
        raw.call(&padded)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{self, ArgSpec};
    use crate::test_utils::MockBackend;

    fn adapt(
        backend: &MockBackend,
        ret: TypeDesc,
        pointer: NativePointer,
        specs: &[ArgSpec],
    ) -> Result<Procedure> {
        build_adapter(backend, ret, pointer, &descriptor::split(specs)?)
    }

    fn increment_backend() -> (MockBackend, NativePointer) {
        let backend = MockBackend::new();
        let ptr = backend.register("increment", |args| {
            let n = args[0].as_int().unwrap_or_default();
            Ok(Value::Int(n + 1))
        });
        (backend, ptr)
    }

    #[test]
    fn test_exact_arity() {
        let (backend, ptr) = increment_backend();
        let proc = adapt(&backend, TypeDesc::I32, ptr, &[ArgSpec::Bare(TypeDesc::I32)])
            .unwrap();

        assert_eq!(proc.call(&[Value::Int(41)]).unwrap(), Value::Int(42));
        assert!(matches!(
            proc.call(&[]),
            Err(UnifyError::Arity { required: 1, total: 1, actual: 0, .. })
        ));
        assert!(matches!(
            proc.call(&[Value::Int(1), Value::Int(2)]),
            Err(UnifyError::Arity { actual: 2, .. })
        ));
    }

    #[test]
    fn test_default_fills_missing_argument() {
        let (backend, ptr) = increment_backend();
        let proc = adapt(
            &backend,
            TypeDesc::I32,
            ptr,
            &[ArgSpec::WithDefault(TypeDesc::I32, Value::Int(1))],
        )
        .unwrap();

        assert_eq!(proc.call(&[]).unwrap(), Value::Int(2));
        assert_eq!(proc.call(&[Value::Int(10)]).unwrap(), Value::Int(11));
        assert!(matches!(
            proc.call(&[Value::Int(1), Value::Int(2)]),
            Err(UnifyError::Arity { required: 0, total: 1, actual: 2, .. })
        ));
    }

    #[test]
    fn test_padding_uses_remaining_suffix() {
        let backend = MockBackend::new();
        let ptr = backend.register("echo", |args| {
            Ok(Value::Int(
                args.iter()
                    .map(|v| v.as_int().unwrap_or_default())
                    .fold(0, |acc, n| acc * 10 + n),
            ))
        });
        let specs = [
            ArgSpec::Bare(TypeDesc::I32),
            ArgSpec::WithDefault(TypeDesc::I32, Value::Int(2)),
            ArgSpec::WithDefault(TypeDesc::I32, Value::Int(3)),
        ];
        let proc = adapt(&backend, TypeDesc::I64, ptr, &specs).unwrap();

        assert_eq!(proc.call(&[Value::Int(1)]).unwrap(), Value::Int(123));
        assert_eq!(
            proc.call(&[Value::Int(1), Value::Int(9)]).unwrap(),
            Value::Int(193)
        );
        assert_eq!(
            proc.call(&[Value::Int(1), Value::Int(9), Value::Int(8)]).unwrap(),
            Value::Int(198)
        );
    }

    #[test]
    fn test_arity_error_carries_arguments() {
        let (backend, ptr) = increment_backend();
        let proc = adapt(&backend, TypeDesc::I32, ptr, &[ArgSpec::Bare(TypeDesc::I32)])
            .unwrap();

        match proc.call(&[Value::Int(1), Value::Float(2.0)]) {
            Err(UnifyError::Arity { args, .. }) => {
                assert_eq!(args, vec![Value::Int(1), Value::Float(2.0)]);
            }
            other => panic!("expected arity error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_specs_fail_before_invoker() {
        let (backend, ptr) = increment_backend();
        let result = adapt(
            &backend,
            TypeDesc::I32,
            ptr,
            &[
                ArgSpec::WithDefault(TypeDesc::I32, Value::Int(1)),
                ArgSpec::Bare(TypeDesc::I32),
            ],
        );
        assert!(matches!(
            result,
            Err(UnifyError::MalformedSpecification { .. })
        ));
        assert_eq!(backend.invoker_requests(), 0);
    }

    #[test]
    fn test_every_call_rechecks_arity() {
        let (backend, ptr) = increment_backend();
        let proc = adapt(&backend, TypeDesc::I32, ptr, &[ArgSpec::Bare(TypeDesc::I32)])
            .unwrap();

        for _ in 0..3 {
            assert!(proc.call(&[Value::Int(0)]).is_ok());
            assert!(proc.call(&[]).is_err());
        }
    }
}

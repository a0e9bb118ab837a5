//! `call` subcommand handler

use crate::signature::{Signature, SignatureArgs};
use crate::utils::parse_values;
use std::process;
use tracing::info;
use unifn_core::{Behavior, Value};
use unifn_ffi::symbol::{self, LoadedSymbol};

/// Resolve the symbol named by `signature`.
///
/// The signature comes from the user, so the symbol is trusted to match it.
pub fn resolve_symbol(signature: &Signature) -> Result<LoadedSymbol, String> {
    unsafe { symbol::resolve(&signature.symbol, signature.library.as_deref()) }
        .map_err(|e| e.to_string())
}

/// Unify the native function described by `args` and call it with `values`.
pub fn run_call(args: &SignatureArgs, values: &[String]) -> Result<Value, String> {
    let signature = args.resolve()?;
    let values = parse_values(values)?;
    let loaded = resolve_symbol(&signature)?;

    let callable = unifn_ffi::unify(
        signature.returns,
        Behavior::Native(loaded.pointer.clone()),
        &signature.args,
    )
    .map_err(|e| e.to_string())?;

    info!(
        target: "unifn::cli",
        "calling {} at {} with {} argument(s)",
        signature.symbol,
        loaded.pointer,
        values.len()
    );
    let result = callable.call(&values).map_err(|e| e.to_string());

    // The library must outlive the call
    drop(callable);
    drop(loaded);
    result
}

/// Call a native function and print its result
pub fn handle_call(args: &SignatureArgs, values: &[String]) {
    match run_call(args, values) {
        Ok(Value::Null) => {}
        Ok(value) => println!("{value}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

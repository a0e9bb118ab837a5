//! `inspect` subcommand handler

use crate::call::resolve_symbol;
use crate::signature::SignatureArgs;
use serde::Serialize;
use std::process;
use unifn_core::{Behavior, Value, defaults_of, is_unified, pointer_of};

/// What a unified native function looks like from the managed side.
#[derive(Debug, Serialize)]
pub struct Report {
    pub symbol: String,
    pub pointer: String,
    pub returns: String,
    pub args: Vec<String>,
    pub arity: String,
    pub defaults: Vec<Option<String>>,
    pub unified: bool,
}

impl Report {
    pub fn render(&self) -> String {
        let defaults = self
            .defaults
            .iter()
            .map(|d| d.as_deref().unwrap_or("-"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} at {}\n  signature: ({}) -> {}\n  arity: {}\n  defaults: [{}]",
            self.symbol,
            self.pointer,
            self.args.join(", "),
            self.returns,
            self.arity,
            defaults
        )
    }
}

/// Unify the described symbol and report its facets without calling it.
pub fn build_report(args: &SignatureArgs) -> Result<Report, String> {
    let signature = args.resolve()?;
    let loaded = resolve_symbol(&signature)?;

    let callable = unifn_ffi::unify(
        signature.returns,
        Behavior::Native(loaded.pointer.clone()),
        &signature.args,
    )
    .map_err(|e| e.to_string())?;
    let arity = callable.arity();
    let value = Value::from(callable);

    let pointer = pointer_of(&value).map_err(|e| e.to_string())?;
    let defaults = defaults_of(&value)
        .map_err(|e| e.to_string())?
        .iter()
        .map(|d| d.as_ref().map(Value::to_string))
        .collect();

    Ok(Report {
        symbol: signature.symbol,
        pointer: pointer.to_string(),
        returns: signature.returns.to_string(),
        args: signature.args.iter().map(|spec| spec.ty().to_string()).collect(),
        arity: arity.to_string(),
        defaults,
        unified: is_unified(&value),
    })
}

/// Print the unified form of a native function
pub fn handle_inspect(args: &SignatureArgs, json: bool) {
    let report = match build_report(args) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    } else {
        println!("{}", report.render());
    }
}

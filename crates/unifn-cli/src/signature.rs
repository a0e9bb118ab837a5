//! Native signatures, from a RON file or from command-line flags

use crate::utils::read_source;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use unifn_core::{ArgSpec, TypeDesc};

/// Everything needed to find and unify one native function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub symbol: String,
    /// Library to load; the running process is searched when absent
    #[serde(default)]
    pub library: Option<PathBuf>,
    pub returns: TypeDesc,
    #[serde(default)]
    pub args: Vec<ArgSpec>,
}

impl Signature {
    /// Parse a signature from RON source.
    pub fn from_ron(source: &str) -> Result<Self, String> {
        ron::from_str(source).map_err(|e| format!("invalid signature: {e}"))
    }

    /// Load a signature file.
    pub fn load(path: &str) -> Result<Self, String> {
        let source =
            read_source(path).map_err(|err| format!("Error reading file '{path}': {err}"))?;
        Self::from_ron(&source)
    }
}

/// Signature options shared by `call` and `inspect`.
#[derive(Args, Debug, Default)]
pub struct SignatureArgs {
    /// RON signature file (`-` reads stdin)
    #[arg(long = "sig", value_name = "FILE")]
    pub signature: Option<String>,
    /// Symbol to resolve; overrides the signature file
    #[arg(short, long)]
    pub symbol: Option<String>,
    /// Shared library to load the symbol from
    #[arg(short, long, value_name = "PATH")]
    pub lib: Option<PathBuf>,
    /// Return type, e.g. `int`, `double`, `void`, `char*`
    #[arg(short, long, value_name = "TYPE")]
    pub returns: Option<String>,
    /// Argument descriptor, repeatable: `int`, `double=1.5`
    #[arg(short = 'a', long = "arg", value_name = "SPEC")]
    pub args: Vec<String>,
}

impl SignatureArgs {
    /// Build the signature: the file first, then flags on top.
    ///
    /// Without a file, `--symbol` is required and the return type defaults
    /// to `int`.
    pub fn resolve(&self) -> Result<Signature, String> {
        let mut signature = match &self.signature {
            Some(path) => Signature::load(path)?,
            None => Signature {
                symbol: self
                    .symbol
                    .clone()
                    .ok_or("a symbol is required: pass --symbol or --sig")?,
                library: None,
                returns: TypeDesc::I32,
                args: Vec::new(),
            },
        };

        if let Some(symbol) = &self.symbol {
            signature.symbol = symbol.clone();
        }
        if let Some(lib) = &self.lib {
            signature.library = Some(lib.clone());
        }
        if let Some(returns) = &self.returns {
            signature.returns = returns.parse().map_err(|e| format!("--returns: {e}"))?;
        }
        if !self.args.is_empty() {
            signature.args = self
                .args
                .iter()
                .map(|spec| spec.parse::<ArgSpec>().map_err(|e| format!("--arg {spec}: {e}")))
                .collect::<Result<_, _>>()?;
        }

        Ok(signature)
    }
}

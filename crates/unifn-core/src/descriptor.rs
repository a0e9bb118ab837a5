//! Argument descriptor lists.
//!
//! A descriptor list is an ordered sequence of [`ArgSpec`]s: required
//! arguments first, then optional ones carrying a default value. `split`
//! validates that ordering and separates the list into the facts the adapter
//! and the unifier need.

use crate::error::{Result, UnifyError};
use crate::types::TypeDesc;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One element of a descriptor list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgSpec {
    /// Required argument of the given type
    Bare(TypeDesc),
    /// Optional argument, filled with the default when omitted
    WithDefault(TypeDesc, Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Bare,
    Paired,
}

impl ArgSpec {
    pub fn kind(&self) -> ArgKind {
        match self {
            ArgSpec::Bare(_) => ArgKind::Bare,
            ArgSpec::WithDefault(..) => ArgKind::Paired,
        }
    }

    pub fn ty(&self) -> TypeDesc {
        match self {
            ArgSpec::Bare(ty) | ArgSpec::WithDefault(ty, _) => *ty,
        }
    }

    pub fn default_value(&self) -> Option<&Value> {
        match self {
            ArgSpec::Bare(_) => None,
            ArgSpec::WithDefault(_, value) => Some(value),
        }
    }
}

impl From<TypeDesc> for ArgSpec {
    fn from(ty: TypeDesc) -> Self {
        ArgSpec::Bare(ty)
    }
}

impl fmt::Display for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgSpec::Bare(ty) => write!(f, "{ty}"),
            ArgSpec::WithDefault(ty, value) => write!(f, "{ty}={value}"),
        }
    }
}

impl FromStr for ArgSpec {
    type Err = String;

    /// Parse `type` or `type=default`, e.g. `int` or `double=1.5`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('=') {
            None => s
                .parse::<TypeDesc>()
                .map(ArgSpec::Bare)
                .map_err(|e| e.to_string()),
            Some((ty, default)) => {
                let ty = ty.parse::<TypeDesc>().map_err(|e| e.to_string())?;
                let value = Value::parse_literal(default)
                    .ok_or_else(|| format!("invalid default value '{}'", default.trim()))?;
                Ok(ArgSpec::WithDefault(ty, value))
            }
        }
    }
}

/// Accepted argument counts: `required..=total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub required: usize,
    pub total: usize,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.required && count <= self.total
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.required == self.total {
            write!(f, "{}", self.total)
        } else {
            write!(f, "{}..={}", self.required, self.total)
        }
    }
}

/// A validated descriptor list, split into parallel facts.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSpec {
    pub types: Vec<TypeDesc>,
    /// One slot per argument; `None` for required ones
    pub defaults: Vec<Option<Value>>,
    pub arity: Arity,
}

impl ParsedSpec {
    /// Defaults of the optional suffix, in declared order.
    pub fn optional_defaults(&self) -> Vec<Value> {
        self.defaults[self.arity.required..]
            .iter()
            .flatten()
            .cloned()
            .collect()
    }
}

/// Validate and split a descriptor list.
///
/// Fails with `MalformedSpecification` when a required argument follows an
/// optional one.
pub fn split(specs: &[ArgSpec]) -> Result<ParsedSpec> {
    let mut types = Vec::with_capacity(specs.len());
    let mut defaults = Vec::with_capacity(specs.len());
    let mut required = 0;
    let mut seen_optional = false;

    for (position, spec) in specs.iter().enumerate() {
        match spec.kind() {
            ArgKind::Bare if seen_optional => {
                return Err(UnifyError::MalformedSpecification {
                    position,
                    specs: specs.to_vec(),
                });
            }
            ArgKind::Bare => required += 1,
            ArgKind::Paired => seen_optional = true,
        }
        types.push(spec.ty());
        defaults.push(spec.default_value().cloned());
    }

    Ok(ParsedSpec {
        types,
        defaults,
        arity: Arity {
            required,
            total: specs.len(),
        },
    })
}

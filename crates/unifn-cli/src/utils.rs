//! Shared CLI utilities for reading input and parsing argument values

use std::fs;
use std::io::{self, Read};
use unifn_core::Value;

/// Read a file, or stdin when `file` is "-".
pub fn read_source(file: &str) -> io::Result<String> {
    if file == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        fs::read_to_string(file)
    }
}

/// Parse command-line argument values into `Value`s.
pub fn parse_values(values: &[String]) -> Result<Vec<Value>, String> {
    values
        .iter()
        .map(|text| Value::parse_literal(text).ok_or_else(|| format!("invalid value '{text}'")))
        .collect()
}

#![cfg(feature = "cli")]

pub mod normalize;
pub mod preview;
pub mod remote;
pub mod reorder;
pub mod schema;
pub mod validate;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use formcraft_spec::FormSpec;
use serde::Serialize;
use serde_json::Value;

pub(crate) fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

pub(crate) fn read_form(path: &Path) -> Result<FormSpec> {
    let value = read_json(path)?;
    serde_json::from_value(value).with_context(|| format!("{} is not a form", path.display()))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

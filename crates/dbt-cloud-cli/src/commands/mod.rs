//! Subcommand handlers, one module per resource family.
//!
//! Each handler maps parsed flags onto one core command, executes it and
//! prints the response. Flattened flags for nested payloads are collected
//! into a `__`-keyed map and run through the option translator before
//! command construction.

pub mod account;
pub mod audit_log;
pub mod connection;
pub mod environment;
pub mod job;
pub mod metadata;
pub mod project;
pub mod run;

use serde_json::{Map, Value};

/// Insert a flag value into a flat option map when it was provided.
pub(crate) fn push_option(flat: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        flat.insert(key.to_string(), value);
    }
}

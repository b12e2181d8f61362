//! dbt Cloud CLI core library
//!
//! This crate provides everything the `dbt-cloud` binary does apart from
//! flag parsing: process settings, the declarative command model mapping
//! each API operation onto one HTTP request, the execution dispatcher,
//! the run-status poller, and the two pagination walkers.

pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod paginate;
pub mod poll;
pub mod redact;
pub mod translate;

// Re-export commonly used types
pub use client::{ApiRequest, ApiResponse, Client, HttpTransport, Transport};
pub use command::{ApiVersion, AuthScheme, Command};
pub use config::Settings;
pub use error::{DbtCloudError, DbtCloudResult};
pub use poll::{wait_for_run, PollOptions, RunStatus};

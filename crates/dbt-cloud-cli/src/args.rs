//! CLI argument definitions using clap
//!
//! Global flags carry the credentials and hostname; each resource family
//! owns a subcommand enum in [`crate::commands`]. Environment fallbacks
//! (`DBT_CLOUD_*`) are resolved by clap at parse time, so domain code
//! never reads the environment itself.

use crate::commands::account::AccountCmd;
use crate::commands::audit_log::AuditLogCmd;
use crate::commands::connection::ConnectionCmd;
use crate::commands::environment::EnvironmentCmd;
use crate::commands::job::JobCmd;
use crate::commands::metadata::MetadataCmd;
use crate::commands::project::ProjectCmd;
use crate::commands::run::RunCmd;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "dbt-cloud",
    about = "dbt Cloud command line interface",
    long_about = "dbt Cloud command line interface.\n\n\
        Trigger job runs, inspect runs and artifacts, and manage jobs, \
        projects, environments and connections through the dbt Cloud API.\n\n\
        Credentials default to the DBT_CLOUD_API_TOKEN and \
        DBT_CLOUD_ACCOUNT_ID environment variables."
)]
#[command(version)]
pub struct Cli {
    /// API authentication token
    #[arg(
        long,
        global = true,
        env = "DBT_CLOUD_API_TOKEN",
        hide_env_values = true
    )]
    pub api_token: Option<String>,

    /// dbt Cloud API hostname
    #[arg(
        long,
        global = true,
        env = "DBT_CLOUD_HOST",
        default_value = "cloud.getdbt.com"
    )]
    pub host: String,

    /// Numeric ID of the dbt Cloud account
    #[arg(long, global = true, env = "DBT_CLOUD_ACCOUNT_ID")]
    pub account_id: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands, grouped by resource.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Account information
    #[command(subcommand)]
    Account(AccountCmd),

    /// Account audit logs
    #[command(subcommand)]
    AuditLog(AuditLogCmd),

    /// Database connections
    #[command(subcommand)]
    Connection(ConnectionCmd),

    /// Environments within a project
    #[command(subcommand)]
    Environment(EnvironmentCmd),

    /// Job management and triggering
    #[command(subcommand)]
    Job(JobCmd),

    /// Metadata API GraphQL queries
    #[command(subcommand)]
    Metadata(MetadataCmd),

    /// Project management
    #[command(subcommand)]
    Project(ProjectCmd),

    /// Run inspection, artifacts and cancellation
    #[command(subcommand)]
    Run(RunCmd),
}

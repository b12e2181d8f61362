//! dbt Cloud CLI
//!
//! Maps `dbt-cloud <resource> <operation>` subcommands onto single API
//! requests and prints the JSON responses. Credentials come from flags
//! or `DBT_CLOUD_*` environment variables; see `dbt-cloud --help`.

mod args;
mod commands;
mod output;

use args::{Cli, Commands};
use clap::Parser;
use dbt_cloud_core::{Client, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug surfaces request/response tracing from the core.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::default().with_host(cli.host.clone());
    if let Some(api_token) = cli.api_token.clone() {
        settings = settings.with_api_token(api_token);
    }
    if let Some(account_id) = cli.account_id {
        settings = settings.with_account_id(account_id);
    }
    let client = Client::new(settings);

    match cli.command {
        Commands::Account(cmd) => commands::account::run(&client, cmd).await,
        Commands::AuditLog(cmd) => commands::audit_log::run(&client, cmd).await,
        Commands::Connection(cmd) => commands::connection::run(&client, cmd).await,
        Commands::Environment(cmd) => commands::environment::run(&client, cmd).await,
        Commands::Job(cmd) => commands::job::run(&client, cmd).await,
        Commands::Metadata(cmd) => commands::metadata::run(&client, cmd).await,
        Commands::Project(cmd) => commands::project::run(&client, cmd).await,
        Commands::Run(cmd) => commands::run::run(&client, cmd).await,
    }
}

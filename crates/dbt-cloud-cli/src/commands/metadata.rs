//! `dbt-cloud metadata query`

use crate::output::finish;
use anyhow::Context as _;
use clap::Subcommand;
use dbt_cloud_core::command::metadata::MetadataQueryCommand;
use dbt_cloud_core::Client;
use std::io::Read;
use std::path::PathBuf;

/// Metadata API subcommands.
#[derive(Debug, Subcommand)]
pub enum MetadataCmd {
    /// Queries the dbt Cloud Metadata API using GraphQL
    Query {
        /// GraphQL query text
        #[arg(conflicts_with = "file")]
        query: Option<String>,
        /// Read the query from this file (- for stdin)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },
}

pub async fn run(client: &Client, cmd: MetadataCmd) -> anyhow::Result<()> {
    let MetadataCmd::Query { query, file } = cmd;

    let query = match (query, file) {
        (Some(query), None) => query,
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading GraphQL query from {}", path.display()))?,
        (None, None) => anyhow::bail!("provide a GraphQL query string or --file"),
        (Some(_), Some(_)) => unreachable!("clap rejects query together with --file"),
    };

    let command = MetadataQueryCommand::new(query);
    finish(&client.execute(&command).await?)
}

//! `dbt-cloud account {list, get}`

use crate::output::finish;
use clap::Subcommand;
use dbt_cloud_core::command::account::{AccountGetCommand, AccountListCommand};
use dbt_cloud_core::Client;

/// Account subcommands.
#[derive(Debug, Subcommand)]
pub enum AccountCmd {
    /// Retrieves all available accounts
    List,
    /// Retrieves dbt Cloud account information
    Get,
}

pub async fn run(client: &Client, cmd: AccountCmd) -> anyhow::Result<()> {
    let response = match cmd {
        AccountCmd::List => client.execute(&AccountListCommand::new()).await?,
        AccountCmd::Get => {
            let command = AccountGetCommand::new(client.settings())?;
            client.execute(&command).await?
        }
    };
    finish(&response)
}

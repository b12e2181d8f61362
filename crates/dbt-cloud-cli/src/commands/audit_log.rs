//! `dbt-cloud audit-log get`

use crate::output::finish;
use clap::Subcommand;
use dbt_cloud_core::command::audit_log::AuditLogGetCommand;
use dbt_cloud_core::paginate::paginate_offset;
use dbt_cloud_core::Client;

/// Audit log subcommands.
#[derive(Debug, Subcommand)]
pub enum AuditLogCmd {
    /// Retrieves audit logs for the dbt Cloud account
    Get {
        /// Start date (YYYY-MM-DD) for the returned logs
        #[arg(long)]
        logged_at_start: Option<String>,
        /// End date (YYYY-MM-DD) for the returned logs
        #[arg(long)]
        logged_at_end: Option<String>,
        /// Offset into the log list
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Number of log entries per page
        #[arg(long, default_value_t = 100)]
        limit: u64,
        /// Fetch every page and print one combined result
        #[arg(long)]
        paginate: bool,
    },
}

pub async fn run(client: &Client, cmd: AuditLogCmd) -> anyhow::Result<()> {
    let AuditLogCmd::Get {
        logged_at_start,
        logged_at_end,
        offset,
        limit,
        paginate,
    } = cmd;

    let command = AuditLogGetCommand::new(
        client.settings(),
        logged_at_start,
        logged_at_end,
        offset,
        limit,
    )?;

    if paginate {
        // Offset pagination concatenates pages into a single result body.
        let combined = paginate_offset(client, &command).await?;
        println!("{}", serde_json::to_string_pretty(&combined)?);
        Ok(())
    } else {
        finish(&client.execute(&command).await?)
    }
}

//! `dbt-cloud run {get, list, list-artifacts, get-artifact, cancel, cancel-all}`

use crate::output::{ensure_success, finish, print_body};
use anyhow::{bail, Context as _};
use clap::{Args, Subcommand, ValueEnum};
use dbt_cloud_core::command::run::{
    RunCancelCommand, RunGetArtifactCommand, RunGetCommand, RunListArtifactsCommand,
    RunListCommand, RunStatusFilter,
};
use dbt_cloud_core::paginate::paginate_token;
use dbt_cloud_core::Client;
use dialoguer::Confirm;
use serde_json::Value;

/// Run status filter accepted by the v4 list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunStatusArg {
    Queued,
    Starting,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl From<RunStatusArg> for RunStatusFilter {
    fn from(status: RunStatusArg) -> Self {
        match status {
            RunStatusArg::Queued => RunStatusFilter::Queued,
            RunStatusArg::Starting => RunStatusFilter::Starting,
            RunStatusArg::Running => RunStatusFilter::Running,
            RunStatusArg::Succeeded => RunStatusFilter::Succeeded,
            RunStatusArg::Failed => RunStatusFilter::Failed,
            RunStatusArg::Canceled => RunStatusFilter::Canceled,
        }
    }
}

/// Run subcommands.
#[derive(Debug, Subcommand)]
pub enum RunCmd {
    /// Prints a dbt Cloud run status JSON response
    Get {
        /// Numeric ID of the run
        #[arg(long)]
        run_id: u64,
        /// Related fields to include: trigger, job, debug_logs
        #[arg(long)]
        include_related: Vec<String>,
    },
    /// Returns runs in the account, most recent first
    List(RunListArgs),
    /// Fetches the list of artifact files generated for a completed run
    ListArtifacts {
        /// Numeric ID of the run
        #[arg(long)]
        run_id: u64,
        /// Step index to query; defaults to the last step
        #[arg(long)]
        step: Option<u64>,
    },
    /// Fetches an artifact file from a completed run
    GetArtifact {
        /// Numeric ID of the run
        #[arg(long)]
        run_id: u64,
        /// Artifact path rooted at target/, e.g. manifest.json
        #[arg(long)]
        path: String,
        /// Step index to query; defaults to the last step
        #[arg(long)]
        step: Option<u64>,
    },
    /// Cancels a dbt Cloud run
    Cancel {
        /// Numeric ID of the run
        #[arg(long)]
        run_id: u64,
    },
    /// Cancels every run matching the filters, prompting per run
    CancelAll {
        /// Only cancel runs with this status
        #[arg(long, value_enum, default_value = "queued")]
        status: RunStatusArg,
        /// Only cancel runs of this job
        #[arg(long)]
        job_id: Option<u64>,
        /// Skip the per-run confirmation prompts
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Flags for `run list`.
#[derive(Debug, Args)]
pub struct RunListArgs {
    /// Number of runs per page, between 1 and 100
    #[arg(long, default_value_t = 100)]
    pub limit: u64,
    /// Filter runs by environment ID
    #[arg(long)]
    pub environment_id: Option<u64>,
    /// Filter runs by project ID
    #[arg(long, env = "DBT_CLOUD_PROJECT_ID")]
    pub project_id: Option<u64>,
    /// Filter runs by job ID
    #[arg(long)]
    pub job_id: Option<u64>,
    /// Filter by run status
    #[arg(long, value_enum)]
    pub status: Option<RunStatusArg>,
    /// Follow continuation tokens and print every page
    #[arg(long)]
    pub paginate: bool,
}

pub async fn run(client: &Client, cmd: RunCmd) -> anyhow::Result<()> {
    match cmd {
        RunCmd::Get {
            run_id,
            include_related,
        } => {
            let command = RunGetCommand::new(client.settings(), run_id, include_related)?;
            finish(&client.execute(&command).await?)
        }
        RunCmd::List(args) => list_runs(client, args).await,
        RunCmd::ListArtifacts { run_id, step } => {
            let command = RunListArtifactsCommand::new(client.settings(), run_id, step)?;
            finish(&client.execute(&command).await?)
        }
        RunCmd::GetArtifact { run_id, path, step } => {
            let command = RunGetArtifactCommand::new(client.settings(), run_id, path, step)?;
            finish(&client.execute(&command).await?)
        }
        RunCmd::Cancel { run_id } => {
            let command = RunCancelCommand::new(client.settings(), run_id)?;
            finish(&client.execute(&command).await?)
        }
        RunCmd::CancelAll {
            status,
            job_id,
            yes,
        } => cancel_all_runs(client, status, job_id, yes).await,
    }
}

async fn list_runs(client: &Client, args: RunListArgs) -> anyhow::Result<()> {
    let command = RunListCommand::new(client.settings())?
        .with_limit(args.limit)
        .with_environment_id(args.environment_id)
        .with_project_id(args.project_id)
        .with_job_id(args.job_id)
        .with_status(args.status.map(RunStatusFilter::from));

    if args.paginate {
        // Token pagination emits each page separately rather than
        // merging them; the platform's page envelopes stay intact.
        let pages = paginate_token(client, &command).await?;
        for page in &pages {
            print_body(page);
        }
        for page in &pages {
            ensure_success(page)?;
        }
        Ok(())
    } else {
        finish(&client.execute(&command).await?)
    }
}

async fn cancel_all_runs(
    client: &Client,
    status: RunStatusArg,
    job_id: Option<u64>,
    yes: bool,
) -> anyhow::Result<()> {
    let list = RunListCommand::new(client.settings())?
        .with_job_id(job_id)
        .with_status(Some(status.into()));
    let response = client.execute(&list).await?;
    ensure_success(&response)?;

    let runs = match response.data()? {
        Value::Array(runs) => runs,
        _ => bail!("run list response `data` is not an array"),
    };
    if runs.is_empty() {
        println!("No matching runs to cancel.");
        return Ok(());
    }

    for run in runs {
        let id = run
            .get("id")
            .and_then(Value::as_u64)
            .context("run entry has no numeric id")?;
        if !yes {
            let confirmed = Confirm::new()
                .with_prompt(format!("Cancel run {id}?"))
                .default(false)
                .interact()?;
            if !confirmed {
                continue;
            }
        }
        let cancel = RunCancelCommand::new(client.settings(), id)?;
        let cancelled = client.execute(&cancel).await?;
        print_body(&cancelled);
        ensure_success(&cancelled)?;
    }
    Ok(())
}

//! `dbt-cloud job {list, get, create, delete, run, export, import, delete-all}`

use crate::commands::push_option;
use crate::output::{ensure_success, finish, print_body, print_poll_status};
use anyhow::{bail, Context as _};
use clap::{Args, Subcommand};
use dbt_cloud_core::command::job::{
    JobCreateCommand, JobDeleteCommand, JobGetCommand, JobListCommand, JobRunCommand,
};
use dbt_cloud_core::poll::{triggered_run_id, wait_for_run, PollOptions};
use dbt_cloud_core::translate::unflatten;
use dbt_cloud_core::Client;
use dialoguer::Confirm;
use serde_json::{json, Map, Value};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

/// Job subcommands.
#[derive(Debug, Subcommand)]
pub enum JobCmd {
    /// Returns a list of jobs in the account
    List {
        /// Field to order the result by; use - for reverse order
        #[arg(long)]
        order_by: Option<String>,
        /// Filter jobs by project ID
        #[arg(long, env = "DBT_CLOUD_PROJECT_ID")]
        project_id: Option<u64>,
    },
    /// Returns the details of a dbt Cloud job
    Get {
        /// Numeric ID of the job
        #[arg(long, env = "DBT_CLOUD_JOB_ID")]
        job_id: Option<u64>,
        /// Field to order the result by; use - for reverse order
        #[arg(long)]
        order_by: Option<String>,
    },
    /// Creates a job in a dbt Cloud project
    Create(JobCreateArgs),
    /// Deletes a job from a dbt Cloud project
    Delete {
        /// Numeric ID of the job
        #[arg(long, env = "DBT_CLOUD_JOB_ID")]
        job_id: Option<u64>,
    },
    /// Triggers a dbt Cloud job run and returns a status JSON response
    Run(JobRunArgs),
    /// Exports a job definition as JSON (id stripped, ready for import)
    Export {
        /// Numeric ID of the job
        #[arg(long, env = "DBT_CLOUD_JOB_ID")]
        job_id: Option<u64>,
        /// Write to this file instead of stdout
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },
    /// Creates a job from an exported JSON definition
    Import {
        /// Read from this file instead of stdin
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },
    /// Deletes every job matching the filters, prompting per job
    DeleteAll {
        /// Only delete jobs in this project
        #[arg(long, env = "DBT_CLOUD_PROJECT_ID")]
        project_id: Option<u64>,
        /// Skip the per-job confirmation prompts
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Flags for `job run`. Payload overrides map one-to-one onto the
/// trigger request body.
#[derive(Debug, Args)]
pub struct JobRunArgs {
    /// Numeric ID of the job to run
    #[arg(long, env = "DBT_CLOUD_JOB_ID")]
    pub job_id: Option<u64>,
    /// A text description of the reason for running this job
    #[arg(long)]
    pub cause: Option<String>,
    /// The git sha to check out before running this job
    #[arg(long)]
    pub git_sha: Option<String>,
    /// The git branch to check out before running this job
    #[arg(long)]
    pub git_branch: Option<String>,
    /// Override the destination schema for this run
    #[arg(long)]
    pub schema_override: Option<String>,
    /// Override the version of dbt used for this run
    #[arg(long)]
    pub dbt_version_override: Option<String>,
    /// Override the number of threads for this run
    #[arg(long)]
    pub threads_override: Option<u64>,
    /// Override the target.name context variable for this run
    #[arg(long)]
    pub target_name_override: Option<String>,
    /// Override whether this run generates docs
    #[arg(long)]
    pub generate_docs_override: Option<bool>,
    /// Override the timeout in seconds for this run
    #[arg(long)]
    pub timeout_seconds_override: Option<u64>,
    /// Override the job's steps; repeat once per step
    #[arg(long)]
    pub steps_override: Vec<String>,
    /// Wait for the run to finish before returning
    #[arg(long)]
    pub wait: bool,
    /// Seconds between status checks while waiting
    #[arg(long, default_value_t = 5)]
    pub poll_interval: u64,
    /// Give up waiting after this many seconds
    #[arg(long)]
    pub poll_timeout: Option<u64>,
}

/// Flags for `job create`. Nested payload fields surface as flattened
/// flags and travel through the option translator.
#[derive(Debug, Args)]
pub struct JobCreateArgs {
    /// Numeric ID of the project the job belongs to
    #[arg(long, env = "DBT_CLOUD_PROJECT_ID")]
    pub project_id: Option<u64>,
    /// Numeric ID of the environment the job runs in
    #[arg(long, env = "DBT_CLOUD_ENVIRONMENT_ID")]
    pub environment_id: Option<u64>,
    /// A name for the job
    #[arg(long)]
    pub name: String,
    /// Job execution steps; repeat once per step
    #[arg(long, required = true)]
    pub execute_steps: Vec<String>,
    /// Overrides the dbt_version of the attached environment
    #[arg(long)]
    pub dbt_version: Option<String>,
    /// Run this job on pushes to the configured repository
    #[arg(long)]
    pub triggers_github_webhook: Option<bool>,
    /// Run this job on its schedule
    #[arg(long)]
    pub triggers_schedule: Option<bool>,
    /// Only trigger from the custom branch
    #[arg(long)]
    pub triggers_custom_branch_only: Option<bool>,
    /// Maximum number of models to run in parallel
    #[arg(long)]
    pub settings_threads: Option<u64>,
    /// Informational target.name for this job
    #[arg(long)]
    pub settings_target_name: Option<String>,
    /// 1 = active, 2 = deleted
    #[arg(long)]
    pub state: Option<u64>,
    /// Run a dbt docs generate step at the end of runs
    #[arg(long)]
    pub generate_docs: Option<bool>,
    /// Cron-syntax schedule for the job
    #[arg(long)]
    pub schedule_cron: Option<String>,
    /// Schedule date type: every_day, days_of_week or custom_cron
    #[arg(long)]
    pub schedule_date_type: Option<String>,
    /// Schedule time type: every_hour or at_exact_hours
    #[arg(long)]
    pub schedule_time_type: Option<String>,
    /// Hour interval for every_hour schedules
    #[arg(long)]
    pub schedule_time_interval: Option<u64>,
}

impl JobRunArgs {
    fn into_options(self) -> Value {
        let mut flat = Map::new();
        push_option(&mut flat, "job_id", self.job_id.map(|v| json!(v)));
        push_option(&mut flat, "cause", self.cause.map(Value::String));
        push_option(&mut flat, "git_sha", self.git_sha.map(Value::String));
        push_option(&mut flat, "git_branch", self.git_branch.map(Value::String));
        push_option(
            &mut flat,
            "schema_override",
            self.schema_override.map(Value::String),
        );
        push_option(
            &mut flat,
            "dbt_version_override",
            self.dbt_version_override.map(Value::String),
        );
        push_option(
            &mut flat,
            "threads_override",
            self.threads_override.map(|v| json!(v)),
        );
        push_option(
            &mut flat,
            "target_name_override",
            self.target_name_override.map(Value::String),
        );
        push_option(
            &mut flat,
            "generate_docs_override",
            self.generate_docs_override.map(Value::Bool),
        );
        push_option(
            &mut flat,
            "timeout_seconds_override",
            self.timeout_seconds_override.map(|v| json!(v)),
        );
        if !self.steps_override.is_empty() {
            flat.insert("steps_override".to_string(), json!(self.steps_override));
        }
        unflatten(flat)
    }
}

impl JobCreateArgs {
    fn into_options(self) -> Value {
        let mut flat = Map::new();
        push_option(&mut flat, "project_id", self.project_id.map(|v| json!(v)));
        push_option(
            &mut flat,
            "environment_id",
            self.environment_id.map(|v| json!(v)),
        );
        flat.insert("name".to_string(), Value::String(self.name));
        flat.insert("execute_steps".to_string(), json!(self.execute_steps));
        push_option(&mut flat, "dbt_version", self.dbt_version.map(Value::String));
        push_option(
            &mut flat,
            "triggers__github_webhook",
            self.triggers_github_webhook.map(Value::Bool),
        );
        push_option(
            &mut flat,
            "triggers__schedule",
            self.triggers_schedule.map(Value::Bool),
        );
        push_option(
            &mut flat,
            "triggers__custom_branch_only",
            self.triggers_custom_branch_only.map(Value::Bool),
        );
        push_option(
            &mut flat,
            "settings__threads",
            self.settings_threads.map(|v| json!(v)),
        );
        push_option(
            &mut flat,
            "settings__target_name",
            self.settings_target_name.map(Value::String),
        );
        push_option(&mut flat, "state", self.state.map(|v| json!(v)));
        push_option(
            &mut flat,
            "generate_docs",
            self.generate_docs.map(Value::Bool),
        );
        push_option(
            &mut flat,
            "schedule__cron",
            self.schedule_cron.map(Value::String),
        );
        push_option(
            &mut flat,
            "schedule__date__type",
            self.schedule_date_type.map(Value::String),
        );
        push_option(
            &mut flat,
            "schedule__time__type",
            self.schedule_time_type.map(Value::String),
        );
        push_option(
            &mut flat,
            "schedule__time__interval",
            self.schedule_time_interval.map(|v| json!(v)),
        );
        unflatten(flat)
    }
}

pub async fn run(client: &Client, cmd: JobCmd) -> anyhow::Result<()> {
    match cmd {
        JobCmd::List {
            order_by,
            project_id,
        } => {
            let command = JobListCommand::new(client.settings(), order_by, project_id)?;
            finish(&client.execute(&command).await?)
        }
        JobCmd::Get { job_id, order_by } => {
            let command = JobGetCommand::new(client.settings(), job_id, order_by)?;
            finish(&client.execute(&command).await?)
        }
        JobCmd::Create(args) => {
            let command = JobCreateCommand::from_options(args.into_options(), client.settings())?;
            finish(&client.execute(&command).await?)
        }
        JobCmd::Delete { job_id } => {
            let command = JobDeleteCommand::new(client.settings(), job_id)?;
            finish(&client.execute(&command).await?)
        }
        JobCmd::Run(args) => run_job(client, args).await,
        JobCmd::Export { job_id, file } => export_job(client, job_id, file).await,
        JobCmd::Import { file } => import_job(client, file).await,
        JobCmd::DeleteAll { project_id, yes } => delete_all_jobs(client, project_id, yes).await,
    }
}

async fn run_job(client: &Client, args: JobRunArgs) -> anyhow::Result<()> {
    let wait = args.wait;
    let poll_options = PollOptions {
        interval: Duration::from_secs(args.poll_interval),
        timeout: args.poll_timeout.map(Duration::from_secs),
    };

    let command = JobRunCommand::from_options(args.into_options(), client.settings())?;
    let job_id = command.job_id;
    let trigger = client.execute(&command).await?;
    if !trigger.is_success() || !wait {
        return finish(&trigger);
    }

    let run_id = triggered_run_id(&trigger)?;
    let last = wait_for_run(client, run_id, &poll_options, |status, _| {
        print_poll_status(job_id, run_id, status);
    })
    .await?;
    finish(&last)
}

async fn export_job(
    client: &Client,
    job_id: Option<u64>,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let command = JobGetCommand::new(client.settings(), job_id, None)?;
    let response = client.execute(&command).await?;
    ensure_success(&response)?;

    // The platform-assigned id never survives an export.
    let mut job = response.data()?;
    if let Some(map) = job.as_object_mut() {
        map.remove("id");
    }
    let serialized = serde_json::to_string_pretty(&job)?;

    match file {
        Some(path) => std::fs::write(&path, serialized)
            .with_context(|| format!("writing job definition to {}", path.display()))?,
        None => println!("{serialized}"),
    }
    Ok(())
}

async fn import_job(client: &Client, file: Option<PathBuf>) -> anyhow::Result<()> {
    let contents = match &file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading job definition from {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let options: Value = serde_json::from_str(&contents).context("job definition is not JSON")?;
    let command = JobCreateCommand::from_options(options, client.settings())?;
    finish(&client.execute(&command).await?)
}

async fn delete_all_jobs(
    client: &Client,
    project_id: Option<u64>,
    yes: bool,
) -> anyhow::Result<()> {
    let list = JobListCommand::new(client.settings(), None, project_id)?;
    let response = client.execute(&list).await?;
    ensure_success(&response)?;

    let jobs = match response.data()? {
        Value::Array(jobs) => jobs,
        _ => bail!("job list response `data` is not an array"),
    };
    if jobs.is_empty() {
        println!("No jobs to delete.");
        return Ok(());
    }

    for job in jobs {
        let id = job
            .get("id")
            .and_then(Value::as_u64)
            .context("job entry has no numeric id")?;
        let name = job.get("name").and_then(Value::as_str).unwrap_or("<unnamed>");
        if !yes {
            let confirmed = Confirm::new()
                .with_prompt(format!("Delete job {id} ({name})?"))
                .default(false)
                .interact()?;
            if !confirmed {
                continue;
            }
        }
        let delete = JobDeleteCommand::new(client.settings(), Some(id))?;
        let deleted = client.execute(&delete).await?;
        print_body(&deleted);
        ensure_success(&deleted)?;
    }
    Ok(())
}

//! Job commands
//!
//! `job create` carries the platform's full nested job payload (triggers,
//! settings, schedule); its defaults mirror what the API assigns when a
//! field is omitted. The create payload serializes `null` for unset
//! optional fields, which is what the platform expects on this endpoint.

use crate::command::{ensure_field, from_options, payload, Command};
use crate::config::{Settings, ENV_ACCOUNT_ID, ENV_JOB_ID};
use crate::error::DbtCloudResult;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Returns a list of jobs in the account.
#[derive(Debug, Clone)]
pub struct JobListCommand {
    pub account_id: u64,
    /// Field to order the result by. Use `-` to indicate reverse order.
    pub order_by: Option<String>,
    /// Filter jobs by project ID.
    pub project_id: Option<u64>,
}

impl JobListCommand {
    pub fn new(
        settings: &Settings,
        order_by: Option<String>,
        project_id: Option<u64>,
    ) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            order_by,
            project_id,
        })
    }
}

impl Command for JobListCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!("/accounts/{}/jobs", self.account_id)
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(order_by) = &self.order_by {
            query.push(("order_by", order_by.clone()));
        }
        if let Some(project_id) = self.project_id {
            query.push(("project_id", project_id.to_string()));
        }
        query
    }
}

/// Returns the details of a dbt Cloud job.
#[derive(Debug, Clone)]
pub struct JobGetCommand {
    pub account_id: u64,
    pub job_id: u64,
    pub order_by: Option<String>,
}

impl JobGetCommand {
    pub fn new(
        settings: &Settings,
        job_id: Option<u64>,
        order_by: Option<String>,
    ) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            job_id: match job_id {
                Some(id) => id,
                None => settings.require_job_id()?,
            },
            order_by,
        })
    }
}

impl Command for JobGetCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!("/accounts/{}/jobs/{}", self.account_id, self.job_id)
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.order_by
            .as_ref()
            .map(|order_by| vec![("order_by", order_by.clone())])
            .unwrap_or_default()
    }
}

/// Deletes a job from a dbt Cloud project.
#[derive(Debug, Clone)]
pub struct JobDeleteCommand {
    pub account_id: u64,
    pub job_id: u64,
}

impl JobDeleteCommand {
    pub fn new(settings: &Settings, job_id: Option<u64>) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            job_id: match job_id {
                Some(id) => id,
                None => settings.require_job_id()?,
            },
        })
    }
}

impl Command for JobDeleteCommand {
    fn method(&self) -> Method {
        Method::DELETE
    }

    fn path(&self) -> String {
        format!("/accounts/{}/jobs/{}", self.account_id, self.job_id)
    }
}

fn default_cause() -> String {
    "Triggered via API".to_string()
}

/// Triggers a dbt Cloud job run.
///
/// The identifiers ride in the URL; the body carries the trigger cause
/// and any per-run overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRunCommand {
    #[serde(skip_serializing)]
    pub account_id: u64,
    #[serde(skip_serializing)]
    pub job_id: u64,
    /// A text description of the reason for running this job.
    #[serde(default = "default_cause")]
    pub cause: String,
    /// The git sha to check out before running this job.
    #[serde(default)]
    pub git_sha: Option<String>,
    /// The git branch to check out before running this job.
    #[serde(default)]
    pub git_branch: Option<String>,
    /// Override the destination schema in the configured target for this job.
    #[serde(default)]
    pub schema_override: Option<String>,
    /// Override the version of dbt used to run this job.
    #[serde(default)]
    pub dbt_version_override: Option<String>,
    /// Override the number of threads used to run this job.
    #[serde(default)]
    pub threads_override: Option<u64>,
    /// Override the target.name context variable used when running this job.
    #[serde(default)]
    pub target_name_override: Option<String>,
    /// Override whether or not this job generates docs.
    #[serde(default)]
    pub generate_docs_override: Option<bool>,
    /// Override the timeout in seconds for this job.
    #[serde(default)]
    pub timeout_seconds_override: Option<u64>,
    /// Override the list of steps for this job.
    #[serde(default)]
    pub steps_override: Option<Vec<String>>,
}

impl JobRunCommand {
    /// Construct from a nested option mapping, filling `account_id` and
    /// `job_id` from [`Settings`] when omitted.
    pub fn from_options(mut options: Value, settings: &Settings) -> DbtCloudResult<Self> {
        ensure_field(
            &mut options,
            "account_id",
            settings.account_id.map(|id| json!(id)),
            ENV_ACCOUNT_ID,
        )?;
        ensure_field(
            &mut options,
            "job_id",
            settings.job_id.map(|id| json!(id)),
            ENV_JOB_ID,
        )?;
        let mut command: Self = from_options(options)?;
        // An empty steps list means "no override".
        if matches!(command.steps_override.as_deref(), Some([])) {
            command.steps_override = None;
        }
        Ok(command)
    }
}

impl Command for JobRunCommand {
    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> String {
        format!("/accounts/{}/jobs/{}/run/", self.account_id, self.job_id)
    }

    fn body(&self) -> Option<Value> {
        payload(self)
    }
}

/// `triggers` block of a job definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobTriggers {
    #[serde(default)]
    pub github_webhook: bool,
    #[serde(default)]
    pub schedule: bool,
    #[serde(default)]
    pub custom_branch_only: bool,
}

fn default_threads() -> u64 {
    1
}

fn default_target_name() -> String {
    "default".to_string()
}

/// `settings` block of a job definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSettings {
    /// The maximum number of models to run in parallel in a single dbt run.
    #[serde(default = "default_threads")]
    pub threads: u64,
    /// Informational field consumed in dbt project code as `target.name`.
    #[serde(default = "default_target_name")]
    pub target_name: String,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            target_name: default_target_name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleDateType {
    EveryDay,
    DaysOfWeek,
    CustomCron,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleTimeType {
    EveryHour,
    AtExactHours,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobScheduleDate {
    #[serde(rename = "type", default = "default_date_type")]
    pub date_type: ScheduleDateType,
}

fn default_date_type() -> ScheduleDateType {
    ScheduleDateType::EveryDay
}

impl Default for JobScheduleDate {
    fn default() -> Self {
        Self {
            date_type: default_date_type(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobScheduleTime {
    #[serde(rename = "type", default = "default_time_type")]
    pub time_type: ScheduleTimeType,
    #[serde(default = "default_interval")]
    pub interval: u64,
}

fn default_time_type() -> ScheduleTimeType {
    ScheduleTimeType::EveryHour
}

fn default_interval() -> u64 {
    1
}

impl Default for JobScheduleTime {
    fn default() -> Self {
        Self {
            time_type: default_time_type(),
            interval: default_interval(),
        }
    }
}

fn default_cron() -> String {
    "0 * * * *".to_string()
}

/// `schedule` block of a job definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSchedule {
    /// Cron-syntax schedule for the job.
    #[serde(default = "default_cron")]
    pub cron: String,
    #[serde(default)]
    pub date: JobScheduleDate,
    #[serde(default)]
    pub time: JobScheduleTime,
}

impl Default for JobSchedule {
    fn default() -> Self {
        Self {
            cron: default_cron(),
            date: JobScheduleDate::default(),
            time: JobScheduleTime::default(),
        }
    }
}

fn default_state() -> u64 {
    1
}

/// Creates a job in a dbt Cloud project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreateCommand {
    /// Account scope; the platform also expects it in the payload.
    pub account_id: u64,
    /// Assigned by the dbt Cloud API. Cannot be overridden.
    #[serde(default)]
    pub id: Option<u64>,
    pub project_id: u64,
    pub environment_id: u64,
    /// A name for the job.
    pub name: String,
    /// Job execution steps.
    pub execute_steps: Vec<String>,
    /// Overrides the dbt_version specified on the attached Environment if provided.
    #[serde(default)]
    pub dbt_version: Option<String>,
    #[serde(default)]
    pub triggers: JobTriggers,
    #[serde(default)]
    pub settings: JobSettings,
    /// 1 = active, 2 = deleted.
    #[serde(default = "default_state")]
    pub state: u64,
    /// When true, run a dbt docs generate step at the end of runs
    /// triggered from this job.
    #[serde(default)]
    pub generate_docs: bool,
    #[serde(default)]
    pub schedule: JobSchedule,
}

impl JobCreateCommand {
    /// Construct from a nested option mapping (flattened CLI flags or an
    /// exported job file), filling `account_id` from [`Settings`].
    ///
    /// `id` is forced back to null: the platform assigns it.
    pub fn from_options(mut options: Value, settings: &Settings) -> DbtCloudResult<Self> {
        ensure_field(
            &mut options,
            "account_id",
            settings.account_id.map(|id| json!(id)),
            ENV_ACCOUNT_ID,
        )?;
        let mut command: Self = from_options(options)?;
        command.id = None;
        Ok(command)
    }
}

impl Command for JobCreateCommand {
    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> String {
        format!("/accounts/{}/jobs/", self.account_id)
    }

    fn body(&self) -> Option<Value> {
        payload(self)
    }
}

//! Run commands
//!
//! `run list` talks to the v4 API, which filters by human-readable status
//! names and pages through the `x-dbt-continuation-token` header. Run
//! status *polling* uses the v2 numeric codes instead; see [`crate::poll`].

use crate::command::{ApiVersion, Command};
use crate::config::Settings;
use crate::error::DbtCloudResult;
use crate::paginate::{TokenPaged, CONTINUATION_TOKEN_HEADER};
use reqwest::header::HeaderName;
use reqwest::Method;

/// Run status names accepted by the v4 list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatusFilter {
    Queued,
    Starting,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl RunStatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatusFilter::Queued => "Queued",
            RunStatusFilter::Starting => "Starting",
            RunStatusFilter::Running => "Running",
            RunStatusFilter::Succeeded => "Succeeded",
            RunStatusFilter::Failed => "Failed",
            RunStatusFilter::Canceled => "Canceled",
        }
    }
}

/// Prints a dbt Cloud run status JSON response.
#[derive(Debug, Clone)]
pub struct RunGetCommand {
    pub account_id: u64,
    pub run_id: u64,
    /// Related fields to pull with the run: trigger, job, debug_logs.
    pub include_related: Vec<String>,
}

impl RunGetCommand {
    pub fn new(
        settings: &Settings,
        run_id: u64,
        include_related: Vec<String>,
    ) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            run_id,
            include_related,
        })
    }
}

impl Command for RunGetCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!("/accounts/{}/runs/{}", self.account_id, self.run_id)
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.include_related
            .iter()
            .map(|related| ("include_related", related.clone()))
            .collect()
    }
}

fn default_limit() -> u64 {
    100
}

/// Returns runs in the account, most recent first (v4).
#[derive(Debug, Clone)]
pub struct RunListCommand {
    pub account_id: u64,
    /// A limit on the number of objects to be returned, between 1 and 100.
    pub limit: u64,
    /// Filter runs by environment ID.
    pub environment_id: Option<u64>,
    /// Filter runs by project ID.
    pub project_id: Option<u64>,
    /// Filter runs by job ID.
    pub job_id: Option<u64>,
    /// Filter by run status.
    pub status: Option<RunStatusFilter>,
    /// Continuation token from a previous page, sent as a request header.
    pub continuation_token: Option<String>,
}

impl RunListCommand {
    pub fn new(settings: &Settings) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            limit: default_limit(),
            environment_id: None,
            project_id: None,
            job_id: None,
            status: None,
            continuation_token: None,
        })
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_environment_id(mut self, environment_id: Option<u64>) -> Self {
        self.environment_id = environment_id;
        self
    }

    pub fn with_project_id(mut self, project_id: Option<u64>) -> Self {
        self.project_id = project_id;
        self
    }

    pub fn with_job_id(mut self, job_id: Option<u64>) -> Self {
        self.job_id = job_id;
        self
    }

    pub fn with_status(mut self, status: Option<RunStatusFilter>) -> Self {
        self.status = status;
        self
    }
}

impl Command for RunListCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn api_version(&self) -> ApiVersion {
        ApiVersion::V4
    }

    fn path(&self) -> String {
        format!("/accounts/{}/runs", self.account_id)
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("limit", self.limit.to_string())];
        if let Some(environment_id) = self.environment_id {
            query.push(("environment", environment_id.to_string()));
        }
        if let Some(project_id) = self.project_id {
            query.push(("project", project_id.to_string()));
        }
        if let Some(job_id) = self.job_id {
            query.push(("job", job_id.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_string()));
        }
        query
    }

    fn headers(&self) -> Vec<(HeaderName, String)> {
        self.continuation_token
            .as_ref()
            .map(|token| vec![(CONTINUATION_TOKEN_HEADER.clone(), token.clone())])
            .unwrap_or_default()
    }
}

impl TokenPaged for RunListCommand {
    fn with_token(&self, token: &str) -> Self {
        let mut next = self.clone();
        next.continuation_token = Some(token.to_string());
        next
    }
}

/// Fetches the list of artifact files generated for a completed run.
#[derive(Debug, Clone)]
pub struct RunListArtifactsCommand {
    pub account_id: u64,
    pub run_id: u64,
    /// Step index to query; the last step when omitted.
    pub step: Option<u64>,
}

impl RunListArtifactsCommand {
    pub fn new(settings: &Settings, run_id: u64, step: Option<u64>) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            run_id,
            step,
        })
    }
}

impl Command for RunListArtifactsCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!("/accounts/{}/runs/{}/artifacts/", self.account_id, self.run_id)
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.step
            .map(|step| vec![("step", step.to_string())])
            .unwrap_or_default()
    }
}

/// Fetches an artifact file from a completed run. The body may be any
/// dbt-generated file, not necessarily JSON.
#[derive(Debug, Clone)]
pub struct RunGetArtifactCommand {
    pub account_id: u64,
    pub run_id: u64,
    /// Artifact path rooted at the run's target/ directory.
    pub path: String,
    pub step: Option<u64>,
}

impl RunGetArtifactCommand {
    pub fn new(
        settings: &Settings,
        run_id: u64,
        path: impl Into<String>,
        step: Option<u64>,
    ) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            run_id,
            path: path.into(),
            step,
        })
    }
}

impl Command for RunGetArtifactCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!(
            "/accounts/{}/runs/{}/artifacts/{}",
            self.account_id, self.run_id, self.path
        )
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.step
            .map(|step| vec![("step", step.to_string())])
            .unwrap_or_default()
    }
}

/// Cancels a dbt Cloud run.
#[derive(Debug, Clone)]
pub struct RunCancelCommand {
    pub account_id: u64,
    pub run_id: u64,
}

impl RunCancelCommand {
    pub fn new(settings: &Settings, run_id: u64) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            run_id,
        })
    }
}

impl Command for RunCancelCommand {
    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> String {
        format!("/accounts/{}/runs/{}/cancel/", self.account_id, self.run_id)
    }
}

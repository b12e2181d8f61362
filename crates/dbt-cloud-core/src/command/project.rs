//! Project commands
//!
//! Create/update payloads drop empty fields; the platform rejects
//! explicit nulls on these endpoints.

use crate::command::{ensure_field, from_options, payload, Command};
use crate::config::{Settings, ENV_ACCOUNT_ID};
use crate::error::DbtCloudResult;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Returns a list of projects in the account.
#[derive(Debug, Clone)]
pub struct ProjectListCommand {
    pub account_id: u64,
}

impl ProjectListCommand {
    pub fn new(settings: &Settings) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
        })
    }
}

impl Command for ProjectListCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!("/accounts/{}/projects", self.account_id)
    }
}

/// Retrieves dbt Cloud project information.
#[derive(Debug, Clone)]
pub struct ProjectGetCommand {
    pub account_id: u64,
    pub project_id: u64,
}

impl ProjectGetCommand {
    pub fn new(settings: &Settings, project_id: u64) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            project_id,
        })
    }
}

impl Command for ProjectGetCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!("/accounts/{}/projects/{}", self.account_id, self.project_id)
    }
}

fn default_state() -> u64 {
    1
}

/// Creates a new dbt Cloud project in a given account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCreateCommand {
    /// Account scope; the platform also expects it in the payload.
    pub account_id: u64,
    /// Name of the project.
    pub name: String,
    /// ID of the connection to use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<u64>,
    /// ID of the repository to use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<u64>,
    /// ID of the semantic layer config to use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_layer_config_id: Option<u64>,
    /// Whether to skip setup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped_setup: Option<bool>,
    /// State of the project. 1 = Active.
    #[serde(default = "default_state")]
    pub state: u64,
    /// Subdirectory of the dbt project to use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbt_project_subdirectory: Option<String>,
    /// ID of the docs job to use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_job_id: Option<u64>,
    /// ID of the freshness job to use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freshness_job_id: Option<u64>,
}

impl ProjectCreateCommand {
    pub fn from_options(mut options: Value, settings: &Settings) -> DbtCloudResult<Self> {
        ensure_field(
            &mut options,
            "account_id",
            settings.account_id.map(|id| json!(id)),
            ENV_ACCOUNT_ID,
        )?;
        from_options(options)
    }
}

impl Command for ProjectCreateCommand {
    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> String {
        format!("/accounts/{}/projects", self.account_id)
    }

    fn body(&self) -> Option<Value> {
        payload(self)
    }
}

/// Updates a project in a given account. The path identifier is
/// serialized into the payload as `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectUpdateCommand {
    /// ID of the project to update.
    #[serde(skip_serializing)]
    pub project_id: u64,
    #[serde(flatten)]
    pub project: ProjectCreateCommand,
}

impl ProjectUpdateCommand {
    pub fn from_options(mut options: Value, settings: &Settings) -> DbtCloudResult<Self> {
        ensure_field(
            &mut options,
            "account_id",
            settings.account_id.map(|id| json!(id)),
            ENV_ACCOUNT_ID,
        )?;
        from_options(options)
    }
}

impl Command for ProjectUpdateCommand {
    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> String {
        format!(
            "/accounts/{}/projects/{}",
            self.project.account_id, self.project_id
        )
    }

    fn body(&self) -> Option<Value> {
        let mut body = payload(&self.project)?;
        body["id"] = json!(self.project_id);
        Some(body)
    }
}

/// Deletes a dbt Cloud project in a given account.
#[derive(Debug, Clone)]
pub struct ProjectDeleteCommand {
    pub account_id: u64,
    pub project_id: u64,
}

impl ProjectDeleteCommand {
    pub fn new(settings: &Settings, project_id: u64) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            project_id,
        })
    }
}

impl Command for ProjectDeleteCommand {
    fn method(&self) -> Method {
        Method::DELETE
    }

    fn path(&self) -> String {
        format!("/accounts/{}/projects/{}/", self.account_id, self.project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default().with_account_id(123456)
    }

    #[test]
    fn create_drops_empty_fields_and_keeps_account_id() {
        let cmd =
            ProjectCreateCommand::from_options(json!({"name": "analytics"}), &settings()).unwrap();
        let body = cmd.body().unwrap();
        assert_eq!(body["account_id"], json!(123456));
        assert_eq!(body["name"], json!("analytics"));
        assert_eq!(body["state"], json!(1));
        assert!(body.get("connection_id").is_none());
        assert!(body.get("docs_job_id").is_none());
    }

    #[test]
    fn update_serializes_path_id_as_payload_id() {
        let options = json!({"project_id": 123457, "name": "analytics"});
        let cmd = ProjectUpdateCommand::from_options(options, &settings()).unwrap();
        assert_eq!(cmd.path(), "/accounts/123456/projects/123457");
        let body = cmd.body().unwrap();
        assert_eq!(body["id"], json!(123457));
        assert!(body.get("project_id").is_none());
    }

    #[test]
    fn create_requires_name() {
        let err = ProjectCreateCommand::from_options(json!({}), &settings()).unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn delete_path_keeps_trailing_slash() {
        let cmd = ProjectDeleteCommand::new(&settings(), 7).unwrap();
        assert_eq!(cmd.path(), "/accounts/123456/projects/7/");
    }
}

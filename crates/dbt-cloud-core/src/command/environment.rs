//! Environment commands
//!
//! Listing lives on the v3 API; everything else is v2. Create/update
//! payloads drop empty fields.

use crate::command::{ensure_field, from_options, payload, ApiVersion, Command};
use crate::config::{Settings, ENV_ACCOUNT_ID};
use crate::error::DbtCloudResult;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Retrieves environments for a given project.
#[derive(Debug, Clone)]
pub struct EnvironmentListCommand {
    pub account_id: u64,
    pub project_id: u64,
}

impl EnvironmentListCommand {
    pub fn new(settings: &Settings, project_id: u64) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            project_id,
        })
    }
}

impl Command for EnvironmentListCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn api_version(&self) -> ApiVersion {
        ApiVersion::V3
    }

    fn path(&self) -> String {
        format!(
            "/accounts/{}/projects/{}/environments",
            self.account_id, self.project_id
        )
    }
}

/// Retrieves information about an environment in a given project.
#[derive(Debug, Clone)]
pub struct EnvironmentGetCommand {
    pub account_id: u64,
    pub project_id: u64,
    pub environment_id: u64,
}

impl EnvironmentGetCommand {
    pub fn new(
        settings: &Settings,
        project_id: u64,
        environment_id: u64,
    ) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            project_id,
            environment_id,
        })
    }
}

impl Command for EnvironmentGetCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!(
            "/accounts/{}/projects/{}/environments/{}/",
            self.account_id, self.project_id, self.environment_id
        )
    }
}

fn default_state() -> u64 {
    1
}

/// Creates a new dbt Cloud environment in a given project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentCreateCommand {
    /// Account scope; the platform also expects it in the payload.
    pub account_id: u64,
    pub project_id: u64,
    /// Assigned by the dbt Cloud API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Name of the environment.
    pub name: String,
    /// Connection ID to use for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<u64>,
    /// Credentials ID to use for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_id: Option<u64>,
    /// User ID of the user who created this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_id: Option<u64>,
    /// Subdirectory of the dbt project to use for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbt_project_subdirectory: Option<String>,
    /// Whether to use a custom branch for this environment.
    #[serde(default)]
    pub use_custom_branch: bool,
    /// Custom branch to use for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_branch: Option<String>,
    /// dbt version to use for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbt_version: Option<String>,
    /// Raw dbt version to use for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_dbt_version: Option<String>,
    /// Whether this environment supports docs.
    #[serde(default)]
    pub supports_docs: bool,
    /// Repository ID to use for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<u64>,
    /// State of the environment. 1 = Active.
    #[serde(default = "default_state")]
    pub state: u64,
    /// Custom environment variables to use for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_environment_variables: Option<Map<String, Value>>,
}

impl EnvironmentCreateCommand {
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

impl Command for EnvironmentCreateCommand {
    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> String {
        format!(
            "/accounts/{}/projects/{}/environments",
            self.account_id, self.project_id
        )
    }

    fn body(&self) -> Option<Value> {
        payload(self)
    }
}

/// Updates an environment in a given project. The path identifier is
/// serialized into the payload as `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentUpdateCommand {
    /// ID of the environment to update.
    #[serde(skip_serializing)]
    pub environment_id: u64,
    #[serde(flatten)]
    pub environment: EnvironmentCreateCommand,
}

impl EnvironmentUpdateCommand {
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

impl Command for EnvironmentUpdateCommand {
    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> String {
        format!(
            "/accounts/{}/projects/{}/environments/{}",
            self.environment.account_id, self.environment.project_id, self.environment_id
        )
    }

    fn body(&self) -> Option<Value> {
        let mut body = payload(&self.environment)?;
        body["id"] = json!(self.environment_id);
        Some(body)
    }
}

/// Deletes a dbt Cloud environment in a given account.
#[derive(Debug, Clone)]
pub struct EnvironmentDeleteCommand {
    pub account_id: u64,
    pub environment_id: u64,
}

impl EnvironmentDeleteCommand {
    pub fn new(settings: &Settings, environment_id: u64) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            environment_id,
        })
    }
}

impl Command for EnvironmentDeleteCommand {
    fn method(&self) -> Method {
        Method::DELETE
    }

    fn path(&self) -> String {
        format!(
            "/accounts/{}/environments/{}/",
            self.account_id, self.environment_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default().with_account_id(123456)
    }

    #[test]
    fn list_uses_v3() {
        let cmd = EnvironmentListCommand::new(&settings(), 123457).unwrap();
        assert_eq!(
            cmd.url(&settings()),
            "https://cloud.getdbt.com/api/v3/accounts/123456/projects/123457/environments"
        );
    }

    #[test]
    fn get_stays_on_v2() {
        let cmd = EnvironmentGetCommand::new(&settings(), 123457, 49819).unwrap();
        assert_eq!(
            cmd.url(&settings()),
            "https://cloud.getdbt.com/api/v2/accounts/123456/projects/123457/environments/49819/"
        );
    }

    // The serialization-exclusion contract: auth values are not fields at
    // all, the unset platform-assigned id drops out as empty, and the
    // scope identifiers stay in the payload.
    #[test]
    fn create_body_drops_empty_and_keeps_scope() {
        let options = json!({"project_id": 123457, "name": "Production"});
        let cmd = EnvironmentCreateCommand::from_options(options, &settings()).unwrap();
        let body = cmd.body().unwrap();
        assert_eq!(body["account_id"], json!(123456));
        assert_eq!(body["project_id"], json!(123457));
        assert_eq!(body["name"], json!("Production"));
        assert!(body.get("id").is_none());
        assert!(body.get("connection_id").is_none());
        assert!(body.get("api_token").is_none());
        assert_eq!(body["use_custom_branch"], json!(false));
        assert_eq!(body["state"], json!(1));
    }

    #[test]
    fn update_moves_environment_id_into_payload() {
        let options = json!({"environment_id": 49819, "project_id": 123457, "name": "Production"});
        let cmd = EnvironmentUpdateCommand::from_options(options, &settings()).unwrap();
        assert_eq!(
            cmd.path(),
            "/accounts/123456/projects/123457/environments/49819"
        );
        let body = cmd.body().unwrap();
        assert_eq!(body["id"], json!(49819));
        assert!(body.get("environment_id").is_none());
    }

    #[test]
    fn delete_is_not_project_scoped() {
        let cmd = EnvironmentDeleteCommand::new(&settings(), 49819).unwrap();
        assert_eq!(cmd.path(), "/accounts/123456/environments/49819/");
    }
}

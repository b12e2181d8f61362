//! Connection commands
//!
//! Connection parameters are a tagged union keyed by the `type` field:
//! only the selected warehouse family's fields exist on the wire. The
//! union is flattened into the create payload, so the request body looks
//! exactly like the platform's own connection document.

use crate::command::{ensure_field, from_options, payload, Command};
use crate::config::{Settings, ENV_ACCOUNT_ID};
use crate::error::DbtCloudResult;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Warehouse-specific connection parameters, discriminated by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConnectionParameters {
    Snowflake {
        /// Snowflake account name.
        account: String,
        /// Snowflake database name.
        database: String,
        /// Snowflake warehouse name.
        warehouse: String,
        /// Allow SSO.
        allow_sso: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_session_keep_alive: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<String>,
    },
    Bigquery {
        /// GCP project to bill queries to.
        gcp_project_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_seconds: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        private_key_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_email: Option<String>,
    },
    Postgres {
        host: String,
        port: u16,
        /// Database name.
        dbname: String,
    },
}

/// Retrieves details of connections in a given project.
#[derive(Debug, Clone)]
pub struct ConnectionListCommand {
    pub account_id: u64,
    pub project_id: u64,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ConnectionListCommand {
    pub fn new(
        settings: &Settings,
        project_id: u64,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            project_id,
            limit,
            offset,
        })
    }
}

impl Command for ConnectionListCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!(
            "/accounts/{}/projects/{}/connections/",
            self.account_id, self.project_id
        )
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset", offset.to_string()));
        }
        query
    }
}

/// Retrieves the details of a dbt Cloud database connection.
#[derive(Debug, Clone)]
pub struct ConnectionGetCommand {
    pub account_id: u64,
    pub project_id: u64,
    pub connection_id: u64,
}

impl ConnectionGetCommand {
    pub fn new(
        settings: &Settings,
        project_id: u64,
        connection_id: u64,
    ) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            project_id,
            connection_id,
        })
    }
}

impl Command for ConnectionGetCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!(
            "/accounts/{}/projects/{}/connections/{}/",
            self.account_id, self.project_id, self.connection_id
        )
    }
}

fn default_state() -> u64 {
    1
}

/// Creates a new database connection in a given account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionCreateCommand {
    /// Account scope; the platform also expects it in the payload.
    pub account_id: u64,
    /// Name of the connection.
    pub name: String,
    /// State of the connection. 1 = Active.
    #[serde(default = "default_state")]
    pub state: u64,
    /// ID of the user who created the connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_id: Option<u64>,
    /// ID of the service token that created the connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_service_token_id: Option<u64>,
    #[serde(flatten)]
    pub parameters: ConnectionParameters,
}

impl ConnectionCreateCommand {
    /// Construct from a nested option mapping. The discriminator rides in
    /// the mapping's top-level `type` key; a value outside the supported
    /// warehouse families is an `InvalidChoice` error, raised before any
    /// request is issued.
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

impl Command for ConnectionCreateCommand {
    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> String {
        format!("/accounts/{}/connections/", self.account_id)
    }

    fn body(&self) -> Option<Value> {
        payload(self)
    }
}

/// Deletes a database connection in a given project.
#[derive(Debug, Clone)]
pub struct ConnectionDeleteCommand {
    pub account_id: u64,
    pub project_id: u64,
    pub connection_id: u64,
}

impl ConnectionDeleteCommand {
    pub fn new(
        settings: &Settings,
        project_id: u64,
        connection_id: u64,
    ) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            project_id,
            connection_id,
        })
    }
}

impl Command for ConnectionDeleteCommand {
    fn method(&self) -> Method {
        Method::DELETE
    }

    fn path(&self) -> String {
        format!(
            "/accounts/{}/projects/{}/connections/{}/",
            self.account_id, self.project_id, self.connection_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbtCloudError;

    fn settings() -> Settings {
        Settings::default().with_account_id(123456)
    }

    #[test]
    fn create_serializes_only_the_selected_variant() {
        let options = json!({
            "name": "Data warehouse",
            "type": "snowflake",
            "account": "snowflake-account",
            "database": "analytics",
            "warehouse": "transforming",
            "allow_sso": true,
        });
        let cmd = ConnectionCreateCommand::from_options(options, &settings()).unwrap();
        let body = cmd.body().unwrap();
        assert_eq!(body["type"], json!("snowflake"));
        assert_eq!(body["account"], json!("snowflake-account"));
        assert_eq!(body["warehouse"], json!("transforming"));
        assert_eq!(body["state"], json!(1));
        // Nothing from the other families leaks in.
        assert!(body.get("gcp_project_id").is_none());
        assert!(body.get("host").is_none());
    }

    #[test]
    fn create_accepts_bigquery() {
        let options = json!({
            "name": "BQ",
            "type": "bigquery",
            "gcp_project_id": "my-project",
        });
        let cmd = ConnectionCreateCommand::from_options(options, &settings()).unwrap();
        let body = cmd.body().unwrap();
        assert_eq!(body["type"], json!("bigquery"));
        assert_eq!(body["gcp_project_id"], json!("my-project"));
        assert!(body.get("timeout_seconds").is_none());
    }

    #[test]
    fn unknown_type_is_an_invalid_choice() {
        let options = json!({
            "name": "Nope",
            "type": "oracle",
        });
        let err = ConnectionCreateCommand::from_options(options, &settings()).unwrap_err();
        assert!(matches!(
            err,
            DbtCloudError::InvalidChoice { ref value, .. } if value == "oracle"
        ));
    }

    #[test]
    fn create_posts_to_account_scope() {
        let options = json!({
            "name": "PG",
            "type": "postgres",
            "host": "db.internal",
            "port": 5432,
            "dbname": "analytics",
        });
        let cmd = ConnectionCreateCommand::from_options(options, &settings()).unwrap();
        assert_eq!(cmd.path(), "/accounts/123456/connections/");
        assert_eq!(cmd.method(), Method::POST);
    }

    #[test]
    fn list_query_carries_window() {
        let cmd = ConnectionListCommand::new(&settings(), 123457, Some(10), Some(20)).unwrap();
        assert_eq!(
            cmd.query(),
            vec![("limit", "10".to_string()), ("offset", "20".to_string())]
        );
    }
}

//! `dbt-cloud connection {list, get, create, delete}`
//!
//! `connection create` takes a `--type` discriminator; the warehouse
//! family decides which of the remaining flags end up on the wire. Flag
//! values are collected into a flat map and validated by the command
//! model, so a missing family field or an unsupported type surfaces as a
//! local validation error.

use crate::commands::push_option;
use crate::output::finish;
use clap::{Args, Subcommand, ValueEnum};
use dbt_cloud_core::command::connection::{
    ConnectionCreateCommand, ConnectionDeleteCommand, ConnectionGetCommand,
    ConnectionListCommand,
};
use dbt_cloud_core::translate::unflatten;
use dbt_cloud_core::Client;
use serde_json::{json, Map, Value};

/// Supported warehouse families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConnectionType {
    Snowflake,
    Bigquery,
    Postgres,
}

impl ConnectionType {
    fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Snowflake => "snowflake",
            ConnectionType::Bigquery => "bigquery",
            ConnectionType::Postgres => "postgres",
        }
    }
}

/// Connection subcommands.
#[derive(Debug, Subcommand)]
pub enum ConnectionCmd {
    /// Retrieves connections in a given project
    List {
        /// Numeric ID of the project
        #[arg(long, env = "DBT_CLOUD_PROJECT_ID")]
        project_id: u64,
        /// Number of connections to return
        #[arg(long)]
        limit: Option<u64>,
        /// Offset into the connection list
        #[arg(long)]
        offset: Option<u64>,
    },
    /// Retrieves the details of a database connection
    Get {
        /// Numeric ID of the project
        #[arg(long, env = "DBT_CLOUD_PROJECT_ID")]
        project_id: u64,
        /// Numeric ID of the connection
        #[arg(long)]
        connection_id: u64,
    },
    /// Creates a new database connection in the account
    Create(ConnectionCreateArgs),
    /// Deletes a database connection from a given project
    Delete {
        /// Numeric ID of the project
        #[arg(long, env = "DBT_CLOUD_PROJECT_ID")]
        project_id: u64,
        /// Numeric ID of the connection
        #[arg(long)]
        connection_id: u64,
    },
}

/// Flags for `connection create`.
#[derive(Debug, Args)]
pub struct ConnectionCreateArgs {
    /// Name of the connection
    #[arg(long)]
    pub name: String,
    /// Warehouse family of the connection
    #[arg(long, value_enum)]
    pub r#type: ConnectionType,
    /// State of the connection; 1 = active
    #[arg(long)]
    pub state: Option<u64>,
    /// ID of the user creating the connection
    #[arg(long)]
    pub created_by_id: Option<u64>,
    /// ID of the service token creating the connection
    #[arg(long)]
    pub created_by_service_token_id: Option<u64>,

    // snowflake
    /// Snowflake account name
    #[arg(long)]
    pub account: Option<String>,
    /// Snowflake database name
    #[arg(long)]
    pub database: Option<String>,
    /// Snowflake warehouse name
    #[arg(long)]
    pub warehouse: Option<String>,
    /// Allow SSO (snowflake)
    #[arg(long)]
    pub allow_sso: Option<bool>,
    /// Keep Snowflake sessions alive between runs
    #[arg(long)]
    pub client_session_keep_alive: Option<bool>,
    /// Snowflake role to assume
    #[arg(long)]
    pub role: Option<String>,

    // bigquery
    /// GCP project to bill queries to
    #[arg(long)]
    pub gcp_project_id: Option<String>,
    /// BigQuery job timeout in seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,
    /// Service account private key id
    #[arg(long)]
    pub private_key_id: Option<String>,
    /// Service account client email
    #[arg(long)]
    pub client_email: Option<String>,

    // postgres
    /// Database server hostname (postgres)
    #[arg(long)]
    pub db_host: Option<String>,
    /// Database server port (postgres)
    #[arg(long)]
    pub db_port: Option<u16>,
    /// Database name (postgres)
    #[arg(long)]
    pub dbname: Option<String>,
}

impl ConnectionCreateArgs {
    fn into_options(self) -> Value {
        let mut flat = Map::new();
        flat.insert("name".to_string(), Value::String(self.name));
        flat.insert(
            "type".to_string(),
            Value::String(self.r#type.as_str().to_string()),
        );
        push_option(&mut flat, "state", self.state.map(|v| json!(v)));
        push_option(
            &mut flat,
            "created_by_id",
            self.created_by_id.map(|v| json!(v)),
        );
        push_option(
            &mut flat,
            "created_by_service_token_id",
            self.created_by_service_token_id.map(|v| json!(v)),
        );
        push_option(&mut flat, "account", self.account.map(Value::String));
        push_option(&mut flat, "database", self.database.map(Value::String));
        push_option(&mut flat, "warehouse", self.warehouse.map(Value::String));
        push_option(&mut flat, "allow_sso", self.allow_sso.map(Value::Bool));
        push_option(
            &mut flat,
            "client_session_keep_alive",
            self.client_session_keep_alive.map(Value::Bool),
        );
        push_option(&mut flat, "role", self.role.map(Value::String));
        push_option(
            &mut flat,
            "gcp_project_id",
            self.gcp_project_id.map(Value::String),
        );
        push_option(
            &mut flat,
            "timeout_seconds",
            self.timeout_seconds.map(|v| json!(v)),
        );
        push_option(
            &mut flat,
            "private_key_id",
            self.private_key_id.map(Value::String),
        );
        push_option(
            &mut flat,
            "client_email",
            self.client_email.map(Value::String),
        );
        push_option(&mut flat, "host", self.db_host.map(Value::String));
        push_option(&mut flat, "port", self.db_port.map(|v| json!(v)));
        push_option(&mut flat, "dbname", self.dbname.map(Value::String));
        unflatten(flat)
    }
}

pub async fn run(client: &Client, cmd: ConnectionCmd) -> anyhow::Result<()> {
    let response = match cmd {
        ConnectionCmd::List {
            project_id,
            limit,
            offset,
        } => {
            let command =
                ConnectionListCommand::new(client.settings(), project_id, limit, offset)?;
            client.execute(&command).await?
        }
        ConnectionCmd::Get {
            project_id,
            connection_id,
        } => {
            let command =
                ConnectionGetCommand::new(client.settings(), project_id, connection_id)?;
            client.execute(&command).await?
        }
        ConnectionCmd::Create(args) => {
            let command =
                ConnectionCreateCommand::from_options(args.into_options(), client.settings())?;
            client.execute(&command).await?
        }
        ConnectionCmd::Delete {
            project_id,
            connection_id,
        } => {
            let command =
                ConnectionDeleteCommand::new(client.settings(), project_id, connection_id)?;
            client.execute(&command).await?
        }
    };
    finish(&response)
}

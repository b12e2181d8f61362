//! `dbt-cloud environment {list, get, create, update, delete}`

use crate::commands::push_option;
use crate::output::finish;
use clap::{Args, Subcommand};
use dbt_cloud_core::command::environment::{
    EnvironmentCreateCommand, EnvironmentDeleteCommand, EnvironmentGetCommand,
    EnvironmentListCommand, EnvironmentUpdateCommand,
};
use dbt_cloud_core::translate::unflatten;
use dbt_cloud_core::Client;
use serde_json::{json, Map, Value};

/// Environment subcommands.
#[derive(Debug, Subcommand)]
pub enum EnvironmentCmd {
    /// Retrieves environments for a given project
    List {
        /// Numeric ID of the project
        #[arg(long, env = "DBT_CLOUD_PROJECT_ID")]
        project_id: u64,
    },
    /// Retrieves information about an environment
    Get {
        /// Numeric ID of the project
        #[arg(long, env = "DBT_CLOUD_PROJECT_ID")]
        project_id: u64,
        /// Numeric ID of the environment
        #[arg(long, env = "DBT_CLOUD_ENVIRONMENT_ID")]
        environment_id: u64,
    },
    /// Creates a new environment in a given project
    Create(EnvironmentWriteArgs),
    /// Updates an environment in a given project
    Update {
        /// Numeric ID of the environment to update
        #[arg(long, env = "DBT_CLOUD_ENVIRONMENT_ID")]
        environment_id: u64,
        #[command(flatten)]
        args: EnvironmentWriteArgs,
    },
    /// Deletes an environment from the account
    Delete {
        /// Numeric ID of the environment
        #[arg(long, env = "DBT_CLOUD_ENVIRONMENT_ID")]
        environment_id: u64,
    },
}

/// Payload flags shared by `environment create` and `environment update`.
#[derive(Debug, Args)]
pub struct EnvironmentWriteArgs {
    /// Numeric ID of the project
    #[arg(long, env = "DBT_CLOUD_PROJECT_ID")]
    pub project_id: u64,
    /// Name of the environment
    #[arg(long)]
    pub name: String,
    /// Connection ID to use for this environment
    #[arg(long)]
    pub connection_id: Option<u64>,
    /// Credentials ID to use for this environment
    #[arg(long)]
    pub credentials_id: Option<u64>,
    /// User ID of the environment's creator
    #[arg(long)]
    pub created_by_id: Option<u64>,
    /// Subdirectory of the dbt project to use
    #[arg(long)]
    pub dbt_project_subdirectory: Option<String>,
    /// Use a custom branch for this environment
    #[arg(long)]
    pub use_custom_branch: Option<bool>,
    /// Custom branch to use
    #[arg(long)]
    pub custom_branch: Option<String>,
    /// dbt version to use for this environment
    #[arg(long)]
    pub dbt_version: Option<String>,
    /// Raw dbt version to use for this environment
    #[arg(long)]
    pub raw_dbt_version: Option<String>,
    /// Whether this environment supports docs
    #[arg(long)]
    pub supports_docs: Option<bool>,
    /// Repository ID to use for this environment
    #[arg(long)]
    pub repository_id: Option<u64>,
    /// State of the environment; 1 = active
    #[arg(long)]
    pub state: Option<u64>,
}

impl EnvironmentWriteArgs {
    fn into_options(self) -> Value {
        let mut flat = Map::new();
        flat.insert("project_id".to_string(), json!(self.project_id));
        flat.insert("name".to_string(), Value::String(self.name));
        push_option(
            &mut flat,
            "connection_id",
            self.connection_id.map(|v| json!(v)),
        );
        push_option(
            &mut flat,
            "credentials_id",
            self.credentials_id.map(|v| json!(v)),
        );
        push_option(
            &mut flat,
            "created_by_id",
            self.created_by_id.map(|v| json!(v)),
        );
        push_option(
            &mut flat,
            "dbt_project_subdirectory",
            self.dbt_project_subdirectory.map(Value::String),
        );
        push_option(
            &mut flat,
            "use_custom_branch",
            self.use_custom_branch.map(Value::Bool),
        );
        push_option(
            &mut flat,
            "custom_branch",
            self.custom_branch.map(Value::String),
        );
        push_option(&mut flat, "dbt_version", self.dbt_version.map(Value::String));
        push_option(
            &mut flat,
            "raw_dbt_version",
            self.raw_dbt_version.map(Value::String),
        );
        push_option(
            &mut flat,
            "supports_docs",
            self.supports_docs.map(Value::Bool),
        );
        push_option(
            &mut flat,
            "repository_id",
            self.repository_id.map(|v| json!(v)),
        );
        push_option(&mut flat, "state", self.state.map(|v| json!(v)));
        unflatten(flat)
    }
}

pub async fn run(client: &Client, cmd: EnvironmentCmd) -> anyhow::Result<()> {
    let response = match cmd {
        EnvironmentCmd::List { project_id } => {
            let command = EnvironmentListCommand::new(client.settings(), project_id)?;
            client.execute(&command).await?
        }
        EnvironmentCmd::Get {
            project_id,
            environment_id,
        } => {
            let command =
                EnvironmentGetCommand::new(client.settings(), project_id, environment_id)?;
            client.execute(&command).await?
        }
        EnvironmentCmd::Create(args) => {
            let command =
                EnvironmentCreateCommand::from_options(args.into_options(), client.settings())?;
            client.execute(&command).await?
        }
        EnvironmentCmd::Update {
            environment_id,
            args,
        } => {
            let mut options = args.into_options();
            options["environment_id"] = json!(environment_id);
            let command =
                EnvironmentUpdateCommand::from_options(options, client.settings())?;
            client.execute(&command).await?
        }
        EnvironmentCmd::Delete { environment_id } => {
            let command = EnvironmentDeleteCommand::new(client.settings(), environment_id)?;
            client.execute(&command).await?
        }
    };
    finish(&response)
}

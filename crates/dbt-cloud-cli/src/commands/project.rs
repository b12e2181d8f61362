//! `dbt-cloud project {list, get, create, update, delete}`

use crate::commands::push_option;
use crate::output::finish;
use clap::{Args, Subcommand};
use dbt_cloud_core::command::project::{
    ProjectCreateCommand, ProjectDeleteCommand, ProjectGetCommand, ProjectListCommand,
    ProjectUpdateCommand,
};
use dbt_cloud_core::translate::unflatten;
use dbt_cloud_core::Client;
use serde_json::{json, Map, Value};

/// Project subcommands.
#[derive(Debug, Subcommand)]
pub enum ProjectCmd {
    /// Returns a list of projects in the account
    List,
    /// Retrieves dbt Cloud project information
    Get {
        /// Numeric ID of the project
        #[arg(long, env = "DBT_CLOUD_PROJECT_ID")]
        project_id: u64,
    },
    /// Creates a new dbt Cloud project in the account
    Create(ProjectWriteArgs),
    /// Updates a project in the account
    Update {
        /// Numeric ID of the project to update
        #[arg(long, env = "DBT_CLOUD_PROJECT_ID")]
        project_id: u64,
        #[command(flatten)]
        args: ProjectWriteArgs,
    },
    /// Deletes a dbt Cloud project from the account
    Delete {
        /// Numeric ID of the project
        #[arg(long, env = "DBT_CLOUD_PROJECT_ID")]
        project_id: u64,
    },
}

/// Payload flags shared by `project create` and `project update`.
#[derive(Debug, Args)]
pub struct ProjectWriteArgs {
    /// Name of the project
    #[arg(long)]
    pub name: String,
    /// ID of the connection to use
    #[arg(long)]
    pub connection_id: Option<u64>,
    /// ID of the repository to use
    #[arg(long)]
    pub repository_id: Option<u64>,
    /// ID of the semantic layer config to use
    #[arg(long)]
    pub semantic_layer_config_id: Option<u64>,
    /// Whether to skip setup
    #[arg(long)]
    pub skipped_setup: Option<bool>,
    /// State of the project; 1 = active
    #[arg(long)]
    pub state: Option<u64>,
    /// Subdirectory of the dbt project to use
    #[arg(long)]
    pub dbt_project_subdirectory: Option<String>,
    /// ID of the docs job to use
    #[arg(long)]
    pub docs_job_id: Option<u64>,
    /// ID of the freshness job to use
    #[arg(long)]
    pub freshness_job_id: Option<u64>,
}

impl ProjectWriteArgs {
    fn into_options(self) -> Value {
        let mut flat = Map::new();
        flat.insert("name".to_string(), Value::String(self.name));
        push_option(
            &mut flat,
            "connection_id",
            self.connection_id.map(|v| json!(v)),
        );
        push_option(
            &mut flat,
            "repository_id",
            self.repository_id.map(|v| json!(v)),
        );
        push_option(
            &mut flat,
            "semantic_layer_config_id",
            self.semantic_layer_config_id.map(|v| json!(v)),
        );
        push_option(
            &mut flat,
            "skipped_setup",
            self.skipped_setup.map(Value::Bool),
        );
        push_option(&mut flat, "state", self.state.map(|v| json!(v)));
        push_option(
            &mut flat,
            "dbt_project_subdirectory",
            self.dbt_project_subdirectory.map(Value::String),
        );
        push_option(
            &mut flat,
            "docs_job_id",
            self.docs_job_id.map(|v| json!(v)),
        );
        push_option(
            &mut flat,
            "freshness_job_id",
            self.freshness_job_id.map(|v| json!(v)),
        );
        unflatten(flat)
    }
}

pub async fn run(client: &Client, cmd: ProjectCmd) -> anyhow::Result<()> {
    let response = match cmd {
        ProjectCmd::List => {
            let command = ProjectListCommand::new(client.settings())?;
            client.execute(&command).await?
        }
        ProjectCmd::Get { project_id } => {
            let command = ProjectGetCommand::new(client.settings(), project_id)?;
            client.execute(&command).await?
        }
        ProjectCmd::Create(args) => {
            let command =
                ProjectCreateCommand::from_options(args.into_options(), client.settings())?;
            client.execute(&command).await?
        }
        ProjectCmd::Update { project_id, args } => {
            let mut options = args.into_options();
            options["project_id"] = json!(project_id);
            let command = ProjectUpdateCommand::from_options(options, client.settings())?;
            client.execute(&command).await?
        }
        ProjectCmd::Delete { project_id } => {
            let command = ProjectDeleteCommand::new(client.settings(), project_id)?;
            client.execute(&command).await?
        }
    };
    finish(&response)
}

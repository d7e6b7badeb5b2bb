//! Workflow commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use n8n_api_contract::WorkflowInput;
use n8n_client_api::WorkflowClientApi;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::output::print_json;

/// Workflow-related commands
#[derive(Subcommand)]
pub enum WorkflowCommands {
    /// List workflows (archived and deleted ones are hidden)
    List,
    /// Show a workflow
    Get(WorkflowIdArgs),
    /// Create a workflow from a JSON definition
    Create(WorkflowFileArgs),
    /// Replace a workflow with a JSON definition
    Update {
        #[command(flatten)]
        id: WorkflowIdArgs,
        #[command(flatten)]
        file: WorkflowFileArgs,
    },
    /// Delete a workflow
    Delete(WorkflowIdArgs),
    /// Activate a workflow
    Activate(WorkflowIdArgs),
    /// Deactivate a workflow
    Deactivate(WorkflowIdArgs),
    /// Explain how to run a workflow (the public API cannot start it)
    Execute {
        #[command(flatten)]
        id: WorkflowIdArgs,
        /// Run data as a JSON object
        #[arg(long, value_name = "JSON")]
        data: Option<String>,
    },
}

#[derive(Args)]
pub struct WorkflowIdArgs {
    /// Workflow ID
    #[arg(value_name = "WORKFLOW_ID")]
    pub id: String,
}

#[derive(Args)]
pub struct WorkflowFileArgs {
    /// Path to the workflow definition (name, nodes, connections, settings)
    #[arg(short, long, value_name = "FILE")]
    pub file: PathBuf,
}

impl WorkflowCommands {
    /// Execute the workflow command
    pub async fn run(self, api: &dyn WorkflowClientApi, instance: Option<&str>) -> Result<()> {
        match self {
            WorkflowCommands::List => print_json(&api.list_workflows(instance).await?),
            WorkflowCommands::Get(args) => print_json(&api.get_workflow(&args.id, instance).await?),
            WorkflowCommands::Create(args) => {
                let input = read_workflow_input(&args.file).await?;
                print_json(&api.create_workflow(&input, instance).await?)
            }
            WorkflowCommands::Update { id, file } => {
                let input = read_workflow_input(&file.file).await?;
                print_json(&api.update_workflow(&id.id, &input, instance).await?)
            }
            WorkflowCommands::Delete(args) => {
                print_json(&api.delete_workflow(&args.id, instance).await?)
            }
            WorkflowCommands::Activate(args) => {
                print_json(&api.activate_workflow(&args.id, instance).await?)
            }
            WorkflowCommands::Deactivate(args) => {
                print_json(&api.deactivate_workflow(&args.id, instance).await?)
            }
            WorkflowCommands::Execute { id, data } => {
                let run_data = data
                    .map(|raw| serde_json::from_str::<Value>(&raw))
                    .transpose()
                    .context("--data must be valid JSON")?;
                print_json(&api.execute_workflow(&id.id, run_data.as_ref(), instance).await?)
            }
        }
    }
}

/// Read and parse a workflow definition file
pub async fn read_workflow_input(path: &Path) -> Result<WorkflowInput> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read workflow file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid workflow definition in {}", path.display()))
}

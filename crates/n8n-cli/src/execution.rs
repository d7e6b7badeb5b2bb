//! Execution commands

use anyhow::Result;
use clap::{Args, Subcommand};
use n8n_api_contract::{ExecutionListOptions, ExecutionStatus};
use n8n_client_api::WorkflowClientApi;

use crate::output::print_json;

/// Execution-related commands
#[derive(Subcommand)]
pub enum ExecutionCommands {
    /// List executions
    List(ExecutionListArgs),
    /// Show an execution
    Get {
        /// Execution ID
        #[arg(value_name = "EXECUTION_ID")]
        id: u64,
        /// Include the execution's run data
        #[arg(long)]
        include_data: bool,
    },
    /// Delete an execution
    Delete {
        /// Execution ID
        #[arg(value_name = "EXECUTION_ID")]
        id: u64,
    },
}

#[derive(Args, Default)]
pub struct ExecutionListArgs {
    /// Only executions of this workflow
    #[arg(long, value_name = "WORKFLOW_ID")]
    pub workflow_id: Option<String>,

    /// Only executions in this state (error, success, waiting)
    #[arg(long)]
    pub status: Option<ExecutionStatus>,

    /// Only executions of workflows in this project
    #[arg(long, value_name = "PROJECT_ID")]
    pub project_id: Option<String>,

    /// Maximum number of executions to return
    #[arg(long)]
    pub limit: Option<u32>,

    /// Cursor from a previous page
    #[arg(long)]
    pub cursor: Option<String>,

    /// Include run data of each execution
    #[arg(long)]
    pub include_data: bool,
}

impl From<ExecutionListArgs> for ExecutionListOptions {
    fn from(args: ExecutionListArgs) -> Self {
        ExecutionListOptions {
            include_data: args.include_data.then_some(true),
            status: args.status,
            workflow_id: args.workflow_id,
            project_id: args.project_id,
            limit: args.limit,
            cursor: args.cursor,
        }
    }
}

impl ExecutionCommands {
    /// Execute the execution command
    pub async fn run(self, api: &dyn WorkflowClientApi, instance: Option<&str>) -> Result<()> {
        match self {
            ExecutionCommands::List(args) => {
                let options = ExecutionListOptions::from(args);
                print_json(&api.list_executions(&options, instance).await?)
            }
            ExecutionCommands::Get { id, include_data } => {
                print_json(&api.get_execution(id, include_data, instance).await?)
            }
            ExecutionCommands::Delete { id } => {
                print_json(&api.delete_execution(id, instance).await?)
            }
        }
    }
}

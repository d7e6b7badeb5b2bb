//! n8n workflow CLI library

pub mod execution;
pub mod instances;
pub mod output;
pub mod tag;
pub mod workflow;

use anyhow::{Context, Result};
use n8n_client_api::WorkflowClientApi;
use n8n_rest_client::N8nApiWrapper;
use n8n_rest_client_mock::MockClient;
use std::path::PathBuf;
use tracing::debug;

// Re-export CLI types for testing
pub use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "n8nctl")]
#[command(about = "Manage n8n workflows, executions and tags across instances")]
#[command(version, author, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Instance config file (JSON with `environments` and `defaultEnv`)
    #[arg(long, env = "N8N_CONFIG", global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Instance to target (defaults to the configured default)
    #[arg(short, long, global = true, value_name = "NAME")]
    pub instance: Option<String>,

    /// Log filter used when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Use an in-memory demo backend instead of a real instance
    #[arg(long, global = true)]
    pub mock: bool,
}

impl GlobalArgs {
    /// Build the API backend selected by these options
    pub fn connect(&self) -> Result<Box<dyn WorkflowClientApi>> {
        if self.mock {
            debug!("Using in-memory mock backend");
            return Ok(Box::new(MockClient::with_demo_data()));
        }
        let wrapper = N8nApiWrapper::load(self.config.as_deref())
            .context("Failed to load n8n instance configuration")?;
        debug!(
            "Loaded instances {:?}, default '{}'",
            wrapper.available_instances(),
            wrapper.default_instance()
        );
        Ok(Box::new(wrapper))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Workflow management commands
    Workflow {
        #[command(subcommand)]
        subcommand: workflow::WorkflowCommands,
    },
    /// Execution inspection commands
    Execution {
        #[command(subcommand)]
        subcommand: execution::ExecutionCommands,
    },
    /// Tag management commands
    Tag {
        #[command(subcommand)]
        subcommand: tag::TagCommands,
    },
    /// Show configured instances and the default one
    Instances,
}

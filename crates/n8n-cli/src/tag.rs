//! Tag commands

use anyhow::Result;
use clap::Subcommand;
use n8n_api_contract::{TagInput, TagListOptions};
use n8n_client_api::WorkflowClientApi;

use crate::output::print_json;

/// Tag-related commands
#[derive(Subcommand)]
pub enum TagCommands {
    /// List tags
    List {
        /// Maximum number of tags to return
        #[arg(long)]
        limit: Option<u32>,
        /// Cursor from a previous page
        #[arg(long)]
        cursor: Option<String>,
    },
    /// Show a tag
    Get {
        #[arg(value_name = "TAG_ID")]
        id: String,
    },
    /// Create a tag
    Create {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Rename a tag
    Update {
        #[arg(value_name = "TAG_ID")]
        id: String,
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Delete a tag
    Delete {
        #[arg(value_name = "TAG_ID")]
        id: String,
    },
}

impl TagCommands {
    /// Execute the tag command
    pub async fn run(self, api: &dyn WorkflowClientApi, instance: Option<&str>) -> Result<()> {
        match self {
            TagCommands::List { limit, cursor } => {
                let options = TagListOptions { limit, cursor };
                print_json(&api.get_tags(&options, instance).await?)
            }
            TagCommands::Get { id } => print_json(&api.get_tag(&id, instance).await?),
            TagCommands::Create { name } => {
                print_json(&api.create_tag(&TagInput::new(name), instance).await?)
            }
            TagCommands::Update { id, name } => {
                print_json(&api.update_tag(&id, &TagInput::new(name), instance).await?)
            }
            TagCommands::Delete { id } => print_json(&api.delete_tag(&id, instance).await?),
        }
    }
}

//! Error types for API contract validation and parsing

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during API contract validation and parsing
#[derive(Debug, Error)]
pub enum ApiContractError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Workflow name cannot be blank")]
    BlankWorkflowName,

    #[error("Node {0} has a blank name or type")]
    BlankNodeField(usize),

    #[error("Tag name cannot be blank")]
    BlankTagName,

    #[error("Connection index {index} on node {node} exceeds the limit of {max}")]
    ConnectionIndexOutOfRange { node: String, index: u32, max: u32 },

    #[error("Duplicate node name: {0}")]
    DuplicateNodeName(String),

    #[error("Connection references unknown node: {0}")]
    UnknownNode(String),

    #[error("Invalid execution status: {0}")]
    InvalidExecutionStatus(String),
}

/// Error body returned by the n8n API on non-2xx responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

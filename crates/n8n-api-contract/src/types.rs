//! API contract types for the n8n public REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::ApiContractError;

/// Execution states accepted by the `status` filter of `GET /executions`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Error,
    Success,
    Waiting,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Error => "error",
            ExecutionStatus::Success => "success",
            ExecutionStatus::Waiting => "waiting",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStatus {
    type Err = ApiContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(ExecutionStatus::Error),
            "success" => Ok(ExecutionStatus::Success),
            "waiting" => Ok(ExecutionStatus::Waiting),
            other => Err(ApiContractError::InvalidExecutionStatus(other.to_string())),
        }
    }
}

/// A single edge endpoint inside the upstream connection map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTarget {
    pub node: String,
    #[serde(rename = "type")]
    pub connection_type: String,
    pub index: u32,
}

/// Outgoing connections of one node, keyed by output type (usually `main`).
/// The outer vector is indexed by output slot.
pub type NodeConnections = BTreeMap<String, Vec<Vec<ConnectionTarget>>>;

/// Upstream connection map keyed by source node name
pub type ConnectionMap = BTreeMap<String, NodeConnections>;

/// Workflow node as stored by n8n
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(rename = "typeVersion", default = "default_type_version")]
    pub type_version: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: [f64; 2],
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    /// Node attributes this client does not model (`webhookId`, `notes`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_type_version() -> f64 {
    1.0
}

/// Tag as returned by the tags endpoints and embedded in workflows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Tag creation / rename request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TagInput {
    #[validate(length(min = 1, message = "Tag name cannot be empty"))]
    pub name: String,
}

impl TagInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Full workflow representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub connections: ConnectionMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub settings: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_data: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Condensed workflow listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub node_count: usize,
    pub tags: Vec<String>,
}

const HIDDEN_STATES: [&str; 2] = ["archived", "deleted"];

impl WorkflowSummary {
    /// Whether a raw listing entry should be shown.
    ///
    /// Entries whose `status` (or `state`, when `status` is empty) is `archived`/`deleted`, or that
    /// carry a truthy `deleted` / `isArchived` flag, are hidden.
    pub fn is_listed(entry: &Value) -> bool {
        let state_of = |key: &str| {
            entry
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        };
        let status = state_of("status").or_else(|| state_of("state"));
        if status.is_some_and(|s| HIDDEN_STATES.contains(&s)) {
            return false;
        }
        !flag(entry, "deleted") && !flag(entry, "isArchived")
    }

    /// Build a summary from a raw listing entry.
    ///
    /// Tags are reduced to their names; a tag given as a bare string is kept
    /// as is.
    pub fn from_listing(entry: &Value) -> Self {
        let tags = entry
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(|tag| match tag {
                        Value::String(name) => Some(name.clone()),
                        other => other.get("name").and_then(Value::as_str).map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: entry.get("id").map(value_to_id).unwrap_or_default(),
            name: entry
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            active: flag(entry, "active"),
            created_at: timestamp(entry, "createdAt"),
            updated_at: timestamp(entry, "updatedAt"),
            node_count: entry
                .get("nodes")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
            tags,
        }
    }
}

fn flag(entry: &Value, key: &str) -> bool {
    entry.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn timestamp(entry: &Value, key: &str) -> Option<DateTime<Utc>> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn value_to_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Workflow execution record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub finished: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub retry_of: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub retry_success_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_till: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Paged execution list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Execution>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Filters for `GET /executions`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_data: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecutionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Paged tag list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Tag>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Paging for `GET /tags`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Body of the activation toggle `PATCH /workflows/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationRequest {
    pub active: bool,
}

/// Node definition supplied by the caller when creating or updating a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NodeInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[validate(length(min = 1, message = "Node name cannot be empty"))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Node type cannot be empty"))]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_version: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 2]>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Edge in the list form accepted from callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSpec {
    /// Source node, by name or id
    pub source: String,
    /// Target node, by name or id
    pub target: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_output: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_input: u32,
}

/// Connections as supplied by the caller: either a flat edge list or the
/// upstream map form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConnectionsInput {
    List(Vec<ConnectionSpec>),
    Map(ConnectionMap),
}

impl Default for ConnectionsInput {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// Workflow definition supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInput {
    #[validate(length(min = 1, message = "Workflow name cannot be empty"))]
    pub name: String,
    #[serde(default)]
    #[validate(nested)]
    pub nodes: Vec<NodeInput>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub connections: ConnectionsInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_data: Option<Value>,
}

/// Validated workflow payload sent to `POST /workflows` and `PUT /workflows/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSpec {
    pub name: String,
    pub nodes: Vec<WorkflowNode>,
    pub connections: ConnectionMap,
    pub settings: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_data: Option<Value>,
}

pub const EXECUTION_GUIDANCE_MODE: &str = "api_limitation";

/// Manual steps for running a workflow from the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSteps {
    pub step1: String,
    pub step2: String,
    pub step3: String,
    pub step4: String,
}

/// Static answer returned instead of running a workflow.
///
/// The public API cannot start manually triggered workflows, so the client
/// explains the alternatives rather than issuing a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionGuidance {
    pub id: Option<u64>,
    pub finished: bool,
    pub mode: String,
    pub message: String,
    pub workflow_id: String,
    pub explanation: String,
    pub recommendation: String,
    pub alternative_methods: Vec<String>,
    pub how_to_execute: ExecutionSteps,
}

impl ExecutionGuidance {
    pub fn for_workflow(workflow_id: impl Into<String>) -> Self {
        Self {
            id: None,
            finished: false,
            mode: EXECUTION_GUIDANCE_MODE.to_string(),
            message: "Workflow execution via REST API is not supported for Manual Trigger \
                      workflows. This is a design limitation of n8n."
                .to_string(),
            workflow_id: workflow_id.into(),
            explanation: "Successful executions of these workflows are started from the n8n \
                          web interface, not from REST API endpoints."
                .to_string(),
            recommendation: "Use the \"Execute Workflow\" button in the n8n editor to run this \
                             workflow."
                .to_string(),
            alternative_methods: vec![
                "Execute manually via n8n web interface (recommended)".to_string(),
                "Convert Manual Trigger to Webhook Trigger for API execution".to_string(),
                "Use Schedule Trigger for automatic execution".to_string(),
                "Use other trigger types that support API activation".to_string(),
            ],
            how_to_execute: ExecutionSteps {
                step1: "Open the n8n web interface".to_string(),
                step2: "Navigate to the workflow".to_string(),
                step3: "Click the \"Execute Workflow\" button".to_string(),
                step4: "Monitor execution in the executions panel".to_string(),
            },
        }
    }
}

// Nullable columns come back as `null`; treat them like absent fields.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// n8n has moved several identifiers from numbers to strings across releases.

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid execution id {n}"))),
        Value::String(s) => s
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid execution id {s}"))),
        other => Err(serde::de::Error::custom(format!(
            "expected execution id, got {other}"
        ))),
    }
}

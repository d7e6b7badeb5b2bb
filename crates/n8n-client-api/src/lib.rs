//! Client API trait for the n8n workflow client
//!
//! Every operation takes an optional instance selector. `None` targets the
//! default instance; naming an instance that is not configured fails before
//! any request is made.

use async_trait::async_trait;
use n8n_api_contract::*;
use serde_json::Value;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The single error surfaced by client operations.
///
/// Carries a contextual message such as
/// `API error getting workflow with ID 12: ...` and, when available, the
/// underlying cause.
#[derive(Debug, Error)]
#[error("API call failed: {message}")]
pub struct ClientApiError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ClientApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Error raised when the requested instance is not configured
    pub fn unknown_instance(instance: &str, available: &[String]) -> Self {
        Self::new(format!(
            "Instance '{}' not found. Available instances: {}",
            instance,
            available.join(", ")
        ))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type ClientApiResult<T> = Result<T, ClientApiError>;

#[async_trait]
pub trait WorkflowClientApi: Send + Sync {
    async fn create_workflow(
        &self,
        workflow: &WorkflowInput,
        instance: Option<&str>,
    ) -> ClientApiResult<Workflow>;
    async fn get_workflow(&self, id: &str, instance: Option<&str>) -> ClientApiResult<Workflow>;
    async fn update_workflow(
        &self,
        id: &str,
        workflow: &WorkflowInput,
        instance: Option<&str>,
    ) -> ClientApiResult<Workflow>;
    async fn delete_workflow(&self, id: &str, instance: Option<&str>) -> ClientApiResult<Workflow>;
    async fn activate_workflow(&self, id: &str, instance: Option<&str>)
        -> ClientApiResult<Workflow>;
    async fn deactivate_workflow(
        &self,
        id: &str,
        instance: Option<&str>,
    ) -> ClientApiResult<Workflow>;
    async fn list_workflows(&self, instance: Option<&str>) -> ClientApiResult<Vec<WorkflowSummary>>;

    async fn list_executions(
        &self,
        options: &ExecutionListOptions,
        instance: Option<&str>,
    ) -> ClientApiResult<ExecutionListResponse>;
    async fn get_execution(
        &self,
        id: u64,
        include_data: bool,
        instance: Option<&str>,
    ) -> ClientApiResult<Execution>;
    async fn delete_execution(&self, id: u64, instance: Option<&str>) -> ClientApiResult<Execution>;
    /// Never runs the workflow; answers with static guidance instead
    async fn execute_workflow(
        &self,
        id: &str,
        run_data: Option<&Value>,
        instance: Option<&str>,
    ) -> ClientApiResult<ExecutionGuidance>;

    async fn create_tag(&self, tag: &TagInput, instance: Option<&str>) -> ClientApiResult<Tag>;
    async fn get_tags(
        &self,
        options: &TagListOptions,
        instance: Option<&str>,
    ) -> ClientApiResult<TagListResponse>;
    async fn get_tag(&self, id: &str, instance: Option<&str>) -> ClientApiResult<Tag>;
    async fn update_tag(
        &self,
        id: &str,
        tag: &TagInput,
        instance: Option<&str>,
    ) -> ClientApiResult<Tag>;
    async fn delete_tag(&self, id: &str, instance: Option<&str>) -> ClientApiResult<Tag>;

    fn available_instances(&self) -> Vec<String>;
    fn default_instance(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_instance_message() {
        let available = vec!["prod".to_string(), "staging".to_string()];
        let err = ClientApiError::unknown_instance("dev", &available);

        assert_eq!(
            err.to_string(),
            "API call failed: Instance 'dev' not found. Available instances: prod, staging"
        );
    }

    #[test]
    fn test_error_keeps_source() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let err = ClientApiError::with_source("API error listing tags: connection reset", cause);

        assert_eq!(err.message(), "API error listing tags: connection reset");
        assert!(std::error::Error::source(&err).is_some());
    }
}

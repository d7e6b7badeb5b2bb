//! Instance-aware wrapper exposing the n8n API through [`WorkflowClientApi`]

use async_trait::async_trait;
use n8n_api_contract::*;
use n8n_client_api::{ClientApiError, ClientApiResult, WorkflowClientApi};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, error, info};

use crate::client::RestClient;
use crate::environment::EnvironmentManager;
use crate::error::{ConfigError, RestClientError};

/// Resolves the target instance for every call and normalizes failures into
/// [`ClientApiError`]
#[derive(Debug, Clone)]
pub struct N8nApiWrapper {
    environments: EnvironmentManager,
}

impl N8nApiWrapper {
    pub fn new(environments: EnvironmentManager) -> Self {
        Self { environments }
    }

    /// Load instance configuration and build the wrapper
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        EnvironmentManager::load(config_path).map(Self::new)
    }

    /// Client for the requested instance. Unknown names fail here, before
    /// any request is issued.
    fn resolve(&self, instance: Option<&str>) -> ClientApiResult<&RestClient> {
        if let Some(name) = instance {
            if !self.environments.contains(name) {
                return Err(ClientApiError::unknown_instance(
                    name,
                    &self.environments.available_environments(),
                ));
            }
        }
        self.environments
            .client(instance)
            .map_err(|e| ClientApiError::with_source(e.to_string(), e))
    }
}

fn api_error(context: &str, err: RestClientError) -> ClientApiError {
    error!("API error during {}", context);
    if let Some(status) = err.status() {
        error!("Status: {}", status);
    }
    match &err {
        RestClientError::ServerError { body, .. } => {
            error!("Response: {}", serde_json::to_string(body).unwrap_or_default());
        }
        RestClientError::UnexpectedResponse { body, .. } => error!("Response: {}", body),
        other => error!("Cause: {}", other),
    }
    ClientApiError::with_source(format!("API error {}: {}", context, err), err)
}

fn invalid_payload(context: &str, err: ApiContractError) -> ClientApiError {
    error!("Invalid payload while {}: {}", context, err);
    ClientApiError::with_source(format!("Invalid payload {}: {}", context, err), err)
}

/// Pull the workflow entries out of a listing response.
///
/// n8n answers `{"data": [...], "nextCursor": ...}`; a missing `data` means
/// no workflows and a bare array is accepted as is.
fn listing_entries(response: Value) -> Result<Vec<Value>, String> {
    match response {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut map) => match map.remove("data") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(entries)) => Ok(entries),
            Some(other) => {
                error!("Workflows is not an array: {}", other);
                Err("Invalid response format from n8n API: expected array of workflows".to_string())
            }
        },
        other => {
            error!("Unexpected workflow listing: {}", other);
            Err("Invalid response format from n8n API: expected array of workflows".to_string())
        }
    }
}

#[async_trait]
impl WorkflowClientApi for N8nApiWrapper {
    async fn create_workflow(
        &self,
        workflow: &WorkflowInput,
        instance: Option<&str>,
    ) -> ClientApiResult<Workflow> {
        let api = self.resolve(instance)?;
        let context = format!("creating workflow {}", workflow.name);

        info!("Creating workflow: {}", workflow.name);
        let spec = validate_workflow_spec(workflow).map_err(|e| invalid_payload(&context, e))?;
        debug!(
            "Sending workflow data to API: {}",
            serde_json::to_string(&spec).unwrap_or_default()
        );

        let created = api
            .create_workflow(&spec)
            .await
            .map_err(|e| api_error(&context, e))?;
        info!("Workflow created with ID: {}", created.id);
        Ok(created)
    }

    async fn get_workflow(&self, id: &str, instance: Option<&str>) -> ClientApiResult<Workflow> {
        let api = self.resolve(instance)?;

        info!("Getting workflow with ID: {}", id);
        let workflow = api
            .get_workflow(id)
            .await
            .map_err(|e| api_error(&format!("getting workflow with ID {}", id), e))?;
        info!("Retrieved workflow: {}", workflow.name);
        Ok(workflow)
    }

    async fn update_workflow(
        &self,
        id: &str,
        workflow: &WorkflowInput,
        instance: Option<&str>,
    ) -> ClientApiResult<Workflow> {
        let api = self.resolve(instance)?;
        let context = format!("updating workflow with ID {}", id);

        info!("Updating workflow with ID: {}", id);
        let spec = validate_workflow_spec(workflow).map_err(|e| invalid_payload(&context, e))?;

        let updated = api
            .update_workflow(id, &spec)
            .await
            .map_err(|e| api_error(&context, e))?;
        info!("Updated workflow: {}", updated.name);
        Ok(updated)
    }

    async fn delete_workflow(&self, id: &str, instance: Option<&str>) -> ClientApiResult<Workflow> {
        let api = self.resolve(instance)?;

        info!("Deleting workflow with ID: {}", id);
        let deleted = api
            .delete_workflow(id)
            .await
            .map_err(|e| api_error(&format!("deleting workflow with ID {}", id), e))?;
        info!("Deleted workflow with ID: {}", id);
        Ok(deleted)
    }

    async fn activate_workflow(
        &self,
        id: &str,
        instance: Option<&str>,
    ) -> ClientApiResult<Workflow> {
        let api = self.resolve(instance)?;

        info!("Activating workflow with ID: {}", id);
        let workflow = api
            .set_workflow_active(id, true)
            .await
            .map_err(|e| api_error(&format!("activating workflow with ID {}", id), e))?;
        info!("Activated workflow: {}", workflow.name);
        Ok(workflow)
    }

    async fn deactivate_workflow(
        &self,
        id: &str,
        instance: Option<&str>,
    ) -> ClientApiResult<Workflow> {
        let api = self.resolve(instance)?;

        info!("Deactivating workflow with ID: {}", id);
        let workflow = api
            .set_workflow_active(id, false)
            .await
            .map_err(|e| api_error(&format!("deactivating workflow with ID {}", id), e))?;
        info!("Deactivated workflow: {}", workflow.name);
        Ok(workflow)
    }

    async fn list_workflows(
        &self,
        instance: Option<&str>,
    ) -> ClientApiResult<Vec<WorkflowSummary>> {
        let api = self.resolve(instance)?;

        info!("Listing workflows");
        debug!("Making request to: {}/workflows", api.base_url());
        let response = api
            .list_workflows()
            .await
            .map_err(|e| api_error("listing workflows", e))?;

        let entries = listing_entries(response).map_err(ClientApiError::new)?;
        info!("Retrieved {} workflows", entries.len());

        Ok(entries
            .iter()
            .filter(|entry| WorkflowSummary::is_listed(entry))
            .map(WorkflowSummary::from_listing)
            .collect())
    }

    async fn list_executions(
        &self,
        options: &ExecutionListOptions,
        instance: Option<&str>,
    ) -> ClientApiResult<ExecutionListResponse> {
        let api = self.resolve(instance)?;

        info!("Listing executions");
        let executions = api
            .list_executions(options)
            .await
            .map_err(|e| api_error("listing executions", e))?;
        info!("Retrieved {} executions", executions.data.len());
        Ok(executions)
    }

    async fn get_execution(
        &self,
        id: u64,
        include_data: bool,
        instance: Option<&str>,
    ) -> ClientApiResult<Execution> {
        let api = self.resolve(instance)?;

        info!("Getting execution with ID: {}", id);
        let execution = api
            .get_execution(id, include_data)
            .await
            .map_err(|e| api_error(&format!("getting execution with ID {}", id), e))?;
        info!("Retrieved execution: {}", id);
        Ok(execution)
    }

    async fn delete_execution(
        &self,
        id: u64,
        instance: Option<&str>,
    ) -> ClientApiResult<Execution> {
        let api = self.resolve(instance)?;

        info!("Deleting execution with ID: {}", id);
        let execution = api
            .delete_execution(id)
            .await
            .map_err(|e| api_error(&format!("deleting execution with ID {}", id), e))?;
        info!("Deleted execution: {}", id);
        Ok(execution)
    }

    // No instance lookup: nothing is sent anywhere.
    async fn execute_workflow(
        &self,
        id: &str,
        run_data: Option<&Value>,
        _instance: Option<&str>,
    ) -> ClientApiResult<ExecutionGuidance> {
        info!("Workflow execution request for ID: {}", id);
        if run_data.is_some() {
            debug!("Ignoring run data supplied for workflow {}", id);
        }
        info!("Workflow execution via REST API is not supported");
        info!("Manual Trigger workflows must be executed through the n8n web interface");
        Ok(ExecutionGuidance::for_workflow(id))
    }

    async fn create_tag(&self, tag: &TagInput, instance: Option<&str>) -> ClientApiResult<Tag> {
        let api = self.resolve(instance)?;
        let context = format!("creating tag {}", tag.name);

        info!("Creating tag: {}", tag.name);
        validate_tag_input(tag).map_err(|e| invalid_payload(&context, e))?;
        let created = api
            .create_tag(tag)
            .await
            .map_err(|e| api_error(&context, e))?;
        info!("Created tag: {}", created.name);
        Ok(created)
    }

    async fn get_tags(
        &self,
        options: &TagListOptions,
        instance: Option<&str>,
    ) -> ClientApiResult<TagListResponse> {
        let api = self.resolve(instance)?;

        info!("Listing tags");
        let tags = api
            .list_tags(options)
            .await
            .map_err(|e| api_error("listing tags", e))?;
        info!("Retrieved {} tags", tags.data.len());
        Ok(tags)
    }

    async fn get_tag(&self, id: &str, instance: Option<&str>) -> ClientApiResult<Tag> {
        let api = self.resolve(instance)?;

        info!("Getting tag with ID: {}", id);
        let tag = api
            .get_tag(id)
            .await
            .map_err(|e| api_error(&format!("getting tag with ID {}", id), e))?;
        info!("Retrieved tag: {}", tag.name);
        Ok(tag)
    }

    async fn update_tag(
        &self,
        id: &str,
        tag: &TagInput,
        instance: Option<&str>,
    ) -> ClientApiResult<Tag> {
        let api = self.resolve(instance)?;
        let context = format!("updating tag with ID {}", id);

        info!("Updating tag with ID: {}", id);
        validate_tag_input(tag).map_err(|e| invalid_payload(&context, e))?;
        let updated = api
            .update_tag(id, tag)
            .await
            .map_err(|e| api_error(&context, e))?;
        info!("Updated tag: {}", updated.name);
        Ok(updated)
    }

    async fn delete_tag(&self, id: &str, instance: Option<&str>) -> ClientApiResult<Tag> {
        let api = self.resolve(instance)?;

        info!("Deleting tag with ID: {}", id);
        let deleted = api
            .delete_tag(id)
            .await
            .map_err(|e| api_error(&format!("deleting tag with ID {}", id), e))?;
        info!("Deleted tag: {}", id);
        Ok(deleted)
    }

    fn available_instances(&self) -> Vec<String> {
        self.environments.available_environments()
    }

    fn default_instance(&self) -> String {
        self.environments.default_environment().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_entries_shapes() {
        assert_eq!(listing_entries(json!({"data": [{"id": "1"}]})).unwrap().len(), 1);
        assert!(listing_entries(json!({"nextCursor": null})).unwrap().is_empty());
        assert!(listing_entries(json!({"data": null})).unwrap().is_empty());
        assert_eq!(listing_entries(json!([{"id": "1"}, {"id": "2"}])).unwrap().len(), 2);
        assert!(listing_entries(json!({"data": {"id": "1"}})).is_err());
        assert!(listing_entries(json!("nope")).is_err());
    }
}

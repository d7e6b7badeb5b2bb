//! In-memory stand-in for an n8n instance
//!
//! `MockClient` implements [`WorkflowClientApi`] over a local store so the
//! CLI and downstream tests can run without a server. It answers for a
//! single instance named [`MOCK_INSTANCE`] and applies the same payload
//! validation and listing rules as the REST wrapper.

use async_trait::async_trait;
use chrono::Utc;
use n8n_api_contract::*;
use n8n_client_api::{ClientApiError, ClientApiResult, WorkflowClientApi};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

pub const MOCK_INSTANCE: &str = "mock";

#[derive(Default)]
struct MockState {
    workflows: BTreeMap<String, Workflow>,
    executions: BTreeMap<u64, Execution>,
    tags: BTreeMap<String, Tag>,
    next_workflow: u64,
    next_tag: u64,
}

#[derive(Default)]
pub struct MockClient {
    state: Mutex<MockState>,
}

impl MockClient {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with two workflows, one archived workflow, two
    /// executions and two tags
    pub fn with_demo_data() -> Self {
        let client = Self::new();
        {
            let mut state = client.lock();
            let prod = state.insert_tag("prod");
            state.insert_tag("reporting");

            let mut sync = state.insert_workflow(demo_spec("Nightly sync"));
            sync.active = true;
            sync.tags.push(prod);
            state.workflows.insert(sync.id.clone(), sync.clone());

            state.insert_workflow(demo_spec("Weekly report"));

            let mut retired = state.insert_workflow(demo_spec("Retired import"));
            retired.extra.insert("isArchived".to_string(), Value::Bool(true));
            state.workflows.insert(retired.id.clone(), retired);

            for (id, status) in [(1, "success"), (2, "error")] {
                state.executions.insert(
                    id,
                    Execution {
                        id,
                        finished: status == "success",
                        mode: Some("trigger".to_string()),
                        retry_of: None,
                        retry_success_id: None,
                        started_at: Some(Utc::now()),
                        stopped_at: Some(Utc::now()),
                        workflow_id: Some(sync.id.clone()),
                        wait_till: None,
                        status: Some(status.to_string()),
                        data: None,
                        extra: Map::new(),
                    },
                );
            }
        }
        client
    }

    /// Mark a stored workflow as archived so listings hide it
    pub fn archive_workflow(&self, id: &str) -> bool {
        let mut state = self.lock();
        match state.workflows.get_mut(id) {
            Some(workflow) => {
                workflow
                    .extra
                    .insert("isArchived".to_string(), Value::Bool(true));
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_instance(&self, instance: Option<&str>) -> ClientApiResult<()> {
        match instance {
            Some(name) if name != MOCK_INSTANCE => Err(ClientApiError::unknown_instance(
                name,
                &[MOCK_INSTANCE.to_string()],
            )),
            _ => Ok(()),
        }
    }
}

impl MockState {
    fn insert_workflow(&mut self, spec: WorkflowSpec) -> Workflow {
        self.next_workflow += 1;
        let now = Utc::now();
        let workflow = Workflow {
            id: format!("wf-{}", self.next_workflow),
            name: spec.name,
            active: false,
            created_at: Some(now),
            updated_at: Some(now),
            nodes: spec.nodes,
            connections: spec.connections,
            settings: spec.settings,
            static_data: spec.static_data,
            tags: Vec::new(),
            extra: Map::new(),
        };
        self.workflows.insert(workflow.id.clone(), workflow.clone());
        workflow
    }

    fn insert_tag(&mut self, name: &str) -> Tag {
        self.next_tag += 1;
        let now = Utc::now();
        let tag = Tag {
            id: format!("tag-{}", self.next_tag),
            name: name.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.tags.insert(tag.id.clone(), tag.clone());
        tag
    }

    fn workflow_mut(&mut self, id: &str, context: &str) -> ClientApiResult<&mut Workflow> {
        self.workflows.get_mut(id).ok_or_else(|| not_found(context))
    }
}

fn demo_spec(name: &str) -> WorkflowSpec {
    let input: WorkflowInput = WorkflowInput {
        name: name.to_string(),
        nodes: vec![NodeInput {
            id: None,
            name: "Start".to_string(),
            node_type: "n8n-nodes-base.manualTrigger".to_string(),
            type_version: None,
            position: None,
            parameters: Map::new(),
            credentials: None,
            disabled: None,
            extra: Map::new(),
        }],
        connections: ConnectionsInput::default(),
        settings: None,
        static_data: None,
    };
    // A single well-formed node always validates.
    validate_workflow_spec(&input).unwrap_or_else(|_| WorkflowSpec {
        name: name.to_string(),
        nodes: Vec::new(),
        connections: ConnectionMap::new(),
        settings: Map::new(),
        static_data: None,
    })
}

fn not_found(context: &str) -> ClientApiError {
    ClientApiError::new(format!(
        "API error {}: Request failed with status code 404: Not Found",
        context
    ))
}

fn invalid_payload(context: &str, err: ApiContractError) -> ClientApiError {
    ClientApiError::with_source(format!("Invalid payload {}: {}", context, err), err)
}

/// Offset-based paging; the cursor is the index of the next item
fn page<T: Clone>(
    items: Vec<T>,
    limit: Option<u32>,
    cursor: Option<&str>,
) -> (Vec<T>, Option<String>) {
    let start = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
    let limit = limit.map_or(items.len(), |l| l as usize);
    let end = start.saturating_add(limit).min(items.len());
    let next = (end < items.len()).then(|| end.to_string());
    (items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(), next)
}

#[async_trait]
impl WorkflowClientApi for MockClient {
    async fn create_workflow(
        &self,
        workflow: &WorkflowInput,
        instance: Option<&str>,
    ) -> ClientApiResult<Workflow> {
        self.check_instance(instance)?;
        let context = format!("creating workflow {}", workflow.name);
        let spec = validate_workflow_spec(workflow).map_err(|e| invalid_payload(&context, e))?;
        let created = self.lock().insert_workflow(spec);
        info!("Mock created workflow {}", created.id);
        Ok(created)
    }

    async fn get_workflow(&self, id: &str, instance: Option<&str>) -> ClientApiResult<Workflow> {
        self.check_instance(instance)?;
        self.lock()
            .workflows
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(&format!("getting workflow with ID {}", id)))
    }

    async fn update_workflow(
        &self,
        id: &str,
        workflow: &WorkflowInput,
        instance: Option<&str>,
    ) -> ClientApiResult<Workflow> {
        self.check_instance(instance)?;
        let context = format!("updating workflow with ID {}", id);
        let spec = validate_workflow_spec(workflow).map_err(|e| invalid_payload(&context, e))?;

        let mut state = self.lock();
        let stored = state.workflow_mut(id, &context)?;
        stored.name = spec.name;
        stored.nodes = spec.nodes;
        stored.connections = spec.connections;
        stored.settings = spec.settings;
        stored.static_data = spec.static_data;
        stored.updated_at = Some(Utc::now());
        Ok(stored.clone())
    }

    async fn delete_workflow(&self, id: &str, instance: Option<&str>) -> ClientApiResult<Workflow> {
        self.check_instance(instance)?;
        self.lock()
            .workflows
            .remove(id)
            .ok_or_else(|| not_found(&format!("deleting workflow with ID {}", id)))
    }

    async fn activate_workflow(
        &self,
        id: &str,
        instance: Option<&str>,
    ) -> ClientApiResult<Workflow> {
        self.check_instance(instance)?;
        let mut state = self.lock();
        let stored = state.workflow_mut(id, &format!("activating workflow with ID {}", id))?;
        stored.active = true;
        Ok(stored.clone())
    }

    async fn deactivate_workflow(
        &self,
        id: &str,
        instance: Option<&str>,
    ) -> ClientApiResult<Workflow> {
        self.check_instance(instance)?;
        let mut state = self.lock();
        let stored = state.workflow_mut(id, &format!("deactivating workflow with ID {}", id))?;
        stored.active = false;
        Ok(stored.clone())
    }

    async fn list_workflows(
        &self,
        instance: Option<&str>,
    ) -> ClientApiResult<Vec<WorkflowSummary>> {
        self.check_instance(instance)?;
        let state = self.lock();
        let mut summaries = Vec::new();
        for workflow in state.workflows.values() {
            let entry = serde_json::to_value(workflow).map_err(|e| {
                ClientApiError::with_source(format!("API error listing workflows: {}", e), e)
            })?;
            if WorkflowSummary::is_listed(&entry) {
                summaries.push(WorkflowSummary::from_listing(&entry));
            }
        }
        Ok(summaries)
    }

    async fn list_executions(
        &self,
        options: &ExecutionListOptions,
        instance: Option<&str>,
    ) -> ClientApiResult<ExecutionListResponse> {
        self.check_instance(instance)?;
        let matching: Vec<Execution> = self
            .lock()
            .executions
            .values()
            .filter(|e| {
                options
                    .workflow_id
                    .as_ref()
                    .map_or(true, |wf| e.workflow_id.as_ref() == Some(wf))
            })
            .filter(|e| {
                options
                    .status
                    .map_or(true, |s| e.status.as_deref() == Some(s.as_str()))
            })
            .cloned()
            .collect();

        let (data, next_cursor) = page(matching, options.limit, options.cursor.as_deref());
        Ok(ExecutionListResponse { data, next_cursor })
    }

    async fn get_execution(
        &self,
        id: u64,
        _include_data: bool,
        instance: Option<&str>,
    ) -> ClientApiResult<Execution> {
        self.check_instance(instance)?;
        self.lock()
            .executions
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(&format!("getting execution with ID {}", id)))
    }

    async fn delete_execution(
        &self,
        id: u64,
        instance: Option<&str>,
    ) -> ClientApiResult<Execution> {
        self.check_instance(instance)?;
        self.lock()
            .executions
            .remove(&id)
            .ok_or_else(|| not_found(&format!("deleting execution with ID {}", id)))
    }

    async fn execute_workflow(
        &self,
        id: &str,
        _run_data: Option<&Value>,
        _instance: Option<&str>,
    ) -> ClientApiResult<ExecutionGuidance> {
        Ok(ExecutionGuidance::for_workflow(id))
    }

    async fn create_tag(&self, tag: &TagInput, instance: Option<&str>) -> ClientApiResult<Tag> {
        self.check_instance(instance)?;
        let context = format!("creating tag {}", tag.name);
        validate_tag_input(tag).map_err(|e| invalid_payload(&context, e))?;
        Ok(self.lock().insert_tag(&tag.name))
    }

    async fn get_tags(
        &self,
        options: &TagListOptions,
        instance: Option<&str>,
    ) -> ClientApiResult<TagListResponse> {
        self.check_instance(instance)?;
        let tags: Vec<Tag> = self.lock().tags.values().cloned().collect();
        let (data, next_cursor) = page(tags, options.limit, options.cursor.as_deref());
        Ok(TagListResponse { data, next_cursor })
    }

    async fn get_tag(&self, id: &str, instance: Option<&str>) -> ClientApiResult<Tag> {
        self.check_instance(instance)?;
        self.lock()
            .tags
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(&format!("getting tag with ID {}", id)))
    }

    async fn update_tag(
        &self,
        id: &str,
        tag: &TagInput,
        instance: Option<&str>,
    ) -> ClientApiResult<Tag> {
        self.check_instance(instance)?;
        let context = format!("updating tag with ID {}", id);
        validate_tag_input(tag).map_err(|e| invalid_payload(&context, e))?;

        let mut state = self.lock();
        let stored = state.tags.get_mut(id).ok_or_else(|| not_found(&context))?;
        stored.name = tag.name.clone();
        stored.updated_at = Some(Utc::now());
        Ok(stored.clone())
    }

    async fn delete_tag(&self, id: &str, instance: Option<&str>) -> ClientApiResult<Tag> {
        self.check_instance(instance)?;
        self.lock()
            .tags
            .remove(id)
            .ok_or_else(|| not_found(&format!("deleting tag with ID {}", id)))
    }

    fn available_instances(&self) -> Vec<String> {
        vec![MOCK_INSTANCE.to_string()]
    }

    fn default_instance(&self) -> String {
        MOCK_INSTANCE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_listing_hides_archived() {
        let client = MockClient::with_demo_data();
        let summaries = client.list_workflows(None).await.unwrap();

        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Nightly sync", "Weekly report"]);
        assert_eq!(summaries[0].tags, vec!["prod"]);
        assert_eq!(summaries[0].node_count, 1);
    }

    #[tokio::test]
    async fn test_workflow_lifecycle() {
        let client = MockClient::new();
        let input: WorkflowInput = serde_json::from_value(serde_json::json!({
            "name": "Lifecycle",
            "nodes": [{"name": "Start", "type": "n8n-nodes-base.manualTrigger"}]
        }))
        .unwrap();

        let created = client.create_workflow(&input, Some(MOCK_INSTANCE)).await.unwrap();
        assert!(!created.active);

        let active = client.activate_workflow(&created.id, None).await.unwrap();
        assert!(active.active);

        assert!(client.archive_workflow(&created.id));
        assert!(client.list_workflows(None).await.unwrap().is_empty());

        client.delete_workflow(&created.id, None).await.unwrap();
        let err = client.get_workflow(&created.id, None).await.unwrap_err();
        assert!(err.message().contains("404"));
    }

    #[tokio::test]
    async fn test_unknown_instance_is_rejected() {
        let client = MockClient::with_demo_data();
        let err = client.get_tags(&TagListOptions::default(), Some("prod")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "API call failed: Instance 'prod' not found. Available instances: mock"
        );
    }

    #[tokio::test]
    async fn test_execution_filters_and_paging() {
        let client = MockClient::with_demo_data();

        let errors = client
            .list_executions(
                &ExecutionListOptions {
                    status: Some(ExecutionStatus::Error),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(errors.data.len(), 1);
        assert_eq!(errors.data[0].id, 2);

        let first_page = client
            .list_executions(
                &ExecutionListOptions {
                    limit: Some(1),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(first_page.data.len(), 1);
        assert_eq!(first_page.next_cursor.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_tag_rename_and_validation() {
        let client = MockClient::with_demo_data();
        let renamed = client
            .update_tag("tag-1", &TagInput::new("production"), None)
            .await
            .unwrap();
        assert_eq!(renamed.name, "production");

        assert!(client.create_tag(&TagInput::new(""), None).await.is_err());
    }
}

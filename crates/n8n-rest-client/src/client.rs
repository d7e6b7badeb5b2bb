//! Per-instance REST API client

use n8n_api_contract::*;
use reqwest::{Client as HttpClient, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth::AuthConfig;
use crate::error::{RestClientError, RestClientResult};

const USER_AGENT: &str = concat!("n8n-rest-client/", env!("CARGO_PKG_VERSION"));

/// REST API client bound to a single n8n instance
#[derive(Debug, Clone)]
pub struct RestClient {
    http_client: HttpClient,
    base_url: Url,
    auth: AuthConfig,
}

impl RestClient {
    /// Create a new REST client.
    ///
    /// `base_url` is the API root including `/api/v1`.
    pub fn new(base_url: Url, auth: AuthConfig) -> RestClientResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(RestClientError::InvalidBaseUrl(base_url.to_string()));
        }

        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .default_headers(auth.headers()?)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            auth,
        })
    }

    /// Create a client from a base URL string
    pub fn from_url(base_url: &str, auth: AuthConfig) -> RestClientResult<Self> {
        let base_url = Url::parse(base_url)?;
        Self::new(base_url, auth)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the authentication config
    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    /// Create a workflow
    pub async fn create_workflow(&self, workflow: &WorkflowSpec) -> RestClientResult<Workflow> {
        self.send(Method::POST, self.endpoint(&["workflows"])?, Some(workflow))
            .await
    }

    /// Get a workflow by id
    pub async fn get_workflow(&self, id: &str) -> RestClientResult<Workflow> {
        self.get(self.endpoint(&["workflows", id])?).await
    }

    /// Replace a workflow definition
    pub async fn update_workflow(
        &self,
        id: &str,
        workflow: &WorkflowSpec,
    ) -> RestClientResult<Workflow> {
        self.send(Method::PUT, self.endpoint(&["workflows", id])?, Some(workflow))
            .await
    }

    /// Delete a workflow, returning the deleted record
    pub async fn delete_workflow(&self, id: &str) -> RestClientResult<Workflow> {
        self.delete(self.endpoint(&["workflows", id])?).await
    }

    /// Toggle the active flag of a workflow
    pub async fn set_workflow_active(&self, id: &str, active: bool) -> RestClientResult<Workflow> {
        let body = ActivationRequest { active };
        self.send(Method::PATCH, self.endpoint(&["workflows", id])?, Some(&body))
            .await
    }

    /// List workflows as raw JSON.
    ///
    /// Listing entries vary between n8n releases, so shaping them is left to
    /// the caller.
    pub async fn list_workflows(&self) -> RestClientResult<Value> {
        self.get(self.endpoint(&["workflows"])?).await
    }

    /// List executions with optional filtering
    pub async fn list_executions(
        &self,
        options: &ExecutionListOptions,
    ) -> RestClientResult<ExecutionListResponse> {
        let url = self.endpoint_with_query(&["executions"], options)?;
        self.get(url).await
    }

    /// Get an execution, optionally with its run data
    pub async fn get_execution(&self, id: u64, include_data: bool) -> RestClientResult<Execution> {
        let id = id.to_string();
        let mut url = self.endpoint(&["executions", &id])?;
        if include_data {
            url.query_pairs_mut().append_pair("includeData", "true");
        }
        self.get(url).await
    }

    /// Delete an execution
    pub async fn delete_execution(&self, id: u64) -> RestClientResult<Execution> {
        let id = id.to_string();
        self.delete(self.endpoint(&["executions", &id])?).await
    }

    /// Create a tag
    pub async fn create_tag(&self, tag: &TagInput) -> RestClientResult<Tag> {
        self.send(Method::POST, self.endpoint(&["tags"])?, Some(tag))
            .await
    }

    /// List tags
    pub async fn list_tags(&self, options: &TagListOptions) -> RestClientResult<TagListResponse> {
        let url = self.endpoint_with_query(&["tags"], options)?;
        self.get(url).await
    }

    /// Get a tag by id
    pub async fn get_tag(&self, id: &str) -> RestClientResult<Tag> {
        self.get(self.endpoint(&["tags", id])?).await
    }

    /// Rename a tag
    pub async fn update_tag(&self, id: &str, tag: &TagInput) -> RestClientResult<Tag> {
        self.send(Method::PUT, self.endpoint(&["tags", id])?, Some(tag))
            .await
    }

    /// Delete a tag
    pub async fn delete_tag(&self, id: &str) -> RestClientResult<Tag> {
        self.delete(self.endpoint(&["tags", id])?).await
    }

    // Private helper methods

    fn endpoint(&self, segments: &[&str]) -> RestClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RestClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn endpoint_with_query<Q: Serialize>(
        &self,
        segments: &[&str],
        query: &Q,
    ) -> RestClientResult<Url> {
        let mut url = self.endpoint(segments)?;
        let pairs = build_query_params(query)?;
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> RestClientResult<T> {
        self.send(Method::GET, url, None::<&()>).await
    }

    async fn delete<T: DeserializeOwned>(&self, url: Url) -> RestClientResult<T> {
        self.send(Method::DELETE, url, None::<&()>).await
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> RestClientResult<T> {
        debug!("{} {}", method, url);

        let mut request = self.http_client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> RestClientResult<T> {
        let status = response.status();
        let text = response.text().await?;
        debug!("Response status: {}, body: {}", status, text);

        if status.is_success() {
            serde_json::from_str(&text).map_err(RestClientError::from)
        } else {
            match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(body) if !body.message.is_empty() => {
                    Err(RestClientError::ServerError { status, body })
                }
                _ => Err(RestClientError::UnexpectedResponse { status, body: text }),
            }
        }
    }
}

/// Flatten a serializable options struct into query pairs, skipping nulls
fn build_query_params<T: Serialize>(params: &T) -> RestClientResult<Vec<(String, String)>> {
    let mut pairs = Vec::new();

    if let Value::Object(map) = serde_json::to_value(params)? {
        for (key, val) in map {
            let val_str = match val {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => other.to_string(),
            };
            pairs.push((key, val_str));
        }
    }

    Ok(pairs)
}

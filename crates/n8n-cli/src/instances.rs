//! Instance listing

use anyhow::Result;
use n8n_client_api::WorkflowClientApi;
use serde::Serialize;

use crate::output::print_json;

#[derive(Serialize)]
struct InstancesJson {
    default: String,
    instances: Vec<String>,
}

/// Print the configured instances
pub fn run(api: &dyn WorkflowClientApi) -> Result<()> {
    print_json(&InstancesJson {
        default: api.default_instance(),
        instances: api.available_instances(),
    })
}

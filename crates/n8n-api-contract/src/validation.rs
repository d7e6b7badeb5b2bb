//! Validation and shaping of workflow payloads

use std::collections::HashSet;

use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiContractError;
use crate::types::*;

const MAIN_OUTPUT: &str = "main";
const GRID_ORIGIN: [f64; 2] = [250.0, 300.0];
const GRID_STEP: f64 = 220.0;
/// Highest output slot or input index accepted on a connection
pub const MAX_CONNECTION_INDEX: u32 = 64;

/// Validate a caller supplied workflow and shape it into the upstream payload.
///
/// Missing node ids, type versions and positions are filled in, list-form
/// connections are converted to the upstream map keyed by node name and
/// settings default to `{"executionOrder": "v1"}`.
pub fn validate_workflow_spec(input: &WorkflowInput) -> Result<WorkflowSpec, ApiContractError> {
    input.validate()?;
    if input.name.trim().is_empty() {
        return Err(ApiContractError::BlankWorkflowName);
    }

    let mut seen = HashSet::new();
    for (index, node) in input.nodes.iter().enumerate() {
        if node.name.trim().is_empty() || node.node_type.trim().is_empty() {
            return Err(ApiContractError::BlankNodeField(index));
        }
        if !seen.insert(node.name.as_str()) {
            return Err(ApiContractError::DuplicateNodeName(node.name.clone()));
        }
    }

    let nodes: Vec<WorkflowNode> = input
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| shape_node(index, node))
        .collect();

    let connections = match &input.connections {
        ConnectionsInput::List(edges) => transform_connections(edges, &nodes)?,
        ConnectionsInput::Map(map) => {
            check_connection_map(map, &nodes)?;
            map.clone()
        }
    };

    Ok(WorkflowSpec {
        name: input.name.trim().to_string(),
        nodes,
        connections,
        settings: input.settings.clone().unwrap_or_else(default_settings),
        static_data: input.static_data.clone(),
    })
}

/// Convert list-form edges into the upstream connection map.
///
/// Edge endpoints may reference a node by name or by id; the map is always
/// keyed by node name.
pub fn transform_connections(
    edges: &[ConnectionSpec],
    nodes: &[WorkflowNode],
) -> Result<ConnectionMap, ApiContractError> {
    let mut map = ConnectionMap::new();

    for edge in edges {
        let source = resolve_node(&edge.source, nodes)?;
        let target = resolve_node(&edge.target, nodes)?;
        check_index(source, edge.source_output)?;
        check_index(target, edge.target_input)?;

        let outputs = map
            .entry(source.to_string())
            .or_default()
            .entry(MAIN_OUTPUT.to_string())
            .or_default();
        let slot = edge.source_output as usize;
        if outputs.len() <= slot {
            outputs.resize_with(slot + 1, Vec::new);
        }
        outputs[slot].push(ConnectionTarget {
            node: target.to_string(),
            connection_type: MAIN_OUTPUT.to_string(),
            index: edge.target_input,
        });
    }

    Ok(map)
}

/// Validate a tag creation or rename request
pub fn validate_tag_input(tag: &TagInput) -> Result<(), ApiContractError> {
    tag.validate()?;
    if tag.name.trim().is_empty() {
        return Err(ApiContractError::BlankTagName);
    }
    Ok(())
}

fn shape_node(index: usize, node: &NodeInput) -> WorkflowNode {
    let position = node
        .position
        .unwrap_or([GRID_ORIGIN[0] + GRID_STEP * index as f64, GRID_ORIGIN[1]]);

    WorkflowNode {
        id: Some(
            node.id
                .clone()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
        ),
        name: node.name.clone(),
        node_type: node.node_type.clone(),
        type_version: node.type_version.unwrap_or(1.0),
        position,
        parameters: node.parameters.clone(),
        credentials: node.credentials.clone(),
        disabled: node.disabled,
        extra: node.extra.clone(),
    }
}

fn check_index(node: &str, index: u32) -> Result<(), ApiContractError> {
    if index > MAX_CONNECTION_INDEX {
        return Err(ApiContractError::ConnectionIndexOutOfRange {
            node: node.to_string(),
            index,
            max: MAX_CONNECTION_INDEX,
        });
    }
    Ok(())
}

fn resolve_node<'a>(
    reference: &str,
    nodes: &'a [WorkflowNode],
) -> Result<&'a str, ApiContractError> {
    nodes
        .iter()
        .find(|node| node.name == reference)
        .or_else(|| {
            nodes
                .iter()
                .find(|node| node.id.as_deref() == Some(reference))
        })
        .map(|node| node.name.as_str())
        .ok_or_else(|| ApiContractError::UnknownNode(reference.to_string()))
}

fn check_connection_map(
    map: &ConnectionMap,
    nodes: &[WorkflowNode],
) -> Result<(), ApiContractError> {
    let known: HashSet<&str> = nodes.iter().map(|node| node.name.as_str()).collect();

    for (source, outputs) in map {
        if !known.contains(source.as_str()) {
            return Err(ApiContractError::UnknownNode(source.clone()));
        }
        for slots in outputs.values() {
            let last_slot = u32::try_from(slots.len().saturating_sub(1)).unwrap_or(u32::MAX);
            check_index(source, last_slot)?;
        }
        for target in outputs.values().flatten().flatten() {
            if !known.contains(target.node.as_str()) {
                return Err(ApiContractError::UnknownNode(target.node.clone()));
            }
            check_index(&target.node, target.index)?;
        }
    }

    Ok(())
}

fn default_settings() -> Map<String, Value> {
    let mut settings = Map::new();
    settings.insert("executionOrder".to_string(), Value::from("v1"));
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(name: &str, node_type: &str) -> NodeInput {
        NodeInput {
            id: None,
            name: name.to_string(),
            node_type: node_type.to_string(),
            type_version: None,
            position: None,
            parameters: Map::new(),
            credentials: None,
            disabled: None,
            extra: Map::new(),
        }
    }

    fn two_node_workflow(connections: ConnectionsInput) -> WorkflowInput {
        WorkflowInput {
            name: "Fetch and notify".to_string(),
            nodes: vec![
                node("Start", "n8n-nodes-base.manualTrigger"),
                node("Fetch", "n8n-nodes-base.httpRequest"),
            ],
            connections,
            settings: None,
            static_data: None,
        }
    }

    #[test]
    fn test_validate_fills_defaults() {
        let spec =
            validate_workflow_spec(&two_node_workflow(ConnectionsInput::default())).unwrap();

        assert_eq!(spec.nodes.len(), 2);
        assert!(spec.nodes.iter().all(|n| n.id.is_some()));
        assert_eq!(spec.nodes[0].type_version, 1.0);
        assert_eq!(spec.nodes[0].position, [250.0, 300.0]);
        assert_eq!(spec.nodes[1].position, [470.0, 300.0]);
        assert_eq!(spec.settings.get("executionOrder"), Some(&json!("v1")));
        assert!(spec.connections.is_empty());
    }

    #[test]
    fn test_validate_converts_edge_list() {
        let mut input = two_node_workflow(ConnectionsInput::List(vec![ConnectionSpec {
            source: "Start".to_string(),
            target: "fetch-id".to_string(),
            source_output: 1,
            target_input: 0,
        }]));
        input.nodes[1].id = Some("fetch-id".to_string());

        let spec = validate_workflow_spec(&input).unwrap();
        let outputs = &spec.connections["Start"]["main"];

        assert_eq!(outputs.len(), 2);
        assert!(outputs[0].is_empty());
        assert_eq!(outputs[1][0].node, "Fetch");
        assert_eq!(outputs[1][0].connection_type, "main");
    }

    #[test]
    fn test_validate_rejects_unknown_edge_target() {
        let input = two_node_workflow(ConnectionsInput::List(vec![ConnectionSpec {
            source: "Start".to_string(),
            target: "Missing".to_string(),
            source_output: 0,
            target_input: 0,
        }]));

        assert!(matches!(
            validate_workflow_spec(&input),
            Err(ApiContractError::UnknownNode(name)) if name == "Missing"
        ));
    }

    #[test]
    fn test_validate_checks_map_form() {
        let map: ConnectionMap = serde_json::from_value(json!({
            "Start": {"main": [[{"node": "Nowhere", "type": "main", "index": 0}]]}
        }))
        .unwrap();

        let result = validate_workflow_spec(&two_node_workflow(ConnectionsInput::Map(map)));
        assert!(matches!(result, Err(ApiContractError::UnknownNode(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_node_names() {
        let mut input = two_node_workflow(ConnectionsInput::default());
        input.nodes[1].name = "Start".to_string();

        assert!(matches!(
            validate_workflow_spec(&input),
            Err(ApiContractError::DuplicateNodeName(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_names() {
        let mut input = two_node_workflow(ConnectionsInput::default());
        input.name = "   ".to_string();
        assert!(matches!(
            validate_workflow_spec(&input),
            Err(ApiContractError::BlankWorkflowName)
        ));

        let mut input = two_node_workflow(ConnectionsInput::default());
        input.nodes[0].node_type = String::new();
        assert!(matches!(
            validate_workflow_spec(&input),
            Err(ApiContractError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_whitespace_node_fields() {
        let mut input = two_node_workflow(ConnectionsInput::default());
        input.nodes[1].name = "   ".to_string();
        assert!(matches!(
            validate_workflow_spec(&input),
            Err(ApiContractError::BlankNodeField(1))
        ));

        let mut input = two_node_workflow(ConnectionsInput::default());
        input.nodes[0].node_type = "\t ".to_string();
        assert!(matches!(
            validate_workflow_spec(&input),
            Err(ApiContractError::BlankNodeField(0))
        ));
    }

    #[test]
    fn test_validate_caps_connection_indices() {
        let edge = |source_output, target_input| ConnectionSpec {
            source: "Start".to_string(),
            target: "Fetch".to_string(),
            source_output,
            target_input,
        };

        let input = two_node_workflow(ConnectionsInput::List(vec![edge(20_000_000, 0)]));
        assert!(matches!(
            validate_workflow_spec(&input),
            Err(ApiContractError::ConnectionIndexOutOfRange { index: 20_000_000, .. })
        ));

        let input = two_node_workflow(ConnectionsInput::List(vec![edge(0, u32::MAX)]));
        assert!(matches!(
            validate_workflow_spec(&input),
            Err(ApiContractError::ConnectionIndexOutOfRange { node, .. }) if node == "Fetch"
        ));

        let input = two_node_workflow(ConnectionsInput::List(vec![edge(MAX_CONNECTION_INDEX, 0)]));
        let spec = validate_workflow_spec(&input).unwrap();
        assert_eq!(
            spec.connections["Start"]["main"].len(),
            MAX_CONNECTION_INDEX as usize + 1
        );

        let map: ConnectionMap = serde_json::from_value(json!({
            "Start": {"main": [[{"node": "Fetch", "type": "main", "index": 1000}]]}
        }))
        .unwrap();
        assert!(matches!(
            validate_workflow_spec(&two_node_workflow(ConnectionsInput::Map(map))),
            Err(ApiContractError::ConnectionIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_keeps_caller_settings() {
        let mut input = two_node_workflow(ConnectionsInput::default());
        let mut settings = Map::new();
        settings.insert("timezone".to_string(), json!("Europe/Berlin"));
        input.settings = Some(settings);

        let spec = validate_workflow_spec(&input).unwrap();
        assert_eq!(spec.settings.get("timezone"), Some(&json!("Europe/Berlin")));
        assert!(spec.settings.get("executionOrder").is_none());
    }

    #[test]
    fn test_validate_tag_input() {
        assert!(validate_tag_input(&TagInput::new("prod")).is_ok());
        assert!(validate_tag_input(&TagInput::new("")).is_err());
        assert!(matches!(
            validate_tag_input(&TagInput::new("  ")),
            Err(ApiContractError::BlankTagName)
        ));
    }
}

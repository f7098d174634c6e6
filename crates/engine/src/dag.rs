//! DAG validation (C2) and topological ordering, run before persisting or
//! executing a workflow.
//!
//! [`validate_graph`] accumulates *every* structural problem instead of
//! failing on the first one, per spec: node-id uniqueness is folded into
//! edge-endpoint resolution (an edge to a nonexistent id is itself one of
//! the checks), cycle detection, source/sink frontier checks, and catalog
//! resolution for action nodes all run and report together.
//!
//! [`topological_order`] is the separate, permissive Kahn's-algorithm pass
//! the executor (C5) uses to derive a run order — it does not reject
//! anything; a disconnected or cyclic remainder (which `validate_graph`
//! should already have caught) is simply appended in insertion order.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::warn;

use crate::models::{Node, NodeData, WorkflowConfig};
use catalog::CatalogLookup;

/// Validate a workflow graph's structure.
///
/// Returns `(is_valid, errors)`. `errors` is non-empty iff `!is_valid`.
/// Never short-circuits: every applicable check runs and contributes its
/// own message.
pub fn validate_graph(config: &WorkflowConfig, catalog: &dyn CatalogLookup) -> (bool, Vec<String>) {
    let mut errors = Vec::new();

    if config.nodes.is_empty() {
        errors.push("Workflow must have at least one node".to_string());
        return (false, errors);
    }

    let node_ids: HashSet<&str> = config.nodes.iter().map(|n| n.id.as_str()).collect();

    for edge in &config.edges {
        if !node_ids.contains(edge.source.as_str()) {
            errors.push(format!(
                "Edge source '{}' references non-existent node",
                edge.source
            ));
        }
        if !node_ids.contains(edge.target.as_str()) {
            errors.push(format!(
                "Edge target '{}' references non-existent node",
                edge.target
            ));
        }
        if edge.source == edge.target {
            errors.push(format!(
                "Edge '{}' cannot connect node '{}' to itself",
                edge.id, edge.source
            ));
        }
    }

    if has_cycle(config) {
        errors.push("Workflow contains cycles".to_string());
    }

    let (in_degree, out_degree) = degree_maps(config);

    let start_nodes: Vec<&str> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&id, _)| id)
        .collect();
    if start_nodes.is_empty() {
        errors.push(
            "Workflow must have at least one start node (node with no incoming edges)".to_string(),
        );
    }

    let end_nodes: Vec<&str> = out_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&id, _)| id)
        .collect();
    if end_nodes.is_empty() {
        errors.push(
            "Workflow must have at least one end node (node with no outgoing edges)".to_string(),
        );
    }

    for node in &config.nodes {
        if let NodeData::Action { action_name, .. } = &node.data {
            if !catalog.is_active_action(action_name) {
                errors.push(format!(
                    "Node '{}' references unknown or inactive action '{}'",
                    node.id, action_name
                ));
            }
        }
    }

    (errors.is_empty(), errors)
}

/// Iterative DFS with an explicit recursion stack (grey/black colouring),
/// so a pathologically large graph can't blow the native call stack.
fn has_cycle(config: &WorkflowConfig) -> bool {
    let adjacency = adjacency_map(config);

    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Grey,
        Black,
    }

    let mut color: HashMap<&str, Color> = config
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), Color::White))
        .collect();

    for node in &config.nodes {
        if color[node.id.as_str()] != Color::White {
            continue;
        }

        // (node_id, next neighbour index to visit)
        let mut stack: Vec<(&str, usize)> = vec![(node.id.as_str(), 0)];
        color.insert(node.id.as_str(), Color::Grey);

        while let Some(&mut (current, ref mut idx)) = stack.last_mut() {
            let neighbours = adjacency.get(current).map(Vec::as_slice).unwrap_or(&[]);
            if *idx < neighbours.len() {
                let next = neighbours[*idx];
                *idx += 1;
                match color.get(next).copied().unwrap_or(Color::White) {
                    Color::White => {
                        color.insert(next, Color::Grey);
                        stack.push((next, 0));
                    }
                    Color::Grey => return true,
                    Color::Black => {}
                }
            } else {
                color.insert(current, Color::Black);
                stack.pop();
            }
        }
    }

    false
}

fn adjacency_map(config: &WorkflowConfig) -> HashMap<&str, Vec<&str>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in &config.nodes {
        adjacency.entry(node.id.as_str()).or_default();
    }
    for edge in &config.edges {
        if adjacency.contains_key(edge.source.as_str()) {
            adjacency
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }
    }
    adjacency
}

fn degree_maps(config: &WorkflowConfig) -> (HashMap<&str, usize>, HashMap<&str, usize>) {
    let mut in_degree: HashMap<&str, usize> = config
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), 0))
        .collect();
    let mut out_degree = in_degree.clone();

    for edge in &config.edges {
        if out_degree.contains_key(edge.source.as_str()) {
            *out_degree.get_mut(edge.source.as_str()).unwrap() += 1;
        }
        if in_degree.contains_key(edge.target.as_str()) {
            *in_degree.get_mut(edge.target.as_str()).unwrap() += 1;
        }
    }

    (in_degree, out_degree)
}

/// Derive a run order for the executor via Kahn's algorithm. Ties among
/// ready nodes are broken by insertion order of `config.nodes`.
///
/// Does not fail on a cycle or disconnected remainder — `validate_graph`
/// is responsible for rejecting those before this ever runs. Any node
/// Kahn's algorithm can't place is appended in insertion order, with a
/// warning, matching the reference behaviour.
pub fn topological_order(config: &WorkflowConfig) -> Vec<String> {
    let adjacency = adjacency_map(config);
    let (mut in_degree, _) = degree_maps(config);

    // Preserve insertion order among zero-in-degree nodes using a
    // VecDeque seeded in `config.nodes` order rather than in_degree's
    // hash order.
    let mut queue: VecDeque<&str> = config
        .nodes
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| in_degree.get(id).copied().unwrap_or(0) == 0)
        .collect();

    let mut sorted: Vec<String> = Vec::with_capacity(config.nodes.len());
    let mut placed: HashSet<&str> = HashSet::new();

    while let Some(node_id) = queue.pop_front() {
        if !placed.insert(node_id) {
            continue;
        }
        sorted.push(node_id.to_owned());

        if let Some(neighbours) = adjacency.get(node_id) {
            for &neighbour in neighbours {
                if let Some(deg) = in_degree.get_mut(neighbour) {
                    *deg = deg.saturating_sub(1);
                    if *deg == 0 {
                        queue.push_back(neighbour);
                    }
                }
            }
        }
    }

    if sorted.len() != config.nodes.len() {
        warn!(
            "topological order omitted {} of {} nodes (cycle or disconnection); appending remainder",
            config.nodes.len() - sorted.len(),
            config.nodes.len()
        );
        for node in &config.nodes {
            if !placed.contains(node.id.as_str()) {
                sorted.push(node.id.clone());
            }
        }
    }

    sorted
}

/// Look up a node by id, used by the executor once ordering is known.
pub fn index_nodes(config: &WorkflowConfig) -> HashMap<&str, &Node> {
    config.nodes.iter().map(|n| (n.id.as_str(), n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Edge, EdgeKind, NodeData, Position};
    use catalog::ActionCatalog;

    fn action_node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            data: NodeData::Action {
                action_name: "ping".into(),
                label: None,
                config: serde_json::Value::Null,
            },
            position: Position::default(),
        }
    }

    fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            edge_type: EdgeKind::Default,
            label: None,
        }
    }

    fn catalog_with_ping() -> ActionCatalog {
        use chrono::Utc;
        ActionCatalog::new(vec![catalog::Action {
            id: uuid::Uuid::new_v4(),
            action_name: "ping".into(),
            display_name: None,
            class_name: "Ping".into(),
            method_name: "call".into(),
            domain: "test".into(),
            endpoint: "https://example.com/ping".into(),
            http_method: "POST".into(),
            description: None,
            parameters: serde_json::json!({}),
            returns: serde_json::json!({}),
            category: None,
            tags: vec![],
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }])
    }

    #[test]
    fn valid_linear_dag_returns_sorted_order() {
        let config = WorkflowConfig {
            nodes: vec![action_node("a"), action_node("b"), action_node("c")],
            edges: vec![edge("e1", "a", "b"), edge("e2", "b", "c")],
        };
        let catalog = catalog_with_ping();
        let (valid, errors) = validate_graph(&config, &catalog);
        assert!(valid, "{errors:?}");
        assert_eq!(topological_order(&config), vec!["a", "b", "c"]);
    }

    #[test]
    fn diamond_dag_is_valid_and_orders_correctly() {
        let config = WorkflowConfig {
            nodes: vec![
                action_node("a"),
                action_node("b"),
                action_node("c"),
                action_node("d"),
            ],
            edges: vec![
                edge("e1", "a", "b"),
                edge("e2", "a", "c"),
                edge("e3", "b", "d"),
                edge("e4", "c", "d"),
            ],
        };
        let catalog = catalog_with_ping();
        let (valid, _) = validate_graph(&config, &catalog);
        assert!(valid);
        let order = topological_order(&config);
        assert_eq!(order.first().unwrap(), "a");
        assert_eq!(order.last().unwrap(), "d");
    }

    #[test]
    fn empty_node_list_is_rejected() {
        let config = WorkflowConfig::default();
        let catalog = catalog_with_ping();
        let (valid, errors) = validate_graph(&config, &catalog);
        assert!(!valid);
        assert!(errors.iter().any(|e| e.contains("at least one node")));
    }

    #[test]
    fn dangling_edge_reference_is_reported() {
        let config = WorkflowConfig {
            nodes: vec![action_node("a")],
            edges: vec![edge("e1", "a", "ghost")],
        };
        let catalog = catalog_with_ping();
        let (valid, errors) = validate_graph(&config, &catalog);
        assert!(!valid);
        assert!(errors.iter().any(|e| e.contains("ghost")));
    }

    #[test]
    fn cycle_is_reported_with_documented_message() {
        let config = WorkflowConfig {
            nodes: vec![action_node("a"), action_node("b"), action_node("c")],
            edges: vec![
                edge("e1", "a", "b"),
                edge("e2", "b", "c"),
                edge("e3", "c", "a"),
            ],
        };
        let catalog = catalog_with_ping();
        let (valid, errors) = validate_graph(&config, &catalog);
        assert!(!valid);
        assert!(errors.iter().any(|e| e == "Workflow contains cycles"));
    }

    #[test]
    fn missing_sink_is_reported_for_all_cycle_nodes() {
        // Every node in a pure cycle has nonzero in- and out-degree, so
        // both frontier checks should fire alongside the cycle error.
        let config = WorkflowConfig {
            nodes: vec![action_node("a"), action_node("b")],
            edges: vec![edge("e1", "a", "b"), edge("e2", "b", "a")],
        };
        let catalog = catalog_with_ping();
        let (valid, errors) = validate_graph(&config, &catalog);
        assert!(!valid);
        assert!(errors.iter().any(|e| e.contains("start node")));
        assert!(errors.iter().any(|e| e.contains("end node")));
    }

    #[test]
    fn inactive_action_is_rejected_with_node_name() {
        let config = WorkflowConfig {
            nodes: vec![action_node("a")],
            edges: vec![],
        };
        let catalog = ActionCatalog::new(vec![]); // empty: "ping" unknown
        let (valid, errors) = validate_graph(&config, &catalog);
        assert!(!valid);
        assert!(errors.iter().any(|e| e.contains("'a'") && e.contains("ping")));
    }

    #[test]
    fn disconnected_remainder_is_appended_by_topological_order() {
        let config = WorkflowConfig {
            nodes: vec![action_node("a"), action_node("b"), action_node("isolated")],
            edges: vec![edge("e1", "a", "b")],
        };
        let order = topological_order(&config);
        assert_eq!(order.len(), 3);
        assert!(order.contains(&"isolated".to_string()));
        // 'a' must still precede 'b'.
        let pos_a = order.iter().position(|n| n == "a").unwrap();
        let pos_b = order.iter().position(|n| n == "b").unwrap();
        assert!(pos_a < pos_b);
    }
}

//! Structural checks applied to a canvas graph before it is stored.

use std::collections::HashSet;

use db::models::canvas::{CanvasEdge, CanvasNode};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphValidationError {
    #[error("node id must not be empty")]
    EmptyNodeId,
    #[error("duplicate node id {0:?}")]
    DuplicateNodeId(String),
    #[error("edge {edge_id:?} references unknown node {node_id:?}")]
    DanglingEdge { edge_id: String, node_id: String },
}

/// Node ids must be unique and non-empty, and every edge endpoint must name a node.
pub fn validate_graph(nodes: &[CanvasNode], edges: &[CanvasEdge]) -> Result<(), GraphValidationError> {
    let mut ids = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if node.id.trim().is_empty() {
            return Err(GraphValidationError::EmptyNodeId);
        }
        if !ids.insert(node.id.as_str()) {
            return Err(GraphValidationError::DuplicateNodeId(node.id.clone()));
        }
    }

    for edge in edges {
        for endpoint in [&edge.source, &edge.target] {
            if !ids.contains(endpoint.as_str()) {
                return Err(GraphValidationError::DanglingEdge {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use db::models::canvas::NodeKind;

    use super::*;

    #[test]
    fn test_valid_graph() {
        let nodes = vec![
            CanvasNode::new("a", NodeKind::Party, "Alice"),
            CanvasNode::new("b", NodeKind::Action, "Deposit"),
        ];
        let edges = vec![CanvasEdge::new("a", "b")];
        assert_eq!(validate_graph(&nodes, &edges), Ok(()));
        assert_eq!(validate_graph(&[], &[]), Ok(()));
    }

    #[test]
    fn test_dangling_edge() {
        let nodes = vec![CanvasNode::new("a", NodeKind::Party, "Alice")];
        let edges = vec![CanvasEdge::new("a", "ghost")];
        assert_eq!(
            validate_graph(&nodes, &edges),
            Err(GraphValidationError::DanglingEdge {
                edge_id: "ea-ghost".into(),
                node_id: "ghost".into(),
            })
        );
    }

    #[test]
    fn test_duplicate_and_empty_ids() {
        let dup = vec![
            CanvasNode::new("a", NodeKind::Party, "Alice"),
            CanvasNode::new("a", NodeKind::Payee, "Bob"),
        ];
        assert_eq!(
            validate_graph(&dup, &[]),
            Err(GraphValidationError::DuplicateNodeId("a".into()))
        );

        let empty = vec![CanvasNode::new(" ", NodeKind::Role, "Admin")];
        assert_eq!(validate_graph(&empty, &[]), Err(GraphValidationError::EmptyNodeId));
    }
}

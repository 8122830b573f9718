//! Read-only query projections

use serde::{Deserialize, Serialize};

/// An edge as reported by a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDetail {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub relationship_type: String,
    /// Leading evidence sentences
    pub evidence: Vec<String>,
}

/// Breadth-first expansion around one entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborLayers {
    pub entity: String,
    /// Layer i holds the edges discovered at hop i + 1
    pub layers: Vec<Vec<EdgeDetail>>,
}

impl NeighborLayers {
    /// Entities reached across all layers, discovery order
    pub fn reached(&self) -> Vec<&str> {
        self.layers
            .iter()
            .flatten()
            .map(|edge| edge.target.as_str())
            .collect()
    }
}

/// One path through the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathDetail {
    pub nodes: Vec<String>,
    pub edges: Vec<EdgeDetail>,
    pub total_weight: f64,
}

/// Shortest path between two entities, empty when none exists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    pub source: String,
    pub target: String,
    pub paths: Vec<PathDetail>,
}

impl PathResult {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonConnection {
    pub entity: String,
    pub degree: usize,
}

/// Entities adjacent to every queried entity, highest degree first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonConnectionsResult {
    pub common: Vec<CommonConnection>,
}

/// Induced subgraph around a set of centers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphResult {
    pub nodes: Vec<String>,
    pub edges: Vec<[String; 2]>,
}

//! JSON projection of a graph
//!
//! This is the shape clients hold on to between requests. It converts back
//! into records so a graph can be rebuilt from it.

use serde::{Deserialize, Serialize};

use super::entity::EntityType;
use super::record::{EntityRecord, RecordBatch, RelationshipRecord, deserialize_entity_type};
use super::relationship::DEFAULT_RELATIONSHIP_TYPE;
use super::store::GraphStore;

/// Projected graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub metadata: GraphMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "deserialize_entity_type"
    )]
    pub entity_type: EntityType,
    #[serde(default)]
    pub degree: usize,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub degree: usize,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// First evidence sentence or a generic description
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub metadata: EdgeMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeMetadata {
    #[serde(default)]
    pub all_evidence: Vec<String>,
    #[serde(default = "default_relationship_type")]
    pub relationship_type: String,
}

impl Default for NodeMetadata {
    fn default() -> Self {
        Self {
            count: default_count(),
            degree: 0,
            display_name: String::new(),
        }
    }
}

impl Default for EdgeMetadata {
    fn default() -> Self {
        Self {
            all_evidence: Vec::new(),
            relationship_type: default_relationship_type(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphMetadata {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub density: f64,
    /// True when the graph went through a filter pass
    pub filtered: bool,
}

fn default_count() -> u32 {
    1
}

fn default_weight() -> f64 {
    1.0
}

fn default_relationship_type() -> String {
    DEFAULT_RELATIONSHIP_TYPE.to_string()
}

impl GraphData {
    /// Project a graph
    pub fn from_graph(graph: &GraphStore) -> Self {
        let nodes = graph
            .entities()
            .map(|entity| {
                let degree = graph.degree(&entity.id);
                GraphNode {
                    id: entity.id.clone(),
                    entity_type: entity.entity_type,
                    degree,
                    metadata: NodeMetadata {
                        count: entity.occurrence_count,
                        degree,
                        display_name: entity.display_name.clone(),
                    },
                }
            })
            .collect();

        let edges = graph
            .relationships()
            .map(|(source, target, rel)| GraphEdge {
                source: source.to_string(),
                target: target.to_string(),
                weight: rel.weight,
                title: rel
                    .headline()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} co-occurs with {}", source, target)),
                metadata: EdgeMetadata {
                    all_evidence: rel.evidence.clone(),
                    relationship_type: rel.relationship_type.clone(),
                },
            })
            .collect();

        let summary = graph.summary();
        Self {
            nodes,
            edges,
            metadata: GraphMetadata {
                total_nodes: summary.total_nodes,
                total_edges: summary.total_edges,
                density: summary.density,
                filtered: false,
            },
        }
    }

    /// Mark the projection as the output of a filter
    pub fn filtered(mut self) -> Self {
        self.metadata.filtered = true;
        self
    }

    /// Convert back into records
    pub fn into_records(self) -> RecordBatch {
        let entities = self
            .nodes
            .into_iter()
            .map(|node| {
                EntityRecord::keyed(
                    node.id,
                    node.metadata.display_name,
                    node.entity_type,
                    node.metadata.count,
                )
            })
            .collect();

        let relationships = self
            .edges
            .into_iter()
            .map(|edge| RelationshipRecord {
                source: edge.source,
                target: edge.target,
                weight: edge.weight,
                evidence: edge.metadata.all_evidence,
                relationship_type: edge.metadata.relationship_type,
            })
            .collect();

        RecordBatch::new(entities, relationships)
    }
}

impl From<&GraphStore> for GraphData {
    fn from(graph: &GraphStore) -> Self {
        Self::from_graph(graph)
    }
}

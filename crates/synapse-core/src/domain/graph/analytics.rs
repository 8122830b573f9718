//! Graph analytics
//!
//! Structural statistics computed on demand over a built graph: size,
//! density, average degree, Louvain communities, top betweenness scores and
//! an entity type histogram.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use super::centrality::ranked_betweenness;
use super::community::{LouvainOptions, louvain, singletons};
use super::entity::EntityType;
use super::store::GraphStore;

/// Analytics computed over one graph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub density: f64,
    pub avg_degree: f64,
    /// Partition of entity ids
    pub communities: Vec<Vec<String>>,
    /// Highest betweenness scores, descending
    #[serde(serialize_with = "ordered_scores")]
    pub centrality_scores: Vec<(String, f64)>,
    pub entity_type_counts: BTreeMap<EntityType, usize>,
}

impl AnalyticsResult {
    /// Centrality score for one entity, if it made the top list
    pub fn centrality(&self, id: &str) -> Option<f64> {
        self.centrality_scores
            .iter()
            .find(|(entity, _)| entity == id)
            .map(|(_, score)| *score)
    }

    /// Index of the community containing an entity
    pub fn community_of(&self, id: &str) -> Option<usize> {
        self.communities
            .iter()
            .position(|members| members.iter().any(|m| m == id))
    }
}

/// Serialize ranked pairs as a JSON object that keeps the ranking order
fn ordered_scores<S: Serializer>(
    scores: &[(String, f64)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(scores.iter().map(|(id, score)| (id, score)))
}

/// Options for [`compute`]
#[derive(Debug, Clone)]
pub struct AnalyticsOptions {
    /// Entries kept in `centrality_scores`
    pub top_centrality: usize,
    pub louvain: LouvainOptions,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            top_centrality: 20,
            louvain: LouvainOptions::default(),
        }
    }
}

/// Compute analytics for a graph
pub fn compute(graph: &GraphStore, options: &AnalyticsOptions) -> AnalyticsResult {
    if graph.is_empty() {
        return AnalyticsResult::default();
    }

    let adjacency = graph.adjacency();
    let total_nodes = adjacency.len();
    let degree_sum: usize = adjacency.neighbors.iter().map(Vec::len).sum();

    let partition = if total_nodes < 2 {
        singletons(total_nodes)
    } else {
        match louvain(&adjacency, &options.louvain) {
            Ok(partition) => partition,
            Err(e) => {
                warn!(error = %e, nodes = total_nodes, "Community detection failed, using singleton communities");
                singletons(total_nodes)
            }
        }
    };
    let communities = partition
        .into_iter()
        .map(|members| {
            members
                .into_iter()
                .map(|i| adjacency.ids[i].clone())
                .collect()
        })
        .collect::<Vec<Vec<String>>>();

    let centrality_scores = if total_nodes < 2 {
        Vec::new()
    } else {
        let mut ranked = ranked_betweenness(&adjacency);
        ranked.truncate(options.top_centrality);
        ranked
    };

    let mut entity_type_counts = BTreeMap::new();
    for entity in graph.entities() {
        *entity_type_counts.entry(entity.entity_type).or_insert(0) += 1;
    }

    debug!(
        nodes = total_nodes,
        edges = graph.edge_count(),
        communities = communities.len(),
        "Analytics computed"
    );

    AnalyticsResult {
        total_nodes,
        total_edges: graph.edge_count(),
        density: graph.density(),
        avg_degree: degree_sum as f64 / total_nodes as f64,
        communities,
        centrality_scores,
        entity_type_counts,
    }
}

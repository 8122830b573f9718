//! Graph construction, merge and filtering
//!
//! The builder never mutates a graph it was handed: `build` and `merge`
//! produce a fresh owned graph, `filter` works on a copy.

use tracing::{debug, info};

use crate::config::Config;

use super::analytics::{self, AnalyticsOptions, AnalyticsResult};
use super::community::LouvainOptions;
use super::entity::EntityType;
use super::record::{EntityRecord, RecordBatch, RelationshipRecord};
use super::store::GraphStore;

/// Filter passes applied by [`GraphBuilder::filter`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    /// Drop nodes with fewer incident edges
    pub min_degree: usize,
    /// Keep only these types, every type when empty
    pub allowed_types: Vec<EntityType>,
    /// Keep the N highest-degree nodes, disabled when 0
    pub top_n: usize,
}

impl FilterOptions {
    pub fn new(min_degree: usize) -> Self {
        Self {
            min_degree,
            ..Default::default()
        }
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.allowed_types = types.into_iter().collect();
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}

/// Builds graphs from extraction records
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    analytics: AnalyticsOptions,
}

impl GraphBuilder {
    /// Create a builder with default analytics settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder using the analytics section of a configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            analytics: AnalyticsOptions {
                top_centrality: config.analytics.top_centrality,
                louvain: LouvainOptions {
                    seed: config.analytics.louvain_seed,
                    max_levels: config.analytics.louvain_max_passes,
                },
            },
        }
    }

    /// Replace the analytics settings
    pub fn with_analytics(mut self, options: AnalyticsOptions) -> Self {
        self.analytics = options;
        self
    }

    /// Build a graph from entity and relationship records
    ///
    /// Every entity becomes a node. Relationships with an endpoint that does
    /// not resolve to a node are dropped, as are self loops. A pair seen twice
    /// keeps the last record.
    pub fn build(
        &self,
        entities: &[EntityRecord],
        relationships: &[RelationshipRecord],
    ) -> GraphStore {
        let mut graph = GraphStore::new();
        for record in entities {
            graph.upsert_entity(record.to_entity());
        }

        let mut dropped = 0usize;
        for record in relationships {
            if !graph.upsert_relationship(&record.source, &record.target, record.to_relationship()) {
                debug!(
                    source = %record.source,
                    target = %record.target,
                    "Dropping relationship with unresolved endpoint"
                );
                dropped += 1;
            }
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dropped,
            "Graph built"
        );
        graph
    }

    /// Build a graph from a record batch
    pub fn build_batch(&self, batch: &RecordBatch) -> GraphStore {
        self.build(&batch.entities, &batch.relationships)
    }

    /// Merge incoming records into a graph built from base records
    ///
    /// Entities are unioned by id; a collision keeps the existing node and
    /// raises its count to the larger of the two. Relationships are unioned by
    /// unordered pair; a collision adds the weights, merges the evidence and
    /// takes the incoming type.
    pub fn merge(
        &self,
        base_entities: &[EntityRecord],
        base_relationships: &[RelationshipRecord],
        new_entities: &[EntityRecord],
        new_relationships: &[RelationshipRecord],
    ) -> GraphStore {
        let mut graph = self.build(base_entities, base_relationships);
        let mut added_entities = 0usize;
        let mut added_edges = 0usize;
        let mut merged_edges = 0usize;

        for record in new_entities {
            let incoming = record.to_entity();
            match graph.entity(&incoming.id) {
                Some(existing) => {
                    let count = existing.occurrence_count.max(incoming.occurrence_count);
                    if count != existing.occurrence_count {
                        let updated = existing.clone().with_count(count);
                        graph.upsert_entity(updated);
                    }
                }
                None => {
                    graph.upsert_entity(incoming);
                    added_entities += 1;
                }
            }
        }

        for record in new_relationships {
            let (Some(a), Some(b)) = (
                graph.resolve_key(&record.source).map(str::to_string),
                graph.resolve_key(&record.target).map(str::to_string),
            ) else {
                debug!(
                    source = %record.source,
                    target = %record.target,
                    "Dropping merged relationship with unresolved endpoint"
                );
                continue;
            };
            if a == b {
                continue;
            }

            let incoming = record.to_relationship();
            let relationship = match graph.relationship(&a, &b) {
                Some(existing) => {
                    let mut combined = existing.clone();
                    combined.absorb(&incoming);
                    merged_edges += 1;
                    combined
                }
                None => {
                    added_edges += 1;
                    incoming
                }
            };
            graph.upsert_relationship(&a, &b, relationship);
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            added_entities,
            added_edges,
            merged_edges,
            "Graphs merged"
        );
        graph
    }

    /// Merge two record batches
    pub fn merge_batches(&self, base: &RecordBatch, incoming: &RecordBatch) -> GraphStore {
        self.merge(
            &base.entities,
            &base.relationships,
            &incoming.entities,
            &incoming.relationships,
        )
    }

    /// Filtered copy of a graph
    ///
    /// Passes run in order on the shrinking copy: minimum degree, allowed
    /// types, then the top N nodes by degree (ties keep insertion order).
    pub fn filter(&self, graph: &GraphStore, options: &FilterOptions) -> GraphStore {
        let mut filtered = graph.clone();

        if options.min_degree > 0 {
            let sparse: Vec<String> = filtered
                .ids()
                .filter(|id| filtered.degree(id) < options.min_degree)
                .map(str::to_string)
                .collect();
            for id in &sparse {
                filtered.remove_entity(id);
            }
        }

        if !options.allowed_types.is_empty() {
            let excluded: Vec<String> = filtered
                .entities()
                .filter(|e| !options.allowed_types.contains(&e.entity_type))
                .map(|e| e.id.clone())
                .collect();
            for id in &excluded {
                filtered.remove_entity(id);
            }
        }

        if options.top_n > 0 && filtered.node_count() > options.top_n {
            let mut ranked: Vec<(String, usize)> = filtered
                .ids()
                .map(|id| (id.to_string(), filtered.degree(id)))
                .collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            for (id, _) in &ranked[options.top_n..] {
                filtered.remove_entity(id);
            }
        }

        debug!(
            before = graph.node_count(),
            after = filtered.node_count(),
            "Graph filtered"
        );
        filtered
    }

    /// Structural analytics for a graph
    pub fn compute_analytics(&self, graph: &GraphStore) -> AnalyticsResult {
        analytics::compute(graph, &self.analytics)
    }
}

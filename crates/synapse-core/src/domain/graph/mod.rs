//! Knowledge graph domain module
//!
//! Builds an undirected biomedical entity graph from extraction records and
//! computes structural analytics over it:
//!
//! - **Records**: validated entity and relationship records at the boundary
//! - **Store**: the graph itself, add/remove/lookup primitives only
//! - **Builder**: build, merge and filter graphs, compute analytics
//! - **Projection**: the JSON shape clients hold, convertible back to records
//! - **Shared**: single-writer, snapshot-reader publication of a graph
//! - **Co-occurrence**: sentence mentions to records
//!
//! ## Data flow
//!
//! ```text
//! SentenceMentions ─► CooccurrenceExtractor ─► RecordBatch
//!                                                  │
//!                                                  ▼
//!                          GraphBuilder::build / merge / filter
//!                                                  │
//!                                                  ▼
//!                GraphStore ─► {HypothesisEngine, QueryEngine, analytics}
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use synapse_core::domain::graph::{GraphBuilder, RecordBatch};
//!
//! let batch = RecordBatch::from_json(&json)?;
//! let builder = GraphBuilder::new();
//! let graph = builder.build_batch(&batch);
//!
//! let analytics = builder.compute_analytics(&graph);
//! println!("{} communities", analytics.communities.len());
//! ```

mod analytics;
mod builder;
mod centrality;
mod community;
mod cooccurrence;
mod entity;
mod projection;
mod record;
mod relationship;
mod shared;
mod store;

pub use analytics::{AnalyticsOptions, AnalyticsResult};
pub use builder::{FilterOptions, GraphBuilder};
pub use centrality::{betweenness, ranked_betweenness};
pub use community::{CommunityError, LouvainOptions, louvain};
pub use cooccurrence::{CooccurrenceExtractor, Mention, SentenceMentions};
pub use entity::{Entity, EntityType};
pub use projection::{EdgeMetadata, GraphData, GraphEdge, GraphMetadata, GraphNode, NodeMetadata};
pub use record::{EntityRecord, RecordBatch, RelationshipRecord};
pub use relationship::{
    DEFAULT_RELATIONSHIP_TYPE, MAX_EDGE_EVIDENCE, Relationship, merge_evidence, pair_key,
};
pub use shared::{GraphSnapshot, SharedGraph};
pub use store::{Adjacency, GraphStore, GraphSummary};

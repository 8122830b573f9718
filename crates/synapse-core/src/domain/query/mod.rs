//! Graph queries
//!
//! Structural questions asked of a built graph: neighborhoods, weighted
//! shortest paths, shared neighbors, induced subgraphs and fuzzy name
//! resolution. Every query borrows the graph read-only, so it runs against a
//! published snapshot while a rebuild proceeds elsewhere.
//!
//! ```rust,ignore
//! use synapse_core::domain::query::QueryEngine;
//!
//! let snapshot = shared.snapshot();
//! let engine = QueryEngine::from_config(snapshot.graph(), &config.query);
//! let path = engine.shortest_path("tnf", "infliximab");
//! ```

mod engine;
mod resolver;
mod results;

pub use engine::{DEFAULT_EVIDENCE_PER_EDGE, QueryEngine};
pub use resolver::{
    EntityMatch, MatchStrategy, NameResolver, RESOLVE_THRESHOLD, exact_match, match_score,
    substring_score, token_overlap_score,
};
pub use results::{
    CommonConnection, CommonConnectionsResult, EdgeDetail, NeighborLayers, PathDetail, PathResult,
    SubgraphResult,
};

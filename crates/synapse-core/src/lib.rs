//! Synapse Core Library
//!
//! This crate provides the core functionality for Synapse, including:
//! - Graph construction from extracted entity and relationship records
//! - Multi-source merge with weight and evidence aggregation
//! - Graph analytics (density, betweenness centrality, Louvain communities)
//! - Topology-driven hypothesis generation (triadic closure, bridge nodes)
//! - A read-only query surface (neighbors, paths, common connections, subgraphs)
//! - Fuzzy entity-name resolution for free-text lookups
//! - Co-occurrence aggregation of sentence-level entity mentions
//!
//! Everything in here is synchronous and CPU-bound. NER, persistence and
//! the HTTP layer live outside this crate and talk to it through the record and
//! projection types in [`domain::graph`].

pub mod config;
pub mod domain;
pub mod error;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::graph::{
        AnalyticsResult, EntityRecord, EntityType, GraphBuilder, GraphData, GraphStore,
        RecordBatch, RelationshipRecord, SharedGraph,
    };
    pub use crate::domain::hypothesis::{Denylist, Hypothesis, HypothesisEngine};
    pub use crate::domain::query::QueryEngine;
    pub use crate::error::{Error, Result};
}

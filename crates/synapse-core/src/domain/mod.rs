//! Domain layer
//!
//! Contains the graph model and the algorithms that run over it.

pub mod graph;
pub mod hypothesis;
pub mod query;

//! Hypothesis generation
//!
//! Proposes candidate relationships from graph structure alone:
//!
//! - **Triadic closure**: two unlinked entities sharing a neighbor
//! - **Bridge nodes**: entities with high betweenness centrality
//!
//! Results are generated on demand and never persisted.
//!
//! ```rust,ignore
//! use synapse_core::domain::hypothesis::HypothesisEngine;
//!
//! let engine = HypothesisEngine::from_config(&config.hypothesis);
//! for hypothesis in engine.generate(&graph, Some("egfr"), 10) {
//!     println!("{:.2} {}", hypothesis.confidence, hypothesis.title);
//! }
//! ```

mod denylist;
mod engine;
mod model;

pub use denylist::{Denylist, default_denylist};
pub use engine::HypothesisEngine;
pub use model::{Hypothesis, HypothesisKind, MAX_CONFIDENCE, MIN_CONFIDENCE};

//! Shared graph with snapshot reads
//!
//! One writer at a time rebuilds or merges into a fresh graph, then swaps it
//! in as a new generation. Readers clone the current `Arc` and keep working
//! on that generation even while a newer one is being built.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::info;

use super::builder::GraphBuilder;
use super::record::RecordBatch;
use super::store::GraphStore;

/// One published generation of the graph
#[derive(Debug)]
pub struct GraphSnapshot {
    generation: u64,
    built_at: DateTime<Utc>,
    graph: GraphStore,
}

impl GraphSnapshot {
    fn new(generation: u64, graph: GraphStore) -> Self {
        Self {
            generation,
            built_at: Utc::now(),
            graph,
        }
    }

    /// Publication counter, 0 for the initial empty graph
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }
}

/// Graph shared between one writer and many readers
#[derive(Debug)]
pub struct SharedGraph {
    current: RwLock<Arc<GraphSnapshot>>,
    writer: Mutex<()>,
    builder: GraphBuilder,
}

impl Default for SharedGraph {
    fn default() -> Self {
        Self::new(GraphBuilder::new())
    }
}

impl SharedGraph {
    /// Start from an empty graph
    pub fn new(builder: GraphBuilder) -> Self {
        Self {
            current: RwLock::new(Arc::new(GraphSnapshot::new(0, GraphStore::new()))),
            writer: Mutex::new(()),
            builder,
        }
    }

    /// Pin the current generation
    pub fn snapshot(&self) -> Arc<GraphSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Generation readers currently see
    pub fn generation(&self) -> u64 {
        self.current.read().generation
    }

    /// Replace the graph with one built from records
    pub fn rebuild(&self, batch: &RecordBatch) -> Arc<GraphSnapshot> {
        let _writer = self.writer.lock();
        let graph = self.builder.build_batch(batch);
        self.install(graph)
    }

    /// Merge records into the current graph
    pub fn merge(&self, incoming: &RecordBatch) -> Arc<GraphSnapshot> {
        let _writer = self.writer.lock();
        let base = RecordBatch::from_graph(self.snapshot().graph());
        let graph = self.builder.merge_batches(&base, incoming);
        self.install(graph)
    }

    /// Publish an already built graph
    pub fn publish(&self, graph: GraphStore) -> Arc<GraphSnapshot> {
        let _writer = self.writer.lock();
        self.install(graph)
    }

    /// Caller must hold the writer lock
    fn install(&self, graph: GraphStore) -> Arc<GraphSnapshot> {
        let generation = self.generation() + 1;
        let snapshot = Arc::new(GraphSnapshot::new(generation, graph));
        *self.current.write() = Arc::clone(&snapshot);

        info!(
            generation,
            nodes = snapshot.graph.node_count(),
            edges = snapshot.graph.edge_count(),
            "Graph snapshot published"
        );
        snapshot
    }
}

//! Graph storage
//!
//! `GraphStore` owns the node and edge representation and nothing else: it
//! keeps a simple undirected graph (no self loops, no multi-edges) on top of
//! a `petgraph` stable graph plus a key index. Iteration always follows
//! insertion order so every algorithm built on top is deterministic.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableUnGraph};

use super::entity::{Entity, EntityType};
use super::relationship::Relationship;

/// Undirected entity graph keyed by entity id
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    graph: StableUnGraph<Entity, Relationship>,
    index: HashMap<String, NodeIndex>,
    /// Display names and normalized forms, first entity wins
    aliases: HashMap<String, NodeIndex>,
}

/// Summary metadata for a graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphSummary {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub density: f64,
}

/// Dense, index-addressed copy of the graph used by the analytics kernels
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    /// Entity ids, position = dense index, insertion order
    pub ids: Vec<String>,
    /// Neighbors with edge weight, ascending dense index
    pub neighbors: Vec<Vec<(usize, f64)>>,
}

impl Adjacency {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }
}

impl GraphStore {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every node and edge
    pub fn clear(&mut self) {
        self.graph.clear();
        self.index.clear();
        self.aliases.clear();
    }

    // ========== Mutation ==========

    /// Insert an entity, replacing the attributes of an existing node with the same id
    ///
    /// Returns true when a new node was created.
    pub fn upsert_entity(&mut self, entity: Entity) -> bool {
        if let Some(&ix) = self.index.get(&entity.id) {
            self.graph[ix] = entity;
            return false;
        }

        let id = entity.id.clone();
        let display = entity.display_name.clone();
        let ix = self.graph.add_node(entity);
        self.index.insert(id.clone(), ix);
        for alias in [display.clone(), Entity::normalize(&display), Entity::normalize(&id)] {
            self.aliases.entry(alias).or_insert(ix);
        }
        true
    }

    /// Connect two existing entities
    ///
    /// Endpoints are resolved with [`GraphStore::resolve_key`]. An existing edge
    /// between the pair has its payload replaced. Returns false (and stores
    /// nothing) when an endpoint is missing or both endpoints are the same node.
    pub fn upsert_relationship(&mut self, a: &str, b: &str, relationship: Relationship) -> bool {
        let (Some(ia), Some(ib)) = (self.lookup(a), self.lookup(b)) else {
            return false;
        };
        if ia == ib {
            return false;
        }

        match self.graph.find_edge(ia, ib) {
            Some(edge) => self.graph[edge] = relationship,
            None => {
                self.graph.add_edge(ia, ib, relationship);
            }
        }
        true
    }

    /// Remove an entity and every edge touching it
    pub fn remove_entity(&mut self, id: &str) -> Option<Entity> {
        let ix = self.index.remove(id)?;
        self.aliases.retain(|_, target| *target != ix);
        let removed = self.graph.remove_node(ix);
        self.compact();
        removed
    }

    /// Remove the edge between two entities
    pub fn remove_relationship(&mut self, a: &str, b: &str) -> Option<Relationship> {
        let edge = self.graph.find_edge(*self.index.get(a)?, *self.index.get(b)?)?;
        let removed = self.graph.remove_edge(edge);
        self.compact();
        removed
    }

    // ========== Lookup ==========

    /// Number of entities
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of relationships
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// True when the graph has no entities
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// True when an entity with this exact id exists
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Entity by exact id
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.index.get(id).map(|&ix| &self.graph[ix])
    }

    /// Resolve a relationship endpoint to a node id
    ///
    /// Tries the exact id, then the display name, then the normalized form.
    pub fn resolve_key(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|ix| self.graph[ix].id.as_str())
    }

    /// Relationship between two entities, in either direction
    pub fn relationship(&self, a: &str, b: &str) -> Option<&Relationship> {
        let edge = self.graph.find_edge(*self.index.get(a)?, *self.index.get(b)?)?;
        self.graph.edge_weight(edge)
    }

    /// True when the two entities are directly connected
    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.relationship(a, b).is_some()
    }

    /// Incident edge count, 0 for unknown ids
    pub fn degree(&self, id: &str) -> usize {
        self.index
            .get(id)
            .map(|&ix| self.graph.edges(ix).count())
            .unwrap_or(0)
    }

    /// Neighbor ids in insertion order
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let Some(&ix) = self.index.get(id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(ix).collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
            .into_iter()
            .map(|n| self.graph[n].id.as_str())
            .collect()
    }

    /// Entities in insertion order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.graph.node_indices().map(move |ix| &self.graph[ix])
    }

    /// Entity ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entities().map(|e| e.id.as_str())
    }

    /// Relationships as (endpoint, endpoint, payload) in insertion order
    pub fn relationships(&self) -> impl Iterator<Item = (&str, &str, &Relationship)> + '_ {
        self.graph.edge_indices().filter_map(move |edge| {
            let (a, b) = self.graph.edge_endpoints(edge)?;
            Some((
                self.graph[a].id.as_str(),
                self.graph[b].id.as_str(),
                &self.graph[edge],
            ))
        })
    }

    /// Entity ids with the given type, insertion order
    pub fn ids_of_type(&self, entity_type: EntityType) -> Vec<&str> {
        self.entities()
            .filter(|e| e.entity_type == entity_type)
            .map(|e| e.id.as_str())
            .collect()
    }

    // ========== Metrics ==========

    /// |E| / (|V|(|V|-1)/2), 0 below two nodes
    pub fn density(&self) -> f64 {
        let n = self.node_count();
        if n < 2 {
            return 0.0;
        }
        let possible = (n * (n - 1)) as f64 / 2.0;
        self.edge_count() as f64 / possible
    }

    /// Node count, edge count and density
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            total_nodes: self.node_count(),
            total_edges: self.edge_count(),
            density: self.density(),
        }
    }

    /// Dense adjacency view for the analytics kernels
    pub fn adjacency(&self) -> Adjacency {
        let order: Vec<NodeIndex> = self.graph.node_indices().collect();
        let dense: HashMap<NodeIndex, usize> =
            order.iter().enumerate().map(|(i, &ix)| (ix, i)).collect();

        let neighbors = order
            .iter()
            .map(|&ix| {
                let mut adj: Vec<(usize, f64)> = self
                    .graph
                    .neighbors(ix)
                    .filter_map(|n| {
                        let edge = self.graph.find_edge(ix, n)?;
                        Some((dense[&n], self.graph[edge].weight))
                    })
                    .collect();
                adj.sort_by_key(|(i, _)| *i);
                adj.dedup_by_key(|(i, _)| *i);
                adj
            })
            .collect();

        Adjacency {
            ids: order.iter().map(|&ix| self.graph[ix].id.clone()).collect(),
            neighbors,
        }
    }

    // ========== Crate-internal access ==========

    pub(crate) fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub(crate) fn raw(&self) -> &StableUnGraph<Entity, Relationship> {
        &self.graph
    }

    /// Rebuild into a fresh graph so vacant slots are never reused
    ///
    /// A stable graph hands freed indices to the next insertion, which would
    /// place a new node or edge ahead of older ones.
    fn compact(&mut self) {
        let mut graph =
            StableUnGraph::with_capacity(self.graph.node_count(), self.graph.edge_count());
        let mut remap: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        for ix in self.graph.node_indices() {
            remap.insert(ix, graph.add_node(self.graph[ix].clone()));
        }
        for edge in self.graph.edge_indices() {
            let Some((a, b)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            if let (Some(&na), Some(&nb)) = (remap.get(&a), remap.get(&b)) {
                graph.add_edge(na, nb, self.graph[edge].clone());
            }
        }

        let relocate = |ix: &mut NodeIndex| match remap.get(ix) {
            Some(&new) => {
                *ix = new;
                true
            }
            None => false,
        };
        self.index.retain(|_, ix| relocate(ix));
        self.aliases.retain(|_, ix| relocate(ix));
        self.graph = graph;
    }

    fn lookup(&self, name: &str) -> Option<NodeIndex> {
        self.index
            .get(name)
            .or_else(|| self.aliases.get(name))
            .or_else(|| self.aliases.get(&Entity::normalize(name)))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> GraphStore {
        let mut graph = GraphStore::new();
        for id in ["a", "b", "c"] {
            graph.upsert_entity(Entity::new(id, EntityType::Chemical));
        }
        graph.upsert_relationship("a", "b", Relationship::new(1.0));
        graph.upsert_relationship("b", "c", Relationship::new(1.0));
        graph.upsert_relationship("a", "c", Relationship::new(1.0));
        graph
    }

    #[test]
    fn test_empty_graph() {
        let graph = GraphStore::new();
        assert!(graph.is_empty());
        assert_eq!(graph.density(), 0.0);
        assert_eq!(graph.degree("missing"), 0);
        assert!(graph.neighbors("missing").is_empty());
    }

    #[test]
    fn test_triangle_density() {
        let graph = triangle();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.density(), 1.0);
        assert_eq!(graph.degree("b"), 2);
    }

    #[test]
    fn test_relationship_requires_both_endpoints() {
        let mut graph = GraphStore::new();
        graph.upsert_entity(Entity::new("a", EntityType::Chemical));
        assert!(!graph.upsert_relationship("a", "ghost", Relationship::new(1.0)));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_no_self_loops_or_multi_edges() {
        let mut graph = triangle();
        assert!(!graph.upsert_relationship("a", "a", Relationship::new(1.0)));
        assert!(graph.upsert_relationship("b", "a", Relationship::new(7.0)));

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.relationship("a", "b").unwrap().weight, 7.0);
    }

    #[test]
    fn test_upsert_entity_replaces_attributes() {
        let mut graph = GraphStore::new();
        assert!(graph.upsert_entity(Entity::new("a", EntityType::Unknown)));
        assert!(!graph.upsert_entity(Entity::new("a", EntityType::Disease).with_count(3)));

        assert_eq!(graph.node_count(), 1);
        let entity = graph.entity("a").unwrap();
        assert_eq!(entity.entity_type, EntityType::Disease);
        assert_eq!(entity.occurrence_count, 3);
    }

    #[test]
    fn test_endpoint_resolution_by_display_name() {
        let mut graph = GraphStore::new();
        graph.upsert_entity(Entity::new("egfr", EntityType::GeneOrGeneProduct).with_display_name("EGFR"));
        graph.upsert_entity(Entity::new("gefitinib", EntityType::Chemical).with_display_name("Gefitinib"));

        assert_eq!(graph.resolve_key("EGFR"), Some("egfr"));
        assert_eq!(graph.resolve_key("  GEFITINIB "), Some("gefitinib"));
        assert!(graph.upsert_relationship("EGFR", "Gefitinib", Relationship::new(1.0)));
        assert!(graph.has_edge("egfr", "gefitinib"));
    }

    #[test]
    fn test_remove_entity_drops_edges() {
        let mut graph = triangle();
        let removed = graph.remove_entity("b").unwrap();

        assert_eq!(removed.id, "b");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.contains("b"));
        assert_eq!(graph.resolve_key("b"), None);
    }

    #[test]
    fn test_remove_relationship() {
        let mut graph = triangle();
        assert!(graph.remove_relationship("c", "a").is_some());
        assert!(!graph.has_edge("a", "c"));
        assert!(graph.remove_relationship("c", "a").is_none());
    }

    #[test]
    fn test_insertion_order_survives_removal() {
        let mut graph = triangle();
        graph.remove_entity("a");
        graph.upsert_entity(Entity::new("d", EntityType::Chemical));
        assert_eq!(graph.ids().collect::<Vec<_>>(), vec!["b", "c", "d"]);

        graph.upsert_relationship("c", "d", Relationship::new(2.0));
        graph.remove_relationship("b", "c");
        graph.upsert_relationship("b", "d", Relationship::new(3.0));
        let edges: Vec<_> = graph.relationships().map(|(a, b, r)| (a, b, r.weight)).collect();
        assert_eq!(edges, vec![("c", "d", 2.0), ("b", "d", 3.0)]);

        assert_eq!(graph.resolve_key("C"), Some("c"));
        assert_eq!(graph.neighbors("d"), vec!["b", "c"]);
    }

    #[test]
    fn test_neighbors_follow_insertion_order() {
        let mut graph = GraphStore::new();
        for id in ["hub", "x", "y", "z"] {
            graph.upsert_entity(Entity::new(id, EntityType::Entity));
        }
        graph.upsert_relationship("hub", "z", Relationship::new(1.0));
        graph.upsert_relationship("hub", "x", Relationship::new(1.0));
        graph.upsert_relationship("y", "hub", Relationship::new(1.0));

        assert_eq!(graph.neighbors("hub"), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_adjacency_view() {
        let graph = triangle();
        let adjacency = graph.adjacency();

        assert_eq!(adjacency.ids, vec!["a", "b", "c"]);
        assert_eq!(adjacency.edge_count(), 3);
        assert_eq!(adjacency.neighbors[0], vec![(1, 1.0), (2, 1.0)]);
    }

    #[test]
    fn test_adjacency_after_removal_is_dense() {
        let mut graph = triangle();
        graph.remove_entity("a");
        let adjacency = graph.adjacency();

        assert_eq!(adjacency.ids, vec!["b", "c"]);
        assert_eq!(adjacency.neighbors, vec![vec![(1, 1.0)], vec![(0, 1.0)]]);
    }

    #[test]
    fn test_clear() {
        let mut graph = triangle();
        graph.clear();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.contains("a"));
    }
}

//! Structural queries over a graph snapshot

use std::collections::HashSet;

use petgraph::algo::astar;
use petgraph::visit::EdgeRef;
use tracing::debug;

use super::resolver::{EntityMatch, NameResolver};
use super::results::{
    CommonConnection, CommonConnectionsResult, EdgeDetail, NeighborLayers, PathDetail, PathResult,
    SubgraphResult,
};
use crate::config::QueryConfig;
use crate::domain::graph::GraphStore;

/// Evidence sentences attached to each reported edge
pub const DEFAULT_EVIDENCE_PER_EDGE: usize = 3;

/// Read-only query surface over one graph
///
/// Entity arguments accept an id, a display name, or any spelling that
/// normalizes to one. Unknown entities produce empty results, never errors.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'g> {
    graph: &'g GraphStore,
    evidence_per_edge: usize,
    resolver: NameResolver,
}

impl<'g> QueryEngine<'g> {
    pub fn new(graph: &'g GraphStore) -> Self {
        Self {
            graph,
            evidence_per_edge: DEFAULT_EVIDENCE_PER_EDGE,
            resolver: NameResolver::default(),
        }
    }

    pub fn from_config(graph: &'g GraphStore, config: &QueryConfig) -> Self {
        Self {
            graph,
            evidence_per_edge: config.evidence_per_edge,
            resolver: NameResolver::new(config.resolve_threshold),
        }
    }

    pub fn with_evidence_limit(mut self, limit: usize) -> Self {
        self.evidence_per_edge = limit;
        self
    }

    pub fn with_resolver(mut self, resolver: NameResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn graph(&self) -> &'g GraphStore {
        self.graph
    }

    /// Breadth-first layers around an entity
    ///
    /// Depth below one is treated as one. Expansion stops early once a hop
    /// discovers nothing new; that final empty layer is still reported.
    pub fn neighbors(&self, entity: &str, depth: usize) -> NeighborLayers {
        let Some(start) = self.graph.resolve_key(entity) else {
            debug!(entity, "Neighbor query for unknown entity");
            return NeighborLayers {
                entity: entity.to_string(),
                layers: Vec::new(),
            };
        };

        let mut visited: HashSet<&str> = HashSet::from([start]);
        let mut frontier = vec![start];
        let mut layers = Vec::new();

        for _ in 0..depth.max(1) {
            let mut next = Vec::new();
            let mut layer = Vec::new();
            for &node in &frontier {
                for neighbor in self.graph.neighbors(node) {
                    if !visited.insert(neighbor) {
                        continue;
                    }
                    next.push(neighbor);
                    if let Some(edge) = self.edge_detail(node, neighbor) {
                        layer.push(edge);
                    }
                }
            }
            layers.push(layer);
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        NeighborLayers {
            entity: start.to_string(),
            layers,
        }
    }

    /// Minimum-total-weight path between two entities
    pub fn shortest_path(&self, source: &str, target: &str) -> PathResult {
        let mut result = PathResult {
            source: source.to_string(),
            target: target.to_string(),
            paths: Vec::new(),
        };

        let (Some(from), Some(to)) = (self.graph.resolve_key(source), self.graph.resolve_key(target))
        else {
            return result;
        };
        result.source = from.to_string();
        result.target = to.to_string();

        let (Some(start), Some(goal)) = (self.graph.node_index(from), self.graph.node_index(to))
        else {
            return result;
        };

        let raw = self.graph.raw();
        let Some((total_weight, route)) =
            astar(raw, start, |n| n == goal, |edge| edge.weight().weight, |_| 0.0)
        else {
            debug!(source = from, target = to, "No path");
            return result;
        };

        let nodes: Vec<String> = route.iter().map(|&ix| raw[ix].id.clone()).collect();
        let edges = nodes
            .windows(2)
            .filter_map(|pair| self.edge_detail(&pair[0], &pair[1]))
            .collect();

        result.paths.push(PathDetail {
            nodes,
            edges,
            total_weight,
        });
        result
    }

    /// Entities adjacent to every given entity
    ///
    /// Entities missing from the graph are ignored; fewer than two present
    /// entities yields an empty result. Sorted by degree, highest first, with
    /// ties in insertion order.
    pub fn common_connections<S: AsRef<str>>(
        &self,
        entities: &[S],
        min_degree: usize,
    ) -> CommonConnectionsResult {
        let mut present: Vec<&str> = Vec::new();
        for entity in entities {
            if let Some(id) = self.graph.resolve_key(entity.as_ref()) {
                if !present.contains(&id) {
                    present.push(id);
                }
            }
        }
        let Some((first, rest)) = present.split_first() else {
            return CommonConnectionsResult::default();
        };
        if rest.is_empty() {
            return CommonConnectionsResult::default();
        }

        let others: Vec<HashSet<&str>> = rest
            .iter()
            .map(|id| self.graph.neighbors(id).into_iter().collect())
            .collect();

        let mut common: Vec<CommonConnection> = self
            .graph
            .neighbors(first)
            .into_iter()
            .filter(|candidate| others.iter().all(|set| set.contains(candidate)))
            .map(|candidate| CommonConnection {
                entity: candidate.to_string(),
                degree: self.graph.degree(candidate),
            })
            .filter(|c| c.degree >= min_degree)
            .collect();
        common.sort_by(|a, b| b.degree.cmp(&a.degree));

        CommonConnectionsResult { common }
    }

    /// Induced subgraph on everything within `depth` hops of the centers
    pub fn subgraph<S: AsRef<str>>(&self, centers: &[S], depth: usize) -> SubgraphResult {
        let mut keep: HashSet<&str> = HashSet::new();
        let mut frontier: Vec<&str> = Vec::new();
        for center in centers {
            if let Some(id) = self.graph.resolve_key(center.as_ref()) {
                if keep.insert(id) {
                    frontier.push(id);
                }
            }
        }

        for _ in 0..depth {
            let mut next = Vec::new();
            for node in frontier {
                for neighbor in self.graph.neighbors(node) {
                    if keep.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        let nodes = self
            .graph
            .ids()
            .filter(|id| keep.contains(id))
            .map(str::to_string)
            .collect();
        let edges = self
            .graph
            .relationships()
            .filter(|(a, b, _)| keep.contains(a) && keep.contains(b))
            .map(|(a, b, _)| [a.to_string(), b.to_string()])
            .collect();

        SubgraphResult { nodes, edges }
    }

    /// Bind free text to an entity
    pub fn resolve_entity_name(&self, query: &str) -> Option<EntityMatch> {
        self.resolver.resolve(
            query,
            self.graph
                .entities()
                .map(|e| (e.id.as_str(), e.display_name.as_str())),
        )
    }

    fn edge_detail(&self, source: &str, target: &str) -> Option<EdgeDetail> {
        let relationship = self.graph.relationship(source, target)?;
        Some(EdgeDetail {
            source: source.to_string(),
            target: target.to_string(),
            weight: relationship.weight,
            relationship_type: relationship.relationship_type.clone(),
            evidence: relationship.evidence_sample(self.evidence_per_edge),
        })
    }
}

//! Hypothesis generation from graph topology
//!
//! Two generators feed [`HypothesisEngine::generate`]:
//!
//! - **Triadic closure**: A and C both touch B but not each other, so an A-C
//!   link is proposed. Confidence grows with the weight of the two supporting
//!   edges relative to B's degree.
//! - **Bridge nodes**: nodes with the highest betweenness centrality, which
//!   tie otherwise loosely connected parts of the graph together.
//!
//! Generic names on the denylist lower a triadic hypothesis' confidence and
//! keep a node out of the bridge list; they never suppress a triadic result.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::config::HypothesisConfig;
use crate::domain::graph::{Entity, GraphStore, pair_key, ranked_betweenness};

use super::denylist::{Denylist, default_denylist};
use super::model::{Hypothesis, HypothesisKind, MIN_CONFIDENCE, round2};

/// Confidence removed for each generic endpoint
const DENYLIST_PENALTY: f64 = 0.08;

/// Base confidence of a triadic closure
const TRIADIC_BASE: f64 = 0.5;

/// Largest boost edge weights can add to a triadic closure
const TRIADIC_MAX_BOOST: f64 = 0.4;

/// Bridge confidences are scaled into [BRIDGE_FLOOR, BRIDGE_FLOOR + BRIDGE_RANGE]
const BRIDGE_FLOOR: f64 = 0.6;
const BRIDGE_RANGE: f64 = 0.35;

/// Neighboring edges inspected for bridge evidence
const BRIDGE_SAMPLE_EDGES: usize = 3;

/// Evidence sentences kept per bridge hypothesis
const BRIDGE_SAMPLE_EVIDENCE: usize = 2;

/// Generates hypotheses over a graph
#[derive(Debug, Clone)]
pub struct HypothesisEngine {
    denylist: Denylist,
    /// Share of the budget reserved for triadic closures
    triadic_share: f64,
    /// Bridges returned, denylist ignored, when nothing else was found
    bridge_fallback: usize,
}

impl Default for HypothesisEngine {
    fn default() -> Self {
        Self {
            denylist: default_denylist(),
            triadic_share: 0.8,
            bridge_fallback: 3,
        }
    }
}

impl HypothesisEngine {
    /// Create an engine with the given denylist and default budget split
    pub fn new(denylist: Denylist) -> Self {
        Self {
            denylist,
            ..Default::default()
        }
    }

    /// Create an engine from the hypothesis settings
    pub fn from_config(config: &HypothesisConfig) -> Self {
        Self {
            denylist: Denylist::from_config(config),
            triadic_share: config.triadic_share.clamp(0.0, 1.0),
            bridge_fallback: config.bridge_fallback,
        }
    }

    pub fn with_triadic_share(mut self, share: f64) -> Self {
        self.triadic_share = share.clamp(0.0, 1.0);
        self
    }

    pub fn with_bridge_fallback(mut self, count: usize) -> Self {
        self.bridge_fallback = count;
        self
    }

    pub fn denylist(&self) -> &Denylist {
        &self.denylist
    }

    /// Generate up to `max_results` hypotheses
    ///
    /// With a focus that resolves to a node, only triadic closures touching
    /// the focus are considered. Bridge hypotheses fill whatever the triadic
    /// search leaves of the budget. Never fails; an empty graph yields an
    /// empty list.
    pub fn generate(
        &self,
        graph: &GraphStore,
        focus: Option<&str>,
        max_results: usize,
    ) -> Vec<Hypothesis> {
        if graph.is_empty() || max_results == 0 {
            return Vec::new();
        }

        let triadic_budget =
            ((max_results as f64 * self.triadic_share).floor() as usize).clamp(1, max_results);
        let mut results = self.triadic_closures(graph, focus, triadic_budget);
        let triadic = results.len();

        if results.len() < max_results {
            let remaining = max_results - results.len();
            results.extend(self.bridges(graph, remaining, true));
        }

        let mut fallback = false;
        if results.is_empty() {
            fallback = true;
            results = self.bridges(graph, self.bridge_fallback.min(max_results), false);
        }
        results.truncate(max_results);

        info!(
            total = results.len(),
            triadic,
            bridges = results.len() - triadic.min(results.len()),
            fallback,
            focus = focus.unwrap_or(""),
            "Hypotheses generated"
        );
        results
    }

    /// Triadic-closure hypotheses, at most `limit`
    ///
    /// Every unordered endpoint pair is considered once per call, and pairs
    /// that are already linked never produce a hypothesis.
    pub fn triadic_closures(
        &self,
        graph: &GraphStore,
        focus: Option<&str>,
        limit: usize,
    ) -> Vec<Hypothesis> {
        let mut search = TriadicSearch {
            engine: self,
            graph,
            visited: HashSet::new(),
            found: Vec::new(),
            limit,
        };
        if limit == 0 {
            return search.found;
        }

        match focus.and_then(|f| graph.resolve_key(f)) {
            Some(focus) => {
                // focus in the middle, then focus as an endpoint through each neighbor
                if !search.around(focus, None) {
                    for intermediate in graph.neighbors(focus) {
                        if search.around(intermediate, Some(focus)) {
                            break;
                        }
                    }
                }
            }
            None => {
                if let Some(f) = focus {
                    debug!(focus = %f, "Focus not in graph, scanning whole graph");
                }
                for intermediate in graph.ids() {
                    if search.around(intermediate, None) {
                        break;
                    }
                }
            }
        }

        search.found
    }

    /// Bridge-node hypotheses for the `top_k` most central nodes
    ///
    /// Denylisted nodes inside the top K are skipped, not replaced.
    pub fn bridge_nodes(&self, graph: &GraphStore, top_k: usize) -> Vec<Hypothesis> {
        self.bridges(graph, top_k, true)
    }

    fn bridges(&self, graph: &GraphStore, top_k: usize, skip_generic: bool) -> Vec<Hypothesis> {
        if graph.node_count() < 3 || top_k == 0 {
            return Vec::new();
        }

        let ranked = ranked_betweenness(&graph.adjacency());
        let (Some(max), Some(min)) = (ranked.first(), ranked.last()) else {
            return Vec::new();
        };
        let (max, min) = (max.1, min.1);
        let span = if max - min > 0.0 { max - min } else { 1.0 };

        ranked
            .iter()
            .take(top_k)
            .filter_map(|(id, score)| {
                let entity = graph.entity(id)?;
                if skip_generic && self.denylist.contains_entity(entity) {
                    return None;
                }

                let confidence = round2(BRIDGE_FLOOR + BRIDGE_RANGE * (score - min) / span);
                let evidence_sentences = graph
                    .neighbors(id)
                    .into_iter()
                    .take(BRIDGE_SAMPLE_EDGES)
                    .filter_map(|n| graph.relationship(id, n)?.headline().map(str::to_string))
                    .take(BRIDGE_SAMPLE_EVIDENCE)
                    .collect();

                Some(Hypothesis {
                    kind: HypothesisKind::BridgeNode,
                    title: format!("Bridge node {} with high betweenness", entity.display_name),
                    explanation: format!(
                        "{} connects multiple subgraphs (betweenness={:.3}).",
                        entity.display_name, score
                    ),
                    entities: vec![entity.id.clone()],
                    evidence_sentences,
                    edge_pairs: Vec::new(),
                    confidence,
                })
            })
            .collect()
    }

    /// Confidence for a closure of A-B-C
    fn triadic_confidence(
        &self,
        w_ab: f64,
        w_bc: f64,
        degree_b: usize,
        a: &Entity,
        c: &Entity,
    ) -> f64 {
        let boost = ((w_ab + w_bc) / (degree_b as f64).max(2.0)).clamp(0.0, TRIADIC_MAX_BOOST);
        let mut confidence = TRIADIC_BASE + boost;
        for endpoint in [a, c] {
            if self.denylist.contains_entity(endpoint) {
                confidence -= DENYLIST_PENALTY;
            }
        }
        round2(confidence.max(MIN_CONFIDENCE))
    }
}

/// State of one triadic-closure scan
struct TriadicSearch<'a> {
    engine: &'a HypothesisEngine,
    graph: &'a GraphStore,
    visited: HashSet<(String, String)>,
    found: Vec<Hypothesis>,
    limit: usize,
}

impl TriadicSearch<'_> {
    /// Close open triads around `b`; with an anchor, only pairs containing it
    ///
    /// Returns true once the limit is reached.
    fn around(&mut self, b: &str, anchor: Option<&str>) -> bool {
        let neighbors = self.graph.neighbors(b);
        for (i, &a) in neighbors.iter().enumerate() {
            for &c in &neighbors[i + 1..] {
                if anchor.is_some_and(|x| a != x && c != x) {
                    continue;
                }
                let (lo, hi) = pair_key(a, c);
                if !self.visited.insert((lo.to_string(), hi.to_string())) {
                    continue;
                }
                if self.graph.has_edge(a, c) {
                    continue;
                }
                if let Some(hypothesis) = self.hypothesis(a, b, c) {
                    self.found.push(hypothesis);
                    if self.found.len() >= self.limit {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn hypothesis(&self, a: &str, b: &str, c: &str) -> Option<Hypothesis> {
        let graph = self.graph;
        let (ea, eb, ec) = (graph.entity(a)?, graph.entity(b)?, graph.entity(c)?);
        let (ab, bc) = (graph.relationship(a, b)?, graph.relationship(b, c)?);

        let confidence = self
            .engine
            .triadic_confidence(ab.weight, bc.weight, graph.degree(b), ea, ec);
        let evidence_sentences = [ab.headline(), bc.headline()]
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();

        Some(Hypothesis {
            kind: HypothesisKind::TriadicClosure,
            title: format!(
                "Potential relationship between {} and {} via {}",
                ea.display_name, ec.display_name, eb.display_name
            ),
            explanation: format!(
                "{a} -> {b} (w={:.1}) and {b} -> {c} (w={:.1}) indicate a possible {a}-{c} link.",
                ab.weight,
                bc.weight,
                a = ea.display_name,
                b = eb.display_name,
                c = ec.display_name,
            ),
            entities: vec![a.to_string(), b.to_string(), c.to_string()],
            evidence_sentences,
            edge_pairs: vec![
                [a.to_string(), b.to_string()],
                [b.to_string(), c.to_string()],
            ],
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::{EntityRecord, EntityType, GraphBuilder, RelationshipRecord};
    use crate::domain::hypothesis::model::MAX_CONFIDENCE;

    fn graph(nodes: &[&str], edges: &[(&str, &str, f64, &str)]) -> GraphStore {
        let entities: Vec<EntityRecord> = nodes
            .iter()
            .map(|n| EntityRecord::keyed(*n, *n, EntityType::Entity, 1))
            .collect();
        let relationships: Vec<RelationshipRecord> = edges
            .iter()
            .map(|(a, b, w, ev)| {
                let rel = RelationshipRecord::new(*a, *b, *w);
                if ev.is_empty() { rel } else { rel.with_evidence([*ev]) }
            })
            .collect();
        GraphBuilder::new().build(&entities, &relationships)
    }

    fn abc() -> GraphStore {
        graph(
            &["A", "B", "C"],
            &[("A", "B", 2.0, "A binds B"), ("B", "C", 3.0, "B treats C")],
        )
    }

    fn in_bounds(hypotheses: &[Hypothesis]) -> bool {
        hypotheses
            .iter()
            .all(|h| (MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&h.confidence))
    }

    #[test]
    fn test_abc_triadic_closure() {
        let engine = HypothesisEngine::default();
        let found = engine.triadic_closures(&abc(), None, 10);

        assert_eq!(found.len(), 1);
        let h = &found[0];
        assert_eq!(h.kind, HypothesisKind::TriadicClosure);
        assert_eq!(h.entities, vec!["A", "B", "C"]);
        assert_eq!(h.evidence_sentences, vec!["A binds B", "B treats C"]);
        assert_eq!(h.confidence, 0.9);
        assert_eq!(h.edge_pairs.len(), 2);
        assert_eq!(h.title, "Potential relationship between A and C via B");
    }

    #[test]
    fn test_denylist_penalty() {
        let g = graph(
            &["cancer", "B", "cells"],
            &[("cancer", "B", 2.0, ""), ("B", "cells", 3.0, "")],
        );
        let found = HypothesisEngine::default().triadic_closures(&g, None, 10);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].confidence, 0.74);
        assert!(found[0].evidence_sentences.is_empty());
    }

    #[test]
    fn test_low_weight_confidence() {
        // (0.5 + 0.5) / max(2, 4) = 0.25
        let g = graph(
            &["A", "B", "C", "D", "E"],
            &[
                ("A", "B", 0.5, ""),
                ("B", "C", 0.5, ""),
                ("B", "D", 1.0, ""),
                ("B", "E", 1.0, ""),
            ],
        );
        let found = HypothesisEngine::default().triadic_closures(&g, None, 1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entities, vec!["A", "B", "C"]);
        assert_eq!(found[0].confidence, 0.75);
    }

    #[test]
    fn test_no_hypothesis_for_linked_pairs() {
        let triangle = graph(
            &["A", "B", "C"],
            &[("A", "B", 1.0, ""), ("B", "C", 1.0, ""), ("A", "C", 1.0, "")],
        );
        assert!(HypothesisEngine::default().triadic_closures(&triangle, None, 10).is_empty());
    }

    #[test]
    fn test_each_pair_once() {
        // square: A-C reachable via B and via D
        let square = graph(
            &["A", "B", "C", "D"],
            &[
                ("A", "B", 1.0, ""),
                ("B", "C", 1.0, ""),
                ("C", "D", 1.0, ""),
                ("D", "A", 1.0, ""),
            ],
        );
        let found = HypothesisEngine::default().triadic_closures(&square, None, 10);

        let pairs: Vec<(&str, &str)> = found.iter().filter_map(|h| h.proposed_pair()).collect();
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&("A", "C")));
        assert!(pairs.contains(&("B", "D")));
    }

    #[test]
    fn test_focus_restricts_search() {
        // X-Y-Z is a separate triad that must not show up
        let g = graph(
            &["A", "B", "C", "X", "Y", "Z"],
            &[
                ("A", "B", 1.0, ""),
                ("B", "C", 1.0, ""),
                ("X", "Y", 1.0, ""),
                ("Y", "Z", 1.0, ""),
            ],
        );
        let engine = HypothesisEngine::default();

        let around_a = engine.triadic_closures(&g, Some("a"), 10);
        assert_eq!(around_a.len(), 1);
        assert_eq!(around_a[0].proposed_pair(), Some(("A", "C")));

        let around_b = engine.triadic_closures(&g, Some("B"), 10);
        assert_eq!(around_b.len(), 1);

        let unknown = engine.triadic_closures(&g, Some("nobody"), 10);
        assert_eq!(unknown.len(), 2);
    }

    #[test]
    fn test_bridges() {
        let engine = HypothesisEngine::default();
        let bridges = engine.bridge_nodes(&abc(), 1);

        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].kind, HypothesisKind::BridgeNode);
        assert_eq!(bridges[0].entities, vec!["B"]);
        assert_eq!(bridges[0].confidence, 0.95);
        assert_eq!(bridges[0].evidence_sentences, vec!["A binds B", "B treats C"]);
    }

    #[test]
    fn test_bridges_need_three_nodes() {
        let g = graph(&["A", "B"], &[("A", "B", 1.0, "")]);
        assert!(HypothesisEngine::default().bridge_nodes(&g, 5).is_empty());
    }

    #[test]
    fn test_bridges_skip_generic_names() {
        let g = graph(
            &["A", "cancer", "C"],
            &[("A", "cancer", 1.0, ""), ("cancer", "C", 1.0, "")],
        );
        let bridges = HypothesisEngine::default().bridge_nodes(&g, 1);
        assert!(bridges.is_empty());
    }

    #[test]
    fn test_generate_mixes_and_backfills() {
        let results = HypothesisEngine::default().generate(&abc(), None, 10);

        assert_eq!(results[0].kind, HypothesisKind::TriadicClosure);
        assert_eq!(results.len(), 4);
        assert!(results[1..].iter().all(|h| h.kind == HypothesisKind::BridgeNode));
        assert!(in_bounds(&results));
    }

    #[test]
    fn test_generate_respects_budget() {
        let results = HypothesisEngine::default().generate(&abc(), None, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, HypothesisKind::TriadicClosure);
    }

    #[test]
    fn test_generate_falls_back_ignoring_denylist() {
        let g = graph(
            &["cancer", "disease", "cell"],
            &[
                ("cancer", "disease", 1.0, ""),
                ("disease", "cell", 1.0, ""),
                ("cancer", "cell", 1.0, ""),
            ],
        );
        let results = HypothesisEngine::default().generate(&g, None, 10);

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|h| h.kind == HypothesisKind::BridgeNode));
        assert!(in_bounds(&results));
    }

    #[test]
    fn test_generate_empty_graph() {
        let engine = HypothesisEngine::default();
        assert!(engine.generate(&GraphStore::new(), None, 10).is_empty());
        assert!(engine.generate(&abc(), None, 0).is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = HypothesisConfig {
            denylist: vec!["a".to_string()],
            triadic_share: 1.0,
            bridge_fallback: 0,
        };
        let engine = HypothesisEngine::from_config(&config);
        let results = engine.generate(&abc(), None, 2);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].confidence, 0.82);
        assert!(engine.denylist().contains("A"));
    }
}

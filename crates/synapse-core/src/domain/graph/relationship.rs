//! Relationships (edges) between biomedical entities
//!
//! Relationships are undirected. They carry an accumulated weight, a short
//! list of evidence sentences and a free-form type label supplied by the
//! relationship extractor.

use serde::{Deserialize, Serialize};

/// Label used when the extractor did not classify the relationship
pub const DEFAULT_RELATIONSHIP_TYPE: &str = "CO_OCCURRENCE";

/// Evidence sentences kept on a single edge
pub const MAX_EDGE_EVIDENCE: usize = 5;

/// Edge payload stored in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Accumulated strength
    pub weight: f64,
    /// Supporting sentences, deduplicated, first-seen order
    pub evidence: Vec<String>,
    /// Relationship label (CO_OCCURRENCE, INHIBITS, TREATS, ...)
    pub relationship_type: String,
}

impl Relationship {
    /// Create a co-occurrence relationship with the given weight
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            evidence: Vec::new(),
            relationship_type: DEFAULT_RELATIONSHIP_TYPE.to_string(),
        }
    }

    /// Set the evidence, deduplicating and capping it
    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = merge_evidence(&[], &evidence);
        self
    }

    /// Set the relationship type
    pub fn with_type(mut self, relationship_type: impl Into<String>) -> Self {
        self.relationship_type = relationship_type.into();
        self
    }

    /// Fold another observation of the same pair into this one
    ///
    /// Weights add, evidence is concatenated then deduplicated and capped, and
    /// the incoming type replaces the existing one.
    pub fn absorb(&mut self, incoming: &Relationship) {
        self.weight += incoming.weight;
        self.evidence = merge_evidence(&self.evidence, &incoming.evidence);
        self.relationship_type = incoming.relationship_type.clone();
    }

    /// First evidence sentence, if any
    pub fn headline(&self) -> Option<&str> {
        self.evidence.first().map(String::as_str)
    }

    /// At most `limit` evidence sentences
    pub fn evidence_sample(&self, limit: usize) -> Vec<String> {
        self.evidence.iter().take(limit).cloned().collect()
    }
}

/// Concatenate two evidence lists, drop repeats (first occurrence wins) and cap
pub fn merge_evidence(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(MAX_EDGE_EVIDENCE);
    for sentence in existing.iter().chain(incoming) {
        if merged.len() == MAX_EDGE_EVIDENCE {
            break;
        }
        if !merged.contains(sentence) {
            merged.push(sentence.clone());
        }
    }
    merged
}

/// Order an endpoint pair so that (a, b) and (b, a) share one key
pub fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_relationship_defaults() {
        let rel = Relationship::new(2.0);
        assert_eq!(rel.weight, 2.0);
        assert!(rel.evidence.is_empty());
        assert_eq!(rel.relationship_type, DEFAULT_RELATIONSHIP_TYPE);
        assert_eq!(rel.headline(), None);
    }

    #[test]
    fn test_merge_evidence_dedupes_in_order() {
        let merged = merge_evidence(&sentences(&["a", "b"]), &sentences(&["b", "c", "a"]));
        assert_eq!(merged, sentences(&["a", "b", "c"]));
    }

    #[test]
    fn test_merge_evidence_caps_at_five() {
        let merged = merge_evidence(
            &sentences(&["1", "2", "3"]),
            &sentences(&["4", "5", "6", "7"]),
        );
        assert_eq!(merged, sentences(&["1", "2", "3", "4", "5"]));
    }

    #[test]
    fn test_with_evidence_dedupes() {
        let rel = Relationship::new(1.0).with_evidence(sentences(&["x", "x", "y"]));
        assert_eq!(rel.evidence, sentences(&["x", "y"]));
    }

    #[test]
    fn test_absorb() {
        let mut rel = Relationship::new(2.0).with_evidence(sentences(&["a"]));
        let incoming = Relationship::new(1.5)
            .with_evidence(sentences(&["a", "b"]))
            .with_type("INHIBITS");

        rel.absorb(&incoming);

        assert_eq!(rel.weight, 3.5);
        assert_eq!(rel.evidence, sentences(&["a", "b"]));
        assert_eq!(rel.relationship_type, "INHIBITS");
    }

    #[test]
    fn test_pair_key_is_order_free() {
        assert_eq!(pair_key("b", "a"), ("a", "b"));
        assert_eq!(pair_key("a", "b"), ("a", "b"));
    }

    #[test]
    fn test_evidence_sample() {
        let rel = Relationship::new(1.0).with_evidence(sentences(&["1", "2", "3", "4"]));
        assert_eq!(rel.evidence_sample(3), sentences(&["1", "2", "3"]));
        assert_eq!(rel.evidence_sample(10).len(), 4);
    }
}

//! Hypothesis records

use serde::{Deserialize, Serialize};

/// Lowest confidence any hypothesis can carry
pub const MIN_CONFIDENCE: f64 = 0.3;

/// Highest confidence any hypothesis can carry
pub const MAX_CONFIDENCE: f64 = 0.95;

/// How a hypothesis was derived from the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HypothesisKind {
    /// A and C share neighbor B but are not linked
    TriadicClosure,
    /// A node sitting on many shortest paths
    BridgeNode,
}

impl HypothesisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TriadicClosure => "TRIADIC_CLOSURE",
            Self::BridgeNode => "BRIDGE_NODE",
        }
    }
}

impl std::fmt::Display for HypothesisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A candidate relationship or structural observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hypothesis {
    pub kind: HypothesisKind,
    pub title: String,
    pub explanation: String,
    /// Entity ids involved, intermediate in the middle for triadic closures
    pub entities: Vec<String>,
    pub evidence_sentences: Vec<String>,
    /// Existing edges supporting the claim
    pub edge_pairs: Vec<[String; 2]>,
    pub confidence: f64,
}

impl Hypothesis {
    /// Endpoints of a triadic closure, sorted
    pub fn proposed_pair(&self) -> Option<(&str, &str)> {
        match (self.kind, self.entities.as_slice()) {
            (HypothesisKind::TriadicClosure, [a, _, c]) => {
                Some(if a <= c { (a, c) } else { (c, a) })
            }
            _ => None,
        }
        .map(|(a, c)| (a.as_str(), c.as_str()))
    }
}

/// Round to two decimals
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.904), 0.9);
        assert_eq!(round2(0.666), 0.67);
        assert_eq!(round2(0.3), 0.3);
    }

    #[test]
    fn test_serialized_fields() {
        let hypothesis = Hypothesis {
            kind: HypothesisKind::TriadicClosure,
            title: "t".to_string(),
            explanation: "e".to_string(),
            entities: vec!["c".to_string(), "b".to_string(), "a".to_string()],
            evidence_sentences: vec![],
            edge_pairs: vec![["c".to_string(), "b".to_string()]],
            confidence: 0.5,
        };
        let json = serde_json::to_value(&hypothesis).unwrap();

        assert_eq!(json["kind"], "TRIADIC_CLOSURE");
        assert_eq!(json["edgePairs"][0][1], "b");
        assert!(json.get("evidenceSentences").is_some());
        assert_eq!(hypothesis.proposed_pair(), Some(("a", "c")));
    }
}

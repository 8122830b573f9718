//! Fuzzy entity-name resolution
//!
//! Binds free-text references ("the shortest path between tnf alpha and
//! infliximab") to graph node ids. Three strategies run in order and the
//! first one whose best candidate clears the threshold wins:
//!
//! 1. exact, case-insensitive, whitespace-collapsed
//! 2. substring containment, scored `len(shorter) / len(longer)`
//! 3. token overlap, scored `|shared| / max(|query tokens|, |name tokens|)`
//!
//! Every candidate is scored against both its id and its display name. Ties
//! keep the earliest candidate.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::graph::Entity;

/// Score a fuzzy match must exceed to be accepted
pub const RESOLVE_THRESHOLD: f64 = 0.3;

/// Which strategy produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStrategy {
    Exact,
    Substring,
    TokenOverlap,
}

/// A resolved entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMatch {
    pub id: String,
    pub display_name: String,
    pub score: f64,
    pub strategy: MatchStrategy,
}

/// True when the two names are equal ignoring case and spacing
pub fn exact_match(query: &str, name: &str) -> bool {
    let query = Entity::normalize(query);
    !query.is_empty() && query == Entity::normalize(name)
}

/// Containment ratio, `None` unless one name contains the other
pub fn substring_score(query: &str, name: &str) -> Option<f64> {
    let (query, name) = (Entity::normalize(query), Entity::normalize(name));
    if query.is_empty() || name.is_empty() {
        return None;
    }
    let (shorter, longer) = if query.chars().count() <= name.chars().count() {
        (&query, &name)
    } else {
        (&name, &query)
    };
    longer
        .contains(shorter.as_str())
        .then(|| shorter.chars().count() as f64 / longer.chars().count() as f64)
}

/// Share of tokens the two names have in common
pub fn token_overlap_score(query: &str, name: &str) -> f64 {
    let (query, name) = (tokens(query), tokens(name));
    let largest = query.len().max(name.len());
    if largest == 0 {
        return 0.0;
    }
    query.intersection(&name).count() as f64 / largest as f64
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Score one name with the first strategy that applies
///
/// Pure function: no threshold is applied here.
pub fn match_score(query: &str, name: &str) -> Option<(MatchStrategy, f64)> {
    if exact_match(query, name) {
        return Some((MatchStrategy::Exact, 1.0));
    }
    if let Some(score) = substring_score(query, name) {
        return Some((MatchStrategy::Substring, score));
    }
    let score = token_overlap_score(query, name);
    (score > 0.0).then_some((MatchStrategy::TokenOverlap, score))
}

/// Resolves names against candidate (id, display name) pairs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameResolver {
    threshold: f64,
}

impl Default for NameResolver {
    fn default() -> Self {
        Self {
            threshold: RESOLVE_THRESHOLD,
        }
    }
}

impl NameResolver {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Best candidate for the query, if any strategy clears the threshold
    pub fn resolve<'a>(
        &self,
        query: &str,
        candidates: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Option<EntityMatch> {
        if Entity::normalize(query).is_empty() {
            return None;
        }
        let candidates: Vec<(&str, &str)> = candidates.into_iter().collect();

        if let Some(&(id, display)) = candidates
            .iter()
            .find(|(id, display)| exact_match(query, id) || exact_match(query, display))
        {
            return Some(EntityMatch {
                id: id.to_string(),
                display_name: display.to_string(),
                score: 1.0,
                strategy: MatchStrategy::Exact,
            });
        }

        let substring = |name: &str| substring_score(query, name).unwrap_or(0.0);
        if let Some(found) = self.best(&candidates, MatchStrategy::Substring, substring) {
            return Some(found);
        }

        let overlap = |name: &str| token_overlap_score(query, name);
        self.best(&candidates, MatchStrategy::TokenOverlap, overlap)
    }

    /// Highest-scoring candidate for one strategy, earliest on ties
    fn best(
        &self,
        candidates: &[(&str, &str)],
        strategy: MatchStrategy,
        score: impl Fn(&str) -> f64,
    ) -> Option<EntityMatch> {
        let mut best: Option<(usize, f64)> = None;
        for (i, (id, display)) in candidates.iter().enumerate() {
            let candidate = score(id).max(score(display));
            if best.is_none_or(|(_, top)| candidate > top) {
                best = Some((i, candidate));
            }
        }

        let (i, top) = best?;
        if top <= self.threshold {
            return None;
        }
        let (id, display) = candidates[i];
        Some(EntityMatch {
            id: id.to_string(),
            display_name: display.to_string(),
            score: top,
            strategy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATES: &[(&str, &str)] = &[
        ("tnf", "TNF"),
        ("tumor necrosis factor alpha", "Tumor Necrosis Factor alpha"),
        ("infliximab", "Infliximab"),
        ("egfr", "EGFR"),
        ("egfr inhibitor", "EGFR inhibitor"),
    ];

    fn resolve(query: &str) -> Option<EntityMatch> {
        NameResolver::default().resolve(query, CANDIDATES.iter().copied())
    }

    #[test]
    fn test_exact_ignores_case_and_spacing() {
        let found = resolve("  Infliximab ").unwrap();
        assert_eq!(found.id, "infliximab");
        assert_eq!(found.strategy, MatchStrategy::Exact);
        assert_eq!(found.score, 1.0);
    }

    #[test]
    fn test_exact_beats_longer_substring() {
        let found = resolve("EGFR").unwrap();
        assert_eq!(found.id, "egfr");
        assert_eq!(found.strategy, MatchStrategy::Exact);
    }

    #[test]
    fn test_substring_ratio() {
        let found = resolve("inflix").unwrap();
        assert_eq!(found.id, "infliximab");
        assert_eq!(found.strategy, MatchStrategy::Substring);
        assert!((found.score - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_substring_below_threshold_falls_through_to_tokens() {
        // "tnf" inside "tnf alpha blockade" scores 3/18, too low
        let found = resolve("tnf alpha blockade").unwrap();
        assert_eq!(found.strategy, MatchStrategy::TokenOverlap);
        assert_eq!(found.id, "tnf");
        assert!((found.score - 1.0 / 3.0).abs() < 1e-12);

        let found = resolve("alpha factor tumor blockade").unwrap();
        assert_eq!(found.strategy, MatchStrategy::TokenOverlap);
        assert_eq!(found.id, "tumor necrosis factor alpha");
        assert!((found.score - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_token_overlap() {
        let found = resolve("necrosis factor of tumors").unwrap();
        assert_eq!(found.id, "tumor necrosis factor alpha");
        assert_eq!(found.strategy, MatchStrategy::TokenOverlap);
        assert!((found.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_no_match() {
        assert!(resolve("metformin").is_none());
        assert!(resolve("   ").is_none());
    }

    #[test]
    fn test_ties_keep_earliest() {
        let candidates = [("abcd", "abcd"), ("dcba abcd", "x"), ("abcdxy", "abcdxy")];
        let found = NameResolver::default()
            .resolve("abc", candidates.iter().copied())
            .unwrap();
        assert_eq!(found.id, "abcd");
    }

    #[test]
    fn test_custom_threshold() {
        let strict = NameResolver::new(0.9);
        assert!(strict.resolve("inflix", CANDIDATES.iter().copied()).is_none());
        assert_eq!(strict.threshold(), 0.9);
    }

    #[test]
    fn test_match_score_is_pure() {
        assert_eq!(match_score("TNF", "tnf"), Some((MatchStrategy::Exact, 1.0)));
        assert_eq!(
            match_score("egfr", "egfr inhibitor"),
            Some((MatchStrategy::Substring, 4.0 / 14.0))
        );
        assert_eq!(
            match_score("kinase inhibitor", "egfr inhibitor"),
            Some((MatchStrategy::TokenOverlap, 0.5))
        );
        assert_eq!(match_score("aspirin", "egfr"), None);
    }

    #[test]
    fn test_tokens_split_on_punctuation() {
        assert_eq!(token_overlap_score("TNF-alpha", "alpha tnf"), 1.0);
        assert_eq!(token_overlap_score("", ""), 0.0);
    }
}

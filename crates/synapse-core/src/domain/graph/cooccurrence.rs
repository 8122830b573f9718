//! Sentence co-occurrence aggregation
//!
//! Turns per-sentence entity mentions (already produced by NER) into a
//! [`RecordBatch`]. Two entities mentioned in the same sentence are linked;
//! every shared sentence adds one to the pair's weight. Optionally a small
//! set of verb patterns ("X inhibits Y") upgrades a pair to a typed
//! relationship.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ExtractionConfig;
use crate::error::Result;

use super::entity::{Entity, EntityType};
use super::record::{EntityRecord, RecordBatch, RelationshipRecord, deserialize_entity_type};
use super::relationship::{DEFAULT_RELATIONSHIP_TYPE, merge_evidence};

/// Weight a verb-pattern match adds to a pair
const PATTERN_WEIGHT: f64 = 2.0;

const RELATION_PATTERNS: &[(&str, &str)] = &[
    (r"(\w+)\s+(causes?|induces?|triggers?|leads to|results in)\s+(\w+)", "CAUSES"),
    (r"(\w+)\s+(is caused by|is induced by|is triggered by)\s+(\w+)", "CAUSED_BY"),
    (r"(\w+)\s+(inhibits?|blocks?|suppresses?|prevents?)\s+(\w+)", "INHIBITS"),
    (r"(\w+)\s+(is inhibited by|is blocked by|is suppressed by)\s+(\w+)", "INHIBITED_BY"),
    (r"(\w+)\s+(associates? with|interacts? with|binds? to)\s+(\w+)", "INTERACTS_WITH"),
    (r"(\w+)\s+(treats?|ameliorates?|reduces?)\s+(\w+)", "TREATS"),
    (r"(\w+)\s+(expresses?|activates?|upregulates?|downregulates?)\s+(\w+)", "REGULATES"),
];

/// One entity mention inside a sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub text: String,
    #[serde(
        rename = "type",
        alias = "label",
        default,
        deserialize_with = "deserialize_entity_type"
    )]
    pub entity_type: EntityType,
}

impl Mention {
    pub fn new(text: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            text: text.into(),
            entity_type,
        }
    }
}

/// A sentence with the mentions found in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceMentions {
    pub sentence: String,
    #[serde(default)]
    pub entities: Vec<Mention>,
}

impl SentenceMentions {
    pub fn new(sentence: impl Into<String>, entities: Vec<Mention>) -> Self {
        Self {
            sentence: sentence.into(),
            entities,
        }
    }
}

/// Accumulated state for one unordered entity pair
#[derive(Debug)]
struct PairStats {
    source: String,
    target: String,
    weight: f64,
    evidence: Vec<String>,
    relationship_type: String,
}

/// Builds record batches from sentence mentions
#[derive(Debug, Clone)]
pub struct CooccurrenceExtractor {
    min_relationship_strength: u32,
    evidence_per_pair: usize,
    min_entity_mentions: u32,
    patterns: Vec<(Regex, &'static str)>,
}

impl CooccurrenceExtractor {
    /// Create an extractor from the extraction settings
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let patterns = if config.semantic_patterns {
            RELATION_PATTERNS
                .iter()
                .map(|(pattern, label)| Ok((Regex::new(&format!("(?i){}", pattern))?, *label)))
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };

        Ok(Self {
            min_relationship_strength: config.min_relationship_strength.max(1),
            evidence_per_pair: config.evidence_per_pair,
            min_entity_mentions: config.min_entity_mentions.max(1),
            patterns,
        })
    }

    /// Aggregate sentences into entity and relationship records
    pub fn extract(&self, sentences: &[SentenceMentions]) -> RecordBatch {
        // sentences mentioning each key, first-seen order
        let mut order: Vec<String> = Vec::new();
        let mut first_seen: HashMap<String, (String, EntityType)> = HashMap::new();
        let mut mentions: HashMap<String, u32> = HashMap::new();

        for sentence in sentences {
            let mut seen = HashSet::new();
            for mention in &sentence.entities {
                let key = Entity::normalize(&mention.text);
                if key.is_empty() {
                    continue;
                }
                if !first_seen.contains_key(&key) {
                    let name = mention.text.trim().to_string();
                    first_seen.insert(key.clone(), (name, mention.entity_type));
                    order.push(key.clone());
                }
                if seen.insert(key.clone()) {
                    *mentions.entry(key).or_insert(0) += 1;
                }
            }
        }

        let kept = |key: &str| mentions.get(key).copied().unwrap_or(0) >= self.min_entity_mentions;

        let mut pairs: Vec<PairStats> = Vec::new();
        let mut pair_index: HashMap<(String, String), usize> = HashMap::new();

        for sentence in sentences {
            let mut keys: Vec<String> = Vec::new();
            for mention in &sentence.entities {
                let key = Entity::normalize(&mention.text);
                if !key.is_empty() && kept(key.as_str()) && !keys.contains(&key) {
                    keys.push(key);
                }
            }

            for (i, a) in keys.iter().enumerate() {
                for b in &keys[i + 1..] {
                    let stats = pair_entry(&mut pairs, &mut pair_index, a, b);
                    stats.weight += 1.0;
                    if stats.evidence.len() < self.evidence_per_pair
                        && !stats.evidence.contains(&sentence.sentence)
                    {
                        stats.evidence.push(sentence.sentence.clone());
                    }
                }
            }
        }

        let min_weight = f64::from(self.min_relationship_strength);
        let before = pairs.len();
        pairs.retain(|p| p.weight >= min_weight);
        pair_index = pairs
            .iter()
            .enumerate()
            .map(|(i, p)| ((p.source.clone(), p.target.clone()), i))
            .collect();

        let mut pattern_hits = 0usize;
        for sentence in sentences {
            for (regex, label) in &self.patterns {
                for captures in regex.captures_iter(&sentence.sentence) {
                    let (Some(source), Some(target)) = (captures.get(1), captures.get(3)) else {
                        continue;
                    };
                    let a = Entity::normalize(source.as_str());
                    let b = Entity::normalize(target.as_str());
                    if a == b || !kept(a.as_str()) || !kept(b.as_str()) {
                        continue;
                    }

                    let stats = pair_entry(&mut pairs, &mut pair_index, &a, &b);
                    stats.weight += PATTERN_WEIGHT;
                    stats.evidence = merge_evidence(&stats.evidence, &[sentence.sentence.clone()]);
                    stats.relationship_type = label.to_string();
                    pattern_hits += 1;
                }
            }
        }

        let entities: Vec<EntityRecord> = order
            .into_iter()
            .filter(|key| kept(key.as_str()))
            .filter_map(|key| {
                let (name, entity_type) = first_seen.get(&key)?.clone();
                let count = mentions.get(&key).copied().unwrap_or(1);
                Some(EntityRecord::keyed(key, name, entity_type, count))
            })
            .collect();

        let relationships: Vec<RelationshipRecord> = pairs
            .into_iter()
            .map(|p| RelationshipRecord {
                source: p.source,
                target: p.target,
                weight: p.weight,
                evidence: p.evidence.into_iter().take(self.evidence_per_pair).collect(),
                relationship_type: p.relationship_type,
            })
            .collect();

        debug!(
            sentences = sentences.len(),
            entities = entities.len(),
            relationships = relationships.len(),
            weak_pairs = before.saturating_sub(relationships.len()),
            pattern_hits,
            "Co-occurrence extraction finished"
        );

        RecordBatch::new(entities, relationships)
    }
}

/// Stats for the sorted pair, created on first sight
fn pair_entry<'a>(
    pairs: &'a mut Vec<PairStats>,
    index: &mut HashMap<(String, String), usize>,
    a: &str,
    b: &str,
) -> &'a mut PairStats {
    let (source, target) = if a <= b { (a, b) } else { (b, a) };
    let key = (source.to_string(), target.to_string());
    let slot = *index.entry(key).or_insert_with(|| {
        pairs.push(PairStats {
            source: source.to_string(),
            target: target.to_string(),
            weight: 0.0,
            evidence: Vec::new(),
            relationship_type: DEFAULT_RELATIONSHIP_TYPE.to_string(),
        });
        pairs.len() - 1
    });
    &mut pairs[slot]
}

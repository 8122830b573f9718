//! Input records produced by the extraction collaborator
//!
//! These are the boundary types. They are validated once on the way in and
//! the graph algorithms assume validated input afterwards.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

use super::entity::{Entity, EntityType};
use super::relationship::{DEFAULT_RELATIONSHIP_TYPE, Relationship};
use super::store::GraphStore;

/// Entity record as emitted by NER
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    pub normalized_key: String,
    pub original_name: String,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "deserialize_entity_type"
    )]
    pub entity_type: EntityType,
    #[serde(default = "default_count")]
    pub count: u32,
}

/// Relationship record as emitted by the relationship extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipRecord {
    pub source: String,
    pub target: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default = "default_relationship_type")]
    pub relationship_type: String,
}

/// A set of entity and relationship records describing one graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBatch {
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,
}

fn default_count() -> u32 {
    1
}

fn default_weight() -> f64 {
    1.0
}

fn default_relationship_type() -> String {
    DEFAULT_RELATIONSHIP_TYPE.to_string()
}

pub(crate) fn deserialize_entity_type<'de, D>(
    deserializer: D,
) -> std::result::Result<EntityType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    EntityType::parse(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown entity type '{}'", raw)))
}

impl EntityRecord {
    /// Create a record whose key is derived from the name
    pub fn new(name: impl Into<String>, entity_type: EntityType) -> Self {
        let original_name = name.into();
        Self {
            normalized_key: Entity::normalize(&original_name),
            original_name,
            entity_type,
            count: 1,
        }
    }

    /// Create a record with an explicit key
    pub fn keyed(
        key: impl Into<String>,
        original_name: impl Into<String>,
        entity_type: EntityType,
        count: u32,
    ) -> Self {
        Self {
            normalized_key: key.into(),
            original_name: original_name.into(),
            entity_type,
            count,
        }
    }

    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidEntity {
            key: self.normalized_key.clone(),
            reason: reason.to_string(),
        };

        if self.normalized_key.trim().is_empty() {
            return Err(invalid("normalizedKey must not be empty"));
        }
        if self.count == 0 {
            return Err(invalid("count must be at least 1"));
        }
        Ok(())
    }

    /// Convert into a graph node
    pub fn to_entity(&self) -> Entity {
        let display_name = if self.original_name.trim().is_empty() {
            self.normalized_key.clone()
        } else {
            self.original_name.clone()
        };
        Entity {
            id: self.normalized_key.clone(),
            display_name,
            entity_type: self.entity_type,
            occurrence_count: self.count.max(1),
        }
    }

    /// Build a record back from a graph node
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            normalized_key: entity.id.clone(),
            original_name: entity.display_name.clone(),
            entity_type: entity.entity_type,
            count: entity.occurrence_count,
        }
    }
}

impl RelationshipRecord {
    /// Create a co-occurrence record
    pub fn new(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
            evidence: Vec::new(),
            relationship_type: default_relationship_type(),
        }
    }

    /// Attach evidence sentences
    pub fn with_evidence<S: Into<String>>(mut self, evidence: impl IntoIterator<Item = S>) -> Self {
        self.evidence = evidence.into_iter().map(Into::into).collect();
        self
    }

    /// Set the relationship type
    pub fn with_type(mut self, relationship_type: impl Into<String>) -> Self {
        self.relationship_type = relationship_type.into();
        self
    }

    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidRelationship {
            source_id: self.source.clone(),
            target_id: self.target.clone(),
            reason: reason.to_string(),
        };

        if self.source.trim().is_empty() || self.target.trim().is_empty() {
            return Err(invalid("endpoints must not be empty"));
        }
        if self.source == self.target {
            return Err(invalid("self loops are not allowed"));
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(invalid("weight must be finite and non-negative"));
        }
        if self.relationship_type.trim().is_empty() {
            return Err(invalid("relationshipType must not be empty"));
        }
        Ok(())
    }

    /// Edge payload for this record
    pub fn to_relationship(&self) -> Relationship {
        Relationship::new(self.weight)
            .with_evidence(self.evidence.clone())
            .with_type(self.relationship_type.clone())
    }
}

impl RecordBatch {
    /// Create a batch from entity and relationship records
    pub fn new(entities: Vec<EntityRecord>, relationships: Vec<RelationshipRecord>) -> Self {
        Self {
            entities,
            relationships,
        }
    }

    /// Parse and validate a JSON batch
    pub fn from_json(json: &str) -> Result<Self> {
        let batch: RecordBatch = serde_json::from_str(json)?;
        batch.validate()?;
        Ok(batch)
    }

    /// Validate every record, stopping at the first failure
    pub fn validate(&self) -> Result<()> {
        for entity in &self.entities {
            entity.validate()?;
        }
        for relationship in &self.relationships {
            relationship.validate()?;
        }
        Ok(())
    }

    /// True when the batch has no records at all
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }

    /// Records describing an existing graph, insertion order
    pub fn from_graph(graph: &GraphStore) -> Self {
        let entities = graph.entities().map(EntityRecord::from_entity).collect();
        let relationships = graph
            .relationships()
            .map(|(source, target, rel)| RelationshipRecord {
                source: source.to_string(),
                target: target.to_string(),
                weight: rel.weight,
                evidence: rel.evidence.clone(),
                relationship_type: rel.relationship_type.clone(),
            })
            .collect();
        Self {
            entities,
            relationships,
        }
    }
}

//! Biomedical entity types for the knowledge graph
//!
//! Entities are the nodes of the graph. They are produced by the extraction
//! collaborator and carry a normalized key, the first-seen surface form and
//! a mention count.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A biomedical entity node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Normalized key, unique within a graph
    pub id: String,
    /// Original casing of the first mention
    pub display_name: String,
    /// Entity category assigned by NER
    pub entity_type: EntityType,
    /// Number of mentions across the source documents
    pub occurrence_count: u32,
}

impl Entity {
    /// Create a new entity with a single occurrence
    pub fn new(id: impl Into<String>, entity_type: EntityType) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            entity_type,
            occurrence_count: 1,
        }
    }

    /// Set the display name
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Set the occurrence count (at least 1)
    pub fn with_count(mut self, count: u32) -> Self {
        self.occurrence_count = count.max(1);
        self
    }

    /// Normalize a surface form into an entity key
    ///
    /// Lowercases and collapses runs of whitespace.
    pub fn normalize(name: &str) -> String {
        name.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

/// Biomedical entity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    /// Genes, proteins and other gene products
    GeneOrGeneProduct,
    /// Small molecules and drugs
    Chemical,
    /// Diseases and disorders
    Disease,
    /// Organisms and species
    Organism,
    /// Cell types and lines
    CellType,
    /// Tissues
    Tissue,
    /// Organs
    Organ,
    /// Generic biomedical entity
    Entity,
    /// Unrecognized label
    Unknown,
}

impl Default for EntityType {
    fn default() -> Self {
        Self::Unknown
    }
}

impl EntityType {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeneOrGeneProduct => "GENE_OR_GENE_PRODUCT",
            Self::Chemical => "CHEMICAL",
            Self::Disease => "DISEASE",
            Self::Organism => "ORGANISM",
            Self::CellType => "CELL_TYPE",
            Self::Tissue => "TISSUE",
            Self::Organ => "ORGAN",
            Self::Entity => "ENTITY",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "GENE_OR_GENE_PRODUCT" | "GENE" | "PROTEIN" => Some(Self::GeneOrGeneProduct),
            "CHEMICAL" | "SIMPLE_CHEMICAL" | "DRUG" => Some(Self::Chemical),
            "DISEASE" | "CANCER" => Some(Self::Disease),
            "ORGANISM" => Some(Self::Organism),
            "CELL_TYPE" | "CELL" => Some(Self::CellType),
            "TISSUE" => Some(Self::Tissue),
            "ORGAN" => Some(Self::Organ),
            "ENTITY" => Some(Self::Entity),
            "UNKNOWN" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Parse from string, rejecting unknown labels
    pub fn parse_strict(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::UnknownEntityType(s.to_string()))
    }

    /// Get all entity types
    pub fn all() -> &'static [EntityType] {
        &[
            Self::GeneOrGeneProduct,
            Self::Chemical,
            Self::Disease,
            Self::Organism,
            Self::CellType,
            Self::Tissue,
            Self::Organ,
            Self::Entity,
            Self::Unknown,
        ]
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_creation() {
        let entity = Entity::new("egfr", EntityType::GeneOrGeneProduct)
            .with_display_name("EGFR")
            .with_count(4);

        assert_eq!(entity.id, "egfr");
        assert_eq!(entity.display_name, "EGFR");
        assert_eq!(entity.entity_type, EntityType::GeneOrGeneProduct);
        assert_eq!(entity.occurrence_count, 4);
    }

    #[test]
    fn test_count_floor() {
        let entity = Entity::new("x", EntityType::Unknown).with_count(0);
        assert_eq!(entity.occurrence_count, 1);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(Entity::normalize("EGFR"), "egfr");
        assert_eq!(Entity::normalize("  Tumor   Necrosis Factor "), "tumor necrosis factor");
        assert_eq!(Entity::normalize("IL-6"), "il-6");
    }

    #[test]
    fn test_entity_type_parsing() {
        assert_eq!(EntityType::parse("CHEMICAL"), Some(EntityType::Chemical));
        assert_eq!(EntityType::parse("simple_chemical"), Some(EntityType::Chemical));
        assert_eq!(EntityType::parse("cell type"), Some(EntityType::CellType));
        assert_eq!(EntityType::parse("gene-or-gene-product"), Some(EntityType::GeneOrGeneProduct));
        assert_eq!(EntityType::parse("virus"), None);
        assert!(EntityType::parse_strict("virus").is_err());
    }

    #[test]
    fn test_entity_type_serde() {
        let json = serde_json::to_string(&EntityType::GeneOrGeneProduct).unwrap();
        assert_eq!(json, "\"GENE_OR_GENE_PRODUCT\"");

        let parsed: EntityType = serde_json::from_str("\"CELL_TYPE\"").unwrap();
        assert_eq!(parsed, EntityType::CellType);
    }

    #[test]
    fn test_as_str_matches_serde() {
        for entity_type in EntityType::all() {
            let json = serde_json::to_string(entity_type).unwrap();
            assert_eq!(json, format!("\"{}\"", entity_type.as_str()));
            assert_eq!(EntityType::parse(entity_type.as_str()), Some(*entity_type));
        }
    }
}

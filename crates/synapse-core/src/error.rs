//! Error types for Synapse

use thiserror::Error;

/// Result type alias using Synapse's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Synapse error types with helpful messages and suggestions
///
/// Query and analytics paths degrade to empty results instead of failing, so
/// these surface at the input boundary or while compiling extraction patterns.
#[derive(Error, Debug)]
pub enum Error {
    // Record errors (E001-E099)
    #[error("Invalid entity record '{key}': {reason}")]
    InvalidEntity { key: String, reason: String },

    #[error("Invalid relationship record '{source_id}' -> '{target_id}': {reason}")]
    InvalidRelationship {
        source_id: String,
        target_id: String,
        reason: String,
    },

    #[error("Unknown entity type '{0}'")]
    UnknownEntityType(String),

    // Input errors (E100-E199)
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidEntity { .. } => "E001",
            Self::InvalidRelationship { .. } => "E002",
            Self::UnknownEntityType(_) => "E003",
            Self::Json(_) => "E101",
            Self::Pattern(_) => "E102",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::InvalidEntity { .. } => {
                Some("Entity records need a non-empty normalizedKey and count >= 1".to_string())
            }
            Self::InvalidRelationship { .. } => Some(
                "Relationship records need two distinct endpoints and a finite, non-negative weight"
                    .to_string(),
            ),
            Self::UnknownEntityType(_) => Some(format!(
                "Valid types: {}",
                crate::domain::graph::EntityType::all()
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            Self::Pattern(_) => Some("Check `extraction.semantic_patterns`".to_string()),
            _ => None,
        }
    }

    /// True when the error came from caller-supplied data rather than the environment
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidEntity { .. }
                | Self::InvalidRelationship { .. }
                | Self::UnknownEntityType(_)
                | Self::Json(_)
        )
    }
}

//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Synapse configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub hypothesis: HypothesisConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HypothesisConfig {
    /// Generic entity names that lower hypothesis confidence
    pub denylist: Vec<String>,
    /// Share of the result budget given to triadic-closure hypotheses
    pub triadic_share: f64,
    /// Bridge hypotheses returned when nothing else was found
    pub bridge_fallback: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Minimum score a fuzzy name match must exceed
    pub resolve_threshold: f64,
    /// Evidence sentences attached to each edge in query results
    pub evidence_per_edge: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Number of nodes reported in centrality scores
    pub top_centrality: usize,
    /// Seed for shuffling Louvain's visiting order (ordered sweep when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub louvain_seed: Option<u64>,
    /// Upper bound on Louvain aggregation levels
    pub louvain_max_passes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Co-occurrences needed before a pair becomes a relationship
    pub min_relationship_strength: u32,
    /// Evidence sentences kept per co-occurring pair
    pub evidence_per_pair: usize,
    /// Sentences an entity must appear in to be kept
    pub min_entity_mentions: u32,
    /// Also classify pairs with verb patterns ("X inhibits Y")
    pub semantic_patterns: bool,
}

pub const DEFAULT_DENYLIST: &[&str] = &[
    "cancer",
    "nsclc",
    "disease",
    "cell",
    "cells",
    "protein",
    "gene",
    "micrornas",
    "inflammation",
    "therapy",
    "treatment",
    "pathway",
    "field cancerization",
];

impl Default for HypothesisConfig {
    fn default() -> Self {
        Self {
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            triadic_share: 0.8,
            bridge_fallback: 3,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            resolve_threshold: 0.3,
            evidence_per_edge: 3,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_centrality: 20,
            louvain_seed: None,
            louvain_max_passes: 32,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_relationship_strength: 1,
            evidence_per_pair: 3,
            min_entity_mentions: 1,
            semantic_patterns: true,
        }
    }
}

const KEYS: &[&str] = &[
    "hypothesis.denylist",
    "hypothesis.triadic_share",
    "hypothesis.bridge_fallback",
    "query.resolve_threshold",
    "query.evidence_per_edge",
    "analytics.top_centrality",
    "analytics.louvain_seed",
    "analytics.louvain_max_passes",
    "extraction.min_relationship_strength",
    "extraction.evidence_per_pair",
    "extraction.min_entity_mentions",
    "extraction.semantic_patterns",
];

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("SYNAPSE_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("synapse")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location, or defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file, or defaults if it doesn't exist
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.hypothesis.triadic_share) {
            return Err(anyhow!("hypothesis.triadic_share must be between 0.0 and 1.0"));
        }
        if !(0.0..1.0).contains(&self.query.resolve_threshold) {
            return Err(anyhow!("query.resolve_threshold must be in [0.0, 1.0)"));
        }
        if self.analytics.louvain_max_passes == 0 {
            return Err(anyhow!("analytics.louvain_max_passes must be at least 1"));
        }
        if self.extraction.min_relationship_strength == 0 {
            return Err(anyhow!("extraction.min_relationship_strength must be at least 1"));
        }
        if self.extraction.min_entity_mentions == 0 {
            return Err(anyhow!("extraction.min_entity_mentions must be at least 1"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "hypothesis.denylist" => Ok(self.hypothesis.denylist.join(", ")),
            "hypothesis.triadic_share" => Ok(self.hypothesis.triadic_share.to_string()),
            "hypothesis.bridge_fallback" => Ok(self.hypothesis.bridge_fallback.to_string()),

            "query.resolve_threshold" => Ok(self.query.resolve_threshold.to_string()),
            "query.evidence_per_edge" => Ok(self.query.evidence_per_edge.to_string()),

            "analytics.top_centrality" => Ok(self.analytics.top_centrality.to_string()),
            "analytics.louvain_seed" => Ok(self
                .analytics
                .louvain_seed
                .map(|s| s.to_string())
                .unwrap_or_else(|| "(unset)".to_string())),
            "analytics.louvain_max_passes" => Ok(self.analytics.louvain_max_passes.to_string()),

            "extraction.min_relationship_strength" => {
                Ok(self.extraction.min_relationship_strength.to_string())
            }
            "extraction.evidence_per_pair" => Ok(self.extraction.evidence_per_pair.to_string()),
            "extraction.min_entity_mentions" => Ok(self.extraction.min_entity_mentions.to_string()),
            "extraction.semantic_patterns" => Ok(self.extraction.semantic_patterns.to_string()),

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `synapse config show` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "hypothesis.denylist" => {
                self.hypothesis.denylist = value
                    .split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            "hypothesis.triadic_share" => {
                let share: f64 = value
                    .parse()
                    .with_context(|| format!("Invalid triadic_share value: {}", value))?;
                if !(0.0..=1.0).contains(&share) {
                    return Err(anyhow!("Triadic share must be between 0.0 and 1.0"));
                }
                self.hypothesis.triadic_share = share;
            }
            "hypothesis.bridge_fallback" => {
                self.hypothesis.bridge_fallback = value
                    .parse()
                    .with_context(|| format!("Invalid bridge_fallback value: {}", value))?;
            }

            "query.resolve_threshold" => {
                let threshold: f64 = value
                    .parse()
                    .with_context(|| format!("Invalid resolve_threshold value: {}", value))?;
                if !(0.0..1.0).contains(&threshold) {
                    return Err(anyhow!("Resolve threshold must be in [0.0, 1.0)"));
                }
                self.query.resolve_threshold = threshold;
            }
            "query.evidence_per_edge" => {
                self.query.evidence_per_edge = value
                    .parse()
                    .with_context(|| format!("Invalid evidence_per_edge value: {}", value))?;
            }

            "analytics.top_centrality" => {
                self.analytics.top_centrality = value
                    .parse()
                    .with_context(|| format!("Invalid top_centrality value: {}", value))?;
            }
            "analytics.louvain_seed" => {
                self.analytics.louvain_seed = match value.trim() {
                    "" | "none" | "unset" => None,
                    seed => Some(
                        seed.parse()
                            .with_context(|| format!("Invalid louvain_seed value: {}", value))?,
                    ),
                };
            }
            "analytics.louvain_max_passes" => {
                let passes: usize = value
                    .parse()
                    .with_context(|| format!("Invalid louvain_max_passes value: {}", value))?;
                if passes == 0 {
                    return Err(anyhow!("Louvain max passes must be at least 1"));
                }
                self.analytics.louvain_max_passes = passes;
            }

            "extraction.min_relationship_strength" => {
                let strength: u32 = value.parse().with_context(|| {
                    format!("Invalid min_relationship_strength value: {}", value)
                })?;
                if strength == 0 {
                    return Err(anyhow!("Minimum relationship strength must be at least 1"));
                }
                self.extraction.min_relationship_strength = strength;
            }
            "extraction.evidence_per_pair" => {
                self.extraction.evidence_per_pair = value
                    .parse()
                    .with_context(|| format!("Invalid evidence_per_pair value: {}", value))?;
            }
            "extraction.min_entity_mentions" => {
                let mentions: u32 = value
                    .parse()
                    .with_context(|| format!("Invalid min_entity_mentions value: {}", value))?;
                if mentions == 0 {
                    return Err(anyhow!("Minimum entity mentions must be at least 1"));
                }
                self.extraction.min_entity_mentions = mentions;
            }
            "extraction.semantic_patterns" => {
                self.extraction.semantic_patterns = value
                    .parse()
                    .with_context(|| format!("Invalid semantic_patterns value: {}", value))?;
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `synapse config show` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        KEYS.iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

//! Annotator configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user file only needs the keys it wants to override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [gazetteer]
//! people = "gazetteer/people.json"     # JSON array of {name, aliases}
//! places = "gazetteer/places.txt"      # one term per line, or a JSON array
//! keywords = "gazetteer/keywords.txt"  # one term per line, or a JSON array
//!
//! [matching]
//! common_short_words = ["a", "am", "an", ...]
//!
//! [render]
//! ruleset = "annotate-v1"      # bump to invalidate cached annotations
//! embed_version = true         # prefix documents with a version marker comment
//! paragraph_class = "annotated-paragraph"
//!
//! [processing]
//! max_processes = 4            # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Paths in `[gazetteer]` are relative to the directory holding the config
//! file. Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Short English function words that also occur as (rare) personal names.
///
/// A person term equal to one of these only matches with its exact casing.
pub const DEFAULT_COMMON_SHORT_WORDS: &[&str] = &[
    "a", "am", "an", "and", "are", "as", "at", "be", "but", "by", "can", "did", "do", "for",
    "go", "had", "has", "he", "her", "him", "his", "i", "if", "in", "is", "it", "let", "may",
    "me", "my", "no", "not", "of", "on", "or", "our", "put", "saw", "say", "see", "she", "so",
    "the", "to", "up", "us", "was", "we", "who", "why", "yet", "you",
];

/// Top-level configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotatorConfig {
    /// Where the three term lists live.
    pub gazetteer: GazetteerConfig,
    /// Matcher tuning.
    pub matching: MatchingConfig,
    /// Markup and version-marker settings.
    pub render: RenderConfig,
    /// Parallel batch settings.
    pub processing: ProcessingConfig,
}

impl AnnotatorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ruleset = &self.render.ruleset;
        if ruleset.is_empty() {
            return Err(ConfigError::Validation(
                "render.ruleset must not be empty".into(),
            ));
        }
        // HTML comments may not contain "--" anywhere.
        if ruleset.chars().any(char::is_whitespace) || ruleset.contains("--") {
            return Err(ConfigError::Validation(
                "render.ruleset must not contain whitespace or \"--\"".into(),
            ));
        }
        if self.render.paragraph_class.trim().is_empty() {
            return Err(ConfigError::Validation(
                "render.paragraph_class must not be empty".into(),
            ));
        }
        if let Some(word) = self
            .matching
            .common_short_words
            .iter()
            .find(|w| w.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "matching.common_short_words contains a blank entry: {word:?}"
            )));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The subset of settings the engine needs.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            common_short_words: self.matching.common_short_words.clone(),
            ruleset: self.render.ruleset.clone(),
            embed_version: self.render.embed_version,
            paragraph_class: self.render.paragraph_class.clone(),
        }
    }
}

/// Gazetteer source files. A missing entry means an empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GazetteerConfig {
    pub people: Option<String>,
    pub places: Option<String>,
    pub keywords: Option<String>,
}

impl Default for GazetteerConfig {
    fn default() -> Self {
        Self {
            people: Some("gazetteer/people.json".to_string()),
            places: Some("gazetteer/places.txt".to_string()),
            keywords: Some("gazetteer/keywords.txt".to_string()),
        }
    }
}

/// Matcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingConfig {
    /// Person terms equal to one of these (case-insensitively) must match
    /// with the gazetteer's exact casing.
    pub common_short_words: Vec<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            common_short_words: DEFAULT_COMMON_SHORT_WORDS
                .iter()
                .map(|w| w.to_string())
                .collect(),
        }
    }
}

/// Markup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Ruleset name embedded in the version marker.
    pub ruleset: String,
    /// Whether document renders start with a version marker comment.
    pub embed_version: bool,
    /// Class of the paragraph wrapper emitted by plain-text rendering.
    pub paragraph_class: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ruleset: "annotate-v1".to_string(),
            embed_version: true,
            paragraph_class: "annotated-paragraph".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel annotation workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Settings the [`Annotator`](crate::engine::Annotator) is built with.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub common_short_words: Vec<String>,
    pub ruleset: String,
    pub embed_version: bool,
    pub paragraph_class: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        AnnotatorConfig::default().engine()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(AnnotatorConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<AnnotatorConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AnnotatorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a `config.toml` path.
///
/// A missing file yields the stock defaults; a present file is merged on top
/// of them, unknown keys rejected, and the result validated.
pub fn load_config(path: &Path) -> Result<AnnotatorConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return resolve_config(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Verse Annotator Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Gazetteer sources
# ---------------------------------------------------------------------------
[gazetteer]
# Paths are relative to the directory containing this file.
# people: JSON array of {"name": "...", "aliases": ["..."]} records.
people = "gazetteer/people.json"
# places / keywords: one term per line ('#' starts a comment),
# or a JSON array of strings when the file ends in .json.
places = "gazetteer/places.txt"
keywords = "gazetteer/keywords.txt"

# ---------------------------------------------------------------------------
# Matching
# ---------------------------------------------------------------------------
[matching]
# Person names that double as common English words. A person term equal to
# one of these only matches with its exact capitalization.
common_short_words = [
    "a", "am", "an", "and", "are", "as", "at", "be", "but", "by", "can", "did", "do", "for",
    "go", "had", "has", "he", "her", "him", "his", "i", "if", "in", "is", "it", "let", "may",
    "me", "my", "no", "not", "of", "on", "or", "our", "put", "saw", "say", "see", "she", "so",
    "the", "to", "up", "us", "was", "we", "who", "why", "yet", "you",
]

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
[render]
# Ruleset name written into the version marker. Change it whenever matching
# rules change so hosts re-annotate cached documents. No whitespace, no "--".
ruleset = "annotate-v1"

# Prefix documents with <!-- verse-annotator ruleset=... gazetteer=... -->.
embed_version = true

# Class of the <p> wrapper used for free-form devotional text.
paragraph_class = "annotated-paragraph"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel annotation workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

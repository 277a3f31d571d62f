use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

use crate::errors::{AppError, AppResult};
use crate::utils::normalizer::Normalizer;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub normalizer: NormalizerConfig,
}

/// What to do when two different catalog records normalize to the same key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Refuse the catalog
    #[default]
    Reject,
    /// The record loaded later takes the key, a warning is logged
    LastWins,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub collision_policy: CollisionPolicy,
    /// Index guide identifiers (tvgIds) next to names and aliases
    #[serde(default = "default_index_broadcast_ids")]
    pub index_broadcast_ids: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Playlist URLs in priority order, highest first
    #[serde(default)]
    pub urls: Vec<String>,
    /// Optional file with one playlist URL per line, appended after `urls`
    #[serde(default)]
    pub list_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_fetch_timeout", with = "duration_serde::duration")]
    pub fetch_timeout: Duration,
    /// Skip TLS certificate validation for playlist fetches and probes
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// When disabled the highest-priority candidate of each channel is used unprobed
    #[serde(default = "default_validation_enabled")]
    pub enabled: bool,
    /// Channel groups validated at the same time
    #[serde(default = "default_validation_concurrency")]
    pub concurrency: usize,
    /// Playlists fetched at the same time
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    #[serde(default = "default_probe_timeout", with = "duration_serde::duration")]
    pub probe_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Fall back to substring containment when the exact key misses
    #[serde(default = "default_fuzzy_matching")]
    pub fuzzy: bool,
    /// Keys shorter than this never take part in containment matching
    #[serde(default = "default_min_fuzzy_key_len")]
    pub min_fuzzy_key_len: usize,
    /// Try the entry's tvg-id attribute when the display name misses
    #[serde(default = "default_match_tvg_id")]
    pub match_tvg_id: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Regexes matched against the upper-cased name and removed
    #[serde(default = "default_prefix_patterns")]
    pub prefix_patterns: Vec<String>,
    /// Literal replacements, applied in the listed order
    #[serde(default = "default_substitutions")]
    pub substitutions: Vec<Substitution>,
    /// Whole words removed after substitution
    #[serde(default = "default_noise_words")]
    pub noise_words: Vec<String>,
    /// One extra symbol kept in keys besides letters and digits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<char>,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from(DEFAULT_CATALOG_PATH)
}
fn default_index_broadcast_ids() -> bool {
    DEFAULT_INDEX_BROADCAST_IDS
}
fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_fetch_timeout() -> Duration {
    Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)
}
fn default_accept_invalid_certs() -> bool {
    DEFAULT_ACCEPT_INVALID_CERTS
}
fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}
fn default_validation_enabled() -> bool {
    DEFAULT_VALIDATION_ENABLED
}
fn default_validation_concurrency() -> usize {
    DEFAULT_VALIDATION_CONCURRENCY
}
fn default_fetch_concurrency() -> usize {
    DEFAULT_FETCH_CONCURRENCY
}
fn default_probe_timeout() -> Duration {
    Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS)
}
fn default_fuzzy_matching() -> bool {
    DEFAULT_FUZZY_MATCHING
}
fn default_min_fuzzy_key_len() -> usize {
    DEFAULT_MIN_FUZZY_KEY_LEN
}
fn default_match_tvg_id() -> bool {
    DEFAULT_MATCH_TVG_ID
}
fn default_prefix_patterns() -> Vec<String> {
    DEFAULT_PREFIX_PATTERNS.iter().map(|p| p.to_string()).collect()
}
fn default_substitutions() -> Vec<Substitution> {
    DEFAULT_SUBSTITUTIONS
        .iter()
        .map(|(from, to)| Substitution {
            from: from.to_string(),
            to: to.to_string(),
        })
        .collect()
}
fn default_noise_words() -> Vec<String> {
    DEFAULT_NOISE_WORDS.iter().map(|w| w.to_string()).collect()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            collision_policy: CollisionPolicy::default(),
            index_broadcast_ids: default_index_broadcast_ids(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            list_file: Some(PathBuf::from(DEFAULT_SOURCE_LIST_FILE)),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            fetch_timeout: default_fetch_timeout(),
            accept_invalid_certs: default_accept_invalid_certs(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: default_validation_enabled(),
            concurrency: default_validation_concurrency(),
            fetch_concurrency: default_fetch_concurrency(),
            probe_timeout: default_probe_timeout(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy: default_fuzzy_matching(),
            min_fuzzy_key_len: default_min_fuzzy_key_len(),
            match_tvg_id: default_match_tvg_id(),
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            prefix_patterns: default_prefix_patterns(),
            substitutions: default_substitutions(),
            noise_words: default_noise_words(),
            connector: None,
        }
    }
}

impl Config {
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> AppResult<()> {
        if self.validation.concurrency == 0 {
            return Err(AppError::configuration(
                "validation.concurrency must be at least 1",
            ));
        }
        if self.validation.fetch_concurrency == 0 {
            return Err(AppError::configuration(
                "validation.fetch_concurrency must be at least 1",
            ));
        }
        if self.validation.probe_timeout.is_zero() {
            return Err(AppError::configuration(
                "validation.probe_timeout must be greater than zero",
            ));
        }
        if self.http.fetch_timeout.is_zero() {
            return Err(AppError::configuration(
                "http.fetch_timeout must be greater than zero",
            ));
        }
        Normalizer::from_config(&self.normalizer)?;
        Ok(())
    }
}

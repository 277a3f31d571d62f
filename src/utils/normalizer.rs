//! Channel name normalization
//!
//! Turns free-text channel labels such as `IN: Star Plus HD` or `STAR+ (1080p)`
//! into compact comparison keys (`STARPLUS`). The same key is used for exact
//! catalog lookups and for containment matching, there is only one level of
//! strictness.
//!
//! A single pass runs these stages in order, each a pure function:
//!
//! 1. [`Normalizer::case_fold`]: upper-case the text
//! 2. [`Normalizer::strip_prefixes`]: remove leading region/language tags
//! 3. [`Normalizer::apply_substitutions`]: literal replacements, in configured order
//! 4. [`Normalizer::remove_noise_words`]: drop whole-word quality/format markers
//! 5. [`Normalizer::retain_allowed`]: keep ASCII letters, digits and the connector
//!
//! Stage 5 glues the remaining words together, which can expose a noise word
//! (`H-D` becomes `HD`). [`Normalizer::normalize`] therefore repeats the pass
//! until the key stops changing, so a key always normalizes to itself.

use regex::Regex;
use std::fmt;

use crate::config::{NormalizerConfig, Substitution};
use crate::errors::{AppError, AppResult};

/// Passes allowed on top of the first pass key's length
const EXTRA_PASSES: usize = 8;

/// Comparison key produced by the [`Normalizer`], never displayed
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Substring containment in either direction
    pub fn overlaps(&self, other: &NormalizedKey) -> bool {
        self.0.contains(other.as_str()) || other.0.contains(self.as_str())
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Channel name normalizer
#[derive(Debug, Clone)]
pub struct Normalizer {
    prefix_patterns: Vec<Regex>,
    substitutions: Vec<Substitution>,
    noise_words: Vec<String>,
    connector: Option<char>,
}

impl Normalizer {
    /// Build a normalizer, validating the configuration
    pub fn from_config(config: &NormalizerConfig) -> AppResult<Self> {
        let mut prefix_patterns = Vec::with_capacity(config.prefix_patterns.len());
        for pattern in &config.prefix_patterns {
            let regex = Regex::new(pattern).map_err(|e| {
                AppError::configuration(format!("Invalid prefix pattern '{pattern}': {e}"))
            })?;
            prefix_patterns.push(regex);
        }

        let mut substitutions = Vec::with_capacity(config.substitutions.len());
        for substitution in &config.substitutions {
            if substitution.from.is_empty() {
                return Err(AppError::configuration(
                    "Substitution with an empty 'from' value",
                ));
            }
            // Matching happens after case folding
            substitutions.push(Substitution {
                from: substitution.from.to_uppercase(),
                to: substitution.to.to_uppercase(),
            });
        }

        let mut noise_words = Vec::with_capacity(config.noise_words.len());
        for word in &config.noise_words {
            let word = word.trim().to_uppercase();
            if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(AppError::configuration(format!(
                    "Noise word '{word}' must be letters and digits only"
                )));
            }
            noise_words.push(word);
        }

        if let Some(connector) = config.connector {
            if !connector.is_ascii_punctuation() {
                return Err(AppError::configuration(format!(
                    "Connector '{connector}' must be a single ASCII symbol"
                )));
            }
        }

        Ok(Self {
            prefix_patterns,
            substitutions,
            noise_words,
            connector: config.connector,
        })
    }

    /// Create with default configuration
    pub fn with_default_config() -> AppResult<Self> {
        Self::from_config(&NormalizerConfig::default())
    }

    /// Normalize a raw name into its comparison key
    pub fn normalize(&self, raw: &str) -> NormalizedKey {
        let mut current = self.single_pass(raw);
        // A changing pass removes at least one character unless a substitution
        // grows the key, so the key length bounds the passes needed
        let max_passes = current.len() + EXTRA_PASSES;
        for _ in 0..max_passes {
            let next = self.single_pass(&current);
            if next == current {
                break;
            }
            current = next;
        }
        NormalizedKey(current)
    }

    fn single_pass(&self, raw: &str) -> String {
        let text = Self::case_fold(raw);
        let text = self.strip_prefixes(&text);
        let text = self.apply_substitutions(&text);
        let text = self.remove_noise_words(&text);
        self.retain_allowed(&text)
    }

    /// Stage 1: upper-case everything
    pub fn case_fold(raw: &str) -> String {
        raw.to_uppercase()
    }

    /// Stage 2: remove the first match of each prefix pattern, in order
    pub fn strip_prefixes(&self, text: &str) -> String {
        let mut stripped = text.to_string();
        for regex in &self.prefix_patterns {
            stripped = regex.replace(&stripped, "").into_owned();
        }
        stripped
    }

    /// Stage 3: replace every occurrence of each `from`, one substitution at a time
    pub fn apply_substitutions(&self, text: &str) -> String {
        let mut substituted = text.to_string();
        for substitution in &self.substitutions {
            substituted = substituted.replace(&substitution.from, &substitution.to);
        }
        substituted
    }

    /// Stage 4: blank out words (runs of ASCII letters/digits) that are noise
    pub fn remove_noise_words(&self, text: &str) -> String {
        let mut cleaned = String::with_capacity(text.len());
        let mut word = String::new();

        for ch in text.chars() {
            if ch.is_ascii_alphanumeric() {
                word.push(ch);
                continue;
            }
            self.flush_word(&mut word, &mut cleaned);
            cleaned.push(ch);
        }
        self.flush_word(&mut word, &mut cleaned);

        cleaned
    }

    fn flush_word(&self, word: &mut String, out: &mut String) {
        if word.is_empty() {
            return;
        }
        if self.noise_words.iter().any(|noise| noise == word) {
            out.push(' ');
        } else {
            out.push_str(word);
        }
        word.clear();
    }

    /// Stage 5: drop everything but ASCII letters, digits and the connector
    pub fn retain_allowed(&self, text: &str) -> String {
        text.chars()
            .filter(|c| c.is_ascii_alphanumeric() || Some(*c) == self.connector)
            .collect()
    }
}

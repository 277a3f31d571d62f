//! Resolves parsed playlist entries to catalog records

use tracing::debug;

use crate::catalog::CatalogIndex;
use crate::config::MatchingConfig;
use crate::models::{ChannelRecord, ParsedEntry};
use crate::utils::normalizer::Normalizer;

/// How an entry was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Name,
    GuideId,
    Fuzzy,
}

pub struct Matcher {
    normalizer: Normalizer,
    fuzzy: bool,
    match_tvg_id: bool,
}

impl Matcher {
    pub fn new(normalizer: Normalizer, config: &MatchingConfig) -> Self {
        Self {
            normalizer,
            fuzzy: config.fuzzy,
            match_tvg_id: config.match_tvg_id,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Find the catalog record for an entry, `None` is an ordinary miss
    pub fn match_entry<'a>(
        &self,
        entry: &ParsedEntry,
        index: &'a CatalogIndex,
    ) -> Option<&'a ChannelRecord> {
        self.match_with_kind(entry, index).map(|(record, _)| record)
    }

    pub fn match_with_kind<'a>(
        &self,
        entry: &ParsedEntry,
        index: &'a CatalogIndex,
    ) -> Option<(&'a ChannelRecord, MatchKind)> {
        let key = self.normalizer.normalize(&entry.display_name);

        if let Some(record) = index.lookup(&key) {
            return Some((record, MatchKind::Name));
        }

        if self.match_tvg_id {
            if let Some(tvg_id) = entry.tvg_id() {
                if let Some(record) = index.lookup(&self.normalizer.normalize(tvg_id)) {
                    return Some((record, MatchKind::GuideId));
                }
            }
        }

        if self.fuzzy {
            if let Some(record) = index.fuzzy_lookup(&key) {
                debug!(
                    "Fuzzy match '{}' -> {} ({})",
                    entry.display_name, record.identity, record.canonical_name
                );
                return Some((record, MatchKind::Fuzzy));
            }
        }

        debug!("No catalog match for '{}' (key '{}')", entry.display_name, key);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IndexOptions;
    use crate::models::Lcn;

    fn index() -> CatalogIndex {
        let records = vec![
            ChannelRecord::new(101, "Star Plus", "Entertainment")
                .with_alias("STAR PLUS HD")
                .with_broadcast_id("StarPlus.in"),
            ChannelRecord::new(5, "DD National", "General"),
        ];
        CatalogIndex::build(
            records,
            &Normalizer::with_default_config().unwrap(),
            &IndexOptions::default(),
        )
        .unwrap()
    }

    fn matcher(fuzzy: bool, match_tvg_id: bool) -> Matcher {
        let config = MatchingConfig {
            fuzzy,
            match_tvg_id,
            ..MatchingConfig::default()
        };
        Matcher::new(Normalizer::with_default_config().unwrap(), &config)
    }

    #[test]
    fn test_exact_name_match() {
        let index = index();
        let entry = ParsedEntry::new("Star Plus HD", "http://x/1");
        let (record, kind) = matcher(false, false).match_with_kind(&entry, &index).unwrap();
        assert_eq!(record.identity, Lcn(101));
        assert_eq!(kind, MatchKind::Name);
    }

    #[test]
    fn test_guide_id_match_when_name_misses() {
        let index = index();
        let entry = ParsedEntry::new("Unknown Label", "http://x/1")
            .with_attribute("tvg-id", "StarPlus.in");

        let (record, kind) = matcher(false, true).match_with_kind(&entry, &index).unwrap();
        assert_eq!(record.identity, Lcn(101));
        assert_eq!(kind, MatchKind::GuideId);

        assert!(matcher(false, false).match_entry(&entry, &index).is_none());
    }

    #[test]
    fn test_fuzzy_only_when_enabled() {
        let index = index();
        let entry = ParsedEntry::new("DD National East", "http://x/2");

        assert!(matcher(false, true).match_entry(&entry, &index).is_none());

        let (record, kind) = matcher(true, true).match_with_kind(&entry, &index).unwrap();
        assert_eq!(record.identity, Lcn(5));
        assert_eq!(kind, MatchKind::Fuzzy);
    }

    #[test]
    fn test_empty_key_never_matches() {
        let index = index();
        let entry = ParsedEntry::new("HD", "http://x/3");
        assert!(matcher(true, true).match_entry(&entry, &index).is_none());
    }
}

//! Joins validated streams with catalog metadata

use tracing::warn;

use crate::catalog::CatalogIndex;
use crate::models::{OutputRecord, ValidationResult};

/// Build output records in ascending channel-number order
///
/// Results without a winning candidate are dropped. The catalog logo is
/// preferred; the winning source's `tvg-logo` fills in when the catalog has
/// none.
pub fn assemble(results: &[ValidationResult], index: &CatalogIndex) -> Vec<OutputRecord> {
    let mut records: Vec<OutputRecord> = results
        .iter()
        .filter_map(|result| {
            let candidate = result.winning_candidate()?;
            let Some(record) = index.get(result.lcn) else {
                warn!("Validated channel {} is not in the catalog", result.lcn);
                return None;
            };

            Some(OutputRecord {
                lcn: record.identity,
                canonical_name: record.canonical_name.clone(),
                category: record.category.clone(),
                logo_url: record
                    .logo_url
                    .clone()
                    .filter(|logo| !logo.trim().is_empty())
                    .or_else(|| candidate.source_logo.clone()),
                broadcast_id: record.broadcast_id().map(str::to_string),
                stream_url: candidate.stream_url.clone(),
            })
        })
        .collect();

    records.sort_by_key(|record| record.lcn);
    records.dedup_by_key(|record| record.lcn);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IndexOptions;
    use crate::models::{Candidate, ChannelRecord, Lcn, ValidationOutcome};
    use crate::utils::normalizer::Normalizer;

    fn index() -> CatalogIndex {
        CatalogIndex::build(
            vec![
                ChannelRecord::new(101, "Star Plus", "Entertainment")
                    .with_logo("http://catalog/star.png")
                    .with_broadcast_id("StarPlus.in"),
                ChannelRecord::new(5, "DD National", "General"),
                ChannelRecord::new(20, "Aaj Tak", "News"),
            ],
            &Normalizer::with_default_config().unwrap(),
            &IndexOptions::default(),
        )
        .unwrap()
    }

    fn validated(lcn: u32, url: &str, source_logo: Option<&str>) -> ValidationResult {
        ValidationResult {
            lcn: Lcn(lcn),
            outcome: ValidationOutcome::Validated {
                candidate: Candidate {
                    lcn: Lcn(lcn),
                    stream_url: url.to_string(),
                    source_rank: 0,
                    position: 0,
                    source_logo: source_logo.map(str::to_string),
                },
                failed: Vec::new(),
            },
        }
    }

    #[test]
    fn test_sorted_numerically_and_failures_dropped() {
        let results = vec![
            validated(101, "http://x/101", None),
            ValidationResult {
                lcn: Lcn(20),
                outcome: ValidationOutcome::AllFailed { failed: Vec::new() },
            },
            validated(5, "http://x/5", None),
        ];

        let records = assemble(&results, &index());
        let lcns: Vec<_> = records.iter().map(|r| r.lcn).collect();
        assert_eq!(lcns, vec![Lcn(5), Lcn(101)]);
    }

    #[test]
    fn test_catalog_metadata_and_logo_fallback() {
        let results = vec![
            validated(101, "http://x/101", Some("http://source/star.png")),
            validated(5, "http://x/5", Some("http://source/dd.png")),
        ];
        let records = assemble(&results, &index());

        assert_eq!(records[0].canonical_name, "DD National");
        assert_eq!(records[0].logo_url.as_deref(), Some("http://source/dd.png"));
        assert_eq!(records[0].broadcast_id, None);

        assert_eq!(records[1].category, "Entertainment");
        assert_eq!(records[1].logo_url.as_deref(), Some("http://catalog/star.png"));
        assert_eq!(records[1].broadcast_id.as_deref(), Some("StarPlus.in"));
        assert_eq!(records[1].display_label(), "101. Star Plus");
    }

    #[test]
    fn test_unknown_channel_is_dropped() {
        let records = assemble(&[validated(999, "http://x/999", None)], &index());
        assert!(records.is_empty());
    }
}

//! The aggregation pipeline
//!
//! Phase 1 fetches every source (bounded, in source order), parses and matches
//! the entries and collects candidates per channel. Phase 2 validates the
//! channel groups concurrently. The assembler then turns the winners into
//! output records ordered by channel number.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod assembler;
pub mod collector;
pub mod matcher;
pub mod validator;

pub use assembler::assemble;
pub use collector::CandidateCollector;
pub use matcher::{MatchKind, Matcher};
pub use validator::{validate_group, validate_groups, HttpStreamProber, StreamProber};

use crate::catalog::{CatalogIndex, IndexOptions};
use crate::config::Config;
use crate::errors::AppResult;
use crate::ingestor::{m3u_parser, HttpPlaylistFetcher, PlaylistFetcher, PlaylistSource};
use crate::models::{ChannelRecord, Lcn, OutputRecord, ValidationOutcome, ValidationResult};
use crate::utils::normalizer::Normalizer;
use crate::utils::url::UrlUtils;

/// Knobs for a single run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Probe candidates; when false the highest-priority candidate wins unprobed
    pub validate: bool,
    pub concurrency: usize,
    pub fetch_concurrency: usize,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            validate: config.validation.enabled,
            concurrency: config.validation.concurrency,
            fetch_concurrency: config.validation.fetch_concurrency,
        }
    }
}

/// Counts and per-channel outcomes of one run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub sources_fetched: usize,
    pub sources_failed: usize,
    pub entries_parsed: usize,
    pub entries_skipped: usize,
    pub entries_matched: usize,
    pub entries_unmatched: usize,
    pub candidates: usize,
    /// Channels that had candidates but none answered
    pub all_failed: Vec<Lcn>,
    /// Channels with an empty candidate group
    pub not_attempted: Vec<Lcn>,
    /// Catalog channels no source mentioned
    pub unreferenced: Vec<Lcn>,
    pub records: Vec<OutputRecord>,
}

impl RunSummary {
    pub fn channels_written(&self) -> usize {
        self.records.len()
    }

    pub fn log(&self) {
        info!(
            "Sources: {} fetched, {} failed",
            self.sources_fetched, self.sources_failed
        );
        info!(
            "Entries: {} parsed, {} skipped, {} matched, {} unmatched ({} candidates)",
            self.entries_parsed,
            self.entries_skipped,
            self.entries_matched,
            self.entries_unmatched,
            self.candidates
        );
        info!(
            "Channels: {} written, {} all failed, {} not attempted, {} unreferenced",
            self.channels_written(),
            self.all_failed.len(),
            self.not_attempted.len(),
            self.unreferenced.len()
        );
    }
}

pub struct Aggregator {
    index: CatalogIndex,
    matcher: Matcher,
    fetcher: Arc<dyn PlaylistFetcher>,
    prober: Arc<dyn StreamProber>,
    options: RunOptions,
}

impl Aggregator {
    pub fn new(
        index: CatalogIndex,
        matcher: Matcher,
        fetcher: Arc<dyn PlaylistFetcher>,
        prober: Arc<dyn StreamProber>,
        options: RunOptions,
    ) -> Self {
        Self {
            index,
            matcher,
            fetcher,
            prober,
            options,
        }
    }

    /// Wire up the HTTP fetcher and prober and index the catalog
    pub fn from_config(config: &Config, records: Vec<ChannelRecord>) -> AppResult<Self> {
        let normalizer = Normalizer::from_config(&config.normalizer)?;
        let index = CatalogIndex::build(
            records,
            &normalizer,
            &IndexOptions::from_config(&config.catalog, &config.matching),
        )?;
        let matcher = Matcher::new(normalizer, &config.matching);
        let fetcher = Arc::new(HttpPlaylistFetcher::new(&config.http)?);
        let prober = Arc::new(HttpStreamProber::new(&config.http, &config.validation)?);

        Ok(Self::new(
            index,
            matcher,
            fetcher,
            prober,
            RunOptions::from_config(config),
        ))
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    /// Run both phases and assemble the playlist
    pub async fn run(&self, sources: &[PlaylistSource]) -> RunSummary {
        let mut summary = RunSummary::default();

        let collector = self.collect(sources, &mut summary).await;
        summary.candidates = collector.candidate_count();
        let groups = collector.into_groups();

        let referenced: HashSet<Lcn> = groups.iter().map(|group| group.lcn()).collect();
        summary.unreferenced = self
            .index
            .records()
            .iter()
            .map(|record| record.identity)
            .filter(|lcn| !referenced.contains(lcn))
            .collect();
        summary.unreferenced.sort();

        let results = if self.options.validate {
            validate_groups(self.prober.as_ref(), groups, self.options.concurrency).await
        } else {
            info!("Validation disabled, taking the highest-priority candidate per channel");
            validator::select_unprobed(groups)
        };

        self.record_outcomes(&results, &mut summary);
        summary.records = assemble(&results, &self.index);
        summary
    }

    /// Phase 1: fetch, parse and match every source
    async fn collect(
        &self,
        sources: &[PlaylistSource],
        summary: &mut RunSummary,
    ) -> CandidateCollector {
        let fetcher = self.fetcher.as_ref();
        let fetched: Vec<_> = stream::iter(sources)
            .map(|source| async move { (source, fetcher.fetch(&source.url).await) })
            .buffered(self.options.fetch_concurrency.max(1))
            .collect()
            .await;

        let mut collector = CandidateCollector::new();
        for (source, result) in fetched {
            let safe_url = UrlUtils::obfuscate_credentials(&source.url);
            let text = match result {
                Ok(text) => text,
                Err(e) => {
                    warn!("Skipping source {} ({}): {}", source.rank, safe_url, e);
                    summary.sources_failed += 1;
                    continue;
                }
            };
            summary.sources_fetched += 1;

            let mut entries = m3u_parser::parse(&text);
            let mut matched = 0;
            let mut parsed = 0;
            for entry in entries.by_ref() {
                parsed += 1;
                match self.matcher.match_entry(&entry, &self.index) {
                    Some(record) => {
                        matched += 1;
                        collector.add(source.rank, &entry, record);
                    }
                    None => summary.entries_unmatched += 1,
                }
            }
            summary.entries_parsed += parsed;
            summary.entries_matched += matched;
            summary.entries_skipped += entries.skipped();

            info!(
                "Source {} ({}): {} entries, {} matched",
                source.rank, safe_url, parsed, matched
            );
        }

        debug!(
            "Collected {} candidates for {} channels",
            collector.candidate_count(),
            collector.group_count()
        );
        collector
    }

    fn record_outcomes(&self, results: &[ValidationResult], summary: &mut RunSummary) {
        for result in results {
            match &result.outcome {
                ValidationOutcome::Validated { .. } => {}
                ValidationOutcome::AllFailed { .. } => summary.all_failed.push(result.lcn),
                ValidationOutcome::NotAttempted => summary.not_attempted.push(result.lcn),
            }
        }
        summary.all_failed.sort();
        summary.not_attempted.sort();
    }
}

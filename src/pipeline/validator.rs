//! Stream liveness validation
//!
//! Each [`ChannelGroup`] is probed sequentially in priority order and stops at
//! the first live candidate. Groups are validated concurrently through a
//! bounded `buffer_unordered` stream; every group's result comes back through
//! that stream, so no state is shared between workers.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{header, redirect, Client};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{HttpConfig, ValidationConfig};
use crate::errors::AppResult;
use crate::models::{ChannelGroup, FailedProbe, ProbeOutcome, ValidationOutcome, ValidationResult};
use crate::utils::url::UrlUtils;

/// Bounded-time reachability check for a single stream URL
#[async_trait]
pub trait StreamProber: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// Probes with a ranged GET, success is a 2xx status after redirects
pub struct HttpStreamProber {
    client: Client,
    timeout: Duration,
}

impl HttpStreamProber {
    pub fn new(http: &HttpConfig, validation: &ValidationConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(http.user_agent.clone())
            .redirect(redirect::Policy::limited(http.max_redirects))
            .danger_accept_invalid_certs(http.accept_invalid_certs)
            .tcp_keepalive(Duration::from_secs(10))
            .pool_max_idle_per_host(validation.concurrency)
            .build()?;

        Ok(Self {
            client,
            timeout: validation.probe_timeout,
        })
    }
}

#[async_trait]
impl StreamProber for HttpStreamProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        // Live streams never end, only the headers are awaited
        let request = self
            .client
            .get(url)
            .header(header::RANGE, "bytes=0-1023")
            .send();

        match tokio::time::timeout(self.timeout, request).await {
            Err(_) => ProbeOutcome::Timeout,
            Ok(Err(e)) if e.is_timeout() => ProbeOutcome::Timeout,
            Ok(Err(e)) => {
                ProbeOutcome::ConnectionError(UrlUtils::obfuscate_credentials(&e.to_string()))
            }
            Ok(Ok(response)) => {
                let status = response.status();
                if status.is_success() {
                    ProbeOutcome::Success {
                        status: status.as_u16(),
                    }
                } else {
                    ProbeOutcome::BadStatus(status.as_u16())
                }
            }
        }
    }
}

/// Probe a group's candidates in order, stopping at the first success
pub async fn validate_group(prober: &dyn StreamProber, group: ChannelGroup) -> ValidationResult {
    let lcn = group.lcn();
    if group.is_empty() {
        return ValidationResult {
            lcn,
            outcome: ValidationOutcome::NotAttempted,
        };
    }

    let mut failed = Vec::new();
    for candidate in group.candidates() {
        let outcome = prober.probe(&candidate.stream_url).await;
        if outcome.is_success() {
            debug!(
                "Channel {} live at {} (source {})",
                lcn,
                UrlUtils::obfuscate_credentials(&candidate.stream_url),
                candidate.source_rank
            );
            return ValidationResult {
                lcn,
                outcome: ValidationOutcome::Validated {
                    candidate: candidate.clone(),
                    failed,
                },
            };
        }

        debug!(
            "Channel {} probe failed ({}): {} - {}",
            lcn,
            outcome.kind(),
            UrlUtils::obfuscate_credentials(&candidate.stream_url),
            outcome
        );
        failed.push(FailedProbe {
            stream_url: candidate.stream_url.clone(),
            source_rank: candidate.source_rank,
            outcome,
        });
    }

    warn!("Channel {}: all {} candidates failed", lcn, failed.len());
    ValidationResult {
        lcn,
        outcome: ValidationOutcome::AllFailed { failed },
    }
}

/// Validate all groups with at most `concurrency` groups in flight
///
/// Results arrive in completion order.
pub async fn validate_groups(
    prober: &dyn StreamProber,
    groups: Vec<ChannelGroup>,
    concurrency: usize,
) -> Vec<ValidationResult> {
    let total = groups.len();
    info!(
        "Validating {} channels with concurrency {}",
        total,
        concurrency.max(1)
    );

    let results: Vec<ValidationResult> = stream::iter(groups)
        .map(|group| validate_group(prober, group))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let validated = results
        .iter()
        .filter(|r| r.winning_candidate().is_some())
        .count();
    info!("Validation finished: {}/{} channels live", validated, total);
    results
}

/// Take the highest-priority candidate of every group without probing
pub fn select_unprobed(groups: Vec<ChannelGroup>) -> Vec<ValidationResult> {
    groups
        .into_iter()
        .map(|group| {
            let lcn = group.lcn();
            let outcome = match group.candidates().first() {
                Some(candidate) => ValidationOutcome::Validated {
                    candidate: candidate.clone(),
                    failed: Vec::new(),
                },
                None => ValidationOutcome::NotAttempted,
            };
            ValidationResult { lcn, outcome }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, Lcn};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Answers from a fixed table, unknown URLs fail to connect
    struct TableProber {
        outcomes: HashMap<String, ProbeOutcome>,
        probed: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl TableProber {
        fn new(outcomes: &[(&str, ProbeOutcome)]) -> Self {
            Self {
                outcomes: outcomes
                    .iter()
                    .map(|(url, outcome)| (url.to_string(), outcome.clone()))
                    .collect(),
                probed: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }

        fn probed(&self) -> Vec<String> {
            self.probed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StreamProber for TableProber {
        async fn probe(&self, url: &str) -> ProbeOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.probed.lock().unwrap().push(url.to_string());
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.outcomes
                .get(url)
                .cloned()
                .unwrap_or_else(|| ProbeOutcome::ConnectionError("refused".to_string()))
        }
    }

    fn ok() -> ProbeOutcome {
        ProbeOutcome::Success { status: 200 }
    }

    fn group(lcn: u32, urls: &[&str]) -> ChannelGroup {
        ChannelGroup::from_candidates(
            Lcn(lcn),
            urls.iter().enumerate().map(|(rank, url)| Candidate {
                lcn: Lcn(lcn),
                stream_url: url.to_string(),
                source_rank: rank,
                position: 0,
                source_logo: None,
            }),
        )
    }

    #[tokio::test]
    async fn test_first_live_candidate_wins_and_stops_probing() {
        let prober = TableProber::new(&[("http://a/1", ok()), ("http://b/1", ok())]);
        let result = validate_group(&prober, group(101, &["http://a/1", "http://b/1"])).await;

        assert_eq!(result.winning_url(), Some("http://a/1"));
        assert_eq!(prober.probed(), vec!["http://a/1"]);
    }

    #[tokio::test]
    async fn test_falls_back_to_lower_priority_candidate() {
        let prober = TableProber::new(&[
            ("http://a/1", ProbeOutcome::BadStatus(404)),
            ("http://b/1", ok()),
        ]);
        let result = validate_group(&prober, group(5, &["http://a/1", "http://b/1"])).await;

        match result.outcome {
            ValidationOutcome::Validated { candidate, failed } => {
                assert_eq!(candidate.stream_url, "http://b/1");
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].outcome, ProbeOutcome::BadStatus(404));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_all_failed_is_distinct_from_not_attempted() {
        let prober = TableProber::new(&[("http://a/1", ProbeOutcome::Timeout)]);

        let all_failed = validate_group(&prober, group(7, &["http://a/1", "http://b/1"])).await;
        match &all_failed.outcome {
            ValidationOutcome::AllFailed { failed } => {
                let kinds: Vec<_> = failed.iter().map(|f| f.outcome.kind()).collect();
                assert_eq!(kinds, vec!["timeout", "connection_error"]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let empty = validate_group(&prober, ChannelGroup::new(Lcn(8))).await;
        assert_eq!(empty.outcome, ValidationOutcome::NotAttempted);
        assert!(empty.winning_candidate().is_none());
    }

    #[tokio::test]
    async fn test_validate_groups_respects_concurrency_bound() {
        let prober = TableProber::new(&[]);
        let groups: Vec<_> = (0..12)
            .map(|i| group(i, &[format!("http://x/{i}").as_str()]))
            .collect();

        let results = validate_groups(&prober, groups, 3).await;

        assert_eq!(results.len(), 12);
        assert!(prober.peak.load(Ordering::SeqCst) <= 3);
        let mut lcns: Vec<_> = results.iter().map(|r| r.lcn).collect();
        lcns.sort();
        lcns.dedup();
        assert_eq!(lcns.len(), 12);
    }

    #[test]
    fn test_select_unprobed_takes_highest_priority() {
        let results = select_unprobed(vec![
            group(1, &["http://a/1", "http://b/1"]),
            ChannelGroup::new(Lcn(2)),
        ]);
        assert_eq!(results[0].winning_url(), Some("http://a/1"));
        assert_eq!(results[1].outcome, ValidationOutcome::NotAttempted);
    }

    #[tokio::test]
    async fn test_http_prober_connection_refused() {
        let validation = ValidationConfig {
            probe_timeout: Duration::from_secs(2),
            ..ValidationConfig::default()
        };
        let prober = HttpStreamProber::new(&HttpConfig::default(), &validation).unwrap();
        let outcome = prober.probe("http://127.0.0.1:9/live.m3u8").await;
        assert!(!outcome.is_success());
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub mod channel_record;

pub use channel_record::ChannelRecord;

/// Logical channel number, the canonical identity of a channel
///
/// Ordering is numeric, which is the order channels appear in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lcn(pub u32);

impl fmt::Display for Lcn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Lcn {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// One directive/locator pair read from an upstream playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub display_name: String,
    pub stream_url: String,
    /// `key="value"` pairs from the directive line (tvg-id, tvg-logo, ...)
    pub attributes: HashMap<String, String>,
}

impl ParsedEntry {
    pub fn new<N: Into<String>, U: Into<String>>(display_name: N, stream_url: U) -> Self {
        Self {
            display_name: display_name.into(),
            stream_url: stream_url.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Non-empty attribute value
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn tvg_id(&self) -> Option<&str> {
        self.attribute("tvg-id")
    }

    pub fn tvg_logo(&self) -> Option<&str> {
        self.attribute("tvg-logo")
    }
}

/// An unvalidated binding of a stream URL to a catalog channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub lcn: Lcn,
    pub stream_url: String,
    /// Position of the originating playlist in the source list, 0 is highest priority
    pub source_rank: usize,
    /// Position of the entry inside its playlist
    pub position: usize,
    /// Logo advertised by the source, used when the catalog has none
    pub source_logo: Option<String>,
}

impl Candidate {
    /// Priority sort key, lower sorts first
    pub fn priority(&self) -> (usize, usize) {
        (self.source_rank, self.position)
    }
}

/// All candidates for one channel, kept in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroup {
    lcn: Lcn,
    candidates: Vec<Candidate>,
}

impl ChannelGroup {
    pub fn new(lcn: Lcn) -> Self {
        Self {
            lcn,
            candidates: Vec::new(),
        }
    }

    /// Build a group from arbitrary candidates, sorting them by priority.
    ///
    /// Candidates for a different channel are ignored.
    pub fn from_candidates(lcn: Lcn, candidates: impl IntoIterator<Item = Candidate>) -> Self {
        let mut group = Self::new(lcn);
        for candidate in candidates {
            group.push(candidate);
        }
        group
    }

    /// Insert a candidate at its priority position.
    ///
    /// Returns false when the candidate was not added, either because it
    /// belongs to another channel or because its URL is already in the group
    /// at the same or higher priority.
    pub fn push(&mut self, candidate: Candidate) -> bool {
        if candidate.lcn != self.lcn {
            return false;
        }

        if let Some(existing) = self
            .candidates
            .iter()
            .position(|c| c.stream_url == candidate.stream_url)
        {
            if self.candidates[existing].priority() <= candidate.priority() {
                return false;
            }
            self.candidates.remove(existing);
        }

        let index = self
            .candidates
            .partition_point(|c| c.priority() <= candidate.priority());
        self.candidates.insert(index, candidate);
        true
    }

    pub fn lcn(&self) -> Lcn {
        self.lcn
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Typed result of a single liveness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success { status: u16 },
    Timeout,
    ConnectionError(String),
    BadStatus(u16),
}

impl ProbeOutcome {
    /// The policy boundary: only `Success` counts as reachable
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProbeOutcome::Success { .. } => "success",
            ProbeOutcome::Timeout => "timeout",
            ProbeOutcome::ConnectionError(_) => "connection_error",
            ProbeOutcome::BadStatus(_) => "bad_status",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Success { status } => write!(f, "success ({status})"),
            ProbeOutcome::Timeout => write!(f, "timeout"),
            ProbeOutcome::ConnectionError(message) => write!(f, "connection error: {message}"),
            ProbeOutcome::BadStatus(status) => write!(f, "bad status {status}"),
        }
    }
}

/// A probe that did not succeed, kept for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedProbe {
    pub stream_url: String,
    pub source_rank: usize,
    pub outcome: ProbeOutcome,
}

/// What happened when a channel group was validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// A candidate answered; later candidates were not probed
    Validated {
        candidate: Candidate,
        failed: Vec<FailedProbe>,
    },
    /// Every candidate was probed and none answered
    AllFailed { failed: Vec<FailedProbe> },
    /// The group had no candidates, nothing was probed
    NotAttempted,
}

/// Result for exactly one channel group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub lcn: Lcn,
    pub outcome: ValidationOutcome,
}

impl ValidationResult {
    pub fn winning_candidate(&self) -> Option<&Candidate> {
        match &self.outcome {
            ValidationOutcome::Validated { candidate, .. } => Some(candidate),
            _ => None,
        }
    }

    pub fn winning_url(&self) -> Option<&str> {
        self.winning_candidate().map(|c| c.stream_url.as_str())
    }
}

/// A rendered channel of the final playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    pub lcn: Lcn,
    pub canonical_name: String,
    pub category: String,
    pub logo_url: Option<String>,
    pub broadcast_id: Option<String>,
    pub stream_url: String,
}

impl OutputRecord {
    /// Label shown by players, e.g. `101. Star Plus`
    pub fn display_label(&self) -> String {
        format!("{}. {}", self.lcn, self.canonical_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(rank: usize, position: usize, url: &str) -> Candidate {
        Candidate {
            lcn: Lcn(5),
            stream_url: url.to_string(),
            source_rank: rank,
            position,
            source_logo: None,
        }
    }

    #[test]
    fn test_group_orders_by_source_rank_then_position() {
        let group = ChannelGroup::from_candidates(
            Lcn(5),
            vec![
                candidate(2, 0, "http://c"),
                candidate(0, 7, "http://b"),
                candidate(0, 3, "http://a"),
            ],
        );
        let urls: Vec<_> = group.candidates().iter().map(|c| c.stream_url.as_str()).collect();
        assert_eq!(urls, vec!["http://a", "http://b", "http://c"]);
    }

    #[test]
    fn test_group_keeps_highest_priority_duplicate_url() {
        let mut group = ChannelGroup::new(Lcn(5));
        assert!(group.push(candidate(1, 0, "http://same")));
        assert!(!group.push(candidate(2, 0, "http://same")));
        assert!(group.push(candidate(0, 4, "http://same")));

        assert_eq!(group.len(), 1);
        assert_eq!(group.candidates()[0].source_rank, 0);
    }

    #[test]
    fn test_group_rejects_foreign_channel() {
        let mut group = ChannelGroup::new(Lcn(6));
        assert!(!group.push(candidate(0, 0, "http://a")));
        assert!(group.is_empty());
    }

    #[test]
    fn test_probe_outcome_policy_boundary() {
        assert!(ProbeOutcome::Success { status: 200 }.is_success());
        assert!(!ProbeOutcome::Timeout.is_success());
        assert!(!ProbeOutcome::BadStatus(503).is_success());
        assert!(!ProbeOutcome::ConnectionError("refused".into()).is_success());
        assert_eq!(ProbeOutcome::BadStatus(503).kind(), "bad_status");
    }

    #[test]
    fn test_parsed_entry_ignores_blank_attributes() {
        let entry = ParsedEntry::new("Star Plus", "http://x/1")
            .with_attribute("tvg-logo", "  ")
            .with_attribute("tvg-id", "StarPlus.in");
        assert_eq!(entry.tvg_logo(), None);
        assert_eq!(entry.tvg_id(), Some("StarPlus.in"));
    }

    #[test]
    fn test_output_label() {
        let record = OutputRecord {
            lcn: Lcn(101),
            canonical_name: "Star Plus".to_string(),
            category: "Entertainment".to_string(),
            logo_url: None,
            broadcast_id: None,
            stream_url: "http://x/1".to_string(),
        };
        assert_eq!(record.display_label(), "101. Star Plus");
    }
}

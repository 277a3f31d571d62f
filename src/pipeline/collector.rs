//! Groups matched candidates by channel number

use std::collections::BTreeMap;

use crate::models::{Candidate, ChannelGroup, ChannelRecord, Lcn, ParsedEntry};

/// Accumulates candidates into one [`ChannelGroup`] per channel number
///
/// Positions are counted per source, so `(source_rank, position)` orders every
/// candidate of a group no matter in which order sources are fed in.
#[derive(Debug, Default)]
pub struct CandidateCollector {
    groups: BTreeMap<Lcn, ChannelGroup>,
    positions: BTreeMap<usize, usize>,
}

impl CandidateCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one matched entry; returns false when the URL is already in the group
    pub fn add(&mut self, source_rank: usize, entry: &ParsedEntry, record: &ChannelRecord) -> bool {
        let position = self.positions.entry(source_rank).or_insert(0);
        let candidate = Candidate {
            lcn: record.identity,
            stream_url: entry.stream_url.clone(),
            source_rank,
            position: *position,
            source_logo: entry.tvg_logo().map(str::to_string),
        };
        *position += 1;

        self.groups
            .entry(record.identity)
            .or_insert_with(|| ChannelGroup::new(record.identity))
            .push(candidate)
    }

    /// Distinct candidates held across all groups
    pub fn candidate_count(&self) -> usize {
        self.groups.values().map(ChannelGroup::len).sum()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn group(&self, lcn: Lcn) -> Option<&ChannelGroup> {
        self.groups.get(&lcn)
    }

    /// Groups in ascending channel-number order
    pub fn into_groups(self) -> Vec<ChannelGroup> {
        self.groups.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(lcn: u32) -> ChannelRecord {
        ChannelRecord::new(lcn, format!("Channel {lcn}"), "Test")
    }

    #[test]
    fn test_candidates_ordered_by_rank_then_position() {
        let mut collector = CandidateCollector::new();
        let star = record(101);

        // Lower-priority source fed first
        collector.add(1, &ParsedEntry::new("Star Plus", "http://b/1"), &star);
        collector.add(0, &ParsedEntry::new("Star Plus", "http://a/1"), &star);
        collector.add(0, &ParsedEntry::new("Star Plus HD", "http://a/2"), &star);

        let group = collector.group(Lcn(101)).unwrap();
        let urls: Vec<_> = group.candidates().iter().map(|c| c.stream_url.as_str()).collect();
        assert_eq!(urls, vec!["http://a/1", "http://a/2", "http://b/1"]);
    }

    #[test]
    fn test_duplicate_url_kept_once() {
        let mut collector = CandidateCollector::new();
        let colors = record(120);

        assert!(collector.add(0, &ParsedEntry::new("Colors", "http://a/1"), &colors));
        assert!(!collector.add(1, &ParsedEntry::new("Colors HD", "http://a/1"), &colors));
        assert_eq!(collector.candidate_count(), 1);
        assert_eq!(collector.group(Lcn(120)).unwrap().candidates()[0].source_rank, 0);
    }

    #[test]
    fn test_groups_returned_in_channel_order() {
        let mut collector = CandidateCollector::new();
        collector.add(0, &ParsedEntry::new("x", "http://a/1"), &record(300));
        collector.add(0, &ParsedEntry::new("y", "http://a/2"), &record(7));

        let lcns: Vec<_> = collector.into_groups().iter().map(ChannelGroup::lcn).collect();
        assert_eq!(lcns, vec![Lcn(7), Lcn(300)]);
    }

    #[test]
    fn test_source_logo_carried_on_candidate() {
        let mut collector = CandidateCollector::new();
        let entry = ParsedEntry::new("Zee TV", "http://a/1")
            .with_attribute("tvg-logo", "http://logo/zee.png");
        collector.add(0, &entry, &record(9));
        let candidate = &collector.group(Lcn(9)).unwrap().candidates()[0];
        assert_eq!(candidate.source_logo.as_deref(), Some("http://logo/zee.png"));
    }
}

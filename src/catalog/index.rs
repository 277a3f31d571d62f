//! Normalized-key index over the channel catalog

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::{CatalogConfig, CollisionPolicy, MatchingConfig};
use crate::errors::{CatalogError, CatalogResult};
use crate::models::{ChannelRecord, Lcn};
use crate::utils::normalizer::{NormalizedKey, Normalizer};

/// Settings that shape how the index is built and searched
#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub collision_policy: CollisionPolicy,
    pub index_broadcast_ids: bool,
    pub min_fuzzy_key_len: usize,
}

impl IndexOptions {
    pub fn from_config(catalog: &CatalogConfig, matching: &MatchingConfig) -> Self {
        Self {
            collision_policy: catalog.collision_policy,
            index_broadcast_ids: catalog.index_broadcast_ids,
            min_fuzzy_key_len: matching.min_fuzzy_key_len,
        }
    }
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self::from_config(&CatalogConfig::default(), &MatchingConfig::default())
    }
}

/// Lookup structure from normalized names to catalog records
///
/// Every key maps to exactly one record. The empty key is never stored.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    records: Vec<ChannelRecord>,
    by_lcn: HashMap<Lcn, usize>,
    by_key: HashMap<NormalizedKey, usize>,
    /// Keys in first-insertion order, the scan order for containment lookups
    key_order: Vec<NormalizedKey>,
    min_fuzzy_key_len: usize,
}

impl CatalogIndex {
    /// Index the canonical name, every alias and (optionally) every guide id
    pub fn build(
        records: Vec<ChannelRecord>,
        normalizer: &Normalizer,
        options: &IndexOptions,
    ) -> CatalogResult<Self> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = Self {
            by_lcn: HashMap::with_capacity(records.len()),
            by_key: HashMap::new(),
            key_order: Vec::new(),
            min_fuzzy_key_len: options.min_fuzzy_key_len,
            records: Vec::with_capacity(records.len()),
        };

        for record in records {
            if let Some(&existing) = index.by_lcn.get(&record.identity) {
                return Err(CatalogError::DuplicateIdentity {
                    lcn: record.identity,
                    first: index.records[existing].canonical_name.clone(),
                    second: record.canonical_name,
                });
            }

            let slot = index.records.len();
            let keys = Self::record_keys(&record, normalizer, options.index_broadcast_ids);
            index.by_lcn.insert(record.identity, slot);
            index.records.push(record);

            for key in keys {
                index.insert_key(key, slot, options.collision_policy)?;
            }
        }

        info!(
            "Indexed {} channels under {} keys",
            index.records.len(),
            index.by_key.len()
        );
        Ok(index)
    }

    fn record_keys(
        record: &ChannelRecord,
        normalizer: &Normalizer,
        index_broadcast_ids: bool,
    ) -> Vec<NormalizedKey> {
        let broadcast_ids = record
            .broadcast_ids
            .iter()
            .map(String::as_str)
            .filter(|_| index_broadcast_ids);

        let mut keys = Vec::new();
        for raw in record.names().chain(broadcast_ids) {
            let key = normalizer.normalize(raw);
            if key.is_empty() {
                debug!(
                    "'{}' of channel {} normalizes to an empty key, not indexed",
                    raw, record.identity
                );
                continue;
            }
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    fn insert_key(
        &mut self,
        key: NormalizedKey,
        slot: usize,
        policy: CollisionPolicy,
    ) -> CatalogResult<()> {
        match self.by_key.get(&key).copied() {
            None => {
                self.key_order.push(key.clone());
                self.by_key.insert(key, slot);
            }
            Some(existing) if existing == slot => {}
            Some(existing) => {
                let first = self.records[existing].identity;
                let second = self.records[slot].identity;
                match policy {
                    CollisionPolicy::Reject => {
                        return Err(CatalogError::KeyCollision {
                            key: key.to_string(),
                            first,
                            second,
                        });
                    }
                    CollisionPolicy::LastWins => {
                        warn!(
                            "Key '{}' moves from channel {} to channel {}",
                            key, first, second
                        );
                        self.by_key.insert(key, slot);
                    }
                }
            }
        }
        Ok(())
    }

    /// Exact key lookup, the empty key never matches
    pub fn lookup(&self, key: &NormalizedKey) -> Option<&ChannelRecord> {
        if key.is_empty() {
            return None;
        }
        self.by_key.get(key).map(|&slot| &self.records[slot])
    }

    /// Containment lookup in either direction, first indexed key wins
    ///
    /// Keys shorter than the configured minimum never match, on either side.
    pub fn fuzzy_lookup(&self, key: &NormalizedKey) -> Option<&ChannelRecord> {
        let min_len = self.min_fuzzy_key_len.max(1);
        if key.len() < min_len {
            return None;
        }

        self.key_order
            .iter()
            .filter(|indexed| indexed.len() >= min_len)
            .find(|indexed| indexed.overlaps(key))
            .and_then(|indexed| self.lookup(indexed))
    }

    /// Record by channel number
    pub fn get(&self, lcn: Lcn) -> Option<&ChannelRecord> {
        self.by_lcn.get(&lcn).map(|&slot| &self.records[slot])
    }

    /// Records in catalog order
    pub fn records(&self) -> &[ChannelRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }
}

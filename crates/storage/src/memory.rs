//! In-memory named-hash backend.
//!
//! # Design
//!
//! - DashMap keyed by hash name: operations on different hashes never
//!   contend
//! - FxHashMap within each hash: O(1) key lookups, fast non-crypto hash
//! - Id sequence lives inside the shard, advanced under the shard's write
//!   lock, so allocation is atomic with respect to concurrent creators
//!
//! # Thread Safety
//!
//! All operations are thread-safe. Conditional writes (`set_if_absent`,
//! `set_if_present`) hold the target shard's write guard across the
//! check-and-write, so two concurrent `set_if_absent` calls for the same
//! key cannot both succeed.

use casebook_core::{HashBackend, Result};
use dashmap::DashMap;
use rustc_hash::FxHashMap;

/// One named hash: its entries plus the id sequence for records stored in
/// it.
///
/// `next_id` is monotonic and never tracks the entry count; deleting
/// records does not free their ids. The whole shard (sequence included) is
/// discarded when the hash is dropped.
#[derive(Debug, Default)]
struct HashShard {
    entries: FxHashMap<String, String>,
    next_id: u64,
}

/// In-memory [`HashBackend`] implementation.
///
/// # Example
///
/// ```ignore
/// use casebook_storage::MemoryHashStore;
/// use std::sync::Arc;
///
/// let backend = Arc::new(MemoryHashStore::new());
/// backend.set_if_absent("test_suite_hash", "1", "{...}")?;
/// ```
pub struct MemoryHashStore {
    hashes: DashMap<String, HashShard>,
}

impl MemoryHashStore {
    /// Create an empty store with no hashes.
    pub fn new() -> Self {
        MemoryHashStore {
            hashes: DashMap::new(),
        }
    }

    /// Number of hashes that currently exist.
    pub fn hash_count(&self) -> usize {
        self.hashes.len()
    }

    /// Total entries across all hashes.
    pub fn total_entries(&self) -> usize {
        self.hashes.iter().map(|shard| shard.entries.len()).sum()
    }
}

impl Default for MemoryHashStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryHashStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHashStore")
            .field("hash_count", &self.hash_count())
            .field("total_entries", &self.total_entries())
            .finish()
    }
}

impl HashBackend for MemoryHashStore {
    fn set_if_absent(&self, hash: &str, key: &str, value: &str) -> Result<bool> {
        let mut shard = self.hashes.entry(hash.to_string()).or_default();
        if shard.entries.contains_key(key) {
            return Ok(false);
        }
        shard.entries.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    fn set_if_present(&self, hash: &str, key: &str, value: &str) -> Result<bool> {
        let Some(mut shard) = self.hashes.get_mut(hash) else {
            return Ok(false);
        };
        if !shard.entries.contains_key(key) {
            return Ok(false);
        }
        shard.entries.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    fn get(&self, hash: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .hashes
            .get(hash)
            .and_then(|shard| shard.entries.get(key).cloned()))
    }

    fn get_all(&self, hash: &str) -> Result<Vec<(String, String)>> {
        Ok(self
            .hashes
            .get(hash)
            .map(|shard| {
                shard
                    .entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn delete(&self, hash: &str, key: &str) -> Result<bool> {
        Ok(self
            .hashes
            .get_mut(hash)
            .map(|mut shard| shard.entries.remove(key).is_some())
            .unwrap_or(false))
    }

    fn delete_hash(&self, hash: &str) -> Result<bool> {
        let existed = self.hashes.remove(hash).is_some();
        if existed {
            tracing::debug!(hash, "dropped hash");
        }
        Ok(existed)
    }

    fn count(&self, hash: &str) -> Result<usize> {
        Ok(self
            .hashes
            .get(hash)
            .map(|shard| shard.entries.len())
            .unwrap_or(0))
    }

    fn contains(&self, hash: &str, key: &str) -> Result<bool> {
        Ok(self
            .hashes
            .get(hash)
            .map(|shard| shard.entries.contains_key(key))
            .unwrap_or(false))
    }

    fn next_id(&self, hash: &str) -> Result<u64> {
        let mut shard = self.hashes.entry(hash.to_string()).or_default();
        shard.next_id += 1;
        Ok(shard.next_id)
    }
}

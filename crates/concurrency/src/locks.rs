//! Per-key mutation locks.
//!
//! The backend serializes single-key writes, but a read-modify-write of a
//! record is two backend calls and can interleave with a concurrent writer.
//! `KeyLockManager` closes that gap: every mutation sequence on one record
//! runs inside [`KeyLockManager::with_key`], keyed by hash name and record
//! key, so sequences on the same record are serialized while sequences on
//! different records never contend.

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Lock table keyed by `hash/key`.
///
/// Lock slots are created on first use and kept for the lifetime of the
/// manager; the table size is bounded by the number of distinct records
/// ever locked.
///
/// Key sections additionally hold a table-wide gate in shared mode, and
/// [`KeyLockManager::with_exclusive`] takes it exclusively: an exclusive
/// section observes no key section in flight and blocks new ones, which is
/// how whole-table sequences serialize against per-key ones.
///
/// # Thread Safety
///
/// `KeyLockManager` is `Send + Sync`. The slot lookup holds the table's
/// shard guard only long enough to clone the slot's `Arc`; the mutex itself
/// is acquired outside the table.
#[derive(Debug, Default)]
pub struct KeyLockManager {
    locks: DashMap<String, Arc<Mutex<()>>>,
    table_gate: RwLock<()>,
}

impl KeyLockManager {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, hash: &str, key: &str) -> Arc<Mutex<()>> {
        let composite = format!("{hash}/{key}");
        self.locks.entry(composite).or_default().clone()
    }

    /// Run `f` while holding the lock for `key` in `hash`.
    ///
    /// Concurrent callers for the same key block until `f` returns;
    /// callers for other keys proceed untouched.
    pub fn with_key<T>(&self, hash: &str, key: &str, f: impl FnOnce() -> T) -> T {
        let _shared = self.table_gate.read();
        let slot = self.slot(hash, key);
        let _guard = slot.lock();
        f()
    }

    /// Run `f` while holding the locks for two keys in `hash`.
    ///
    /// Locks are acquired in ascending key order regardless of argument
    /// order, so concurrent callers locking the same pair in opposite
    /// directions cannot deadlock. Equal keys degrade to a single lock.
    pub fn with_key_pair<T>(&self, hash: &str, a: &str, b: &str, f: impl FnOnce() -> T) -> T {
        if a == b {
            return self.with_key(hash, a, f);
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let _shared = self.table_gate.read();
        let slot_a = self.slot(hash, first);
        let slot_b = self.slot(hash, second);
        let _guard_a = slot_a.lock();
        let _guard_b = slot_b.lock();
        f()
    }

    /// Run `f` while holding the whole table exclusively.
    ///
    /// Waits for every in-flight key section to finish and blocks new ones
    /// until `f` returns, so `f` observes no concurrent key-locked
    /// sequence anywhere in the table. `f` must not re-enter the manager.
    pub fn with_exclusive<T>(&self, f: impl FnOnce() -> T) -> T {
        let _exclusive = self.table_gate.write();
        f()
    }

    /// Number of lock slots ever created.
    pub fn slot_count(&self) -> usize {
        self.locks.len()
    }
}

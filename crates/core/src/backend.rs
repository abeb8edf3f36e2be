//! Backend seam: the named-hash key-value API the stores are built on.
//!
//! A backend is a set of named hashes, each a mapping from string key to
//! string value. Single-key operations are serialized by the backend;
//! nothing larger than one key is atomic, which is why the coordinator
//! layers its own per-suite locking on top.

use crate::error::Result;

/// Named-hash key-value store.
///
/// Every method returns `Result` so that a remote implementation can
/// surface [`crate::Error::BackendUnavailable`]; callers treat any error as
/// aborting the current operation sequence at the step it reached.
pub trait HashBackend: Send + Sync {
    /// Set `key` in `hash` only if it is absent. Returns whether it was set.
    fn set_if_absent(&self, hash: &str, key: &str, value: &str) -> Result<bool>;

    /// Set `key` in `hash` only if it already exists. Returns whether it
    /// was set.
    fn set_if_present(&self, hash: &str, key: &str, value: &str) -> Result<bool>;

    /// Read the value stored under `key`, if any.
    fn get(&self, hash: &str, key: &str) -> Result<Option<String>>;

    /// All entries of `hash`, in no particular order.
    fn get_all(&self, hash: &str) -> Result<Vec<(String, String)>>;

    /// Remove `key` from `hash`. Returns whether it existed.
    fn delete(&self, hash: &str, key: &str) -> Result<bool>;

    /// Drop `hash` entirely, including its id sequence. Returns whether the
    /// hash existed.
    fn delete_hash(&self, hash: &str) -> Result<bool>;

    /// Number of entries in `hash` (0 for an absent hash).
    fn count(&self, hash: &str) -> Result<usize>;

    /// Whether `key` exists in `hash`.
    fn contains(&self, hash: &str, key: &str) -> Result<bool>;

    /// Atomically advance `hash`'s id sequence and return the new value.
    ///
    /// The sequence is monotonic, independent of the entry count, and must
    /// be safe against concurrent callers: two concurrent `next_id` calls
    /// never observe the same value. It resets only when the hash is
    /// dropped via [`HashBackend::delete_hash`].
    fn next_id(&self, hash: &str) -> Result<u64>;
}

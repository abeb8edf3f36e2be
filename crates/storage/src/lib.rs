//! Storage layer for casebook
//!
//! This crate implements the in-process [`casebook_core::HashBackend`]:
//! - `MemoryHashStore`: DashMap of named hashes, FxHashMap entries within
//! - Per-hash monotonic id sequences advanced under the shard lock

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;

pub use memory::MemoryHashStore;

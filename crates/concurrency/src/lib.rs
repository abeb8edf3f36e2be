//! Concurrency layer for casebook
//!
//! This crate implements per-key mutation locking:
//! - KeyLockManager: serializes read-modify-write sequences on one record
//! - Ordered pair locking for sequences that touch two records

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod locks;

pub use locks::KeyLockManager;

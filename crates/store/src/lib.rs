//! Entity stores for casebook
//!
//! One store per entity kind, both built on the same generic pattern:
//! - EntityStore: generic CRUD over one backend hash, codec included
//! - SuiteStore: suite defaults, derived-field preservation, link/unlink
//! - CaseStore: case CRUD plus owning-suite lookup
//!
//! Stores report absence as `Option`, never as an error; mapping absence to
//! an error is the coordinator's job. Stores also do no locking of their
//! own: callers that read-modify-write a record must hold that record's key
//! lock.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cases;
pub mod entity;
pub mod suites;

pub use cases::CaseStore;
pub use entity::EntityStore;
pub use suites::SuiteStore;

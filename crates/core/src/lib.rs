//! Core layer for casebook
//!
//! This crate defines everything the rest of the workspace agrees on:
//! - Entity records and their stored field payloads
//! - The error taxonomy and `Result` alias
//! - The record codec (stored value <-> structured fields)
//! - The `HashBackend` trait implemented by the storage layer

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod codec;
pub mod error;
pub mod types;

pub use backend::HashBackend;
pub use error::{Error, Result};
pub use types::{
    CaseFields, EntityFields, EntityId, EntityKind, SuiteFields, TestCase, TestSuite,
};

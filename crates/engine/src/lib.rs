//! Engine layer for casebook
//!
//! This crate owns the operation sequences that touch both entity kinds:
//! - Coordinator: referential integrity between suites and their cases
//! - CasebookConfig: hash naming, loadable from TOML

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod coordinator;

pub use config::CasebookConfig;
pub use coordinator::Coordinator;

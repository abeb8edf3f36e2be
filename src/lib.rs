//! # Casebook
//!
//! Embedded store for test suites and the test cases that belong to them,
//! with referential integrity between the two.
//!
//! A suite tracks which cases belong to it (an ordered case list plus a
//! cached count); a case references its owning suite. Casebook keeps the
//! two sides consistent through every create, delete, and cascade, under
//! concurrent access.
//!
//! ## Quick Start
//!
//! ```ignore
//! use casebook::prelude::*;
//!
//! let db = Casebook::open()?;
//!
//! // Suites own cases
//! let suite_id = db.suites.create("smoke tests")?;
//! let case_id = db.cases.create(&suite_id, "login", "verifies the login flow")?;
//!
//! let suite = db.suites.get(&suite_id)?;
//! assert_eq!(suite.length, 1);
//!
//! // A suite with linked cases refuses plain deletion...
//! assert!(db.suites.delete(&suite_id, false).is_err());
//! // ...and cascades under force.
//! db.suites.delete(&suite_id, true)?;
//! ```
//!
//! ## Guarantees
//!
//! - `suite.length == suite.cases.len()` after every completed operation
//! - every id in a suite's case list resolves to a case referencing it
//! - concurrent case creation against one suite yields distinct ids and an
//!   exact count
//! - deleting a suite with linked cases requires an explicit `force`

#![warn(missing_docs)]

mod database;
mod entities;

pub mod prelude;

pub use database::{Casebook, CasebookBuilder};
pub use entities::{Cases, Suites};

// Re-export the shared vocabulary so callers need only this crate.
pub use casebook_core::{EntityId, Error, HashBackend, Result, TestCase, TestSuite};
pub use casebook_engine::CasebookConfig;

//! Convenience re-exports for typical usage.
//!
//! ```ignore
//! use casebook::prelude::*;
//! ```

pub use crate::{Casebook, CasebookBuilder, CasebookConfig};
pub use crate::{EntityId, Error, Result, TestCase, TestSuite};

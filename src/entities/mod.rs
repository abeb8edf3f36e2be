//! Entity accessors exposed on the [`crate::Casebook`] handle.

mod cases;
mod suites;

pub use cases::Cases;
pub use suites::Suites;

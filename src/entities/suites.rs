//! Test suite operations.
//!
//! Access via `db.suites`. Every operation that affects a suite's case
//! linkage goes through the coordinator, which serializes mutation per
//! suite id; the handle itself is a stateless facade.

use crate::{EntityId, Result, TestSuite};
use casebook_engine::Coordinator;
use std::sync::Arc;

/// Test suite operations.
pub struct Suites {
    inner: Arc<Coordinator>,
}

impl Suites {
    pub(crate) fn new(inner: Arc<Coordinator>) -> Self {
        Suites { inner }
    }

    /// Create an empty suite and return its id.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let id = db.suites.create("smoke tests")?;
    /// ```
    pub fn create(&self, title: &str) -> Result<EntityId> {
        self.inner.create_suite(title)
    }

    /// Fetch one suite; `NotFound` if absent.
    pub fn get(&self, id: &EntityId) -> Result<TestSuite> {
        self.inner.get_suite(id)
    }

    /// All suites, order not guaranteed.
    pub fn list(&self) -> Result<Vec<TestSuite>> {
        self.inner.list_suites()
    }

    /// Rename a suite. The case list and count are owned by the store and
    /// pass through unchanged.
    pub fn update(&self, id: &EntityId, title: &str) -> Result<()> {
        self.inner.update_suite(id, title)
    }

    /// Delete a suite.
    ///
    /// Without `force` a suite with linked cases is rejected with
    /// `ConflictHasLinkedCases` and nothing is mutated; with `force` the
    /// linked cases are cascade-deleted first.
    ///
    /// # Example
    ///
    /// ```ignore
    /// match db.suites.delete(&id, false) {
    ///     Err(e) if e.is_conflict() => db.suites.delete(&id, true)?,
    ///     other => other?,
    /// }
    /// ```
    pub fn delete(&self, id: &EntityId, force: bool) -> Result<()> {
        self.inner.delete_suite(id, force)
    }

    /// Delete suites in bulk.
    ///
    /// With `force`, wipes suites and cases alike; without, removes only
    /// suites that have no linked cases and silently keeps the rest.
    pub fn delete_all(&self, force: bool) -> Result<()> {
        self.inner.delete_all_suites(force)
    }
}

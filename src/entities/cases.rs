//! Test case operations.
//!
//! Access via `db.cases`. Creation and deletion keep the owning suite's
//! case list and count in step; the handle itself is a stateless facade.

use crate::{EntityId, Result, TestCase};
use casebook_engine::Coordinator;
use std::sync::Arc;

/// Test case operations.
pub struct Cases {
    inner: Arc<Coordinator>,
}

impl Cases {
    pub(crate) fn new(inner: Arc<Coordinator>) -> Self {
        Cases { inner }
    }

    /// Create a case under an existing suite and return its id.
    ///
    /// Fails with `SuiteNotFound` (and writes nothing) if the suite does
    /// not exist.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let case_id = db.cases.create(&suite_id, "login", "verifies the login flow")?;
    /// ```
    pub fn create(
        &self,
        suite_id: &EntityId,
        title: &str,
        description: &str,
    ) -> Result<EntityId> {
        self.inner.create_case(suite_id, title, description)
    }

    /// Fetch one case; `NotFound` if absent.
    pub fn get(&self, id: &EntityId) -> Result<TestCase> {
        self.inner.get_case(id)
    }

    /// All cases, order not guaranteed.
    pub fn list(&self) -> Result<Vec<TestCase>> {
        self.inner.list_cases()
    }

    /// Update a case's fields.
    ///
    /// Submitting a different `suite_id` relinks the case: it is removed
    /// from its old suite's case list and appended to the new one, which
    /// must exist.
    pub fn update(
        &self,
        id: &EntityId,
        suite_id: &EntityId,
        title: &str,
        description: &str,
    ) -> Result<()> {
        self.inner.update_case(id, suite_id, title, description)
    }

    /// Delete a case and unlink it from its suite.
    pub fn delete(&self, id: &EntityId) -> Result<()> {
        self.inner.delete_case(id)
    }

    /// Delete every case, unlinking each from its suite first.
    pub fn delete_all(&self) -> Result<()> {
        self.inner.delete_all_cases()
    }
}

//! Suite store: suite CRUD plus the suite-side half of case linkage.
//!
//! The derived fields `length` and `cases` are owned by the coordinator:
//! title updates carry them through unchanged, and the link/unlink helpers
//! recompute `length` from `cases` in the same record write, so invariant
//! `length == cases.len()` holds in every value that reaches the backend.
//!
//! Link/unlink are read-modify-write and NOT serialized here; the caller
//! must hold the suite's key lock.

use crate::entity::EntityStore;
use casebook_core::{
    EntityId, EntityKind, Error, HashBackend, Result, SuiteFields, TestSuite,
};
use std::sync::Arc;

/// Store for test suite records.
#[derive(Debug)]
pub struct SuiteStore {
    inner: EntityStore<SuiteFields>,
}

impl SuiteStore {
    /// Create a store over `hash` in `backend`.
    pub fn new(backend: Arc<dyn HashBackend>, hash: impl Into<String>) -> Self {
        SuiteStore {
            inner: EntityStore::new(backend, hash),
        }
    }

    /// Name of the backend hash this store wraps.
    pub fn hash_name(&self) -> &str {
        self.inner.hash_name()
    }

    /// Create an empty suite (`length = 0`, no cases) and return its id.
    pub fn create(&self, title: impl Into<String>) -> Result<EntityId> {
        self.inner.create(&SuiteFields::new(title))
    }

    /// Look up one suite. Absence is a value, not an error.
    pub fn get(&self, id: &EntityId) -> Result<Option<TestSuite>> {
        Ok(self
            .inner
            .get(id)?
            .map(|fields| fields.attach(id.clone())))
    }

    /// All suites, order not guaranteed.
    pub fn list(&self) -> Result<Vec<TestSuite>> {
        Ok(self
            .inner
            .list()?
            .into_iter()
            .map(|(id, fields)| fields.attach(id))
            .collect())
    }

    /// Replace a suite's title, preserving `length` and `cases`.
    ///
    /// Caller must hold the suite's key lock.
    pub fn update_title(&self, id: &EntityId, title: impl Into<String>) -> Result<()> {
        let mut fields = self.read_fields(id)?;
        fields.title = title.into();
        self.inner.update(id, &fields)
    }

    /// Append a case id to the suite's case list and recount.
    ///
    /// Idempotent: a case id that is already linked is not appended again,
    /// so the suite-side step of case creation is safe to retry. Caller
    /// must hold the suite's key lock.
    pub fn link_case(&self, id: &EntityId, case_id: &EntityId) -> Result<()> {
        let mut fields = self.read_fields(id)?;
        if !fields.cases.contains(case_id) {
            fields.cases.push(case_id.clone());
        }
        fields.length = fields.cases.len() as u64;
        self.inner.update(id, &fields)
    }

    /// Remove a case id from the suite's case list and recount.
    ///
    /// Idempotent both ways: an id that is not linked is a no-op, and a
    /// suite that is already gone (mid-cascade) is skipped rather than
    /// failed, so nothing is decremented once the suite itself is removed.
    /// Caller must hold the suite's key lock or the lock table's exclusive
    /// section.
    pub fn unlink_case(&self, id: &EntityId, case_id: &EntityId) -> Result<()> {
        self.unlink_cases(id, std::slice::from_ref(case_id))
    }

    /// Remove several case ids from the suite in one record write.
    ///
    /// Same tolerance rules as [`SuiteStore::unlink_case`].
    pub fn unlink_cases(&self, id: &EntityId, case_ids: &[EntityId]) -> Result<()> {
        let Some(mut fields) = self.inner.get(id)? else {
            tracing::debug!(suite = %id, "suite already removed; skipping unlink");
            return Ok(());
        };
        fields.cases.retain(|linked| !case_ids.contains(linked));
        fields.length = fields.cases.len() as u64;
        self.inner.update(id, &fields)
    }

    /// Remove a suite record; [`Error::NotFound`] if absent.
    pub fn delete(&self, id: &EntityId) -> Result<()> {
        self.inner.delete(id)
    }

    /// Drop the whole suite hash. Coordinator-only; never called while the
    /// case hash still references these suites.
    pub fn delete_all(&self) -> Result<()> {
        self.inner.delete_all()
    }

    /// Whether a suite with this id exists.
    pub fn exists(&self, id: &EntityId) -> Result<bool> {
        self.inner.exists(id)
    }

    /// Number of stored suites.
    pub fn count(&self) -> Result<usize> {
        self.inner.count()
    }

    fn read_fields(&self, id: &EntityId) -> Result<SuiteFields> {
        self.inner.get(id)?.ok_or_else(|| Error::NotFound {
            kind: EntityKind::Suite,
            id: id.clone(),
        })
    }
}

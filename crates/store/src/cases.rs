//! Case store: case CRUD plus owning-suite lookup.

use crate::entity::EntityStore;
use casebook_core::{CaseFields, EntityId, HashBackend, Result, TestCase};
use std::sync::Arc;

/// Store for test case records.
#[derive(Debug)]
pub struct CaseStore {
    inner: EntityStore<CaseFields>,
}

impl CaseStore {
    /// Create a store over `hash` in `backend`.
    pub fn new(backend: Arc<dyn HashBackend>, hash: impl Into<String>) -> Self {
        CaseStore {
            inner: EntityStore::new(backend, hash),
        }
    }

    /// Name of the backend hash this store wraps.
    pub fn hash_name(&self) -> &str {
        self.inner.hash_name()
    }

    /// Store a new case and return its id.
    ///
    /// The referenced suite's existence is the coordinator's concern; the
    /// store writes whatever it is given.
    pub fn create(&self, fields: &CaseFields) -> Result<EntityId> {
        self.inner.create(fields)
    }

    /// Look up one case. Absence is a value, not an error.
    pub fn get(&self, id: &EntityId) -> Result<Option<TestCase>> {
        Ok(self
            .inner
            .get(id)?
            .map(|fields| fields.attach(id.clone())))
    }

    /// All cases, order not guaranteed.
    pub fn list(&self) -> Result<Vec<TestCase>> {
        Ok(self
            .inner
            .list()?
            .into_iter()
            .map(|(id, fields)| fields.attach(id))
            .collect())
    }

    /// Overwrite an existing case; [`casebook_core::Error::NotFound`] if
    /// absent.
    pub fn update(&self, id: &EntityId, fields: &CaseFields) -> Result<()> {
        self.inner.update(id, fields)
    }

    /// Remove a case record; [`casebook_core::Error::NotFound`] if absent.
    pub fn delete(&self, id: &EntityId) -> Result<()> {
        self.inner.delete(id)
    }

    /// Drop the whole case hash. Coordinator-only; callers must reconcile
    /// suite-side case lists first.
    pub fn delete_all(&self) -> Result<()> {
        self.inner.delete_all()
    }

    /// Whether a case with this id exists.
    pub fn exists(&self, id: &EntityId) -> Result<bool> {
        self.inner.exists(id)
    }

    /// Number of stored cases.
    pub fn count(&self) -> Result<usize> {
        self.inner.count()
    }

    /// The owning suite id of a case, if the case exists.
    pub fn suite_of(&self, id: &EntityId) -> Result<Option<EntityId>> {
        Ok(self.inner.get(id)?.map(|fields| fields.suite_id))
    }
}

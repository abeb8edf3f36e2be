//! Generic entity store: CRUD for one entity kind over one backend hash.

use casebook_core::{codec, EntityFields, EntityId, Error, HashBackend, Result};
use std::marker::PhantomData;
use std::sync::Arc;

/// CRUD operations for one entity kind, parametrized by its stored fields
/// payload.
///
/// The store wraps exactly one named hash in the backend: field key = the
/// entity id (decimal string), field value = the codec-encoded payload.
/// The backend handle is passed in explicitly at construction; there is no
/// ambient shared connection.
pub struct EntityStore<F: EntityFields> {
    backend: Arc<dyn HashBackend>,
    hash: String,
    _fields: PhantomData<F>,
}

impl<F: EntityFields> EntityStore<F> {
    /// Create a store over `hash` in `backend`.
    pub fn new(backend: Arc<dyn HashBackend>, hash: impl Into<String>) -> Self {
        EntityStore {
            backend,
            hash: hash.into(),
            _fields: PhantomData,
        }
    }

    /// Name of the backend hash this store wraps.
    pub fn hash_name(&self) -> &str {
        &self.hash
    }

    /// Allocate an id, store the encoded payload under it, and return it.
    ///
    /// Id allocation is the backend's atomic sequence, so concurrent
    /// creators always receive distinct ids. The subsequent set-if-absent
    /// can then only fail if the hash was written to outside the store,
    /// which surfaces as [`Error::AlreadyExists`].
    pub fn create(&self, fields: &F) -> Result<EntityId> {
        let id = EntityId::from_seq(self.backend.next_id(&self.hash)?);
        let raw = codec::encode(fields)?;
        if !self.backend.set_if_absent(&self.hash, id.as_str(), &raw)? {
            return Err(Error::AlreadyExists {
                kind: F::KIND,
                id,
            });
        }
        tracing::debug!(hash = %self.hash, id = %id, kind = %F::KIND, "created record");
        Ok(id)
    }

    /// Look up and decode one record. Absence is a value, not an error.
    pub fn get(&self, id: &EntityId) -> Result<Option<F>> {
        match self.backend.get(&self.hash, id.as_str())? {
            Some(raw) => Ok(Some(codec::decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// All records in the hash, decoded. Order is not guaranteed.
    pub fn list(&self) -> Result<Vec<(EntityId, F)>> {
        let mut records = Vec::new();
        for (key, raw) in self.backend.get_all(&self.hash)? {
            records.push((EntityId::from(key), codec::decode(&raw)?));
        }
        Ok(records)
    }

    /// Overwrite an existing record; [`Error::NotFound`] if absent.
    pub fn update(&self, id: &EntityId, fields: &F) -> Result<()> {
        let raw = codec::encode(fields)?;
        if self.backend.set_if_present(&self.hash, id.as_str(), &raw)? {
            Ok(())
        } else {
            Err(Error::NotFound {
                kind: F::KIND,
                id: id.clone(),
            })
        }
    }

    /// Remove a record; [`Error::NotFound`] if absent.
    pub fn delete(&self, id: &EntityId) -> Result<()> {
        if self.backend.delete(&self.hash, id.as_str())? {
            tracing::debug!(hash = %self.hash, id = %id, kind = %F::KIND, "deleted record");
            Ok(())
        } else {
            Err(Error::NotFound {
                kind: F::KIND,
                id: id.clone(),
            })
        }
    }

    /// Drop the whole hash, id sequence included. Idempotent: dropping an
    /// absent hash succeeds.
    pub fn delete_all(&self) -> Result<()> {
        self.backend.delete_hash(&self.hash)?;
        Ok(())
    }

    /// Whether a record with this id exists.
    pub fn exists(&self, id: &EntityId) -> Result<bool> {
        self.backend.contains(&self.hash, id.as_str())
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<usize> {
        self.backend.count(&self.hash)
    }
}

impl<F: EntityFields> std::fmt::Debug for EntityStore<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("hash", &self.hash)
            .field("kind", &F::KIND)
            .finish()
    }
}

//! Referential-integrity coordinator.
//!
//! Owns every operation sequence that touches both entity kinds. Each
//! sequence is a fixed ordered script of store calls; there is no
//! cross-store transaction, so ordering plus per-suite locking define the
//! behavior under failure and concurrency:
//!
//! - Any read-modify-write of a suite record runs under that suite's key
//!   lock ([`casebook_concurrency::KeyLockManager`]), so concurrent
//!   sequences against the same suite are serialized while different
//!   suites never contend. A case's owner is always re-read under the
//!   lock; if a concurrent relink moved the case first, the sequence
//!   retries against the new owner.
//! - Bulk wipes hold the whole lock table exclusively, so they interleave
//!   with no per-suite sequence: everything in flight commits before the
//!   wipe or starts after it.
//! - Sub-steps are idempotent (link appends only if absent, unlink removes
//!   only if present), so a sequence aborted by a backend failure can be
//!   retried whole without double-applying the suite-side update.
//! - Between a case write succeeding and the suite-side update completing
//!   the two hashes can disagree; that lag window is accepted and closed
//!   by retrying, never rolled back.

use crate::config::CasebookConfig;
use casebook_concurrency::KeyLockManager;
use casebook_core::{
    CaseFields, EntityId, EntityKind, Error, HashBackend, Result, TestCase, TestSuite,
};
use casebook_store::{CaseStore, SuiteStore};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Sequences suite and case operations so that the suite's `cases` list and
/// `length` stay consistent with the set of cases referencing it.
///
/// This is the interface the transport layer calls; it never exposes the
/// stores directly.
pub struct Coordinator {
    suites: SuiteStore,
    cases: CaseStore,
    locks: KeyLockManager,
    config: CasebookConfig,
}

impl Coordinator {
    /// Build a coordinator over an explicit backend handle.
    pub fn new(backend: Arc<dyn HashBackend>, config: CasebookConfig) -> Result<Self> {
        config.validate()?;
        Ok(Coordinator {
            suites: SuiteStore::new(backend.clone(), config.suites_hash.clone()),
            cases: CaseStore::new(backend, config.cases_hash.clone()),
            locks: KeyLockManager::new(),
            config,
        })
    }

    /// The configuration this coordinator was built with.
    pub fn config(&self) -> &CasebookConfig {
        &self.config
    }

    fn with_suite<T>(&self, id: &EntityId, f: impl FnOnce() -> T) -> T {
        self.locks.with_key(&self.config.suites_hash, id.as_str(), f)
    }

    fn require_title(title: &str) -> Result<()> {
        if title.trim().is_empty() {
            return Err(Error::InvalidInput("title must not be empty".into()));
        }
        Ok(())
    }

    // =========================================================================
    // Suite operations
    // =========================================================================

    /// Create an empty suite and return its id.
    pub fn create_suite(&self, title: &str) -> Result<EntityId> {
        Self::require_title(title)?;
        let id = self.suites.create(title)?;
        tracing::info!(suite = %id, "created suite");
        Ok(id)
    }

    /// Fetch one suite; `NotFound` if absent.
    pub fn get_suite(&self, id: &EntityId) -> Result<TestSuite> {
        self.suites.get(id)?.ok_or_else(|| Error::NotFound {
            kind: EntityKind::Suite,
            id: id.clone(),
        })
    }

    /// All suites, order not guaranteed.
    pub fn list_suites(&self) -> Result<Vec<TestSuite>> {
        self.suites.list()
    }

    /// Rename a suite; `length` and `cases` pass through untouched.
    pub fn update_suite(&self, id: &EntityId, title: &str) -> Result<()> {
        Self::require_title(title)?;
        self.with_suite(id, || self.suites.update_title(id, title))
    }

    /// Delete one suite.
    ///
    /// An empty suite is deleted directly. A suite with linked cases is
    /// rejected with `ConflictHasLinkedCases` unless `force` is set, in
    /// which case every linked case is cascade-deleted first. On the
    /// conflict rejection nothing has been mutated; once a forced cascade
    /// has begun, already-deleted cases stay deleted even if a later step
    /// fails.
    pub fn delete_suite(&self, id: &EntityId, force: bool) -> Result<()> {
        self.with_suite(id, || {
            let suite = self.suites.get(id)?.ok_or_else(|| Error::NotFound {
                kind: EntityKind::Suite,
                id: id.clone(),
            })?;

            if suite.cases.is_empty() {
                return self.suites.delete(id);
            }
            if !force {
                return Err(Error::ConflictHasLinkedCases(id.clone()));
            }

            tracing::info!(suite = %id, linked = suite.cases.len(), "cascade-deleting suite");
            for case_id in &suite.cases {
                // Direct delete: the suite itself is about to go, so the
                // per-case suite unlink is skipped. A member that is
                // already gone does not abort the cascade.
                match self.cases.delete(case_id) {
                    Ok(()) => {}
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                }
            }
            self.suites.delete(id)
        })
    }

    /// Delete suites in bulk.
    ///
    /// With `force`, both hashes are wiped unconditionally (cases first, so
    /// a failure in between never leaves cases pointing at nothing). The
    /// wipe holds the lock table exclusively, so a racing case creation
    /// either commits fully before it (and is wiped) or starts after it
    /// (and fails its suite-existence check); it can never write an orphan
    /// case after the suite hash is gone. Without `force`, only suites
    /// with no linked cases are removed; the rest are silently left in
    /// place.
    pub fn delete_all_suites(&self, force: bool) -> Result<()> {
        if force {
            return self.locks.with_exclusive(|| {
                self.cases.delete_all()?;
                self.suites.delete_all()?;
                tracing::info!("deleted all suites and cases");
                Ok(())
            });
        }

        for suite in self.suites.list()? {
            self.with_suite(&suite.id, || -> Result<()> {
                // Re-read under the lock: a case may have been linked since
                // the listing.
                match self.suites.get(&suite.id)? {
                    Some(current) if current.is_empty() => self.suites.delete(&suite.id),
                    _ => Ok(()),
                }
            })?;
        }
        Ok(())
    }

    // =========================================================================
    // Case operations
    // =========================================================================

    /// Create a case under an existing suite and link it.
    ///
    /// Sequence, all under the suite's key lock: verify the suite exists
    /// (`SuiteNotFound` otherwise, with no case written), create the case,
    /// append its id to the suite's case list and recount.
    pub fn create_case(
        &self,
        suite_id: &EntityId,
        title: &str,
        description: &str,
    ) -> Result<EntityId> {
        Self::require_title(title)?;
        self.with_suite(suite_id, || {
            if !self.suites.exists(suite_id)? {
                return Err(Error::SuiteNotFound(suite_id.clone()));
            }
            let case_id = self
                .cases
                .create(&CaseFields::new(suite_id.clone(), title, description))?;
            self.suites.link_case(suite_id, &case_id)?;
            tracing::info!(case = %case_id, suite = %suite_id, "created case");
            Ok(case_id)
        })
    }

    /// Fetch one case; `NotFound` if absent.
    pub fn get_case(&self, id: &EntityId) -> Result<TestCase> {
        self.cases.get(id)?.ok_or_else(|| Error::NotFound {
            kind: EntityKind::Case,
            id: id.clone(),
        })
    }

    /// All cases, order not guaranteed.
    pub fn list_cases(&self) -> Result<Vec<TestCase>> {
        self.cases.list()
    }

    /// Update a case's fields; `NotFound` if absent.
    ///
    /// When `suite_id` differs from the stored owner the case is relinked:
    /// the target suite must exist (`SuiteNotFound` otherwise), the case is
    /// rewritten, then unlinked from the old suite and linked to the new
    /// one. Both suite locks are taken in sorted id order.
    ///
    /// Like [`Coordinator::delete_case`], the owner read precedes the
    /// lock; the owner is re-read under the lock(s) and the sequence
    /// retries when a concurrent relink moved the case, so the rewrite can
    /// never unlink from a suite that no longer owns the case.
    pub fn update_case(
        &self,
        id: &EntityId,
        suite_id: &EntityId,
        title: &str,
        description: &str,
    ) -> Result<()> {
        Self::require_title(title)?;
        let fields = CaseFields::new(suite_id.clone(), title, description);

        loop {
            let current = self.cases.suite_of(id)?.ok_or_else(|| Error::NotFound {
                kind: EntityKind::Case,
                id: id.clone(),
            })?;

            let updated = if current == *suite_id {
                self.with_suite(&current, || -> Result<bool> {
                    match self.cases.suite_of(id)? {
                        None => Err(Error::NotFound {
                            kind: EntityKind::Case,
                            id: id.clone(),
                        }),
                        Some(owner) if owner != current => Ok(false),
                        Some(_) => {
                            self.cases.update(id, &fields)?;
                            Ok(true)
                        }
                    }
                })?
            } else {
                self.locks.with_key_pair(
                    &self.config.suites_hash,
                    current.as_str(),
                    suite_id.as_str(),
                    || -> Result<bool> {
                        match self.cases.suite_of(id)? {
                            None => Err(Error::NotFound {
                                kind: EntityKind::Case,
                                id: id.clone(),
                            }),
                            Some(owner) if owner != current => Ok(false),
                            Some(_) => {
                                if !self.suites.exists(suite_id)? {
                                    return Err(Error::SuiteNotFound(suite_id.clone()));
                                }
                                self.cases.update(id, &fields)?;
                                self.suites.unlink_case(&current, id)?;
                                self.suites.link_case(suite_id, id)?;
                                tracing::info!(case = %id, from = %current, to = %suite_id, "relinked case");
                                Ok(true)
                            }
                        }
                    },
                )?
            };

            if updated {
                return Ok(());
            }
        }
    }

    /// Delete one case and unlink it from its suite.
    ///
    /// Sequence: fail `NotFound` if the case is absent, read its owning
    /// suite, then under the suite's key lock delete the case and remove it
    /// from the suite's case list. A suite that is already gone
    /// (mid-cascade) is tolerated; nothing further is decremented.
    ///
    /// The owner read happens before the lock, so a concurrent relink can
    /// move the case in between; the owner is re-read under the lock and
    /// the sequence retries against the new owner when they disagree.
    /// Without that check the delete would unlink from the stale suite and
    /// leave the dead id listed in the new one.
    pub fn delete_case(&self, id: &EntityId) -> Result<()> {
        loop {
            let suite_id = self.cases.suite_of(id)?.ok_or_else(|| Error::NotFound {
                kind: EntityKind::Case,
                id: id.clone(),
            })?;
            let deleted = self.with_suite(&suite_id, || -> Result<bool> {
                match self.cases.suite_of(id)? {
                    None => Err(Error::NotFound {
                        kind: EntityKind::Case,
                        id: id.clone(),
                    }),
                    Some(owner) if owner != suite_id => Ok(false),
                    Some(_) => {
                        self.cases.delete(id)?;
                        self.suites.unlink_case(&suite_id, id)?;
                        Ok(true)
                    }
                }
            })?;
            if deleted {
                return Ok(());
            }
        }
    }

    /// Delete every case, unlinking each from its suite first.
    ///
    /// The suite-side unlinks must happen before the case hash is cleared:
    /// case records carry the only mapping of which suite they belong to.
    ///
    /// The whole sequence holds the lock table exclusively. The case
    /// listing, the unlinks, and the hash drop therefore see no in-flight
    /// per-suite sequence: a racing case creation commits fully before the
    /// wipe (and is included in it) or starts after it, never in between,
    /// where it would be wiped while staying linked.
    pub fn delete_all_cases(&self) -> Result<()> {
        self.locks.with_exclusive(|| {
            let mut by_suite: BTreeMap<EntityId, Vec<EntityId>> = BTreeMap::new();
            for case in self.cases.list()? {
                by_suite.entry(case.suite_id).or_default().push(case.id);
            }

            for (suite_id, case_ids) in &by_suite {
                self.suites.unlink_cases(suite_id, case_ids)?;
            }

            self.cases.delete_all()?;
            tracing::info!(suites_touched = by_suite.len(), "deleted all cases");
            Ok(())
        })
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("suites_hash", &self.config.suites_hash)
            .field("cases_hash", &self.config.cases_hash)
            .finish()
    }
}

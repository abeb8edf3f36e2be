//! Entity records for the two stored kinds: test suites and test cases.
//!
//! Each kind has two representations:
//!
//! - A *fields* struct ([`SuiteFields`], [`CaseFields`]) — the payload that
//!   is actually serialized into the backend hash. The record id is the hash
//!   field key, never part of the stored value.
//! - A *record* struct ([`TestSuite`], [`TestCase`]) — the fields with their
//!   id attached, as returned to callers.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable identifier for one stored entity.
///
/// Ids are decimal strings allocated by the backend's per-hash sequence
/// (`HashBackend::next_id`). They are unique within one entity kind and
/// never reused while the hash exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Render a sequence number as an id.
    pub fn from_seq(seq: u64) -> Self {
        EntityId(seq.to_string())
    }

    /// The id as a string slice (the hash field key).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId(s)
    }
}

/// The two entity kinds the store supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A test suite (owns an ordered list of case ids).
    Suite,
    /// A test case (references exactly one owning suite).
    Case,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Suite => f.write_str("test suite"),
            EntityKind::Case => f.write_str("test case"),
        }
    }
}

/// Marker trait tying a stored fields payload to its entity kind.
///
/// Implemented by [`SuiteFields`] and [`CaseFields`]; the generic entity
/// store is parametrized over this trait.
pub trait EntityFields:
    Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static
{
    /// Which kind this payload belongs to (used in errors and logs).
    const KIND: EntityKind;
}

/// Stored payload of a test suite.
///
/// Invariant: `length == cases.len()` in every value written to the backend.
/// Only the coordinator mutates `length` and `cases`; title-only updates
/// must carry the current values through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteFields {
    /// Human-readable suite name.
    pub title: String,
    /// Cached count of linked cases.
    pub length: u64,
    /// Linked case ids, in creation order.
    pub cases: Vec<EntityId>,
}

impl SuiteFields {
    /// Payload for a freshly created suite: no linked cases.
    pub fn new(title: impl Into<String>) -> Self {
        SuiteFields {
            title: title.into(),
            length: 0,
            cases: Vec::new(),
        }
    }

    /// Attach an id, producing the full record.
    pub fn attach(self, id: EntityId) -> TestSuite {
        TestSuite {
            id,
            title: self.title,
            length: self.length,
            cases: self.cases,
        }
    }
}

impl EntityFields for SuiteFields {
    const KIND: EntityKind = EntityKind::Suite;
}

/// Stored payload of a test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFields {
    /// Id of the owning suite.
    pub suite_id: EntityId,
    /// Test case name.
    pub title: String,
    /// Short description of what the case verifies.
    pub description: String,
}

impl CaseFields {
    /// Payload for a case under the given suite.
    pub fn new(
        suite_id: EntityId,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        CaseFields {
            suite_id,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Attach an id, producing the full record.
    pub fn attach(self, id: EntityId) -> TestCase {
        TestCase {
            id,
            suite_id: self.suite_id,
            title: self.title,
            description: self.description,
        }
    }
}

impl EntityFields for CaseFields {
    const KIND: EntityKind = EntityKind::Case;
}

/// A test suite record as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    /// Stable suite id.
    pub id: EntityId,
    /// Human-readable suite name.
    pub title: String,
    /// Cached count of linked cases.
    pub length: u64,
    /// Linked case ids, in creation order.
    pub cases: Vec<EntityId>,
}

impl TestSuite {
    /// True when no cases are linked (the suite may be deleted directly).
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// A test case record as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Stable case id.
    pub id: EntityId,
    /// Id of the owning suite.
    pub suite_id: EntityId,
    /// Test case name.
    pub title: String,
    /// Short description of what the case verifies.
    pub description: String,
}

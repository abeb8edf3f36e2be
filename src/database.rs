//! Main entry point: the `Casebook` handle and its builder.

use crate::entities::{Cases, Suites};
use crate::Result;
use casebook_core::HashBackend;
use casebook_engine::{CasebookConfig, Coordinator};
use casebook_storage::MemoryHashStore;
use std::path::Path;
use std::sync::Arc;

/// The casebook database.
///
/// Create one with [`Casebook::open`] for defaults or [`Casebook::builder`]
/// for configuration. All operations go through the `suites` and `cases`
/// accessors; the handle is cheap to share behind an `Arc`.
///
/// # Example
///
/// ```ignore
/// use casebook::prelude::*;
///
/// let db = Casebook::open()?;
/// let suite_id = db.suites.create("regression")?;
/// db.cases.create(&suite_id, "checkout", "cart to payment")?;
/// ```
pub struct Casebook {
    inner: Arc<Coordinator>,

    /// Test suite operations.
    pub suites: Suites,

    /// Test case operations.
    pub cases: Cases,
}

impl Casebook {
    /// Open a database with default configuration and an in-process
    /// backend.
    pub fn open() -> Result<Self> {
        Self::builder().open()
    }

    /// Create a builder for configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let db = Casebook::builder()
    ///     .suites_hash("staging_suite_hash")
    ///     .cases_hash("staging_case_hash")
    ///     .open()?;
    /// ```
    pub fn builder() -> CasebookBuilder {
        CasebookBuilder::new()
    }

    /// The configuration this database runs with.
    pub fn config(&self) -> &CasebookConfig {
        self.inner.config()
    }

    fn from_coordinator(inner: Arc<Coordinator>) -> Self {
        Casebook {
            suites: Suites::new(inner.clone()),
            cases: Cases::new(inner.clone()),
            inner,
        }
    }
}

impl std::fmt::Debug for Casebook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Casebook")
            .field("config", self.config())
            .finish()
    }
}

/// Builder for database configuration.
///
/// The backend handle is explicit: by default a fresh in-process
/// [`MemoryHashStore`] is created, and any other [`HashBackend`]
/// implementation can be injected, including one shared by several
/// handles.
pub struct CasebookBuilder {
    config: CasebookConfig,
    backend: Option<Arc<dyn HashBackend>>,
}

impl CasebookBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        CasebookBuilder {
            config: CasebookConfig::default(),
            backend: None,
        }
    }

    /// Name of the hash holding suite records.
    pub fn suites_hash(mut self, name: impl Into<String>) -> Self {
        self.config.suites_hash = name.into();
        self
    }

    /// Name of the hash holding case records.
    pub fn cases_hash(mut self, name: impl Into<String>) -> Self {
        self.config.cases_hash = name.into();
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: CasebookConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a TOML file.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.config = CasebookConfig::from_toml_file(path)?;
        Ok(self)
    }

    /// Use an explicit backend instead of a fresh in-process store.
    pub fn backend(mut self, backend: Arc<dyn HashBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Open the database.
    pub fn open(self) -> Result<Casebook> {
        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(MemoryHashStore::new()));
        let coordinator = Coordinator::new(backend, self.config)?;
        Ok(Casebook::from_coordinator(Arc::new(coordinator)))
    }
}

impl Default for CasebookBuilder {
    fn default() -> Self {
        Self::new()
    }
}

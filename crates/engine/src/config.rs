//! Engine configuration: which backend hashes the two stores live in.

use casebook_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names of the two backend hashes.
///
/// Defaults match the conventional deployment layout; override them when
/// several casebook instances share one backend.
///
/// # Example
///
/// ```ignore
/// let config = CasebookConfig::from_toml_file("casebook.toml")?;
/// ```
///
/// ```toml
/// suites_hash = "staging_suite_hash"
/// cases_hash = "staging_case_hash"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CasebookConfig {
    /// Hash holding test suite records.
    pub suites_hash: String,
    /// Hash holding test case records.
    pub cases_hash: String,
}

impl Default for CasebookConfig {
    fn default() -> Self {
        CasebookConfig {
            suites_hash: "test_suite_hash".to_string(),
            cases_hash: "test_case_hash".to_string(),
        }
    }
}

impl CasebookConfig {
    /// Load configuration from a TOML file.
    ///
    /// Missing keys fall back to defaults; unknown keys and unreadable
    /// files are [`Error::InvalidInput`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidInput(format!("config file {}: {e}", path.display()))
        })?;
        let config: CasebookConfig = toml::from_str(&raw)
            .map_err(|e| Error::InvalidInput(format!("config file {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that both hash names are usable.
    ///
    /// The two entity kinds must live in distinct, non-empty hashes;
    /// sharing one hash would collide their id sequences.
    pub fn validate(&self) -> Result<()> {
        if self.suites_hash.is_empty() || self.cases_hash.is_empty() {
            return Err(Error::InvalidInput("hash names must not be empty".into()));
        }
        if self.suites_hash == self.cases_hash {
            return Err(Error::InvalidInput(
                "suites and cases must use distinct hashes".into(),
            ));
        }
        Ok(())
    }
}

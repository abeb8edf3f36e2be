//! Record codec: stored hash values <-> structured field payloads.
//!
//! A record's fields are stored as a single JSON string under the record's
//! id in its hash. JSON round-trips every text field losslessly, including
//! quote characters, embedded delimiters, empty strings, and non-ASCII
//! content; `decode(encode(fields)) == fields` holds for any payload.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serialize a fields payload into the stored value.
pub fn encode<F: Serialize>(fields: &F) -> Result<String> {
    serde_json::to_string(fields).map_err(|e| Error::Codec(e.to_string()))
}

/// Parse a stored value back into a fields payload.
pub fn decode<F: DeserializeOwned>(raw: &str) -> Result<F> {
    serde_json::from_str(raw).map_err(|e| Error::Codec(e.to_string()))
}

//! Hex-encoded identifiers carried in trace headers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A trace or span identifier in its hex wire form.
///
/// Values received from the wire are carried verbatim; only locally
/// generated ids are guaranteed to be fixed-length lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexId(String);

impl HexId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a random 64-bit id (16 hex chars).
    pub fn random64() -> Self {
        Self(format!("{:016x}", Uuid::new_v4().as_u128() as u64))
    }

    /// Generate a random 128-bit id (32 hex chars).
    pub fn random128() -> Self {
        Self(format!("{:032x}", Uuid::new_v4().as_u128()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HexId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for HexId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

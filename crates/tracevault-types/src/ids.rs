use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::is_64_char_hex;

/// `trace-` prefixed opaque identifier, unique per top-level agent task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    const PREFIX: &'static str = "trace-";

    /// Generate a fresh id. 16 hex chars after the prefix (22 chars total),
    /// matching the original implementation's id length.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", Self::PREFIX, &hex[..16]))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TraceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TraceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TraceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `span-` prefixed opaque identifier, unique within a trace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpanId(String);

impl SpanId {
    const PREFIX: &'static str = "span-";

    /// Generate a fresh id. 12 hex chars after the prefix (17 chars total).
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", Self::PREFIX, &hex[..12]))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SpanId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SpanId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SpanId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lowercase hex SHA-256 of an artifact's payload bytes; the content-addressed
/// primary key of the artifact store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactHash(String);

impl ArtifactHash {
    /// Build from an already-computed digest. Debug-asserts the string is a
    /// 64-char hex digest; callers should compute this via
    /// `tracevault_core::hash::sha256_hex` rather than constructing by hand.
    pub fn new(hash: impl Into<String>) -> Self {
        let hash = hash.into();
        debug_assert!(is_64_char_hex(&hash), "not a sha256 hex digest: {hash}");
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First two hex characters, used as the shard directory name.
    pub fn shard(&self) -> &str {
        &self.0[..2]
    }
}

impl fmt::Display for ArtifactHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ArtifactHash {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ArtifactHash {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

impl AsRef<str> for ArtifactHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_id_length_matches_original_invariant() {
        let id = TraceId::generate();
        assert_eq!(id.as_str().len(), 22);
        assert!(id.as_str().starts_with("trace-"));
    }

    #[test]
    fn span_id_length_matches_original_invariant() {
        let id = SpanId::generate();
        assert_eq!(id.as_str().len(), 17);
        assert!(id.as_str().starts_with("span-"));
    }

    #[test]
    fn artifact_hash_shard_is_first_two_chars() {
        let hash =
            ArtifactHash::new("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824");
        assert_eq!(hash.shard(), "2c");
    }
}

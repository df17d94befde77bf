use sha2::{Digest, Sha256};
use tracevault_types::ArtifactHash;

/// Lowercase hex SHA-256 digest of a byte slice.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Compute the `ArtifactHash` of a payload.
pub fn artifact_hash(bytes: &[u8]) -> ArtifactHash {
    ArtifactHash::new(sha256_hex(bytes))
}

/// Streaming hasher used by `store_video` so payloads are never fully
/// buffered in memory before their hash is known.
pub struct StreamingHasher {
    inner: Sha256,
}

impl StreamingHasher {
    pub fn new() -> Self {
        Self { inner: Sha256::new() }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.inner.update(chunk);
    }

    pub fn finalize_hex(self) -> String {
        format!("{:x}", self.inner.finalize())
    }

    pub fn finalize(self) -> ArtifactHash {
        ArtifactHash::new(self.finalize_hex())
    }
}

impl Default for StreamingHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_matches_known_digest() {
        // SHA-256("hello")
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn streaming_hasher_matches_one_shot() {
        let mut streaming = StreamingHasher::new();
        streaming.update(b"hel");
        streaming.update(b"lo");
        assert_eq!(streaming.finalize_hex(), sha256_hex(b"hello"));
    }
}

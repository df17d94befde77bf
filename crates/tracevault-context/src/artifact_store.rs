use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracevault_core::{artifact_hash, StreamingHasher};
use tracevault_index::{ArtifactRecord, Database};
use tracevault_types::ArtifactHash;

use crate::{Error, Result};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Content-addressed descriptor returned by every store operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub artifact_hash: ArtifactHash,
    pub byte_len: u64,
    pub artifact_type: String,
    pub content_type: String,
    pub storage_path: PathBuf,
    pub metadata: serde_json::Value,
}

impl From<ArtifactRecord> for Artifact {
    fn from(record: ArtifactRecord) -> Self {
        Artifact {
            artifact_hash: ArtifactHash::new(record.artifact_hash),
            byte_len: record.byte_len,
            artifact_type: record.artifact_type,
            content_type: record.content_type,
            storage_path: PathBuf::from(record.storage_path),
            metadata: record.metadata,
        }
    }
}

/// Width/height/codec metadata attached to `video` artifacts.
pub use tracevault_types::VideoMetadata;

/// Content-addressed blob store: `<root>/<hash[0..2]>/<hash>` on disk, with
/// a metadata sidecar row (`artifact_type`, `content_type`, `metadata`) kept
/// in the shared event-log database rather than alongside the bytes.
pub struct ArtifactStore {
    root: PathBuf,
    db: Arc<Database>,
}

impl ArtifactStore {
    pub fn open(root: impl Into<PathBuf>, db: Arc<Database>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root, db })
    }

    fn shard_path(&self, hash: &ArtifactHash) -> PathBuf {
        self.root.join(hash.shard()).join(hash.as_str())
    }

    /// Writes `bytes` under its content hash if not already present, and
    /// records the metadata sidecar row. Safe for concurrent callers storing
    /// identical or distinct payloads: the losing side of a concurrent
    /// `rename` race finds its target already populated and treats that as
    /// success.
    pub fn store(
        &self,
        bytes: &[u8],
        artifact_type: &str,
        content_type: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<Artifact> {
        let hash = artifact_hash(bytes);
        let final_path = self.shard_path(&hash);

        if !final_path.exists() {
            self.write_atomic(&final_path, bytes)?;
        }

        let record = ArtifactRecord {
            artifact_hash: hash.as_str().to_string(),
            byte_len: bytes.len() as u64,
            artifact_type: artifact_type.to_string(),
            content_type: content_type.to_string(),
            storage_path: final_path
                .strip_prefix(&self.root)
                .unwrap_or(&final_path)
                .to_string_lossy()
                .into_owned(),
            metadata: metadata.unwrap_or(serde_json::Value::Null),
        };

        let stored = self.db.insert_or_get_artifact(&record)?;
        Ok(stored.into())
    }

    /// Streams `path`'s contents through the hasher so the whole file is
    /// never loaded into memory, then stores it like any other artifact.
    pub fn store_video(
        &self,
        path: &Path,
        content_type: &str,
        video_metadata: VideoMetadata,
    ) -> Result<Artifact> {
        let mut file = File::open(path)?;
        let mut hasher = StreamingHasher::new();
        let mut buf = [0u8; 64 * 1024];
        let mut byte_len = 0u64;
        loop {
            let read = file.read(&mut buf)?;
            if read == 0 {
                break;
            }
            hasher.update(&buf[..read]);
            byte_len += read as u64;
        }
        let hash = ArtifactHash::new(hasher.finalize_hex());
        let final_path = self.shard_path(&hash);

        if !final_path.exists() {
            let mut src = File::open(path)?;
            let mut dest_buf = Vec::with_capacity(byte_len as usize);
            src.read_to_end(&mut dest_buf)?;
            self.write_atomic(&final_path, &dest_buf)?;
        }

        let metadata = serde_json::to_value(&video_metadata)
            .map_err(|e| Error::Config(format!("failed to serialize video metadata: {e}")))?;

        let record = ArtifactRecord {
            artifact_hash: hash.as_str().to_string(),
            byte_len,
            artifact_type: "video".to_string(),
            content_type: content_type.to_string(),
            storage_path: final_path
                .strip_prefix(&self.root)
                .unwrap_or(&final_path)
                .to_string_lossy()
                .into_owned(),
            metadata,
        };

        let stored = self.db.insert_or_get_artifact(&record)?;
        Ok(stored.into())
    }

    /// Reads the payload back and recomputes its hash, failing `Corrupted`
    /// on mismatch rather than trusting the filename.
    pub fn retrieve(&self, hash: &ArtifactHash) -> Result<Vec<u8>> {
        let path = self.shard_path(hash);
        if !path.exists() {
            return Err(Error::NotFound(format!("artifact {hash}")));
        }
        let bytes = std::fs::read(&path)?;
        let recomputed = artifact_hash(&bytes);
        if recomputed.as_str() != hash.as_str() {
            return Err(Error::Corrupted(format!(
                "artifact {hash} recomputed to {recomputed}"
            )));
        }
        Ok(bytes)
    }

    pub fn exists(&self, hash: &ArtifactHash) -> bool {
        self.shard_path(hash).exists()
    }

    pub fn get_descriptor(&self, hash: &ArtifactHash) -> Result<Artifact> {
        self.db
            .get_artifact(hash.as_str())?
            .map(Artifact::from)
            .ok_or_else(|| Error::NotFound(format!("artifact {hash}")))
    }

    fn write_atomic(&self, final_path: &Path, bytes: &[u8]) -> Result<()> {
        let dir = final_path.parent().expect("shard path always has a parent");
        std::fs::create_dir_all(dir)?;

        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_path = dir.join(format!(
            ".tmp-{}-{}",
            std::process::id(),
            counter
        ));

        {
            let mut temp_file = File::create(&temp_path)?;
            temp_file.write_all(bytes)?;
            temp_file.sync_all()?;
        }

        match std::fs::rename(&temp_path, final_path) {
            Ok(()) => Ok(()),
            Err(_) if final_path.exists() => {
                // Lost the rename race to another writer of the same bytes.
                let _ = std::fs::remove_file(&temp_path);
                Ok(())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }
}

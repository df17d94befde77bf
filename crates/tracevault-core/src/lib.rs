mod clock;
mod hash;
mod path;

pub use clock::{system_clock, Clock, SharedClock, SystemClock};
pub use hash::{artifact_hash, sha256_hex, StreamingHasher};
pub use path::{
    expand_tilde, normalize_path, paths_equal, resolve_workspace_path, Error, Result,
};

//! Engine error type.
//!
//! Load-time failures (atlas files, textures, configuration) surface here
//! once; per-frame conditions like stale handles or unresolved sprite names
//! are reported through `bool`/`Option` returns and logging so that the
//! frame loop keeps running.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to read asset file {path:?}: {source}")]
    AssetRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse asset file {path:?}: {source}")]
    AssetParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to load texture {path:?}: {reason}")]
    TextureLoad { path: PathBuf, reason: String },

    #[error("sprite capacity exceeded ({capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("configuration error: {0}")]
    Config(String),
}

//! # Generation Error Types
//!
//! Terrain synthesis itself is total: every seed and coordinate is valid.
//! Errors come only from configuration, raw volume decoding, collaborators
//! and the worker pool.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the generation core.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The biome collaborator could not answer. Propagated unchanged;
    /// the generator never substitutes default terrain.
    #[error("biome source unavailable: {reason}")]
    BiomeSource {
        /// What the collaborator reported.
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration field `{field}`: {reason}")]
    InvalidConfig {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A configuration file could not be read or written.
    #[error("failed to access config file {path}: {source}")]
    ConfigIo {
        /// The file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid TOML for [`GeneratorConfig`](crate::config::GeneratorConfig).
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A configuration could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// A raw material buffer has the wrong length for the volume.
    #[error("volume size mismatch: expected {expected} voxels, got {actual}")]
    VolumeSize {
        /// Voxel count the volume needs.
        expected: usize,
        /// Voxel count supplied.
        actual: usize,
    },

    /// A raw material buffer contains an id with no [`Material`](crate::chunk::Material).
    #[error("unknown material id: {id}")]
    UnknownMaterial {
        /// The offending byte.
        id: u8,
    },

    /// The worker pool has shut down.
    #[error("generator worker pool disconnected")]
    WorkerDisconnected,
}

/// Result type for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;

//! Scene error types

use thiserror::Error;

/// Errors raised while loading or driving scenes
#[derive(Error, Debug)]
pub enum SceneError {
    /// Malformed geometry or configuration data
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unrecognized geometry type or strictly-required animation type
    #[error("Unknown {kind} type: {name}")]
    UnknownType { kind: &'static str, name: String },

    /// Geometry animation paired with a geometry variant it cannot animate
    #[error("{animation} does not support {geometry} geometry")]
    UnsupportedGeometry {
        animation: &'static str,
        geometry: &'static str,
    },

    /// Image, geometry or config fetch failed
    #[error("Failed to load asset {path}: {reason}")]
    AssetLoad { path: String, reason: String },

    /// Segment index out of bounds
    #[error("Segment index {index} out of bounds ({len} segments)")]
    Index { index: usize, len: usize },

    /// Configuration did not match the expected shape
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A scene transition is already in flight
    #[error("A scene transition is already in progress")]
    Busy,
}

impl SceneError {
    pub(crate) fn asset(path: impl Into<String>, reason: impl ToString) -> Self {
        SceneError::AssetLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;

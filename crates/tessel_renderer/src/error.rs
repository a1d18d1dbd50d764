//! Error types for scene acceleration and rendering.

use thiserror::Error;

/// Geometry that cannot be placed in an acceleration structure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("primitive {index} has no bounding box")]
    MissingBoundingBox { index: usize },
}

/// Errors surfaced by the renderer to its caller.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse render configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("camera resolution {width}x{height} is empty")]
    EmptyResolution { width: u32, height: u32 },

    #[error("failed to spawn render worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("render worker {worker} panicked: {message}")]
    WorkerPanicked { worker: usize, message: String },
}

pub type RenderResult<T> = Result<T, RenderError>;

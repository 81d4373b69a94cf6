use thiserror::Error;

use crate::geometry::{SolidId, SolidKind};
use crate::math::Axis;

/// Top-level error type for the stitch geometry engine.
#[derive(Debug, Error)]
pub enum StitchgeoError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("transform is not invertible")]
    SingularTransform,
}

/// Errors raised while turning a solid into rings.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no ring generator for solid kind {0:?}")]
    Unsupported(SolidKind),

    #[error("{kind:?} cannot be sliced along local {axis:?}")]
    AxisUnsupported { kind: SolidKind, axis: Axis },

    #[error("solid {solid} produced no usable rings: {reason}")]
    Empty { solid: SolidId, reason: String },
}

/// Errors related to running a full generation pass.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("generation pass was cancelled")]
    Cancelled,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors related to the interchange document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Convenience type alias for results using [`StitchgeoError`].
pub type Result<T> = std::result::Result<T, StitchgeoError>;

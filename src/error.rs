use thiserror::Error;

/// Failures while loading or validating a city descriptor.
/// The layout engine itself never fails.
#[derive(Debug, Error)]
pub enum CityError {
    #[error("failed to read city descriptor: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed city descriptor: {0}")]
    Json(#[from] serde_json::Error),

    #[error("road width must be positive, got {0}")]
    InvalidRoadWidth(f32),

    #[error("road line {line} needs at least two points")]
    ShortRoadLine { line: usize },

    #[error("block {block} boundary has {vertices} vertices, need at least 3")]
    DegenerateBoundary { block: usize, vertices: usize },

    #[error("block {block} coverage {coverage} is outside [0, 1]")]
    CoverageOutOfRange { block: usize, coverage: f32 },

    #[error("block {block} building size must be positive")]
    InvalidBuildingSize { block: usize },

    #[error("block {block} height range is inverted ({min} > {max})")]
    InvertedHeightRange { block: usize, min: f32, max: f32 },

    #[error("block {block} spacing {spacing} is negative")]
    NegativeSpacing { block: usize, spacing: f32 },
}

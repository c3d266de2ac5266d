use thiserror::Error;

/// Invalid simulation configuration. Raised at construction, never mid-run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("category_count must be between 1 and {max}, got {actual}")]
    CategoryCount { actual: usize, max: usize },
    #[error("attraction matrix is empty")]
    EmptyMatrix,
    #[error("attraction matrix row {row} has {actual} entries, expected {expected}")]
    NonSquareMatrix {
        row: usize,
        actual: usize,
        expected: usize,
    },
    #[error("attraction matrix is {dimension}x{dimension} but category_count is {category_count}")]
    MatrixDimension {
        dimension: usize,
        category_count: usize,
    },
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("min_distance ({min_distance}) must be smaller than max_interaction_distance ({max_interaction_distance})")]
    DistanceOrder {
        min_distance: f64,
        max_interaction_distance: f64,
    },
    #[error("friction must lie in [0, 1), got {0}")]
    Friction(f64),
    #[error("bounds.{field} must be finite, got {value}")]
    NonFiniteBounds { field: &'static str, value: f64 },
    #[error("particle {index} has category {category} but only {category_count} categories exist")]
    ParticleCategory {
        index: usize,
        category: usize,
        category_count: usize,
    },
    #[error("time scale steps must be non-empty, positive and finite")]
    TimeScaleSteps,
    #[error("time scale default index {index} is out of range for {len} steps")]
    TimeScaleIndex { index: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

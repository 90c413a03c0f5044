//! Reel Core Library
//!
//! This library provides the record layout, time alignment and grid selection
//! logic for accessing per-frame film feature files (color histograms, optical
//! flow, phase correlation) written by the analysis kernels.

pub mod align;
pub mod config;
pub mod feature_file;
pub mod film;
pub mod film_db;
pub mod grid;
pub mod sidecar;
pub mod timespan;

#[cfg(test)]
mod test_support;

pub use align::{Resolved, RecordWindow};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, FeatureKind, FullFramePosition, GridShape, RecordLayout};
pub use feature_file::{FeatureFile, FeatureFileWriter};
pub use film::Film;
pub use grid::GridSelector;
pub use sidecar::{MovieMetadata, VideoInfo, VideoProbe};
pub use timespan::{Extent, TimeSpan};

/// Result type for reel-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for reel-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration mismatch: file of {file_bytes} bytes is not a whole number of {record_bytes}-byte records")]
    ConfigMismatch { file_bytes: u64, record_bytes: u64 },

    #[error("Missing source: neither {movie} nor {data} exists")]
    MissingSource { movie: String, data: String },

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Cell index {index} out of range for a grid of {cells} cells")]
    IndexRange { index: usize, cells: usize },

    #[error("Selector {selector} is not defined for a {columns}x{rows} grid")]
    UnsupportedGrid {
        selector: &'static str,
        columns: usize,
        rows: usize,
    },

    #[error("Feature layout has no grid")]
    NoGrid,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Unknown selector: {0}")]
    UnknownSelector(String),

    #[error("Unknown feature kind: {0}")]
    UnknownFeatureKind(String),

    #[error("Invalid time span: {0}")]
    InvalidTimeSpan(String),

    #[error("Interpolation position {position} outside 0..={last}")]
    Interpolation { position: f64, last: usize },

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Record width {got} does not match layout width {expected}")]
    RecordWidth { got: usize, expected: usize },
}

//! Reel probing library
//!
//! FFmpeg-backed implementation of the core's [`VideoProbe`] seam, plus the
//! batch pass that writes metadata sidecars for a whole action directory.
//!
//! [`VideoProbe`]: reel_core::VideoProbe

pub mod gather;
pub mod progress_tracker;
pub mod video_probe;

pub use gather::{gather_sidecars, Gathered};
pub use video_probe::FfmpegProbe;

/// Result type for reel-probe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for reel-probe operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("reel core error: {0}")]
    Core(#[from] reel_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FFmpeg error: {0}")]
    Ffmpeg(#[from] ffmpeg_next::Error),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("No video stream found")]
    NoVideoStream,

    #[error("Invalid frame rate in {0}")]
    InvalidFrameRate(String),
}

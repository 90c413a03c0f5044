//! Video container probing using FFmpeg

use crate::{Error, Result};
use ffmpeg_next as ffmpeg;
use reel_core::sidecar::{VideoInfo, VideoProbe};
use std::path::Path;
use std::sync::OnceLock;

static FFMPEG_INIT: OnceLock<std::result::Result<(), ffmpeg::Error>> = OnceLock::new();

/// Initialize FFmpeg (once per process)
fn init_ffmpeg() -> Result<()> {
    let init = *FFMPEG_INIT.get_or_init(|| {
        ffmpeg::init()?;
        ffmpeg::util::log::set_level(ffmpeg::util::log::Level::Error);
        Ok(())
    });
    init.map_err(Error::from)
}

/// Reads frame rate, frame count, aspect ratio and duration from a container
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegProbe;

impl FfmpegProbe {
    pub fn new() -> Self {
        Self
    }

    /// Probes the best video stream of a file
    pub fn probe_file(&self, path: &Path) -> Result<VideoInfo> {
        init_ffmpeg()?;

        let input = ffmpeg::format::input(path)?;
        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or(Error::NoVideoStream)?;

        // Prefer the average rate; the stream rate is a guess for variable-rate files
        let mut rate = stream.avg_frame_rate();
        if rate.numerator() <= 0 || rate.denominator() <= 0 {
            rate = stream.rate();
        }
        if rate.numerator() <= 0 || rate.denominator() <= 0 {
            return Err(Error::InvalidFrameRate(path.display().to_string()));
        }
        let fps = f64::from(rate);

        let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = context.decoder().video()?;
        let aspect_ratio = if decoder.height() > 0 {
            decoder.width() as f64 / decoder.height() as f64
        } else {
            0.0
        };

        let time_base = stream.time_base();
        let duration_seconds = if stream.duration() > 0 && time_base.denominator() > 0 {
            stream.duration() as f64 * f64::from(time_base)
        } else {
            // Fallback to container duration
            input.duration().max(0) as f64 / ffmpeg::ffi::AV_TIME_BASE as f64
        };

        let frame_count = if stream.frames() > 0 {
            stream.frames() as u64
        } else {
            (duration_seconds * fps).round() as u64
        };

        log::debug!(
            "probed {}: {}x{} @ {:.3} fps, {} frames, {:.2} s",
            path.display(),
            decoder.width(),
            decoder.height(),
            fps,
            frame_count,
            duration_seconds
        );

        Ok(VideoInfo {
            fps,
            frame_count,
            aspect_ratio,
            duration_seconds,
        })
    }
}

impl VideoProbe for FfmpegProbe {
    fn probe(&self, path: &Path) -> reel_core::Result<VideoInfo> {
        self.probe_file(path)
            .map_err(|e| reel_core::Error::Probe(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_is_probe_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Missing.mov");
        let err = FfmpegProbe::new().probe(&path).unwrap_err();
        assert!(matches!(err, reel_core::Error::Probe(msg) if msg.contains("Missing.mov")));
    }

    #[test]
    fn test_garbage_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Garbage.mov");
        fs::write(&path, b"definitely not a quicktime container").unwrap();
        assert!(FfmpegProbe::new().probe_file(&path).is_err());
    }
}

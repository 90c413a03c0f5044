//! Per-film metadata sidecar
//!
//! The sidecar records the ground truth of the source video (measured frame
//! rate, frame count, aspect ratio and length) next to the feature files, so
//! that access sessions can correct for films that do not run at the
//! reference rate without reopening the video.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Contents of `<title>/<title>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieMetadata {
    pub title: String,
    /// Measured frames per second
    pub fps: f64,
    /// Frame width divided by frame height
    pub aspect: f64,
    /// Total number of frames
    pub frames: f64,
    /// Length in seconds (`frames / fps`)
    pub length: f64,
}

impl MovieMetadata {
    /// Builds sidecar contents from a probe result
    pub fn from_probe(title: &str, info: &VideoInfo) -> Self {
        Self {
            title: title.to_string(),
            fps: info.fps,
            aspect: info.aspect_ratio,
            frames: info.frame_count as f64,
            length: info.duration_seconds,
        }
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let metadata: Self = serde_json::from_reader(reader)?;
        if !metadata.fps.is_finite() || metadata.fps <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "sidecar for {} has invalid fps {}",
                metadata.title, metadata.fps
            )));
        }
        Ok(metadata)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

/// What a video probe reports about a container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub fps: f64,
    pub frame_count: u64,
    pub aspect_ratio: f64,
    pub duration_seconds: f64,
}

/// Probes a video container for its timing metadata.
///
/// Decoding lives outside this crate; implementations report failures as
/// [`Error::Probe`].
pub trait VideoProbe {
    fn probe(&self, path: &Path) -> Result<VideoInfo>;
}

/// Reads the sidecar at `sidecar_path`, probing `movie_path` and writing it
/// first if it does not exist yet
pub fn ensure_sidecar(
    title: &str,
    movie_path: &Path,
    sidecar_path: &Path,
    probe: &dyn VideoProbe,
) -> Result<MovieMetadata> {
    if sidecar_path.exists() {
        return MovieMetadata::read(sidecar_path);
    }

    let info = probe.probe(movie_path)?;
    let metadata = MovieMetadata::from_probe(title, &info);
    metadata.write(sidecar_path)?;
    log::info!(
        "wrote sidecar {} ({:.3} fps, {} frames)",
        sidecar_path.display(),
        info.fps,
        info.frame_count
    );
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;

    struct CountingProbe {
        calls: Cell<usize>,
    }

    impl VideoProbe for CountingProbe {
        fn probe(&self, _path: &Path) -> Result<VideoInfo> {
            self.calls.set(self.calls.get() + 1);
            Ok(VideoInfo {
                fps: 23.976,
                frame_count: 2400,
                aspect_ratio: 1.85,
                duration_seconds: 2400.0 / 23.976,
            })
        }
    }

    struct FailingProbe;

    impl VideoProbe for FailingProbe {
        fn probe(&self, path: &Path) -> Result<VideoInfo> {
            Err(Error::Probe(format!("cannot read {}", path.display())))
        }
    }

    #[test]
    fn test_reads_sidecar_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Psycho.json");
        fs::write(
            &path,
            r#"{"title": "Psycho", "fps": 23.976, "aspect": 1.0, "frames": 157440.0, "length": 6566.5}"#,
        )
        .unwrap();

        let metadata = MovieMetadata::read(&path).unwrap();
        assert_eq!(metadata.title, "Psycho");
        assert_eq!(metadata.fps, 23.976);
        assert_eq!(metadata.frames, 157440.0);
    }

    #[test]
    fn test_rejects_zero_fps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Broken.json");
        fs::write(
            &path,
            r#"{"title": "Broken", "fps": 0.0, "aspect": 1.0, "frames": 10.0, "length": 0.0}"#,
        )
        .unwrap();
        assert!(MovieMetadata::read(&path).is_err());
    }

    #[test]
    fn test_ensure_sidecar_probes_once() {
        let dir = tempfile::tempdir().unwrap();
        let sidecar = dir.path().join("Vertigo.json");
        let probe = CountingProbe { calls: Cell::new(0) };

        let first = ensure_sidecar("Vertigo", &dir.path().join("Vertigo.mov"), &sidecar, &probe).unwrap();
        let second = ensure_sidecar("Vertigo", &dir.path().join("Vertigo.mov"), &sidecar, &probe).unwrap();

        assert_eq!(probe.calls.get(), 1);
        assert_eq!(first, second);
        assert_eq!(first.frames, 2400.0);
    }

    #[test]
    fn test_probe_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sidecar = dir.path().join("Missing.json");
        let err = ensure_sidecar("Missing", &dir.path().join("Missing.mov"), &sidecar, &FailingProbe)
            .unwrap_err();
        assert!(matches!(err, Error::Probe(_)));
        assert!(!sidecar.exists());
    }
}

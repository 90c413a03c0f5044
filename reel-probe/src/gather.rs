//! Batch sidecar generation over an action directory

use crate::progress_tracker::ProgressTracker;
use crate::Result;
use reel_core::sidecar::{self, MovieMetadata, VideoProbe};
use std::path::{Path, PathBuf};

/// Outcome of probing one movie
#[derive(Debug)]
pub struct Gathered {
    pub title: String,
    pub movie_path: PathBuf,
    pub result: reel_core::Result<MovieMetadata>,
}

/// Finds every `<action_dir>/<title>/<file>.<extension>` movie, sorted by path
pub fn find_movies(action_dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let pattern = action_dir
        .join("*")
        .join(format!("*.{}", extension.trim_start_matches('.')));
    let mut movies = glob::glob(&pattern.to_string_lossy())?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect::<Vec<_>>();
    movies.sort();
    Ok(movies)
}

/// Title of a movie: the name of the directory holding it
fn title_of(movie_path: &Path) -> String {
    movie_path
        .parent()
        .and_then(Path::file_name)
        .or_else(|| movie_path.file_stem())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Ensures a metadata sidecar exists for every movie under `action_dir`.
///
/// Existing sidecars are kept. A movie that fails to probe is reported in its
/// [`Gathered`] entry and does not stop the batch.
pub fn gather_sidecars(
    action_dir: &Path,
    extension: &str,
    probe: &dyn VideoProbe,
) -> Result<Vec<Gathered>> {
    let movies = find_movies(action_dir, extension)?;
    log::info!(
        "found {} movies under {}",
        movies.len(),
        action_dir.display()
    );

    let tracker = ProgressTracker::new(movies.len() as u64, "sidecars");
    let gathered = movies
        .into_iter()
        .map(|movie_path| {
            let title = title_of(&movie_path);
            let sidecar_path = movie_path.with_file_name(format!("{title}.json"));
            let result = sidecar::ensure_sidecar(&title, &movie_path, &sidecar_path, probe);
            if let Err(e) = &result {
                log::warn!("{title}: {e}");
            }
            tracker.increment_and_report(10);
            Gathered {
                title,
                movie_path,
                result,
            }
        })
        .collect();
    Ok(gathered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_core::VideoInfo;
    use std::fs;

    struct FixedProbe;

    impl VideoProbe for FixedProbe {
        fn probe(&self, path: &Path) -> reel_core::Result<VideoInfo> {
            if path.to_string_lossy().contains("Broken") {
                return Err(reel_core::Error::Probe("unreadable".into()));
            }
            Ok(VideoInfo {
                fps: 24.0,
                frame_count: 480,
                aspect_ratio: 1.37,
                duration_seconds: 20.0,
            })
        }
    }

    fn touch_movie(root: &Path, title: &str) -> PathBuf {
        let dir = root.join(title);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{title}.mov"));
        fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_find_movies_sorted() {
        let root = tempfile::tempdir().unwrap();
        touch_movie(root.path(), "Vertigo");
        touch_movie(root.path(), "Alien");
        fs::write(root.path().join("Vertigo").join("Vertigo.color_lab"), b"").unwrap();

        let movies = find_movies(root.path(), "mov").unwrap();
        let titles: Vec<_> = movies.iter().map(|p| title_of(p)).collect();
        assert_eq!(titles, vec!["Alien", "Vertigo"]);
    }

    #[test]
    fn test_gather_writes_sidecars_and_survives_failures() {
        let root = tempfile::tempdir().unwrap();
        touch_movie(root.path(), "Vertigo");
        touch_movie(root.path(), "Broken");

        let gathered = gather_sidecars(root.path(), ".mov", &FixedProbe).unwrap();
        assert_eq!(gathered.len(), 2);
        assert!(gathered[0].result.is_err());
        let vertigo = gathered[1].result.as_ref().unwrap();
        assert_eq!(vertigo.title, "Vertigo");
        assert_eq!(vertigo.frames, 480.0);
        assert!(root.path().join("Vertigo").join("Vertigo.json").exists());
        assert!(!root.path().join("Broken").join("Broken.json").exists());
    }
}

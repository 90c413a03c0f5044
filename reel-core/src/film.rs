//! Per-film access to feature files
//!
//! Files follow the `<action_dir>/<title>/<title>.<extension>` convention,
//! with the source movie and the metadata sidecar next to the feature data.

use crate::align::{self, Resolved};
use crate::config::{AnalysisConfig, AnalysisConfigBuilder};
use crate::feature_file::{record_count_for_size, FeatureFile};
use crate::grid::{self, GridSelector};
use crate::sidecar::{self, MovieMetadata, VideoProbe};
use crate::timespan::TimeSpan;
use crate::{Error, Result};
use ndarray::Array2;
use std::fs;
use std::path::{Path, PathBuf};

/// Default container extension of the source movies
pub const DEFAULT_MOVIE_EXTENSION: &str = "mov";

/// Feature access for one feature type of one film
pub struct Film {
    title: String,
    movie_path: PathBuf,
    data_path: PathBuf,
    sidecar_path: PathBuf,
    config: AnalysisConfig,
    probe: Option<Box<dyn VideoProbe>>,
}

impl Film {
    /// Creates an accessor; nothing is opened until data is requested
    pub fn new<P: AsRef<Path>>(action_dir: P, title: &str, config: AnalysisConfig) -> Self {
        let film_dir = action_dir.as_ref().join(title);
        let extension = config.kind.extension();
        Self {
            title: title.to_string(),
            movie_path: film_dir.join(format!("{title}.{DEFAULT_MOVIE_EXTENSION}")),
            data_path: film_dir.join(format!("{title}.{extension}")),
            sidecar_path: film_dir.join(format!("{title}.json")),
            config,
            probe: None,
        }
    }

    /// Creates an accessor whose access rate comes from the film's sidecar,
    /// unless the builder already overrides it
    pub fn from_builder<P: AsRef<Path>>(
        action_dir: P,
        title: &str,
        builder: AnalysisConfigBuilder,
    ) -> Result<Self> {
        let sidecar_path = action_dir.as_ref().join(title).join(format!("{title}.json"));
        let builder = if sidecar_path.exists() {
            builder.with_sidecar(&MovieMetadata::read(&sidecar_path)?)
        } else {
            log::debug!("{title}: no sidecar, assuming the nominal rate");
            builder
        };
        Ok(Self::new(action_dir, title, builder.build()?))
    }

    /// Creates an accessor with a video probe attached.
    ///
    /// When the film has a movie but no sidecar yet, the movie is probed and
    /// the sidecar written first, so its measured rate becomes the access
    /// rate. A failed probe is logged and the nominal rate is kept.
    pub fn open<P: AsRef<Path>>(
        action_dir: P,
        title: &str,
        movie_extension: &str,
        builder: AnalysisConfigBuilder,
        probe: Box<dyn VideoProbe>,
    ) -> Result<Self> {
        let film_dir = action_dir.as_ref().join(title);
        let movie_path = film_dir.join(format!(
            "{title}.{}",
            movie_extension.trim_start_matches('.')
        ));
        let sidecar_path = film_dir.join(format!("{title}.json"));

        let builder = if !sidecar_path.exists() && movie_path.exists() {
            match sidecar::ensure_sidecar(title, &movie_path, &sidecar_path, probe.as_ref()) {
                Ok(metadata) => builder.with_sidecar(&metadata),
                Err(e) => {
                    log::warn!("{title}: no sidecar, assuming the nominal rate ({e})");
                    builder
                }
            }
        } else {
            builder
        };

        Ok(Self::from_builder(action_dir, title, builder)?
            .with_movie_extension(movie_extension)
            .with_probe(probe))
    }

    /// Uses a different container extension for the source movie
    pub fn with_movie_extension(mut self, extension: &str) -> Self {
        self.movie_path
            .set_extension(extension.trim_start_matches('.'));
        self
    }

    /// Attaches a video probe used for sidecars and length detection
    pub fn with_probe(mut self, probe: Box<dyn VideoProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn movie_path(&self) -> &Path {
        &self.movie_path
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn sidecar_path(&self) -> &Path {
        &self.sidecar_path
    }

    /// Reads the metadata sidecar if one has been written
    pub fn sidecar(&self) -> Result<Option<MovieMetadata>> {
        if self.sidecar_path.exists() {
            MovieMetadata::read(&self.sidecar_path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Reads the sidecar, probing the movie and writing it first if needed
    pub fn ensure_sidecar(&self) -> Result<MovieMetadata> {
        let probe = self.probe.as_deref().ok_or_else(|| {
            Error::Probe(format!(
                "no video probe available to create {}",
                self.sidecar_path.display()
            ))
        })?;
        sidecar::ensure_sidecar(&self.title, &self.movie_path, &self.sidecar_path, probe)
    }

    /// Opens the feature file with this film's layout
    pub fn open_features(&self) -> Result<FeatureFile> {
        FeatureFile::open(&self.data_path, self.config.layout)
    }

    /// Length of the film in seconds on the nominal timeline.
    ///
    /// Tries the movie itself (through the probe), then the sidecar's frame
    /// count, then the size of the feature file. A movie that fails to probe
    /// falls through to the next source.
    pub fn determine_movie_length(&self) -> Result<f64> {
        let nominal_fps = self.config.nominal_fps;

        if let Some(probe) = self.probe.as_deref() {
            if self.movie_path.exists() {
                match probe.probe(&self.movie_path) {
                    Ok(info) => {
                        let seconds = info.frame_count as f64 / nominal_fps;
                        log::debug!("{}: {} frames in movie, {:.3} s", self.title, info.frame_count, seconds);
                        return Ok(seconds);
                    }
                    Err(e) => log::warn!("{}: cannot probe movie, trying other sources ({e})", self.title),
                }
            }
        }

        if let Some(metadata) = self.sidecar()? {
            let seconds = metadata.frames / nominal_fps;
            log::debug!("{}: {} frames in sidecar, {:.3} s", self.title, metadata.frames, seconds);
            return Ok(seconds);
        }

        if self.data_path.exists() {
            let file_bytes = fs::metadata(&self.data_path)?.len();
            let records = record_count_for_size(file_bytes, &self.config.layout)?;
            let seconds = records as f64 / self.config.records_per_second();
            log::debug!("{}: {} records on disk, {:.3} s", self.title, records, seconds);
            return Ok(seconds);
        }

        Err(Error::MissingSource {
            movie: self.movie_path.display().to_string(),
            data: self.data_path.display().to_string(),
        })
    }

    /// Resolves a span into rate-corrected full-frame and grid records
    pub fn resolve_segment(&self, span: &TimeSpan) -> Result<Resolved> {
        if !self.data_path.exists() && !self.movie_path.exists() {
            return Err(Error::MissingSource {
                movie: self.movie_path.display().to_string(),
                data: self.data_path.display().to_string(),
            });
        }
        let file = self.open_features()?;
        align::resolve(&file, span, &self.config, || self.determine_movie_length())
    }

    /// Features of the selected regions for a span, as `(records, width)`
    pub fn features_for_segment(&self, span: &TimeSpan, selector: GridSelector) -> Result<Array2<f32>> {
        let resolved = self.resolve_segment(span)?;
        let features = selector.select(&resolved, &self.config.layout)?;
        Ok(grid::subsample(&features, self.config.access_stride))
    }

    /// Same as [`Film::features_for_segment`] with the selector given by name
    pub fn default_features_for_segment(&self, selector: Option<&str>, span: &TimeSpan) -> Result<Array2<f32>> {
        let selector = match selector {
            Some(name) => name.parse()?,
            None => GridSelector::default(),
        };
        self.features_for_segment(span, selector)
    }
}

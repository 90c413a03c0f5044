//! Feature kinds, record layouts and analysis configuration

use crate::sidecar::MovieMetadata;
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Size in bytes of one stored value (little-endian f32)
pub const VALUE_BYTES: usize = 4;

/// Reference frame rate every feature file was written against
pub const REFERENCE_FPS: f64 = 24.0;

/// Feature types produced by the analysis kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// L*a*b* color histograms, full frame plus a 4x4 grid
    ColorLab,
    /// Phase correlation peaks, 8x8 grid with the full frame stored last
    PhaseCorr,
    /// TVL1 optical flow direction histograms
    Tvl1,
    /// Reduced-dimension Lucas-Kanade optical flow, full frame only
    OpticalFlow24,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 4] = [
        FeatureKind::ColorLab,
        FeatureKind::PhaseCorr,
        FeatureKind::Tvl1,
        FeatureKind::OpticalFlow24,
    ];

    /// File extension (without the dot) of this feature type's data file
    pub fn extension(&self) -> &'static str {
        match self {
            FeatureKind::ColorLab => "color_lab",
            FeatureKind::PhaseCorr => "phasecorr",
            FeatureKind::Tvl1 => "tvl1",
            FeatureKind::OpticalFlow24 => "opticalflow24",
        }
    }

    /// Record layout the extraction kernel writes for this feature type
    pub fn default_layout(&self) -> RecordLayout {
        match self {
            FeatureKind::ColorLab => RecordLayout {
                grid: Some(GridShape::new(4, 4)),
                channels: 3,
                bins: 16,
                full_channels: 3,
                full_frame: FullFramePosition::First,
            },
            FeatureKind::PhaseCorr => RecordLayout {
                grid: Some(GridShape::new(8, 8)),
                channels: 2,
                bins: 1,
                full_channels: 2,
                full_frame: FullFramePosition::Last,
            },
            FeatureKind::Tvl1 => RecordLayout {
                grid: Some(GridShape::new(4, 4)),
                channels: 1,
                bins: 8,
                full_channels: 2,
                full_frame: FullFramePosition::First,
            },
            FeatureKind::OpticalFlow24 => RecordLayout {
                grid: None,
                channels: 1,
                bins: 512,
                full_channels: 1,
                full_frame: FullFramePosition::First,
            },
        }
    }

    /// Source frames consumed per analysis frame at extraction time
    pub fn default_stride(&self) -> u32 {
        match self {
            FeatureKind::ColorLab => 6,
            _ => 1,
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FeatureKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim_start_matches('.');
        match name {
            "color_lab" | "color" => Ok(FeatureKind::ColorLab),
            "phasecorr" | "phase" => Ok(FeatureKind::PhaseCorr),
            "tvl1" => Ok(FeatureKind::Tvl1),
            "opticalflow24" | "opticalflow" => Ok(FeatureKind::OpticalFlow24),
            _ => Err(Error::UnknownFeatureKind(s.to_string())),
        }
    }
}

/// Spatial partition of a frame, stored row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub columns: usize,
    pub rows: usize,
}

impl GridShape {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    pub fn cells(&self) -> usize {
        self.columns * self.rows
    }

    /// Row-major index of the cell at (row, column)
    pub fn cell_index(&self, row: usize, column: usize) -> usize {
        row * self.columns + column
    }
}

/// Where the full-frame block sits inside a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullFramePosition {
    First,
    Last,
}

/// Per-record shape of a feature file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    /// Grid of sub-regions, `None` for full-frame-only features
    pub grid: Option<GridShape>,
    /// Channels per grid cell
    pub channels: usize,
    /// Bins per channel, shared by the cells and the full frame
    pub bins: usize,
    /// Channels of the full-frame block
    pub full_channels: usize,
    pub full_frame: FullFramePosition,
}

impl RecordLayout {
    pub fn cells(&self) -> usize {
        self.grid.map(|g| g.cells()).unwrap_or(0)
    }

    /// Number of values describing a single grid cell
    pub fn cell_width(&self) -> usize {
        self.channels * self.bins
    }

    /// Number of values in the full-frame block
    pub fn full_width(&self) -> usize {
        self.full_channels * self.bins
    }

    /// Number of values in one record
    pub fn record_width(&self) -> usize {
        self.full_width() + self.cells() * self.cell_width()
    }

    pub fn record_bytes(&self) -> usize {
        self.record_width() * VALUE_BYTES
    }

    /// Offset (in values) of the full-frame block inside a record
    pub fn full_offset(&self) -> usize {
        match self.full_frame {
            FullFramePosition::First => 0,
            FullFramePosition::Last => self.cells() * self.cell_width(),
        }
    }

    /// Offset (in values) of the first grid cell inside a record
    pub fn grid_offset(&self) -> usize {
        match self.full_frame {
            FullFramePosition::First => self.full_width(),
            FullFramePosition::Last => 0,
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(grid) = self.grid {
            if grid.columns == 0 || grid.rows == 0 {
                return Err(Error::InvalidConfig(format!(
                    "grid divisions must be >= 1, got {}x{}",
                    grid.columns, grid.rows
                )));
            }
        }
        if self.bins == 0 || self.channels == 0 || self.full_channels == 0 {
            return Err(Error::InvalidConfig(
                "bins and channel counts must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolved extraction/access parameters for one feature type of one film
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub kind: FeatureKind,
    pub layout: RecordLayout,
    /// Rate assumed when the file was written
    pub nominal_fps: f64,
    /// Source frames per analysis frame
    pub stride: u32,
    /// True source rate of the film
    pub access_fps: f64,
    /// Keep every n-th record after rate correction
    pub access_stride: usize,
}

impl AnalysisConfig {
    pub fn builder(kind: FeatureKind) -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::new(kind)
    }

    /// Preset configuration for a feature kind
    pub fn for_kind(kind: FeatureKind) -> Result<Self> {
        Self::builder(kind).build()
    }

    /// Analysis records per second of film, on the nominal timeline
    pub fn records_per_second(&self) -> f64 {
        self.nominal_fps / self.stride as f64
    }
}

/// Validating builder for [`AnalysisConfig`]
#[derive(Debug, Clone)]
pub struct AnalysisConfigBuilder {
    kind: FeatureKind,
    layout: RecordLayout,
    nominal_fps: f64,
    stride: u32,
    access_fps: Option<f64>,
    sidecar_fps: Option<f64>,
    access_stride: usize,
}

impl AnalysisConfigBuilder {
    pub fn new(kind: FeatureKind) -> Self {
        Self {
            kind,
            layout: kind.default_layout(),
            nominal_fps: REFERENCE_FPS,
            stride: kind.default_stride(),
            access_fps: None,
            sidecar_fps: None,
            access_stride: 1,
        }
    }

    pub fn nominal_fps(mut self, fps: f64) -> Self {
        self.nominal_fps = fps;
        self
    }

    pub fn stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    /// Overrides the access rate, taking precedence over the sidecar
    pub fn access_fps(mut self, fps: f64) -> Self {
        self.access_fps = Some(fps);
        self
    }

    pub fn access_stride(mut self, step: usize) -> Self {
        self.access_stride = step;
        self
    }

    pub fn grid(mut self, columns: usize, rows: usize) -> Self {
        self.layout.grid = Some(GridShape::new(columns, rows));
        self
    }

    pub fn bins(mut self, bins: usize) -> Self {
        self.layout.bins = bins;
        self
    }

    /// Sets the channel count of both the grid cells and the full frame
    pub fn channels(mut self, channels: usize) -> Self {
        self.layout.channels = channels;
        self.layout.full_channels = channels;
        self
    }

    pub fn layout(mut self, layout: RecordLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Merges the film's measured frame rate from its metadata sidecar
    pub fn with_sidecar(mut self, metadata: &MovieMetadata) -> Self {
        self.sidecar_fps = Some(metadata.fps);
        self
    }

    /// Applies a string-keyed override; unknown keys are rejected
    pub fn set(self, key: &str, value: &str) -> Result<Self> {
        fn parse<T>(key: &str, value: &str) -> Result<T>
        where
            T: FromStr,
            T::Err: fmt::Display,
        {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| Error::InvalidConfig(format!("{key}={value}: {e}")))
        }
        let as_f64 = || parse::<f64>(key, value);
        let as_usize = || parse::<usize>(key, value);

        Ok(match key {
            "fps" => self.nominal_fps(as_f64()?),
            "afps" => self.access_fps(as_f64()?),
            "stride" => self.stride(parse::<u32>(key, value)?),
            "access_stride" => self.access_stride(as_usize()?),
            "bins" => self.bins(as_usize()?),
            "channels" => self.channels(as_usize()?),
            "grid_divs_x" => {
                let rows = self.layout.grid.map(|g| g.rows).unwrap_or(1);
                self.grid(as_usize()?, rows)
            }
            "grid_divs_y" => {
                let columns = self.layout.grid.map(|g| g.columns).unwrap_or(1);
                self.grid(columns, as_usize()?)
            }
            _ => return Err(Error::UnknownParameter(key.to_string())),
        })
    }

    pub fn build(self) -> Result<AnalysisConfig> {
        if self.stride == 0 {
            return Err(Error::InvalidConfig("stride must be >= 1".to_string()));
        }
        if self.access_stride == 0 {
            return Err(Error::InvalidConfig(
                "access_stride must be >= 1".to_string(),
            ));
        }
        let access_fps = self
            .access_fps
            .or(self.sidecar_fps)
            .unwrap_or(self.nominal_fps);
        for (name, fps) in [("fps", self.nominal_fps), ("afps", access_fps)] {
            if !fps.is_finite() || fps <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a positive number, got {fps}"
                )));
            }
        }
        self.layout.validate()?;

        Ok(AnalysisConfig {
            kind: self.kind,
            layout: self.layout,
            nominal_fps: self.nominal_fps,
            stride: self.stride,
            access_fps,
            access_stride: self.access_stride,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(fps: f64) -> MovieMetadata {
        MovieMetadata {
            title: "Vertigo".to_string(),
            fps,
            aspect: 1.85,
            frames: 1000.0,
            length: 1000.0 / fps,
        }
    }

    #[test]
    fn test_color_layout_widths() {
        let layout = FeatureKind::ColorLab.default_layout();
        assert_eq!(layout.cells(), 16);
        assert_eq!(layout.full_width(), 48);
        assert_eq!(layout.cell_width(), 48);
        assert_eq!(layout.record_width(), 17 * 48);
        assert_eq!(layout.record_bytes(), 17 * 3 * 16 * 4);
    }

    #[test]
    fn test_phasecorr_full_frame_is_last() {
        let layout = FeatureKind::PhaseCorr.default_layout();
        assert_eq!(layout.record_width(), 65 * 2);
        assert_eq!(layout.grid_offset(), 0);
        assert_eq!(layout.full_offset(), 128);
    }

    #[test]
    fn test_tvl1_and_opticalflow_widths() {
        assert_eq!(FeatureKind::Tvl1.default_layout().record_width(), 144);
        let flow = FeatureKind::OpticalFlow24.default_layout();
        assert_eq!(flow.cells(), 0);
        assert_eq!(flow.record_width(), 512);
    }

    #[test]
    fn test_color_preset_record_rate() {
        let config = AnalysisConfig::for_kind(FeatureKind::ColorLab).unwrap();
        assert_eq!(config.stride, 6);
        assert_eq!(config.records_per_second(), 4.0);
        assert_eq!(config.access_fps, 24.0);
    }

    #[test]
    fn test_sidecar_fps_and_override_precedence() {
        let from_sidecar = AnalysisConfig::builder(FeatureKind::PhaseCorr)
            .with_sidecar(&metadata(23.976))
            .build()
            .unwrap();
        assert_eq!(from_sidecar.access_fps, 23.976);

        let overridden = AnalysisConfig::builder(FeatureKind::PhaseCorr)
            .access_fps(25.0)
            .with_sidecar(&metadata(23.976))
            .build()
            .unwrap();
        assert_eq!(overridden.access_fps, 25.0);
    }

    #[test]
    fn test_string_overrides() {
        let config = AnalysisConfig::builder(FeatureKind::ColorLab)
            .set("stride", "4")
            .unwrap()
            .set("grid_divs_x", "8")
            .unwrap()
            .set("grid_divs_y", "8")
            .unwrap()
            .set("afps", "29.97")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.stride, 4);
        assert_eq!(config.layout.grid, Some(GridShape::new(8, 8)));
        assert_eq!(config.access_fps, 29.97);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = AnalysisConfig::builder(FeatureKind::ColorLab)
            .set("strde", "4")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownParameter(k) if k == "strde"));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(AnalysisConfig::builder(FeatureKind::ColorLab)
            .stride(0)
            .build()
            .is_err());
        assert!(AnalysisConfig::builder(FeatureKind::ColorLab)
            .grid(0, 4)
            .build()
            .is_err());
        assert!(AnalysisConfig::builder(FeatureKind::ColorLab)
            .access_fps(f64::NAN)
            .build()
            .is_err());
        assert!(AnalysisConfig::builder(FeatureKind::ColorLab)
            .set("stride", "six")
            .is_err());
    }

    #[test]
    fn test_feature_kind_parsing() {
        assert_eq!(".color_lab".parse::<FeatureKind>().unwrap(), FeatureKind::ColorLab);
        assert_eq!("tvl1".parse::<FeatureKind>().unwrap(), FeatureKind::Tvl1);
        assert!("histogram".parse::<FeatureKind>().is_err());
        for kind in FeatureKind::ALL {
            assert_eq!(kind.to_string().parse::<FeatureKind>().unwrap(), kind);
        }
    }
}

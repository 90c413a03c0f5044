//! Time/frame alignment
//!
//! Feature files were written assuming every film runs at the reference rate,
//! so caller-facing seconds live on that nominal timeline:
//!
//! - record `i` sits at `i * stride / nominal_fps` seconds;
//! - a span selects records `floor(start * rps) .. + floor(duration * rps)`
//!   where `rps = nominal_fps / stride`;
//! - the selected records are then resampled by `access_fps / nominal_fps` so
//!   their count follows the film's true rate.
//!
//! Spans reaching past the end of the file are truncated to the records that
//! exist; an onset at or past the end yields zero records.

use crate::config::{AnalysisConfig, RecordLayout};
use crate::feature_file::FeatureFile;
use crate::timespan::{Extent, TimeSpan};
use crate::{Error, Result};
use ndarray::{s, Array1, Array2, Array3, Array4, ArrayView1};
use std::ops::Range;

/// Slack applied before flooring so that `n / rate * rate` maps back to `n`
const FRAME_TOLERANCE: f64 = 1e-9;

/// Number of whole frames covering `seconds` at `rate` frames per second
pub fn frames_for_seconds(seconds: f64, rate: f64) -> usize {
    let frames = (seconds * rate + FRAME_TOLERANCE).floor();
    if frames.is_finite() && frames > 0.0 {
        frames as usize
    } else {
        0
    }
}

/// A contiguous run of records inside a feature file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordWindow {
    pub onset: usize,
    pub len: usize,
}

impl RecordWindow {
    pub fn end(&self) -> usize {
        self.onset + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.onset..self.end()
    }
}

/// Computes the record window a span covers, clamped to `total_records`.
///
/// `film_length` is only consulted for rest-of-film spans and must return the
/// film's length in nominal seconds.
pub fn window_for_span<F>(
    span: &TimeSpan,
    config: &AnalysisConfig,
    total_records: usize,
    film_length: F,
) -> Result<RecordWindow>
where
    F: FnOnce() -> Result<f64>,
{
    let rps = config.records_per_second();
    let requested_onset = frames_for_seconds(span.start(), rps);
    let requested_len = match span.extent() {
        Extent::Seconds(duration) => frames_for_seconds(duration, rps),
        Extent::RestOfFilm => {
            let length = film_length()?;
            frames_for_seconds(length, rps).saturating_sub(requested_onset)
        }
    };

    let onset = requested_onset.min(total_records);
    let len = requested_len.min(total_records - onset);
    if onset != requested_onset || len != requested_len {
        log::warn!(
            "span [{}] truncated from records {}..{} to {}..{} ({} available)",
            span,
            requested_onset,
            requested_onset + requested_len,
            onset,
            onset + len,
            total_records
        );
    }
    log::debug!(
        "span [{}] -> records {}..{} at {:.3} records/s",
        span,
        onset,
        onset + len,
        rps
    );

    Ok(RecordWindow { onset, len })
}

/// Linearly interpolates one record at a fractional position.
///
/// Positions outside `0..=last` are rejected rather than extrapolated.
pub fn sample_at(records: &Array2<f32>, position: f64) -> Result<Array1<f32>> {
    let rows = records.nrows();
    let last = rows.saturating_sub(1);
    if rows == 0 || !position.is_finite() || position < 0.0 || position > last as f64 {
        return Err(Error::Interpolation { position, last });
    }

    let below = position.floor() as usize;
    let frac = (position - below as f64) as f32;
    let lower = records.row(below);
    if frac == 0.0 || below == last {
        return Ok(lower.to_owned());
    }
    let upper = records.row(below + 1);
    Ok(blend(lower, upper, frac))
}

fn blend(lower: ArrayView1<f32>, upper: ArrayView1<f32>, frac: f32) -> Array1<f32> {
    &lower * (1.0 - frac) + &upper * frac
}

/// Resamples records along the time axis from `source_rate` to `target_rate`.
///
/// Output sample `j` is taken at input position `j * source_rate /
/// target_rate`; only positions inside the input are produced, giving
/// `floor((n - 1) * target_rate / source_rate) + 1` records. Equal rates
/// return an exact copy.
///
/// With `r = target_rate / source_rate`, the count differs from `n * r` by
/// less than `max(r, 1)` records. Upsampling always comes out short, since
/// the stretch after the last input record is not extrapolated; only for
/// `r <= 2` does that keep it within one record of `floor(n * r)`.
pub fn interpolate_time(
    records: &Array2<f32>,
    source_rate: f64,
    target_rate: f64,
) -> Result<Array2<f32>> {
    let rows = records.nrows();
    if rows == 0 || source_rate == target_rate {
        return Ok(records.to_owned());
    }

    let step = source_rate / target_rate;
    let last = (rows - 1) as f64;
    let count = frames_for_seconds(last, 1.0 / step) + 1;

    let mut out = Array2::<f32>::zeros((count, records.ncols()));
    for (j, mut row) in out.rows_mut().into_iter().enumerate() {
        // the tolerance in `count` can overshoot the last record by a hair
        let position = (j as f64 * step).min(last);
        row.assign(&sample_at(records, position)?);
    }
    Ok(out)
}

/// Records resolved for a time span, split into full-frame and grid parts
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// `(records, full_channels, bins)`
    pub full: Array3<f32>,
    /// `(records, cells, channels, bins)`, `None` for grid-less features
    pub grid: Option<Array4<f32>>,
    /// Records read from the file, before rate correction
    pub window: RecordWindow,
}

impl Resolved {
    /// Number of records after rate correction
    pub fn len(&self) -> usize {
        self.full.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits `(records, record_width)` rows into the full-frame and grid parts
pub fn split_records(
    records: &Array2<f32>,
    layout: &RecordLayout,
) -> Result<(Array3<f32>, Option<Array4<f32>>)> {
    let rows = records.nrows();

    let full_start = layout.full_offset();
    let full = records
        .slice(s![.., full_start..full_start + layout.full_width()])
        .to_owned()
        .into_shape_with_order((rows, layout.full_channels, layout.bins))?;

    let grid = match layout.grid {
        Some(grid) => {
            let grid_start = layout.grid_offset();
            let grid_width = grid.cells() * layout.cell_width();
            let cells = records
                .slice(s![.., grid_start..grid_start + grid_width])
                .to_owned()
                .into_shape_with_order((rows, grid.cells(), layout.channels, layout.bins))?;
            Some(cells)
        }
        None => None,
    };

    Ok((full, grid))
}

/// Resolves a span against an open feature file
pub fn resolve<F>(
    file: &FeatureFile,
    span: &TimeSpan,
    config: &AnalysisConfig,
    film_length: F,
) -> Result<Resolved>
where
    F: FnOnce() -> Result<f64>,
{
    if file.layout() != &config.layout {
        return Err(Error::InvalidConfig(
            "feature file was opened with a different layout".to_string(),
        ));
    }

    let window = window_for_span(span, config, file.record_count(), film_length)?;
    let records = file.read_records(window.range())?;
    let corrected = interpolate_time(&records, config.nominal_fps, config.access_fps)?;
    if corrected.nrows() != records.nrows() {
        log::debug!(
            "rate corrected {} -> {} records ({} fps nominal, {} fps access)",
            records.nrows(),
            corrected.nrows(),
            config.nominal_fps,
            config.access_fps
        );
    }

    let (full, grid) = split_records(&corrected, &config.layout)?;
    Ok(Resolved { full, grid, window })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureKind;
    use crate::test_support::{ramp_value, write_ramp_file};
    use ndarray::array;
    use std::path::Path;

    fn color_config(stride: u32, access_fps: f64) -> AnalysisConfig {
        AnalysisConfig::builder(FeatureKind::ColorLab)
            .stride(stride)
            .access_fps(access_fps)
            .build()
            .unwrap()
    }

    fn open_ramp(path: &Path, config: &AnalysisConfig, records: usize) -> FeatureFile {
        write_ramp_file(path, config.layout, records);
        FeatureFile::open(path, config.layout).unwrap()
    }

    fn no_length() -> Result<f64> {
        panic!("film length should not be needed for a fixed duration")
    }

    #[test]
    fn test_frames_for_seconds_round_trips() {
        assert_eq!(frames_for_seconds(25.0, 4.0), 100);
        assert_eq!(frames_for_seconds(100.0 / 3.0, 3.0), 100);
        assert_eq!(frames_for_seconds(0.2499, 4.0), 0);
        assert_eq!(frames_for_seconds(-3.0, 4.0), 0);
    }

    #[test]
    fn test_scenario_window_40_to_60() {
        let dir = tempfile::tempdir().unwrap();
        let config = color_config(6, 24.0);
        let file = open_ramp(&dir.path().join("Film.color_lab"), &config, 100);

        let span = TimeSpan::new(10.0, 5.0).unwrap();
        let resolved = resolve(&file, &span, &config, no_length).unwrap();

        assert_eq!(resolved.window, RecordWindow { onset: 40, len: 20 });
        assert_eq!(resolved.len(), 20);
        assert_eq!(resolved.full.dim(), (20, 3, 16));
        let grid = resolved.grid.as_ref().unwrap();
        assert_eq!(grid.dim(), (20, 16, 3, 16));

        // full frame comes first in color records
        assert_eq!(resolved.full[[0, 0, 0]], ramp_value(40, 0));
        assert_eq!(grid[[19, 15, 2, 15]], ramp_value(59, 48 + 16 * 48 - 1));
    }

    #[test]
    fn test_whole_film_returns_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let config = color_config(6, 24.0);
        let file = open_ramp(&dir.path().join("Film.color_lab"), &config, 100);
        let total_length = 100.0 / config.records_per_second();

        let explicit = TimeSpan::new(0.0, total_length).unwrap();
        assert_eq!(resolve(&file, &explicit, &config, no_length).unwrap().len(), 100);

        let rest = TimeSpan::whole_film();
        let resolved = resolve(&file, &rest, &config, || Ok(total_length)).unwrap();
        assert_eq!(resolved.window, RecordWindow { onset: 0, len: 100 });
    }

    #[test]
    fn test_rest_of_film_from_offset() {
        let dir = tempfile::tempdir().unwrap();
        let config = color_config(6, 24.0);
        let file = open_ramp(&dir.path().join("Film.color_lab"), &config, 100);

        let span = TimeSpan::rest_of_film(20.0).unwrap();
        let resolved = resolve(&file, &span, &config, || Ok(25.0)).unwrap();
        assert_eq!(resolved.window, RecordWindow { onset: 80, len: 20 });
    }

    #[test]
    fn test_spans_past_end_are_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let config = color_config(6, 24.0);
        let file = open_ramp(&dir.path().join("Film.color_lab"), &config, 100);

        let overlapping = TimeSpan::new(20.0, 60.0).unwrap();
        let resolved = resolve(&file, &overlapping, &config, no_length).unwrap();
        assert_eq!(resolved.window, RecordWindow { onset: 80, len: 20 });

        let beyond = TimeSpan::new(25.0, 10.0).unwrap();
        let resolved = resolve(&file, &beyond, &config, no_length).unwrap();
        assert!(resolved.is_empty());
        assert_eq!(resolved.grid.unwrap().dim(), (0, 16, 3, 16));

        let far_beyond = TimeSpan::new(1.0e5, 1.0).unwrap();
        assert!(resolve(&file, &far_beyond, &config, no_length).unwrap().is_empty());
    }

    #[test]
    fn test_unbounded_duration_reads_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = color_config(6, 24.0);
        let file = open_ramp(&dir.path().join("Film.color_lab"), &config, 100);

        let span = TimeSpan::new(10.0, f64::INFINITY).unwrap();
        let resolved = resolve(&file, &span, &config, || Ok(25.0)).unwrap();
        assert_eq!(resolved.window, RecordWindow { onset: 40, len: 60 });
    }

    #[test]
    fn test_missing_length_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let config = color_config(6, 24.0);
        let file = open_ramp(&dir.path().join("Film.color_lab"), &config, 10);

        let err = resolve(&file, &TimeSpan::whole_film(), &config, || {
            Err(Error::MissingSource {
                movie: "Film.mov".to_string(),
                data: "Film.color_lab".to_string(),
            })
        })
        .unwrap_err();
        assert!(matches!(err, Error::MissingSource { .. }));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = color_config(6, 29.97);
        let file = open_ramp(&dir.path().join("Film.color_lab"), &config, 100);
        let span = TimeSpan::new(3.0, 12.5).unwrap();

        let first = resolve(&file, &span, &config, no_length).unwrap();
        let second = resolve(&file, &span, &config, no_length).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rate_corrected_count_tracks_access_fps() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::builder(FeatureKind::Tvl1)
            .access_fps(30.0)
            .build()
            .unwrap();
        let file = open_ramp(&dir.path().join("Film.tvl1"), &config, 24 * 10);

        let duration = 2.0;
        let resolved = resolve(&file, &TimeSpan::new(1.0, duration).unwrap(), &config, no_length).unwrap();
        assert_eq!(resolved.window.len, 48);

        let expected = (duration * config.access_fps / config.stride as f64).floor() as i64;
        assert!((resolved.len() as i64 - expected).abs() <= 1);
    }

    #[test]
    fn test_upsampled_count_falls_short_by_less_than_ratio() {
        // 5 s at 24 fps read back at 60 fps: r = 2.5
        let records = Array2::from_shape_fn((120, 1), |(i, _)| i as f32);
        let resampled = interpolate_time(&records, 24.0, 60.0).unwrap();
        assert_eq!(resampled.nrows(), 298);
        assert!((resampled[[297, 0]] - 118.8).abs() < 1e-3);

        let ratio = 60.0 / 24.0;
        let shortfall = 120.0 * ratio - resampled.nrows() as f64;
        assert!(shortfall > 0.0 && shortfall < ratio);
    }

    #[test]
    fn test_interpolate_identity_is_exact() {
        let records = array![[1.0f32, 2.0], [3.0, 4.0], [5.0, 6.0]];
        assert_eq!(interpolate_time(&records, 24.0, 24.0).unwrap(), records);
    }

    #[test]
    fn test_interpolate_upsamples_linearly() {
        let records = array![[0.0f32, 10.0], [2.0, 30.0], [4.0, 50.0]];
        let resampled = interpolate_time(&records, 24.0, 48.0).unwrap();
        assert_eq!(
            resampled,
            array![
                [0.0f32, 10.0],
                [1.0, 20.0],
                [2.0, 30.0],
                [3.0, 40.0],
                [4.0, 50.0]
            ]
        );
    }

    #[test]
    fn test_interpolate_downsamples_without_extrapolating() {
        let records = Array2::from_shape_fn((7, 1), |(i, _)| i as f32);
        let resampled = interpolate_time(&records, 30.0, 20.0).unwrap();
        // positions 0, 1.5, 3, 4.5, 6
        assert_eq!(resampled.column(0).to_vec(), vec![0.0, 1.5, 3.0, 4.5, 6.0]);
    }

    #[test]
    fn test_sample_outside_range_fails() {
        let records = array![[1.0f32], [2.0]];
        assert!(matches!(
            sample_at(&records, 1.5),
            Err(Error::Interpolation { last: 1, .. })
        ));
        assert!(sample_at(&records, -0.1).is_err());
        assert_eq!(sample_at(&records, 0.25).unwrap()[0], 1.25);
        assert!(sample_at(&Array2::<f32>::zeros((0, 1)), 0.0).is_err());
    }

    #[test]
    fn test_split_full_frame_last() {
        let layout = FeatureKind::PhaseCorr.default_layout();
        let records = Array2::from_shape_fn((2, layout.record_width()), |(r, v)| ramp_value(r, v));
        let (full, grid) = split_records(&records, &layout).unwrap();
        let grid = grid.unwrap();

        assert_eq!(full.dim(), (2, 2, 1));
        assert_eq!(grid.dim(), (2, 64, 2, 1));
        assert_eq!(full[[1, 0, 0]], ramp_value(1, 128));
        assert_eq!(grid[[1, 63, 1, 0]], ramp_value(1, 127));
    }

    #[test]
    fn test_split_without_grid() {
        let layout = FeatureKind::OpticalFlow24.default_layout();
        let records = Array2::<f32>::ones((3, 512));
        let (full, grid) = split_records(&records, &layout).unwrap();
        assert_eq!(full.dim(), (3, 1, 512));
        assert!(grid.is_none());
    }
}

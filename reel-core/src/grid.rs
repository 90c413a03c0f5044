//! Named grid-cell selectors
//!
//! Grid cells are numbered row-major. For a 4x4 grid:
//!
//! ```text
//!  0  1  2  3
//!  4  5  6  7
//!  8  9 10 11
//! 12 13 14 15
//! ```
//!
//! `center-quad` keeps 5, 6, 9, 10; `middle-band` keeps 4..=11; `plus-band`
//! keeps the middle band plus 1, 2, 13, 14.

use crate::align::Resolved;
use crate::config::{GridShape, RecordLayout};
use crate::{Error, Result};
use ndarray::{s, Array2, Axis};
use std::fmt;
use std::str::FromStr;

/// Selector used when none is named
pub const DEFAULT_SELECTOR: GridSelector = GridSelector::MiddleBand;

/// A fixed pattern of frame regions returned by an access call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridSelector {
    /// The dedicated full-frame block
    Full,
    /// Every grid cell
    All,
    /// The 2x2 block nearest the grid center
    CenterQuad,
    /// The middle two rows, full width
    MiddleBand,
    /// The middle band plus the middle two columns above and below it
    PlusBand,
}

impl GridSelector {
    pub const ALL: [GridSelector; 5] = [
        GridSelector::Full,
        GridSelector::All,
        GridSelector::CenterQuad,
        GridSelector::MiddleBand,
        GridSelector::PlusBand,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GridSelector::Full => "full",
            GridSelector::All => "all",
            GridSelector::CenterQuad => "center-quad",
            GridSelector::MiddleBand => "middle-band",
            GridSelector::PlusBand => "plus-band",
        }
    }

    /// Row-major grid cells this selector keeps.
    ///
    /// `Full` reads the full-frame block instead of grid cells and yields an
    /// empty list. The band and quad selectors need an even number (>= 2) of
    /// divisions along the axes they center on.
    pub fn cell_indices(&self, grid: GridShape) -> Result<Vec<usize>> {
        let unsupported = || Error::UnsupportedGrid {
            selector: self.name(),
            columns: grid.columns,
            rows: grid.rows,
        };

        let cells = match self {
            GridSelector::Full => Vec::new(),
            GridSelector::All => (0..grid.cells()).collect(),
            GridSelector::CenterQuad => {
                let rows = middle_pair(grid.rows).ok_or_else(unsupported)?;
                let columns = middle_pair(grid.columns).ok_or_else(unsupported)?;
                rows.iter()
                    .flat_map(|&r| columns.iter().map(move |&c| grid.cell_index(r, c)))
                    .collect()
            }
            GridSelector::MiddleBand => {
                let rows = middle_pair(grid.rows).ok_or_else(unsupported)?;
                rows.iter()
                    .flat_map(|&r| (0..grid.columns).map(move |c| grid.cell_index(r, c)))
                    .collect()
            }
            GridSelector::PlusBand => {
                let rows = middle_pair(grid.rows).ok_or_else(unsupported)?;
                let columns = middle_pair(grid.columns).ok_or_else(unsupported)?;
                (0..grid.rows)
                    .flat_map(|r| (0..grid.columns).map(move |c| (r, c)))
                    .filter(|(r, c)| rows.contains(r) || columns.contains(c))
                    .map(|(r, c)| grid.cell_index(r, c))
                    .collect()
            }
        };
        Ok(cells)
    }

    /// Width of one output row for a layout
    pub fn width(&self, layout: &RecordLayout) -> Result<usize> {
        match self {
            GridSelector::Full => Ok(layout.full_width()),
            _ => {
                let grid = layout.grid.ok_or(Error::NoGrid)?;
                Ok(self.cell_indices(grid)?.len() * layout.cell_width())
            }
        }
    }

    /// Gathers the selected regions into a `(records, width)` array
    pub fn select(&self, resolved: &Resolved, layout: &RecordLayout) -> Result<Array2<f32>> {
        let records = resolved.len();

        if *self == GridSelector::Full {
            let width = layout.full_width();
            return Ok(resolved
                .full
                .to_owned()
                .into_shape_with_order((records, width))?);
        }

        let shape = layout.grid.ok_or(Error::NoGrid)?;
        let grid = resolved.grid.as_ref().ok_or(Error::NoGrid)?;
        let cells = grid.len_of(Axis(1));
        let indices = self.cell_indices(shape)?;
        if let Some(&index) = indices.iter().find(|&&i| i >= cells) {
            return Err(Error::IndexRange { index, cells });
        }

        let width = indices.len() * layout.cell_width();
        Ok(grid
            .select(Axis(1), &indices)
            .into_shape_with_order((records, width))?)
    }
}

impl Default for GridSelector {
    fn default() -> Self {
        DEFAULT_SELECTOR
    }
}

impl fmt::Display for GridSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GridSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "full" => Ok(GridSelector::Full),
            "all" | "gridded" | "allgrid" => Ok(GridSelector::All),
            "center-quad" | "centerquad" => Ok(GridSelector::CenterQuad),
            "middle-band" | "midband" => Ok(GridSelector::MiddleBand),
            "plus-band" | "plusband" => Ok(GridSelector::PlusBand),
            _ => Err(Error::UnknownSelector(s.to_string())),
        }
    }
}

fn middle_pair(divisions: usize) -> Option<[usize; 2]> {
    if divisions >= 2 && divisions % 2 == 0 {
        Some([divisions / 2 - 1, divisions / 2])
    } else {
        None
    }
}

/// Keeps every `step`-th record, starting with the first
pub fn subsample(features: &Array2<f32>, step: usize) -> Array2<f32> {
    let step = step.max(1) as isize;
    features.slice(s![..;step, ..]).to_owned()
}

/// Zeroes every channel but the first (L of L*a*b*) in each block of
/// `channels * bins` values
pub fn luminance_only(features: &Array2<f32>, channels: usize, bins: usize) -> Result<Array2<f32>> {
    let (records, width) = features.dim();
    let block = channels * bins;
    if block == 0 || width % block != 0 {
        return Err(Error::RecordWidth {
            got: width,
            expected: block,
        });
    }

    let mut blocks = features
        .to_owned()
        .into_shape_with_order((records, width / block, channels, bins))?;
    blocks.slice_mut(s![.., .., 1.., ..]).fill(0.0);
    Ok(blocks.into_shape_with_order((records, width))?)
}

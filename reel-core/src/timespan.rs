//! Time spans of film time, in seconds on the nominal timeline

use crate::{Error, Result};
use std::fmt;

/// Tolerance allowed between a supplied end time and start + duration
const AGREEMENT_TOLERANCE: f64 = f32::EPSILON as f64;

/// How far a span reaches past its start
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extent {
    /// A fixed number of seconds
    Seconds(f64),
    /// Everything from the start to the end of the film
    RestOfFilm,
}

/// A half-open interval `[start, start + duration)` of film time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    start: f64,
    extent: Extent,
}

impl TimeSpan {
    /// Creates a span from a start time and a duration.
    ///
    /// A negative or infinite duration selects the rest of the film, matching
    /// the `-1` convention used by the analysis scripts. A zero duration is
    /// rejected.
    pub fn new(start: f64, duration: f64) -> Result<Self> {
        check_start(start)?;
        Ok(Self {
            start,
            extent: extent_for(duration)?,
        })
    }

    /// Creates a span covering everything from `start` onwards
    pub fn rest_of_film(start: f64) -> Result<Self> {
        check_start(start)?;
        Ok(Self {
            start,
            extent: Extent::RestOfFilm,
        })
    }

    /// The whole film
    pub fn whole_film() -> Self {
        Self {
            start: 0.0,
            extent: Extent::RestOfFilm,
        }
    }

    /// Creates a span from a start and an end time
    pub fn with_end(start: f64, end: f64) -> Result<Self> {
        Self::from_parts(start, Some(end), None)
    }

    /// Creates a span from a start and any of end time and duration.
    ///
    /// When both are given they must agree to within `f32::EPSILON`.
    pub fn from_parts(start: f64, end: Option<f64>, duration: Option<f64>) -> Result<Self> {
        check_start(start)?;
        match (end, duration) {
            (None, None) => Err(Error::InvalidTimeSpan(
                "one of end time or duration must be supplied".to_string(),
            )),
            (None, Some(duration)) => Self::new(start, duration),
            (Some(end), duration) => {
                if end.is_nan() || end <= start {
                    return Err(Error::InvalidTimeSpan(format!(
                        "end time {end} must come after start time {start}"
                    )));
                }
                if end == f64::INFINITY {
                    if let Some(duration) = duration {
                        if extent_for(duration)? != Extent::RestOfFilm {
                            return Err(Error::InvalidTimeSpan(format!(
                                "inconsistent end time {end} and duration {duration}"
                            )));
                        }
                    }
                    return Ok(Self {
                        start,
                        extent: Extent::RestOfFilm,
                    });
                }
                if let Some(duration) = duration {
                    if (end - start - duration).abs() > AGREEMENT_TOLERANCE {
                        return Err(Error::InvalidTimeSpan(format!(
                            "inconsistent end time {end} and duration {duration}"
                        )));
                    }
                }
                Ok(Self {
                    start,
                    extent: Extent::Seconds(end - start),
                })
            }
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Duration in seconds, `None` for the rest of the film
    pub fn duration(&self) -> Option<f64> {
        match self.extent {
            Extent::Seconds(s) => Some(s),
            Extent::RestOfFilm => None,
        }
    }

    /// End time in seconds, `None` for the rest of the film
    pub fn end(&self) -> Option<f64> {
        self.duration().map(|d| self.start + d)
    }

    /// Checks if this span covers the given time
    pub fn contains(&self, seconds: f64) -> bool {
        seconds >= self.start && self.end().map_or(true, |end| seconds < end)
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.extent {
            Extent::Seconds(d) => write!(
                f,
                "start={:.3}, end={:.3}, duration={:.3}",
                self.start,
                self.start + d,
                d
            ),
            Extent::RestOfFilm => write!(f, "start={:.3}, to end of film", self.start),
        }
    }
}

fn extent_for(duration: f64) -> Result<Extent> {
    if duration.is_nan() {
        return Err(Error::InvalidTimeSpan("duration is NaN".to_string()));
    }
    if duration == 0.0 {
        return Err(Error::InvalidTimeSpan(
            "duration must be positive, or negative for the rest of the film".to_string(),
        ));
    }
    if duration < 0.0 || duration == f64::INFINITY {
        Ok(Extent::RestOfFilm)
    } else {
        Ok(Extent::Seconds(duration))
    }
}

fn check_start(start: f64) -> Result<()> {
    if !start.is_finite() || start < 0.0 {
        return Err(Error::InvalidTimeSpan(format!(
            "start time must be a non-negative number, got {start}"
        )));
    }
    Ok(())
}

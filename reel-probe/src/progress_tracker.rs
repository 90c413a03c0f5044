//! Batch progress reporting with ETA estimation

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counts finished items of a batch and logs progress at a fixed interval
pub struct ProgressTracker {
    total: u64,
    processed: AtomicU64,
    start_time: Instant,
    label: String,
}

impl ProgressTracker {
    pub fn new(total: u64, label: &str) -> Self {
        Self {
            total,
            processed: AtomicU64::new(0),
            start_time: Instant::now(),
            label: label.to_string(),
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Records one finished item, logging every `report_interval` items and
    /// on the last one
    pub fn increment_and_report(&self, report_interval: u64) -> u64 {
        let current = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if current % report_interval.max(1) == 0 || current == self.total {
            log::info!("{}", self.status(current));
        }
        current
    }

    fn status(&self, current: u64) -> String {
        let elapsed = self.start_time.elapsed();

        if current >= self.total {
            return format!(
                "{} {}/{} (100.0%) - completed in {}",
                self.label,
                current,
                self.total,
                format_duration(elapsed),
            );
        }

        let percent = (current as f64 / self.total as f64) * 100.0;
        let per_item = elapsed.as_secs_f64() / current.max(1) as f64;
        let remaining = Duration::try_from_secs_f64(per_item * (self.total - current) as f64)
            .unwrap_or(Duration::MAX);
        format!(
            "{} {}/{} ({:.1}%) - elapsed: {} - ETA: {}",
            self.label,
            current,
            self.total,
            percent,
            format_duration(elapsed),
            format_duration(remaining),
        )
    }
}

/// Formats a duration as `12.3s`, `4m05s` or `1h02m03s`
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    if total < 60 {
        return format!("{:.1}s", duration.as_secs_f64());
    }
    let (hours, minutes, seconds) = (total / 3600, total / 60 % 60, total % 60);
    if hours == 0 {
        format!("{minutes}m{seconds:02}s")
    } else {
        format!("{hours}h{minutes:02}m{seconds:02}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(12_340)), "12.3s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m05s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h02m03s");
        assert_eq!(format_duration(Duration::from_secs(36_000)), "10h00m00s");
    }

    #[test]
    fn test_counts_items() {
        let tracker = ProgressTracker::new(3, "probed");
        assert_eq!(tracker.increment_and_report(10), 1);
        assert_eq!(tracker.increment_and_report(10), 2);
        assert_eq!(tracker.increment_and_report(10), 3);
        assert_eq!(tracker.processed(), 3);
        assert!(tracker.status(3).contains("completed"));
        assert!(tracker.status(1).starts_with("probed 1/3"));
    }
}

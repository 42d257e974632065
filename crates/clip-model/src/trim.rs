//! The trim window: the sub-range of the source that becomes the reel.

use serde::{Deserialize, Serialize};

use crate::caption::MIN_DURATION;
use crate::input::InputError;

/// `{start_time, end_time}` in source seconds.
///
/// A validated window satisfies `0 ≤ start < end ≤ source duration` and
/// `end − start ≥ MIN_DURATION`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimWindow {
    pub start_time: f64,
    pub end_time: f64,
}

impl TrimWindow {
    /// Validate a window against the source duration.
    pub fn new(start_time: f64, end_time: f64, source_duration: f64) -> Result<Self, InputError> {
        if !start_time.is_finite() || !end_time.is_finite() {
            return Err(InputError::InvalidTrim {
                reason: "trim bounds must be finite".to_string(),
            });
        }
        if start_time < 0.0 {
            return Err(InputError::InvalidTrim {
                reason: format!("start {start_time:.3}s is negative"),
            });
        }
        if start_time >= end_time {
            return Err(InputError::InvalidTrim {
                reason: format!("start {start_time:.3}s is not before end {end_time:.3}s"),
            });
        }
        if end_time > source_duration {
            return Err(InputError::InvalidTrim {
                reason: format!(
                    "end {end_time:.3}s exceeds source duration {source_duration:.3}s"
                ),
            });
        }
        if end_time - start_time < MIN_DURATION {
            return Err(InputError::InvalidTrim {
                reason: format!(
                    "duration {:.3}s is shorter than the {MIN_DURATION}s minimum",
                    end_time - start_time
                ),
            });
        }
        Ok(Self {
            start_time,
            end_time,
        })
    }

    /// Window length in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Overlap test: true when `[start, end)` intersects the window, even partially.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        start < self.end_time && end > self.start_time
    }

    /// Whether `t` lies inside the window (inclusive).
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_time && t <= self.end_time
    }

    /// Clamp `t` into the window.
    pub fn clamp(&self, t: f64) -> f64 {
        if t.is_nan() {
            return self.start_time;
        }
        t.max(self.start_time).min(self.end_time)
    }

    /// Convert a source time to clip-relative time (trim start becomes zero).
    pub fn to_clip_time(&self, t: f64) -> f64 {
        t - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_window() {
        let trim = TrimWindow::new(10.0, 40.0, 120.0).unwrap();
        assert!((trim.duration() - 30.0).abs() < 1e-9);
        assert!(trim.contains(10.0));
        assert!(trim.contains(40.0));
        assert!(!trim.contains(40.5));
    }

    #[test]
    fn test_rejects_malformed_windows() {
        assert!(TrimWindow::new(-1.0, 10.0, 60.0).is_err());
        assert!(TrimWindow::new(10.0, 10.0, 60.0).is_err());
        assert!(TrimWindow::new(20.0, 10.0, 60.0).is_err());
        assert!(TrimWindow::new(0.0, 61.0, 60.0).is_err());
        assert!(TrimWindow::new(5.0, 5.05, 60.0).is_err());
        assert!(TrimWindow::new(f64::NAN, 5.0, 60.0).is_err());
    }

    #[test]
    fn test_rejection_reason_is_specific() {
        let err = TrimWindow::new(0.0, 61.0, 60.0).unwrap_err();
        assert!(err.to_string().contains("exceeds source duration"));
    }

    #[test]
    fn test_overlap_not_containment() {
        let trim = TrimWindow::new(10.0, 40.0, 120.0).unwrap();
        assert!(trim.overlaps(5.0, 12.0));
        assert!(trim.overlaps(39.0, 45.0));
        assert!(!trim.overlaps(41.0, 50.0));
        assert!(!trim.overlaps(2.0, 10.0));
    }
}

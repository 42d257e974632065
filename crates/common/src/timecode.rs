//! Time and format utilities.
//!
//! All timeline values are seconds as `f64`, relative to the start of the
//! full source video. This module converts them to and from display
//! timecodes and subtitle timestamps.

use crate::error::{ReelError, ReelResult};

/// Format seconds as `HH:MM:SS.mmm`, rounded to the nearest millisecond.
///
/// Negative and non-finite inputs format as zero.
pub fn seconds_to_timecode(secs: f64) -> String {
    let total_ms = secs_to_millis_rounded(secs);
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Parse a timecode back into seconds.
///
/// Accepts `HH:MM:SS(.fff)`, `MM:SS(.fff)` and bare `SS(.fff)`. A comma is
/// accepted as the fractional separator so SRT timestamps parse too.
pub fn timecode_to_seconds(input: &str) -> ReelResult<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ReelError::validation("empty timecode"));
    }

    let normalized = trimmed.replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();
    if parts.len() > 3 {
        return Err(ReelError::validation(format!(
            "timecode '{trimmed}' has too many fields"
        )));
    }

    let (whole, last) = parts.split_at(parts.len() - 1);
    let seconds: f64 = last[0]
        .parse()
        .map_err(|_| ReelError::validation(format!("invalid seconds in timecode '{trimmed}'")))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ReelError::validation(format!(
            "invalid seconds in timecode '{trimmed}'"
        )));
    }
    if !whole.is_empty() && seconds >= 60.0 {
        return Err(ReelError::validation(format!(
            "seconds field out of range in timecode '{trimmed}'"
        )));
    }

    let mut total = seconds;
    for (i, field) in whole.iter().rev().enumerate() {
        let value: u64 = field.parse().map_err(|_| {
            ReelError::validation(format!("invalid field '{field}' in timecode '{trimmed}'"))
        })?;
        // Minutes must stay below 60 only when hours are present.
        if i == 0 && whole.len() == 2 && value >= 60 {
            return Err(ReelError::validation(format!(
                "minutes field out of range in timecode '{trimmed}'"
            )));
        }
        let unit = if i == 0 { 60.0 } else { 3600.0 };
        total += value as f64 * unit;
    }

    Ok(total)
}

/// Format seconds as SRT timestamp: HH:MM:SS,mmm
pub fn format_srt_time(secs: f64) -> String {
    let total_ms = secs_to_millis_truncated(secs);
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// Format seconds as VTT timestamp: HH:MM:SS.mmm
pub fn format_vtt_time(secs: f64) -> String {
    let total_ms = secs_to_millis_truncated(secs);
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Format a duration in seconds as a compact human-readable string.
///
/// | Range         | Format       | Example   |
/// |---------------|--------------|-----------|
/// | ≥ 3600 s      | `H:MM:SS`    | `1:04:35` |
/// | ≥ 60 s        | `M:SS`       | `3:07`    |
/// | < 60 s        | `S.Xs`       | `4.2s`    |
pub fn format_duration(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    if secs >= 3600.0 {
        format!(
            "{}:{:02}:{:02}",
            secs as u64 / 3600,
            (secs as u64 % 3600) / 60,
            secs as u64 % 60,
        )
    } else if secs >= 60.0 {
        format!("{}:{:02}", secs as u64 / 60, secs as u64 % 60)
    } else {
        format!("{secs:.1}s")
    }
}

/// Clamp `t` into `[lo, hi]`. NaN maps to `lo`.
///
/// Unlike `f64::clamp` this never panics when `lo > hi`; the lower bound wins.
pub fn clamp_time(t: f64, lo: f64, hi: f64) -> f64 {
    if t.is_nan() {
        return lo;
    }
    t.min(hi).max(lo)
}

fn secs_to_millis_rounded(secs: f64) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * 1000.0).round() as u64
}

fn secs_to_millis_truncated(secs: f64) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    // Nudge before flooring so 2.5 * 1000 does not land on 2499.
    (secs * 1000.0 + 1e-6).floor() as u64
}

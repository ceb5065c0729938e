//! Durations and wall-clock labels.

use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{DateTime, Local, TimeZone};

/// Suffix to milliseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[("ms", 1.0), ("s", 1_000.0), ("m", 60_000.0), ("h", 3_600_000.0)];

/// Parse configuration durations like "5s", "5000ms", "1.5m".
///
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            return to_duration(val_str.trim(), *multiplier, s);
        }
    }

    to_duration(s, 1_000.0, s)
}

fn to_duration(value: &str, multiplier: f64, original: &str) -> Result<Duration> {
    let Ok(val) = value.parse::<f64>() else {
        bail!("Unknown duration format: {}", original);
    };
    if !val.is_finite() || val < 0.0 {
        bail!("Duration must be a non-negative number: {}", original);
    }
    Ok(Duration::from_micros((val * multiplier * 1_000.0) as u64))
}

/// Short human form for how long ago something happened ("3.2s", "4m").
pub fn format_age(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else if secs < 3_600.0 {
        format!("{}m", d.as_secs() / 60)
    } else {
        format!("{}h", d.as_secs() / 3_600)
    }
}

/// Format a configured period for display ("5s", "500ms").
pub fn format_period(d: Duration) -> String {
    if d.subsec_millis() == 0 && d.as_secs() > 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis())
    }
}

/// Local time-of-day label for a unix timestamp, e.g. "14:03:25".
///
/// Timestamps outside chrono's range fall back to the raw number.
pub fn clock_label(unix_secs: i64) -> String {
    match Local.timestamp_opt(unix_secs, 0).single() {
        Some(t) => capture_label(&t),
        None => unix_secs.to_string(),
    }
}

/// Local time-of-day label for a capture instant.
pub fn capture_label(t: &DateTime<Local>) -> String {
    t.format("%H:%M:%S").to_string()
}

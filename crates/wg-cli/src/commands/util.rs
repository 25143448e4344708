//! Shared output helpers.

/// Formats a seconds quantity as a short human-readable duration.
///
/// Negative or non-finite values render as `0s`.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "durations are floored to whole seconds for display"
)]
pub fn format_seconds(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0s".to_string();
    }
    let total = seconds as i64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}

//! Formatting helpers for the rendering layer.

use std::time::Duration;

/// Render seconds as `MM:SS`.
///
/// Minutes are not wrapped at 60. Unknown or non-finite input renders as
/// `00:00`.
pub fn format_time(seconds: Option<f64>) -> String {
    let seconds = match seconds {
        Some(s) if s.is_finite() && s >= 0.0 => s,
        _ => return "00:00".to_string(),
    };

    let whole = seconds.floor() as u64;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

/// [`format_time`] for a known or unknown [`Duration`].
pub fn format_duration(duration: Option<Duration>) -> String {
    format_time(duration.map(|d| d.as_secs_f64()))
}

/// Elapsed share of the track as a percentage in `0.0..=100.0`.
///
/// Zero when the duration is unknown or zero.
pub fn progress_percent(elapsed: Duration, duration: Option<Duration>) -> f64 {
    match duration {
        Some(total) if !total.is_zero() => {
            (elapsed.as_secs_f64() / total.as_secs_f64() * 100.0).clamp(0.0, 100.0)
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(Some(0.0)), "00:00");
        assert_eq!(format_time(Some(59.9)), "00:59");
        assert_eq!(format_time(Some(61.0)), "01:01");
        assert_eq!(format_time(Some(3725.0)), "62:05");
        assert_eq!(format_time(Some(f64::NAN)), "00:00");
        assert_eq!(format_time(Some(f64::INFINITY)), "00:00");
        assert_eq!(format_time(None), "00:00");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Some(Duration::from_millis(95_500))), "01:35");
        assert_eq!(format_duration(None), "00:00");
    }

    #[test]
    fn test_progress_percent() {
        let total = Some(Duration::from_secs(200));
        assert_eq!(progress_percent(Duration::from_secs(50), total), 25.0);
        assert_eq!(progress_percent(Duration::from_secs(300), total), 100.0);
        assert_eq!(progress_percent(Duration::from_secs(5), None), 0.0);
        assert_eq!(progress_percent(Duration::from_secs(5), Some(Duration::ZERO)), 0.0);
    }
}

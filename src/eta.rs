//! Human-readable time-to-completion strings.
//!
//! ```
//! use status_log::eta::estimate;
//!
//! assert_eq!(estimate(0.0), "00m 00s");
//! assert_eq!(estimate(3661.0), "1h 01m 01s");
//! ```

use std::{fmt, time::Duration};

/// A duration split into whole hours, minutes and seconds.
///
/// Displays as `"{h}h {mm}m {ss}s"` when there is at least one hour and
/// `"{mm}m {ss}s"` otherwise.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Eta {
    /// Whole hours, unbounded.
    pub hours: u64,
    /// Minutes, `0..60`.
    pub minutes: u64,
    /// Seconds, `0..60`.
    pub seconds: u64,
}

impl Eta {
    /// Decomposes `seconds`, rounded to the nearest whole second.
    ///
    /// Negative and NaN inputs are treated as zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn from_secs_f64(seconds: f64) -> Self {
        let total = seconds.max(0.0).round() as u64;
        Self::from_secs(total)
    }

    /// Decomposes a whole number of seconds.
    #[must_use]
    pub const fn from_secs(total: u64) -> Self {
        let (minutes, seconds) = (total / 60, total % 60);
        let (hours, minutes) = (minutes / 60, minutes % 60);
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Total number of seconds represented.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

impl From<Duration> for Eta {
    fn from(duration: Duration) -> Self {
        Self::from_secs_f64(duration.as_secs_f64())
    }
}

impl fmt::Display for Eta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours > 0 {
            write!(f, "{}h ", self.hours)?;
        }
        write!(f, "{:02}m {:02}s", self.minutes, self.seconds)
    }
}

/// Formats a remaining time given in seconds.
#[must_use]
pub fn estimate(seconds: f64) -> String {
    Eta::from_secs_f64(seconds).to_string()
}

/// Formats a remaining [`Duration`].
#[must_use]
pub fn estimate_duration(duration: Duration) -> String {
    Eta::from(duration).to_string()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Eta, estimate, estimate_duration};

    fn matches_shape(s: &str) -> bool {
        let rest = match s.split_once("h ") {
            Some((h, rest)) => {
                if h.is_empty() || !h.bytes().all(|b| b.is_ascii_digit()) {
                    return false;
                }
                rest
            }
            None => s,
        };
        let b = rest.as_bytes();
        b.len() == 7
            && b[0].is_ascii_digit()
            && b[1].is_ascii_digit()
            && &rest[2..4] == "m "
            && b[4].is_ascii_digit()
            && b[5].is_ascii_digit()
            && b[6] == b's'
    }

    /// Known Values
    #[test]
    fn test_fixed_points() {
        assert_eq!(estimate(0.0), "00m 00s");
        assert_eq!(estimate(3661.0), "1h 01m 01s");
        assert_eq!(estimate(59.0), "00m 59s");
        assert_eq!(estimate(3600.0), "1h 00m 00s");
        assert_eq!(estimate(90_061.0), "25h 01m 01s");
    }

    /// Rounding
    /// Fractional seconds never render as "60s".
    #[test]
    fn test_rounding_carries() {
        assert_eq!(estimate(59.6), "01m 00s");
        assert_eq!(estimate(3599.5), "1h 00m 00s");
        assert_eq!(estimate(0.4), "00m 00s");
    }

    /// Degenerate Input
    /// Negative and NaN seconds clamp to zero.
    #[test]
    fn test_degenerate_input() {
        assert_eq!(estimate(-5.0), "00m 00s");
        assert_eq!(estimate(f64::NAN), "00m 00s");
    }

    /// Shape & Round Trip
    /// Every output matches `(\d+h )?\d{2}m \d{2}s` and recovers the input within a second.
    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_shape_and_round_trip() {
        let mut s = 0.0_f64;
        while s < 200_000.0 {
            let text = estimate(s);
            assert!(matches_shape(&text), "bad shape for {s}: {text}");

            let eta = Eta::from_secs_f64(s);
            assert!((eta.as_secs() as f64 - s).abs() <= 1.0);

            s = s * 1.37 + 0.73;
        }
    }

    /// Duration Input
    #[test]
    fn test_duration_input() {
        assert_eq!(estimate_duration(Duration::from_secs(125)), "02m 05s");
        assert_eq!(Eta::from(Duration::from_millis(61_400)).to_string(), "01m 01s");
    }
}

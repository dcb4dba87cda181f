//! Human-readable and chart-oriented time formatting.
//!
//! All functions take whole seconds. Negative inputs are clamped to zero:
//! the accounting layer never produces them, but a total display function is
//! easier to reason about than one with an undefined corner.

use std::fmt;

/// Seconds in one hour.
pub const SECS_PER_HOUR: i64 = 3_600;

/// Seconds in one day.
pub const SECS_PER_DAY: i64 = 86_400;

/// Formats a second count as `Dd HH:MM:SS`, `H:MM:SS` or `M:SS`.
///
/// The leading unit is unpadded; every following field is zero-padded to two
/// digits. The day field only appears for durations of a day or more, and the
/// hour field only from one hour up.
#[must_use]
pub fn format_time(seconds: i64) -> String {
    let secs = seconds.max(0);
    let days = secs / SECS_PER_DAY;
    let hours = (secs % SECS_PER_DAY) / SECS_PER_HOUR;
    let minutes = (secs % SECS_PER_HOUR) / 60;
    let rest = secs % 60;

    if days > 0 {
        format!("{days}d {hours:02}:{minutes:02}:{rest:02}")
    } else if hours > 0 {
        format!("{hours}:{minutes:02}:{rest:02}")
    } else {
        format!("{minutes}:{rest:02}")
    }
}

/// Converts seconds to decimal hours with two decimal places.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn seconds_to_hours(seconds: i64) -> String {
    format!("{:.2}", seconds.max(0) as f64 / SECS_PER_HOUR as f64)
}

/// Converts seconds to decimal days with three decimal places.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn seconds_to_days(seconds: i64) -> String {
    format!("{:.3}", seconds.max(0) as f64 / SECS_PER_DAY as f64)
}

/// The unit used to scale chart values.
///
/// Chosen once per dataset and applied uniformly to every series in a chart,
/// never per person.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartUnit {
    /// Decimal hours, two decimal places.
    Hours,
    /// Decimal days, three decimal places.
    Days,
}

impl ChartUnit {
    /// Picks the best unit given the largest total in the dataset.
    ///
    /// Days once at least one series reaches a full day, hours otherwise.
    #[must_use]
    pub const fn best_for(dataset_max_secs: i64) -> Self {
        if dataset_max_secs >= SECS_PER_DAY {
            Self::Days
        } else {
            Self::Hours
        }
    }

    /// Unit suffix for labels ("h" or "d").
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Hours => "h",
            Self::Days => "d",
        }
    }

    /// Scales a second count into this unit.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scale(self, seconds: i64) -> f64 {
        let secs = seconds.max(0) as f64;
        match self {
            Self::Hours => secs / SECS_PER_HOUR as f64,
            Self::Days => secs / SECS_PER_DAY as f64,
        }
    }

    /// Formats a scaled value with the unit's precision and suffix,
    /// e.g. "12.50h" or "1.234d".
    #[must_use]
    pub fn format_scaled(self, seconds: i64) -> String {
        match self {
            Self::Hours => format!("{}h", seconds_to_hours(seconds)),
            Self::Days => format!("{}d", seconds_to_days(seconds)),
        }
    }
}

impl fmt::Display for ChartUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hours => f.write_str("hours"),
            Self::Days => f.write_str("days"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_minutes_and_seconds() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(59), "0:59");
        assert_eq!(format_time(60), "1:00");
        assert_eq!(format_time(61), "1:01");
    }

    #[test]
    fn format_time_hours() {
        assert_eq!(format_time(3600), "1:00:00");
        assert_eq!(format_time(3661), "1:01:01");
        assert_eq!(format_time(86399), "23:59:59");
    }

    #[test]
    fn format_time_days() {
        assert_eq!(format_time(86400), "1d 00:00:00");
        assert_eq!(format_time(90061), "1d 01:01:01");
        assert_eq!(format_time(2 * 86400 + 3600), "2d 01:00:00");
    }

    #[test]
    fn format_time_clamps_negative_to_zero() {
        assert_eq!(format_time(-1), "0:00");
        assert_eq!(format_time(i64::MIN), "0:00");
    }

    #[test]
    fn decimal_conversions() {
        assert_eq!(seconds_to_hours(3600), "1.00");
        assert_eq!(seconds_to_hours(5400), "1.50");
        assert_eq!(seconds_to_days(86400), "1.000");
        assert_eq!(seconds_to_days(43200), "0.500");
    }

    #[test]
    fn best_unit_threshold_is_one_day() {
        assert_eq!(ChartUnit::best_for(0), ChartUnit::Hours);
        assert_eq!(ChartUnit::best_for(86399), ChartUnit::Hours);
        assert_eq!(ChartUnit::best_for(86400), ChartUnit::Days);
        assert_eq!(ChartUnit::best_for(1_000_000), ChartUnit::Days);
    }

    #[test]
    fn scaled_labels_use_unit_precision() {
        assert_eq!(ChartUnit::Hours.format_scaled(5400), "1.50h");
        assert_eq!(ChartUnit::Days.format_scaled(129_600), "1.500d");
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn scale_divides_by_unit() {
        assert_eq!(ChartUnit::Hours.scale(7200), 2.0);
        assert_eq!(ChartUnit::Days.scale(86400), 1.0);
    }
}

use chrono::{Datelike, Duration, NaiveDate};

use super::settings::Settings;

/// Cutoffs used when classifying raw tap counts.
pub const TAP_THRESHOLDS: Thresholds = Thresholds {
    low_max: 5,
    medium_max: 20,
};

/// Cutoffs used when classifying converted values on large unit scales,
/// e.g. steps.
pub const CONVERTED_THRESHOLDS: Thresholds = Thresholds {
    low_max: 2000,
    medium_max: 8000,
};

/// Ascending pair of cutoffs separating [Intensity::Low], [Intensity::Medium]
/// and [Intensity::High]. The meaningful scale depends on whether conversion
/// is active, so callers pick the pair instead of this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub low_max: u64,
    pub medium_max: u64,
}

/// Coarse classification of a day's activity for heatmap-style output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    None,
    Low,
    Medium,
    High,
}

pub fn bucket(count: u64, thresholds: Thresholds) -> Intensity {
    if count == 0 {
        Intensity::None
    } else if count <= thresholds.low_max {
        Intensity::Low
    } else if count <= thresholds.medium_max {
        Intensity::Medium
    } else {
        Intensity::High
    }
}

/// Returns `n` consecutive dates ending at and including `anchor`, oldest
/// first. Month and year boundaries are crossed by date arithmetic.
pub fn last_n_days(anchor: NaiveDate, n: u32) -> Vec<NaiveDate> {
    (0..n)
        .rev()
        .map(|offset| anchor - Duration::days(offset as i64))
        .collect()
}

/// Calendar layout of the month containing `anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthGrid {
    pub days_in_month: u32,
    /// Weekday of day 1, 0 = Sunday through 6 = Saturday.
    pub first_weekday_offset: u32,
}

pub fn month_grid(anchor: NaiveDate) -> MonthGrid {
    let first = anchor.with_day(1).expect("day 1 exists in every month");
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .expect("the first of the following month is always a valid date");

    MonthGrid {
        days_in_month: (next_month - first).num_days() as u32,
        first_weekday_offset: first.weekday().num_days_from_sunday(),
    }
}

/// Dates of the month containing `anchor`, in calendar order.
pub fn month_days(anchor: NaiveDate) -> Vec<NaiveDate> {
    (1..=month_grid(anchor).days_in_month)
        .map(|day| anchor.with_day(day).expect("day is within the month"))
        .collect()
}

/// Applies the configured conversion to a raw tap count. With conversion
/// disabled the raw count comes back unscaled.
pub fn convert(count: u64, settings: &Settings) -> f64 {
    if settings.enable_conversion {
        count as f64 * settings.conversion_rate
    } else {
        count as f64
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::core::settings::{Settings, SettingsPatch};

    use super::{
        Intensity, bucket, convert, last_n_days, month_days, month_grid, TAP_THRESHOLDS,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn seven_day_window_crosses_a_year_boundary() {
        let days = last_n_days(date(2024, 1, 2), 7);
        assert_eq!(days.len(), 7);
        assert_eq!(days.first().copied(), Some(date(2023, 12, 27)));
        assert_eq!(days.last().copied(), Some(date(2024, 1, 2)));
        for pair in days.windows(2) {
            assert_eq!(pair[0].succ_opt().unwrap(), pair[1]);
        }
    }

    #[test]
    fn seven_day_window_crosses_a_month_boundary() {
        let days = last_n_days(date(2024, 3, 2), 7);
        assert_eq!(days.first().copied(), Some(date(2024, 2, 25)));
    }

    #[test]
    fn february_length_tracks_leap_years() {
        assert_eq!(month_grid(date(2024, 2, 10)).days_in_month, 29);
        assert_eq!(month_grid(date(2023, 2, 10)).days_in_month, 28);
        assert_eq!(month_grid(date(2024, 12, 25)).days_in_month, 31);
    }

    #[test]
    fn first_weekday_offset_counts_from_sunday() {
        // 2024-03-01 was a Friday, 2023-10-01 a Sunday.
        assert_eq!(month_grid(date(2024, 3, 15)).first_weekday_offset, 5);
        assert_eq!(month_grid(date(2023, 10, 20)).first_weekday_offset, 0);
    }

    #[test]
    fn month_days_enumerates_the_whole_month() {
        let days = month_days(date(2024, 2, 10));
        assert_eq!(days.len(), 29);
        assert_eq!(days.first().copied(), Some(date(2024, 2, 1)));
        assert_eq!(days.last().copied(), Some(date(2024, 2, 29)));
    }

    #[test]
    fn buckets_are_inclusive_at_the_cutoffs() {
        assert_eq!(bucket(0, TAP_THRESHOLDS), Intensity::None);
        assert_eq!(bucket(1, TAP_THRESHOLDS), Intensity::Low);
        assert_eq!(bucket(5, TAP_THRESHOLDS), Intensity::Low);
        assert_eq!(bucket(6, TAP_THRESHOLDS), Intensity::Medium);
        assert_eq!(bucket(20, TAP_THRESHOLDS), Intensity::Medium);
        assert_eq!(bucket(21, TAP_THRESHOLDS), Intensity::High);
    }

    #[test]
    fn conversion_scales_only_when_enabled() {
        let settings = Settings::default();
        assert_eq!(convert(3, &settings), 42.0);

        let disabled = settings.update(SettingsPatch {
            enable_conversion: Some(false),
            ..Default::default()
        });
        assert_eq!(convert(3, &disabled), 3.0);
    }
}

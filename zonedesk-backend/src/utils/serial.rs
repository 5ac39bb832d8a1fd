//! SOA serial arithmetic in the `YYYYMMDDnn` convention.

use chrono::{Datelike, NaiveDate};

/// `YYYYMMDD00` for `date`.
pub fn date_serial(date: NaiveDate) -> u32 {
    // Years past 42949 do not fit; chrono dates stop well before that.
    let ymd = date.year().unsigned_abs() * 10_000 + date.month() * 100 + date.day();
    ymd.saturating_mul(100)
}

/// The serial following `current` on `date`: `max(current + 1, date_serial)`.
///
/// `None` when `current` is already `u32::MAX`.
pub fn next_serial(current: u32, date: NaiveDate) -> Option<u32> {
    let bumped = current.checked_add(1)?;
    Some(bumped.max(date_serial(date)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_serial_format() {
        assert_eq!(date_serial(day(2026, 10, 16)), 2_026_101_600);
        assert_eq!(date_serial(day(2024, 1, 2)), 2_024_010_200);
    }

    #[test]
    fn old_serial_jumps_to_today() {
        assert_eq!(next_serial(2_020_010_105, day(2026, 10, 16)), Some(2_026_101_600));
        assert_eq!(next_serial(1, day(2026, 10, 16)), Some(2_026_101_600));
    }

    #[test]
    fn same_day_serial_increments() {
        let d = day(2026, 10, 16);
        let first = next_serial(2_026_101_600, d).unwrap();
        let second = next_serial(first, d).unwrap();
        assert_eq!(first, 2_026_101_601);
        assert_eq!(second, 2_026_101_602);
    }

    #[test]
    fn future_serial_still_increments() {
        assert_eq!(next_serial(2_099_123_199, day(2026, 10, 16)), Some(2_099_123_200));
    }

    #[test]
    fn exhausted_serial() {
        assert_eq!(next_serial(u32::MAX, day(2026, 10, 16)), None);
    }
}

//! Calendar-month partitioning of an inclusive date interval.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Half-open date range `[start, end)` covering (part of) one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthRange {
    /// Month label in `YYYY-MM` form.
    pub fn label(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }

    /// Number of days in the range.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Whether the range spans its whole calendar month.
    pub fn is_full_month(&self) -> bool {
        self.start.day() == 1 && first_of_next_month(self.start) == self.end
    }
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after the one containing `date`.
pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

/// Lazy iterator over the month ranges of an inclusive interval.
///
/// Created by [`month_ranges`]. A clone continues from the current position;
/// calling [`month_ranges`] again with the same inputs starts over.
#[derive(Debug, Clone)]
pub struct MonthRanges {
    cursor: NaiveDate,
    start: NaiveDate,
    end_excl: NaiveDate,
    month_bound: NaiveDate,
}

impl Iterator for MonthRanges {
    type Item = MonthRange;

    fn next(&mut self) -> Option<MonthRange> {
        while self.cursor < self.month_bound {
            let next = first_of_next_month(self.cursor);
            let start = self.cursor.max(self.start);
            let end = next.min(self.end_excl);
            self.cursor = next;

            if start < end {
                return Some(MonthRange { start, end });
            }
        }
        None
    }
}

/// Partition `[start, end]` (both inclusive) into calendar-month ranges.
///
/// The first and last ranges are clipped to the requested dates; the ranges are
/// contiguous, disjoint, and their union is exactly `[start, end + 1 day)`.
/// Yields nothing when `start > end`.
pub fn month_ranges(start: NaiveDate, end: NaiveDate) -> MonthRanges {
    let end_excl = end
        .checked_add_signed(Duration::days(1))
        .unwrap_or(NaiveDate::MAX);

    MonthRanges {
        cursor: first_of_month(start),
        start,
        end_excl,
        month_bound: first_of_next_month(end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> MonthRange {
        MonthRange { start, end }
    }

    fn assert_partition(start: NaiveDate, end: NaiveDate) {
        let ranges: Vec<_> = month_ranges(start, end).collect();
        assert!(!ranges.is_empty());
        assert_eq!(ranges.first().unwrap().start, start);
        assert_eq!(ranges.last().unwrap().end, end + Duration::days(1));

        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "ranges must be contiguous");
        }
        for r in &ranges {
            assert!(r.start < r.end);
            assert_eq!(first_of_month(r.start), first_of_month(r.end - Duration::days(1)));
        }

        let total: i64 = ranges.iter().map(MonthRange::days).sum();
        assert_eq!(total, (end - start).num_days() + 1);
    }

    #[test]
    fn test_year_boundary() {
        let ranges: Vec<_> = month_ranges(d(2024, 12, 15), d(2025, 1, 10)).collect();
        assert_eq!(
            ranges,
            vec![
                range(d(2024, 12, 15), d(2025, 1, 1)),
                range(d(2025, 1, 1), d(2025, 1, 11)),
            ]
        );
    }

    #[test]
    fn test_single_day() {
        let ranges: Vec<_> = month_ranges(d(2024, 6, 5), d(2024, 6, 5)).collect();
        assert_eq!(ranges, vec![range(d(2024, 6, 5), d(2024, 6, 6))]);
    }

    #[test]
    fn test_same_month_yields_one_clipped_range() {
        let ranges: Vec<_> = month_ranges(d(2024, 2, 3), d(2024, 2, 20)).collect();
        assert_eq!(ranges.len(), 1);
        assert!(!ranges[0].is_full_month());
        assert_eq!(ranges[0].label(), "2024-02");
    }

    #[test]
    fn test_last_day_of_december() {
        let ranges: Vec<_> = month_ranges(d(2024, 12, 31), d(2024, 12, 31)).collect();
        assert_eq!(ranges, vec![range(d(2024, 12, 31), d(2025, 1, 1))]);
    }

    #[test]
    fn test_default_dashboard_range() {
        let ranges: Vec<_> = month_ranges(d(2024, 6, 1), d(2025, 6, 30)).collect();
        assert_eq!(ranges.len(), 13);
        assert!(ranges.iter().all(MonthRange::is_full_month));
        assert_eq!(ranges[0].label(), "2024-06");
        assert_eq!(ranges[12].label(), "2025-06");
    }

    #[test]
    fn test_partition_properties() {
        let cases = [
            (d(2024, 1, 1), d(2024, 1, 31)),
            (d(2023, 11, 17), d(2025, 3, 2)),
            (d(2024, 2, 29), d(2024, 3, 1)),
            (d(2020, 1, 31), d(2020, 12, 1)),
            (d(1999, 12, 31), d(2000, 1, 1)),
        ];
        for (start, end) in cases {
            assert_partition(start, end);
        }
    }

    #[test]
    fn test_inverted_range_is_empty() {
        assert_eq!(month_ranges(d(2024, 5, 2), d(2024, 5, 1)).count(), 0);
        assert_eq!(month_ranges(d(2025, 1, 1), d(2024, 1, 1)).count(), 0);
    }

    #[test]
    fn test_sequence_is_restartable() {
        let a: Vec<_> = month_ranges(d(2024, 3, 10), d(2024, 8, 2)).collect();
        let b: Vec<_> = month_ranges(d(2024, 3, 10), d(2024, 8, 2)).collect();
        assert_eq!(a, b);
    }
}

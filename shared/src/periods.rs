//! Report bucket generation and chart helpers

use std::iter::FusedIterator;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::types::{tick, Period, Resolution};

/// Buckets of `resolution` covering `start` through `end`, both inclusive.
///
/// The first bucket starts at the boundary at or before `start`, the last one
/// contains `end`. Weeks run Monday to Sunday, months from the 1st to the
/// last day. The returned iterator is lazy and can be cloned to replay the
/// same sequence.
pub fn datetime_range(start: DateTime<Utc>, end: DateTime<Utc>, resolution: Resolution) -> PeriodRange {
    PeriodRange {
        next: Some(bucket_start(start.date_naive(), resolution)),
        last: bucket_start(end.date_naive(), resolution),
        resolution,
    }
}

/// Iterator returned by [`datetime_range`]
#[derive(Debug, Clone)]
pub struct PeriodRange {
    next: Option<NaiveDate>,
    last: NaiveDate,
    resolution: Resolution,
}

impl Iterator for PeriodRange {
    type Item = Period;

    fn next(&mut self) -> Option<Period> {
        let start = self.next.take()?;
        if start > self.last {
            return None;
        }
        let following = next_bucket_start(start, self.resolution)?;
        self.next = Some(following);
        Some(Period::new(midnight(start), midnight(following) - tick()))
    }
}

impl FusedIterator for PeriodRange {}

/// The bucket of `resolution` that contains `at`
pub fn bucket_containing(at: DateTime<Utc>, resolution: Resolution) -> Option<Period> {
    datetime_range(at, at, resolution).next()
}

/// Shift `date` by a number of calendar months, keeping the day of month.
/// Returns `None` when that day does not exist in the target month.
pub fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, date.day())
}

fn bucket_start(date: NaiveDate, resolution: Resolution) -> NaiveDate {
    match resolution {
        Resolution::Day => date,
        Resolution::Week => date - Days::new(u64::from(date.weekday().num_days_from_monday())),
        Resolution::Month => date.with_day(1).unwrap_or(date),
    }
}

fn next_bucket_start(start: NaiveDate, resolution: Resolution) -> Option<NaiveDate> {
    match resolution {
        Resolution::Day => start.checked_add_days(Days::new(1)),
        Resolution::Week => start.checked_add_days(Days::new(7)),
        Resolution::Month => add_months(start, 1),
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Each value as a fraction of the total.
///
/// Empty input and input summing to zero yield an empty list.
pub fn normalized(values: &[Decimal]) -> Vec<Decimal> {
    let total: Decimal = values.iter().sum();
    if total.is_zero() {
        return Vec::new();
    }
    values.iter().map(|v| v / total).collect()
}

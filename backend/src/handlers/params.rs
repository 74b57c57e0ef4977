//! Query parameter parsing shared by the report handlers

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use shared::{bucket_containing, tick, validate_date_range, validate_period_count, Period, Resolution};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Which end of a window a bare date stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// A bare date covers the whole day: as a start bound it means midnight, as an
/// end bound the last tick of the day.
pub fn parse_datetime(field: &str, value: &str, bound: Bound) -> AppResult<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        return match bound {
            Bound::Start => Ok(start),
            Bound::End => date
                .checked_add_days(Days::new(1))
                .map(|next| Utc.from_utc_datetime(&next.and_time(NaiveTime::MIN)) - tick())
                .ok_or_else(|| AppError::field(field, "Invalid date")),
        };
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::field(field, "Invalid date"))
}

pub fn parse_optional_datetime(
    field: &str,
    value: Option<&str>,
    bound: Bound,
) -> AppResult<Option<DateTime<Utc>>> {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => parse_datetime(field, v, bound).map(Some),
        None => Ok(None),
    }
}

/// Blank ids count as absent
pub fn parse_optional_uuid(field: &str, value: Option<&str>) -> AppResult<Option<Uuid>> {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| AppError::field(field, "Invalid identifier")),
        None => Ok(None),
    }
}

pub fn parse_flag(field: &str, value: Option<&str>) -> AppResult<bool> {
    match value.map(|v| v.to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") | Some("off") => Ok(false),
        Some("true") | Some("1") | Some("yes") | Some("on") => Ok(true),
        Some(_) => Err(AppError::field(field, "Expected a boolean")),
    }
}

pub fn parse_resolution(value: Option<&str>) -> AppResult<Resolution> {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse()
            .map_err(|e: shared::ParseResolutionError| AppError::field("resolution", e.to_string())),
        None => Ok(Resolution::default()),
    }
}

/// The calendar month containing `now`
pub fn current_month(now: DateTime<Utc>) -> AppResult<Period> {
    bucket_containing(now, Resolution::Month)
        .ok_or_else(|| AppError::Internal("Calendar month out of range".to_string()))
}

/// The `count` most recent buckets of `resolution`, the current one included
pub fn trailing_buckets(now: DateTime<Utc>, resolution: Resolution, count: u64) -> AppResult<Period> {
    let out_of_range = || AppError::Internal("Default window out of range".to_string());
    let current = bucket_containing(now, resolution).ok_or_else(out_of_range)?;
    let days_per_bucket = match resolution {
        Resolution::Day => 1,
        Resolution::Week => 7,
        Resolution::Month => return Err(out_of_range()),
    };
    let first_day = current
        .start
        .date_naive()
        .checked_sub_days(Days::new(days_per_bucket * count.saturating_sub(1)))
        .ok_or_else(out_of_range)?;
    Ok(Period::new(
        Utc.from_utc_datetime(&first_day.and_time(NaiveTime::MIN)),
        current.end,
    ))
}

/// Resolve a report window from optional request dates, falling back to
/// `default` for missing ends, and check it against the period limit.
pub fn report_window(
    date_from: Option<&str>,
    date_to: Option<&str>,
    default: Period,
    resolution: Resolution,
    max_periods: usize,
) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let from = parse_optional_datetime("date_from", date_from, Bound::Start)?.unwrap_or(default.start);
    let to = parse_optional_datetime("date_to", date_to, Bound::End)?.unwrap_or(default.end);

    validate_date_range(from, to).map_err(|e| AppError::field("date_from", e))?;
    validate_period_count(from, to, resolution, max_periods).map_err(|e| AppError::field("date_to", e))?;

    Ok((from, to))
}

//! Date-window resolution
//!
//! Turns a requested `(from, to, granularity)` into an aligned window plus a
//! look-back start one period earlier, so that the first in-window bucket has
//! a predecessor to be compared against.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::error::{QueryError, QueryResult};
use crate::series::{Granularity, Period, Record, INVASION_EPOCH};

/// Last representable millisecond of a day
pub const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_milli_opt(23, 59, 59, 999) {
    Some(time) => time,
    None => panic!("invalid end-of-day time"),
};

/// Length of the `Last 30 days` window, inclusive of the latest day
const LAST_DAYS_WINDOW: i64 = 30;

/// Monday of the week containing `date`, clamped to the first representable day
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_signed(Duration::days(date.weekday().num_days_from_monday() as i64))
        .unwrap_or(NaiveDate::MIN)
}

/// Sunday of the week containing `date`, clamped to the last representable day
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date)
        .checked_add_signed(Duration::days(6))
        .unwrap_or(NaiveDate::MAX)
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// A resolved, aligned request window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedWindow {
    /// Granularity as requested, kept for headers
    pub requested: Granularity,
    /// Bucketing period every later stage uses
    pub period: Period,
    /// Aligned start, at 00:00:00.000
    pub from: NaiveDateTime,
    /// Aligned end, at 23:59:59.999
    pub to: NaiveDateTime,
    /// Start of the look-back extended range used to select input records
    pub filter_from: NaiveDateTime,
}

impl ResolvedWindow {
    /// Whether a timestamp lies inside the reported window
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.from && timestamp <= self.to
    }

    /// Whether a timestamp lies inside the look-back extended window
    pub fn selects(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.filter_from && timestamp <= self.to
    }

    pub fn from_date(&self) -> NaiveDate {
        self.from.date()
    }

    pub fn to_date(&self) -> NaiveDate {
        self.to.date()
    }
}

/// Resolve a request against the deduplicated series.
///
/// Data-bounded granularities ignore `from` and `to`.
pub fn resolve_window(
    series: &[Record],
    from: NaiveDate,
    to: NaiveDate,
    granularity: Granularity,
) -> QueryResult<ResolvedWindow> {
    let earliest = series.iter().map(Record::day).min();
    let latest = series.iter().map(Record::day).max();
    let (Some(earliest), Some(latest)) = (earliest, latest) else {
        return Err(QueryError::EmptyInput);
    };

    let (mut from, mut to) = match granularity {
        Granularity::SinceInvasion => (INVASION_EPOCH.max(earliest), latest),
        Granularity::Last30Days => (
            latest
                .checked_sub_signed(Duration::days(LAST_DAYS_WINDOW - 1))
                .unwrap_or(NaiveDate::MIN),
            latest,
        ),
        _ => (from, to),
    };

    if from > to {
        std::mem::swap(&mut from, &mut to);
    }

    let period = granularity.period();
    let (from, to) = match period {
        Period::Day => (from, to),
        Period::Week => (week_start(from), week_end(to)),
        Period::Month => (month_start(from), month_end(to)),
    };

    let from = from.and_time(NaiveTime::MIN);
    let to = to.and_time(END_OF_DAY);

    let filter_from = if granularity == Granularity::SinceInvasion {
        from
    } else {
        step_back(from, period)
    };

    tracing::debug!(
        granularity = %granularity,
        %from,
        %to,
        %filter_from,
        "resolved date window"
    );

    Ok(ResolvedWindow {
        requested: granularity,
        period,
        from,
        to,
        filter_from,
    })
}

/// Move a timestamp one full period back, staying put at the start of the calendar
fn step_back(at: NaiveDateTime, period: Period) -> NaiveDateTime {
    let earlier = match period {
        Period::Day => at.checked_sub_signed(Duration::days(1)),
        Period::Week => at.checked_sub_signed(Duration::weeks(1)),
        Period::Month => at.checked_sub_months(Months::new(1)),
    };
    earlier.unwrap_or(at)
}

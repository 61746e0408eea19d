//! "Today" plus the calendar arithmetic the schedule engine relies on.
//!
//! Month arithmetic follows chrono: adding a month keeps the day of month and
//! clamps it to the last valid day of the target month (Jan 31 + 1 month is
//! Feb 29 in a leap year, Feb 28 otherwise).

use chrono::{Datelike, Days, Months, NaiveDate, Utc};

/// Supplies the current date; arithmetic defaults to the chrono rules above.
pub trait Calendar: Send + Sync {
    fn today(&self) -> NaiveDate;

    fn add_days(&self, date: NaiveDate, days: u64) -> Option<NaiveDate> {
        add_days(date, days)
    }

    fn add_months(&self, date: NaiveDate, months: u32) -> Option<NaiveDate> {
        add_months(date, months)
    }

    /// Whole calendar months from `start` to `end`.
    fn months_between(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        period_between(start, end).total_months()
    }

    fn period_between(&self, start: NaiveDate, end: NaiveDate) -> CalendarPeriod {
        period_between(start, end)
    }
}

/// Reads the date from the system clock (UTC).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCalendar;

impl Calendar for SystemCalendar {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Pins "today" to a fixed date.
#[derive(Debug, Clone, Copy)]
pub struct FixedCalendar {
    today: NaiveDate,
}

impl FixedCalendar {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Calendar for FixedCalendar {
    fn today(&self) -> NaiveDate {
        self.today
    }
}

/// Years, months and days between two dates, in the same shape a wall calendar gives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalendarPeriod {
    pub years: i64,
    pub months: i64,
    pub days: i64,
}

impl CalendarPeriod {
    pub fn total_months(&self) -> i64 {
        self.years * 12 + self.months
    }

    /// Day count with every year as 365 days and every month as 30.
    pub fn approximate_days(&self) -> i64 {
        self.years * 365 + self.months * 30 + self.days
    }
}

pub fn add_days(date: NaiveDate, days: u64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(days))
}

pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

pub fn period_between(start: NaiveDate, end: NaiveDate) -> CalendarPeriod {
    let mut total_months = month_index(end) - month_index(start);
    let mut days = end.day() as i64 - start.day() as i64;
    if total_months > 0 && days < 0 {
        total_months -= 1;
        let anchor = shift_months(start, total_months);
        days = (end - anchor).num_days();
    } else if total_months < 0 && days > 0 {
        total_months += 1;
        days -= days_in_month(end) as i64;
    }
    CalendarPeriod {
        years: total_months / 12,
        months: total_months % 12,
        days,
    }
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

fn shift_months(date: NaiveDate, months: i64) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs() as u32))
    };
    shifted.unwrap_or(date)
}

fn days_in_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    match first.checked_add_months(Months::new(1)) {
        Some(next) => (next - first).num_days() as u32,
        None => 31,
    }
}

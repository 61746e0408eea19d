use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::calendar::{add_days, period_between};
use super::plan::Frequency;

/// Human-facing due classification of a plan's upcoming date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DueStatus {
    DueToday,
    DueTomorrow,
    DueInTwoDays,
    MonthsOverdue(i64),
    OneDayOverdue,
    /// Approximate count: years are 365 days, months 30.
    DaysOverdue(i64),
    DueOn(NaiveDate),
}

impl DueStatus {
    /// Classifies `due` relative to `today`. The first matching rule wins, and
    /// monthly plans are reported in months before any day-based rule applies.
    pub fn classify(frequency: &Frequency, due: NaiveDate, today: NaiveDate) -> DueStatus {
        if due == today {
            return DueStatus::DueToday;
        }
        if Some(due) == add_days(today, 1) {
            return DueStatus::DueTomorrow;
        }
        if Some(due) == add_days(today, 2) {
            return DueStatus::DueInTwoDays;
        }
        if *frequency == Frequency::Monthly && due < today {
            let period = period_between(due, today);
            let months = period.total_months();
            return if period.days > 0 {
                DueStatus::MonthsOverdue(months + 1)
            } else {
                DueStatus::MonthsOverdue(months)
            };
        }
        if due.succ_opt() == Some(today) {
            return DueStatus::OneDayOverdue;
        }
        if due < today {
            return DueStatus::DaysOverdue(period_between(due, today).approximate_days());
        }
        DueStatus::DueOn(due)
    }

    pub fn is_overdue(&self) -> bool {
        matches!(
            self,
            DueStatus::MonthsOverdue(_) | DueStatus::OneDayOverdue | DueStatus::DaysOverdue(_)
        )
    }
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueStatus::DueToday => f.write_str("Due today"),
            DueStatus::DueTomorrow => f.write_str("Due tomorrow"),
            DueStatus::DueInTwoDays => f.write_str("Due in two days"),
            DueStatus::MonthsOverdue(1) => f.write_str("1 month overdue"),
            DueStatus::MonthsOverdue(months) => write!(f, "{months} months overdue"),
            DueStatus::OneDayOverdue => f.write_str("1 day overdue"),
            DueStatus::DaysOverdue(days) => write!(f, "{days} days overdue"),
            DueStatus::DueOn(date) => write!(f, "Due on {}", date.format("%Y-%m-%d")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn label(frequency: Frequency, due: NaiveDate, today: NaiveDate) -> String {
        DueStatus::classify(&frequency, due, today).to_string()
    }

    #[test]
    fn near_dates_are_named() {
        let today = date(2024, 3, 10);
        assert_eq!(label(Frequency::Daily, today, today), "Due today");
        assert_eq!(label(Frequency::Monthly, date(2024, 3, 11), today), "Due tomorrow");
        assert_eq!(label(Frequency::Daily, date(2024, 3, 12), today), "Due in two days");
        assert_eq!(label(Frequency::Daily, date(2024, 3, 13), today), "Due on 2024-03-13");
    }

    #[test]
    fn monthly_overdue_rounds_leftover_days_up() {
        let today = date(2024, 4, 20);
        assert_eq!(label(Frequency::Monthly, date(2024, 1, 15), today), "4 months overdue");
        assert_eq!(label(Frequency::Monthly, date(2024, 1, 20), today), "3 months overdue");
        assert_eq!(label(Frequency::Monthly, date(2023, 4, 20), today), "12 months overdue");
    }

    #[test]
    fn monthly_rule_wins_over_one_day_rule() {
        let today = date(2024, 3, 10);
        assert_eq!(label(Frequency::Monthly, date(2024, 3, 9), today), "1 month overdue");
        assert_eq!(label(Frequency::Daily, date(2024, 3, 9), today), "1 day overdue");
    }

    #[test]
    fn daily_overdue_uses_approximate_day_count() {
        let today = date(2024, 4, 20);
        assert_eq!(label(Frequency::Daily, date(2024, 1, 15), today), "95 days overdue");
        assert_eq!(label(Frequency::Daily, date(2024, 4, 15), today), "5 days overdue");
    }

    #[test]
    fn classification_is_repeatable() {
        let due = date(2024, 2, 1);
        let today = date(2024, 2, 20);
        let first = DueStatus::classify(&Frequency::Daily, due, today);
        let second = DueStatus::classify(&Frequency::Daily, due, today);
        assert_eq!(first, second);
        assert!(first.is_overdue());
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Cadence of a recurring template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }

    /// Moves `from` forward by one period, or `None` past the representable range.
    ///
    /// Day and week steps are plain calendar-day offsets. Month and year steps keep the
    /// day-of-month of `from`, clamped to the length of the target month, so
    /// `2024-01-31 + 1 month == 2024-02-29` and `2024-02-29 + 1 year == 2025-02-28`.
    pub fn advance(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.advance_anchored(from, from.day())
    }

    /// Same as [`Frequency::advance`] but month and year steps aim for `anchor_day`
    /// instead of the current day-of-month. Using the start date's day as the anchor
    /// stops a clamped occurrence (Feb 29) from dragging every later one to the 29th.
    pub fn advance_anchored(&self, from: DateTime<Utc>, anchor_day: u32) -> Option<DateTime<Utc>> {
        let date = from.date_naive();
        let next = match self {
            Frequency::Daily => date.checked_add_days(Days::new(1))?,
            Frequency::Weekly => date.checked_add_days(Days::new(7))?,
            Frequency::Monthly => shift_month(date, anchor_day)?,
            Frequency::Yearly => clamped(date.year().checked_add(1)?, date.month(), anchor_day)?,
        };
        Some(next.and_time(from.time()).and_utc())
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a valid frequency (expected daily, weekly, monthly or yearly)")]
pub struct ParseFrequencyError(pub String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(ParseFrequencyError(value.to_string())),
        }
    }
}

fn shift_month(date: NaiveDate, anchor_day: u32) -> Option<NaiveDate> {
    if date.month() == 12 {
        clamped(date.year().checked_add(1)?, 1, anchor_day)
    } else {
        clamped(date.year(), date.month() + 1, anchor_day)
    }
}

fn clamped(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let day = day.clamp(1, days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if month == 12 {
        return Some(31);
    }
    NaiveDate::from_ymd_opt(year, month + 1, 1)?
        .pred_opt()
        .map(|last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    #[test]
    fn daily_and_weekly_are_plain_day_offsets() {
        assert_eq!(Frequency::Daily.advance(at(2024, 2, 28)), Some(at(2024, 2, 29)));
        assert_eq!(Frequency::Daily.advance(at(2023, 12, 31)), Some(at(2024, 1, 1)));
        assert_eq!(Frequency::Weekly.advance(at(2024, 1, 29)), Some(at(2024, 2, 5)));
    }

    #[test]
    fn monthly_clamps_to_end_of_shorter_month() {
        assert_eq!(Frequency::Monthly.advance(at(2024, 1, 31)), Some(at(2024, 2, 29)));
        assert_eq!(Frequency::Monthly.advance(at(2023, 1, 31)), Some(at(2023, 2, 28)));
        assert_eq!(Frequency::Monthly.advance(at(2024, 3, 31)), Some(at(2024, 4, 30)));
        assert_eq!(Frequency::Monthly.advance(at(2024, 12, 15)), Some(at(2025, 1, 15)));
    }

    #[test]
    fn anchored_monthly_returns_to_anchor_day() {
        let feb = Frequency::Monthly.advance_anchored(at(2024, 1, 31), 31).unwrap();
        assert_eq!(feb, at(2024, 2, 29));
        let mar = Frequency::Monthly.advance_anchored(feb, 31).unwrap();
        assert_eq!(mar, at(2024, 3, 31));
        // Without the anchor the 29th sticks.
        assert_eq!(Frequency::Monthly.advance(feb), Some(at(2024, 3, 29)));
    }

    #[test]
    fn yearly_handles_leap_day() {
        assert_eq!(Frequency::Yearly.advance(at(2024, 2, 29)), Some(at(2025, 2, 28)));
        let mut cursor = at(2024, 2, 29);
        for _ in 0..4 {
            cursor = Frequency::Yearly.advance_anchored(cursor, 29).unwrap();
        }
        assert_eq!(cursor, at(2028, 2, 29));
    }

    #[test]
    fn advance_keeps_time_of_day() {
        let next = Frequency::Monthly.advance(at(2024, 5, 10)).unwrap();
        assert_eq!(next.time(), at(2024, 5, 10).time());
    }

    #[test]
    fn steps_past_the_calendar_range_yield_none() {
        let last_day = NaiveDate::MAX.and_hms_opt(0, 0, 0).unwrap().and_utc();
        assert_eq!(Frequency::Daily.advance(last_day), None);
        assert_eq!(Frequency::Weekly.advance(last_day - chrono::Duration::days(3)), None);
        assert_eq!(Frequency::Monthly.advance(last_day), None);
        assert_eq!(Frequency::Yearly.advance(last_day), None);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Monthly".parse::<Frequency>(), Ok(Frequency::Monthly));
        assert!("fortnightly".parse::<Frequency>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Frequency::Yearly).unwrap();
        assert_eq!(json, "\"yearly\"");
    }
}

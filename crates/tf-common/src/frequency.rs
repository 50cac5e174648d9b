//! Window widths for time buckets.
//!
//! Widths are written as pandas-style offset aliases with an optional
//! positive multiplier:
//! - `S` / `s`: seconds
//! - `T` / `min`: minutes
//! - `H` / `h`: hours
//! - `D`: days
//! - `W`, `W-<DAY>`: weeks ending on `<DAY>` (`W` is `W-SUN`)
//! - `MS` / `M`: calendar months
//!
//! All truncation happens in UTC on microsecond instants. The bucket grid is
//! anchored at the day, week or month of the earliest event, so widths of
//! several units do not depend on the Unix epoch.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const SECOND_US: i64 = 1_000_000;
const MINUTE_US: i64 = 60 * SECOND_US;
const HOUR_US: i64 = 60 * MINUTE_US;
const DAY_US: i64 = 24 * HOUR_US;
const WEEK_US: i64 = 7 * DAY_US;

/// Base unit of a window width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowUnit {
    Second,
    Minute,
    Hour,
    Day,
    /// Week whose last day is `ends_on`.
    Week { ends_on: Weekday },
    Month,
}

/// Width of a time bucket: `multiple` consecutive `unit`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WindowWidth {
    pub multiple: u32,
    pub unit: WindowUnit,
}

impl Default for WindowWidth {
    /// One week ending on Sunday.
    fn default() -> Self {
        WindowWidth::weeks(1)
    }
}

impl WindowWidth {
    pub fn new(multiple: u32, unit: WindowUnit) -> Result<Self> {
        if multiple == 0 {
            return Err(Error::InvalidFrequency(
                "multiplier must be positive".to_string(),
            ));
        }
        Ok(WindowWidth { multiple, unit })
    }

    pub fn seconds(multiple: u32) -> Self {
        WindowWidth {
            multiple: multiple.max(1),
            unit: WindowUnit::Second,
        }
    }

    pub fn minutes(multiple: u32) -> Self {
        WindowWidth {
            multiple: multiple.max(1),
            unit: WindowUnit::Minute,
        }
    }

    pub fn hours(multiple: u32) -> Self {
        WindowWidth {
            multiple: multiple.max(1),
            unit: WindowUnit::Hour,
        }
    }

    pub fn days(multiple: u32) -> Self {
        WindowWidth {
            multiple: multiple.max(1),
            unit: WindowUnit::Day,
        }
    }

    pub fn weeks(multiple: u32) -> Self {
        WindowWidth {
            multiple: multiple.max(1),
            unit: WindowUnit::Week {
                ends_on: Weekday::Sun,
            },
        }
    }

    pub fn months(multiple: u32) -> Self {
        WindowWidth {
            multiple: multiple.max(1),
            unit: WindowUnit::Month,
        }
    }

    /// Origin of the bucket grid for a table whose earliest start is `first`.
    ///
    /// Fixed-length widths start at UTC midnight of that day, weeks at the
    /// first day of its anchored week and months at the first of its month.
    pub fn origin(&self, first: i64) -> Option<i64> {
        match self.unit {
            WindowUnit::Second | WindowUnit::Minute | WindowUnit::Hour | WindowUnit::Day => {
                floor_to(first, 0, DAY_US)
            }
            WindowUnit::Week { ends_on } => {
                floor_to(first, week_offset(ends_on) * DAY_US, WEEK_US)
            }
            WindowUnit::Month => month_start(month_index(first)?),
        }
    }

    /// Start of the bucket containing `micros` on the grid anchored at `origin`.
    ///
    /// Returns `None` when the window start is not representable: the width
    /// or the instant overflows, or a month lies outside the calendar range.
    pub fn window_start(&self, micros: i64, origin: i64) -> Option<i64> {
        let multiple = i64::from(self.multiple);
        let unit_us = match self.unit {
            WindowUnit::Second => SECOND_US,
            WindowUnit::Minute => MINUTE_US,
            WindowUnit::Hour => HOUR_US,
            WindowUnit::Day => DAY_US,
            WindowUnit::Week { .. } => WEEK_US,
            WindowUnit::Month => {
                let base = month_index(origin)?;
                let steps = (month_index(micros)? - base).div_euclid(multiple);
                return month_start(base + steps * multiple);
            }
        };
        floor_to(micros, origin, multiple.checked_mul(unit_us)?)
    }

    /// Start of the bucket containing `micros` when the grid starts with it.
    pub fn truncate(&self, micros: i64) -> Option<i64> {
        self.window_start(micros, self.origin(micros)?)
    }
}

/// Days from a Thursday (1970-01-01) to the first day of a week ending on `ends_on`.
fn week_offset(ends_on: Weekday) -> i64 {
    let first_day = ends_on.succ();
    (i64::from(first_day.num_days_from_monday()) + 7
        - i64::from(Weekday::Thu.num_days_from_monday()))
        % 7
}

fn month_index(micros: i64) -> Option<i64> {
    let dt = DateTime::from_timestamp_micros(micros)?;
    Some(i64::from(dt.year()) * 12 + i64::from(dt.month0()))
}

fn month_start(index: i64) -> Option<i64> {
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    let start = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
    Some(start.and_utc().timestamp_micros())
}

fn floor_to(micros: i64, origin: i64, width: i64) -> Option<i64> {
    let steps = micros.checked_sub(origin)?.div_euclid(width);
    steps.checked_mul(width)?.checked_add(origin)
}

fn alias_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d*)\s*([A-Za-z]+)(?:-([A-Za-z]{3}))?\s*$").expect("valid alias regex")
    })
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s.to_ascii_uppercase().as_str() {
        "MON" => Some(Weekday::Mon),
        "TUE" => Some(Weekday::Tue),
        "WED" => Some(Weekday::Wed),
        "THU" => Some(Weekday::Thu),
        "FRI" => Some(Weekday::Fri),
        "SAT" => Some(Weekday::Sat),
        "SUN" => Some(Weekday::Sun),
        _ => None,
    }
}

fn weekday_alias(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MON",
        Weekday::Tue => "TUE",
        Weekday::Wed => "WED",
        Weekday::Thu => "THU",
        Weekday::Fri => "FRI",
        Weekday::Sat => "SAT",
        Weekday::Sun => "SUN",
    }
}

impl FromStr for WindowWidth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let caps = alias_pattern()
            .captures(s)
            .ok_or_else(|| Error::InvalidFrequency(s.to_string()))?;

        let multiple = match caps.get(1).map(|m| m.as_str()).unwrap_or("") {
            "" => 1,
            digits => digits
                .parse::<u32>()
                .map_err(|_| Error::InvalidFrequency(s.to_string()))?,
        };
        let anchor = caps.get(3).map(|m| m.as_str());

        let unit = match (&caps[2], anchor) {
            ("S" | "s" | "sec", None) => WindowUnit::Second,
            ("T" | "min", None) => WindowUnit::Minute,
            ("H" | "h", None) => WindowUnit::Hour,
            ("D" | "d", None) => WindowUnit::Day,
            ("W" | "w", None) => WindowUnit::Week {
                ends_on: Weekday::Sun,
            },
            ("W" | "w", Some(day)) => WindowUnit::Week {
                ends_on: parse_weekday(day)
                    .ok_or_else(|| Error::InvalidFrequency(s.to_string()))?,
            },
            ("MS" | "M", None) => WindowUnit::Month,
            _ => return Err(Error::InvalidFrequency(s.to_string())),
        };

        WindowWidth::new(multiple, unit).map_err(|_| Error::InvalidFrequency(s.to_string()))
    }
}

impl fmt::Display for WindowWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multiple != 1 {
            write!(f, "{}", self.multiple)?;
        }
        match self.unit {
            WindowUnit::Second => write!(f, "s"),
            WindowUnit::Minute => write!(f, "min"),
            WindowUnit::Hour => write!(f, "h"),
            WindowUnit::Day => write!(f, "D"),
            WindowUnit::Week { ends_on } => write!(f, "W-{}", weekday_alias(ends_on)),
            WindowUnit::Month => write!(f, "MS"),
        }
    }
}

impl TryFrom<String> for WindowWidth {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<WindowWidth> for String {
    fn from(value: WindowWidth) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn us(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .timestamp_micros()
    }

    #[test]
    fn parses_common_aliases() {
        assert_eq!("W".parse::<WindowWidth>().unwrap(), WindowWidth::weeks(1));
        assert_eq!("D".parse::<WindowWidth>().unwrap(), WindowWidth::days(1));
        assert_eq!(
            "15min".parse::<WindowWidth>().unwrap(),
            WindowWidth::minutes(15)
        );
        assert_eq!("2H".parse::<WindowWidth>().unwrap(), WindowWidth::hours(2));
        assert_eq!("30s".parse::<WindowWidth>().unwrap(), WindowWidth::seconds(30));
        assert_eq!("MS".parse::<WindowWidth>().unwrap(), WindowWidth::months(1));
        assert_eq!(
            "W-MON".parse::<WindowWidth>().unwrap().unit,
            WindowUnit::Week {
                ends_on: Weekday::Mon
            }
        );
    }

    #[test]
    fn rejects_invalid_aliases() {
        for bad in ["", "Q", "0D", "W-XYZ", "D-MON", "-3H", "1.5H"] {
            let err = bad.parse::<WindowWidth>().unwrap_err();
            assert!(matches!(err, Error::InvalidFrequency(_)), "{bad}");
        }
    }

    #[test]
    fn display_round_trips_through_parse() {
        for alias in ["W-SUN", "3D", "15min", "h", "2MS", "W-WED", "10s"] {
            let width: WindowWidth = alias.parse().unwrap();
            assert_eq!(width.to_string().parse::<WindowWidth>().unwrap(), width);
        }
    }

    #[test]
    fn default_week_starts_on_monday() {
        // 2024-05-15 is a Wednesday.
        let width = WindowWidth::default();
        let start = width.truncate(us(2024, 5, 15, 13, 45)).unwrap();
        assert_eq!(start, us(2024, 5, 13, 0, 0));
        // Sunday late evening stays in the same week.
        assert_eq!(width.truncate(us(2024, 5, 19, 23, 59)).unwrap(), start);
        // Monday midnight opens the next one.
        assert_eq!(
            width.truncate(us(2024, 5, 20, 0, 0)).unwrap(),
            us(2024, 5, 20, 0, 0)
        );
    }

    #[test]
    fn anchored_week_starts_after_anchor_day() {
        let width: WindowWidth = "W-WED".parse().unwrap();
        // Wednesday belongs to the week that started on the previous Thursday.
        let start = width.truncate(us(2024, 5, 15, 13, 45)).unwrap();
        assert_eq!(start, us(2024, 5, 9, 0, 0));
    }

    #[test]
    fn single_unit_widths_floor_to_unit() {
        let width = WindowWidth::minutes(15);
        assert_eq!(
            width.truncate(us(2024, 5, 15, 13, 44)).unwrap(),
            us(2024, 5, 15, 13, 30)
        );
        let day = WindowWidth::days(1);
        assert_eq!(
            day.truncate(us(2024, 5, 15, 13, 44)).unwrap(),
            us(2024, 5, 15, 0, 0)
        );
    }

    #[test]
    fn truncation_before_epoch_floors_down() {
        let width = WindowWidth::days(1);
        let before = us(1969, 12, 31, 12, 0);
        assert_eq!(width.truncate(before).unwrap(), us(1969, 12, 31, 0, 0));
    }

    #[test]
    fn months_truncate_to_first_day() {
        let width = WindowWidth::months(1);
        assert_eq!(
            width.truncate(us(2024, 2, 29, 23, 0)).unwrap(),
            us(2024, 2, 1, 0, 0)
        );
        let quarter = WindowWidth::months(3);
        let origin = quarter.origin(us(2024, 2, 10, 0, 0)).unwrap();
        assert_eq!(origin, us(2024, 2, 1, 0, 0));
        assert_eq!(
            quarter.window_start(us(2024, 4, 30, 0, 0), origin).unwrap(),
            us(2024, 2, 1, 0, 0)
        );
        assert_eq!(
            quarter.window_start(us(2024, 5, 1, 0, 0), origin).unwrap(),
            us(2024, 5, 1, 0, 0)
        );
    }

    #[test]
    fn serde_uses_alias_strings() {
        let json = serde_json::to_string(&WindowWidth::hours(2)).unwrap();
        assert_eq!(json, "\"2h\"");
        let back: WindowWidth = serde_json::from_str("\"W\"").unwrap();
        assert_eq!(back, WindowWidth::weeks(1));
        assert!(serde_json::from_str::<WindowWidth>("\"fortnight\"").is_err());
    }

    #[test]
    fn multi_day_grid_starts_at_first_day() {
        let width = WindowWidth::days(3);
        let origin = width.origin(us(2024, 1, 1, 12, 0)).unwrap();
        assert_eq!(origin, us(2024, 1, 1, 0, 0));
        assert_eq!(
            width.window_start(us(2024, 1, 3, 12, 0), origin).unwrap(),
            origin
        );
        assert_eq!(
            width.window_start(us(2024, 1, 4, 0, 0), origin).unwrap(),
            us(2024, 1, 4, 0, 0)
        );
    }

    #[test]
    fn multi_hour_grid_starts_at_midnight() {
        let width = WindowWidth::hours(5);
        let origin = width.origin(us(2024, 1, 1, 7, 30)).unwrap();
        assert_eq!(origin, us(2024, 1, 1, 0, 0));
        assert_eq!(
            width.window_start(us(2024, 1, 2, 1, 0), origin).unwrap(),
            us(2024, 1, 2, 1, 0)
        );
    }

    #[test]
    fn multi_week_grid_starts_at_first_week() {
        let width = WindowWidth::weeks(2);
        // 2024-01-10 is a Wednesday; its week starts Monday 2024-01-08.
        let origin = width.origin(us(2024, 1, 10, 9, 0)).unwrap();
        assert_eq!(origin, us(2024, 1, 8, 0, 0));
        assert_eq!(
            width.window_start(us(2024, 1, 21, 23, 0), origin).unwrap(),
            origin
        );
        assert_eq!(
            width.window_start(us(2024, 1, 22, 0, 0), origin).unwrap(),
            us(2024, 1, 22, 0, 0)
        );
    }

    #[test]
    fn unrepresentable_windows_are_none() {
        assert_eq!(WindowWidth::weeks(u32::MAX).truncate(0), None);
        assert_eq!(WindowWidth::seconds(1).truncate(i64::MIN), None);
        assert_eq!(WindowWidth::months(1).truncate(i64::MAX), None);
    }
}

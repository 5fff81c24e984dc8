use chrono::{Datelike, Duration, Local, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid date: {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("invalid date format (use YYYY-MM-DD): {0}")]
    Unparsable(String),
}

/// A whole calendar day. Only valid Gregorian dates can be constructed, and
/// ordering is chronological (year, then month, then day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(DateKey)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// The current local date.
    pub fn today() -> Self {
        DateKey(Local::now().date_naive())
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// 0 = Monday .. 6 = Sunday.
    pub fn weekday(self) -> u32 {
        self.0.weekday().num_days_from_monday()
    }

    /// 0 = Sunday .. 6 = Saturday, the indexing of locale weekday tables.
    pub fn weekday_from_sunday(self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    pub fn is_monday(self) -> bool {
        self.weekday() == 0
    }

    /// ISO-8601 week number. Only shown for Mondays, where it labels the
    /// week that starts on that day.
    pub fn iso_week_number(self) -> u32 {
        self.0.iso_week().week()
    }

    /// Moves `n` days forward (or backward for negative `n`). Saturates at
    /// the ends of the representable range.
    pub fn add_days(self, n: i64) -> Self {
        match Duration::try_days(n).and_then(|delta| self.0.checked_add_signed(delta)) {
            Some(date) => DateKey(date),
            None if n < 0 => DateKey(NaiveDate::MIN),
            None => DateKey(NaiveDate::MAX),
        }
    }

    pub fn first_of_month(self) -> Self {
        self.add_days(1 - i64::from(self.day()))
    }

    /// Number of days from `self` to `other`; negative when `other` is earlier.
    pub fn days_until(self, other: DateKey) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }

    pub fn as_naive_date(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(DateKey)
            .map_err(|_| DateError::Unparsable(raw.to_string()))
    }
}

/// Calendar zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Day, Granularity::Week, Granularity::Month];

    pub fn index(self) -> i64 {
        match self {
            Granularity::Day => 0,
            Granularity::Week => 1,
            Granularity::Month => 2,
        }
    }

    /// Maps a persisted index onto a granularity. Negative values become
    /// `Day`, anything else wraps around.
    pub fn from_index(index: i64) -> Self {
        if index < 0 {
            return Granularity::Day;
        }
        Self::ALL[(index % Self::ALL.len() as i64) as usize]
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Self {
        Self::from_index(self.index() + Self::ALL.len() as i64 - 1)
    }

    /// Number of dates on one page.
    pub fn page_len(self) -> usize {
        match self {
            Granularity::Day => 1,
            Granularity::Week => 7,
            Granularity::Month => 35,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 4 == 0 && year % 100 != 0)
}

/// Length of `month` in `year`.
///
/// `month` must be in 1-12; debug builds panic otherwise. Use
/// [`checked_days_in_month`] for months that come from outside input.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    debug_assert!((1..=12).contains(&month), "month out of range: {month}");
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Like [`days_in_month`], but rejects a month outside 1-12.
pub fn checked_days_in_month(year: i32, month: u32) -> Result<u32, DateError> {
    if !(1..=12).contains(&month) {
        return Err(DateError::InvalidDate {
            year,
            month,
            day: 1,
        });
    }
    Ok(days_in_month(year, month))
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// First date of the page that shows `date`.
///
/// Week pages start on the Monday of `date`'s week. Month pages start on the
/// Monday on or before the 1st of `date`'s month, so the first row of the grid
/// may hold trailing days of the previous month.
pub fn page_anchor(granularity: Granularity, date: DateKey) -> DateKey {
    match granularity {
        Granularity::Day => date,
        Granularity::Week => monday_on_or_before(date),
        Granularity::Month => monday_on_or_before(date.first_of_month()),
    }
}

fn monday_on_or_before(date: DateKey) -> DateKey {
    date.add_days(-i64::from(date.weekday()))
}

/// Number of days one page step moves away from `reference`.
///
/// Month steps use the length of the month being left when moving forward
/// and the length of the month before it when moving backward.
pub fn step_unit(granularity: Granularity, reference: DateKey, direction: Direction) -> i64 {
    match granularity {
        Granularity::Day => 1,
        Granularity::Week => 7,
        Granularity::Month => {
            let (year, month) = match direction {
                Direction::Forward => (reference.year(), reference.month()),
                Direction::Backward => previous_month(reference.year(), reference.month()),
            };
            i64::from(days_in_month(year, month))
        }
    }
}

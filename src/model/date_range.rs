//! Week/month window arithmetic and date parsing.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, Utc};

use crate::error::{GanttError, Result};

/// An inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The Monday-to-Sunday week containing `date`, clamped to the
    /// representable calendar at its extremes.
    pub fn week(date: NaiveDate) -> Self {
        Self::checked_week(date).unwrap_or_else(|| {
            let start = date
                .checked_sub_days(Days::new(u64::from(week_offset(date))))
                .unwrap_or(NaiveDate::MIN);
            Self {
                start,
                end: start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX),
            }
        })
    }

    /// The full week containing `date`, if every day of it is representable.
    pub fn checked_week(date: NaiveDate) -> Option<Self> {
        let start = date.checked_sub_days(Days::new(u64::from(week_offset(date))))?;
        let end = start.checked_add_days(Days::new(6))?;
        Some(Self { start, end })
    }

    /// The calendar month containing `date`.
    pub fn month(date: NaiveDate) -> Self {
        Self::checked_month(date).unwrap_or_else(|| {
            let start = first_of_month(date);
            Self {
                start,
                end: NaiveDate::MAX,
            }
        })
    }

    /// The full month containing `date`, if its end is representable.
    pub fn checked_month(date: NaiveDate) -> Option<Self> {
        let start = first_of_month(date);
        // Day zero of the following month.
        let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(Self { start, end })
    }

    /// Number of days covered, both bounds included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// True when `[start, end]` shares at least one day with this range.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end && end >= self.start
    }

    /// Day offset of `date` from the start of the range (negative before it).
    pub fn offset_of(&self, date: NaiveDate) -> i64 {
        (date - self.start).num_days()
    }

    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take_while({
            let end = self.end;
            move |d| *d <= end
        })
    }

    pub fn format(&self, format: RangeFormat) -> String {
        format_range(self.start, self.end, format)
    }
}

/// Sunday counts as day 7, so it closes the week that started on the prior Monday.
fn week_offset(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday() - 1
}

/// True when both the week and the month around `date` can be shown.
pub fn has_full_windows(date: NaiveDate) -> bool {
    DateRange::checked_week(date).is_some() && DateRange::checked_month(date).is_some()
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Label styles for a date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeFormat {
    Full,
    Short,
    Month,
}

/// Format a window for the toolbar label.
///
/// `Month` prints only the start's month and year. The other formats print
/// both bounds, dropping the year from the second one when both share it.
pub fn format_range(start: NaiveDate, end: NaiveDate, format: RangeFormat) -> String {
    let same_year = start.year() == end.year();
    match format {
        RangeFormat::Month => start.format("%B %Y").to_string(),
        RangeFormat::Full => {
            let end_fmt = if same_year { "%B %-d" } else { "%B %-d, %Y" };
            format!("{} - {}", start.format("%B %-d, %Y"), end.format(end_fmt))
        }
        RangeFormat::Short => {
            let end_fmt = if same_year { "%-m/%-d" } else { "%Y/%-m/%-d" };
            format!("{} - {}", start.format("%Y/%-m/%-d"), end.format(end_fmt))
        }
    }
}

/// Anything the chart accepts as a date.
#[derive(Debug, Clone, Copy)]
pub enum DateInput<'a> {
    Date(NaiveDate),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    Text(&'a str),
}

impl From<NaiveDate> for DateInput<'_> {
    fn from(date: NaiveDate) -> Self {
        DateInput::Date(date)
    }
}

impl From<i64> for DateInput<'_> {
    fn from(ms: i64) -> Self {
        DateInput::Timestamp(ms)
    }
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(s: &'a str) -> Self {
        DateInput::Text(s)
    }
}

/// Parse a date from any supported input.
///
/// Text may be ISO-8601 (with or without an offset), `YYYY-MM-DD`, or
/// `YYYY年MM月DD日`. Date-times keep the calendar day of their own offset.
pub fn parse_date<'a>(input: impl Into<DateInput<'a>>) -> Result<NaiveDate> {
    match input.into() {
        DateInput::Date(date) => Ok(date),
        DateInput::Timestamp(ms) => date_from_millis(ms)
            .ok_or_else(|| GanttError::parse("date", ms.to_string())),
        DateInput::Text(text) => parse_date_text(text.trim())
            .ok_or_else(|| GanttError::parse("date", text)),
    }
}

/// Parse a date held in a JSON value (string or epoch-ms number).
pub fn parse_date_value(value: &serde_json::Value) -> Result<NaiveDate> {
    match value {
        serde_json::Value::String(s) => parse_date(s.as_str()),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(ms) => parse_date(ms),
            None => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map(|f| parse_date(f.trunc() as i64))
                .unwrap_or_else(|| Err(GanttError::parse("date", n.to_string()))),
        },
        other => Err(GanttError::parse("date", other.to_string())),
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    parse_cjk_date(text)
}

/// `2024年3月1日`
fn parse_cjk_date(text: &str) -> Option<NaiveDate> {
    let rest = text.strip_suffix('日')?;
    let (year, rest) = rest.split_once('年')?;
    let (month, day) = rest.split_once('月')?;
    if year.len() != 4 || !(1..=2).contains(&month.len()) || !(1..=2).contains(&day.len()) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

pub fn date_from_millis(ms: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.date_naive())
}

/// Midnight UTC of `date`, in epoch milliseconds.
pub fn date_to_millis(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .timestamp_millis()
}

/// ISO-8601 string for midnight UTC of `date`, e.g. `2024-03-01T00:00:00.000Z`.
pub fn date_to_iso(date: NaiveDate) -> String {
    date.and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

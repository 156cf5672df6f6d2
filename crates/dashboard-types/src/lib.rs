//! Shared value types for the patient dashboard.
//!
//! Clinical summary records arrive from the remote API with dates in several shapes: the
//! dashboard's own `DD-MM-YYYY`, plain ISO dates, and ISO datetimes with or without an offset.
//! [`ClinicalDate`] normalises all of them to a calendar day so that comparisons ignore the
//! exact instant.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

/// Years the source system writes when a date was never recorded.
pub const UNSET_SENTINEL_YEARS: [i32; 2] = [1899, 1900];

const DATE_FORMATS: [&str; 2] = ["%d-%m-%Y", "%Y-%m-%d"];

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%.f%:z"];

/// Errors that can occur when parsing a clinical date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    /// The input was empty or contained only whitespace
    #[error("date cannot be empty")]
    Empty,
    /// The input did not match any supported date format
    #[error("unrecognised date format: '{0}'")]
    Unrecognised(String),
}

/// A calendar day taken from a clinical record.
///
/// Ordering and equality are by calendar day only. Time-of-day and offset information in the
/// source string are discarded during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClinicalDate(NaiveDate);

impl ClinicalDate {
    /// Parses a date string in any of the supported forms.
    ///
    /// Supported forms, tried in order:
    /// - `DD-MM-YYYY`
    /// - `YYYY-MM-DD`
    /// - RFC 3339 datetimes (`2019-04-01T08:30:00.000Z`, `...+03:00`)
    /// - ISO datetimes with a compact offset (`2019-04-01T08:30:00.000+0300`)
    /// - naive ISO datetimes (`2019-04-01T08:30:00`, `2019-04-01 08:30:00`)
    ///
    /// For datetimes carrying an offset, the calendar day is the one stated in that offset.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::Empty`] for blank input and [`DateError::Unrecognised`] when no
    /// supported form matches.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, DateError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DateError::Empty);
        }

        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return Ok(Self(date));
            }
        }

        if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(datetime.date_naive()));
        }

        for format in OFFSET_DATETIME_FORMATS {
            if let Ok(datetime) = DateTime::parse_from_str(trimmed, format) {
                return Ok(Self(datetime.date_naive()));
            }
        }

        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Self(datetime.date()));
            }
        }

        Err(DateError::Unrecognised(trimmed.to_owned()))
    }

    /// Parses a date, treating any failure as absent.
    pub fn parse_lenient(input: Option<&str>) -> Option<Self> {
        input.and_then(|s| Self::parse(s).ok())
    }

    /// Builds a date from calendar components, returning `None` if they are out of range.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// True for the placeholder years the source system uses for "never recorded".
    pub fn is_unset_sentinel(&self) -> bool {
        UNSET_SENTINEL_YEARS.contains(&self.year())
    }
}

impl fmt::Display for ClinicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for ClinicalDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClinicalDate::parse(s)
    }
}

impl serde::Serialize for ClinicalDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ClinicalDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ClinicalDate::parse(&s).map_err(serde::de::Error::custom)
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Offence hierarchy, entity key, and calendar month types.
//!
//! These are the keys every other crate in the crime-panel toolchain groups
//! by. An [`EntityKey`] identifies one monthly time series and a [`Month`]
//! identifies one position on the calendar axis of that series.

use std::str::FromStr;

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One level of the three-level offence hierarchy.
///
/// The string form of each variant is the canonical column name used for
/// that level after source columns have been renamed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum OffenceLevel {
    /// Broad grouping (e.g. "OFFENCES AGAINST PROPERTY").
    #[serde(rename = "Offence Level 1")]
    #[strum(serialize = "Offence Level 1")]
    Broad,
    /// Medium grouping (e.g. "THEFT AND RELATED OFFENCES").
    #[serde(rename = "Offence Level 2")]
    #[strum(serialize = "Offence Level 2")]
    Medium,
    /// Fine-grained offence (e.g. "Theft from shop").
    #[serde(rename = "Offence Level 3")]
    #[strum(serialize = "Offence Level 3")]
    Fine,
}

/// The `(suburb, offence level 1, offence level 2)` tuple that defines one
/// monthly time series.
///
/// Field order is significant: the derived [`Ord`] sorts by suburb first,
/// then by the broad and medium offence levels.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityKey {
    /// Location label (suburb of the incident).
    pub suburb: String,
    /// Broad offence category.
    pub offence_level_1: String,
    /// Medium offence category.
    pub offence_level_2: String,
}

impl EntityKey {
    /// Creates a key from its three components.
    #[must_use]
    pub fn new(
        suburb: impl Into<String>,
        offence_level_1: impl Into<String>,
        offence_level_2: impl Into<String>,
    ) -> Self {
        Self {
            suburb: suburb.into(),
            offence_level_1: offence_level_1.into(),
            offence_level_2: offence_level_2.into(),
        }
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} / {} / {}",
            self.suburb, self.offence_level_1, self.offence_level_2
        )
    }
}

/// A calendar month (a date truncated to its month).
///
/// Ordered chronologically. Serialized as `"YYYY-MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Creates a month from a year and a 1-based month number.
    ///
    /// # Errors
    ///
    /// Returns an error if `month` is not in `1..=12` or the year is outside
    /// the range representable by [`NaiveDate`].
    pub fn new(year: i32, month: u32) -> Result<Self, InvalidMonthError> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(InvalidMonthError { year, month });
        }
        Ok(Self { year, month })
    }

    /// Truncates a date to its calendar month.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns the month number (1-12).
    #[must_use]
    pub const fn number(self) -> u32 {
        self.month
    }

    /// Returns the first day of this month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Returns the month immediately following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = InvalidMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = InvalidMonthError { year: 0, month: 0 };
        let (year, month) = s.trim().split_once('-').ok_or(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid)?;
        let month = month.parse::<u32>().map_err(|_| invalid)?;
        Self::new(year, month)
    }
}

impl From<Month> for String {
    fn from(value: Month) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Month {
    type Error = InvalidMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Error returned when a year/month pair does not name a valid calendar
/// month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMonthError {
    /// The year that was provided.
    pub year: i32,
    /// The month number that was provided.
    pub month: u32,
}

impl std::fmt::Display for InvalidMonthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid month {}-{}: expected a year and a month in 1-12",
            self.year, self.month
        )
    }
}

impl std::error::Error for InvalidMonthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_truncates_date() {
        let date = NaiveDate::from_ymd_opt(2023, 7, 19).unwrap();
        let month = Month::from_date(date);
        assert_eq!(month, Month::new(2023, 7).unwrap());
        assert_eq!(month.number(), 7);
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2023, 7, 1).unwrap());
    }

    #[test]
    fn month_orders_chronologically() {
        let dec = Month::new(2022, 12).unwrap();
        let jan = Month::new(2023, 1).unwrap();
        let feb = Month::new(2023, 2).unwrap();
        assert!(dec < jan);
        assert!(jan < feb);
        assert_eq!(dec.next(), jan);
        assert_eq!(jan.next(), feb);
    }

    #[test]
    fn month_rejects_out_of_range() {
        assert!(Month::new(2023, 0).is_err());
        assert!(Month::new(2023, 13).is_err());
        assert!("2023-13".parse::<Month>().is_err());
        assert!("garbage".parse::<Month>().is_err());
    }

    #[test]
    fn month_string_roundtrip() {
        let month: Month = "2024-03".parse().unwrap();
        assert_eq!(month.to_string(), "2024-03");
        let json = serde_json::to_string(&month).unwrap();
        assert_eq!(json, "\"2024-03\"");
        let back: Month = serde_json::from_str(&json).unwrap();
        assert_eq!(back, month);
    }

    #[test]
    fn entity_key_orders_by_suburb_then_levels() {
        let a = EntityKey::new("Adelaide", "Theft", "Shoplifting");
        let b = EntityKey::new("Adelaide", "Theft", "Vehicle");
        let c = EntityKey::new("Brompton", "Assault", "Common");
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn offence_levels_use_canonical_column_names() {
        assert_eq!(OffenceLevel::Broad.as_ref(), "Offence Level 1");
        assert_eq!(OffenceLevel::Fine.to_string(), "Offence Level 3");
        assert_eq!(
            "Offence Level 2".parse::<OffenceLevel>().unwrap(),
            OffenceLevel::Medium
        );
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Source table descriptors, canonical column names, and the unified
//! incident record format.
//!
//! Every period-partitioned crime table is read into [`IncidentRecord`]s
//! after its columns have been renamed to the [`CanonicalColumn`] set via a
//! [`ColumnMapping`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use crime_panel_crime_models::{EntityKey, Month, OffenceLevel};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Column names every source table must expose once renamed.
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
pub enum CanonicalColumn {
    /// Date the offence was reported (day-first in the raw data).
    #[serde(rename = "Reported Date")]
    #[strum(serialize = "Reported Date")]
    ReportedDate,
    /// Suburb where the incident occurred.
    #[serde(rename = "Suburb")]
    #[strum(serialize = "Suburb")]
    Suburb,
    /// Broad offence category.
    #[serde(rename = "Offence Level 1")]
    #[strum(serialize = "Offence Level 1")]
    OffenceLevel1,
    /// Medium offence category.
    #[serde(rename = "Offence Level 2")]
    #[strum(serialize = "Offence Level 2")]
    OffenceLevel2,
    /// Fine-grained offence category.
    #[serde(rename = "Offence Level 3")]
    #[strum(serialize = "Offence Level 3")]
    OffenceLevel3,
    /// Number of offences in the entry.
    #[serde(rename = "Offence Count")]
    #[strum(serialize = "Offence Count")]
    OffenceCount,
}

impl CanonicalColumn {
    /// Returns all required columns in the order a table is checked for
    /// them; the first one missing is the one reported.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::ReportedDate,
            Self::Suburb,
            Self::OffenceLevel1,
            Self::OffenceLevel2,
            Self::OffenceLevel3,
            Self::OffenceCount,
        ]
    }
}

/// Mapping from source-specific column names to canonical names.
///
/// Headers absent from the mapping keep their original name, so a table
/// that already uses canonical names needs no entries at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    renames: BTreeMap<String, String>,
}

impl ColumnMapping {
    /// Creates a mapping from `(source name, canonical name)` pairs.
    #[must_use]
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            renames: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the canonical name for a source header.
    #[must_use]
    pub fn rename<'a>(&'a self, header: &'a str) -> &'a str {
        self.renames.get(header).map_or(header, String::as_str)
    }

    /// Number of rename entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.renames.len()
    }

    /// Whether the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }
}

/// One period-partitioned source table (e.g. one fiscal year of data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceTable {
    /// Human-readable period label (e.g. `"2022-23"`).
    pub period: String,
    /// Path to the CSV file. Relative paths are resolved against the
    /// definition's base directory.
    pub path: PathBuf,
}

/// One offence entry from a source table, with canonical fields.
///
/// Missing or unparseable cells are `None`. Records are never dropped at
/// load time; later stages decide which records take part in a grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Period label of the table the record came from.
    pub period: String,
    /// When the offence was reported. `None` when the source value is
    /// missing or is not a valid day-first date.
    pub reported_at: Option<NaiveDateTime>,
    /// Suburb of the incident.
    pub suburb: Option<String>,
    /// Broad offence category.
    pub offence_level_1: Option<String>,
    /// Medium offence category.
    pub offence_level_2: Option<String>,
    /// Fine-grained offence category.
    pub offence_level_3: Option<String>,
    /// Number of offences. `None` when missing or not a non-negative
    /// integer.
    pub offence_count: Option<u64>,
}

impl IncidentRecord {
    /// The reported date truncated to its calendar month.
    #[must_use]
    pub fn month(&self) -> Option<Month> {
        self.reported_at.map(|dt| Month::from_date(dt.date()))
    }

    /// Returns the label for one level of the offence hierarchy.
    #[must_use]
    pub fn offence_level(&self, level: OffenceLevel) -> Option<&str> {
        match level {
            OffenceLevel::Broad => self.offence_level_1.as_deref(),
            OffenceLevel::Medium => self.offence_level_2.as_deref(),
            OffenceLevel::Fine => self.offence_level_3.as_deref(),
        }
    }

    /// The entity key for this record, if all of its components are present.
    #[must_use]
    pub fn entity_key(&self) -> Option<EntityKey> {
        Some(EntityKey::new(
            self.suburb.as_deref()?,
            self.offence_level_1.as_deref()?,
            self.offence_level_2.as_deref()?,
        ))
    }
}

//! Core entry types for hydromon.
//!
//! This module defines the fundamental data structures for representing
//! monitoring entries: one logged observation of a plant's EC/pH/notes/photo
//! on a given date.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The crop a monitoring entry belongs to.
///
/// This is a closed set; the kebab-case spelling is canonical in storage,
/// JSON, and export filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlantType {
    /// Water spinach (kangkong).
    WaterSpinach,
    /// Common sage.
    Sage,
    /// Chili pepper.
    Chili,
}

impl PlantType {
    /// All plant types, in canonical order.
    pub const ALL: [Self; 3] = [Self::WaterSpinach, Self::Sage, Self::Chili];

    /// The canonical kebab-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WaterSpinach => "water-spinach",
            Self::Sage => "sage",
            Self::Chili => "chili",
        }
    }
}

impl std::fmt::Display for PlantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlantType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "water-spinach" => Ok(Self::WaterSpinach),
            "sage" => Ok(Self::Sage),
            "chili" => Ok(Self::Chili),
            other => Err(Error::parse(
                "plant type",
                format!("unknown plant type '{other}'"),
            )),
        }
    }
}

/// A persisted monitoring entry.
///
/// Entries are never mutated in place: they are created by a validated
/// submission and destroyed by explicit delete. JSON serialization uses
/// camelCase field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Unique identifier, assigned by the store on insert.
    pub id: i64,

    /// Which crop this observation belongs to.
    pub plant_type: PlantType,

    /// When the observation was made.
    pub date: DateTime<Utc>,

    /// Electrical conductivity of the nutrient solution, in μS/cm.
    pub ec: f64,

    /// Acidity/alkalinity on the 0-14 scale.
    pub ph: f64,

    /// Free-text notes.
    #[serde(default)]
    pub notes: String,

    /// Reference to an attached photo file, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_ref: Option<String>,

    /// When the record was inserted.
    pub created_at: DateTime<Utc>,

    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

/// An unvalidated candidate entry, as it arrives from the outside world.
///
/// Every domain field is optional here; [`crate::validate`] turns a
/// candidate into typed [`EntryData`] before anything is persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewEntry {
    /// Claimed plant type, not yet checked against the closed set.
    pub plant_type: Option<String>,

    /// Observation date.
    pub date: Option<DateTime<Utc>>,

    /// Electrical conductivity reading.
    pub ec: Option<f64>,

    /// pH reading.
    pub ph: Option<f64>,

    /// Free-text notes.
    pub notes: Option<String>,
}

/// A fully validated entry, ready for the store to persist.
///
/// Produced by [`crate::validate::validate`]; the store adds the id and
/// timestamps on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryData {
    /// Which crop this observation belongs to.
    pub plant_type: PlantType,
    /// When the observation was made.
    pub date: DateTime<Utc>,
    /// Electrical conductivity reading, already checked to be ≥ 0.
    pub ec: f64,
    /// pH reading, already checked to be within [0, 14].
    pub ph: f64,
    /// Free-text notes (empty string when none were given).
    pub notes: String,
    /// Reference to an attached photo, set by the service after upload.
    pub photo_ref: Option<String>,
}

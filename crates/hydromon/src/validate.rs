//! Candidate validation for monitoring entries.
//!
//! Checks run in a fixed order and the first failure wins: required-field
//! presence, then plant-type membership, then the EC range, then the pH
//! range. Each failure names the wire-format field it refers to.

use crate::entry::{EntryData, NewEntry, PlantType};
use crate::error::{Error, Result};

/// Validate a candidate entry, producing typed data ready to persist.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming the first field that failed.
pub fn validate(candidate: &NewEntry) -> Result<EntryData> {
    let plant_type = candidate
        .plant_type
        .as_deref()
        .ok_or_else(|| Error::validation("plantType", "Plant type is required"))?;

    let date = candidate
        .date
        .ok_or_else(|| Error::validation("date", "Date is required"))?;

    let ec = candidate
        .ec
        .ok_or_else(|| Error::validation("ec", "EC value is required"))?;

    let ph = candidate
        .ph
        .ok_or_else(|| Error::validation("ph", "pH value is required"))?;

    let plant_type: PlantType = plant_type.parse().map_err(|_| {
        Error::validation(
            "plantType",
            "Plant type must be water-spinach, sage, or chili",
        )
    })?;

    if !ec.is_finite() {
        return Err(Error::validation("ec", "EC must be a finite number"));
    }
    if ec < 0.0 {
        return Err(Error::validation("ec", "EC cannot be negative"));
    }

    if !ph.is_finite() {
        return Err(Error::validation("ph", "pH must be a finite number"));
    }
    if ph < 0.0 {
        return Err(Error::validation("ph", "pH cannot be negative"));
    }
    if ph > 14.0 {
        return Err(Error::validation("ph", "pH cannot exceed 14"));
    }

    Ok(EntryData {
        plant_type,
        date,
        ec,
        ph,
        notes: candidate.notes.clone().unwrap_or_default(),
        photo_ref: None,
    })
}

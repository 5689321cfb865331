//! CSV export for monitoring entries.
//!
//! Serializes one plant's ordered entry set to CSV text. The output
//! contract is byte-exact: a fixed header, `YYYY-MM-DD` dates, notes always
//! double-quoted with internal quotes doubled, and an empty field for a
//! missing photo reference. Rows are joined by `\n` with no trailing
//! newline; a plant with zero entries produces only the header.

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, PlantType};

/// The fixed CSV header row.
pub const CSV_HEADER: &str = "Date,EC,pH,Notes,Photo Reference";

/// A rendered export: CSV text plus the suggested download filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvExport {
    /// Suggested filename (content-disposition hint).
    pub filename: String,
    /// The CSV text.
    pub content: String,
}

/// Suggested filename for a plant's export.
#[must_use]
pub fn suggested_filename(plant_type: PlantType) -> String {
    format!("{plant_type}_monitoring_data.csv")
}

/// Render entries to CSV text.
///
/// The entries are expected in list order (date ascending); this function
/// does not re-sort.
#[must_use]
pub fn to_csv(entries: &[Entry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for entry in entries {
        lines.push(format!(
            "{},{},{},\"{}\",{}",
            entry.date.format("%Y-%m-%d"),
            entry.ec,
            entry.ph,
            entry.notes.replace('"', "\"\""),
            entry.photo_ref.as_deref().unwrap_or_default(),
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(date: &str, ec: f64, ph: f64, notes: &str, photo_ref: Option<&str>) -> Entry {
        Entry {
            id: 1,
            plant_type: PlantType::Sage,
            date: date.parse().expect("test date"),
            ec,
            ph,
            notes: notes.to_string(),
            photo_ref: photo_ref.map(String::from),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_golden_single_entry() {
        let entries = vec![entry("2024-01-01T00:00:00Z", 1.2, 6.5, "ok", None)];
        assert_eq!(
            to_csv(&entries),
            "Date,EC,pH,Notes,Photo Reference\n2024-01-01,1.2,6.5,\"ok\","
        );
    }

    #[test]
    fn test_zero_entries_yields_header_only() {
        assert_eq!(to_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn test_no_trailing_newline() {
        let entries = vec![entry("2024-01-01T00:00:00Z", 1.0, 6.0, "", None)];
        assert!(!to_csv(&entries).ends_with('\n'));
    }

    #[test]
    fn test_quotes_in_notes_are_doubled() {
        let entries = vec![entry(
            "2024-01-01T00:00:00Z",
            1.0,
            6.0,
            "leaves look \"burnt\" today",
            None,
        )];
        let csv = to_csv(&entries);
        assert!(csv.contains("\"leaves look \"\"burnt\"\" today\""));
    }

    #[test]
    fn test_photo_reference_rendered_when_present() {
        let entries = vec![entry(
            "2024-01-01T00:00:00Z",
            1.0,
            6.0,
            "",
            Some("1700000000000-leaf.png"),
        )];
        let csv = to_csv(&entries);
        assert!(csv.ends_with(",\"\",1700000000000-leaf.png"));
    }

    #[test]
    fn test_date_rendered_without_time_of_day() {
        let entries = vec![entry("2024-03-05T17:45:30Z", 1.0, 6.0, "", None)];
        let csv = to_csv(&entries);
        assert!(csv.contains("\n2024-03-05,"));
        assert!(!csv.contains("17:45"));
    }

    #[test]
    fn test_whole_number_readings_render_bare() {
        let entries = vec![entry("2024-01-01T00:00:00Z", 2.0, 7.0, "", None)];
        assert!(to_csv(&entries).contains("2024-01-01,2,7,"));
    }

    #[test]
    fn test_one_row_per_entry_in_order() {
        let entries = vec![
            entry("2024-01-01T00:00:00Z", 1.0, 6.0, "a", None),
            entry("2024-01-02T00:00:00Z", 2.0, 6.1, "b", None),
            entry("2024-01-03T00:00:00Z", 3.0, 6.2, "c", None),
        ];
        let csv = to_csv(&entries);
        assert_eq!(csv.lines().count(), 4);

        let rows: Vec<&str> = csv.lines().skip(1).collect();
        assert!(rows[0].starts_with("2024-01-01"));
        assert!(rows[1].starts_with("2024-01-02"));
        assert!(rows[2].starts_with("2024-01-03"));
    }

    #[test]
    fn test_suggested_filename() {
        assert_eq!(
            suggested_filename(PlantType::WaterSpinach),
            "water-spinach_monitoring_data.csv"
        );
        assert_eq!(suggested_filename(PlantType::Sage), "sage_monitoring_data.csv");
    }
}

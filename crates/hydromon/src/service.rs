//! Entry service for hydromon.
//!
//! The operations a presentation layer consumes: list, create, delete,
//! date-range filter, aggregate statistics, and CSV export. Each call is a
//! single unit of work over the entry store and the photo store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::entry::{Entry, NewEntry, PlantType};
use crate::error::{Error, Result};
use crate::export::{self, CsvExport};
use crate::photo::{PhotoPayload, PhotoStore};
use crate::storage::EntryStore;
use crate::validate;

/// Aggregate statistics for one plant, computed over all of its entries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    /// Mean electrical conductivity.
    pub avg_ec: f64,
    /// Mean pH.
    pub avg_ph: f64,
    /// Number of entries the averages were computed over.
    pub total_entries: usize,
}

/// Service coordinating the entry store and the photo store.
#[derive(Debug)]
pub struct EntryService {
    store: EntryStore,
    photos: PhotoStore,
}

impl EntryService {
    /// Create a service over the given stores.
    #[must_use]
    pub fn new(store: EntryStore, photos: PhotoStore) -> Self {
        Self { store, photos }
    }

    /// The photo store this service attaches photos through.
    #[must_use]
    pub fn photos(&self) -> &PhotoStore {
        &self.photos
    }

    /// List all entries for one plant, ascending by date.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn list(&self, plant_type: PlantType) -> Result<Vec<Entry>> {
        self.store.list(plant_type)
    }

    /// List one plant's entries within an inclusive date range.
    ///
    /// Omitting both bounds behaves identically to [`EntryService::list`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn filter(
        &self,
        plant_type: PlantType,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Entry>> {
        self.store.filter(plant_type, start, end)
    }

    /// Validate a candidate and persist it, attaching a photo if supplied.
    ///
    /// The photo is stored before the entry record; if the record insert
    /// then fails, the stored photo is removed again so no orphan is left
    /// behind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a bad candidate (nothing is
    /// persisted), [`Error::Upload`] for a rejected photo payload (the
    /// entry is not created), or a storage error.
    pub fn create(&self, candidate: &NewEntry, photo: Option<&PhotoPayload>) -> Result<Entry> {
        let mut data = validate::validate(candidate)?;

        if let Some(payload) = photo {
            data.photo_ref = Some(self.photos.save(payload)?);
        }

        let inserted = self.store.insert(&data);

        if inserted.is_err() {
            if let Some(reference) = &data.photo_ref {
                if let Err(e) = self.photos.remove(reference) {
                    warn!("Failed to clean up photo {} after insert error: {}", reference, e);
                }
            }
        }

        let entry = inserted?;
        info!(
            "Created entry {} for {} on {}",
            entry.id,
            entry.plant_type,
            entry.date.format("%Y-%m-%d")
        );
        Ok(entry)
    }

    /// Delete an entry by id, cascading to its attached photo.
    ///
    /// Photo removal is best-effort: a failure is logged and swallowed,
    /// since removing the record is the primary contract.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no entry with that id exists (also
    /// the outcome for the loser of a concurrent delete race), or a
    /// storage error.
    pub fn delete(&self, id: i64) -> Result<()> {
        let entry = self.store.get(id)?.ok_or(Error::NotFound { id })?;

        if let Some(reference) = &entry.photo_ref {
            if let Err(e) = self.photos.remove(reference) {
                warn!("Failed to delete photo {} for entry {}: {}", reference, id, e);
            }
        }

        if !self.store.delete(id)? {
            // Someone else deleted it between the get and here.
            return Err(Error::NotFound { id });
        }

        info!("Deleted entry {}", id);
        Ok(())
    }

    /// Compute aggregate statistics over all entries for one plant.
    ///
    /// A plant with zero entries yields all-zero analytics rather than an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn analytics(&self, plant_type: PlantType) -> Result<Analytics> {
        let entries = self.store.list(plant_type)?;
        let total_entries = entries.len();

        if total_entries == 0 {
            return Ok(Analytics {
                avg_ec: 0.0,
                avg_ph: 0.0,
                total_entries: 0,
            });
        }

        #[allow(clippy::cast_precision_loss)]
        let count = total_entries as f64;
        let avg_ec = entries.iter().map(|e| e.ec).sum::<f64>() / count;
        let avg_ph = entries.iter().map(|e| e.ph).sum::<f64>() / count;

        Ok(Analytics {
            avg_ec,
            avg_ph,
            total_entries,
        })
    }

    /// Export one plant's entries as CSV.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn export(&self, plant_type: PlantType) -> Result<CsvExport> {
        let entries = self.store.list(plant_type)?;
        Ok(CsvExport {
            filename: export::suggested_filename(plant_type),
            content: export::to_csv(&entries),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service(dir: &tempfile::TempDir) -> EntryService {
        let store = EntryStore::open_in_memory().expect("in-memory store");
        let photos = PhotoStore::open(dir.path().join("uploads"), crate::photo::DEFAULT_MAX_PHOTO_BYTES)
            .expect("photo store");
        EntryService::new(store, photos)
    }

    fn candidate(plant: &str, date: &str, ec: f64, ph: f64) -> NewEntry {
        NewEntry {
            plant_type: Some(plant.to_string()),
            date: Some(date.parse().expect("test date")),
            ec: Some(ec),
            ph: Some(ph),
            notes: None,
        }
    }

    fn png_payload() -> PhotoPayload {
        // A 1x1 transparent PNG.
        PhotoPayload::DataUrl(
            "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==".to_string(),
        )
    }

    #[test]
    fn test_create_then_list_contains_entry_once() {
        let dir = tempfile::tempdir().unwrap();
        let service = create_test_service(&dir);

        let mut c = candidate("water-spinach", "2024-01-01T00:00:00Z", 1.2, 6.5);
        c.notes = Some("ok".to_string());
        let created = service.create(&c, None).unwrap();

        let listed = service.list(PlantType::WaterSpinach).unwrap();
        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(created.ec, 1.2);
        assert_eq!(created.ph, 6.5);
        assert_eq!(created.notes, "ok");
    }

    #[test]
    fn test_create_rejects_invalid_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let service = create_test_service(&dir);

        let negative_ec = candidate("water-spinach", "2024-01-01T00:00:00Z", -1.0, 6.5);
        assert!(service.create(&negative_ec, None).unwrap_err().is_validation());

        let high_ph = candidate("water-spinach", "2024-01-01T00:00:00Z", 1.0, 15.0);
        assert!(service.create(&high_ph, None).unwrap_err().is_validation());

        let unknown_plant = candidate("rose", "2024-01-01T00:00:00Z", 1.0, 6.5);
        assert!(service.create(&unknown_plant, None).unwrap_err().is_validation());

        // Nothing was persisted.
        assert!(service.list(PlantType::WaterSpinach).unwrap().is_empty());
    }

    #[test]
    fn test_create_with_photo_attaches_reference() {
        let dir = tempfile::tempdir().unwrap();
        let service = create_test_service(&dir);

        let entry = service
            .create(
                &candidate("chili", "2024-01-01T00:00:00Z", 2.0, 6.0),
                Some(&png_payload()),
            )
            .unwrap();

        let reference = entry.photo_ref.expect("photo reference should be set");
        assert!(service.photos().exists(&reference));
    }

    #[test]
    fn test_create_with_rejected_photo_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let service = create_test_service(&dir);

        let payload = PhotoPayload::DataUrl("data:text/plain;base64,aGVsbG8=".to_string());
        let err = service
            .create(&candidate("chili", "2024-01-01T00:00:00Z", 2.0, 6.0), Some(&payload))
            .unwrap_err();

        assert!(err.is_upload());
        assert!(service.list(PlantType::Chili).unwrap().is_empty());
    }

    #[test]
    fn test_delete_removes_entry_and_photo() {
        let dir = tempfile::tempdir().unwrap();
        let service = create_test_service(&dir);

        let entry = service
            .create(
                &candidate("sage", "2024-01-01T00:00:00Z", 1.0, 6.0),
                Some(&png_payload()),
            )
            .unwrap();
        let reference = entry.photo_ref.clone().unwrap();

        service.delete(entry.id).unwrap();

        assert!(service.list(PlantType::Sage).unwrap().is_empty());
        assert!(!service.photos().exists(&reference));
    }

    #[test]
    fn test_delete_nonexistent_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let service = create_test_service(&dir);

        let err = service.delete(99999).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_survives_missing_photo_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = create_test_service(&dir);

        let entry = service
            .create(
                &candidate("sage", "2024-01-01T00:00:00Z", 1.0, 6.0),
                Some(&png_payload()),
            )
            .unwrap();

        // The photo file disappears out from under us; the delete of the
        // record must still succeed.
        let reference = entry.photo_ref.clone().unwrap();
        std::fs::remove_file(service.photos().root().join(&reference)).unwrap();

        service.delete(entry.id).unwrap();
        assert!(service.list(PlantType::Sage).unwrap().is_empty());
    }

    #[test]
    fn test_filter_matches_list_subset() {
        let dir = tempfile::tempdir().unwrap();
        let service = create_test_service(&dir);

        for day in ["01", "02", "03", "04", "05"] {
            service
                .create(
                    &candidate("sage", &format!("2024-01-{day}T00:00:00Z"), 1.0, 6.0),
                    None,
                )
                .unwrap();
        }

        let start: DateTime<Utc> = "2024-01-02T00:00:00Z".parse().unwrap();
        let end: DateTime<Utc> = "2024-01-04T00:00:00Z".parse().unwrap();

        let all = service.list(PlantType::Sage).unwrap();
        let expected: Vec<Entry> = all
            .into_iter()
            .filter(|e| e.date >= start && e.date <= end)
            .collect();

        let filtered = service.filter(PlantType::Sage, Some(start), Some(end)).unwrap();
        assert_eq!(filtered, expected);
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_filter_without_bounds_equals_list() {
        let dir = tempfile::tempdir().unwrap();
        let service = create_test_service(&dir);

        service
            .create(&candidate("chili", "2024-01-01T00:00:00Z", 1.0, 6.0), None)
            .unwrap();

        assert_eq!(
            service.filter(PlantType::Chili, None, None).unwrap(),
            service.list(PlantType::Chili).unwrap()
        );
    }

    #[test]
    fn test_analytics_empty_plant_is_all_zeros() {
        let dir = tempfile::tempdir().unwrap();
        let service = create_test_service(&dir);

        let analytics = service.analytics(PlantType::Sage).unwrap();
        assert_eq!(
            analytics,
            Analytics {
                avg_ec: 0.0,
                avg_ph: 0.0,
                total_entries: 0
            }
        );
    }

    #[test]
    fn test_analytics_sage_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let service = create_test_service(&dir);

        for (day, ec) in [("01", 1.0), ("02", 2.0), ("03", 3.0)] {
            service
                .create(
                    &candidate("sage", &format!("2024-01-{day}T00:00:00Z"), ec, 6.0),
                    None,
                )
                .unwrap();
        }

        let analytics = service.analytics(PlantType::Sage).unwrap();
        assert_eq!(analytics.total_entries, 3);
        assert!((analytics.avg_ec - 2.0).abs() < f64::EPSILON);
        assert!((analytics.avg_ph - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_analytics_is_unfiltered() {
        let dir = tempfile::tempdir().unwrap();
        let service = create_test_service(&dir);

        service
            .create(&candidate("sage", "2020-01-01T00:00:00Z", 4.0, 6.0), None)
            .unwrap();
        service
            .create(&candidate("sage", "2024-01-01T00:00:00Z", 2.0, 6.0), None)
            .unwrap();
        // A different plant's entries do not contribute.
        service
            .create(&candidate("chili", "2024-01-01T00:00:00Z", 100.0, 6.0), None)
            .unwrap();

        let analytics = service.analytics(PlantType::Sage).unwrap();
        assert_eq!(analytics.total_entries, 2);
        assert!((analytics.avg_ec - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_export_filename_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let service = create_test_service(&dir);

        let mut c = candidate("water-spinach", "2024-01-01T00:00:00Z", 1.2, 6.5);
        c.notes = Some("ok".to_string());
        service.create(&c, None).unwrap();

        let export = service.export(PlantType::WaterSpinach).unwrap();
        assert_eq!(export.filename, "water-spinach_monitoring_data.csv");
        assert_eq!(
            export.content,
            "Date,EC,pH,Notes,Photo Reference\n2024-01-01,1.2,6.5,\"ok\","
        );
    }

    #[test]
    fn test_export_empty_plant_is_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let service = create_test_service(&dir);

        let export = service.export(PlantType::Chili).unwrap();
        assert_eq!(export.content, crate::export::CSV_HEADER);
    }

    #[test]
    fn test_analytics_serializes_camel_case() {
        let analytics = Analytics {
            avg_ec: 2.0,
            avg_ph: 6.0,
            total_entries: 3,
        };
        let json = serde_json::to_string(&analytics).unwrap();
        assert_eq!(json, r#"{"avgEc":2.0,"avgPh":6.0,"totalEntries":3}"#);
    }
}

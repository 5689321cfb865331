//! Storage layer for hydromon.
//!
//! This module provides `SQLite`-based persistent storage for monitoring
//! entries: insertion with store-assigned ids and timestamps, per-plant
//! listing, date-range filtering, and deletion.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::entry::{Entry, EntryData, PlantType};
use crate::error::{Error, Result};

/// Columns selected for every entry query, in `row_to_entry` order.
const ENTRY_COLUMNS: &str = "id, plant_type, date, ec, ph, notes, photo_ref, created_at, updated_at";

/// Storage engine for monitoring entries.
///
/// Each operation is a single atomic `SQLite` statement; no multi-entry
/// transactions are needed since every write touches exactly one entry.
#[derive(Debug)]
pub struct EntryStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl EntryStore {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a validated entry, assigning its id and timestamps.
    ///
    /// Returns the stored entry as it now exists in the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, data: &EntryData) -> Result<Entry> {
        // Stored timestamps carry microsecond precision; truncate up front
        // so the returned entry is identical to a later re-read.
        let now = Utc::now().trunc_subsecs(6);
        let date = data.date.trunc_subsecs(6);

        self.conn.execute(
            r"
            INSERT INTO entries (plant_type, date, ec, ph, notes, photo_ref, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                data.plant_type.as_str(),
                encode_timestamp(date),
                data.ec,
                data.ph,
                data.notes,
                data.photo_ref,
                encode_timestamp(now),
                encode_timestamp(now),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted entry with id {}", id);

        Ok(Entry {
            id,
            plant_type: data.plant_type,
            date,
            ec: data.ec,
            ph: data.ph,
            notes: data.notes.clone(),
            photo_ref: data.photo_ref.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get an entry by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<Entry>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1"),
                [id],
                Self::row_to_entry,
            )
            .optional()?;
        Ok(result)
    }

    /// List all entries for one plant, ascending by observation date.
    ///
    /// Returns an empty vector when the plant has no entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self, plant_type: PlantType) -> Result<Vec<Entry>> {
        let mut stmt = self.conn.prepare(&format!(
            r"
            SELECT {ENTRY_COLUMNS} FROM entries
            WHERE plant_type = ?1
            ORDER BY date ASC, id ASC
            ",
        ))?;

        let entries = stmt
            .query_map([plant_type.as_str()], Self::row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// List one plant's entries restricted to an inclusive date range.
    ///
    /// Each bound is optional; with both omitted this is identical to
    /// [`EntryStore::list`].
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn filter(
        &self,
        plant_type: PlantType,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Entry>> {
        let mut sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE plant_type = ?1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> =
            vec![Box::new(plant_type.as_str().to_string())];

        if let Some(start) = start {
            params.push(Box::new(encode_timestamp(start)));
            sql.push_str(&format!(" AND date >= ?{}", params.len()));
        }
        if let Some(end) = end {
            params.push(Box::new(encode_timestamp(end)));
            sql.push_str(&format!(" AND date <= ?{}", params.len()));
        }
        sql.push_str(" ORDER BY date ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map(
                rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
                Self::row_to_entry,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Count entries for one plant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self, plant_type: PlantType) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE plant_type = ?1",
            [plant_type.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete an entry by id.
    ///
    /// Returns `true` if an entry was deleted, `false` if not found — a
    /// concurrent delete race resolves here, with the loser seeing `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM entries WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Convert a database row to an [`Entry`].
    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<Entry> {
        let id: i64 = row.get(0)?;
        let plant_type_str: String = row.get(1)?;
        let date_str: String = row.get(2)?;
        let ec: f64 = row.get(3)?;
        let ph: f64 = row.get(4)?;
        let notes: String = row.get(5)?;
        let photo_ref: Option<String> = row.get(6)?;
        let created_at_str: String = row.get(7)?;
        let updated_at_str: String = row.get(8)?;

        let plant_type: PlantType = plant_type_str.parse().map_err(|e: Error| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Entry {
            id,
            plant_type,
            date: decode_timestamp(2, &date_str)?,
            ec,
            ph,
            notes,
            photo_ref,
            created_at: decode_timestamp(7, &created_at_str)?,
            updated_at: decode_timestamp(8, &updated_at_str)?,
        })
    }
}

/// Encode a timestamp for storage.
///
/// Fixed-width UTC RFC 3339 with microseconds, so lexicographic order in
/// SQL matches chronological order for range filters.
fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a stored timestamp, reporting the column on failure.
fn decode_timestamp(column: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

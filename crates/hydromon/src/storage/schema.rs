//! `SQLite` schema definitions for hydromon.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the entries table.
pub const CREATE_ENTRIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    plant_type TEXT NOT NULL,
    date TEXT NOT NULL,
    ec REAL NOT NULL,
    ph REAL NOT NULL,
    notes TEXT NOT NULL DEFAULT '',
    photo_ref TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create an index on `plant_type` for per-plant listing.
pub const CREATE_PLANT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_entries_plant ON entries(plant_type)
";

/// SQL statement to create an index on `date` for range filtering.
pub const CREATE_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_ENTRIES_TABLE,
    CREATE_PLANT_INDEX,
    CREATE_DATE_INDEX,
    CREATE_METADATA_TABLE,
];

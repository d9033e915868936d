// Database module - SQLite snapshot store

pub mod models;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use tracing::{debug, info};

pub use models::{RawSnapshot, Snapshot};

/// Get the default database path (~/.networth/data.db)
pub fn get_default_db_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let networth_dir = PathBuf::from(home).join(".networth");

    std::fs::create_dir_all(&networth_dir).context("Failed to create .networth directory")?;

    Ok(networth_dir.join("data.db"))
}

/// Open database connection
pub fn open_db(db_path: Option<PathBuf>) -> Result<Connection> {
    let path = match db_path {
        Some(p) => p,
        None => get_default_db_path()?,
    };
    Connection::open(&path).context(format!("Failed to open database at {:?}", path))
}

/// Initialize the database with schema
pub fn init_database(db_path: Option<PathBuf>) -> Result<()> {
    let path = match db_path {
        Some(p) => p,
        None => get_default_db_path()?,
    };

    info!("Initializing database at: {:?}", path);

    let conn = open_db(Some(path))?;
    apply_schema(&conn)?;

    info!("Database initialized successfully");
    Ok(())
}

/// Run the schema SQL on an open connection (idempotent)
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(include_str!("schema.sql"))
        .context("Failed to execute schema")
}

/// Insert a snapshot, replacing any existing one for the same date.
///
/// Returns true when an earlier snapshot for that date was overwritten.
pub fn upsert_snapshot(conn: &Connection, snapshot: &Snapshot) -> Result<bool> {
    upsert_raw_snapshot(conn, &snapshot.to_raw())
}

/// Write a row as text exactly as given. Used by imports so values that
/// failed validation are kept as entered and flagged again on load.
pub fn upsert_raw_snapshot(conn: &Connection, raw: &RawSnapshot) -> Result<bool> {
    let existed = snapshot_exists(conn, &raw.date)?;

    conn.execute(
        "INSERT INTO snapshots (date, total_assets, net_flow, note, updated_at)
         VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)
         ON CONFLICT(date) DO UPDATE SET
            total_assets = excluded.total_assets,
            net_flow = excluded.net_flow,
            note = excluded.note,
            updated_at = CURRENT_TIMESTAMP",
        params![raw.date, raw.total_assets, raw.net_flow, raw.note],
    )
    .context(format!("Failed to save snapshot for {}", raw.date))?;

    debug!("Saved snapshot {} (replaced: {})", raw.date, existed);
    Ok(existed)
}

/// Insert many rows in one transaction; returns how many replaced an
/// existing date
pub fn upsert_raw_snapshots(conn: &mut Connection, rows: &[RawSnapshot]) -> Result<usize> {
    let tx = conn.transaction()?;
    let mut replaced = 0;
    for raw in rows {
        if upsert_raw_snapshot(&tx, raw)? {
            replaced += 1;
        }
    }
    tx.commit().context("Failed to commit snapshot import")?;
    Ok(replaced)
}

/// `date` is the stored `YYYY-MM-DD` text
pub fn snapshot_exists(conn: &Connection, date: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM snapshots WHERE date = ?1",
            params![date],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Load every stored snapshot in ascending date order, unvalidated
pub fn load_snapshots(conn: &Connection) -> Result<Vec<RawSnapshot>> {
    let mut stmt = conn.prepare(
        "SELECT date, total_assets, net_flow, note
         FROM snapshots
         ORDER BY date ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(RawSnapshot {
            date: row.get(0)?,
            total_assets: get_text_value(row, 1)?,
            net_flow: get_text_value(row, 2)?,
            note: row.get(3)?,
        })
    })?;

    let mut snapshots = Vec::new();
    for row in rows {
        snapshots.push(row.context("Failed to read snapshot row")?);
    }
    Ok(snapshots)
}

/// Delete the snapshot for a date; returns false when there was none
pub fn delete_snapshot(conn: &Connection, date: NaiveDate) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM snapshots WHERE date = ?1",
        params![date.format("%Y-%m-%d").to_string()],
    )?;
    Ok(deleted > 0)
}

pub fn count_snapshots(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))?;
    Ok(count)
}

/// Read an amount column as text whatever its storage class.
///
/// Hand-edited databases can hold INTEGER or REAL values in the amount
/// columns; validation wants the text form either way.
fn get_text_value(row: &rusqlite::Row, idx: usize) -> Result<Option<String>, rusqlite::Error> {
    use rusqlite::types::ValueRef;

    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|s| Some(s.to_string()))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            }),
        ValueRef::Integer(i) => Ok(Some(i.to_string())),
        ValueRef::Real(f) => Ok(Some(f.to_string())),
        ValueRef::Blob(_) => Ok(None),
    }
}

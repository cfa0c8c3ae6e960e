//! SQLite-backed vehicle store.
//!
//! A single connection behind `Arc<Mutex<_>>`; every call runs on the
//! blocking pool so the async runtime is never stalled on disk I/O.
//! Details are stored as a JSON document, coordinates as two columns.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::store::{StoreError, VehicleStore};
use crate::domain::{Condition, Coordinates, Details, StoredVehicle, VehicleDraft, VehicleId};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS vehicles (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    details     TEXT NOT NULL,
    condition   TEXT NOT NULL,
    lat         REAL NOT NULL,
    lon         REAL NOT NULL,
    created_at  TEXT NOT NULL,
    modified_at TEXT
);
";

const SELECT_COLUMNS: &str =
    "SELECT id, details, condition, lat, lon, created_at, modified_at FROM vehicles";

/// Raw row as read from SQLite, before decoding the text columns
type VehicleRow = (
    i64,
    String,
    String,
    f64,
    f64,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<VehicleRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn decode_row(row: VehicleRow) -> Result<StoredVehicle, StoreError> {
    let (id, details, condition, lat, lon, created_at, modified_at) = row;

    let details: Details = serde_json::from_str(&details)?;
    let condition: Condition = condition.parse().map_err(StoreError::Backend)?;

    Ok(StoredVehicle {
        id: VehicleId(id),
        details,
        condition,
        location: Coordinates::new(lat, lon),
        created_at,
        modified_at,
    })
}

fn select_one(conn: &Connection, id: VehicleId) -> Result<StoredVehicle, StoreError> {
    let row = conn
        .query_row(
            &format!("{} WHERE id = ?1", SELECT_COLUMNS),
            params![id.0],
            read_row,
        )
        .optional()?;

    match row {
        Some(row) => decode_row(row),
        None => Err(StoreError::NotFound(id)),
    }
}

/// Vehicle store persisted in a SQLite database
#[derive(Clone)]
pub struct SqliteVehicleStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteVehicleStore {
    /// Open (or create) a database file
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        info!(path = %path.display(), "Opening vehicle database");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Backend(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        debug!("Vehicle schema applied");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool
    async fn with_connection<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Backend("connection mutex poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("store task failed: {}", e)))?
    }
}

#[async_trait]
impl VehicleStore for SqliteVehicleStore {
    async fn find_all(&self) -> Result<Vec<StoredVehicle>, StoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
            let rows = stmt
                .query_map([], read_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter().map(decode_row).collect()
        })
        .await
    }

    async fn find_by_id(&self, id: VehicleId) -> Result<StoredVehicle, StoreError> {
        self.with_connection(move |conn| select_one(conn, id)).await
    }

    async fn save(&self, draft: VehicleDraft) -> Result<StoredVehicle, StoreError> {
        let details = serde_json::to_string(&draft.details)?;

        self.with_connection(move |conn| match draft.id {
            None => {
                conn.execute(
                    "INSERT INTO vehicles (details, condition, lat, lon, created_at, modified_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        details,
                        draft.condition.as_str(),
                        draft.location.lat,
                        draft.location.lon,
                        Utc::now(),
                        draft.modified_at,
                    ],
                )?;
                let id = VehicleId(conn.last_insert_rowid());
                debug!(%id, "Inserted vehicle");
                select_one(conn, id)
            }
            Some(id) => {
                let changed = conn.execute(
                    "UPDATE vehicles
                     SET details = ?1, condition = ?2, lat = ?3, lon = ?4,
                         created_at = COALESCE(?5, created_at), modified_at = ?6
                     WHERE id = ?7",
                    params![
                        details,
                        draft.condition.as_str(),
                        draft.location.lat,
                        draft.location.lon,
                        draft.created_at,
                        draft.modified_at,
                        id.0,
                    ],
                )?;
                if changed == 0 {
                    return Err(StoreError::NotFound(id));
                }
                debug!(%id, "Updated vehicle");
                select_one(conn, id)
            }
        })
        .await
    }

    async fn delete(&self, id: VehicleId) -> Result<(), StoreError> {
        self.with_connection(move |conn| {
            let changed = conn.execute("DELETE FROM vehicles WHERE id = ?1", params![id.0])?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
            debug!(%id, "Deleted vehicle");
            Ok(())
        })
        .await
    }
}

//! `SQLite`-backed store.
//!
//! Uses `switchy_database` for all database operations, following the same
//! patterns as the rest of the workspace: raw SQL with positional
//! parameters, and `moosicbox_json_utils` for column extraction.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use moosicbox_json_utils::database::ToValue as _;
use parking_spot_geography_models::Coordinate;
use parking_spot_parking_models::{OccupancyRecord, ParkingLotInfo};
use switchy_database::{Database, DatabaseValue};
use switchy_database_connection::init_sqlite_rusqlite;

use crate::{LotDefinition, ParkingStore, StoreError};

/// Default path for the parking database.
pub const DEFAULT_DB_PATH: &str = "data/parking.db";

/// Parking store persisted in a `SQLite` file.
#[derive(Clone)]
pub struct SqliteParkingStore {
    db: Arc<dyn Database>,
}

impl fmt::Debug for SqliteParkingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteParkingStore").finish_non_exhaustive()
    }
}

fn db_err(e: impl fmt::Display) -> StoreError {
    StoreError::Database(e.to_string())
}

impl SqliteParkingStore {
    /// Opens (or creates) the database at `path` and ensures the schema
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or schema
    /// creation fails.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = init_sqlite_rusqlite(Some(path)).map_err(db_err)?;
        let store = Self { db: Arc::from(db) };
        store.ensure_schema().await?;

        log::info!("Opened parking database at {}", path.display());
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.db
            .exec_raw(
                "CREATE TABLE IF NOT EXISTS parking_lots (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    loc         TEXT NOT NULL UNIQUE,
                    name        TEXT NOT NULL,
                    volume      INTEGER NOT NULL,
                    updated_at  TEXT NOT NULL
                )",
            )
            .await
            .map_err(db_err)?;

        self.db
            .exec_raw(
                "CREATE TABLE IF NOT EXISTS parking_data (
                    id           INTEGER PRIMARY KEY AUTOINCREMENT,
                    loc          TEXT NOT NULL,
                    num          INTEGER NOT NULL,
                    recorded_at  TEXT NOT NULL
                )",
            )
            .await
            .map_err(db_err)?;

        self.db
            .exec_raw(
                "CREATE INDEX IF NOT EXISTS idx_parking_data_loc
                 ON parking_data (loc, id)",
            )
            .await
            .map_err(db_err)?;

        Ok(())
    }

    /// Inserts a lot, or updates name and capacity if its location is
    /// already known.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the lot is invalid or the write fails.
    pub async fn upsert_lot(&self, lot: &LotDefinition) -> Result<(), StoreError> {
        lot.validate()?;
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .exec_raw_params(
                "INSERT INTO parking_lots (loc, name, volume, updated_at)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (loc) DO UPDATE SET
                   name = excluded.name,
                   volume = excluded.volume,
                   updated_at = excluded.updated_at",
                &[
                    DatabaseValue::String(lot.loc.clone()),
                    DatabaseValue::String(lot.name.clone()),
                    DatabaseValue::Int64(i64::from(lot.capacity)),
                    DatabaseValue::String(now),
                ],
            )
            .await
            .map_err(db_err)?;

        Ok(())
    }

    /// Upserts every lot in `lots`, returning how many were written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on the first lot that fails.
    pub async fn import_lots(&self, lots: &[LotDefinition]) -> Result<usize, StoreError> {
        for lot in lots {
            self.upsert_lot(lot).await?;
        }
        log::info!("Imported {} parking lots", lots.len());
        Ok(lots.len())
    }

    /// Appends a vehicle count for the lot at `loc`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if `loc` is not a coordinate or the write
    /// fails.
    pub async fn record_occupancy(&self, loc: &str, num: u32) -> Result<(), StoreError> {
        Coordinate::parse(loc).map_err(|e| StoreError::Conversion {
            message: e.to_string(),
        })?;

        self.db
            .exec_raw_params(
                "INSERT INTO parking_data (loc, num, recorded_at) VALUES ($1, $2, $3)",
                &[
                    DatabaseValue::String(loc.to_string()),
                    DatabaseValue::Int64(i64::from(num)),
                    DatabaseValue::String(chrono::Utc::now().to_rfc3339()),
                ],
            )
            .await
            .map_err(db_err)?;

        log::debug!("Recorded occupancy {num} for {loc}");
        Ok(())
    }
}

fn to_u32(value: i64, column: &str) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Conversion {
        message: format!("{column} out of range: {value}"),
    })
}

#[async_trait]
impl ParkingStore for SqliteParkingStore {
    async fn get_all_parking_info(&self) -> Result<Vec<ParkingLotInfo>, StoreError> {
        let rows = self
            .db
            .query_raw_params("SELECT name, loc FROM parking_lots ORDER BY id", &[])
            .await
            .map_err(db_err)?;

        rows.iter()
            .map(|row| {
                Ok(ParkingLotInfo {
                    name: row.to_value("name").unwrap_or_default(),
                    loc: row.to_value("loc").map_err(|e| StoreError::Conversion {
                        message: format!("Failed to parse lot loc: {e}"),
                    })?,
                })
            })
            .collect()
    }

    async fn get_parking_volume(&self, loc: &str) -> Result<Option<u32>, StoreError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT volume FROM parking_lots WHERE loc = $1",
                &[DatabaseValue::String(loc.to_string())],
            )
            .await
            .map_err(db_err)?;

        rows.first()
            .map(|row| {
                let volume: i64 = row.to_value("volume").map_err(|e| StoreError::Conversion {
                    message: format!("Failed to parse lot volume: {e}"),
                })?;
                to_u32(volume, "volume")
            })
            .transpose()
    }

    async fn get_parking_data(&self, loc: &str) -> Result<Vec<OccupancyRecord>, StoreError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT num FROM parking_data WHERE loc = $1 ORDER BY id DESC",
                &[DatabaseValue::String(loc.to_string())],
            )
            .await
            .map_err(db_err)?;

        rows.iter()
            .map(|row| {
                let num: i64 = row.to_value("num").map_err(|e| StoreError::Conversion {
                    message: format!("Failed to parse occupancy count: {e}"),
                })?;
                Ok(OccupancyRecord {
                    num: to_u32(num, "num")?,
                })
            })
            .collect()
    }
}

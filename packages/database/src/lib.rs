#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Parking lot and occupancy storage.
//!
//! The service reads lots and counts through the [`ParkingStore`] trait.
//! [`sqlite::SqliteParkingStore`] is the production backend (via
//! `switchy_database`); [`memory::MemoryParkingStore`] holds fixed data for
//! tests and demos.
//!
//! Lots are keyed by their raw `"lat,long"` location string, the same
//! string clients send to the density endpoint.

pub mod memory;
pub mod sqlite;

use std::path::Path;

use async_trait::async_trait;
use parking_spot_geography_models::Coordinate;
use parking_spot_parking_models::{OccupancyRecord, ParkingLotInfo};
use serde::Deserialize;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database query or command failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Read access to parking lots and their occupancy counts.
#[async_trait]
pub trait ParkingStore: Send + Sync {
    /// Lists every known lot in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    async fn get_all_parking_info(&self) -> Result<Vec<ParkingLotInfo>, StoreError>;

    /// Capacity of the lot at `loc`, or `None` for an unknown lot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    async fn get_parking_volume(&self, loc: &str) -> Result<Option<u32>, StoreError>;

    /// Occupancy counts recorded for the lot at `loc`, newest first. Empty
    /// when nothing has been recorded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    async fn get_parking_data(&self, loc: &str) -> Result<Vec<OccupancyRecord>, StoreError>;
}

/// A lot as supplied in an import file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LotDefinition {
    /// Display name.
    pub name: String,
    /// `"lat,long"` location.
    pub loc: String,
    /// Number of spaces.
    pub capacity: u32,
}

impl LotDefinition {
    /// Checks that the location parses and capacity is positive.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conversion`] describing the first problem.
    pub fn validate(&self) -> Result<(), StoreError> {
        Coordinate::parse(&self.loc).map_err(|e| StoreError::Conversion {
            message: format!("lot {:?}: {e}", self.name),
        })?;
        if self.capacity == 0 {
            return Err(StoreError::Conversion {
                message: format!("lot {:?}: capacity must be positive", self.name),
            });
        }
        Ok(())
    }
}

/// Reads and validates a JSON array of [`LotDefinition`]s.
///
/// # Errors
///
/// Returns [`StoreError`] if the file can't be read, isn't valid JSON, or
/// any lot fails [`LotDefinition::validate`].
pub fn read_lot_definitions(path: &Path) -> Result<Vec<LotDefinition>, StoreError> {
    let contents = std::fs::read_to_string(path)?;
    let lots: Vec<LotDefinition> = serde_json::from_str(&contents)?;
    for lot in &lots {
        lot.validate()?;
    }
    Ok(lots)
}

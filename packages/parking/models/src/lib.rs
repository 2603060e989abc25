#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parking lot and occupancy types.
//!
//! Lots and occupancy counts are owned by the store; the service only reads
//! them. Lot locations stay as the raw `"lat,long"` strings the store holds
//! because that string doubles as the lot's lookup key.

use parking_spot_geography_models::Coordinate;
use serde::{Deserialize, Serialize};

/// A parking lot as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingLotInfo {
    /// Display name.
    pub name: String,
    /// Raw `"lat,long"` location, also the lot's key in the store.
    pub loc: String,
}

/// One occupancy count row recorded for a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyRecord {
    /// Number of vehicles counted.
    pub num: u32,
}

/// Current count against capacity for a single lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyReading {
    /// Vehicles currently parked.
    pub current_count: u32,
    /// Total spaces in the lot.
    pub capacity: u32,
}

impl OccupancyReading {
    /// `current_count / capacity`, or `None` when capacity is zero.
    #[must_use]
    pub fn ratio(&self) -> Option<f64> {
        (self.capacity > 0).then(|| f64::from(self.current_count) / f64::from(self.capacity))
    }
}

/// A named place users can search for parking around.
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    /// Name clients pass as the search target.
    pub name: String,
    /// Where the destination is.
    pub coordinate: Coordinate,
}

/// A lot close to the requested destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearParkingLot {
    /// Lot display name.
    pub name: String,
    /// Raw lot location string as stored.
    pub loc: String,
    /// Distance from the user to the lot, in whole meters.
    pub distance: u64,
}

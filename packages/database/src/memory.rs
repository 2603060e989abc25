//! Fixed in-memory store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_spot_parking_models::{OccupancyRecord, ParkingLotInfo};

use crate::{LotDefinition, ParkingStore, StoreError};

/// A store whose contents are set up front and never change.
#[derive(Debug, Clone, Default)]
pub struct MemoryParkingStore {
    lots: Vec<ParkingLotInfo>,
    volumes: BTreeMap<String, u32>,
    /// loc -> counts, oldest first
    readings: BTreeMap<String, Vec<u32>>,
}

impl MemoryParkingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a lot. A lot with the same location replaces the earlier one
    /// in place.
    #[must_use]
    pub fn with_lot(mut self, lot: &LotDefinition) -> Self {
        let info = ParkingLotInfo {
            name: lot.name.clone(),
            loc: lot.loc.clone(),
        };
        match self.lots.iter_mut().find(|l| l.loc == lot.loc) {
            Some(existing) => *existing = info,
            None => self.lots.push(info),
        }
        self.volumes.insert(lot.loc.clone(), lot.capacity);
        self
    }

    /// Records a vehicle count for the lot at `loc`.
    #[must_use]
    pub fn with_reading(mut self, loc: &str, num: u32) -> Self {
        self.readings.entry(loc.to_string()).or_default().push(num);
        self
    }
}

#[async_trait]
impl ParkingStore for MemoryParkingStore {
    async fn get_all_parking_info(&self) -> Result<Vec<ParkingLotInfo>, StoreError> {
        Ok(self.lots.clone())
    }

    async fn get_parking_volume(&self, loc: &str) -> Result<Option<u32>, StoreError> {
        Ok(self.volumes.get(loc).copied())
    }

    async fn get_parking_data(&self, loc: &str) -> Result<Vec<OccupancyRecord>, StoreError> {
        Ok(self
            .readings
            .get(loc)
            .map(|counts| {
                counts
                    .iter()
                    .rev()
                    .map(|&num| OccupancyRecord { num })
                    .collect()
            })
            .unwrap_or_default())
    }
}

//! Picks the lots serving a destination and reports how far the user is
//! from each.
//!
//! Two reference points are involved: a lot is kept when it is close to the
//! *destination*, and the reported distance is measured from the *user*.

use parking_spot_geography::distance;
use parking_spot_geography_models::{Coordinate, DistanceUnit};
use parking_spot_parking_models::{Destination, NearParkingLot, ParkingLotInfo};

use crate::registry::DestinationRegistry;

/// Default lot-to-destination cut-off, in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 2.0;

/// Tunables for the near-destination search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Lots at or beyond this many kilometers from the destination are
    /// dropped.
    pub radius_km: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
        }
    }
}

/// Resolves `target` in `registry` and searches around it.
///
/// An unknown target yields an empty list rather than an error.
#[must_use]
pub fn search(
    registry: &DestinationRegistry,
    user: &Coordinate,
    target: &str,
    lots: &[ParkingLotInfo],
    options: SearchOptions,
) -> Vec<NearParkingLot> {
    let Some(destination) = registry.resolve(target) else {
        log::debug!("Unknown destination {target:?}, returning no lots");
        return Vec::new();
    };

    near_destination(user, destination, lots, options)
}

/// Returns the lots within `options.radius_km` of `destination`, in input
/// order, each annotated with its distance from `user` in whole meters.
///
/// Lots whose stored location is not a valid coordinate are skipped.
#[must_use]
pub fn near_destination(
    user: &Coordinate,
    destination: &Destination,
    lots: &[ParkingLotInfo],
    options: SearchOptions,
) -> Vec<NearParkingLot> {
    lots.iter()
        .filter_map(|lot| {
            let lot_coordinate = match Coordinate::parse(&lot.loc) {
                Ok(c) => c,
                Err(e) => {
                    log::warn!("Skipping lot {:?} with bad location: {e}", lot.name);
                    return None;
                }
            };

            let from_destination = distance(
                &destination.coordinate,
                &lot_coordinate,
                DistanceUnit::Kilometers,
            );
            if from_destination >= options.radius_km {
                return None;
            }

            let from_user = distance(user, &lot_coordinate, DistanceUnit::Meters);

            Some(NearParkingLot {
                name: lot.name.clone(),
                loc: lot.loc.clone(),
                distance: whole_meters(from_user),
            })
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_meters(meters: f64) -> u64 {
    meters.round() as u64
}

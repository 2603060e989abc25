#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Great-circle distance between coordinates.
//!
//! Uses `geo`'s haversine measure on a spherical Earth with the mean
//! radius. Accurate to well under a percent at the city scale the parking
//! search operates on.

use geo::{Distance as _, Haversine, Point};
use parking_spot_geography_models::{Coordinate, DistanceUnit};

/// Mean Earth radius in kilometers, as used by [`Haversine`].
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine distance between `a` and `b`, expressed in `unit`.
///
/// The result is always finite and non-negative because [`Coordinate`]
/// can only hold in-range degrees.
#[must_use]
pub fn distance(a: &Coordinate, b: &Coordinate, unit: DistanceUnit) -> f64 {
    let meters = Haversine.distance(to_point(a), to_point(b));
    meters / 1000.0 * unit.per_kilometer()
}

fn to_point(coordinate: &Coordinate) -> Point<f64> {
    Point::new(coordinate.longitude(), coordinate.latitude())
}

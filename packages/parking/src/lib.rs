#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Near-destination parking search.
//!
//! Resolves a named destination through the [`registry::DestinationRegistry`]
//! and picks the lots that serve it with [`search::near_destination`].

pub mod registry;
pub mod search;

use thiserror::Error;

/// Errors from loading destination definitions.
#[derive(Debug, Error)]
pub enum ParkingError {
    /// I/O error reading a destinations file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Destinations TOML is malformed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A destination entry has invalid coordinates.
    #[error("Invalid destination {name:?}: {source}")]
    InvalidDestination {
        /// Destination name.
        name: String,
        /// Why its coordinates were rejected.
        source: parking_spot_geography_models::CoordinateError,
    },

    /// Two entries share the same name.
    #[error("Duplicate destination {0:?}")]
    DuplicateDestination(String),
}

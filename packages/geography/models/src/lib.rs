#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate types shared by the parking spot service.
//!
//! Clients send positions as `"lat,long"` strings. [`Coordinate::parse`]
//! is the only way to turn one of those strings into a [`Coordinate`], so
//! any coordinate flowing through the service has finite components within
//! the valid latitude/longitude ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing a `"lat,long"` string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    /// The input is not exactly two comma-separated finite numbers.
    #[error("Invalid coordinate format: {input:?}")]
    InvalidFormat {
        /// The raw input that failed to parse.
        input: String,
    },

    /// The numbers parsed but fall outside the valid degree ranges.
    #[error("Coordinate out of range: latitude {latitude}, longitude {longitude}")]
    OutOfRange {
        /// Parsed latitude.
        latitude: String,
        /// Parsed longitude.
        longitude: String,
    },
}

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate from already-numeric components.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::InvalidFormat`] if either component is not
    /// finite, or [`CoordinateError::OutOfRange`] if latitude is outside
    /// `[-90, 90]` or longitude is outside `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::InvalidFormat {
                input: format!("{latitude},{longitude}"),
            });
        }

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::OutOfRange {
                latitude: latitude.to_string(),
                longitude: longitude.to_string(),
            });
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parses a `"lat,long"` string. Whitespace around each token is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::InvalidFormat`] when the input does not
    /// split into exactly two numeric tokens, and
    /// [`CoordinateError::OutOfRange`] when the numbers are not valid
    /// degrees.
    pub fn parse(raw: &str) -> Result<Self, CoordinateError> {
        let invalid = || CoordinateError::InvalidFormat {
            input: raw.to_string(),
        };

        let mut tokens = raw.split(',');
        let (Some(lat), Some(lng), None) = (tokens.next(), tokens.next(), tokens.next()) else {
            return Err(invalid());
        };

        let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = lng.trim().parse().map_err(|_| invalid())?;

        // `f64::from_str` accepts "NaN" and "inf"
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(invalid());
        }

        Self::new(latitude, longitude)
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Unit in which a great-circle distance is reported.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DistanceUnit {
    /// Kilometers.
    #[default]
    Kilometers,
    /// Meters.
    Meters,
}

impl DistanceUnit {
    /// Number of this unit in one kilometer.
    #[must_use]
    pub const fn per_kilometer(self) -> f64 {
        match self {
            Self::Kilometers => 1.0,
            Self::Meters => 1000.0,
        }
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Occupancy classification for a single parking lot.
//!
//! A lot's occupancy ratio (`count / capacity`) is mapped to a [`Band`],
//! and a randomized guess at the band five minutes from now is drawn
//! alongside it. Bands are rendered to clients as opaque color tokens from
//! a [`Palette`].
//!
//! | Ratio            | Band   | After five minutes                          |
//! |------------------|--------|---------------------------------------------|
//! | `> 0.8`          | Red    | Yellow if draw > 0.65, else Red             |
//! | `(0.5, 0.8]`     | Yellow | Yellow if draw > 0.65, else Green/Red 50:50 |
//! | `<= 0.5`         | Red    | Green if draw > 0.65, else Red              |
//!
//! The low band is reported as Red to stay compatible with existing
//! clients; [`LowBandPolicy::Green`] reports it as Green instead.
//!
//! Randomness comes through the [`Draw`] trait so callers decide the
//! source (thread RNG in the server, scripted values in tests).

use parking_spot_parking_models::OccupancyReading;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ratio above which a lot is considered nearly full.
pub const HIGH_THRESHOLD: f64 = 0.8;

/// Ratio above which a lot is considered half full.
pub const MID_THRESHOLD: f64 = 0.5;

/// A primary draw above this keeps (or lifts) the predicted band.
pub const STAY_THRESHOLD: f64 = 0.65;

/// Second draw at or above this predicts Green for a Yellow lot.
pub const SPLIT_THRESHOLD: f64 = 0.5;

/// Errors from occupancy classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OccupancyError {
    /// The lot has zero capacity, so its ratio is undefined.
    #[error("Occupancy ratio undefined: capacity is zero (count {current_count})")]
    DivisionUndefined {
        /// The count that could not be divided.
        current_count: u32,
    },
}

/// Discrete occupancy severity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Band {
    /// Nearly full.
    Red,
    /// About half full.
    Yellow,
    /// Plenty of space.
    Green,
}

/// How the low-occupancy band (ratio <= 0.5) is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LowBandPolicy {
    /// Report it as [`Band::Red`], matching clients built against the
    /// first release of the service.
    #[default]
    Legacy,
    /// Report it as [`Band::Green`].
    Green,
}

/// Source of uniform random values in `[0, 1)`.
pub trait Draw {
    /// Returns the next value in `[0, 1)`.
    fn draw(&mut self) -> f64;
}

/// Adapts any [`rand::Rng`] into a [`Draw`].
#[derive(Debug)]
pub struct RngDraw<R>(pub R);

impl<R: Rng> Draw for RngDraw<R> {
    fn draw(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }
}

/// Display tokens for each band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Token for [`Band::Red`].
    pub red: String,
    /// Token for [`Band::Yellow`].
    pub yellow: String,
    /// Token for [`Band::Green`].
    pub green: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            red: "#E74C3C".to_string(),
            yellow: "#F1C40F".to_string(),
            green: "#2ECC71".to_string(),
        }
    }
}

impl Palette {
    /// The token for `band`.
    #[must_use]
    pub fn color(&self, band: Band) -> &str {
        match band {
            Band::Red => &self.red,
            Band::Yellow => &self.yellow,
            Band::Green => &self.green,
        }
    }
}

/// Current band and predicted band five minutes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Band for the current ratio.
    pub current: Band,
    /// Randomized guess five minutes from now.
    pub after_five_minutes: Band,
}

/// Color signal sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DensitySignal {
    /// Color for the current occupancy.
    pub color: String,
    /// Color predicted five minutes from now.
    pub color_after_five_minutes: String,
}

/// Maps occupancy readings to color signals.
#[derive(Debug, Clone, Default)]
pub struct OccupancyClassifier {
    palette: Palette,
    low_band: LowBandPolicy,
}

impl OccupancyClassifier {
    /// Creates a classifier with the given palette and low-band policy.
    #[must_use]
    pub const fn new(palette: Palette, low_band: LowBandPolicy) -> Self {
        Self { palette, low_band }
    }

    /// The palette used to render bands.
    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Classifies `reading` into current and predicted bands.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::DivisionUndefined`] when capacity is zero.
    pub fn classify(
        &self,
        reading: OccupancyReading,
        draw: &mut impl Draw,
    ) -> Result<Classification, OccupancyError> {
        let ratio = reading.ratio().ok_or(OccupancyError::DivisionUndefined {
            current_count: reading.current_count,
        })?;

        Ok(self.classify_ratio(ratio, draw))
    }

    /// Classifies `reading` and renders it with the palette.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::DivisionUndefined`] when capacity is zero.
    pub fn signal(
        &self,
        reading: OccupancyReading,
        draw: &mut impl Draw,
    ) -> Result<DensitySignal, OccupancyError> {
        let classification = self.classify(reading, draw)?;
        Ok(DensitySignal {
            color: self.palette.color(classification.current).to_string(),
            color_after_five_minutes: self
                .palette
                .color(classification.after_five_minutes)
                .to_string(),
        })
    }

    /// Classifies a raw occupancy ratio.
    #[must_use]
    pub fn classify_ratio(&self, ratio: f64, draw: &mut impl Draw) -> Classification {
        if ratio > HIGH_THRESHOLD {
            let after = if draw.draw() > STAY_THRESHOLD {
                Band::Yellow
            } else {
                Band::Red
            };
            Classification {
                current: Band::Red,
                after_five_minutes: after,
            }
        } else if ratio > MID_THRESHOLD {
            let after = if draw.draw() > STAY_THRESHOLD {
                Band::Yellow
            } else if draw.draw() >= SPLIT_THRESHOLD {
                Band::Green
            } else {
                Band::Red
            };
            Classification {
                current: Band::Yellow,
                after_five_minutes: after,
            }
        } else {
            let after = if draw.draw() > STAY_THRESHOLD {
                Band::Green
            } else {
                Band::Red
            };
            let current = match self.low_band {
                LowBandPolicy::Green => Band::Green,
                LowBandPolicy::Legacy => Band::Red,
            };
            Classification {
                current,
                after_five_minutes: after,
            }
        }
    }
}

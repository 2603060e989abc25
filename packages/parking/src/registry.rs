//! Destination registry: the named places a search can target.
//!
//! A default table is baked into the binary via [`include_str!`]. Operators
//! can replace it with their own TOML file so adding a destination never
//! needs a rebuild.

use std::collections::BTreeMap;
use std::path::Path;

use parking_spot_geography_models::Coordinate;
use parking_spot_parking_models::Destination;
use serde::Deserialize;

use crate::ParkingError;

/// Default destinations embedded at compile time.
const DEFAULT_DESTINATIONS_TOML: &str = include_str!("../destinations/default.toml");

#[derive(Debug, Deserialize)]
struct DestinationsFile {
    #[serde(default)]
    destinations: Vec<DestinationDef>,
}

#[derive(Debug, Deserialize)]
struct DestinationDef {
    name: String,
    lat: f64,
    lng: f64,
}

/// Lookup table from destination name to its coordinate.
#[derive(Debug, Clone, Default)]
pub struct DestinationRegistry {
    destinations: BTreeMap<String, Destination>,
}

impl DestinationRegistry {
    /// Returns the embedded default registry.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (a compile-time guarantee
    /// since the file ships with the crate).
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml(DEFAULT_DESTINATIONS_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse default destinations: {e}"))
    }

    /// Loads a registry from a TOML file with `[[destinations]]` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ParkingError`] if the file can't be read or any entry is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ParkingError> {
        let contents = std::fs::read_to_string(path)?;
        let registry = Self::from_toml(&contents)?;
        log::info!(
            "Loaded {} destinations from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Parses a registry from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ParkingError`] on malformed TOML, out-of-range coordinates,
    /// or duplicate names.
    pub fn from_toml(contents: &str) -> Result<Self, ParkingError> {
        let file: DestinationsFile = toml::from_str(contents)?;
        let destinations = file
            .destinations
            .into_iter()
            .map(|def| {
                Coordinate::new(def.lat, def.lng)
                    .map(|coordinate| Destination {
                        name: def.name.clone(),
                        coordinate,
                    })
                    .map_err(|source| ParkingError::InvalidDestination {
                        name: def.name,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_destinations(destinations)
    }

    /// Builds a registry from already-validated destinations.
    ///
    /// # Errors
    ///
    /// Returns [`ParkingError::DuplicateDestination`] if two share a name.
    pub fn from_destinations(
        destinations: impl IntoIterator<Item = Destination>,
    ) -> Result<Self, ParkingError> {
        let mut map = BTreeMap::new();
        for destination in destinations {
            if map.contains_key(&destination.name) {
                return Err(ParkingError::DuplicateDestination(destination.name));
            }
            map.insert(destination.name.clone(), destination);
        }
        Ok(Self { destinations: map })
    }

    /// Looks up a destination by exact name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Destination> {
        self.destinations.get(name)
    }

    /// Number of known destinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    /// Whether the registry has no destinations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Known destination names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.destinations.keys().map(String::as_str)
    }
}

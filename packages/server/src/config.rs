//! Server configuration read from the environment at start-up.

use std::path::PathBuf;

use parking_spot_auth::keys::{DEFAULT_SECRET_PATH, DEFAULT_SIGNING_KEY_PATH};
use parking_spot_database::sqlite::DEFAULT_DB_PATH;
use parking_spot_parking::search::DEFAULT_RADIUS_KM;

/// Everything needed to start the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// `SQLite` store location (`PARKING_DB_PATH`).
    pub db_path: PathBuf,
    /// Signing key file (`PARKING_SIGNING_KEY_PATH`).
    pub signing_key_path: PathBuf,
    /// Shared secret file (`PARKING_SECRET_PATH`).
    pub secret_path: PathBuf,
    /// Optional destinations TOML replacing the embedded table
    /// (`PARKING_DESTINATIONS_PATH`).
    pub destinations_path: Option<PathBuf>,
    /// Lot-to-destination cut-off in km (`PARKING_SEARCH_RADIUS_KM`).
    pub search_radius_km: f64,
    /// Report low occupancy as green instead of red
    /// (`PARKING_FIX_LOW_BAND`).
    pub fix_low_band: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            signing_key_path: PathBuf::from(DEFAULT_SIGNING_KEY_PATH),
            secret_path: PathBuf::from(DEFAULT_SECRET_PATH),
            destinations_path: None,
            search_radius_km: DEFAULT_RADIUS_KM,
            fix_low_band: false,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables,
    /// falling back to defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|p| {
                p.parse()
                    .inspect_err(|e| log::warn!("Ignoring PORT={p:?}: {e}"))
                    .ok()
            })
            .unwrap_or(defaults.port);

        let search_radius_km = lookup("PARKING_SEARCH_RADIUS_KM")
            .and_then(|r| match r.parse::<f64>() {
                Ok(v) if v.is_finite() && v > 0.0 => Some(v),
                _ => {
                    log::warn!("Ignoring PARKING_SEARCH_RADIUS_KM={r:?}");
                    None
                }
            })
            .unwrap_or(defaults.search_radius_km);

        let fix_low_band = lookup("PARKING_FIX_LOW_BAND")
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port,
            db_path: lookup("PARKING_DB_PATH").map_or(defaults.db_path, PathBuf::from),
            signing_key_path: lookup("PARKING_SIGNING_KEY_PATH")
                .map_or(defaults.signing_key_path, PathBuf::from),
            secret_path: lookup("PARKING_SECRET_PATH").map_or(defaults.secret_path, PathBuf::from),
            destinations_path: lookup("PARKING_DESTINATIONS_PATH").map(PathBuf::from),
            search_radius_km,
            fix_low_band,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let map: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config(&[]), ServerConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let c = config(&[
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "9000"),
            ("PARKING_DB_PATH", "/tmp/p.db"),
            ("PARKING_SIGNING_KEY_PATH", "/keys/token"),
            ("PARKING_SECRET_PATH", "/keys/secret"),
            ("PARKING_DESTINATIONS_PATH", "/etc/dest.toml"),
            ("PARKING_SEARCH_RADIUS_KM", "3.5"),
            ("PARKING_FIX_LOW_BAND", "true"),
        ]);
        assert_eq!(c.bind_addr, "0.0.0.0");
        assert_eq!(c.port, 9000);
        assert_eq!(c.db_path, PathBuf::from("/tmp/p.db"));
        assert_eq!(c.signing_key_path, PathBuf::from("/keys/token"));
        assert_eq!(c.secret_path, PathBuf::from("/keys/secret"));
        assert_eq!(c.destinations_path, Some(PathBuf::from("/etc/dest.toml")));
        assert!((c.search_radius_km - 3.5).abs() < f64::EPSILON);
        assert!(c.fix_low_band);
    }

    #[test]
    fn bad_numbers_fall_back_to_defaults() {
        let c = config(&[
            ("PORT", "eighty"),
            ("PARKING_SEARCH_RADIUS_KM", "-1"),
            ("PARKING_FIX_LOW_BAND", "nope"),
        ]);
        assert_eq!(c.port, 8080);
        assert!((c.search_radius_km - DEFAULT_RADIUS_KM).abs() < f64::EPSILON);
        assert!(!c.fix_low_band);
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the parking spot service.
//!
//! Serves two bearer-protected JSON endpoints: a near-destination parking
//! search and a per-lot crowding color. Both run through the request
//! pipeline in [`pipeline`], which authenticates, validates, executes, and
//! answers with a single response envelope. Lots and occupancy counts come
//! from a `SQLite` store at `data/parking.db` by default.

pub mod config;
pub mod error;
mod handlers;
mod pipeline;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use parking_spot_auth::{KeyMaterial, TokenService};
use parking_spot_database::ParkingStore;
use parking_spot_database::sqlite::SqliteParkingStore;
use parking_spot_occupancy::{LowBandPolicy, OccupancyClassifier, Palette};
use parking_spot_parking::registry::DestinationRegistry;
use parking_spot_parking::search::SearchOptions;

pub use config::ServerConfig;

/// Shared application state. Built once at start-up and never mutated.
pub struct AppState {
    /// Parking lot and occupancy store.
    pub store: Arc<dyn ParkingStore>,
    /// Bearer token verification.
    pub tokens: Arc<TokenService>,
    /// Named search destinations.
    pub destinations: Arc<DestinationRegistry>,
    /// Occupancy color classifier.
    pub classifier: OccupancyClassifier,
    /// Near-destination search tunables.
    pub search: SearchOptions,
}

impl AppState {
    /// Loads key material, destinations, and the store described by
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns an `std::io::Error` if any of them fail to load.
    pub async fn from_config(config: &ServerConfig) -> std::io::Result<Self> {
        log::info!("Loading key material...");
        let keys = KeyMaterial::load(&config.signing_key_path, &config.secret_path)
            .map_err(std::io::Error::other)?;

        let destinations = match &config.destinations_path {
            Some(path) => DestinationRegistry::load(path).map_err(std::io::Error::other)?,
            None => DestinationRegistry::embedded(),
        };
        log::info!("{} search destinations available", destinations.len());

        log::info!("Opening parking store...");
        let store = SqliteParkingStore::open(&config.db_path)
            .await
            .map_err(std::io::Error::other)?;

        let low_band = if config.fix_low_band {
            LowBandPolicy::Green
        } else {
            LowBandPolicy::Legacy
        };

        Ok(Self {
            store: Arc::new(store),
            tokens: Arc::new(TokenService::new(&keys)),
            destinations: Arc::new(destinations),
            classifier: OccupancyClassifier::new(Palette::default(), low_band),
            search: SearchOptions {
                radius_km: config.search_radius_km,
            },
        })
    }
}

/// Registers all routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .route(
            "/get_near_parking_location",
            web::post().to(handlers::get_near_parking_location),
        )
        .route(
            "/get_parking_space_density",
            web::post().to(handlers::get_parking_space_density),
        );
}

/// Starts the parking spot API server.
///
/// The caller is responsible for initializing logging and providing the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Error` if start-up state fails to load, or the
/// HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let state = web::Data::new(AppState::from_config(&config).await?);

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use actix_web::{http::header, test};
    use async_trait::async_trait;
    use parking_spot_database::memory::MemoryParkingStore;
    use parking_spot_database::{LotDefinition, StoreError};
    use parking_spot_parking_models::{OccupancyRecord, ParkingLotInfo};
    use parking_spot_server_models::{ResponseEnvelope, ResponseStatus};
    use serde_json::{Map, json};

    use super::*;
    use crate::error::INTERNAL_MESSAGE;

    const USER_LOC: &str = "25.024773,121.527724";
    const NEAR_LOT: &str = "25.0262,121.5276";
    const FAR_LOT: &str = "25.033964,121.564472";
    const EMPTY_LOT: &str = "25.0255,121.5290";

    fn keys() -> KeyMaterial {
        KeyMaterial::new("test-signing-key", "test-secret").unwrap()
    }

    fn lot(name: &str, loc: &str, capacity: u32) -> LotDefinition {
        LotDefinition {
            name: name.to_string(),
            loc: loc.to_string(),
            capacity,
        }
    }

    fn fixture_store() -> MemoryParkingStore {
        MemoryParkingStore::new()
            .with_lot(&lot("Shida Lot", NEAR_LOT, 100))
            .with_lot(&lot("Xinyi Lot", FAR_LOT, 100))
            .with_lot(&lot("Quiet Lot", EMPTY_LOT, 50))
            .with_reading(NEAR_LOT, 10)
            .with_reading(NEAR_LOT, 95)
    }

    fn state_with(store: Arc<dyn ParkingStore>, classifier: OccupancyClassifier) -> AppState {
        AppState {
            store,
            tokens: Arc::new(TokenService::new(&keys())),
            destinations: Arc::new(DestinationRegistry::embedded()),
            classifier,
            search: SearchOptions::default(),
        }
    }

    fn state() -> AppState {
        state_with(Arc::new(fixture_store()), OccupancyClassifier::default())
    }

    fn bearer() -> String {
        let token = TokenService::new(&keys()).issue(Map::new()).unwrap();
        format!("Bearer {token}")
    }

    async fn post(
        state: AppState,
        path: &str,
        auth: Option<&str>,
        body: &str,
    ) -> ResponseEnvelope {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let mut req = test::TestRequest::post()
            .uri(path)
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload(body.to_string());
        if let Some(auth) = auth {
            req = req.insert_header((header::AUTHORIZATION, auth.to_string()));
        }

        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), 200, "transport status is always 200");
        test::read_body_json(resp).await
    }

    struct FailingStore;

    #[async_trait]
    impl ParkingStore for FailingStore {
        async fn get_all_parking_info(&self) -> Result<Vec<ParkingLotInfo>, StoreError> {
            Err(StoreError::Database("connection reset".to_string()))
        }

        async fn get_parking_volume(&self, _loc: &str) -> Result<Option<u32>, StoreError> {
            Err(StoreError::Database("connection reset".to_string()))
        }

        async fn get_parking_data(
            &self,
            _loc: &str,
        ) -> Result<Vec<OccupancyRecord>, StoreError> {
            Err(StoreError::Database("connection reset".to_string()))
        }
    }

    #[actix_web::test]
    async fn health_needs_no_token() {
        let app = test::init_service(App::new().configure(configure)).await;
        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert!(resp.status().is_success());
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["healthy"], json!(true));
    }

    #[actix_web::test]
    async fn near_search_returns_lots_serving_destination() {
        let auth = bearer();
        let envelope = post(
            state(),
            "/get_near_parking_location",
            Some(&auth),
            &json!({ "user_loc": USER_LOC, "target": "師大" }).to_string(),
        )
        .await;

        assert_eq!(envelope.status, ResponseStatus::Success);
        assert_eq!(envelope.code, 200);
        let lots = envelope.data.as_array().unwrap();
        let names: Vec<&str> = lots.iter().map(|l| l["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Shida Lot", "Quiet Lot"]);
        assert_eq!(lots[0]["loc"], json!(NEAR_LOT));
        assert!(lots[0]["distance"].is_u64());
    }

    #[actix_web::test]
    async fn near_search_unknown_target_is_empty_array() {
        let auth = bearer();
        let envelope = post(
            state(),
            "/get_near_parking_location",
            Some(&auth),
            &json!({ "user_loc": USER_LOC, "target": "Atlantis" }).to_string(),
        )
        .await;

        assert_eq!(envelope.status, ResponseStatus::Success);
        assert_eq!(envelope.data, json!([]));
    }

    #[actix_web::test]
    async fn near_search_rejects_malformed_coordinate() {
        let auth = bearer();
        let envelope = post(
            state(),
            "/get_near_parking_location",
            Some(&auth),
            &json!({ "user_loc": "25.0", "target": "師大" }).to_string(),
        )
        .await;

        assert_eq!(envelope.status, ResponseStatus::Warning);
        assert_eq!(envelope.code, 422);
        assert_eq!(envelope.data, json!({}));
    }

    #[actix_web::test]
    async fn near_search_reports_missing_field() {
        let auth = bearer();
        let envelope = post(
            state(),
            "/get_near_parking_location",
            Some(&auth),
            &json!({ "user_loc": USER_LOC }).to_string(),
        )
        .await;

        assert_eq!(envelope.code, 422);
        assert!(envelope.message.contains("target"));
    }

    #[actix_web::test]
    async fn malformed_json_is_a_validation_warning() {
        let auth = bearer();
        let envelope = post(
            state(),
            "/get_parking_space_density",
            Some(&auth),
            "{ not json",
        )
        .await;

        assert_eq!(envelope.status, ResponseStatus::Warning);
        assert_eq!(envelope.code, 422);
    }

    #[actix_web::test]
    async fn missing_token_wins_over_bad_body() {
        for path in ["/get_near_parking_location", "/get_parking_space_density"] {
            let envelope = post(state(), path, None, "{ not json").await;
            assert_eq!(envelope.status, ResponseStatus::Warning);
            assert_eq!(envelope.code, 400);
        }
    }

    #[actix_web::test]
    async fn invalid_tokens_are_rejected() {
        let foreign = TokenService::new(&KeyMaterial::new("other-key", "test-secret").unwrap())
            .issue(Map::new())
            .unwrap();
        let rotated = TokenService::new(&KeyMaterial::new("test-signing-key", "old").unwrap())
            .issue(Map::new())
            .unwrap();
        let valid_body = json!({ "location": NEAR_LOT }).to_string();

        for auth in [
            format!("Bearer {foreign}"),
            format!("Bearer {rotated}"),
            "Bearer garbage".to_string(),
            bearer().replace("Bearer", "Token"),
        ] {
            let envelope = post(
                state(),
                "/get_parking_space_density",
                Some(&auth),
                &valid_body,
            )
            .await;
            assert_eq!(envelope.code, 400, "{auth}");
            assert_eq!(envelope.data, json!({}));
        }
    }

    #[actix_web::test]
    async fn density_uses_latest_reading() {
        let auth = bearer();
        let palette = Palette::default();
        let envelope = post(
            state(),
            "/get_parking_space_density",
            Some(&auth),
            &json!({ "location": NEAR_LOT }).to_string(),
        )
        .await;

        assert_eq!(envelope.status, ResponseStatus::Success);
        // 95 / 100 is in the red band; the prediction is red or yellow
        assert_eq!(envelope.data["color"], json!(palette.red));
        let after = envelope.data["color_after_five_minutes"].as_str().unwrap();
        assert!(after == palette.red || after == palette.yellow, "{after}");
    }

    #[actix_web::test]
    async fn density_without_readings_is_empty_success() {
        let auth = bearer();
        let envelope = post(
            state(),
            "/get_parking_space_density",
            Some(&auth),
            &json!({ "location": EMPTY_LOT }).to_string(),
        )
        .await;

        assert_eq!(envelope.status, ResponseStatus::Success);
        assert_eq!(envelope.code, 200);
        assert_eq!(envelope.data, json!({}));
    }

    #[actix_web::test]
    async fn density_rejects_bad_location() {
        let auth = bearer();
        let envelope = post(
            state(),
            "/get_parking_space_density",
            Some(&auth),
            &json!({ "location": "north,east" }).to_string(),
        )
        .await;

        assert_eq!(envelope.code, 422);
    }

    #[actix_web::test]
    async fn low_band_reports_red_by_default() {
        let store = MemoryParkingStore::new()
            .with_lot(&lot("Quiet Lot", EMPTY_LOT, 50))
            .with_reading(EMPTY_LOT, 1);
        let palette = Palette::default();
        let state = state_with(Arc::new(store), OccupancyClassifier::default());
        let auth = bearer();

        let envelope = post(
            state,
            "/get_parking_space_density",
            Some(&auth),
            &json!({ "location": EMPTY_LOT }).to_string(),
        )
        .await;

        assert_eq!(envelope.data["color"], json!(palette.red));
    }

    #[actix_web::test]
    async fn green_low_band_policy_reports_green() {
        let store = MemoryParkingStore::new()
            .with_lot(&lot("Quiet Lot", EMPTY_LOT, 50))
            .with_reading(EMPTY_LOT, 1);
        let palette = Palette::default();
        let state = state_with(
            Arc::new(store),
            OccupancyClassifier::new(palette.clone(), LowBandPolicy::Green),
        );
        let auth = bearer();

        let envelope = post(
            state,
            "/get_parking_space_density",
            Some(&auth),
            &json!({ "location": EMPTY_LOT }).to_string(),
        )
        .await;

        assert_eq!(envelope.data["color"], json!(palette.green));
    }

    #[actix_web::test]
    async fn zero_capacity_is_internal_error() {
        let store = MemoryParkingStore::new()
            .with_lot(&LotDefinition {
                name: "Broken".to_string(),
                loc: EMPTY_LOT.to_string(),
                capacity: 0,
            })
            .with_reading(EMPTY_LOT, 1);
        let state = state_with(Arc::new(store), OccupancyClassifier::default());
        let auth = bearer();

        let envelope = post(
            state,
            "/get_parking_space_density",
            Some(&auth),
            &json!({ "location": EMPTY_LOT }).to_string(),
        )
        .await;

        assert_eq!(envelope.status, ResponseStatus::Error);
        assert_eq!(envelope.code, 503);
    }

    #[actix_web::test]
    async fn store_failure_is_generic_internal_error() {
        let state = state_with(Arc::new(FailingStore), OccupancyClassifier::default());
        let auth = bearer();

        let envelope = post(
            state,
            "/get_near_parking_location",
            Some(&auth),
            &json!({ "user_loc": USER_LOC, "target": "師大" }).to_string(),
        )
        .await;

        assert_eq!(envelope.status, ResponseStatus::Error);
        assert_eq!(envelope.code, 503);
        assert_eq!(envelope.message, INTERNAL_MESSAGE);
        assert!(!envelope.message.contains("connection reset"));
    }
}

//! HTTP handler functions for the parking spot API.

use actix_web::{HttpRequest, HttpResponse, web};
use parking_spot_geography_models::Coordinate;
use parking_spot_occupancy::{DensitySignal, RngDraw};
use parking_spot_parking::search::search;
use parking_spot_parking_models::{NearParkingLot, OccupancyReading};
use parking_spot_server_models::{ApiHealth, DensityRequest, NearParkingRequest};

use crate::AppState;
use crate::error::ApiError;
use crate::pipeline::{self, Endpoint, Payload, from_body, required};

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /get_near_parking_location`
///
/// Lists lots that serve the named destination, with the user's distance
/// to each.
pub async fn get_near_parking_location(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    pipeline::run::<NearParkingLocation>(&state, &req, body).await
}

/// `POST /get_parking_space_density`
///
/// Returns the current and predicted crowding color for one lot.
pub async fn get_parking_space_density(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    pipeline::run::<ParkingSpaceDensity>(&state, &req, body).await
}

struct NearParkingLocation;

struct NearParkingInput {
    user: Coordinate,
    target: String,
}

impl Endpoint for NearParkingLocation {
    const NAME: &'static str = "get_near_parking_location";
    type Input = NearParkingInput;
    type Output = Vec<NearParkingLot>;

    fn validate(body: serde_json::Value) -> Result<Self::Input, ApiError> {
        let request: NearParkingRequest = from_body(body)?;
        let user = Coordinate::parse(&required(request.user_loc, "user_loc")?)?;
        let target = required(request.target, "target")?;
        Ok(NearParkingInput { user, target })
    }

    async fn execute(
        state: &AppState,
        input: Self::Input,
    ) -> Result<Payload<Self::Output>, ApiError> {
        let lots = state.store.get_all_parking_info().await?;
        let near = search(
            &state.destinations,
            &input.user,
            &input.target,
            &lots,
            state.search,
        );
        log::debug!(
            "{} of {} lots near {:?}",
            near.len(),
            lots.len(),
            input.target
        );
        Ok(Payload::Data(near))
    }
}

struct ParkingSpaceDensity;

impl Endpoint for ParkingSpaceDensity {
    const NAME: &'static str = "get_parking_space_density";
    /// Raw location string; it is the lot's key in the store.
    type Input = String;
    type Output = DensitySignal;

    fn validate(body: serde_json::Value) -> Result<Self::Input, ApiError> {
        let request: DensityRequest = from_body(body)?;
        let location = required(request.location, "location")?;
        Coordinate::parse(&location)?;
        Ok(location)
    }

    async fn execute(
        state: &AppState,
        location: Self::Input,
    ) -> Result<Payload<Self::Output>, ApiError> {
        let data = state.store.get_parking_data(&location).await?;
        let Some(latest) = data.first() else {
            log::debug!("No occupancy records for {location}");
            return Ok(Payload::NoData);
        };

        let Some(capacity) = state.store.get_parking_volume(&location).await? else {
            log::warn!("Occupancy recorded for {location} but lot has no capacity");
            return Ok(Payload::NoData);
        };

        let reading = OccupancyReading {
            current_count: latest.num,
            capacity,
        };
        let signal = state
            .classifier
            .signal(reading, &mut RngDraw(rand::thread_rng()))?;

        Ok(Payload::Data(signal))
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the parking spot server.
//!
//! Every response body is a [`ResponseEnvelope`]; clients read the outcome
//! from its `status` and `code` rather than from the HTTP status line.

use serde::{Deserialize, Serialize};

/// Body of `POST /get_near_parking_location`.
///
/// Fields are optional so a missing one can be reported as a validation
/// warning instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NearParkingRequest {
    /// User position as `"lat,long"`.
    pub user_loc: Option<String>,
    /// Destination name.
    pub target: Option<String>,
}

/// Body of `POST /get_parking_space_density`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DensityRequest {
    /// Lot location as `"lat,long"`.
    pub location: Option<String>,
}

/// Outcome class carried in every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResponseStatus {
    /// The request succeeded (possibly with an empty payload).
    Success,
    /// The request was rejected (authentication or validation).
    Warning,
    /// The server failed unexpectedly.
    Error,
}

/// Uniform response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T = serde_json::Value> {
    /// Outcome class.
    pub status: ResponseStatus,
    /// HTTP-style outcome code.
    pub code: u16,
    /// Human-readable outcome.
    pub message: String,
    /// Endpoint payload; `{}` when there is nothing to return.
    pub data: T,
}

impl ResponseEnvelope {
    /// Envelope with an empty object payload.
    #[must_use]
    pub fn empty(status: ResponseStatus, code: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            data: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

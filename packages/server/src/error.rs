//! Failure kinds surfaced by the API and their envelope mapping.

use parking_spot_auth::AuthError;
use parking_spot_database::StoreError;
use parking_spot_geography_models::CoordinateError;
use parking_spot_occupancy::OccupancyError;
use parking_spot_server_models::{ResponseEnvelope, ResponseStatus};

/// Message shown for any internal failure; details stay in the log.
pub const INTERNAL_MESSAGE: &str = "Service temporarily unavailable";

/// Why a request did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, malformed, or rejected bearer token.
    #[error("Invalid access token")]
    AuthInvalid,

    /// Malformed body, missing field, or bad coordinate.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Anything else, including store failures.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Outcome class and code for this failure.
    #[must_use]
    pub const fn status_code(&self) -> (ResponseStatus, u16) {
        match self {
            Self::AuthInvalid => (ResponseStatus::Warning, 400),
            Self::Validation(_) => (ResponseStatus::Warning, 422),
            Self::Internal(_) => (ResponseStatus::Error, 503),
        }
    }

    /// Builds the client-facing envelope. Internal details are replaced
    /// with [`INTERNAL_MESSAGE`].
    #[must_use]
    pub fn to_envelope(&self) -> ResponseEnvelope {
        let (status, code) = self.status_code();
        let message = match self {
            Self::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        };
        ResponseEnvelope::empty(status, code, message)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken => Self::AuthInvalid,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<CoordinateError> for ApiError {
    fn from(e: CoordinateError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<OccupancyError> for ApiError {
    fn from(e: OccupancyError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

//! Per-request processing pipeline.
//!
//! Every protected endpoint runs the same sequence:
//!
//! 1. the [`STAGES`] in order (authenticate, then decode the JSON body),
//!    any of which may short-circuit with an [`ApiError`];
//! 2. the endpoint's [`Endpoint::validate`] step, turning the decoded body
//!    into typed input;
//! 3. the endpoint's [`Endpoint::execute`] step;
//! 4. a single [`ResponseEnvelope`] built from the outcome.
//!
//! Endpoints never write responses themselves, so each request yields
//! exactly one envelope.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use parking_spot_server_models::{ResponseEnvelope, ResponseStatus};
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

/// Message sent with every successful envelope.
pub const SUCCESS_MESSAGE: &str = "Data retrieved successfully";

/// Message sent when the request was fine but there is nothing to report.
pub const NO_DATA_MESSAGE: &str = "No data available";

/// Mutable state threaded through the stages of one request.
pub struct RequestContext<'a> {
    /// Shared application state.
    pub state: &'a AppState,
    /// Raw `Authorization` header, if present and valid UTF-8.
    pub authorization: Option<String>,
    /// Raw request body.
    pub body: web::Bytes,
    /// Body decoded by [`DecodeJson`].
    pub json: Option<serde_json::Value>,
}

impl<'a> RequestContext<'a> {
    /// Captures what the stages need from the incoming request.
    #[must_use]
    pub fn new(state: &'a AppState, req: &HttpRequest, body: web::Bytes) -> Self {
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            state,
            authorization,
            body,
            json: None,
        }
    }
}

/// One pre-execution step. Returning an error ends the request.
pub trait Stage: Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Runs the step against `ctx`.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] the request should be answered with.
    fn process(&self, ctx: &mut RequestContext<'_>) -> Result<(), ApiError>;
}

/// Rejects requests without a valid bearer token.
pub struct Authenticate;

impl Stage for Authenticate {
    fn name(&self) -> &'static str {
        "authenticate"
    }

    fn process(&self, ctx: &mut RequestContext<'_>) -> Result<(), ApiError> {
        ctx.state
            .tokens
            .verify_header(ctx.authorization.as_deref())?;
        Ok(())
    }
}

/// Parses the body as JSON. An empty body decodes to `{}` so that the
/// endpoint can report which field is missing.
pub struct DecodeJson;

impl Stage for DecodeJson {
    fn name(&self) -> &'static str {
        "decode_json"
    }

    fn process(&self, ctx: &mut RequestContext<'_>) -> Result<(), ApiError> {
        let value = if ctx.body.iter().all(u8::is_ascii_whitespace) {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_slice(&ctx.body)
                .map_err(|e| ApiError::Validation(format!("Malformed JSON body: {e}")))?
        };

        if !value.is_object() {
            return Err(ApiError::Validation(
                "Request body must be a JSON object".to_string(),
            ));
        }

        ctx.json = Some(value);
        Ok(())
    }
}

/// Stages run before every protected endpoint, in order.
pub const STAGES: &[&dyn Stage] = &[&Authenticate, &DecodeJson];

/// Domain result of a successful request.
#[derive(Debug)]
pub enum Payload<T> {
    /// A result to return as `data`.
    Data(T),
    /// Nothing to report; `data` is `{}`.
    NoData,
}

/// A protected endpoint's domain logic.
pub trait Endpoint {
    /// Short name for logs.
    const NAME: &'static str;

    /// Typed input produced by [`Self::validate`].
    type Input;

    /// Result serialized into `data`.
    type Output: Serialize;

    /// Extracts and checks the input fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for missing or malformed fields.
    fn validate(body: serde_json::Value) -> Result<Self::Input, ApiError>;

    /// Runs the domain logic.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure; anything not already classified
    /// should be [`ApiError::Internal`].
    async fn execute(
        state: &AppState,
        input: Self::Input,
    ) -> Result<Payload<Self::Output>, ApiError>;
}

/// Runs endpoint `E` through the full pipeline and wraps the outcome.
pub async fn run<E: Endpoint>(
    state: &AppState,
    req: &HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let envelope = match process::<E>(state, req, body).await {
        Ok(envelope) => envelope,
        Err(e) => {
            match &e {
                ApiError::AuthInvalid => log::warn!("{}: rejected token", E::NAME),
                ApiError::Validation(msg) => log::warn!("{}: validation failed: {msg}", E::NAME),
                ApiError::Internal(msg) => log::error!("{}: {msg}", E::NAME),
            }
            e.to_envelope()
        }
    };

    // The transport status is always 200; clients read `status`/`code`
    HttpResponse::Ok().json(envelope)
}

async fn process<E: Endpoint>(
    state: &AppState,
    req: &HttpRequest,
    body: web::Bytes,
) -> Result<ResponseEnvelope, ApiError> {
    let mut ctx = RequestContext::new(state, req, body);

    for stage in STAGES {
        log::debug!("{}: stage {}", E::NAME, stage.name());
        stage.process(&mut ctx)?;
    }

    let json = ctx
        .json
        .take()
        .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

    log::debug!("{}: validating", E::NAME);
    let input = E::validate(json)?;

    log::debug!("{}: executing", E::NAME);
    Ok(match E::execute(state, input).await? {
        Payload::Data(output) => ResponseEnvelope {
            status: ResponseStatus::Success,
            code: 200,
            message: SUCCESS_MESSAGE.to_string(),
            data: serde_json::to_value(output)?,
        },
        Payload::NoData => ResponseEnvelope::empty(ResponseStatus::Success, 200, NO_DATA_MESSAGE),
    })
}

/// Pulls a required string field out of a request struct field.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] naming `field` when it is absent.
pub fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::Validation(format!("Missing required field `{field}`")))
}

/// Deserializes the decoded body into an endpoint's request type.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] if a field has the wrong JSON type.
pub fn from_body<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::Validation(e.to_string()))
}

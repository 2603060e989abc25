#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Bearer token authentication for the parking spot API.
//!
//! Tokens are HS256 JWTs signed with a server-held key. Every token also
//! carries the server's shared secret as a claim, so rotating the secret
//! file invalidates all outstanding tokens even when the signing key stays
//! the same. Both values are loaded once at start-up into [`KeyMaterial`]
//! and handed to a [`TokenService`].

pub mod keys;
pub mod token;

pub use keys::KeyMaterial;
pub use token::{Claims, TokenService, bearer_token};

use thiserror::Error;

/// Errors from token operations.
///
/// Every verification failure collapses to [`AuthError::InvalidToken`];
/// the underlying reason is only logged.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing header, wrong scheme, bad signature, undecodable payload,
    /// expired token, or secret mismatch.
    #[error("Invalid access token")]
    InvalidToken,

    /// A key file exists but is empty.
    #[error("Key material at {path} is empty")]
    MissingKeyMaterial {
        /// The offending file.
        path: String,
    },

    /// Reading key material failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Signing a new token failed.
    #[error("Token encoding error: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

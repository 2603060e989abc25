//! Token issuance and verification.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{AuthError, KeyMaterial};

const SECRET_CLAIM: &str = "secret";
const EXPIRY_CLAIM: &str = "exp";

/// Decoded token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The shared secret the token was issued under.
    pub secret: String,
    /// Expiry as a Unix timestamp. Tokens without one never expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    /// Any other claims supplied at issue time.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Issues and verifies shared-secret-bound access tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    secret: String,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a service bound to `keys`.
    #[must_use]
    pub fn new(keys: &KeyMaterial) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is optional; when present it is still checked
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(keys.signing_key()),
            decoding: DecodingKey::from_secret(keys.signing_key()),
            validation,
            secret: keys.secret().to_string(),
        }
    }

    /// Signs `claims` with the shared secret embedded. A caller-supplied
    /// `secret` or `exp` claim is overwritten or dropped. The token never
    /// expires.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Encode`] if signing fails.
    pub fn issue(&self, claims: Map<String, Value>) -> Result<String, AuthError> {
        self.sign(claims, None)
    }

    /// Like [`Self::issue`], but the token expires `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Encode`] if signing fails.
    pub fn issue_with_ttl(
        &self,
        claims: Map<String, Value>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let exp = jsonwebtoken::get_current_timestamp().saturating_add(ttl.as_secs());
        self.sign(claims, Some(exp))
    }

    fn sign(&self, mut extra: Map<String, Value>, exp: Option<u64>) -> Result<String, AuthError> {
        extra.remove(SECRET_CLAIM);
        extra.remove(EXPIRY_CLAIM);

        let claims = Claims {
            secret: self.secret.clone(),
            exp,
            extra,
        };

        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    /// Verifies a raw token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if the signature is wrong, the
    /// payload can't be decoded, the token has expired, or its secret
    /// doesn't match the server's.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                log::debug!("Token rejected: {e}");
                AuthError::InvalidToken
            })?;

        if data.claims.secret != self.secret {
            log::debug!("Token rejected: secret mismatch");
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }

    /// Verifies the token carried in an `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] when the header is missing, not
    /// a bearer credential, or the token fails [`Self::verify`].
    pub fn verify_header(&self, header: Option<&str>) -> Result<Claims, AuthError> {
        self.verify(bearer_token(header)?)
    }
}

/// Extracts the token from a `Bearer <token>` header value. The scheme
/// name is matched case-insensitively.
///
/// # Errors
///
/// Returns [`AuthError::InvalidToken`] when the header is absent, uses a
/// different scheme, or has an empty token.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::InvalidToken)?;
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidToken)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::InvalidToken);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn service(key: &str, secret: &str) -> TokenService {
        TokenService::new(&KeyMaterial::new(key, secret).unwrap())
    }

    fn claims(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("claims must be an object"),
        }
    }

    #[test]
    fn issued_token_verifies() {
        let tokens = service("key", "secret");
        let token = tokens.issue(claims(json!({ "client": "kiosk-1" }))).unwrap();
        let decoded = tokens.verify(&token).unwrap();
        assert_eq!(decoded.secret, "secret");
        assert_eq!(decoded.exp, None);
        assert_eq!(decoded.extra.get("client"), Some(&json!("kiosk-1")));
    }

    #[test]
    fn caller_cannot_override_embedded_secret() {
        let tokens = service("key", "secret");
        let token = tokens.issue(claims(json!({ "secret": "forged" }))).unwrap();
        assert_eq!(tokens.verify(&token).unwrap().secret, "secret");
    }

    #[test]
    fn wrong_signing_key_is_rejected() {
        let token = service("key-a", "secret").issue(Map::new()).unwrap();
        assert!(matches!(
            service("key-b", "secret").verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn rotated_secret_is_rejected() {
        let token = service("key", "old-secret").issue(Map::new()).unwrap();
        assert!(matches!(
            service("key", "new-secret").verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn trailing_newline_in_key_material_is_significant() {
        let token = service("key\n", "secret\n").issue(Map::new()).unwrap();
        assert_eq!(
            service("key\n", "secret\n").verify(&token).unwrap().secret,
            "secret\n"
        );
        assert!(matches!(
            service("key", "secret\n").verify(&token),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            service("key\n", "secret").verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = service("key", "secret");
        for token in ["", "abc", "a.b.c", "eyJhbGciOiJIUzI1NiJ9.e30.x"] {
            assert!(matches!(tokens.verify(token), Err(AuthError::InvalidToken)));
        }
    }

    #[test]
    fn token_with_future_expiry_verifies() {
        let tokens = service("key", "secret");
        let token = tokens
            .issue_with_ttl(Map::new(), Duration::from_secs(3600))
            .unwrap();
        assert!(tokens.verify(&token).unwrap().exp.is_some());
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service("key", "secret");
        let past = jsonwebtoken::get_current_timestamp() - 60;
        let expired = Claims {
            secret: "secret".to_string(),
            exp: Some(past),
            extra: Map::new(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &expired,
            &EncodingKey::from_secret(b"key"),
        )
        .unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn verify_header_accepts_bearer_scheme() {
        let tokens = service("key", "secret");
        let token = tokens.issue(Map::new()).unwrap();
        assert!(tokens.verify_header(Some(&format!("Bearer {token}"))).is_ok());
        assert!(tokens.verify_header(Some(&format!("bearer {token}"))).is_ok());
    }

    #[test]
    fn verify_header_rejects_missing_or_foreign_scheme() {
        let tokens = service("key", "secret");
        let token = tokens.issue(Map::new()).unwrap();
        assert!(matches!(tokens.verify_header(None), Err(AuthError::InvalidToken)));
        assert!(matches!(
            tokens.verify_header(Some(&token)),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            tokens.verify_header(Some(&format!("Basic {token}"))),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            tokens.verify_header(Some("Bearer ")),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn bearer_token_strips_scheme() {
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
    }
}

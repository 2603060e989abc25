//! Signing key and shared secret loading.

use std::fmt;
use std::path::Path;

use crate::AuthError;

/// Default location of the signing key file.
pub const DEFAULT_SIGNING_KEY_PATH: &str = "docs/token";

/// Default location of the shared secret file.
pub const DEFAULT_SECRET_PATH: &str = "docs/secret";

/// The signing key and shared secret, read once at start-up.
#[derive(Clone)]
pub struct KeyMaterial {
    signing_key: String,
    secret: String,
}

impl KeyMaterial {
    /// Builds key material from in-memory values.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingKeyMaterial`] if either value is empty
    /// or whitespace only.
    pub fn new(signing_key: &str, secret: &str) -> Result<Self, AuthError> {
        Ok(Self {
            signing_key: non_empty(signing_key, "signing key")?,
            secret: non_empty(secret, "secret")?,
        })
    }

    /// Reads the signing key and secret from their files. Contents are
    /// used byte for byte, including any trailing newline, so tokens
    /// issued by other services sharing the same files still verify.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if either file can't be read or is empty.
    pub fn load(signing_key_path: &Path, secret_path: &Path) -> Result<Self, AuthError> {
        let signing_key = read_key_file(signing_key_path)?;
        let secret = read_key_file(secret_path)?;
        log::info!(
            "Loaded signing key from {} and secret from {}",
            signing_key_path.display(),
            secret_path.display()
        );
        Ok(Self {
            signing_key,
            secret,
        })
    }

    pub(crate) fn signing_key(&self) -> &[u8] {
        self.signing_key.as_bytes()
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial").finish_non_exhaustive()
    }
}

fn read_key_file(path: &Path) -> Result<String, AuthError> {
    let contents = std::fs::read_to_string(path)?;
    non_empty(&contents, &path.display().to_string())
}

fn non_empty(value: &str, what: &str) -> Result<String, AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::MissingKeyMaterial {
            path: what.to_string(),
        });
    }
    Ok(value.to_string())
}

//! Bearer-token verification for subscription requests.
//!
//! Tokens have the shape `<user_id>.<hex hmac-sha256(user_id)>`. The hosted
//! auth platform normally issues tokens; this service only needs to map a
//! token back to a user id.
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("malformed bearer token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
}

/// Maps a bearer token to the user it was issued for.
pub trait TokenVerifier: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the token is not valid.
    fn verify(&self, token: &str) -> Result<String, AuthError>;
}

pub struct HmacTokenVerifier {
    secret: Vec<u8>,
}

impl HmacTokenVerifier {
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret).ok()
    }

    /// Issue a token for `user_id`.
    #[must_use]
    pub fn sign(&self, user_id: &str) -> String {
        let Some(mut mac) = self.mac() else {
            return format!("{user_id}.");
        };
        mac.update(user_id.as_bytes());
        let digest = mac.finalize().into_bytes();
        format!("{user_id}.{}", encode_hex(&digest))
    }
}

impl TokenVerifier for HmacTokenVerifier {
    fn verify(&self, token: &str) -> Result<String, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        let (user_id, signature) = token.rsplit_once('.').ok_or(AuthError::Malformed)?;
        if user_id.is_empty() || signature.is_empty() {
            return Err(AuthError::Malformed);
        }
        let signature = decode_hex(signature).ok_or(AuthError::Malformed)?;
        let mut mac = self.mac().ok_or(AuthError::BadSignature)?;
        mac.update(user_id.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;
        Ok(user_id.to_string())
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
#[must_use]
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim()).filter(|token| !token.is_empty())
    } else {
        None
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

fn decode_hex(raw: &str) -> Option<Vec<u8>> {
    if raw.len() % 2 != 0 || !raw.is_ascii() {
        return None;
    }
    (0..raw.len())
        .step_by(2)
        .map(|idx| u8::from_str_radix(&raw[idx..idx + 2], 16).ok())
        .collect()
}

//! Signed session tokens. The token only carries the user id; the user row is
//! re-read on every request so role changes apply immediately.
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::ErrorMessage;

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn create_token(
    user_id: &str,
    secret: &[u8],
    expires_in_seconds: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    if user_id.is_empty() {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidSubject.into());
    }

    let now = Utc::now();
    let iat = now.timestamp() as usize;
    let exp = (now + Duration::seconds(expires_in_seconds)).timestamp() as usize;
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iat,
        exp,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

/// Returns the subject of a valid, unexpired HS256 token.
pub fn decode_token<T: Into<String>>(token: T, secret: &[u8]) -> Result<String, ErrorMessage> {
    decode::<TokenClaims>(
        &token.into(),
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )
    .map(|token| token.claims.sub)
    .map_err(|_| ErrorMessage::InvalidSession)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn round_trips_subject() {
        let token = create_token("42", SECRET, 60).unwrap();
        assert_eq!(decode_token(token, SECRET).unwrap(), "42");
    }

    #[test]
    fn rejects_foreign_signature_and_expiry() {
        let token = create_token("42", SECRET, 60).unwrap();
        assert_eq!(
            decode_token(token, b"other-secret"),
            Err(ErrorMessage::InvalidSession)
        );

        // well past the default 60s leeway
        let expired = create_token("42", SECRET, -3600).unwrap();
        assert_eq!(decode_token(expired, SECRET), Err(ErrorMessage::InvalidSession));
    }

    #[test]
    fn refuses_empty_subject() {
        assert!(create_token("", SECRET, 60).is_err());
    }
}

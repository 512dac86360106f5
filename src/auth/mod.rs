use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Claims carried by the platform's access tokens. Only the fields the
/// dashboard reads are modelled; the rest are ignored on decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Value>,
}

impl AccessClaims {
    pub fn new(sub: String, email: Option<String>, ttl_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            sub,
            email,
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            iat: now.timestamp(),
            role: Some("authenticated".to_string()),
            aud: Some(Value::String("authenticated".to_string())),
        }
    }

    /// True when the token expires within `leeway_secs` of `now`
    pub fn expires_within(&self, now: i64, leeway_secs: i64) -> bool {
        self.exp <= now + leeway_secs
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

pub fn generate_jwt(claims: &AccessClaims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Decode access token claims.
///
/// With a secret the HS256 signature is verified. Without one the claims are
/// read as-is and the caller must confirm the token with the auth service.
/// Expiry is never enforced here; callers compare `exp` themselves so that an
/// expired token can still drive a refresh.
pub fn decode_claims(token: &str, secret: Option<&str>) -> Result<AccessClaims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_aud = false;

    let key = match secret {
        Some(secret) if !secret.is_empty() => DecodingKey::from_secret(secret.as_bytes()),
        Some(_) => return Err(JwtError::InvalidSecret),
        None => {
            validation.insecure_disable_signature_validation();
            DecodingKey::from_secret(&[])
        }
    };

    decode::<AccessClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

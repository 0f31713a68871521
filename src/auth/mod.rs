use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Claims carried by every access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a string
    pub sub: String,
    /// Username
    pub name: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique token id (UUID v4)
    pub jti: String,
}

impl Claims {
    pub fn new(user_id: i32, username: &str, config: &SecurityConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::minutes(config.jwt_expiry_minutes);

        Self {
            sub: user_id.to_string(),
            name: username.to_string(),
            iss: config.jwt_issuer.clone(),
            aud: config.jwt_audience.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn user_id(&self) -> Result<i32, JwtError> {
        self.sub.parse().map_err(|_| JwtError::InvalidSubject(self.sub.clone()))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Invalid token subject: {0}")]
    InvalidSubject(String),
}

/// Sign an HS256 token for the user. Returns the token and its expiry.
pub fn generate_jwt(
    config: &SecurityConfig,
    user_id: i32,
    username: &str,
) -> Result<(String, DateTime<Utc>), JwtError> {
    if config.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let claims = Claims::new(user_id, username, config);
    let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))?;

    Ok((token, claims.expires_at()))
}

/// Check signature, expiry, issuer and audience, then return the claims
pub fn validate_jwt(config: &SecurityConfig, token: &str) -> Result<Claims, JwtError> {
    if config.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.set_issuer(&[config.jwt_issuer.as_str()]);
    validation.set_audience(&[config.jwt_audience.as_str()]);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

/// Lowercase hex SHA-256 of a password
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn security() -> SecurityConfig {
        AppConfig::development().security
    }

    #[test]
    fn token_round_trip() {
        let config = security();
        let (token, expiry) = generate_jwt(&config, 7, "admin").unwrap();
        let claims = validate_jwt(&config, &token).unwrap();

        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.name, "admin");
        assert_eq!(claims.iss, "ems-api");
        assert_eq!(claims.aud, "ems-api");
        assert_eq!(claims.exp - claims.iat, 60 * 60);
        assert_eq!(expiry.timestamp(), claims.exp);
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn tokens_have_unique_ids() {
        let config = security();
        let (a, _) = generate_jwt(&config, 1, "a").unwrap();
        let (b, _) = generate_jwt(&config, 1, "a").unwrap();
        let a = validate_jwt(&config, &a).unwrap();
        let b = validate_jwt(&config, &b).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn rejects_wrong_secret_and_audience() {
        let config = security();
        let (token, _) = generate_jwt(&config, 1, "a").unwrap();

        let other_secret = SecurityConfig {
            jwt_secret: "another-secret".into(),
            ..security()
        };
        assert!(matches!(validate_jwt(&other_secret, &token), Err(JwtError::InvalidToken(_))));

        let other_audience = SecurityConfig {
            jwt_audience: "someone-else".into(),
            ..security()
        };
        assert!(validate_jwt(&other_audience, &token).is_err());
        assert!(validate_jwt(&config, "not.a.token").is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let config = SecurityConfig {
            jwt_secret: String::new(),
            ..security()
        };
        assert!(matches!(generate_jwt(&config, 1, "a"), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn password_hash_is_lowercase_hex_sha256() {
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
        assert_eq!(hash_password("").len(), 64);
    }
}

use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Issues and validates signed session tokens carrying a user id and an
/// absolute expiry.
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str, algorithm: &str) -> Result<Self> {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|e| AppError::Internal(format!("Unsupported token algorithm {}: {}", algorithm, e)))?;

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {}
            other => {
                return Err(AppError::Internal(format!(
                    "Token algorithm {:?} needs a key pair, only HMAC secrets are supported",
                    other
                )))
            }
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn issue(&self, subject: Uuid, ttl: Duration) -> Result<String> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Fails closed: any decoding, signature or expiry problem is `InvalidToken`.
    pub fn validate(&self, token: &str) -> Result<Uuid> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Rejected session token: {}", e);
            AppError::InvalidToken
        })?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| AppError::InvalidToken)
    }
}

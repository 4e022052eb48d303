//! HS256 access and refresh tokens
//!
//! Access and refresh tokens carry the same claims but are signed with different secrets,
//! so one can never be used in place of the other.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vidmod_core::models::{RoleName, User};
use vidmod_core::{AppError, Config};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: Uuid, // user_id
    pub email: String,
    pub role: RoleName,
    pub iat: i64,
    pub exp: i64,
    /// Unique per token, so two tokens issued in the same second still differ.
    pub jti: Uuid,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningKey {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

/// Issues and verifies tokens for both token kinds.
pub struct TokenIssuer {
    access: SigningKey,
    refresh: SigningKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access: SigningKey::new(access_secret, access_ttl),
            refresh: SigningKey::new(refresh_secret, refresh_ttl),
            validation,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_secret(),
            config.jwt_refresh_secret(),
            Duration::hours(config.jwt_expiry_hours()),
            Duration::days(config.jwt_refresh_expiry_days()),
        )
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.issue_access(user)?,
            refresh_token: sign(&self.refresh, user)?,
        })
    }

    pub fn issue_access(&self, user: &User) -> Result<String, AppError> {
        sign(&self.access, user)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AppError> {
        self.verify(&self.access, token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AppError> {
        self.verify(&self.refresh, token)
    }

    fn verify(&self, key: &SigningKey, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &key.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AppError::InvalidToken
            })
    }
}

fn sign(key: &SigningKey, user: &User) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        iat: now.timestamp(),
        exp: (now + key.ttl).timestamp(),
        jti: Uuid::new_v4(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &key.encoding)
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

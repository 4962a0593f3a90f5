//! Signed, time-bound identity tokens (HS256 JWT)

use crate::config::AuthConfig;
use crate::error::{BookshelfResult, TokenError};
use crate::types::UserId;
use crate::{config_error, internal_error};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// JWT signing and verification keys
struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, TokenError> {
        self.sub.parse().map_err(|_| TokenError::Malformed)
    }
}

/// Token handed to a client after login or registration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Issues and validates tokens with a shared secret
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
    issuer: String,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> BookshelfResult<Self> {
        if config.jwt_secret.is_empty() {
            return Err(config_error!("JWT secret must not be empty", "token"));
        }
        if config.token_ttl_secs == 0 {
            return Err(config_error!("Token TTL must be positive", "token"));
        }
        let ttl = i64::try_from(config.token_ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| config_error!("Token TTL is out of range", "token"))?;

        Ok(Self {
            keys: Arc::new(Keys::new(config.jwt_secret.as_bytes())),
            issuer: config.issuer.clone(),
            ttl,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issue a token for the subject, valid from now
    pub fn issue(&self, subject: UserId) -> BookshelfResult<IssuedToken> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if it were minted at `issued_at`
    pub fn issue_at(&self, subject: UserId, issued_at: DateTime<Utc>) -> BookshelfResult<IssuedToken> {
        let claims = Claims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| internal_error!("Failed to encode token", "token", e))?;

        Ok(IssuedToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// Verify the signature, then expiry and issuer, then decode the subject
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let token_data = decode::<Claims>(token, &self.keys.decoding, &validation).map_err(|e| {
            debug!("Token verification failed: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidIssuer => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            }
        })?;

        let claims = token_data.claims;
        claims.user_id()?;
        Ok(claims)
    }
}

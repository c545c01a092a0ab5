use crate::config::Config;
use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only algorithm tokens are signed with or accepted in.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the username it was issued to.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Claims as they arrive from an untrusted token, before the subject is checked.
#[derive(Debug, Deserialize)]
struct PresentedClaims {
    #[serde(default)]
    sub: Option<String>,
    exp: i64,
}

/// Why a presented token was refused. Callers only ever report "Invalid token";
/// the variant is for logs.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    #[error("malformed token")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("token has no subject")]
    MissingSubject,
}

impl From<jsonwebtoken::errors::Error> for TokenRejection {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::InvalidSignature => TokenRejection::BadSignature,
            ErrorKind::ExpiredSignature => TokenRejection::Expired,
            _ => TokenRejection::Malformed,
        }
    }
}

/// Issues and verifies stateless HS256 session tokens.
///
/// The secret and lifetime are supplied at construction; nothing is read from the
/// environment here.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.secret_key.as_bytes(),
            Duration::minutes(config.access_token_expire_minutes),
        )
    }

    /// Lifetime applied by `issue_access_token`.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a token for `subject` that expires `ttl` from now.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, AppError> {
        let expires_at = Utc::now().checked_add_signed(ttl).ok_or_else(|| {
            AppError::InternalServerError(format!("token lifetime {} is out of range", ttl))
        })?;
        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
        };
        Ok(encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)?)
    }

    /// Signs a token for `subject` with the configured lifetime.
    pub fn issue_access_token(&self, subject: &str) -> Result<String, AppError> {
        self.issue(subject, self.ttl)
    }

    /// Checks signature, algorithm and expiry, and returns the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenRejection> {
        let presented = decode::<PresentedClaims>(token, &self.decoding_key, &self.validation)?
            .claims;

        if presented.exp <= Utc::now().timestamp() {
            return Err(TokenRejection::Expired);
        }

        match presented.sub {
            Some(sub) if !sub.is_empty() => Ok(Claims {
                sub,
                exp: presented.exp,
            }),
            _ => Err(TokenRejection::MissingSubject),
        }
    }
}

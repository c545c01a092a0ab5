use std::sync::Arc;

use log::{debug, error};
use thiserror::Error;

use super::token::TokenService;
use crate::error::AppError;
use crate::store::{CredentialStore, StoreError};

/// Why a request could not be tied to a user.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer credential was presented.
    #[error("Not authenticated")]
    NotAuthenticated,
    /// The token failed signature, expiry or shape checks.
    #[error("Invalid token")]
    InvalidToken,
    /// The token is valid but its subject no longer exists.
    #[error("User not found")]
    UserNotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// `UserNotFound` is reported like any other bad token.
impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::NotAuthenticated => AppError::Unauthorized("Not authenticated".into()),
            AuthError::InvalidToken | AuthError::UserNotFound => {
                AppError::Unauthorized("Invalid token".into())
            }
            AuthError::Store(e) => e.into(),
        }
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively. Any other scheme, or an empty token,
/// counts as no credential at all.
pub fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    let (scheme, token) = authorization?.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Resolves a presented bearer token to the numeric id of an existing user.
#[derive(Clone)]
pub struct Authenticator {
    tokens: TokenService,
    credentials: Arc<dyn CredentialStore>,
}

impl Authenticator {
    pub fn new(tokens: TokenService, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            tokens,
            credentials,
        }
    }

    /// Authenticates the raw `Authorization` header value of a request.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<i32, AuthError> {
        let token = bearer_token(authorization).ok_or(AuthError::NotAuthenticated)?;

        let claims = self.tokens.verify(token).map_err(|reason| {
            debug!("rejected bearer token: {}", reason);
            AuthError::InvalidToken
        })?;

        match self.credentials.find_user_by_username(&claims.sub).await {
            Ok(Some(user)) => Ok(user.id),
            Ok(None) => {
                debug!("token subject {:?} has no account", claims.sub);
                Err(AuthError::UserNotFound)
            }
            Err(e) => {
                error!("credential lookup failed: {}", e);
                Err(e.into())
            }
        }
    }
}

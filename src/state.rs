use std::sync::Arc;

use actix_web::web;
use log::debug;

use crate::auth::ownership::ResourceKind;
use crate::auth::{Authenticator, PasswordHasher, TokenService};
use crate::config::Config;
use crate::error::AppError;
use crate::store::{CredentialStore, Store};

/// An id that is not an `i32` cannot name any row, so it gets the usual 404.
fn not_found_message(path: &str) -> &'static str {
    if path.starts_with("/task") {
        ResourceKind::Task.not_found_message()
    } else if path.starts_with("/todo") {
        ResourceKind::TodoList.not_found_message()
    } else {
        "Not found"
    }
}

/// Shared services handed to every worker.
///
/// `configure` registers each piece as `web::Data` so handlers extract only what they use:
/// `web::Data<dyn Store>`, `web::Data<TokenService>`, `web::Data<PasswordHasher>` and the
/// `web::Data<Authenticator>` read by `AuthMiddleware`.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn Store>,
    credentials: Arc<dyn CredentialStore>,
    tokens: TokenService,
    hasher: PasswordHasher,
}

impl AppState {
    pub fn new<S: Store + 'static>(store: Arc<S>, tokens: TokenService, hasher: PasswordHasher) -> Self {
        let credentials: Arc<dyn CredentialStore> = store.clone();
        Self {
            store,
            credentials,
            tokens,
            hasher,
        }
    }

    pub fn from_config<S: Store + 'static>(store: Arc<S>, config: &Config) -> Self {
        Self::new(
            store,
            TokenService::from_config(config),
            PasswordHasher::new(config.bcrypt_cost),
        )
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        let authenticator = Authenticator::new(self.tokens.clone(), Arc::clone(&self.credentials));

        cfg.app_data(web::Data::from(Arc::clone(&self.store)))
            .app_data(web::Data::new(self.tokens.clone()))
            .app_data(web::Data::new(self.hasher))
            .app_data(web::Data::new(authenticator))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, req| {
                debug!("unparseable path {}: {}", req.path(), err);
                AppError::NotFound(not_found_message(req.path()).into()).into()
            }));
    }
}

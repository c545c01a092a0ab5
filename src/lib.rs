#![doc = "The `todoforge` library crate."]
#![doc = ""]
#![doc = "Domain models, bearer-token authentication, per-row ownership checks, storage"]
#![doc = "backends, routing configuration and error handling for the TodoForge API."]
#![doc = "The binary (`main.rs`) loads configuration, picks a store and serves the app."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;

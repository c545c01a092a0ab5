use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use dotenv::dotenv;
use log::{error, info, warn};

use todoforge::config::Config;
use todoforge::routes::{self, health};
use todoforge::store::{MemoryStore, PgStore};
use todoforge::AppState;

fn startup_error(err: impl std::fmt::Display) -> std::io::Error {
    error!("{}", err);
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;

    let state = match config.database_url.as_deref() {
        Some(database_url) => {
            let store = PgStore::connect(database_url, config.database_max_connections)
                .await
                .map_err(startup_error)?;
            store.migrate().await.map_err(startup_error)?;
            info!("Connected to PostgreSQL and applied migrations");
            AppState::from_config(Arc::new(store), &config)
        }
        None => {
            warn!("DATABASE_URL is not set; data is kept in memory and lost on exit");
            AppState::from_config(Arc::new(MemoryStore::new()), &config)
        }
    };

    info!("Starting TodoForge server at {}", config.server_url());

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .configure(move |cfg| state.configure(cfg))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}

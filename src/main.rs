// src/main.rs
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};

use blogpost_be::config::{self, AppConfig};
use blogpost_be::handlers;
use blogpost_be::repositories::PgStore;
use blogpost_be::services::JwtKeys;
use blogpost_be::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let app_config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let pg_pool = match config::get_pg_pool() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create PG pool: {:#}", e);
            std::process::exit(1);
        }
    };

    let store = PgStore::new(pg_pool);
    if app_config.run_migrations {
        if let Err(e) = store.migrate().await {
            error!("Failed to apply migrations: {}", e);
            std::process::exit(1);
        }
    }

    let keys = JwtKeys::from_secret(&app_config.jwt_secret);
    let state = web::Data::new(AppState::new(
        Arc::new(store),
        keys.clone(),
        app_config.upload_dir.clone(),
    ));

    let allowed_origins = app_config.allowed_origins.clone();
    let bind_address = format!("0.0.0.0:{}", app_config.port);
    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["authorization", "content-type", "accept", "x-requested-with"])
            .supports_credentials()
            .max_age(3600);
        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        let keys = keys.clone();
        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(move |cfg| handlers::configure(cfg, &keys))
    })
    .bind(&bind_address)?
    .run()
    .await
}

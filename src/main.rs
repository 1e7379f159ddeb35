use actix_web::{middleware, web, App, HttpServer};
use marketfeedback::config::Config;
use marketfeedback::db::Database;
use std::io;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load().map_err(|e| {
        error!("Configuration error: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    // Initialize the database
    let db = Database::new(&config.database_path).map_err(|e| {
        error!("Failed to open database {}: {}", config.database_path, e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;
    db.create_schema().await.map_err(|e| {
        error!("Failed to create schema: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;
    info!("Schema created successfully!");

    let db = web::Data::new(db);
    info!("listening on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .wrap(middleware::Logger::default())
            .configure(marketfeedback::api::configure)
    })
    .bind(config.bind_addr())?
    .run()
    .await
}

// tithe-server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use tithe_server::{web, AppConfig, AppState};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting donation payment server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  let app_state = AppState::from_config(app_config.clone()).map_err(|e| {
    tracing::error!(error = %e, "Failed to initialise payment collaborators.");
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
  })?;

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(web::cors_policy(&app_state.config.cors_allowed_origins))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}

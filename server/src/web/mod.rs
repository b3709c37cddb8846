// tithe-server/src/web/mod.rs

pub mod handlers;
pub mod routes;

use actix_cors::Cors;
use actix_web::http::{header, Uri};

pub use routes::configure_app_routes;

/// CORS for the donation frontend. No configured origin means no cross-origin
/// access at all.
pub fn cors_policy(allowed_origins: &[String]) -> Cors {
  let mut cors = Cors::default()
    .allowed_methods(vec!["GET", "POST"])
    .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
    .supports_credentials()
    .max_age(3600);

  for origin in allowed_origins {
    if origin == "*" {
      cors = cors.allow_any_origin();
    } else if origin.parse::<Uri>().is_ok_and(|uri| uri.scheme().is_some() && uri.host().is_some()) {
      cors = cors.allowed_origin(origin);
    } else {
      tracing::warn!(%origin, "Ignoring malformed CORS origin.");
    }
  }
  cors
}

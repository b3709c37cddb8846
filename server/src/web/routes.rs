// tithe-server/src/web/routes.rs

use crate::errors::AppError;
use crate::web::handlers::{order_handlers, verification_handlers};
use actix_web::{web, HttpResponse};

async fn liveness_handler() -> HttpResponse {
  HttpResponse::Ok().content_type("text/plain; charset=utf-8").body("Server is running")
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  // Malformed bodies are answered as JSON like every other error.
  let json_config = web::JsonConfig::default()
    .limit(16 * 1024)
    .error_handler(|err, _req| AppError::Validation(format!("Invalid request body: {}", err)).into());

  cfg
    .app_data(json_config)
    .route("/", web::get().to(liveness_handler))
    .route(
      "/create-razorpay-order",
      web::post().to(order_handlers::create_order_handler),
    )
    .route(
      "/verify-payment",
      web::post().to(verification_handlers::verify_payment_handler),
    );
}

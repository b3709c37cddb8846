// tithe-server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct CreateOrderPayload {
  /// Minor currency units (paise for INR).
  pub amount: i64,
  pub currency: String,
  pub receipt: String,
}

#[instrument(
    name = "handler::create_order",
    skip(app_state, req_payload),
    fields(amount = req_payload.amount, currency = %req_payload.currency)
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CreateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let order = app_state
    .orders
    .create_order(payload.amount, &payload.currency, &payload.receipt)
    .await?;

  info!(order_id = %order.id, "Order ready for checkout.");
  Ok(HttpResponse::Ok().json(order))
}

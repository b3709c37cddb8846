// tithe-server/src/services/razorpay.rs

//! `PaymentProcessor` over the Razorpay orders API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tithe::{Order, OrderRequest, PaymentProcessor, TitheError, TitheResult};
use tracing::{debug, instrument, warn};

const SERVICE: &str = "razorpay";

pub struct RazorpayClient {
  key_id: String,
  key_secret: String,
  api_base: String,
  client: reqwest::Client,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
  error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
  #[serde(default)]
  code: String,
  #[serde(default)]
  description: String,
}

impl RazorpayClient {
  pub fn new(key_id: String, key_secret: String, api_base: &str, timeout: Duration) -> TitheResult<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| TitheError::upstream(SERVICE, e))?;
    Ok(Self {
      key_id,
      key_secret,
      api_base: api_base.trim_end_matches('/').to_string(),
      client,
    })
  }

  async fn read_order(&self, resp: reqwest::Response, order_id: Option<&str>) -> TitheResult<Order> {
    let status = resp.status();
    if status.is_success() {
      return resp.json::<Order>().await.map_err(|e| TitheError::upstream(SERVICE, e));
    }

    let body = resp.text().await.unwrap_or_default();
    let error = serde_json::from_str::<ErrorEnvelope>(&body).ok().map(|env| env.error);
    if let Some(order_id) = order_id {
      if is_missing_order(status, error.as_ref().map(|e| e.description.as_str())) {
        return Err(TitheError::NotFound {
          order_id: order_id.to_string(),
        });
      }
    }

    let (code, description) = error.map(|e| (e.code, e.description)).unwrap_or_default();
    warn!(%status, %code, %description, "Razorpay API error.");
    Err(TitheError::upstream(
      SERVICE,
      anyhow::anyhow!("Razorpay API error: {} {}", status, description),
    ))
  }
}

/// Razorpay answers unknown ids with either a 404 or a 400 whose description
/// says the id does not exist.
fn is_missing_order(status: StatusCode, description: Option<&str>) -> bool {
  match status {
    StatusCode::NOT_FOUND => true,
    StatusCode::BAD_REQUEST => description.is_some_and(|d| d.to_ascii_lowercase().contains("does not exist")),
    _ => false,
  }
}

/// Order ids are interpolated into the request path.
fn is_plausible_order_id(order_id: &str) -> bool {
  !order_id.is_empty() && order_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[async_trait]
impl PaymentProcessor for RazorpayClient {
  fn name(&self) -> &str {
    SERVICE
  }

  #[instrument(name = "razorpay::create_order", skip(self, request), fields(amount = request.amount, currency = %request.currency))]
  async fn create_order(&self, request: &OrderRequest) -> TitheResult<Order> {
    let resp = self
      .client
      .post(format!("{}/orders", self.api_base))
      .basic_auth(&self.key_id, Some(&self.key_secret))
      .json(request)
      .send()
      .await
      .map_err(|e| TitheError::upstream(SERVICE, e))?;
    debug!(status = %resp.status(), "Razorpay responded to order creation.");
    self.read_order(resp, None).await
  }

  #[instrument(name = "razorpay::fetch_order", skip(self))]
  async fn fetch_order(&self, order_id: &str) -> TitheResult<Order> {
    if !is_plausible_order_id(order_id) {
      return Err(TitheError::NotFound {
        order_id: order_id.to_string(),
      });
    }

    let resp = self
      .client
      .get(format!("{}/orders/{}", self.api_base, order_id))
      .basic_auth(&self.key_id, Some(&self.key_secret))
      .send()
      .await
      .map_err(|e| TitheError::upstream(SERVICE, e))?;
    debug!(status = %resp.status(), "Razorpay responded to order lookup.");
    self.read_order(resp, Some(order_id)).await
  }
}

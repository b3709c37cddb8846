// tithe/src/order.rs

//! Payment-processor orders and the service that creates and reads them back.
//!
//! `OrderService::create_order` trims and upper-cases the currency code
//! (`" inr "` goes out as `"INR"`); every other field reaches the processor
//! unchanged.

use crate::error::{TitheError, TitheResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// An order as the processor reports it. Amounts are in the minor currency unit.
///
/// The processor does not echo the capture mode back, so it only exists on
/// `OrderRequest`. Fields without a typed counterpart are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  pub id: String,
  #[serde(default = "default_entity")]
  pub entity: String,
  pub amount: u64,
  #[serde(default)]
  pub amount_paid: u64,
  #[serde(default)]
  pub amount_due: u64,
  pub currency: String,
  #[serde(default)]
  pub receipt: Option<String>,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub attempts: u32,
  #[serde(default)]
  pub notes: serde_json::Value,
  #[serde(default)]
  pub created_at: i64,
  #[serde(flatten)]
  pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_entity() -> String {
  "order".to_string()
}

/// Whether the processor captures an authorized payment on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
  #[default]
  Automatic,
  Manual,
}

// The processor API takes `payment_capture` as 1 or 0.
impl Serialize for CaptureMode {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      CaptureMode::Automatic => serializer.serialize_u8(1),
      CaptureMode::Manual => serializer.serialize_u8(0),
    }
  }
}

/// Body sent to the processor to open an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
  pub amount: u64,
  pub currency: String,
  pub receipt: String,
  pub payment_capture: CaptureMode,
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
  fn name(&self) -> &str;
  async fn create_order(&self, request: &OrderRequest) -> TitheResult<Order>;
  async fn fetch_order(&self, order_id: &str) -> TitheResult<Order>;
}

/// Thin wrapper over a `PaymentProcessor`. Each call goes out exactly once;
/// `create_order` is not idempotent, so callers must not retry it blindly.
pub struct OrderService {
  processor: Arc<dyn PaymentProcessor>,
}

impl OrderService {
  pub fn new(processor: Arc<dyn PaymentProcessor>) -> Self {
    Self { processor }
  }

  pub fn processor_name(&self) -> &str {
    self.processor.name()
  }

  #[instrument(name = "order_service::create_order", skip(self, receipt), fields(processor = %self.processor.name()), err(Display))]
  pub async fn create_order(&self, amount: i64, currency: &str, receipt: &str) -> TitheResult<Order> {
    if amount <= 0 {
      return Err(TitheError::InvalidOrder(format!("amount must be positive, got {}", amount)));
    }
    let currency = currency.trim();
    if currency.is_empty() {
      return Err(TitheError::InvalidOrder("currency must not be empty".to_string()));
    }

    let request = OrderRequest {
      amount: amount as u64,
      currency: currency.to_uppercase(),
      receipt: receipt.to_string(),
      payment_capture: CaptureMode::Automatic,
    };
    let order = self.processor.create_order(&request).await?;
    info!(order_id = %order.id, amount = order.amount, currency = %order.currency, "Order created.");
    Ok(order)
  }

  #[instrument(name = "order_service::fetch_order", skip(self), fields(processor = %self.processor.name()), err(Display))]
  pub async fn fetch_order(&self, order_id: &str) -> TitheResult<Order> {
    if order_id.trim().is_empty() {
      return Err(TitheError::NotFound {
        order_id: order_id.to_string(),
      });
    }

    let order = self.processor.fetch_order(order_id).await?;
    if order.id != order_id {
      warn!(returned_id = %order.id, "Processor answered with a different order.");
      return Err(TitheError::upstream(
        self.processor.name(),
        anyhow::anyhow!("requested order '{}' but received '{}'", order_id, order.id),
      ));
    }
    debug!(amount = order.amount, status = %order.status, "Order fetched.");
    Ok(order)
  }
}

// tithe-server/src/services/payment_mock.rs

//! In-memory stand-in for the payment processor, used for local runs
//! (`PAYMENT_PROCESSOR=mock`) and the HTTP tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tithe::{Order, OrderRequest, PaymentProcessor, TitheError, TitheResult};
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub struct MockProcessor {
  orders: Mutex<HashMap<String, Order>>,
  latency: Duration,
}

impl MockProcessor {
  pub fn new(latency: Duration) -> Self {
    Self {
      orders: Mutex::new(HashMap::new()),
      latency,
    }
  }

  /// Seeds an order as if it had been created earlier.
  pub fn insert(&self, order: Order) {
    self.orders.lock().insert(order.id.clone(), order);
  }

  pub fn order_count(&self) -> usize {
    self.orders.lock().len()
  }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
  fn name(&self) -> &str {
    "mock"
  }

  #[instrument(name = "mock_processor::create_order", skip(self, request), fields(amount = request.amount))]
  async fn create_order(&self, request: &OrderRequest) -> TitheResult<Order> {
    tokio::time::sleep(self.latency).await; // Simulate network latency

    // Arbitrary failure condition, lets callers exercise the upstream error path.
    if request.amount % 1000 == 123 {
      warn!("Simulated processor rejection.");
      return Err(TitheError::upstream(
        "mock",
        anyhow::anyhow!("simulated rejection for amount {}", request.amount),
      ));
    }

    let id = format!("order_{}", &Uuid::new_v4().simple().to_string()[..14]);
    let order = Order {
      id: id.clone(),
      entity: "order".to_string(),
      amount: request.amount,
      amount_paid: 0,
      amount_due: request.amount,
      currency: request.currency.clone(),
      receipt: Some(request.receipt.clone()),
      status: "created".to_string(),
      attempts: 0,
      notes: serde_json::json!([]),
      created_at: chrono::Utc::now().timestamp(),
      extra: Default::default(),
    };
    self.orders.lock().insert(id.clone(), order.clone());
    info!(order_id = %id, "Mock order created.");
    Ok(order)
  }

  #[instrument(name = "mock_processor::fetch_order", skip(self))]
  async fn fetch_order(&self, order_id: &str) -> TitheResult<Order> {
    tokio::time::sleep(self.latency).await;
    let found = self.orders.lock().get(order_id).cloned();
    found.ok_or_else(|| TitheError::NotFound {
      order_id: order_id.to_string(),
    })
  }
}

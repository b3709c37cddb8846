// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use tithe::{
  ContextData, Donor, EmailMessage, Notifier, Order, OrderRequest, PaymentCallback, PaymentProcessor,
  PipelineControl, TitheError, TitheResult,
};
use tracing::Level;

pub const TEST_SECRET: &[u8] = b"test_signing_secret";

// --- Pipeline test context ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Tithe error: {0}")]
  Tithe(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<TitheError> for TestError {
  fn from(err: TitheError) -> Self {
    TestError::Tithe(format!("{:?}", err))
  }
}

pub type TestHandlerFuture = Pin<Box<dyn Future<Output = Result<PipelineControl, TestError>> + Send>>;

pub fn create_simple_handler(
  step_name: &'static str,
  message_to_append: &'static str,
) -> impl Fn(ContextData<TestContext>) -> TestHandlerFuture + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| -> TestHandlerFuture {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.steps_executed.push(step_name.to_string());
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  }
}

pub fn create_failing_handler(
  step_name: &'static str,
  error_message: &'static str,
) -> impl Fn(ContextData<TestContext>) -> TestHandlerFuture + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| -> TestHandlerFuture {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(error_message.to_string()))
    })
  }
}

// --- Tracing setup (once per test binary) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Orders and callbacks ---
pub fn sample_order(id: &str, amount: u64) -> Order {
  Order {
    id: id.to_string(),
    entity: "order".to_string(),
    amount,
    amount_paid: 0,
    amount_due: amount,
    currency: "INR".to_string(),
    receipt: Some("r1".to_string()),
    status: "created".to_string(),
    attempts: 0,
    notes: serde_json::json!([]),
    created_at: 1_700_000_000,
    extra: Default::default(),
  }
}

pub fn donor() -> Donor {
  Donor {
    email: "donor@example.org".to_string(),
    name: "Asha".to_string(),
    mobile: "9876543210".to_string(),
    role: "Volunteer".to_string(),
  }
}

pub fn signed_callback(order_id: &str, payment_id: &str) -> PaymentCallback {
  PaymentCallback {
    order_id: order_id.to_string(),
    payment_id: payment_id.to_string(),
    signature: tithe::signature::expected_signature(order_id, payment_id, TEST_SECRET).unwrap(),
    donor: donor(),
  }
}

// --- Fake payment processor ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchBehaviour {
  Normal,
  Outage,
  /// Answers with an order whose id differs from the requested one.
  WrongOrder,
}

pub struct FakeProcessor {
  orders: Mutex<HashMap<String, Order>>,
  next_ids: Mutex<Vec<String>>,
  pub create_requests: Mutex<Vec<OrderRequest>>,
  pub create_calls: AtomicUsize,
  pub fetch_calls: AtomicUsize,
  fetch_behaviour: FetchBehaviour,
  reject_creates: bool,
}

impl FakeProcessor {
  pub fn new() -> Self {
    Self {
      orders: Mutex::new(HashMap::new()),
      next_ids: Mutex::new(Vec::new()),
      create_requests: Mutex::new(Vec::new()),
      create_calls: AtomicUsize::new(0),
      fetch_calls: AtomicUsize::new(0),
      fetch_behaviour: FetchBehaviour::Normal,
      reject_creates: false,
    }
  }

  pub fn with_order(self, order: Order) -> Self {
    self.orders.lock().insert(order.id.clone(), order);
    self
  }

  /// Ids handed out by subsequent `create_order` calls, in order.
  pub fn with_next_ids(self, ids: &[&str]) -> Self {
    *self.next_ids.lock() = ids.iter().rev().map(|s| s.to_string()).collect();
    self
  }

  pub fn with_fetch_behaviour(mut self, behaviour: FetchBehaviour) -> Self {
    self.fetch_behaviour = behaviour;
    self
  }

  pub fn rejecting_creates(mut self) -> Self {
    self.reject_creates = true;
    self
  }

  pub fn creates(&self) -> usize {
    self.create_calls.load(Ordering::SeqCst)
  }

  pub fn fetches(&self) -> usize {
    self.fetch_calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl PaymentProcessor for FakeProcessor {
  fn name(&self) -> &str {
    "fake"
  }

  async fn create_order(&self, request: &OrderRequest) -> TitheResult<Order> {
    let n = self.create_calls.fetch_add(1, Ordering::SeqCst);
    self.create_requests.lock().push(request.clone());
    if self.reject_creates {
      return Err(TitheError::upstream("fake", anyhow::anyhow!("authentication failed")));
    }
    let id = self.next_ids.lock().pop().unwrap_or_else(|| format!("order_{:04}", n));
    let mut order = sample_order(&id, request.amount);
    order.currency = request.currency.clone();
    order.receipt = Some(request.receipt.clone());
    self.orders.lock().insert(id, order.clone());
    Ok(order)
  }

  async fn fetch_order(&self, order_id: &str) -> TitheResult<Order> {
    self.fetch_calls.fetch_add(1, Ordering::SeqCst);
    match self.fetch_behaviour {
      FetchBehaviour::Outage => Err(TitheError::upstream("fake", anyhow::anyhow!("connection reset"))),
      FetchBehaviour::WrongOrder => Ok(sample_order("order_somebody_else", 1)),
      FetchBehaviour::Normal => self.orders.lock().get(order_id).cloned().ok_or_else(|| TitheError::NotFound {
        order_id: order_id.to_string(),
      }),
    }
  }
}

// --- Fake notification channels ---
#[derive(Default)]
pub struct RecordingNotifier {
  pub sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingNotifier {
  pub fn count(&self) -> usize {
    self.sent.lock().len()
  }
}

#[async_trait]
impl Notifier for RecordingNotifier {
  async fn send(&self, message: EmailMessage) -> TitheResult<()> {
    self.sent.lock().push(message);
    Ok(())
  }
}

#[derive(Default)]
pub struct FailingNotifier {
  pub calls: AtomicUsize,
}

#[async_trait]
impl Notifier for FailingNotifier {
  async fn send(&self, _message: EmailMessage) -> TitheResult<()> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Err(TitheError::notification(anyhow::anyhow!("mail relay unreachable")))
  }
}

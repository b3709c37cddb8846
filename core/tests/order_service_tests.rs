// tests/order_service_tests.rs
mod common;

use common::*;
use std::sync::Arc;
use tithe::{CaptureMode, OrderService, TitheError};

fn service(processor: &Arc<FakeProcessor>) -> OrderService {
  OrderService::new(processor.clone())
}

#[tokio::test]
async fn test_create_order_delegates_once_with_auto_capture() {
  setup_tracing();
  let processor = Arc::new(FakeProcessor::new().with_next_ids(&["order_abc"]));
  let order = service(&processor).create_order(500, " inr ", "r1").await.unwrap();

  assert_eq!(order.id, "order_abc");
  assert_eq!(order.amount, 500);
  assert_eq!(processor.creates(), 1);

  let requests = processor.create_requests.lock();
  assert_eq!(requests[0].currency, "INR");
  assert_eq!(requests[0].receipt, "r1");
  assert_eq!(requests[0].payment_capture, CaptureMode::Automatic);
}

#[tokio::test]
async fn test_each_create_opens_a_new_order() {
  setup_tracing();
  let processor = Arc::new(FakeProcessor::new());
  let svc = service(&processor);
  let first = svc.create_order(100, "INR", "same").await.unwrap();
  let second = svc.create_order(100, "INR", "same").await.unwrap();

  assert_ne!(first.id, second.id);
  assert_eq!(processor.creates(), 2);
}

#[tokio::test]
async fn test_non_positive_amount_and_blank_currency_never_reach_the_processor() {
  setup_tracing();
  let processor = Arc::new(FakeProcessor::new());
  let svc = service(&processor);

  for (amount, currency) in [(0, "INR"), (-500, "INR"), (500, ""), (500, "   ")] {
    let err = svc.create_order(amount, currency, "r1").await.unwrap_err();
    assert!(matches!(err, TitheError::InvalidOrder(_)), "{} {:?} gave {:?}", amount, currency, err);
  }
  assert_eq!(processor.creates(), 0);
}

#[tokio::test]
async fn test_processor_rejection_surfaces_as_upstream_error() {
  setup_tracing();
  let processor = Arc::new(FakeProcessor::new().rejecting_creates());
  let err = service(&processor).create_order(500, "INR", "r1").await.unwrap_err();

  assert!(matches!(err, TitheError::UpstreamUnavailable { .. }));
  assert_eq!(processor.creates(), 1);
}

#[tokio::test]
async fn test_fetch_returns_the_processor_record() {
  setup_tracing();
  let processor = Arc::new(FakeProcessor::new().with_order(sample_order("order_abc", 500)));
  let order = service(&processor).fetch_order("order_abc").await.unwrap();

  assert_eq!(order, sample_order("order_abc", 500));
  assert_eq!(processor.fetches(), 1);
}

#[tokio::test]
async fn test_fetch_unknown_order_is_not_found() {
  setup_tracing();
  let processor = Arc::new(FakeProcessor::new());
  let err = service(&processor).fetch_order("order_missing").await.unwrap_err();
  assert!(err.is_not_found());
}

#[tokio::test]
async fn test_fetch_blank_id_is_not_found_without_a_call() {
  setup_tracing();
  let processor = Arc::new(FakeProcessor::new());
  let err = service(&processor).fetch_order("  ").await.unwrap_err();

  assert!(err.is_not_found());
  assert_eq!(processor.fetches(), 0);
}

#[tokio::test]
async fn test_fetch_outage_is_upstream_error() {
  setup_tracing();
  let processor = Arc::new(FakeProcessor::new().with_fetch_behaviour(FetchBehaviour::Outage));
  let err = service(&processor).fetch_order("order_abc").await.unwrap_err();
  assert!(matches!(err, TitheError::UpstreamUnavailable { .. }));
}

#[tokio::test]
async fn test_fetch_answer_for_another_order_is_rejected() {
  setup_tracing();
  let processor = Arc::new(FakeProcessor::new().with_fetch_behaviour(FetchBehaviour::WrongOrder));
  let err = service(&processor).fetch_order("order_abc").await.unwrap_err();
  assert!(matches!(err, TitheError::UpstreamUnavailable { .. }));
}

#[test]
fn test_order_request_serializes_capture_as_integer() {
  let request = tithe::OrderRequest {
    amount: 500,
    currency: "INR".to_string(),
    receipt: "r1".to_string(),
    payment_capture: CaptureMode::Automatic,
  };
  let json = serde_json::to_value(&request).unwrap();
  assert_eq!(
    json,
    serde_json::json!({"amount": 500, "currency": "INR", "receipt": "r1", "payment_capture": 1})
  );
}

#[test]
fn test_order_deserializes_processor_payload() {
  let payload = serde_json::json!({
    "id": "order_IluGWxBm9U8zJ8",
    "entity": "order",
    "amount": 5000,
    "amount_paid": 0,
    "amount_due": 5000,
    "currency": "INR",
    "receipt": "rcptid_11",
    "offer_id": null,
    "status": "created",
    "attempts": 0,
    "notes": [],
    "created_at": 1642662092
  });
  let order: tithe::Order = serde_json::from_value(payload).unwrap();
  assert_eq!(order.id, "order_IluGWxBm9U8zJ8");
  assert_eq!(order.amount, 5000);
  assert_eq!(order.receipt.as_deref(), Some("rcptid_11"));
  assert_eq!(order.status, "created");
}

#[test]
fn test_order_keeps_fields_it_does_not_model() {
  let raw = serde_json::json!({
    "id": "order_IluGWxBm9U8zJ8",
    "entity": "order",
    "amount": 5000,
    "amount_paid": 0,
    "amount_due": 5000,
    "currency": "INR",
    "receipt": "rcptid_11",
    "offer_id": "offer_1",
    "status": "created",
    "attempts": 0,
    "notes": {"campaign": "winter"},
    "created_at": 1642662092,
    "partial_payment": false
  });
  let order: tithe::Order = serde_json::from_value(raw.clone()).unwrap();
  assert_eq!(order.extra.get("offer_id"), Some(&serde_json::json!("offer_1")));

  let back = serde_json::to_value(&order).unwrap();
  assert_eq!(back, raw);
}

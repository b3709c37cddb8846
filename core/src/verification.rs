// tithe/src/verification.rs

//! Verification of payment callbacks.
//!
//! A callback moves through three steps and ends in exactly one of three
//! states:
//!
//! 1. `verify_signature`: a bad signature rejects the callback. Nothing else
//!    runs, so the processor is never asked about the order and no receipt
//!    goes out.
//! 2. `fetch_order`: the order is read back from the processor. If it cannot
//!    be found or the processor is unreachable, the payment could not be
//!    confirmed and the run stops there.
//! 3. `send_receipt`: a receipt built from the fetched order is sent. A
//!    delivery failure is recorded on the outcome and never turns a verified
//!    payment into a rejected one.
//!
//! Callbacks are not deduplicated: verifying the same callback twice sends
//! two receipts.

use crate::core::{ContextData, PipelineControl, PipelineResult};
use crate::error::{TitheError, TitheResult};
use crate::notification::{Donor, Notifier, ReceiptNotification};
use crate::order::{Order, OrderService};
use crate::pipeline::Pipeline;
use crate::signature::{self, SigningSecret};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const STEP_VERIFY_SIGNATURE: &str = "verify_signature";
pub const STEP_FETCH_ORDER: &str = "fetch_order";
pub const STEP_SEND_RECEIPT: &str = "send_receipt";

/// The untrusted callback relayed after checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentCallback {
  pub order_id: String,
  pub payment_id: String,
  pub signature: String,
  pub donor: Donor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
  BadSignature,
  OrderNotFound,
  ProcessorUnavailable,
}

impl RejectionReason {
  /// The signature was valid but the processor did not confirm the order.
  pub fn is_unconfirmed(&self) -> bool {
    matches!(self, RejectionReason::OrderNotFound | RejectionReason::ProcessorUnavailable)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      RejectionReason::BadSignature => "bad-signature",
      RejectionReason::OrderNotFound => "order-not-found",
      RejectionReason::ProcessorUnavailable => "processor-unavailable",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
  Sent,
  Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
  Verified {
    order_id: String,
    payment_id: String,
    /// From the processor's order record, minor units.
    amount: u64,
    currency: String,
    receipt: ReceiptStatus,
  },
  Rejected {
    reason: RejectionReason,
  },
}

impl VerificationOutcome {
  pub fn is_verified(&self) -> bool {
    matches!(self, VerificationOutcome::Verified { .. })
  }
}

/// Per-run state shared by the verification steps.
#[derive(Debug, Clone)]
pub struct VerificationCtxData {
  pub callback: PaymentCallback,
  pub signature_valid: bool,
  pub order: Option<Order>,
  pub rejection: Option<RejectionReason>,
  pub receipt: Option<ReceiptStatus>,
}

impl VerificationCtxData {
  pub fn new(callback: PaymentCallback) -> Self {
    Self {
      callback,
      signature_valid: false,
      order: None,
      rejection: None,
      receipt: None,
    }
  }
}

pub struct PaymentVerifier {
  pipeline: Pipeline<VerificationCtxData, TitheError>,
}

impl PaymentVerifier {
  /// Builds the verification pipeline once. `organization` is the name printed
  /// on receipts.
  pub fn new(
    secret: SigningSecret,
    orders: Arc<OrderService>,
    notifier: Arc<dyn Notifier>,
    organization: impl Into<String>,
  ) -> Self {
    let organization: Arc<str> = Arc::from(organization.into());
    let mut p = Pipeline::<VerificationCtxData, TitheError>::new(&[
      (STEP_VERIFY_SIGNATURE, false),
      (STEP_FETCH_ORDER, false),
      (STEP_SEND_RECEIPT, true),
    ]);

    p.on_step(STEP_VERIFY_SIGNATURE, move |ctx_data: ContextData<VerificationCtxData>| {
      let secret = secret.clone();
      async move {
        let (valid, order_id) = {
          let guard = ctx_data.read();
          let cb = &guard.callback;
          (
            signature::verify(&cb.order_id, &cb.payment_id, &cb.signature, secret.expose()),
            cb.order_id.clone(),
          )
        };

        let mut guard = ctx_data.write();
        if !valid {
          warn!(order_id = %order_id, "Callback signature rejected.");
          guard.rejection = Some(RejectionReason::BadSignature);
          return Ok::<_, TitheError>(PipelineControl::Stop);
        }
        guard.signature_valid = true;
        Ok(PipelineControl::Continue)
      }
    });

    p.on_step(STEP_FETCH_ORDER, move |ctx_data: ContextData<VerificationCtxData>| {
      let orders = orders.clone();
      async move {
        let order_id = ctx_data.read().callback.order_id.clone();

        match orders.fetch_order(&order_id).await {
          Ok(order) => {
            ctx_data.write().order = Some(order);
            Ok::<_, TitheError>(PipelineControl::Continue)
          }
          Err(e) => {
            let reason = if e.is_not_found() {
              RejectionReason::OrderNotFound
            } else {
              RejectionReason::ProcessorUnavailable
            };
            warn!(order_id = %order_id, error = %e, reason = reason.as_str(), "Payment could not be confirmed with the processor.");
            ctx_data.write().rejection = Some(reason);
            Ok(PipelineControl::Stop)
          }
        }
      }
    });

    p.on_step(STEP_SEND_RECEIPT, move |ctx_data: ContextData<VerificationCtxData>| {
      let notifier = notifier.clone();
      let organization = organization.clone();
      async move {
        let receipt = {
          let guard = ctx_data.read();
          match (&guard.order, guard.signature_valid) {
            (Some(order), true) => {
              ReceiptNotification::for_order(order, &guard.callback.payment_id, guard.callback.donor.clone(), Utc::now())
            }
            _ => {
              return Err(TitheError::Internal(
                "receipt step reached without a verified, fetched order".to_string(),
              ))
            }
          }
        };

        let status = if receipt.donor.email.trim().is_empty() {
          warn!(order_id = %receipt.order_id, "No donor email on callback; receipt not sent.");
          ReceiptStatus::Failed
        } else {
          match notifier.send(receipt.to_email(&organization)).await {
            Ok(()) => {
              info!(order_id = %receipt.order_id, payment_id = %receipt.payment_id, "Receipt sent.");
              ReceiptStatus::Sent
            }
            Err(e) => {
              warn!(order_id = %receipt.order_id, error = %e, "Receipt could not be sent; payment stays verified.");
              ReceiptStatus::Failed
            }
          }
        };

        ctx_data.write().receipt = Some(status);
        Ok(PipelineControl::Continue)
      }
    });

    Self { pipeline: p }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.pipeline.step_names()
  }

  #[instrument(
    name = "PaymentVerifier::verify",
    skip(self, callback),
    fields(order_id = %callback.order_id, payment_id = %callback.payment_id),
    err(Display)
  )]
  pub async fn verify(&self, callback: PaymentCallback) -> TitheResult<VerificationOutcome> {
    let ctx_data = ContextData::new(VerificationCtxData::new(callback));
    let result = self.pipeline.run(ctx_data.clone()).await?;

    let guard = ctx_data.read();
    if let Some(reason) = guard.rejection {
      return Ok(VerificationOutcome::Rejected { reason });
    }
    match (result, &guard.order) {
      (PipelineResult::Completed, Some(order)) if guard.signature_valid => Ok(VerificationOutcome::Verified {
        order_id: order.id.clone(),
        payment_id: guard.callback.payment_id.clone(),
        amount: order.amount,
        currency: order.currency.clone(),
        receipt: guard.receipt.unwrap_or(ReceiptStatus::Failed),
      }),
      _ => Err(TitheError::Internal(format!(
        "verification ended ({:?}) without a verdict",
        result
      ))),
    }
  }
}

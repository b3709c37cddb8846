// tithe/src/lib.rs

//! Tithe: the payment-order lifecycle behind a donation service.
//!
//!  - Orders are opened with, and read back from, a payment processor
//!    through the `PaymentProcessor` trait wrapped by `OrderService`.
//!  - Payment callbacks are authenticated with an HMAC-SHA256 signature over
//!    `order_id|payment_id` (see `signature`).
//!  - `PaymentVerifier` runs each callback through a step pipeline: verify
//!    the signature, confirm the order with the processor, send a receipt
//!    through a `Notifier`. Receipt delivery failures never downgrade a
//!    verified payment.
//!
//! Collaborators (processor client, mail transport) are injected, so the
//! whole flow runs against fakes in tests.

pub mod core;
pub mod error;
pub mod notification;
pub mod order;
pub mod pipeline;
pub mod signature;
pub mod verification;

// --- Re-exports for the Public API ---

pub use crate::core::{ContextData, PipelineControl, PipelineResult, StepDef};
pub use crate::pipeline::{Handler, Pipeline};

pub use crate::error::{TitheError, TitheResult};
pub use crate::notification::{Donor, EmailMessage, Notifier, ReceiptNotification};
pub use crate::order::{CaptureMode, Order, OrderRequest, OrderService, PaymentProcessor};
pub use crate::signature::SigningSecret;
pub use crate::verification::{
  PaymentCallback, PaymentVerifier, ReceiptStatus, RejectionReason, VerificationCtxData, VerificationOutcome,
};

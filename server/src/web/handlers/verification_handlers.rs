// tithe-server/src/web/handlers/verification_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::state::AppState;
use tithe::{Donor, PaymentCallback, ReceiptStatus, RejectionReason, VerificationOutcome};

// Not `Debug`: the signature is never logged.
#[derive(Deserialize)]
pub struct VerifyPaymentPayload {
  #[serde(default, deserialize_with = "lenient_string")]
  pub razorpay_order_id: String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub razorpay_payment_id: String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub razorpay_signature: String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub email: String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub name: String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub mobile: String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub role: String,
}

impl From<VerifyPaymentPayload> for PaymentCallback {
  fn from(p: VerifyPaymentPayload) -> Self {
    PaymentCallback {
      order_id: p.razorpay_order_id,
      payment_id: p.razorpay_payment_id,
      signature: p.razorpay_signature,
      donor: Donor {
        email: p.email,
        name: p.name,
        mobile: p.mobile,
        role: p.role,
      },
    }
  }
}

/// Frontends send mobile numbers as either strings or numbers.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
  Ok(match Option::<Value>::deserialize(deserializer)? {
    None | Some(Value::Null) => String::new(),
    Some(Value::String(s)) => s,
    Some(other) => other.to_string(),
  })
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
  pub verified: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email_sent: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub confirmed: Option<bool>,
}

pub fn verification_response(outcome: &VerificationOutcome) -> (StatusCode, VerificationResponse) {
  match outcome {
    VerificationOutcome::Verified { receipt, .. } => (
      StatusCode::OK,
      VerificationResponse {
        verified: true,
        email_sent: (*receipt == ReceiptStatus::Failed).then_some(false),
        confirmed: None,
      },
    ),
    VerificationOutcome::Rejected {
      reason: RejectionReason::BadSignature,
    } => (
      StatusCode::BAD_REQUEST,
      VerificationResponse {
        verified: false,
        email_sent: None,
        confirmed: None,
      },
    ),
    VerificationOutcome::Rejected { .. } => (
      StatusCode::BAD_GATEWAY,
      VerificationResponse {
        verified: false,
        email_sent: None,
        confirmed: Some(false),
      },
    ),
  }
}

#[instrument(
    name = "handler::verify_payment",
    skip(app_state, req_payload),
    fields(order_id = %req_payload.razorpay_order_id, payment_id = %req_payload.razorpay_payment_id)
)]
pub async fn verify_payment_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<VerifyPaymentPayload>,
) -> HttpResponse {
  let callback = PaymentCallback::from(req_payload.into_inner());

  match app_state.verifier.verify(callback).await {
    Ok(outcome) => {
      let (status, body) = verification_response(&outcome);
      info!(%status, verified = body.verified, "Payment callback handled.");
      HttpResponse::build(status).json(body)
    }
    Err(e) => {
      error!(error = %e, "Verification pipeline failed.");
      HttpResponse::InternalServerError().json(VerificationResponse {
        verified: false,
        email_sent: None,
        confirmed: None,
      })
    }
  }
}

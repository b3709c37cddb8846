// tithe/src/signature.rs

//! Payment callback signatures.
//!
//! The processor signs `"{order_id}|{payment_id}"` with HMAC-SHA256 under a
//! secret shared only with this service and sends the lowercase hex digest
//! back with the payment. A callback is authentic iff recomputing that digest
//! gives exactly the signature supplied.

use crate::error::{TitheError, TitheResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Pre-shared signing secret. Never printed, never derived from request data.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
  pub fn new(secret: impl Into<Vec<u8>>) -> Self {
    SigningSecret(secret.into())
  }

  pub fn expose(&self) -> &[u8] {
    &self.0
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl std::fmt::Debug for SigningSecret {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("SigningSecret([REDACTED])")
  }
}

fn canonical_message(order_id: &str, payment_id: &str) -> String {
  format!("{}|{}", order_id, payment_id)
}

/// Lowercase hex HMAC-SHA256 of `order_id|payment_id` under `secret`.
pub fn expected_signature(order_id: &str, payment_id: &str, secret: &[u8]) -> TitheResult<String> {
  let mut mac = HmacSha256::new_from_slice(secret)
    .map_err(|e| TitheError::Internal(format!("HMAC key rejected: {}", e)))?;
  mac.update(canonical_message(order_id, payment_id).as_bytes());
  Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a callback signature. Never fails: any empty input, a signature of
/// the wrong length or any differing byte gives `false`.
pub fn verify(order_id: &str, payment_id: &str, signature: &str, secret: &[u8]) -> bool {
  if order_id.is_empty() || payment_id.is_empty() || signature.is_empty() || secret.is_empty() {
    return false;
  }
  match expected_signature(order_id, payment_id, secret) {
    Ok(expected) => expected.as_bytes().ct_eq(signature.as_bytes()).into(),
    Err(_) => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn digest_is_lowercase_hex_of_expected_length() {
    let sig = expected_signature("order_abc", "pay_xyz", b"secret").unwrap();
    assert_eq!(sig.len(), 64);
    assert!(sig.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
  }

  #[test]
  fn separator_is_part_of_the_message() {
    let joined = expected_signature("order_a", "bpay", b"k").unwrap();
    let split_differently = expected_signature("order_ab", "pay", b"k").unwrap();
    assert_ne!(joined, split_differently);
  }

  #[test]
  fn uppercase_signature_is_rejected() {
    let sig = expected_signature("order_abc", "pay_xyz", b"secret").unwrap();
    assert!(!verify("order_abc", "pay_xyz", &sig.to_uppercase(), b"secret"));
  }

  #[test]
  fn secret_debug_is_redacted() {
    let secret = SigningSecret::new("rzp_test_secret");
    assert_eq!(format!("{:?}", secret), "SigningSecret([REDACTED])");
  }
}

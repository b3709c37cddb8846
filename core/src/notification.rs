// tithe/src/notification.rs

//! Donor receipts and the channel they are sent through.

use crate::error::TitheResult;
use crate::order::Order;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Donor-supplied details carried on the payment callback. Untrusted; only
/// ever echoed back to the donor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donor {
  pub email: String,
  pub name: String,
  pub mobile: String,
  pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
  pub to: String,
  pub subject: String,
  pub html_body: String,
  pub text_body: String,
}

/// Capability to deliver one email. Implementations attempt delivery exactly
/// once and report failure as `TitheError::Notification`.
#[async_trait]
pub trait Notifier: Send + Sync {
  async fn send(&self, message: EmailMessage) -> TitheResult<()>;
}

/// Receipt for a verified payment.
///
/// Built from the processor's order record, never from amounts the caller
/// supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptNotification {
  pub payment_id: String,
  pub order_id: String,
  pub amount_minor: u64,
  pub currency: String,
  pub donor: Donor,
  pub issued_at: DateTime<Utc>,
}

impl ReceiptNotification {
  pub fn for_order(order: &Order, payment_id: &str, donor: Donor, issued_at: DateTime<Utc>) -> Self {
    Self {
      payment_id: payment_id.to_string(),
      order_id: order.id.clone(),
      amount_minor: order.amount,
      currency: order.currency.clone(),
      donor,
      issued_at,
    }
  }

  /// Amount in the major unit, e.g. `₹5.00` for 500 paise, `JPY 500` for
  /// 500 yen, `KWD 1.250` for 1250 fils.
  pub fn amount_display(&self) -> String {
    let exponent = minor_unit_exponent(&self.currency);
    let major = if exponent == 0 {
      self.amount_minor.to_string()
    } else {
      let scale = 10u64.pow(exponent);
      format!(
        "{}.{:0width$}",
        self.amount_minor / scale,
        self.amount_minor % scale,
        width = exponent as usize
      )
    };
    match self.currency.as_str() {
      "INR" => format!("₹{}", major),
      other => format!("{} {}", other, major),
    }
  }

  pub fn to_email(&self, organization: &str) -> EmailMessage {
    let date = self.issued_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let amount = self.amount_display();
    let rows = [
      ("Payment ID", self.payment_id.as_str()),
      ("Order ID", self.order_id.as_str()),
      ("Amount", amount.as_str()),
      ("Name", self.donor.name.as_str()),
      ("Mobile", self.donor.mobile.as_str()),
      ("Role", self.donor.role.as_str()),
      ("Date", date.as_str()),
    ];

    let html_rows: String = rows
      .iter()
      .map(|(label, value)| {
        format!(
          "<tr><td style=\"padding: 10px; border: 1px solid #ddd;\"><strong>{}:</strong></td>\
           <td style=\"padding: 10px; border: 1px solid #ddd;\">{}</td></tr>",
          label,
          escape_html(value)
        )
      })
      .collect();
    let organization_html = escape_html(organization);
    let html_body = format!(
      "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
       <h1 style=\"color: #4a4a4a;\">Payment Receipt</h1>\
       <p>Dear valued donor,</p>\
       <p>Thank you for your generous donation to {org}. Your support is greatly appreciated.</p>\
       <table style=\"width: 100%; border-collapse: collapse; margin-top: 20px;\">{rows}</table>\
       <p style=\"margin-top: 20px;\">If you have any questions, please don't hesitate to contact us.</p>\
       <p>Best regards,<br>{org} Team</p></div>",
      org = organization_html,
      rows = html_rows
    );

    let text_rows: Vec<String> = rows.iter().map(|(label, value)| format!("{}: {}", label, value)).collect();
    let text_body = format!(
      "Thank you for your generous donation to {}.\n\n{}\n",
      organization,
      text_rows.join("\n")
    );

    EmailMessage {
      to: self.donor.email.clone(),
      subject: format!("Payment Receipt - {}", organization),
      html_body,
      text_body,
    }
  }
}

/// ISO 4217 minor-unit digits; currencies not listed use two.
fn minor_unit_exponent(currency: &str) -> u32 {
  match currency {
    "BIF" | "CLP" | "DJF" | "GNF" | "ISK" | "JPY" | "KMF" | "KRW" | "PYG" | "RWF" | "UGX" | "VND" | "VUV"
    | "XAF" | "XOF" | "XPF" => 0,
    "BHD" | "IQD" | "JOD" | "KWD" | "LYD" | "OMR" | "TND" => 3,
    _ => 2,
  }
}

fn escape_html(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for c in raw.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}

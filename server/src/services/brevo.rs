// tithe-server/src/services/brevo.rs
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tithe::{EmailMessage, Notifier, TitheError, TitheResult};
use tracing::{info, instrument, warn};

/// `Notifier` over Brevo's transactional email endpoint.
pub struct BrevoMailer {
  api_key: String,
  api_base: String,
  sender: Contact,
  client: reqwest::Client,
}

#[derive(Debug, Clone, Serialize)]
struct Contact {
  email: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody<'a> {
  sender: &'a Contact,
  to: Vec<Contact>,
  subject: &'a str,
  html_content: &'a str,
  text_content: &'a str,
}

impl BrevoMailer {
  pub fn new(
    api_key: String,
    api_base: &str,
    sender_email: String,
    sender_name: String,
    timeout: Duration,
  ) -> TitheResult<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(TitheError::notification)?;
    Ok(Self {
      api_key,
      api_base: api_base.trim_end_matches('/').to_string(),
      sender: Contact {
        email: sender_email,
        name: Some(sender_name),
      },
      client,
    })
  }
}

#[async_trait]
impl Notifier for BrevoMailer {
  #[instrument(name = "brevo::send", skip(self, message), fields(subject = %message.subject))]
  async fn send(&self, message: EmailMessage) -> TitheResult<()> {
    let body = SendEmailBody {
      sender: &self.sender,
      to: vec![Contact {
        email: message.to.clone(),
        name: None,
      }],
      subject: &message.subject,
      html_content: &message.html_body,
      text_content: &message.text_body,
    };

    let resp = self
      .client
      .post(format!("{}/smtp/email", self.api_base))
      .header("api-key", &self.api_key)
      .json(&body)
      .send()
      .await
      .map_err(TitheError::notification)?;

    let status = resp.status();
    if !status.is_success() {
      let detail = resp.text().await.unwrap_or_default();
      warn!(%status, %detail, "Brevo rejected the email.");
      return Err(TitheError::notification(anyhow::anyhow!("Brevo API error: {}", status)));
    }
    info!("Email accepted by Brevo.");
    Ok(())
  }
}

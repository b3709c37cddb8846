// tithe-server/src/services/email_mock.rs
use async_trait::async_trait;
use tithe::{EmailMessage, Notifier, TitheResult};
use tracing::info;

/// Mail transport that only records what would have been sent.
pub struct LogMailer {
  from: String,
}

impl LogMailer {
  pub fn new(from: impl Into<String>) -> Self {
    Self { from: from.into() }
  }
}

#[async_trait]
impl Notifier for LogMailer {
  async fn send(&self, message: EmailMessage) -> TitheResult<()> {
    let message_id = format!("log_email_{}", uuid::Uuid::new_v4());
    info!(
      to = %message.to,
      from = %self.from,
      subject = %message.subject,
      body_len = message.html_body.len(),
      %message_id,
      "Receipt email logged (MAIL_TRANSPORT=log)."
    );
    Ok(())
  }
}

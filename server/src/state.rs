// tithe-server/src/state.rs
use crate::config::{AppConfig, MailTransport, ProcessorKind};
use crate::errors::{AppError, Result};
use crate::services::{BrevoMailer, LogMailer, MockProcessor, RazorpayClient};
use std::sync::Arc;
use std::time::Duration;
use tithe::{Notifier, OrderService, PaymentProcessor, PaymentVerifier};

#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  pub orders: Arc<OrderService>,
  pub verifier: Arc<PaymentVerifier>,
}

impl AppState {
  /// Wires the core services around explicit collaborators.
  pub fn new(config: Arc<AppConfig>, processor: Arc<dyn PaymentProcessor>, notifier: Arc<dyn Notifier>) -> Self {
    let orders = Arc::new(OrderService::new(processor));
    let verifier = Arc::new(PaymentVerifier::new(
      config.signature_secret.clone(),
      orders.clone(),
      notifier,
      config.organization_name.clone(),
    ));
    Self {
      config,
      orders,
      verifier,
    }
  }

  /// Builds the collaborators selected by the configuration.
  pub fn from_config(config: Arc<AppConfig>) -> Result<Self> {
    let processor: Arc<dyn PaymentProcessor> = match config.processor {
      ProcessorKind::Razorpay => Arc::new(RazorpayClient::new(
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
        &config.razorpay_api_base,
        config.upstream_timeout,
      )?),
      ProcessorKind::Mock => Arc::new(MockProcessor::new(Duration::from_millis(50))),
    };

    let notifier: Arc<dyn Notifier> = match config.mail_transport {
      MailTransport::Log => Arc::new(LogMailer::new(config.mail_sender_email.clone())),
      MailTransport::Brevo => {
        let api_key = config
          .brevo_api_key
          .clone()
          .ok_or_else(|| AppError::Config("BREVO_API_KEY is required for MAIL_TRANSPORT=brevo".to_string()))?;
        Arc::new(BrevoMailer::new(
          api_key,
          &config.brevo_api_base,
          config.mail_sender_email.clone(),
          config.mail_sender_name.clone(),
          config.upstream_timeout,
        )?)
      }
    };

    tracing::info!(
      processor = processor.name(),
      mail_transport = ?config.mail_transport,
      "Payment collaborators initialised."
    );
    Ok(Self::new(config, processor, notifier))
  }
}

// tithe-server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use tithe::SigningSecret;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorKind {
  Razorpay,
  /// In-memory processor for local development.
  Mock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTransport {
  /// Receipts are only logged.
  Log,
  Brevo,
}

/// Process-wide settings, read once at startup and shared through `AppState`.
#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  pub processor: ProcessorKind,
  pub razorpay_key_id: String,
  pub razorpay_key_secret: String,
  pub razorpay_api_base: String,
  pub signature_secret: SigningSecret,
  pub upstream_timeout: Duration,

  pub mail_transport: MailTransport,
  pub brevo_api_key: Option<String>,
  pub brevo_api_base: String,
  pub mail_sender_email: String,
  pub mail_sender_name: String,
  pub organization_name: String,

  pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable source; `from_env` passes the
  /// process environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let require = |name: &str| get(name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", name)));

    let server_host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = get("SERVER_PORT")
      .unwrap_or_else(|| "3001".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let processor = match get("PAYMENT_PROCESSOR").as_deref().unwrap_or("razorpay") {
      "razorpay" => ProcessorKind::Razorpay,
      "mock" => ProcessorKind::Mock,
      other => return Err(AppError::Config(format!("Unknown PAYMENT_PROCESSOR '{}'", other))),
    };
    let (razorpay_key_id, razorpay_key_secret) = match processor {
      ProcessorKind::Razorpay => (require("RAZORPAY_KEY_ID")?, require("RAZORPAY_KEY_SECRET")?),
      ProcessorKind::Mock => (
        get("RAZORPAY_KEY_ID").unwrap_or_default(),
        get("RAZORPAY_KEY_SECRET").unwrap_or_default(),
      ),
    };
    let razorpay_api_base = get("RAZORPAY_API_BASE").unwrap_or_else(|| "https://api.razorpay.com/v1".to_string());

    let signature_secret = get("PAYMENT_SIGNATURE_SECRET")
      .or_else(|| Some(razorpay_key_secret.clone()).filter(|s| !s.is_empty()))
      .map(SigningSecret::new)
      .ok_or_else(|| {
        AppError::Config("Missing environment variable 'PAYMENT_SIGNATURE_SECRET' (or 'RAZORPAY_KEY_SECRET')".to_string())
      })?;

    let upstream_timeout = get("UPSTREAM_TIMEOUT_SECS")
      .unwrap_or_else(|| "10".to_string())
      .parse::<u64>()
      .ok()
      .filter(|secs| *secs > 0)
      .map(Duration::from_secs)
      .ok_or_else(|| AppError::Config("UPSTREAM_TIMEOUT_SECS must be a positive integer".to_string()))?;

    let mail_transport = match get("MAIL_TRANSPORT").as_deref().unwrap_or("log") {
      "log" => MailTransport::Log,
      "brevo" => MailTransport::Brevo,
      other => return Err(AppError::Config(format!("Unknown MAIL_TRANSPORT '{}'", other))),
    };
    let brevo_api_key = match mail_transport {
      MailTransport::Brevo => Some(require("BREVO_API_KEY")?),
      MailTransport::Log => get("BREVO_API_KEY"),
    };
    let brevo_api_base = get("BREVO_API_BASE").unwrap_or_else(|| "https://api.brevo.com/v3".to_string());
    let mail_sender_email = get("MAIL_SENDER_EMAIL").unwrap_or_else(|| "noreply@example.com".to_string());
    let mail_sender_name = get("MAIL_SENDER_NAME").unwrap_or_else(|| "Donations".to_string());
    let organization_name = get("ORGANIZATION_NAME").unwrap_or_else(|| mail_sender_name.clone());

    let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
      .map(|raw| {
        raw
          .split(',')
          .map(|origin| origin.trim().trim_end_matches('/').to_string())
          .filter(|origin| !origin.is_empty())
          .collect()
      })
      .unwrap_or_default();

    let config = Self {
      server_host,
      server_port,
      processor,
      razorpay_key_id,
      razorpay_key_secret,
      razorpay_api_base,
      signature_secret,
      upstream_timeout,
      mail_transport,
      brevo_api_key,
      brevo_api_base,
      mail_sender_email,
      mail_sender_name,
      organization_name,
      cors_allowed_origins,
    };
    tracing::info!(config = ?config, "Application configuration loaded successfully.");
    Ok(config)
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

// Secrets never reach the logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("processor", &self.processor)
      .field("razorpay_key_id", &self.razorpay_key_id)
      .field("razorpay_key_secret", &"[REDACTED]")
      .field("razorpay_api_base", &self.razorpay_api_base)
      .field("signature_secret", &self.signature_secret)
      .field("upstream_timeout", &self.upstream_timeout)
      .field("mail_transport", &self.mail_transport)
      .field("brevo_api_key", &self.brevo_api_key.as_ref().map(|_| "[REDACTED]"))
      .field("brevo_api_base", &self.brevo_api_base)
      .field("mail_sender_email", &self.mail_sender_email)
      .field("mail_sender_name", &self.mail_sender_name)
      .field("organization_name", &self.organization_name)
      .field("cors_allowed_origins", &self.cors_allowed_origins)
      .finish()
  }
}

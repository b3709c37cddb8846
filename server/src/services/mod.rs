// tithe-server/src/services/mod.rs

pub mod brevo;
pub mod email_mock;
pub mod payment_mock;
pub mod razorpay;

pub use brevo::BrevoMailer;
pub use email_mock::LogMailer;
pub use payment_mock::MockProcessor;
pub use razorpay::RazorpayClient;

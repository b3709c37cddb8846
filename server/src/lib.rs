// tithe-server/src/lib.rs

//! HTTP front of the donation service: order creation and payment
//! verification over actix-web, backed by the `tithe` core.

pub mod config;
pub mod errors;
pub mod services;
pub mod state;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::AppState;

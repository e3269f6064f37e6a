//! HTTP surface of Snaplink.
//!
//! Exposes mapping creation and inspection under `/v1`, the authoritative
//! `/resolve/{code}` endpoint used by remote redirectors, and the redirect
//! itself at `/{code}`.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use config::GatewayConfig;
pub use error::AppError;
pub use state::{AppParts, AppState};

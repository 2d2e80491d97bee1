//! Forecasting: the trained-model artifact and the service around it.
//!
//! - `model` — the additive model deserialized from the published artifact,
//!   exposed through the `Forecaster` capability
//! - `service` — load-or-degrade model state + horizon validation

pub mod model;
pub mod service;

pub use model::*;
pub use service::*;

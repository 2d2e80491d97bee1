//! Remote data access.
//!
//! - Brent price feed fetch + CSV normalization (`feed`)
//! - forecasting-model artifact fetch (`artifact`)

pub mod artifact;
pub mod feed;

pub use artifact::*;
pub use feed::*;

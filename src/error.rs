//! Error types for the Brent dashboard and forecast service.
//!
//! `AppError` is the process-level error carried up to `main` (message + exit
//! code). The smaller enums model the failure taxonomy of the data/forecast
//! boundaries so callers can distinguish them without string matching:
//!
//! - `FetchError` — HTTP failure retrieving the feed or the model artifact
//! - `LoadError` — model artifact could not be turned into a usable model
//! - `PredictError` — prediction rejected (bad horizon, or no model loaded)

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// HTTP-level failure for the feed or the model artifact.
///
/// Single attempt, no retry: the error is surfaced verbatim to the caller.
#[derive(Debug, Clone)]
pub enum FetchError {
    /// Network/transport failure (DNS, TLS, connection, body read).
    Network(String),
    /// Non-2xx response status.
    Status(u16),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "request failed: {msg}"),
            FetchError::Status(code) => write!(f, "request failed with status {code}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Failure to materialize the forecasting model from its remote artifact.
#[derive(Debug, Clone)]
pub enum LoadError {
    Fetch(FetchError),
    /// The downloaded artifact was zero bytes long.
    EmptyPayload,
    /// The bytes do not form a valid model (corrupt or format mismatch).
    Deserialization(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Fetch(e) => write!(f, "model artifact {e}"),
            LoadError::EmptyPayload => write!(f, "model artifact is empty (zero bytes)"),
            LoadError::Deserialization(msg) => {
                write!(f, "model artifact is not a valid model: {msg}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

impl From<FetchError> for LoadError {
    fn from(value: FetchError) -> Self {
        LoadError::Fetch(value)
    }
}

/// Prediction rejected before the model was consulted.
#[derive(Debug, Clone)]
pub enum PredictError {
    /// Horizon must be a positive number of days; never silently clamped.
    InvalidHorizon(i64),
    /// No model is loaded. Carries the load failure that put us here, so the
    /// calling surface can render a useful message instead of crashing.
    ModelUnavailable(String),
}

impl std::fmt::Display for PredictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictError::InvalidHorizon(n) => {
                write!(f, "forecast horizon must be at least 1 day (got {n})")
            }
            PredictError::ModelUnavailable(reason) => {
                write!(f, "no forecasting model is loaded: {reason}")
            }
        }
    }
}

impl std::error::Error for PredictError {}

//! JSON prediction endpoint.
//!
//! `brent serve` exposes the forecast service over HTTP:
//!
//! - `POST /predict` with `{ "dias": <days> }` → array of forecast records
//! - `GET /health` liveness probe
//!
//! The model artifact is fetched once, blocking, before the tokio runtime
//! starts; request handlers share the resulting service immutably. A failed
//! load degrades to the "no model" state so the server still starts and
//! answers with structured errors.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::data::ArtifactSource;
use crate::error::AppError;
use crate::forecast::ForecastService;

mod routes;

/// Shared application state.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<ForecastService>,
}

/// Start the prediction server on `bind` (e.g. `0.0.0.0:8000`).
pub fn run(bind: &str, model_url: Option<&str>) -> Result<(), AppError> {
    init_tracing();

    // Single model load at process startup (no lazy init, no races): a load
    // failure becomes the unavailable state rather than aborting the server.
    let source = ArtifactSource::from_env(model_url);
    let service = ForecastService::load_or_degrade(&source);
    match service.unavailable_reason() {
        None => tracing::info!(url = source.url(), "model loaded"),
        Some(reason) => tracing::warn!(url = source.url(), reason, "serving without a model"),
    }

    let state = ApiState {
        service: Arc::new(service),
    };

    let app = Router::new()
        .route("/predict", post(routes::predict))
        .route("/health", get(routes::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::new(4, format!("Failed to start async runtime: {e}")))?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(bind)
            .await
            .map_err(|e| AppError::new(4, format!("Failed to bind '{bind}': {e}")))?;
        tracing::info!(addr = bind, "listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| AppError::new(4, format!("Server error: {e}")))
    })
}

fn init_tracing() {
    // Best-effort init so `serve` can be called from tests without panicking
    // on double registration.
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brent_dash=info,tower_http=info".into()),
        )
        .try_init();
}

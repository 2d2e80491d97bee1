//! API route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::PredictError;

use super::ApiState;

/// Request body for `POST /predict`. The field name is part of the published
/// contract consumed by existing clients.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub dias: i64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `POST /predict`: exactly `dias` daily forecast records, ordered by date.
///
/// Failures carry explicit non-2xx statuses (unlike the legacy service, which
/// answered 200 with an error body): 422 for a non-positive horizon, 503 when
/// no model is loaded.
pub async fn predict(
    State(state): State<ApiState>,
    Json(req): Json<PredictRequest>,
) -> Response {
    match state.service.predict(req.dias) {
        Ok(points) => Json(points).into_response(),
        Err(err) => {
            let status = match &err {
                PredictError::InvalidHorizon(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PredictError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            };
            tracing::warn!(%err, "predict rejected");
            (
                status,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// `GET /health`: liveness probe.
pub async fn health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
        "model_loaded": state.service.is_loaded(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::forecast::ForecastService;

    fn state_with(service: ForecastService) -> ApiState {
        ApiState {
            service: Arc::new(service),
        }
    }

    #[tokio::test]
    async fn predict_without_model_is_503_with_error_body() {
        let state = state_with(ForecastService::unavailable("load failed"));
        let response = predict(State(state), Json(PredictRequest { dias: 5 })).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn non_positive_dias_is_422() {
        let state = state_with(ForecastService::unavailable("load failed"));
        let response = predict(State(state), Json(PredictRequest { dias: 0 })).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn predict_with_model_returns_ok() {
        let model = crate::forecast::model::tests::test_model();
        let state = state_with(ForecastService::with_model(Arc::new(model)));
        let response = predict(State(state), Json(PredictRequest { dias: 5 })).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

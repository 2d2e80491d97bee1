//! Forecast service: owns the (possibly absent) trained model.
//!
//! Load failures are converted into a "no model" state at the boundary so the
//! rest of the surface stays usable: the dashboard still shows historical
//! data, the endpoint answers with a structured error instead of crashing.

use std::sync::Arc;

use crate::data::ArtifactSource;
use crate::domain::ForecastPoint;
use crate::error::{LoadError, PredictError};
use crate::forecast::model::{AdditiveModel, Forecaster};

enum ModelState {
    Loaded(Arc<dyn Forecaster + Send + Sync>),
    /// Why there is no model (load failure message, or "not loaded yet").
    Unavailable(String),
}

pub struct ForecastService {
    state: ModelState,
}

impl ForecastService {
    /// Fetch and deserialize the published artifact.
    pub fn load(source: &ArtifactSource) -> Result<Self, LoadError> {
        let bytes = source.fetch()?;
        let model = deserialize_model(&bytes)?;
        Ok(Self::with_model(Arc::new(model)))
    }

    /// Like `load`, but degrades to the unavailable state on failure instead
    /// of propagating. This is the boundary conversion used by long-lived
    /// surfaces (serve, TUI).
    pub fn load_or_degrade(source: &ArtifactSource) -> Self {
        match Self::load(source) {
            Ok(service) => service,
            Err(err) => Self::unavailable(err.to_string()),
        }
    }

    pub fn with_model(model: Arc<dyn Forecaster + Send + Sync>) -> Self {
        Self {
            state: ModelState::Loaded(model),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: ModelState::Unavailable(reason.into()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ModelState::Loaded(_))
    }

    /// Why the model is absent, if it is.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            ModelState::Loaded(_) => None,
            ModelState::Unavailable(reason) => Some(reason),
        }
    }

    /// Project the next `horizon_days` days.
    ///
    /// Rejects non-positive horizons (`InvalidHorizon`, never clamped) and
    /// answers `ModelUnavailable` when no model is loaded — both structured,
    /// neither a panic.
    pub fn predict(&self, horizon_days: i64) -> Result<Vec<ForecastPoint>, PredictError> {
        let horizon = u32::try_from(horizon_days)
            .ok()
            .filter(|h| *h >= 1)
            .ok_or(PredictError::InvalidHorizon(horizon_days))?;

        match &self.state {
            ModelState::Loaded(model) => Ok(model.predict(horizon)),
            ModelState::Unavailable(reason) => {
                Err(PredictError::ModelUnavailable(reason.clone()))
            }
        }
    }
}

fn deserialize_model(bytes: &[u8]) -> Result<AdditiveModel, LoadError> {
    let model: AdditiveModel = serde_json::from_slice(bytes)
        .map_err(|e| LoadError::Deserialization(e.to_string()))?;
    model.validate().map_err(LoadError::Deserialization)?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::model::tests::test_model;

    fn loaded_service() -> ForecastService {
        ForecastService::with_model(Arc::new(test_model()))
    }

    #[test]
    fn predict_five_days_yields_five_ordered_points() {
        let points = loaded_service().predict(5).unwrap();
        assert_eq!(points.len(), 5);
        for pair in points.windows(2) {
            assert!(pair[0].ds < pair[1].ds);
        }
    }

    #[test]
    fn non_positive_horizons_are_rejected() {
        let service = loaded_service();
        for bad in [0i64, -1, -365] {
            match service.predict(bad) {
                Err(PredictError::InvalidHorizon(n)) => assert_eq!(n, bad),
                other => panic!("expected InvalidHorizon, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_model_is_a_structured_result_not_a_panic() {
        let service = ForecastService::unavailable("artifact fetch failed");
        match service.predict(5) {
            Err(PredictError::ModelUnavailable(reason)) => {
                assert!(reason.contains("artifact fetch failed"));
            }
            other => panic!("expected ModelUnavailable, got {other:?}"),
        }
        assert!(!service.is_loaded());
        assert!(service.unavailable_reason().is_some());
    }

    #[test]
    fn invalid_horizon_takes_precedence_over_missing_model() {
        let service = ForecastService::unavailable("no model");
        assert!(matches!(
            service.predict(0),
            Err(PredictError::InvalidHorizon(0))
        ));
    }

    #[test]
    fn deserialize_rejects_garbage_and_invalid_models() {
        assert!(matches!(
            deserialize_model(b"not json"),
            Err(LoadError::Deserialization(_))
        ));

        let mut model = test_model();
        model.sigma = f64::NAN;
        let bytes = serde_json::to_vec(&model).unwrap();
        assert!(matches!(
            deserialize_model(&bytes),
            Err(LoadError::Deserialization(_))
        ));
    }
}

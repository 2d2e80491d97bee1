//! The trained forecasting model.
//!
//! Training happens offline; this crate only consumes the published artifact.
//! The artifact is a JSON document describing an additive daily model:
//!
//! ```text
//! yhat(d) = level + trend_per_day * d + weekly[weekday(d)] + yearly(d)
//! ```
//!
//! where `d` counts days past the trained history and `yearly` is a small
//! Fourier expansion over the day-of-year. Interval bounds are symmetric:
//! `yhat ± interval_z * sigma`.
//!
//! Everything downstream consumes the model through the `Forecaster`
//! capability only, so the artifact format can evolve without touching the
//! service or the surfaces.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::ForecastPoint;

/// The single capability this system uses from a trained model: project the
/// next `horizon_days` days, one point per day, starting immediately after
/// the trained history.
pub trait Forecaster {
    fn predict(&self, horizon_days: u32) -> Vec<ForecastPoint>;
}

/// One yearly-seasonality Fourier term: `a*cos(2πkx) + b*sin(2πkx)` with
/// `x = day_of_year / 365.25`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FourierTerm {
    pub k: u32,
    pub a: f64,
    pub b: f64,
}

/// Additive daily model as published by the training process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditiveModel {
    /// Last date covered by the training data; forecasts start the day after.
    pub history_end: NaiveDate,
    /// Level of the series at `history_end`.
    pub level: f64,
    /// Linear trend per forecasted day.
    pub trend_per_day: f64,
    /// Weekly seasonality, indexed 0 = Monday .. 6 = Sunday.
    pub weekly: [f64; 7],
    /// Yearly seasonality Fourier terms (may be empty).
    #[serde(default)]
    pub yearly: Vec<FourierTerm>,
    /// Residual scale used for interval bounds.
    pub sigma: f64,
    /// Interval half-width in sigmas.
    pub interval_z: f64,
}

impl AdditiveModel {
    /// Structural checks serde cannot express. A model failing these is
    /// treated as a deserialization failure by the loader.
    pub fn validate(&self) -> Result<(), String> {
        if !self.level.is_finite() || !self.trend_per_day.is_finite() {
            return Err("non-finite level/trend".to_string());
        }
        if self.weekly.iter().any(|v| !v.is_finite()) {
            return Err("non-finite weekly seasonality".to_string());
        }
        if self
            .yearly
            .iter()
            .any(|t| !t.a.is_finite() || !t.b.is_finite())
        {
            return Err("non-finite yearly seasonality".to_string());
        }
        if !(self.sigma.is_finite() && self.sigma >= 0.0) {
            return Err("sigma must be finite and non-negative".to_string());
        }
        if !(self.interval_z.is_finite() && self.interval_z >= 0.0) {
            return Err("interval_z must be finite and non-negative".to_string());
        }
        Ok(())
    }

    fn yearly_component(&self, date: NaiveDate) -> f64 {
        let x = date.ordinal0() as f64 / 365.25;
        self.yearly
            .iter()
            .map(|t| {
                let arg = 2.0 * std::f64::consts::PI * t.k as f64 * x;
                t.a * arg.cos() + t.b * arg.sin()
            })
            .sum()
    }
}

impl Forecaster for AdditiveModel {
    fn predict(&self, horizon_days: u32) -> Vec<ForecastPoint> {
        let half_width = self.interval_z * self.sigma;
        let mut out = Vec::with_capacity(horizon_days as usize);
        for d in 1..=i64::from(horizon_days) {
            let ds = self.history_end + Duration::days(d);
            let weekday = ds.weekday().num_days_from_monday() as usize;
            let yhat = self.level
                + self.trend_per_day * d as f64
                + self.weekly[weekday]
                + self.yearly_component(ds);
            out.push(ForecastPoint {
                ds,
                yhat,
                yhat_lower: yhat - half_width,
                yhat_upper: yhat + half_width,
            });
        }
        out
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_model() -> AdditiveModel {
        AdditiveModel {
            history_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            level: 74.0,
            trend_per_day: 0.01,
            weekly: [0.1, 0.0, -0.1, 0.0, 0.2, -0.3, 0.1],
            yearly: vec![FourierTerm { k: 1, a: 1.5, b: -0.5 }],
            sigma: 2.0,
            interval_z: 1.28,
        }
    }

    #[test]
    fn predict_returns_exactly_n_daily_points() {
        let model = test_model();
        for n in [1u32, 5, 365] {
            let points = model.predict(n);
            assert_eq!(points.len(), n as usize);

            // First point is the day after the trained history; dates are
            // strictly increasing and contiguous at daily granularity.
            assert_eq!(points[0].ds, model.history_end + Duration::days(1));
            for pair in points.windows(2) {
                assert_eq!(pair[1].ds - pair[0].ds, Duration::days(1));
            }
        }
    }

    #[test]
    fn bounds_bracket_the_point_prediction() {
        let points = test_model().predict(30);
        for p in &points {
            assert!(p.yhat_lower <= p.yhat && p.yhat <= p.yhat_upper);
        }
    }

    #[test]
    fn zero_sigma_collapses_the_interval() {
        let mut model = test_model();
        model.sigma = 0.0;
        for p in model.predict(7) {
            assert_eq!(p.yhat_lower, p.yhat);
            assert_eq!(p.yhat_upper, p.yhat);
        }
    }

    #[test]
    fn validate_rejects_negative_sigma() {
        let mut model = test_model();
        model.sigma = -1.0;
        assert!(model.validate().is_err());
    }

    #[test]
    fn artifact_round_trips_through_json() {
        let model = test_model();
        let bytes = serde_json::to_vec(&model).unwrap();
        let back: AdditiveModel = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back.history_end, model.history_end);
        assert_eq!(back.predict(10), model.predict(10));
    }
}

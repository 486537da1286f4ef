//! Synthetic random-walk generation with injected anomalies

use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};

use tv_core::{ConfigError, ConfigResult, DataPoint};

/// Parameters of the bounded random walk.
///
/// The defaults reproduce the dashboard's demo feed: ±3 per step, a 10%
/// chance of a 15-25 jump, values kept within 10..=80.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisParams {
    pub anomaly_probability: f64,
    /// Normal steps are uniform in `[-max_step, +max_step]`
    pub max_step: f64,
    pub anomaly_step_min: f64,
    pub anomaly_step_max: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            anomaly_probability: 0.1,
            max_step: 3.0,
            anomaly_step_min: 15.0,
            anomaly_step_max: 25.0,
            lower_bound: 10.0,
            upper_bound: 80.0,
        }
    }
}

impl SynthesisParams {
    pub fn with_anomaly_probability(mut self, probability: f64) -> Self {
        self.anomaly_probability = probability;
        self
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let p = self.anomaly_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidProbability(p));
        }
        if !self.max_step.is_finite() || self.max_step < 0.0 {
            return Err(ConfigError::InvalidRange {
                lower: -self.max_step,
                upper: self.max_step,
            });
        }
        let anomaly_ok = self.anomaly_step_min.is_finite()
            && self.anomaly_step_max.is_finite()
            && self.anomaly_step_min >= 0.0
            && self.anomaly_step_min <= self.anomaly_step_max;
        if !anomaly_ok {
            return Err(ConfigError::InvalidRange {
                lower: self.anomaly_step_min,
                upper: self.anomaly_step_max,
            });
        }
        if !(self.lower_bound.is_finite() && self.upper_bound.is_finite())
            || self.lower_bound > self.upper_bound
        {
            return Err(ConfigError::InvalidRange {
                lower: self.lower_bound,
                upper: self.upper_bound,
            });
        }
        Ok(())
    }
}

/// Next point of the walk: a pure function of `previous`, `params` and the RNG.
///
/// The anomaly draw always happens first, so a zero probability never
/// produces an anomaly regardless of RNG state. The timestamp advances by
/// `interval` and the id is derived from it.
///
/// `params` should have passed [`SynthesisParams::validate`]. Inverted
/// step or value bounds are read in ascending order rather than panicking;
/// non-finite parameters are not supported.
pub fn synthesize<R: Rng + ?Sized>(
    previous: &DataPoint,
    params: &SynthesisParams,
    interval: Duration,
    rng: &mut R,
) -> DataPoint {
    let is_anomaly = rng.gen::<f64>() < params.anomaly_probability;

    let step = if is_anomaly {
        let (min, max) = ascending(params.anomaly_step_min, params.anomaly_step_max);
        let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        sign * rng.gen_range(min..=max)
    } else {
        let max_step = params.max_step.abs();
        rng.gen_range(-max_step..=max_step)
    };

    let (lower, upper) = ascending(params.lower_bound, params.upper_bound);
    let value = (previous.value + step).clamp(lower, upper);
    let timestamp = previous.timestamp + interval;
    let point = DataPoint::new(format!("point-{}", timestamp.timestamp_millis()), timestamp, value);

    if is_anomaly {
        point.anomalous()
    } else {
        point
    }
}

fn ascending(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

//! Numeric normalization between data values and unit/angular ranges

/// Map `value` into the unit interval relative to `[min, max]`.
///
/// A degenerate range (`max == min`) maps every input to `0.5` instead of
/// dividing by zero. Values outside the range extrapolate linearly; use
/// [`normalize_clamped`] when the result must stay in `[0, 1]`.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 0.5;
    }
    (value - min) / (max - min)
}

/// Inverse of [`normalize`].
pub fn denormalize(t: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return min;
    }
    min + t * (max - min)
}

/// Like [`normalize`], clamped to `[0, 1]`.
pub fn normalize_clamped(value: f64, min: f64, max: f64) -> f64 {
    normalize(value, min, max).clamp(0.0, 1.0)
}

/// Map `value` onto an angular range starting at `start` and covering `sweep` radians.
pub fn to_angle(value: f64, min: f64, max: f64, start: f64, sweep: f64) -> f64 {
    start + normalize_clamped(value, min, max) * sweep
}

/// Observed or declared value range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range covering every finite value in `values`.
    ///
    /// Returns `None` when there is no finite value to observe.
    pub fn observe<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
        }
        if min > max {
            None
        } else {
            Some(Self { min, max })
        }
    }

    /// Scale the lower and upper bounds independently (e.g. `0.9`, `1.1` for headroom).
    pub fn padded(self, lower_factor: f64, upper_factor: f64) -> Self {
        Self {
            min: self.min * lower_factor,
            max: self.max * upper_factor,
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    pub fn normalize(&self, value: f64) -> f64 {
        normalize(value, self.min, self.max)
    }

    pub fn denormalize(&self, t: f64) -> f64 {
        denormalize(t, self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for Range {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

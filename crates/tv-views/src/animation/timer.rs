use tv_core::{ConfigError, ConfigResult};

/// Periodic timer polled with the frame clock
///
/// The first poll latches the start; each later poll reports how many whole
/// intervals elapsed since the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshTimer {
    interval_ms: f64,
    last_fire: Option<f64>,
    max_catch_up: usize,
    cancelled: bool,
}

impl RefreshTimer {
    pub fn new(interval_ms: f64) -> ConfigResult<Self> {
        if !(interval_ms.is_finite() && interval_ms > 0.0) {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(Self {
            interval_ms,
            last_fire: None,
            max_catch_up: usize::MAX,
            cancelled: false,
        })
    }

    /// Cap on intervals reported by a single poll, e.g. after the host stalls
    pub fn with_max_catch_up(mut self, max: usize) -> Self {
        self.max_catch_up = max;
        self
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn poll(&mut self, now_ms: f64) -> usize {
        if self.cancelled {
            return 0;
        }
        let Some(last) = self.last_fire else {
            self.last_fire = Some(now_ms);
            return 0;
        };
        let elapsed = now_ms - last;
        if elapsed < self.interval_ms {
            return 0;
        }
        let fired = (elapsed / self.interval_ms).floor();
        self.last_fire = Some(last + fired * self.interval_ms);
        (fired as usize).min(self.max_catch_up)
    }

    /// Stop permanently
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_elapsed_intervals() {
        let mut timer = RefreshTimer::new(3000.0).unwrap();
        assert_eq!(timer.poll(1000.0), 0);
        assert_eq!(timer.poll(3999.0), 0);
        assert_eq!(timer.poll(4000.0), 1);
        assert_eq!(timer.poll(13_500.0), 3);
        // Remainder carries over
        assert_eq!(timer.poll(16_000.0), 1);
    }

    #[test]
    fn test_catch_up_cap_and_cancel() {
        let mut timer = RefreshTimer::new(10.0).unwrap().with_max_catch_up(5);
        timer.poll(0.0);
        assert_eq!(timer.poll(1000.0), 5);
        timer.cancel();
        assert_eq!(timer.poll(5000.0), 0);
        assert!(timer.is_cancelled());
    }

    #[test]
    fn test_invalid_interval() {
        assert_eq!(RefreshTimer::new(0.0), Err(ConfigError::InvalidInterval));
        assert!(RefreshTimer::new(f64::NAN).is_err());
    }
}

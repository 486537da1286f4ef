//! Fixed-capacity sliding window over a live data stream

mod synth;

pub use synth::{synthesize, SynthesisParams};

use std::collections::VecDeque;

use chrono::Duration;
use rand::Rng;
use tracing::debug;

use tv_core::{ConfigError, ConfigResult, DataPoint, Range};

/// Ordered window of the most recent `capacity` points
///
/// Appending past capacity evicts from the head. Anomalous points are also
/// copied into an append-only log that survives eviction.
#[derive(Debug, Clone)]
pub struct StreamBuffer {
    points: VecDeque<DataPoint>,
    capacity: usize,
    anomalies: Vec<DataPoint>,
}

impl StreamBuffer {
    pub fn new(capacity: usize) -> ConfigResult<Self> {
        if capacity == 0 {
            return Err(ConfigError::InvalidCapacity(capacity));
        }
        Ok(Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            anomalies: Vec::new(),
        })
    }

    /// Buffer holding a single seed point for the walk to continue from
    pub fn seeded(capacity: usize, seed: DataPoint) -> ConfigResult<Self> {
        let mut buffer = Self::new(capacity)?;
        buffer.append(seed);
        Ok(buffer)
    }

    /// Buffer filled from `points`, keeping only the last `capacity`
    pub fn from_points(capacity: usize, points: impl IntoIterator<Item = DataPoint>) -> ConfigResult<Self> {
        let mut buffer = Self::new(capacity)?;
        buffer.extend(points);
        Ok(buffer)
    }

    pub fn append(&mut self, point: DataPoint) {
        if point.is_anomaly() {
            debug!("Anomaly {} logged at value {:.1}", point.id, point.value);
            self.anomalies.push(point.clone());
        }
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn extend(&mut self, points: impl IntoIterator<Item = DataPoint>) {
        for point in points {
            self.append(point);
        }
    }

    /// Synthesize one point from the latest and append it
    ///
    /// Returns `None` when the buffer is empty, since there is nothing to walk from.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        params: &SynthesisParams,
        interval: Duration,
        rng: &mut R,
    ) -> Option<&DataPoint> {
        let next = synthesize(self.latest()?, params, interval, rng);
        self.append(next);
        self.latest()
    }

    /// Replace the window contents, keeping the anomaly log
    pub fn reset(&mut self, points: impl IntoIterator<Item = DataPoint>) {
        self.points.clear();
        self.extend(points);
    }

    /// Drop the window and the anomaly log
    pub fn clear(&mut self) {
        self.points.clear();
        self.anomalies.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.points.len() == self.capacity
    }

    pub fn latest(&self) -> Option<&DataPoint> {
        self.points.back()
    }

    pub fn get(&self, index: usize) -> Option<&DataPoint> {
        self.points.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataPoint> + '_ {
        self.points.iter()
    }

    /// Owned copy of the window in order, oldest first
    pub fn snapshot(&self) -> Vec<DataPoint> {
        self.points.iter().cloned().collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Observed value range of the window
    pub fn range(&self) -> Option<Range> {
        Range::observe(self.points.iter().map(|p| p.value))
    }

    /// Every anomaly ever appended, in arrival order
    pub fn anomalies(&self) -> &[DataPoint] {
        &self.anomalies
    }

    pub fn anomaly_count(&self) -> usize {
        self.anomalies.len()
    }

    /// Time between the oldest and newest point in the window
    pub fn time_span(&self) -> Option<Duration> {
        let first = self.points.front()?;
        let last = self.points.back()?;
        Some(last.timestamp - first.timestamp)
    }
}

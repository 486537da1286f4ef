//! Data model consumed by the projectors and widgets

use chrono::{DateTime, Utc};
use egui::Color32;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Flags attached to a data point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointFlags {
    pub is_anomaly: bool,
}

/// A single timestamped sample in a stream
///
/// Immutable once created; streams only ever append or evict whole points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    #[serde(default)]
    pub flags: PointFlags,
}

impl DataPoint {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            id: id.into(),
            timestamp,
            value,
            flags: PointFlags::default(),
        }
    }

    /// Same point, flagged as an anomaly
    pub fn anomalous(mut self) -> Self {
        self.flags.is_anomaly = true;
        self
    }

    pub fn is_anomaly(&self) -> bool {
        self.flags.is_anomaly
    }
}

/// Named, ordered mapping of category to value with a display color
///
/// Replaced wholesale on refresh; never mutated during a render cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: IndexMap<String, f64>,
    pub color: Color32,
}

impl Series {
    pub fn new(name: impl Into<String>, color: Color32) -> Self {
        Self {
            name: name.into(),
            values: IndexMap::new(),
            color,
        }
    }

    /// Builder-style insertion preserving order
    pub fn with(mut self, category: impl Into<String>, value: f64) -> Self {
        self.values.insert(category.into(), value);
        self
    }

    pub fn from_pairs<S: Into<String>>(
        name: impl Into<String>,
        color: Color32,
        pairs: impl IntoIterator<Item = (S, f64)>,
    ) -> Self {
        Self {
            name: name.into(),
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            color,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn get_index(&self, index: usize) -> Option<(&str, f64)> {
        self.values.get_index(index).map(|(k, v)| (k.as_str(), *v))
    }

    pub fn total(&self) -> f64 {
        self.values.values().filter(|v| v.is_finite()).sum()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.values
            .values()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }
}

/// A geographic marker placed on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoMarker {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub magnitude: f64,
    pub label: String,
}

impl GeoMarker {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64, magnitude: f64, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
            magnitude,
            label: label.into(),
        }
    }
}

/// Severity of a threat blip on the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// A threat placed on the scanner by polar coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatBlip {
    pub id: String,
    pub name: String,
    pub category: String,
    pub severity: Severity,
    /// 0 is the center, 1 the edge
    pub distance: f64,
    /// Degrees, measured like screen-space `atan2` (0 = east, clockwise)
    pub angle_deg: f64,
}

/// Coarse classification of a 0-100 threat score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatLevel {
    Low,
    Moderate,
    Elevated,
    High,
    Critical,
}

impl ThreatLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 20.0 {
            ThreatLevel::Low
        } else if score < 40.0 {
            ThreatLevel::Moderate
        } else if score < 70.0 {
            ThreatLevel::Elevated
        } else if score < 90.0 {
            ThreatLevel::High
        } else {
            ThreatLevel::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "Low",
            ThreatLevel::Moderate => "Moderate",
            ThreatLevel::Elevated => "Elevated",
            ThreatLevel::High => "High",
            ThreatLevel::Critical => "Critical",
        }
    }
}

/// Input accepted by widgets, tagged by projection family
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    TimeSeries(Vec<DataPoint>),
    CategorySeries(Series),
    GeoMarkers(Vec<GeoMarker>),
}

impl DataSource {
    /// Name of the variant, used in error messages and logs
    pub fn kind(&self) -> &'static str {
        match self {
            DataSource::TimeSeries(_) => "time series",
            DataSource::CategorySeries(_) => "category series",
            DataSource::GeoMarkers(_) => "geo markers",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DataSource::TimeSeries(points) => points.len(),
            DataSource::CategorySeries(series) => series.len(),
            DataSource::GeoMarkers(markers) => markers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_order_and_total() {
        let series = Series::new("content", Color32::WHITE)
            .with("image", 48.0)
            .with("video", 37.0)
            .with("audio", 23.0);
        let cats: Vec<_> = series.categories().collect();
        assert_eq!(cats, vec!["image", "video", "audio"]);
        assert_eq!(series.total(), 108.0);
        assert_eq!(series.max_value(), Some(48.0));
        assert_eq!(series.get_index(1), Some(("video", 37.0)));
    }

    #[test]
    fn test_threat_level_thresholds() {
        assert_eq!(ThreatLevel::from_score(0.0), ThreatLevel::Low);
        assert_eq!(ThreatLevel::from_score(19.9), ThreatLevel::Low);
        assert_eq!(ThreatLevel::from_score(20.0), ThreatLevel::Moderate);
        assert_eq!(ThreatLevel::from_score(42.0), ThreatLevel::Elevated);
        assert_eq!(ThreatLevel::from_score(70.0), ThreatLevel::High);
        assert_eq!(ThreatLevel::from_score(90.0), ThreatLevel::Critical);
    }

    #[test]
    fn test_data_source_kind() {
        let source = DataSource::GeoMarkers(vec![GeoMarker::new("1", 0.0, 0.0, 8.0, "Null Island")]);
        assert_eq!(source.kind(), "geo markers");
        assert_eq!(source.len(), 1);
    }
}

//! Built-in datasets shown when a widget is mounted without data

use chrono::{DateTime, Duration, Utc};
use egui::Color32;
use indexmap::IndexMap;
use rand::Rng;

use tv_core::{DataPoint, GeoMarker, Series, Severity, ThreatBlip};

/// Indices of the seeded anomaly series that carry an injected jump
pub const SEEDED_ANOMALY_INDICES: [usize; 4] = [5, 12, 20, 27];

/// Overall detection score shown in the radar center
pub const OVERALL_DETECTION_SCORE: f64 = 87.0;

pub const THREAT_SCORE: f64 = 42.0;
pub const PREVIOUS_THREAT_SCORE: f64 = 37.0;

/// Cosine wave with noise and a few injected anomalies, ending at `now`
///
/// Point `i` is stamped `now - (count - i) * interval` and named after its index.
pub fn anomaly_series<R: Rng + ?Sized>(
    count: usize,
    interval: Duration,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<DataPoint> {
    (0..count)
        .map(|i| {
            let mut value = 30.0 + (i as f64 * 0.2).cos() * 10.0 + rng.gen_range(0.0..5.0);
            let is_anomaly = SEEDED_ANOMALY_INDICES.contains(&i);
            if is_anomaly {
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                value += sign * rng.gen_range(15.0..25.0);
            }

            let timestamp = now - interval * (count - i) as i32;
            let point = DataPoint::new(format!("point-{}", i), timestamp, value);
            if is_anomaly {
                point.anomalous()
            } else {
                point
            }
        })
        .collect()
}

/// Detection confidence per analysis category, 0-100
pub fn detection_scores() -> Series {
    Series::from_pairs(
        "Detection Score",
        Color32::from_rgb(59, 130, 246),
        [
            ("Visual Artifacts", 92.0),
            ("Metadata Analysis", 72.0),
            ("Pattern Recognition", 89.0),
            ("Contextual Analysis", 80.0),
            ("Audio Sync", 93.0),
        ],
    )
}

/// Analyzed content by media type
pub fn content_distribution() -> Series {
    Series::from_pairs(
        "Content Types",
        Color32::from_rgb(59, 130, 246),
        [("image", 48.0), ("video", 37.0), ("audio", 23.0), ("document", 18.0)],
    )
}

/// Color tokens matching [`content_distribution`]
pub fn content_colors() -> IndexMap<String, String> {
    [
        ("image", "#3b82f6"),
        ("video", "#ef4444"),
        ("audio", "#f59e0b"),
        ("document", "#10b981"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Recent attack origins
pub fn threat_markers() -> Vec<GeoMarker> {
    vec![
        GeoMarker::new("1", 37.7749, -122.4194, 8.0, "San Francisco"),
        GeoMarker::new("2", 40.7128, -74.0060, 15.0, "New York"),
        GeoMarker::new("3", 51.5074, -0.1278, 12.0, "London"),
        GeoMarker::new("4", 28.6139, 77.2090, 9.0, "New Delhi"),
        GeoMarker::new("5", 39.9042, 116.4074, 14.0, "Beijing"),
        GeoMarker::new("6", -33.8688, 151.2093, 7.0, "Sydney"),
        GeoMarker::new("7", 55.7558, 37.6173, 10.0, "Moscow"),
        GeoMarker::new("8", -23.5505, -46.6333, 11.0, "São Paulo"),
    ]
}

/// Active threats placed on the scanner
pub fn threat_blips() -> Vec<ThreatBlip> {
    let blip = |id: &str, name: &str, category: &str, severity, distance, angle_deg| ThreatBlip {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        severity,
        distance,
        angle_deg,
    };
    vec![
        blip("t1", "Voice Synthesis Attack", "audio", Severity::Critical, 0.2, 45.0),
        blip("t2", "DeepFake Video Distribution", "video", Severity::High, 0.4, 120.0),
        blip("t3", "Metadata Forgery Technique", "metadata", Severity::Medium, 0.6, 200.0),
        blip("t4", "Image Manipulation Tool", "image", Severity::High, 0.3, 280.0),
        blip("t5", "Adversarial Model Attack", "model", Severity::Critical, 0.5, 330.0),
    ]
}

//! Widget and dashboard configuration

pub mod widget_config;

pub use widget_config::*;

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tv_core::{ConfigError, ConfigResult};

use crate::DataError;

/// Named widget configurations, in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub widgets: IndexMap<String, WidgetConfig>,
}

fn default_title() -> String {
    "Threat Intelligence Dashboard".to_string()
}

impl Default for DashboardConfig {
    /// One widget of every kind with its default settings
    fn default() -> Self {
        let widgets = [
            ("anomalies", WidgetKind::AnomalyChart),
            ("detection", WidgetKind::ScoreRadar),
            ("scanner", WidgetKind::ThreatScanner),
            ("content", WidgetKind::DistributionChart),
            ("geography", WidgetKind::ThreatMap),
            ("threat-score", WidgetKind::ScoreGauge),
        ]
        .into_iter()
        .map(|(name, kind)| (name.to_string(), WidgetConfig::new(kind)))
        .collect();

        Self {
            title: default_title(),
            widgets,
        }
    }
}

impl DashboardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a dashboard layout
    ///
    /// Only malformed JSON is an error. Widget entries are validated when the
    /// dashboard builds them, so one bad entry never costs the others.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: DashboardConfig = serde_json::from_str(json)?;
        for (name, e) in config.invalid_widgets() {
            warn!("Widget '{}' has an invalid config: {}", name, e);
        }
        debug!("Parsed dashboard config with {} widgets", config.widgets.len());
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json).map_err(|e| {
            warn!("Rejected dashboard config {}: {}", path.display(), e);
            DataError::Config(e)
        })
    }

    pub fn to_json_string(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(ConfigError::from)
    }

    /// Strict check: the first invalid widget entry
    pub fn validate(&self) -> ConfigResult<()> {
        for config in self.widgets.values() {
            config.validate()?;
        }
        Ok(())
    }

    /// Every widget entry that fails validation, in display order
    pub fn invalid_widgets(&self) -> Vec<(&str, ConfigError)> {
        self.widgets
            .iter()
            .filter_map(|(name, config)| config.validate().err().map(|e| (name.as_str(), e)))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&WidgetConfig> {
        self.widgets.get(name)
    }

    /// Add or replace a widget entry; new entries go last
    pub fn insert(&mut self, name: impl Into<String>, config: WidgetConfig) {
        self.widgets.insert(name.into(), config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_covers_every_kind_in_order() {
        let config = DashboardConfig::default();
        let kinds: Vec<_> = config.widgets.values().map(|w| w.kind).collect();
        assert_eq!(kinds.len(), 6);
        assert_eq!(kinds[0], WidgetKind::AnomalyChart);
        assert_eq!(kinds[5], WidgetKind::ScoreGauge);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let config = DashboardConfig::default();
        let json = config.to_json_string().unwrap();
        let parsed = DashboardConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    const MIXED: &str = r#"{
        "title": "Mixed",
        "widgets": {
            "gauge": {
                "kind": "score_gauge",
                "dimensions": { "width": 300, "height": 180 },
                "animation_ms": 2000
            },
            "bad": {
                "kind": "anomaly_chart",
                "capacity": 0,
                "dimensions": { "width": 800, "height": 300 },
                "animation_ms": 2000
            }
        }
    }"#;

    #[test]
    fn test_invalid_entry_keeps_the_rest() {
        let config = DashboardConfig::from_json_str(MIXED).unwrap();
        assert_eq!(config.widgets.len(), 2);
        assert!(config.get("gauge").unwrap().validate().is_ok());
        assert_eq!(config.invalid_widgets(), vec![("bad", ConfigError::InvalidCapacity(0))]);
        assert_eq!(config.validate(), Err(ConfigError::InvalidCapacity(0)));
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        assert!(matches!(
            DashboardConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = DashboardConfig::load("/nonexistent/dashboard.json");
        assert!(matches!(result, Err(DataError::Io(_))));
    }
}

//! Per-widget configuration

use chrono::Duration;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use tv_core::{ColorMap, ConfigError, ConfigResult, ViewportState};

use crate::stream::SynthesisParams;

/// Widget types the dashboard knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    AnomalyChart,
    ScoreRadar,
    ThreatScanner,
    DistributionChart,
    ThreatMap,
    ScoreGauge,
}

impl WidgetKind {
    pub fn name(&self) -> &'static str {
        match self {
            WidgetKind::AnomalyChart => "Anomaly Chart",
            WidgetKind::ScoreRadar => "Score Radar",
            WidgetKind::ThreatScanner => "Threat Scanner",
            WidgetKind::DistributionChart => "Distribution Chart",
            WidgetKind::ThreatMap => "Threat Map",
            WidgetKind::ScoreGauge => "Score Gauge",
        }
    }

    /// Canvas size the widget is designed for
    pub fn default_dimensions(&self) -> Dimensions {
        let (width, height) = match self {
            WidgetKind::AnomalyChart => (800.0, 300.0),
            WidgetKind::ScoreRadar => (400.0, 400.0),
            WidgetKind::ThreatScanner => (500.0, 500.0),
            WidgetKind::DistributionChart => (300.0, 300.0),
            WidgetKind::ThreatMap => (600.0, 300.0),
            WidgetKind::ScoreGauge => (300.0, 180.0),
        };
        Dimensions { width, height }
    }

    /// Entrance duration, or the period of the widget's continuous animation
    pub fn default_animation_ms(&self) -> f64 {
        match self {
            WidgetKind::AnomalyChart => 2000.0,
            WidgetKind::ScoreRadar => 1500.0,
            // 0.01 rad per frame at 60 fps
            WidgetKind::ThreatScanner => 10_472.0,
            WidgetKind::DistributionChart => 800.0,
            WidgetKind::ThreatMap => 2000.0,
            WidgetKind::ScoreGauge => 2000.0,
        }
    }
}

/// Surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

/// Configuration of a single widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub kind: WidgetKind,

    /// Window length of streamed data
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Period of synthetic data generation
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    pub dimensions: Dimensions,

    /// Category → `#rrggbb` or `#rrggbbaa`
    #[serde(default)]
    pub colors: IndexMap<String, String>,

    #[serde(default)]
    pub synthesis: SynthesisParams,

    pub animation_ms: f64,
}

fn default_capacity() -> usize {
    30
}

fn default_refresh_interval_ms() -> u64 {
    3000
}

impl WidgetConfig {
    /// Defaults for `kind`
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            capacity: default_capacity(),
            refresh_interval_ms: default_refresh_interval_ms(),
            dimensions: kind.default_dimensions(),
            colors: IndexMap::new(),
            synthesis: SynthesisParams::default(),
            animation_ms: kind.default_animation_ms(),
        }
    }

    pub fn with_dimensions(mut self, width: f32, height: f32) -> Self {
        self.dimensions = Dimensions { width, height };
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_color(mut self, category: impl Into<String>, token: impl Into<String>) -> Self {
        self.colors.insert(category.into(), token.into());
        self
    }

    pub fn with_synthesis(mut self, synthesis: SynthesisParams) -> Self {
        self.synthesis = synthesis;
        self
    }

    pub fn with_animation_ms(mut self, animation_ms: f64) -> Self {
        self.animation_ms = animation_ms;
        self
    }

    /// Check every field; widgets call this before building any state
    pub fn validate(&self) -> ConfigResult<()> {
        if self.capacity == 0 {
            return Err(ConfigError::InvalidCapacity(self.capacity));
        }
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        self.viewport()?;
        self.color_map()?;
        self.synthesis.validate()?;
        if !(self.animation_ms.is_finite() && self.animation_ms > 0.0) {
            return Err(ConfigError::InvalidDuration(self.animation_ms));
        }
        Ok(())
    }

    pub fn viewport(&self) -> ConfigResult<ViewportState> {
        ViewportState::new(self.dimensions.width, self.dimensions.height)
    }

    pub fn color_map(&self) -> ConfigResult<ColorMap> {
        ColorMap::from_tokens(self.colors.iter())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::milliseconds(self.refresh_interval_ms as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        for kind in [
            WidgetKind::AnomalyChart,
            WidgetKind::ScoreRadar,
            WidgetKind::ThreatScanner,
            WidgetKind::DistributionChart,
            WidgetKind::ThreatMap,
            WidgetKind::ScoreGauge,
        ] {
            assert!(WidgetConfig::new(kind).validate().is_ok(), "{:?}", kind);
        }
    }

    #[test]
    fn test_rejections() {
        let base = WidgetConfig::new(WidgetKind::AnomalyChart);
        assert_eq!(
            base.clone().with_capacity(0).validate(),
            Err(ConfigError::InvalidCapacity(0))
        );
        assert!(matches!(
            base.clone().with_dimensions(0.0, 300.0).validate(),
            Err(ConfigError::InvalidDimensions { .. })
        ));
        assert_eq!(
            base.clone().with_color("image", "blue").validate(),
            Err(ConfigError::InvalidColor("blue".to_string()))
        );
        assert_eq!(
            base.clone().with_animation_ms(-5.0).validate(),
            Err(ConfigError::InvalidDuration(-5.0))
        );
        let mut zero_interval = base;
        zero_interval.refresh_interval_ms = 0;
        assert_eq!(zero_interval.validate(), Err(ConfigError::InvalidInterval));
    }

    #[test]
    fn test_json_fills_defaults() {
        let json = r##"{
            "kind": "distribution_chart",
            "dimensions": { "width": 320, "height": 240 },
            "colors": { "image": "#3b82f6" },
            "animation_ms": 800
        }"##;
        let config: WidgetConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.kind, WidgetKind::DistributionChart);
        assert_eq!(config.capacity, 30);
        assert_eq!(config.refresh_interval_ms, 3000);
        assert_eq!(config.synthesis, SynthesisParams::default());
        assert!(config.validate().is_ok());
    }
}

//! The six threat-visualization widgets

pub(crate) mod style;

mod anomaly_chart;
mod distribution_chart;
mod score_gauge;
mod score_radar;
mod threat_map;
mod threat_scanner;

pub use anomaly_chart::AnomalyChart;
pub use distribution_chart::{ChartMode, DistributionChart};
pub use score_gauge::ScoreGauge;
pub use score_radar::ScoreRadar;
pub use threat_map::ThreatMap;
pub use threat_scanner::ThreatScanner;

use tv_core::ConfigResult;
use tv_data::{WidgetConfig, WidgetKind};

use crate::widget::Widget;

/// Build the widget `config.kind` names, seeded with its demo data
pub fn build_widget(config: WidgetConfig) -> ConfigResult<Box<dyn Widget>> {
    let widget: Box<dyn Widget> = match config.kind {
        WidgetKind::AnomalyChart => Box::new(AnomalyChart::new(config)?),
        WidgetKind::ScoreRadar => Box::new(ScoreRadar::new(config)?),
        WidgetKind::ThreatScanner => Box::new(ThreatScanner::new(config)?),
        WidgetKind::DistributionChart => Box::new(DistributionChart::new(config)?),
        WidgetKind::ThreatMap => Box::new(ThreatMap::new(config)?),
        WidgetKind::ScoreGauge => Box::new(ScoreGauge::new(config)?),
    };
    Ok(widget)
}

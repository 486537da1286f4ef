//! Semicircular threat score gauge

use egui::{Align2, Color32, Pos2, Stroke};
use serde_json::{json, Value};
use tracing::{debug, warn};

use tv_core::color::{threat_level_color, with_alpha};
use tv_core::projection::GaugeProjector;
use tv_core::{ConfigResult, DataSource, EntityRef, HoverEvent, InteractionState, Range, ThreatLevel, ViewportState, WidgetId};
use tv_data::{demo, WidgetConfig, WidgetKind};
use tv_render::Surface;

use super::style;
use crate::animation::{AnimationId, Easing, ProgressCell};
use crate::interaction::HitScene;
use crate::pipeline::{FrameComposer, Tooltip};
use crate::widget::{HoverCallback, HoverUpdate, Widget, WidgetCore};

const MAX_SCORE: f64 = 100.0;
const TICKS: [f64; 5] = [0.0, 25.0, 50.0, 75.0, 100.0];
const SIDE_MARGIN: f64 = 20.0;
const BOTTOM_MARGIN: f64 = 50.0;
const BAND_WIDTH: f64 = 16.0;
const ARC_SEGMENTS: usize = 48;

fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, MAX_SCORE)
    } else {
        0.0
    }
}

/// Current threat score against the previous reading
pub struct ScoreGauge {
    core: WidgetCore,
    score: f64,
    previous: f64,
    entrance: ProgressCell,
    entrance_id: Option<AnimationId>,
}

impl ScoreGauge {
    pub fn new(config: WidgetConfig) -> ConfigResult<Self> {
        let core = WidgetCore::new(config, WidgetKind::ScoreGauge.name())?;
        Ok(Self {
            core,
            score: demo::THREAT_SCORE,
            previous: demo::PREVIOUS_THREAT_SCORE,
            entrance: ProgressCell::new(0.0),
            entrance_id: None,
        })
    }

    pub fn with_scores(mut self, score: f64, previous: f64) -> Self {
        self.score = clamp_score(score);
        self.previous = clamp_score(previous);
        self
    }

    pub fn with_on_hover(mut self, callback: HoverCallback) -> Self {
        self.core.set_on_hover(callback);
        self
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn previous_score(&self) -> f64 {
        self.previous
    }

    pub fn level(&self) -> ThreatLevel {
        ThreatLevel::from_score(self.score)
    }

    /// Record a new reading; the current score becomes the previous one
    pub fn set_score(&mut self, score: f64) -> ConfigResult<()> {
        let score = clamp_score(score);
        self.previous = self.score;
        self.score = score;
        debug!("Gauge '{}' score {} (was {})", self.core.title, self.score, self.previous);
        self.core.clear_hover();
        self.entrance_id = self
            .core
            .restart_entrance(self.entrance_id, Easing::EaseOutCubic, &self.entrance)?;
        Ok(())
    }

    /// Score shown this frame, eased in from zero
    pub fn displayed_score(&self) -> f64 {
        self.score * self.entrance.get()
    }

    pub fn projector(&self) -> GaugeProjector {
        let viewport = &self.core.viewport;
        let radius = (viewport.width() / 2.0 - SIDE_MARGIN)
            .min(viewport.height() - BOTTOM_MARGIN - SIDE_MARGIN)
            .max(0.0);
        let center = Pos2::new(viewport.center().x, (viewport.height() - BOTTOM_MARGIN) as f32);
        GaugeProjector::new(center, radius, Range::new(0.0, MAX_SCORE))
    }

    fn band(&self, projector: &GaugeProjector) -> (f64, f64) {
        let r = projector.radius();
        ((r - BAND_WIDTH / 2.0).max(0.0), r + BAND_WIDTH / 2.0)
    }

    fn trend(&self) -> String {
        let diff = (self.score - self.previous).round();
        if diff > 0.0 {
            format!("+{} pts", diff)
        } else if diff < 0.0 {
            format!("-{} pts", diff.abs())
        } else {
            "0 pts".to_string()
        }
    }

    fn describe(&self, entity: EntityRef) -> Option<HoverEvent> {
        (entity == EntityRef::Gauge)
            .then(|| self.core.hover_event(entity, "threat-score", self.level().label(), self.score))
    }
}

impl FrameComposer for ScoreGauge {
    fn draw_background(&self, surface: &mut dyn Surface, viewport: &ViewportState) {
        surface.draw_rect(viewport.rect(), 0.0, style::BACKGROUND, Stroke::NONE);

        let projector = self.projector();
        let (inner, _) = self.band(&projector);
        surface.draw_path(
            &projector.arc(MAX_SCORE, projector.radius(), ARC_SEGMENTS),
            Stroke::new(BAND_WIDTH as f32, Color32::from_rgb(31, 41, 55)),
        );

        let tick_stroke = Stroke::new(2.0, Color32::from_rgb(156, 163, 175));
        for tick in TICKS {
            surface.draw_line(
                projector.point_at(tick, inner - 12.0),
                projector.point_at(tick, inner - 2.0),
                tick_stroke,
            );
            surface.draw_text(
                projector.point_at(tick, inner - 22.0),
                Align2::CENTER_CENTER,
                &format!("{:.0}", tick),
                9.0,
                style::TEXT_MUTED,
            );
        }
    }

    fn draw_data(&self, surface: &mut dyn Surface, viewport: &ViewportState) {
        let projector = self.projector();
        let level = self.level();
        let color = threat_level_color(level);
        let shown = self.displayed_score();

        if shown > 0.0 {
            surface.draw_path(
                &projector.arc(shown, projector.radius(), ARC_SEGMENTS),
                Stroke::new(BAND_WIDTH as f32, color),
            );
        }

        let center = projector.center();
        let tip = projector.point_at(shown, (projector.radius() - 20.0).max(0.0));
        surface.draw_line(center, tip, Stroke::new(3.0, color));
        surface.draw_circle(tip, 5.0, Color32::WHITE, Stroke::new(2.0, Color32::from_rgb(31, 41, 55)));
        surface.draw_circle(center, 8.0, style::BACKGROUND, Stroke::new(4.0, color));
        surface.draw_circle(center, 4.0, color, Stroke::NONE);

        surface.draw_text(
            Pos2::new(center.x, center.y + 14.0),
            Align2::CENTER_TOP,
            &format!("{:.0}", shown.round()),
            24.0,
            style::TEXT,
        );
        surface.draw_text(
            Pos2::new(center.x + 22.0, center.y + 26.0),
            Align2::LEFT_TOP,
            "/100",
            10.0,
            style::TEXT_MUTED,
        );

        let bottom = viewport.height_px - 6.0;
        surface.draw_text(
            Pos2::new(10.0, bottom),
            Align2::LEFT_BOTTOM,
            &format!("{} Risk", level.label()),
            11.0,
            color,
        );
        let trend_color = if self.score > self.previous {
            Color32::from_rgb(239, 68, 68)
        } else {
            Color32::from_rgb(34, 197, 94)
        };
        surface.draw_text(
            Pos2::new(viewport.width_px - 10.0, bottom),
            Align2::RIGHT_BOTTOM,
            &self.trend(),
            11.0,
            trend_color,
        );
    }

    fn draw_highlight(
        &self,
        surface: &mut dyn Surface,
        _viewport: &ViewportState,
        entity: EntityRef,
    ) -> Option<Tooltip> {
        if entity != EntityRef::Gauge {
            return None;
        }
        let projector = self.projector();
        let (_, outer) = self.band(&projector);
        let shown = self.displayed_score();
        let color = threat_level_color(self.level());

        surface.draw_path(
            &projector.arc(shown, outer + 3.0, ARC_SEGMENTS),
            Stroke::new(2.0, with_alpha(color, 200)),
        );

        let status = if self.score > self.previous {
            "Increasing threat activity"
        } else {
            "Threat situation stable"
        };
        Some(Tooltip::new(
            projector.point_at(shown, outer),
            [
                format!("Threat Score: {:.0}", self.score),
                format!("{} Risk", self.level().label()),
                status.to_string(),
            ],
        ))
    }
}

impl Widget for ScoreGauge {
    fn id(&self) -> WidgetId {
        self.core.id
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::ScoreGauge
    }

    fn title(&self) -> &str {
        &self.core.title
    }

    fn viewport(&self) -> ViewportState {
        self.core.viewport
    }

    fn mount(&mut self) {
        if !self.core.begin_mount() {
            return;
        }
        self.entrance_id = self
            .core
            .restart_entrance(None, Easing::EaseOutCubic, &self.entrance)
            .unwrap_or(None);
    }

    fn resize(&mut self, width: f32, height: f32) -> ConfigResult<()> {
        self.core.resize(width, height)
    }

    /// The last point of a time series is the score, the one before it the previous score
    fn set_data(&mut self, data: DataSource) -> ConfigResult<()> {
        let points = match data {
            DataSource::TimeSeries(points) => points,
            other => return Err(self.core.reject(&other, "time series")),
        };
        let Some(last) = points.last() else {
            warn!("Gauge '{}' got an empty series, keeping score {}", self.core.title, self.score);
            return Ok(());
        };
        let previous = match points.len() {
            1 => self.score,
            n => clamp_score(points[n - 2].value),
        };
        self.set_score(last.value)?;
        self.previous = previous;
        Ok(())
    }

    fn on_frame(&mut self, now_ms: f64) {
        self.core.tick(now_ms);
    }

    fn render(&self, surface: &mut dyn Surface) {
        self.core.render(surface, self);
    }

    fn pointer_moved(&mut self, pos: Pos2) -> Option<HoverUpdate> {
        let projector = self.projector();
        let (inner, outer) = self.band(&projector);
        let scene = HitScene::Gauge {
            projector: &projector,
            inner,
            outer,
            filled_to: self.displayed_score(),
        };
        let change = self.core.track_pointer(pos, &scene)?;
        let event = change.current.and_then(|e| self.describe(e));
        Some(self.core.notify(event))
    }

    fn pointer_left(&mut self) -> Option<HoverUpdate> {
        self.core.pointer_left()
    }

    fn interaction(&self) -> &InteractionState {
        self.core.resolver.state()
    }

    fn take_hover_update(&mut self) -> Option<HoverUpdate> {
        self.core.take_hover_update()
    }

    fn unmount(&mut self) {
        self.core.teardown();
        self.entrance_id = None;
    }

    fn is_mounted(&self) -> bool {
        self.core.is_mounted()
    }

    fn needs_repaint(&self) -> bool {
        self.core.scheduler.is_animating()
    }

    fn save_config(&self) -> Value {
        json!({
            "title": self.core.title,
            "config": self.core.config,
            "score": self.score,
            "previous_score": self.previous,
        })
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tv_core::{DataPoint, GeoMarker};
    use tv_render::DisplayList;

    /// 300x180: pivot at (150, 130), radius 110
    fn settled() -> ScoreGauge {
        let mut gauge = ScoreGauge::new(WidgetConfig::new(WidgetKind::ScoreGauge)).unwrap();
        gauge.mount();
        gauge.on_frame(0.0);
        gauge.on_frame(2000.0);
        gauge
    }

    fn series(values: &[f64]) -> DataSource {
        let now = Utc::now();
        DataSource::TimeSeries(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| DataPoint::new(format!("point-{}", i), now, *v))
                .collect(),
        )
    }

    #[test]
    fn test_repeated_readings_keep_one_entrance() {
        let mut gauge = settled();
        for i in 0..1000 {
            gauge.set_score((i % 100) as f64).unwrap();
            gauge.on_frame(2000.0 + i as f64 * 16.0);
        }
        assert_eq!(gauge.core.scheduler.active_count(), 1);
        assert!(gauge.core.scheduler.len() <= 2);
    }

    #[test]
    fn test_geometry() {
        let gauge = settled();
        let projector = gauge.projector();
        assert_eq!(projector.center(), Pos2::new(150.0, 130.0));
        assert_eq!(projector.radius(), 110.0);
    }

    #[test]
    fn test_default_reading() {
        let gauge = settled();
        assert_eq!(gauge.displayed_score(), 42.0);
        assert_eq!(gauge.level(), ThreatLevel::Elevated);
        assert!(!gauge.needs_repaint());

        let mut list = DisplayList::new();
        gauge.render(&mut list);
        assert!(list.contains_text("42"));
        assert!(list.contains_text("Elevated Risk"));
        assert!(list.contains_text("+5 pts"));
    }

    #[test]
    fn test_needle_eases_in() {
        let mut gauge = ScoreGauge::new(WidgetConfig::new(WidgetKind::ScoreGauge)).unwrap();
        gauge.mount();
        gauge.on_frame(0.0);
        gauge.on_frame(1000.0);
        assert!((gauge.displayed_score() - 42.0 * 0.875).abs() < 1e-9);
        assert!(gauge.needs_repaint());
    }

    #[test]
    fn test_only_filled_arc_is_hoverable() {
        let mut gauge = settled();
        let projector = gauge.projector();

        match gauge.pointer_moved(projector.point_at(20.0, 110.0)) {
            Some(HoverUpdate::Entered(event)) => {
                assert_eq!(event.entity, EntityRef::Gauge);
                assert_eq!(event.value, 42.0);
                assert_eq!(event.label, "Elevated");
            }
            other => panic!("unexpected hover update {:?}", other),
        }
        let mut list = DisplayList::new();
        gauge.render(&mut list);
        assert!(list.contains_text("Threat Score: 42"));

        assert_eq!(gauge.pointer_moved(projector.point_at(80.0, 110.0)), Some(HoverUpdate::Cleared));
        // Inside the dial but off the band
        assert_eq!(gauge.pointer_moved(Pos2::new(150.0, 100.0)), None);
    }

    #[test]
    fn test_series_sets_score_and_previous() {
        let mut gauge = settled();
        gauge.set_data(series(&[10.0, 55.0, 91.0])).unwrap();
        assert_eq!(gauge.score(), 91.0);
        assert_eq!(gauge.previous_score(), 55.0);
        assert_eq!(gauge.level(), ThreatLevel::Critical);
        assert_eq!(gauge.displayed_score(), 0.0);

        gauge.set_data(series(&[])).unwrap();
        assert_eq!(gauge.score(), 91.0);

        gauge.set_data(series(&[30.0])).unwrap();
        assert_eq!(gauge.score(), 30.0);
        assert_eq!(gauge.previous_score(), 91.0);
        assert_eq!(gauge.trend(), "-61 pts");

        assert!(gauge
            .set_data(DataSource::GeoMarkers(vec![GeoMarker::new("1", 0.0, 0.0, 1.0, "x")]))
            .is_err());
    }

    #[test]
    fn test_scores_are_clamped() {
        let mut gauge = settled();
        gauge.set_score(150.0).unwrap();
        assert_eq!(gauge.score(), 100.0);
        assert_eq!(gauge.previous_score(), 42.0);
        gauge.set_score(f64::NAN).unwrap();
        assert_eq!(gauge.score(), 0.0);
        assert_eq!(gauge.trend(), "-100 pts");
    }
}

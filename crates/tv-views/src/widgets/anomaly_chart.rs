//! Live line chart of a value stream with highlighted anomalies

use std::f64::consts::PI;

use chrono::Utc;
use egui::{Align2, Color32, Pos2, Stroke};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use tracing::debug;

use tv_core::color::with_alpha;
use tv_core::projection::CartesianProjector;
use tv_core::{ConfigResult, DataPoint, DataSource, EntityRef, HoverEvent, InteractionState, ViewportState, WidgetId};
use tv_data::{demo, StreamBuffer, WidgetConfig, WidgetKind};
use tv_render::Surface;

use super::style;
use crate::animation::{AnimationSpec, ProgressCell, RefreshTimer};
use crate::interaction::{HitScene, SERIES_HIT_DISTANCE};
use crate::pipeline::{FrameComposer, Tooltip};
use crate::widget::{HoverCallback, HoverUpdate, Widget, WidgetCore};

const GRID_LINES: usize = 5;
const POINT_RADIUS: f32 = 3.0;
const ANOMALY_RADIUS: f32 = 5.0;
const GLOW_SPREAD: f32 = 6.0;

/// Streaming anomaly chart
///
/// Without explicit data it synthesizes a new point every refresh interval.
pub struct AnomalyChart {
    core: WidgetCore,
    buffer: StreamBuffer,
    timer: RefreshTimer,
    rng: StdRng,
    synthesizing: bool,
    glow: ProgressCell,
}

impl AnomalyChart {
    pub fn new(config: WidgetConfig) -> ConfigResult<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic chart for tests and replays
    pub fn with_seed(config: WidgetConfig, seed: u64) -> ConfigResult<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: WidgetConfig, mut rng: StdRng) -> ConfigResult<Self> {
        let core = WidgetCore::new(config, WidgetKind::AnomalyChart.name())?;
        let config = &core.config;
        let timer = RefreshTimer::new(config.refresh_interval_ms as f64)?.with_max_catch_up(config.capacity);
        let seed = demo::anomaly_series(config.capacity, config.refresh_interval(), Utc::now(), &mut rng);
        let buffer = StreamBuffer::from_points(config.capacity, seed)?;

        Ok(Self {
            core,
            buffer,
            timer,
            rng,
            synthesizing: true,
            glow: ProgressCell::new(0.0),
        })
    }

    pub fn with_data(mut self, points: Vec<DataPoint>) -> ConfigResult<Self> {
        self.set_data(DataSource::TimeSeries(points))?;
        Ok(self)
    }

    pub fn with_on_hover(mut self, callback: HoverCallback) -> Self {
        self.core.set_on_hover(callback);
        self
    }

    pub fn buffer(&self) -> &StreamBuffer {
        &self.buffer
    }

    pub fn is_synthesizing(&self) -> bool {
        self.synthesizing
    }

    /// Append one externally produced point
    pub fn push(&mut self, point: DataPoint) {
        self.buffer.append(point);
    }

    fn projector(&self) -> CartesianProjector {
        let range = self
            .buffer
            .range()
            .map(|r| r.padded(0.9, 1.1))
            .unwrap_or_default();
        CartesianProjector::new(&self.core.viewport, range)
    }

    fn hovered_point_id(&self) -> Option<String> {
        let index = self.core.resolver.hovered()?.index()?;
        self.buffer.get(index).map(|p| p.id.clone())
    }

    /// Re-resolve the resting pointer after the window slid under it
    fn rehover(&mut self, previous_id: Option<String>) {
        let Some(pointer) = self.core.resolver.state().pointer else {
            self.core.clear_hover();
            return;
        };
        let projector = self.projector();
        let scene = HitScene::Series {
            projector: &projector,
            len: self.buffer.len(),
            max_distance: SERIES_HIT_DISTANCE,
        };
        self.core.resolver.pointer_moved(pointer, &scene);
        let event = self.core.resolver.hovered().and_then(|e| self.describe(e));
        if event.as_ref().map(|e| &e.entity_id) != previous_id.as_ref() {
            self.core.queue_hover(event);
        }
    }

    fn describe(&self, entity: EntityRef) -> Option<HoverEvent> {
        let EntityRef::Point(i) = entity else {
            return None;
        };
        let point = self.buffer.get(i)?;
        let label = point.timestamp.format("%H:%M:%S").to_string();
        Some(self.core.hover_event(entity, point.id.clone(), label, point.value))
    }
}

impl FrameComposer for AnomalyChart {
    fn draw_background(&self, surface: &mut dyn Surface, viewport: &ViewportState) {
        surface.draw_rect(viewport.rect(), 0.0, style::BACKGROUND, Stroke::NONE);
        for i in 0..=GRID_LINES {
            let y = viewport.height_px * i as f32 / GRID_LINES as f32;
            surface.draw_line(Pos2::new(0.0, y), Pos2::new(viewport.width_px, y), style::grid_stroke());
        }
    }

    fn draw_data(&self, surface: &mut dyn Surface, _viewport: &ViewportState) {
        let n = self.buffer.len();
        let projector = self.projector();
        let points: Vec<Pos2> = self
            .buffer
            .iter()
            .enumerate()
            .filter_map(|(i, p)| projector.project(i, n, p.value))
            .collect();

        if points.len() > 1 {
            let mut area = points.clone();
            area.push(Pos2::new(points[points.len() - 1].x, projector.baseline()));
            area.push(Pos2::new(points[0].x, projector.baseline()));
            surface.draw_polygon(&area, with_alpha(style::ACCENT, 25), Stroke::NONE);
            surface.draw_path(&points, Stroke::new(2.0, style::ACCENT));
        }

        // Phase 0..1 of the repeating glow, shaped into a 0 → 1 → 0 pulse
        let glow = (self.glow.get() * PI).sin() as f32;
        for (point, pos) in self.buffer.iter().zip(&points) {
            if point.is_anomaly() {
                let alpha = (120.0 * (1.0 - glow)) as u8;
                surface.draw_circle(
                    *pos,
                    ANOMALY_RADIUS + glow * GLOW_SPREAD,
                    with_alpha(style::ANOMALY, alpha / 2),
                    Stroke::new(1.5, with_alpha(style::ANOMALY, alpha)),
                );
                surface.draw_circle(*pos, ANOMALY_RADIUS, style::ANOMALY, Stroke::new(1.0, Color32::WHITE));
            } else {
                surface.draw_circle(*pos, POINT_RADIUS, style::ACCENT, Stroke::NONE);
            }
        }

        if self.buffer.is_empty() {
            surface.draw_text(
                self.core.viewport.center(),
                Align2::CENTER_CENTER,
                "Waiting for data",
                12.0,
                style::TEXT_MUTED,
            );
        }
    }

    fn draw_highlight(
        &self,
        surface: &mut dyn Surface,
        _viewport: &ViewportState,
        entity: EntityRef,
    ) -> Option<Tooltip> {
        let EntityRef::Point(i) = entity else {
            return None;
        };
        let point = self.buffer.get(i)?;
        let pos = self.projector().project(i, self.buffer.len(), point.value)?;

        surface.draw_line(
            Pos2::new(pos.x, 0.0),
            Pos2::new(pos.x, self.core.viewport.height_px),
            Stroke::new(1.0, with_alpha(Color32::WHITE, 60)),
        );
        surface.draw_circle(pos, 8.0, Color32::TRANSPARENT, style::highlight_stroke());

        let mut lines = vec![
            point.timestamp.format("%H:%M").to_string(),
            format!("Value: {:.1}", point.value),
        ];
        if point.is_anomaly() {
            lines.push("Anomaly".to_string());
        }
        Some(Tooltip::new(pos, lines))
    }
}

impl Widget for AnomalyChart {
    fn id(&self) -> WidgetId {
        self.core.id
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::AnomalyChart
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
        if let Ok(spec) = AnimationSpec::new(self.core.config.animation_ms) {
            self.core.animate(spec.repeating(), &self.glow);
        }
    }

    fn resize(&mut self, width: f32, height: f32) -> ConfigResult<()> {
        self.core.resize(width, height)
    }

    fn set_data(&mut self, data: DataSource) -> ConfigResult<()> {
        match data {
            DataSource::TimeSeries(points) => {
                debug!("Anomaly chart received {} points", points.len());
                self.buffer.reset(points);
                self.synthesizing = false;
                self.core.clear_hover();
                Ok(())
            }
            other => Err(self.core.reject(&other, "time series")),
        }
    }

    fn on_frame(&mut self, now_ms: f64) {
        if !self.core.tick(now_ms) || !self.synthesizing {
            return;
        }
        let due = self.timer.poll(now_ms);
        if due == 0 {
            return;
        }
        let hovered_id = self.hovered_point_id();
        let interval = self.core.config.refresh_interval();
        let params = self.core.config.synthesis;
        for _ in 0..due {
            self.buffer.advance(&params, interval, &mut self.rng);
        }
        debug!(
            "Synthesized {} points, {} anomalies logged",
            due,
            self.buffer.anomaly_count()
        );
        if hovered_id.is_some() {
            self.rehover(hovered_id);
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        self.core.render(surface, self);
    }

    fn pointer_moved(&mut self, pos: Pos2) -> Option<HoverUpdate> {
        let projector = self.projector();
        let scene = HitScene::Series {
            projector: &projector,
            len: self.buffer.len(),
            max_distance: SERIES_HIT_DISTANCE,
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
        self.timer.cancel();
        self.core.teardown();
    }

    fn is_mounted(&self) -> bool {
        self.core.is_mounted()
    }

    fn needs_repaint(&self) -> bool {
        self.core.is_mounted()
    }

    fn save_config(&self) -> Value {
        json!({
            "title": self.core.title,
            "config": self.core.config,
            "synthesizing": self.synthesizing,
            "anomalies_logged": self.buffer.anomaly_count(),
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
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};
    use parking_lot::Mutex;
    use tv_core::ConfigError;
    use tv_data::SynthesisParams;
    use tv_render::DisplayList;

    fn fixed_points() -> Vec<DataPoint> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        [10.0, 20.0, 30.0]
            .into_iter()
            .enumerate()
            .map(|(i, v)| DataPoint::new(format!("point-{}", i), start + Duration::seconds(3 * i as i64), v))
            .collect()
    }

    #[test]
    fn test_synthesizes_on_refresh_interval() {
        let config = WidgetConfig::new(WidgetKind::AnomalyChart)
            .with_synthesis(SynthesisParams::default().with_anomaly_probability(0.0));
        let mut chart = AnomalyChart::with_seed(config, 9).unwrap();
        let seeded = chart.buffer().snapshot();
        assert_eq!(seeded.len(), 30);
        assert_eq!(chart.buffer().anomaly_count(), 4);

        chart.mount();
        chart.on_frame(0.0);
        chart.on_frame(2999.0);
        assert_eq!(chart.buffer().snapshot(), seeded);

        chart.on_frame(3000.0);
        assert_eq!(chart.buffer().len(), 30);
        assert_eq!(chart.buffer().get(28).unwrap().id, seeded[29].id);

        // A long stall is capped at one full window
        chart.on_frame(3000.0 * 40.0);
        assert_eq!(chart.buffer().len(), 30);
        assert!(chart.buffer().iter().all(|p| !p.is_anomaly()));
        assert_eq!(chart.buffer().anomaly_count(), 4);
    }

    #[test]
    fn test_unmounted_chart_ignores_frames() {
        let mut chart = AnomalyChart::with_seed(WidgetConfig::new(WidgetKind::AnomalyChart), 3).unwrap();
        let before = chart.buffer().snapshot();
        chart.on_frame(0.0);
        chart.on_frame(60_000.0);
        assert_eq!(chart.buffer().snapshot(), before);

        chart.mount();
        chart.unmount();
        chart.on_frame(120_000.0);
        assert_eq!(chart.buffer().snapshot(), before);
        assert!(!chart.is_mounted());
        assert!(chart.pointer_moved(Pos2::new(400.0, 150.0)).is_none());
    }

    #[test]
    fn test_explicit_data_replaces_synthesis() {
        let mut chart = AnomalyChart::with_seed(WidgetConfig::new(WidgetKind::AnomalyChart), 3)
            .unwrap()
            .with_data(fixed_points())
            .unwrap();
        assert!(!chart.is_synthesizing());
        assert_eq!(chart.buffer().values(), vec![10.0, 20.0, 30.0]);

        chart.mount();
        chart.on_frame(0.0);
        chart.on_frame(30_000.0);
        assert_eq!(chart.buffer().len(), 3);

        let err = chart.set_data(DataSource::GeoMarkers(Vec::new())).unwrap_err();
        assert!(matches!(err, ConfigError::DataShape { expected: "time series", .. }));
    }

    #[test]
    fn test_hover_and_tooltip() {
        let mut chart = AnomalyChart::with_seed(WidgetConfig::new(WidgetKind::AnomalyChart), 3)
            .unwrap()
            .with_data(fixed_points())
            .unwrap();
        chart.mount();
        chart.on_frame(0.0);

        match chart.pointer_moved(Pos2::new(405.0, 150.0)) {
            Some(HoverUpdate::Entered(event)) => {
                assert_eq!(event.entity, EntityRef::Point(1));
                assert_eq!(event.entity_id, "point-1");
                assert_eq!(event.value, 20.0);
            }
            other => panic!("unexpected hover update {:?}", other),
        }

        let mut first = DisplayList::new();
        chart.render(&mut first);
        assert!(first.contains_text("Value: 20.0"));
        assert!(first.contains_text("12:30"));
        assert!(chart.viewport().rect().contains_rect(first.bounds().unwrap()));

        let mut second = DisplayList::new();
        chart.render(&mut second);
        assert_eq!(first, second);

        assert_eq!(chart.pointer_left(), Some(HoverUpdate::Cleared));
        let mut idle = DisplayList::new();
        chart.render(&mut idle);
        assert!(!idle.contains_text("Value:"));
    }

    fn recording_chart(seed: u64) -> (AnomalyChart, Arc<Mutex<Vec<Option<String>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let config = WidgetConfig::new(WidgetKind::AnomalyChart)
            .with_synthesis(SynthesisParams::default().with_anomaly_probability(0.0));
        let chart = AnomalyChart::with_seed(config, seed)
            .unwrap()
            .with_on_hover(Box::new(move |event| {
                sink.lock().push(event.map(|e| e.entity_id.clone()));
            }));
        (chart, seen)
    }

    #[test]
    fn test_new_data_clears_hover() {
        let (chart, seen) = recording_chart(3);
        let mut chart = chart.with_data(fixed_points()).unwrap();
        chart.mount();
        chart.on_frame(0.0);
        assert!(matches!(chart.pointer_moved(Pos2::new(405.0, 150.0)), Some(HoverUpdate::Entered(_))));

        chart.set_data(DataSource::TimeSeries(fixed_points())).unwrap();
        assert_eq!(chart.interaction().hovered, None);
        assert_eq!(chart.take_hover_update(), Some(HoverUpdate::Cleared));
        assert_eq!(*seen.lock(), vec![Some("point-1".to_string()), None]);

        // Replacing data with nothing hovered stays quiet
        chart.set_data(DataSource::TimeSeries(fixed_points())).unwrap();
        assert_eq!(chart.take_hover_update(), None);
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_sliding_window_reports_the_point_under_the_pointer() {
        let (mut chart, seen) = recording_chart(5);
        chart.mount();
        chart.on_frame(0.0);

        let pointer = Pos2::new(800.0 * 15.0 / 29.0, 150.0);
        let entered = match chart.pointer_moved(pointer) {
            Some(HoverUpdate::Entered(event)) => event,
            other => panic!("unexpected hover update {:?}", other),
        };
        let index = entered.entity.index().unwrap();

        chart.on_frame(3000.0);
        let slid = chart.buffer().get(index).unwrap().id.clone();
        assert_ne!(slid, entered.entity_id);
        match chart.take_hover_update() {
            Some(HoverUpdate::Entered(event)) => {
                assert_eq!(event.entity_id, slid);
                assert_eq!(event.value, chart.buffer().get(index).unwrap().value);
            }
            other => panic!("unexpected hover update {:?}", other),
        }
        assert_eq!(*seen.lock(), vec![Some(entered.entity_id.clone()), Some(slid)]);
        assert_eq!(chart.take_hover_update(), None);
    }
}

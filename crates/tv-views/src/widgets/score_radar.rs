//! Radar chart of per-category detection scores

use egui::{Align2, Color32, Pos2, Stroke};
use serde_json::{json, Value};
use tracing::{debug, warn};

use tv_core::color::with_alpha;
use tv_core::projection::polar::DEFAULT_RADIUS_TOLERANCE;
use tv_core::projection::PolarProjector;
use tv_core::{ConfigResult, DataSource, EntityRef, HoverEvent, InteractionState, Range, Series, ViewportState, WidgetId};
use tv_data::{demo, WidgetConfig, WidgetKind};
use tv_render::Surface;

use super::style;
use crate::animation::{AnimationId, Easing, ProgressCell};
use crate::interaction::HitScene;
use crate::pipeline::{FrameComposer, Tooltip};
use crate::widget::{HoverCallback, HoverUpdate, Widget, WidgetCore};

const RINGS: usize = 5;
const MARGIN: f64 = 40.0;
const LABEL_OFFSET: f64 = 20.0;

/// Scores on a 0-100 scale, one spoke per category
pub struct ScoreRadar {
    core: WidgetCore,
    series: Series,
    overall: f64,
    entrance: ProgressCell,
    entrance_id: Option<AnimationId>,
}

impl ScoreRadar {
    pub fn new(config: WidgetConfig) -> ConfigResult<Self> {
        let core = WidgetCore::new(config, WidgetKind::ScoreRadar.name())?;
        Ok(Self {
            core,
            series: demo::detection_scores(),
            overall: demo::OVERALL_DETECTION_SCORE,
            entrance: ProgressCell::new(0.0),
            entrance_id: None,
        })
    }

    pub fn with_series(mut self, series: Series) -> ConfigResult<Self> {
        self.set_data(DataSource::CategorySeries(series))?;
        Ok(self)
    }

    pub fn with_on_hover(mut self, callback: HoverCallback) -> Self {
        self.core.set_on_hover(callback);
        self
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn overall_score(&self) -> f64 {
        self.overall
    }

    pub fn set_overall_score(&mut self, score: f64) {
        self.overall = if score.is_finite() { score.clamp(0.0, 100.0) } else { 0.0 };
    }

    /// Entrance progress as of the last frame
    pub fn progress(&self) -> f64 {
        self.entrance.get()
    }

    fn projector(&self) -> PolarProjector {
        let viewport = &self.core.viewport;
        let max_radius = (viewport.min_side() / 2.0 - MARGIN).max(0.0);
        PolarProjector::new(viewport.center(), max_radius, Range::new(0.0, 100.0), self.series.len())
    }

    fn color(&self, index: usize) -> Color32 {
        self.series
            .get_index(index)
            .map(|(category, _)| self.core.colors.resolve(category, index))
            .unwrap_or(self.series.color)
    }

    fn vertex(&self, projector: &PolarProjector, index: usize, value: f64) -> Pos2 {
        let radius = projector.radius_for(value) * self.progress();
        projector.project_radius(index, radius)
    }

    fn describe(&self, entity: EntityRef) -> Option<HoverEvent> {
        let EntityRef::Category(i) = entity else {
            return None;
        };
        let (category, score) = self.series.get_index(i)?;
        Some(self.core.hover_event(entity, category, category, score))
    }
}

impl FrameComposer for ScoreRadar {
    fn draw_background(&self, surface: &mut dyn Surface, viewport: &ViewportState) {
        surface.draw_rect(viewport.rect(), 0.0, style::BACKGROUND, Stroke::NONE);

        let projector = self.projector();
        let center = projector.center();
        let max_radius = projector.max_radius();

        for ring in 1..=RINGS {
            let radius = ring as f64 / RINGS as f64 * max_radius;
            surface.draw_circle(center, radius as f32, Color32::TRANSPARENT, style::grid_stroke());
            surface.draw_text(
                Pos2::new(center.x, center.y - radius as f32 - 5.0),
                Align2::CENTER_BOTTOM,
                &format!("{}", ring * 100 / RINGS),
                10.0,
                style::TEXT_MUTED,
            );
        }

        for (i, category) in self.series.categories().enumerate() {
            surface.draw_line(center, projector.project_radius(i, max_radius), style::grid_stroke());
            surface.draw_text(
                projector.project_radius(i, max_radius + LABEL_OFFSET),
                Align2::CENTER_CENTER,
                category,
                11.0,
                style::TEXT,
            );
        }
    }

    fn draw_data(&self, surface: &mut dyn Surface, _viewport: &ViewportState) {
        let projector = self.projector();
        let vertices: Vec<Pos2> = self
            .series
            .values
            .values()
            .enumerate()
            .map(|(i, v)| self.vertex(&projector, i, *v))
            .collect();

        let color = self.series.color;
        match vertices.len() {
            0 => {}
            1 | 2 => surface.draw_path(&vertices, Stroke::new(2.0, color)),
            _ => surface.draw_polygon(&vertices, with_alpha(color, 50), Stroke::new(2.0, color)),
        }
        for (i, vertex) in vertices.iter().enumerate() {
            surface.draw_circle(*vertex, 4.0, self.color(i), Stroke::new(1.0, Color32::WHITE));
        }

        let center = projector.center();
        surface.draw_text(
            center,
            Align2::CENTER_CENTER,
            &format!("{}%", (self.overall * self.progress()).round()),
            32.0,
            style::TEXT,
        );
        surface.draw_text(
            Pos2::new(center.x, center.y + 25.0),
            Align2::CENTER_CENTER,
            "Detection Score",
            12.0,
            style::TEXT_MUTED,
        );
    }

    fn draw_highlight(
        &self,
        surface: &mut dyn Surface,
        _viewport: &ViewportState,
        entity: EntityRef,
    ) -> Option<Tooltip> {
        let EntityRef::Category(i) = entity else {
            return None;
        };
        let (category, score) = self.series.get_index(i)?;
        let projector = self.projector();
        let vertex = self.vertex(&projector, i, score);

        surface.draw_line(
            projector.center(),
            projector.project_radius(i, projector.max_radius()),
            Stroke::new(1.5, with_alpha(self.color(i), 160)),
        );
        surface.draw_circle(vertex, 7.0, Color32::TRANSPARENT, style::highlight_stroke());

        Some(Tooltip::new(vertex, [category.to_string(), format!("Score: {:.0}%", score)]))
    }
}

impl Widget for ScoreRadar {
    fn id(&self) -> WidgetId {
        self.core.id
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::ScoreRadar
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

    fn set_data(&mut self, data: DataSource) -> ConfigResult<()> {
        let series = match data {
            DataSource::CategorySeries(series) => series,
            other => return Err(self.core.reject(&other, "category series")),
        };
        if series.values.values().any(|v| !(0.0..=100.0).contains(v)) {
            warn!("Radar '{}' clamps scores outside 0-100", self.core.title);
        }
        debug!("Radar '{}' received {} categories", self.core.title, series.len());
        self.series = series;
        self.core.clear_hover();
        self.entrance_id = self
            .core
            .restart_entrance(self.entrance_id, Easing::EaseOutCubic, &self.entrance)?;
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
        let scene = HitScene::Radar {
            projector: &projector,
            tolerance: DEFAULT_RADIUS_TOLERANCE,
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
            "overall_score": self.overall,
            "categories": self.series.values,
        })
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

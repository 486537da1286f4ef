//! Content distribution as a donut or a bar chart

use std::f64::consts::FRAC_PI_2;

use egui::{Align2, Color32, Pos2, Stroke};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use tv_core::color::{adjust_brightness, with_alpha};
use tv_core::projection::polar::DEFAULT_RADIUS_TOLERANCE;
use tv_core::projection::{arc_points, BandLayout, SectorLayout, Slice};
use tv_core::{ConfigResult, DataSource, EntityRef, HoverEvent, InteractionState, Series, ViewportState, WidgetId};
use tv_data::{demo, WidgetConfig, WidgetKind};
use tv_render::Surface;

use super::style;
use crate::animation::{AnimationId, Easing, ProgressCell};
use crate::interaction::HitScene;
use crate::pipeline::{FrameComposer, Tooltip};
use crate::widget::{HoverCallback, HoverUpdate, Widget, WidgetCore};

const PIE_MARGIN: f64 = 20.0;
const INNER_RATIO: f64 = 0.45;
const ACTIVE_GROWTH: f64 = 8.0;
const LABEL_RATIO: f64 = 0.7;

const BAR_PADDING: f32 = 40.0;
const BAR_GAP: f32 = 20.0;
const GRID_LINES: usize = 4;

/// How the distribution is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    #[default]
    Pie,
    Bar,
}

pub struct DistributionChart {
    core: WidgetCore,
    series: Series,
    mode: ChartMode,
    entrance: ProgressCell,
    entrance_id: Option<AnimationId>,
}

impl DistributionChart {
    pub fn new(mut config: WidgetConfig) -> ConfigResult<Self> {
        if config.colors.is_empty() {
            config.colors = demo::content_colors();
        }
        let core = WidgetCore::new(config, WidgetKind::DistributionChart.name())?;
        Ok(Self {
            core,
            series: demo::content_distribution(),
            mode: ChartMode::default(),
            entrance: ProgressCell::new(0.0),
            entrance_id: None,
        })
    }

    pub fn with_series(mut self, series: Series) -> ConfigResult<Self> {
        self.set_data(DataSource::CategorySeries(series))?;
        Ok(self)
    }

    pub fn with_mode(mut self, mode: ChartMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_on_hover(mut self, callback: HoverCallback) -> Self {
        self.core.set_on_hover(callback);
        self
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn mode(&self) -> ChartMode {
        self.mode
    }

    /// Switch between pie and bar, replaying the entrance
    pub fn set_mode(&mut self, mode: ChartMode) -> ConfigResult<()> {
        if mode == self.mode {
            return Ok(());
        }
        debug!("Distribution '{}' switched to {:?}", self.core.title, mode);
        self.mode = mode;
        self.core.clear_hover();
        self.entrance_id = self
            .core
            .restart_entrance(self.entrance_id, Easing::EaseOutCubic, &self.entrance)?;
        Ok(())
    }

    pub fn progress(&self) -> f64 {
        self.entrance.get()
    }

    fn values(&self) -> Vec<f64> {
        self.series.values.values().copied().collect()
    }

    fn sectors(&self) -> SectorLayout {
        let viewport = &self.core.viewport;
        let radius = (viewport.min_side() / 2.0 - PIE_MARGIN).max(0.0);
        SectorLayout::new(viewport.center(), radius * INNER_RATIO, radius, &self.values())
    }

    fn bands(&self) -> BandLayout {
        let max = self.series.max_value().unwrap_or(0.0);
        BandLayout::new(&self.core.viewport, BAR_PADDING, self.series.len(), BAR_GAP, max)
    }

    fn color(&self, index: usize) -> Color32 {
        self.series
            .get_index(index)
            .map(|(category, _)| self.core.colors.resolve(category, index))
            .unwrap_or(self.series.color)
    }

    /// Slice swept in from the top as the entrance runs
    fn animated(&self, slice: &Slice) -> (f64, f64) {
        let p = self.progress();
        let start = -FRAC_PI_2 + (slice.start + FRAC_PI_2) * p;
        let end = -FRAC_PI_2 + (slice.end + FRAC_PI_2) * p;
        (start, end)
    }

    fn draw_slice(&self, surface: &mut dyn Surface, layout: &SectorLayout, slice: &Slice, outer: f64, color: Color32) {
        let (start, end) = self.animated(slice);
        if end <= start {
            return;
        }
        let inner = layout.inner_radius();
        let segments = ((end - start) * 24.0).ceil().max(2.0) as usize;
        let band = arc_points(layout.center(), (inner + outer) / 2.0, start, end, segments);
        surface.draw_path(&band, Stroke::new((outer - inner) as f32, color));
    }

    fn draw_pie(&self, surface: &mut dyn Surface) {
        let layout = self.sectors();
        for slice in layout.slices() {
            self.draw_slice(surface, &layout, slice, layout.outer_radius(), self.color(slice.index));
            if slice.fraction >= 0.05 && self.progress() >= 1.0 {
                surface.draw_text(
                    layout.label_point(slice, LABEL_RATIO),
                    Align2::CENTER_CENTER,
                    &format!("{:.0}%", slice.fraction * 100.0),
                    11.0,
                    Color32::WHITE,
                );
            }
        }

        let center = layout.center();
        surface.draw_text(
            Pos2::new(center.x, center.y - 6.0),
            Align2::CENTER_CENTER,
            &format!("{:.0}", self.series.total()),
            24.0,
            style::TEXT,
        );
        surface.draw_text(
            Pos2::new(center.x, center.y + 16.0),
            Align2::CENTER_CENTER,
            "Total Items",
            11.0,
            style::TEXT_MUTED,
        );
    }

    fn draw_bars(&self, surface: &mut dyn Surface) {
        let layout = self.bands();
        let plot = layout.plot_area();

        for line in 1..=GRID_LINES {
            let fraction = line as f64 / GRID_LINES as f64;
            let y = layout.grid_y(fraction);
            surface.draw_line(Pos2::new(plot.left(), y), Pos2::new(plot.right(), y), style::grid_stroke());
            surface.draw_text(
                Pos2::new(plot.left() - 5.0, y),
                Align2::RIGHT_CENTER,
                &format!("{:.0}", layout.max_value() * fraction),
                9.0,
                style::TEXT_MUTED,
            );
        }
        surface.draw_line(plot.left_bottom(), plot.right_bottom(), Stroke::new(1.0, style::TEXT_MUTED));

        for (i, (category, value)) in self.series.values.iter().enumerate() {
            let rect = layout.bar_rect(i, *value, self.progress());
            surface.draw_rect(rect, 2.0, self.color(i), Stroke::NONE);
            surface.draw_text(
                Pos2::new(rect.center().x, rect.top() - 5.0),
                Align2::CENTER_BOTTOM,
                &format!("{:.0}", value),
                10.0,
                style::TEXT,
            );
            surface.draw_text(
                Pos2::new(rect.center().x, plot.bottom() + 5.0),
                Align2::CENTER_TOP,
                category,
                10.0,
                style::TEXT_MUTED,
            );
        }
    }

    fn describe(&self, entity: EntityRef) -> Option<HoverEvent> {
        let EntityRef::Category(i) = entity else {
            return None;
        };
        let (category, value) = self.series.get_index(i)?;
        Some(self.core.hover_event(entity, category, category, value))
    }
}

impl FrameComposer for DistributionChart {
    fn draw_background(&self, surface: &mut dyn Surface, viewport: &ViewportState) {
        surface.draw_rect(viewport.rect(), 0.0, style::BACKGROUND, Stroke::NONE);
    }

    fn draw_data(&self, surface: &mut dyn Surface, _viewport: &ViewportState) {
        match self.mode {
            ChartMode::Pie => self.draw_pie(surface),
            ChartMode::Bar => self.draw_bars(surface),
        }
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
        let (category, value) = self.series.get_index(i)?;
        let total = self.series.total();
        let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
        let color = adjust_brightness(self.color(i), 20);

        let anchor = match self.mode {
            ChartMode::Pie => {
                let layout = self.sectors();
                let slice = layout.slices().get(i)?;
                self.draw_slice(surface, &layout, slice, layout.outer_radius() + ACTIVE_GROWTH, color);
                layout.label_point(slice, 1.0)
            }
            ChartMode::Bar => {
                let rect = self.bands().bar_rect(i, value, self.progress());
                surface.draw_rect(rect, 2.0, with_alpha(color, 230), style::highlight_stroke());
                rect.center_top()
            }
        };

        Some(Tooltip::new(
            anchor,
            [
                category.to_string(),
                format!("Count: {:.0}", value),
                format!("Share: {:.1}%", share),
            ],
        ))
    }
}

impl Widget for DistributionChart {
    fn id(&self) -> WidgetId {
        self.core.id
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::DistributionChart
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
        debug!(
            "Distribution '{}' received {} categories totalling {}",
            self.core.title,
            series.len(),
            series.total()
        );
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
        let change = match self.mode {
            ChartMode::Pie => {
                let layout = self.sectors();
                let scene = HitScene::Slices {
                    layout: &layout,
                    tolerance: DEFAULT_RADIUS_TOLERANCE,
                };
                self.core.track_pointer(pos, &scene)?
            }
            ChartMode::Bar => {
                let layout = self.bands();
                let scene = HitScene::Bars {
                    layout: &layout,
                    top_slack: BAR_PADDING / 2.0,
                };
                self.core.track_pointer(pos, &scene)?
            }
        };
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
            "mode": self.mode,
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

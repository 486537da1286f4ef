//! Rotating radar scanner over active threats

use std::f64::consts::TAU;

use egui::{Align2, Color32, Pos2, Stroke};
use serde_json::{json, Value};
use tracing::debug;

use tv_core::color::{severity_color, with_alpha};
use tv_core::projection::{arc_points, polar_to_surface, wrap_angle};
use tv_core::{ConfigResult, DataSource, EntityRef, HoverEvent, InteractionState, ThreatBlip, ViewportState, WidgetId};
use tv_data::{demo, WidgetConfig, WidgetKind};
use tv_render::Surface;

use super::style;
use crate::animation::{AnimationSpec, ProgressCell};
use crate::interaction::{HitScene, MARKER_HIT_RADIUS};
use crate::pipeline::{FrameComposer, Tooltip};
use crate::widget::{HoverCallback, HoverUpdate, Widget, WidgetCore};

const RINGS: usize = 4;
const EDGE_MARGIN: f64 = 10.0;
/// Angular width of the trail behind the scan line, in radians
const SWEEP_WINDOW: f64 = 0.2;
const BLIP_RADIUS: f32 = 4.0;
const SWEPT_BLIP_RADIUS: f32 = 6.0;

/// Threat blips placed by distance and bearing, lit up as the scan line passes
pub struct ThreatScanner {
    core: WidgetCore,
    blips: Vec<ThreatBlip>,
    filter: Option<String>,
    sweep: ProgressCell,
}

impl ThreatScanner {
    pub fn new(config: WidgetConfig) -> ConfigResult<Self> {
        let core = WidgetCore::new(config, WidgetKind::ThreatScanner.name())?;
        Ok(Self {
            core,
            blips: demo::threat_blips(),
            filter: None,
            sweep: ProgressCell::new(0.0),
        })
    }

    pub fn with_blips(mut self, blips: Vec<ThreatBlip>) -> Self {
        self.set_blips(blips);
        self
    }

    pub fn with_on_hover(mut self, callback: HoverCallback) -> Self {
        self.core.set_on_hover(callback);
        self
    }

    pub fn blips(&self) -> &[ThreatBlip] {
        &self.blips
    }

    pub fn set_blips(&mut self, blips: Vec<ThreatBlip>) {
        debug!("Scanner '{}' tracking {} threats", self.core.title, blips.len());
        self.blips = blips;
        self.core.clear_hover();
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for blip in &self.blips {
            if !seen.contains(&blip.category.as_str()) {
                seen.push(&blip.category);
            }
        }
        seen
    }

    /// Show only `category`, or everything with `None`
    pub fn set_category_filter(&mut self, category: Option<&str>) {
        self.filter = category.map(str::to_string);
        self.core.clear_hover();
    }

    pub fn category_filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Scan line angle in screen convention
    pub fn rotation(&self) -> f64 {
        self.sweep.get() * TAU
    }

    fn max_radius(&self) -> f64 {
        (self.core.viewport.min_side() / 2.0 - EDGE_MARGIN).max(0.0)
    }

    fn is_visible(&self, blip: &ThreatBlip) -> bool {
        self.filter.as_deref().map_or(true, |c| blip.category == c)
    }

    fn visible(&self) -> impl Iterator<Item = (usize, &ThreatBlip)> + '_ {
        self.blips.iter().enumerate().filter(|(_, b)| self.is_visible(b))
    }

    pub fn blip_position(&self, index: usize) -> Option<Pos2> {
        let blip = self.blips.get(index)?;
        let radius = blip.distance.clamp(0.0, 1.0) * self.max_radius();
        Some(polar_to_surface(self.core.viewport.center(), blip.angle_deg.to_radians(), radius))
    }

    /// Whether the scan line is currently passing over blip `index`
    pub fn is_swept(&self, index: usize) -> bool {
        let Some(blip) = self.blips.get(index) else {
            return false;
        };
        let diff = (self.rotation() - wrap_angle(blip.angle_deg.to_radians())).abs();
        diff < SWEEP_WINDOW || diff > TAU - SWEEP_WINDOW
    }

    fn pulse(&self) -> f32 {
        // One oscillation every ~630 ms of scan time
        (self.sweep.get() * self.core.config.animation_ms / 100.0).sin() as f32
    }

    fn describe(&self, entity: EntityRef) -> Option<HoverEvent> {
        let EntityRef::Blip(i) = entity else {
            return None;
        };
        let blip = self.blips.get(i)?;
        Some(self.core.hover_event(entity, blip.id.clone(), blip.name.clone(), blip.distance))
    }
}

impl FrameComposer for ThreatScanner {
    fn draw_background(&self, surface: &mut dyn Surface, viewport: &ViewportState) {
        surface.draw_rect(viewport.rect(), 0.0, style::BACKGROUND, Stroke::NONE);

        let center = viewport.center();
        let max_radius = self.max_radius() as f32;
        let ring_stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(99, 179, 237, 51));
        for ring in 1..=RINGS {
            let radius = ring as f32 / RINGS as f32 * max_radius;
            surface.draw_circle(center, radius, Color32::TRANSPARENT, ring_stroke);
        }

        let cross = Stroke::new(1.0, Color32::from_rgba_unmultiplied(99, 179, 237, 38));
        surface.draw_line(
            Pos2::new(center.x - max_radius, center.y),
            Pos2::new(center.x + max_radius, center.y),
            cross,
        );
        surface.draw_line(
            Pos2::new(center.x, center.y - max_radius),
            Pos2::new(center.x, center.y + max_radius),
            cross,
        );
    }

    fn draw_data(&self, surface: &mut dyn Surface, viewport: &ViewportState) {
        let center = viewport.center();
        let max_radius = self.max_radius();
        let rotation = self.rotation();
        let scan = Color32::from_rgb(56, 189, 248);

        surface.draw_line(
            center,
            polar_to_surface(center, rotation, max_radius),
            Stroke::new(2.0, with_alpha(scan, 153)),
        );
        surface.draw_path(
            &arc_points(center, max_radius, rotation - SWEEP_WINDOW, rotation, 12),
            Stroke::new(1.0, with_alpha(scan, 102)),
        );

        let pulse = self.pulse();
        for (i, blip) in self.visible() {
            let Some(pos) = self.blip_position(i) else {
                continue;
            };
            let color = severity_color(blip.severity);
            if self.is_swept(i) {
                surface.draw_circle(pos, SWEPT_BLIP_RADIUS, color, Stroke::NONE);
                surface.draw_circle(
                    pos,
                    SWEPT_BLIP_RADIUS + pulse * 4.0,
                    Color32::TRANSPARENT,
                    Stroke::new(2.0, with_alpha(color, 102)),
                );
            } else {
                surface.draw_circle(pos, BLIP_RADIUS, with_alpha(color, 179), Stroke::NONE);
            }
        }
    }

    fn draw_highlight(
        &self,
        surface: &mut dyn Surface,
        _viewport: &ViewportState,
        entity: EntityRef,
    ) -> Option<Tooltip> {
        let EntityRef::Blip(i) = entity else {
            return None;
        };
        let blip = self.blips.get(i)?;
        let pos = self.blip_position(i)?;

        surface.draw_circle(pos, 9.0, Color32::TRANSPARENT, style::highlight_stroke());
        surface.draw_text(
            Pos2::new(pos.x, pos.y + 12.0),
            Align2::CENTER_TOP,
            &blip.category,
            10.0,
            style::TEXT_MUTED,
        );

        Some(Tooltip::new(
            pos,
            [blip.name.clone(), format!("Severity: {:?}", blip.severity)],
        ))
    }
}

impl Widget for ThreatScanner {
    fn id(&self) -> WidgetId {
        self.core.id
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::ThreatScanner
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
            self.core.animate(spec.repeating(), &self.sweep);
        }
    }

    fn resize(&mut self, width: f32, height: f32) -> ConfigResult<()> {
        self.core.resize(width, height)
    }

    /// Blips are not a [`DataSource`]; use [`ThreatScanner::set_blips`]
    fn set_data(&mut self, data: DataSource) -> ConfigResult<()> {
        Err(self.core.reject(&data, "threat blip"))
    }

    fn on_frame(&mut self, now_ms: f64) {
        self.core.tick(now_ms);
    }

    fn render(&self, surface: &mut dyn Surface) {
        self.core.render(surface, self);
    }

    fn pointer_moved(&mut self, pos: Pos2) -> Option<HoverUpdate> {
        let markers: Vec<(usize, Pos2)> = self
            .visible()
            .filter_map(|(i, _)| self.blip_position(i).map(|p| (i, p)))
            .collect();
        let scene = HitScene::Markers {
            markers: &markers,
            radius: MARKER_HIT_RADIUS,
            entity: EntityRef::Blip,
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
            "category_filter": self.filter,
            "threats": self.blips,
        })
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

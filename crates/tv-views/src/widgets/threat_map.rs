//! World map of threat origins

use std::f64::consts::PI;

use egui::{Align2, Color32, Pos2, Rect, Stroke, Vec2};
use serde_json::{json, Value};
use tracing::debug;

use tv_core::color::with_alpha;
use tv_core::projection::GeoProjector;
use tv_core::{ConfigResult, DataSource, EntityRef, GeoMarker, HoverEvent, InteractionState, ViewportState, WidgetId};
use tv_data::{demo, WidgetConfig, WidgetKind};
use tv_render::Surface;

use super::style;
use crate::animation::{AnimationId, AnimationSpec, Easing, ProgressCell};
use crate::interaction::{HitScene, MARKER_HIT_RADIUS};
use crate::pipeline::{FrameComposer, Tooltip};
use crate::widget::{HoverCallback, HoverUpdate, Widget, WidgetCore};

const GRID_COLUMNS: usize = 6;
const GRID_ROWS: usize = 3;
const ENTRANCE_MS: f64 = 600.0;
const STAGGER_MS: f64 = 100.0;
const CURVE_LIFT: f32 = 30.0;
/// Every third marker carries a permanent label
const LABEL_EVERY: usize = 3;

/// Continent outlines in plate degrees
const CONTINENTS: [[(f64, f64); 4]; 5] = [
    [(50.0, 50.0), (100.0, 30.0), (120.0, 70.0), (80.0, 80.0)],
    [(140.0, 30.0), (250.0, 40.0), (290.0, 100.0), (180.0, 90.0)],
    [(160.0, 60.0), (180.0, 60.0), (190.0, 100.0), (150.0, 110.0)],
    [(100.0, 90.0), (120.0, 90.0), (110.0, 130.0), (90.0, 120.0)],
    [(250.0, 100.0), (290.0, 110.0), (280.0, 130.0), (250.0, 120.0)],
];

fn marker_color() -> Color32 {
    Color32::from_rgb(239, 68, 68)
}

/// Marker size in pixels, from its magnitude
fn marker_size(marker: &GeoMarker) -> f32 {
    if marker.magnitude.is_finite() {
        marker.magnitude.clamp(10.0, 20.0) as f32
    } else {
        10.0
    }
}

/// Sample a cubic Bézier curve
fn cubic_bezier(p0: Pos2, c1: Pos2, c2: Pos2, p3: Pos2, segments: usize) -> Vec<Pos2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let u = 1.0 - t;
            let v = p0.to_vec2() * (u * u * u)
                + c1.to_vec2() * (3.0 * u * u * t)
                + c2.to_vec2() * (3.0 * u * t * t)
                + p3.to_vec2() * (t * t * t);
            v.to_pos2()
        })
        .collect()
}

/// Per-marker animation state
struct MarkerMotion {
    entrance: ProgressCell,
    pulse: ProgressCell,
    ids: Vec<AnimationId>,
}

pub struct ThreatMap {
    core: WidgetCore,
    markers: Vec<GeoMarker>,
    motion: Vec<MarkerMotion>,
}

impl ThreatMap {
    pub fn new(config: WidgetConfig) -> ConfigResult<Self> {
        let core = WidgetCore::new(config, WidgetKind::ThreatMap.name())?;
        let mut map = Self {
            core,
            markers: Vec::new(),
            motion: Vec::new(),
        };
        map.replace_markers(demo::threat_markers())?;
        Ok(map)
    }

    pub fn with_markers(mut self, markers: Vec<GeoMarker>) -> ConfigResult<Self> {
        self.set_data(DataSource::GeoMarkers(markers))?;
        Ok(self)
    }

    pub fn with_on_hover(mut self, callback: HoverCallback) -> Self {
        self.core.set_on_hover(callback);
        self
    }

    pub fn markers(&self) -> &[GeoMarker] {
        &self.markers
    }

    fn projector(&self) -> GeoProjector {
        GeoProjector::new(&self.core.viewport)
    }

    pub fn marker_position(&self, index: usize) -> Option<Pos2> {
        let marker = self.markers.get(index)?;
        Some(self.projector().project(marker.lat, marker.lng))
    }

    /// Entrance scale of marker `index`
    pub fn entrance(&self, index: usize) -> Option<f64> {
        self.motion.get(index).map(|m| m.entrance.get())
    }

    /// Radius of the pulse ring around marker `index`
    pub fn pulse_radius(&self, index: usize) -> Option<f32> {
        let marker = self.markers.get(index)?;
        let wave = self.pulse_wave(index)?;
        Some(marker_size(marker) * (0.8 + 0.7 * wave))
    }

    fn pulse_wave(&self, index: usize) -> Option<f32> {
        let phase = self.motion.get(index)?.pulse.get();
        Some((phase * PI).sin() as f32)
    }

    fn replace_markers(&mut self, markers: Vec<GeoMarker>) -> ConfigResult<()> {
        for motion in self.motion.drain(..) {
            for id in motion.ids {
                self.core.scheduler.cancel(id);
            }
        }
        self.core.scheduler.prune();
        self.markers = markers;
        self.motion = self
            .markers
            .iter()
            .map(|_| MarkerMotion {
                entrance: ProgressCell::new(0.0),
                pulse: ProgressCell::new(0.0),
                ids: Vec::new(),
            })
            .collect();
        self.core.clear_hover();
        if self.core.is_mounted() {
            self.start_motion()?;
        }
        Ok(())
    }

    /// Staggered pop-in plus a looping pulse, periods cycling over three lengths
    fn start_motion(&mut self) -> ConfigResult<()> {
        let base = self.core.config.animation_ms;
        for (i, motion) in self.motion.iter_mut().enumerate() {
            let entrance = AnimationSpec::new(ENTRANCE_MS)?
                .with_easing(Easing::EaseOutBack)
                .with_delay(i as f64 * STAGGER_MS);
            let pulse = AnimationSpec::new(base + (i % 3) as f64 * 1000.0)?.repeating();
            motion.ids = vec![
                self.core.animate(entrance, &motion.entrance),
                self.core.animate(pulse, &motion.pulse),
            ];
        }
        Ok(())
    }

    fn describe(&self, entity: EntityRef) -> Option<HoverEvent> {
        let EntityRef::Marker(i) = entity else {
            return None;
        };
        let marker = self.markers.get(i)?;
        Some(self.core.hover_event(entity, marker.id.clone(), marker.label.clone(), marker.magnitude))
    }

    fn draw_label(&self, surface: &mut dyn Surface, pos: Pos2, text: &str) {
        let width = text.chars().count() as f32 * 5.0 + 10.0;
        let rect = Rect::from_min_size(Pos2::new(pos.x + 10.0, pos.y - 15.0), Vec2::new(width, 20.0));
        surface.draw_rect(rect, 3.0, Color32::from_black_alpha(179), Stroke::NONE);
        surface.draw_text(
            Pos2::new(pos.x + 15.0, rect.center().y),
            Align2::LEFT_CENTER,
            text,
            10.0,
            Color32::WHITE,
        );
    }
}

impl FrameComposer for ThreatMap {
    fn draw_background(&self, surface: &mut dyn Surface, viewport: &ViewportState) {
        surface.draw_rect(viewport.rect(), 0.0, style::BACKGROUND, Stroke::NONE);

        let (w, h) = (viewport.width_px, viewport.height_px);
        let grid = Stroke::new(0.5, Color32::from_rgba_unmultiplied(99, 179, 237, 77));
        for i in 0..=GRID_COLUMNS {
            let x = i as f32 / GRID_COLUMNS as f32 * w;
            surface.draw_line(Pos2::new(x, 0.0), Pos2::new(x, h), grid);
        }
        for i in 0..=GRID_ROWS {
            let y = i as f32 / GRID_ROWS as f32 * h;
            surface.draw_line(Pos2::new(0.0, y), Pos2::new(w, y), grid);
        }

        let projector = self.projector();
        let outline = Stroke::new(0.5, Color32::from_rgba_unmultiplied(99, 179, 237, 102));
        for continent in CONTINENTS {
            let points: Vec<Pos2> = continent.iter().map(|(x, y)| projector.plate_point(*x, *y)).collect();
            surface.draw_polygon(&points, Color32::from_rgba_unmultiplied(99, 179, 237, 13), outline);
        }

        surface.draw_text(
            Pos2::new(w - 12.0, h - 8.0),
            Align2::RIGHT_BOTTOM,
            "Real-time threat detection",
            10.0,
            style::TEXT_MUTED,
        );
    }

    fn draw_data(&self, surface: &mut dyn Surface, _viewport: &ViewportState) {
        let positions: Vec<Pos2> = (0..self.markers.len())
            .filter_map(|i| self.marker_position(i))
            .collect();

        let link = Stroke::new(1.0, Color32::from_rgba_unmultiplied(59, 130, 246, 77));
        for pair in positions.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            let mid_x = (start.x + end.x) / 2.0;
            let curve = cubic_bezier(
                start,
                Pos2::new(mid_x, start.y - CURVE_LIFT),
                Pos2::new(mid_x, end.y + CURVE_LIFT),
                end,
                24,
            );
            surface.draw_path(&curve, link);
        }

        let red = marker_color();
        for (i, (marker, pos)) in self.markers.iter().zip(&positions).enumerate() {
            let size = marker_size(marker);
            if let (Some(radius), Some(wave)) = (self.pulse_radius(i), self.pulse_wave(i)) {
                let opacity = 0.3 - 0.2 * wave;
                surface.draw_circle(*pos, radius, with_alpha(red, (opacity * 255.0) as u8), Stroke::NONE);
            }

            let scale = self.entrance(i).unwrap_or(0.0).max(0.0) as f32;
            if scale > 1e-3 {
                surface.draw_circle(
                    *pos,
                    size * 0.45 * scale,
                    with_alpha(red, 230),
                    Stroke::new(1.0, Color32::WHITE),
                );
            }

            if i % LABEL_EVERY == 0 {
                self.draw_label(surface, *pos, &marker.label);
            }
        }
    }

    fn draw_highlight(
        &self,
        surface: &mut dyn Surface,
        _viewport: &ViewportState,
        entity: EntityRef,
    ) -> Option<Tooltip> {
        let EntityRef::Marker(i) = entity else {
            return None;
        };
        let marker = self.markers.get(i)?;
        let pos = self.marker_position(i)?;

        surface.draw_circle(pos, marker_size(marker) * 0.45 + 4.0, Color32::TRANSPARENT, style::highlight_stroke());

        Some(Tooltip::new(
            pos,
            [
                marker.label.clone(),
                format!("Magnitude: {:.0}", marker.magnitude),
                format!("{:.2}°, {:.2}°", marker.lat, marker.lng),
            ],
        ))
    }
}

impl Widget for ThreatMap {
    fn id(&self) -> WidgetId {
        self.core.id
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::ThreatMap
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
        if let Err(e) = self.start_motion() {
            debug!("Map '{}' runs without animation: {}", self.core.title, e);
        }
    }

    fn resize(&mut self, width: f32, height: f32) -> ConfigResult<()> {
        self.core.resize(width, height)
    }

    fn set_data(&mut self, data: DataSource) -> ConfigResult<()> {
        let markers = match data {
            DataSource::GeoMarkers(markers) => markers,
            other => return Err(self.core.reject(&other, "geo markers")),
        };
        debug!("Map '{}' received {} markers", self.core.title, markers.len());
        self.replace_markers(markers)
    }

    fn on_frame(&mut self, now_ms: f64) {
        self.core.tick(now_ms);
    }

    fn render(&self, surface: &mut dyn Surface) {
        self.core.render(surface, self);
    }

    fn pointer_moved(&mut self, pos: Pos2) -> Option<HoverUpdate> {
        let markers: Vec<(usize, Pos2)> = (0..self.markers.len())
            .filter_map(|i| self.marker_position(i).map(|p| (i, p)))
            .collect();
        let scene = HitScene::Markers {
            markers: &markers,
            radius: MARKER_HIT_RADIUS,
            entity: EntityRef::Marker,
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
        for motion in &mut self.motion {
            motion.ids.clear();
        }
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
            "markers": self.markers,
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
    use tv_core::Series;
    use tv_render::DisplayList;

    fn mounted() -> ThreatMap {
        let mut map = ThreatMap::new(WidgetConfig::new(WidgetKind::ThreatMap)).unwrap();
        map.mount();
        map.on_frame(0.0);
        map
    }

    #[test]
    fn test_markers_project_onto_plate() {
        let map = mounted();
        // San Francisco on a 600 px plate
        let sf = map.marker_position(0).unwrap();
        assert!((sf.x - 95.967).abs() < 1e-2);
        assert!(sf.y < 150.0);
        // Southern hemisphere sits below the equator
        assert!(map.marker_position(5).unwrap().y > 150.0);
    }

    #[test]
    fn test_entrance_is_staggered() {
        let mut map = mounted();
        map.on_frame(100.0);
        assert!(map.entrance(0).unwrap() > 0.0);
        assert!(map.entrance(1).unwrap().abs() < 1e-9);
        assert!(map.entrance(7).unwrap().abs() < 1e-9);

        map.on_frame(5000.0);
        for i in 0..map.markers().len() {
            assert!((map.entrance(i).unwrap() - 1.0).abs() < 1e-12, "marker {}", i);
        }
        // Pulses loop forever
        assert!(map.needs_repaint());
    }

    #[test]
    fn test_pulse_periods_cycle() {
        let mut map = mounted();
        // Marker 0 pulses every 2 s, marker 1 every 3 s
        map.on_frame(1000.0);
        assert!((map.pulse_radius(0).unwrap() - 15.0).abs() < 1e-3);
        map.on_frame(1500.0);
        // New York: magnitude 15 peaks at 22.5
        assert!((map.pulse_radius(1).unwrap() - 22.5).abs() < 1e-3);
    }

    #[test]
    fn test_labels_and_hover() {
        let mut map = mounted();
        map.on_frame(5000.0);

        let mut list = DisplayList::new();
        map.render(&mut list);
        assert!(list.contains_text("San Francisco"));
        assert!(list.contains_text("New Delhi"));
        assert!(list.contains_text("Moscow"));
        assert!(!list.contains_text("New York"));
        assert!(list.contains_text("Real-time threat detection"));

        let ny = map.marker_position(1).unwrap();
        match map.pointer_moved(Pos2::new(ny.x + 3.0, ny.y)) {
            Some(HoverUpdate::Entered(event)) => {
                assert_eq!(event.entity_id, "2");
                assert_eq!(event.value, 15.0);
            }
            other => panic!("unexpected hover update {:?}", other),
        }
        let mut list = DisplayList::new();
        map.render(&mut list);
        assert!(list.contains_text("New York"));
        assert!(list.contains_text("Magnitude: 15"));
        assert_eq!(map.pointer_left(), Some(HoverUpdate::Cleared));
    }

    #[test]
    fn test_new_markers_restart_motion() {
        let mut map = mounted();
        map.on_frame(5000.0);

        let markers = vec![
            GeoMarker::new("a", 0.0, 0.0, 30.0, "Null Island"),
            GeoMarker::new("b", 89.9, 0.0, 5.0, "Pole"),
        ];
        map.set_data(DataSource::GeoMarkers(markers)).unwrap();
        assert_eq!(map.markers().len(), 2);
        assert_eq!(map.entrance(0), Some(0.0));
        // Latitude near the pole is clamped, not infinite
        assert!(map.marker_position(1).unwrap().y.is_finite());

        assert!(map
            .set_data(DataSource::CategorySeries(Series::new("x", style::ACCENT)))
            .is_err());
        assert_eq!(map.markers().len(), 2);
    }

    #[test]
    fn test_empty_map_is_idle() {
        let mut map = mounted();
        map.set_data(DataSource::GeoMarkers(Vec::new())).unwrap();
        map.on_frame(100.0);
        assert!(!map.needs_repaint());
        assert_eq!(map.pointer_moved(Pos2::new(300.0, 150.0)), None);
        let mut list = DisplayList::new();
        map.render(&mut list);
        assert!(list.circles().next().is_none());
    }
}

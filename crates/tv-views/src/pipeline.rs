//! Layered per-frame rendering
//!
//! Each frame is drawn in the same order: clear, static background, data,
//! then the hover overlay. Layers only read widget state, so rendering the
//! same state twice produces the same commands.

use egui::{Align2, Color32, Pos2, Rect, Stroke, Vec2};

use tv_core::{EntityRef, InteractionState, ViewportState};
use tv_render::Surface;

/// Tooltip content anchored at an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub anchor: Pos2,
    pub lines: Vec<String>,
}

impl Tooltip {
    pub fn new(anchor: Pos2, lines: impl IntoIterator<Item = String>) -> Self {
        Self {
            anchor,
            lines: lines.into_iter().collect(),
        }
    }
}

/// Widget-specific drawing of each layer
pub trait FrameComposer {
    fn draw_background(&self, surface: &mut dyn Surface, viewport: &ViewportState);

    fn draw_data(&self, surface: &mut dyn Surface, viewport: &ViewportState);

    /// Highlight the hovered entity and describe it
    fn draw_highlight(
        &self,
        surface: &mut dyn Surface,
        viewport: &ViewportState,
        entity: EntityRef,
    ) -> Option<Tooltip>;
}

/// Tooltip box appearance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipStyle {
    pub min_size: Vec2,
    pub line_height: f32,
    pub char_width: f32,
    pub padding: f32,
    /// Gap between the anchor and the box
    pub offset: f32,
    pub font_size: f32,
    pub fill: Color32,
    pub stroke: Stroke,
    pub text_color: Color32,
}

impl Default for TooltipStyle {
    fn default() -> Self {
        Self {
            min_size: Vec2::new(100.0, 40.0),
            line_height: 15.0,
            char_width: 6.5,
            padding: 6.0,
            offset: 10.0,
            font_size: 11.0,
            fill: Color32::from_rgba_unmultiplied(15, 23, 42, 230),
            stroke: Stroke::new(1.0, Color32::from_rgba_unmultiplied(59, 130, 246, 128)),
            text_color: Color32::WHITE,
        }
    }
}

impl TooltipStyle {
    /// Box size needed for `lines`, never smaller than `min_size`
    pub fn measure(&self, lines: &[String]) -> Vec2 {
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f32;
        Vec2::new(
            (widest * self.char_width + 2.0 * self.padding).max(self.min_size.x),
            (lines.len() as f32 * self.line_height + 2.0 * self.padding).max(self.min_size.y),
        )
    }
}

/// Place a `size` box centered above `anchor`, kept inside the viewport
///
/// Flips below the anchor when there is no room above. A box larger than the
/// viewport is pinned to the top-left corner.
pub fn place_tooltip(anchor: Pos2, size: Vec2, offset: f32, viewport: &ViewportState) -> Rect {
    let max_x = (viewport.width_px - size.x).max(0.0);
    let max_y = (viewport.height_px - size.y).max(0.0);

    let x = (anchor.x - size.x / 2.0).clamp(0.0, max_x);
    let mut y = anchor.y - offset - size.y;
    if y < 0.0 {
        y = anchor.y + offset;
    }
    let y = y.clamp(0.0, max_y);

    Rect::from_min_size(Pos2::new(x, y), size)
}

/// Draws frames through a [`FrameComposer`]
#[derive(Debug, Clone, Default)]
pub struct RenderPipeline {
    tooltip_style: TooltipStyle,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tooltip_style(mut self, style: TooltipStyle) -> Self {
        self.tooltip_style = style;
        self
    }

    pub fn render(
        &self,
        surface: &mut dyn Surface,
        viewport: &ViewportState,
        composer: &dyn FrameComposer,
        interaction: &InteractionState,
    ) {
        surface.begin_frame(*viewport);
        composer.draw_background(surface, viewport);
        composer.draw_data(surface, viewport);

        if let Some(entity) = interaction.hovered {
            if let Some(tooltip) = composer.draw_highlight(surface, viewport, entity) {
                self.draw_tooltip(surface, viewport, &tooltip);
            }
        }

        surface.end_frame();
    }

    fn draw_tooltip(&self, surface: &mut dyn Surface, viewport: &ViewportState, tooltip: &Tooltip) {
        let style = &self.tooltip_style;
        let size = style.measure(&tooltip.lines);
        let rect = place_tooltip(tooltip.anchor, size, style.offset, viewport);

        surface.draw_rect(rect, 4.0, style.fill, style.stroke);

        let text_height = tooltip.lines.len() as f32 * style.line_height;
        let top = rect.center().y - text_height / 2.0 + style.line_height / 2.0;
        for (i, line) in tooltip.lines.iter().enumerate() {
            let pos = Pos2::new(rect.center().x, top + i as f32 * style.line_height);
            surface.draw_text(pos, Align2::CENTER_CENTER, line, style.font_size, style.text_color);
        }
    }
}

//! Rendering abstraction layer
//!
//! Widgets draw through the [`Surface`] trait in local surface coordinates.
//! [`DisplayList`] records the commands headlessly; [`PainterSurface`] sends
//! them to an egui painter.

mod display_list;
mod painter;

pub use display_list::{DisplayList, DrawCommand};
pub use painter::PainterSurface;

use egui::{Align2, Color32, Pos2, Rect, Stroke};
use tv_core::ViewportState;

/// Trait for drawing surfaces
pub trait Surface: Send {
    /// Begin a new frame, discarding whatever was drawn before
    fn begin_frame(&mut self, viewport: ViewportState);

    /// End the current frame
    fn end_frame(&mut self);

    /// Draw a line segment
    fn draw_line(&mut self, start: Pos2, end: Pos2, stroke: Stroke);

    /// Draw an open polyline
    fn draw_path(&mut self, points: &[Pos2], stroke: Stroke);

    /// Draw a closed polygon
    fn draw_polygon(&mut self, points: &[Pos2], fill: Color32, stroke: Stroke);

    /// Draw a circle
    fn draw_circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke);

    /// Draw a rectangle
    fn draw_rect(&mut self, rect: Rect, rounding: f32, fill: Color32, stroke: Stroke);

    /// Draw text anchored at `pos`
    fn draw_text(&mut self, pos: Pos2, anchor: Align2, text: &str, size: f32, color: Color32);
}

/// Replay recorded commands onto another surface
pub fn replay(list: &DisplayList, target: &mut dyn Surface) {
    if let Some(viewport) = list.viewport() {
        target.begin_frame(viewport);
    }
    for command in list.commands() {
        command.apply(target);
    }
    target.end_frame();
}

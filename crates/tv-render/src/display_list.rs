use egui::{Align2, Color32, Pos2, Rect, Stroke};
use tv_core::ViewportState;

use crate::Surface;

/// One recorded drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line {
        start: Pos2,
        end: Pos2,
        stroke: Stroke,
    },
    Path {
        points: Vec<Pos2>,
        stroke: Stroke,
    },
    Polygon {
        points: Vec<Pos2>,
        fill: Color32,
        stroke: Stroke,
    },
    Circle {
        center: Pos2,
        radius: f32,
        fill: Color32,
        stroke: Stroke,
    },
    Rect {
        rect: Rect,
        rounding: f32,
        fill: Color32,
        stroke: Stroke,
    },
    Text {
        pos: Pos2,
        anchor: Align2,
        text: String,
        size: f32,
        color: Color32,
    },
}

impl DrawCommand {
    pub fn apply(&self, target: &mut dyn Surface) {
        match self {
            DrawCommand::Line { start, end, stroke } => target.draw_line(*start, *end, *stroke),
            DrawCommand::Path { points, stroke } => target.draw_path(points, *stroke),
            DrawCommand::Polygon { points, fill, stroke } => target.draw_polygon(points, *fill, *stroke),
            DrawCommand::Circle {
                center,
                radius,
                fill,
                stroke,
            } => target.draw_circle(*center, *radius, *fill, *stroke),
            DrawCommand::Rect {
                rect,
                rounding,
                fill,
                stroke,
            } => target.draw_rect(*rect, *rounding, *fill, *stroke),
            DrawCommand::Text {
                pos,
                anchor,
                text,
                size,
                color,
            } => target.draw_text(*pos, *anchor, text, *size, *color),
        }
    }
}

/// Headless surface recording every command of the last frame
///
/// Two renders of the same state compare equal, which is what the widget
/// tests rely on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    viewport: Option<ViewportState>,
    commands: Vec<DrawCommand>,
    finished: bool,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(&self) -> Option<ViewportState> {
        self.viewport
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// All text drawn this frame, in order
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }

    pub fn circles(&self) -> impl Iterator<Item = (Pos2, f32)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Circle { center, radius, .. } => Some((*center, *radius)),
            _ => None,
        })
    }

    pub fn rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Rect { rect, .. } => Some(*rect),
            _ => None,
        })
    }

    /// Bounding box of every point-like coordinate drawn, text anchors included
    pub fn bounds(&self) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        let mut grow = |p: Pos2| {
            bounds = Some(match bounds {
                Some(b) => b.union(Rect::from_min_max(p, p)),
                None => Rect::from_min_max(p, p),
            });
        };
        for command in &self.commands {
            match command {
                DrawCommand::Line { start, end, .. } => {
                    grow(*start);
                    grow(*end);
                }
                DrawCommand::Path { points, .. } | DrawCommand::Polygon { points, .. } => {
                    points.iter().copied().for_each(&mut grow);
                }
                DrawCommand::Circle { center, .. } => grow(*center),
                DrawCommand::Rect { rect, .. } => {
                    grow(rect.min);
                    grow(rect.max);
                }
                DrawCommand::Text { pos, .. } => grow(*pos),
            }
        }
        bounds
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

impl Surface for DisplayList {
    fn begin_frame(&mut self, viewport: ViewportState) {
        self.viewport = Some(viewport);
        self.commands.clear();
        self.finished = false;
    }

    fn end_frame(&mut self) {
        self.finished = true;
    }

    fn draw_line(&mut self, start: Pos2, end: Pos2, stroke: Stroke) {
        self.push(DrawCommand::Line { start, end, stroke });
    }

    fn draw_path(&mut self, points: &[Pos2], stroke: Stroke) {
        if points.len() < 2 {
            return;
        }
        self.push(DrawCommand::Path {
            points: points.to_vec(),
            stroke,
        });
    }

    fn draw_polygon(&mut self, points: &[Pos2], fill: Color32, stroke: Stroke) {
        if points.len() < 3 {
            return;
        }
        self.push(DrawCommand::Polygon {
            points: points.to_vec(),
            fill,
            stroke,
        });
    }

    fn draw_circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke) {
        self.push(DrawCommand::Circle {
            center,
            radius,
            fill,
            stroke,
        });
    }

    fn draw_rect(&mut self, rect: Rect, rounding: f32, fill: Color32, stroke: Stroke) {
        self.push(DrawCommand::Rect {
            rect,
            rounding,
            fill,
            stroke,
        });
    }

    fn draw_text(&mut self, pos: Pos2, anchor: Align2, text: &str, size: f32, color: Color32) {
        self.push(DrawCommand::Text {
            pos,
            anchor,
            text: text.to_string(),
            size,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay;

    fn frame(list: &mut DisplayList) {
        list.begin_frame(ViewportState::new(100.0, 50.0).unwrap());
        list.draw_line(Pos2::new(0.0, 0.0), Pos2::new(10.0, 10.0), Stroke::new(1.0, Color32::RED));
        list.draw_circle(Pos2::new(50.0, 25.0), 4.0, Color32::WHITE, Stroke::NONE);
        list.draw_text(Pos2::new(90.0, 40.0), Align2::CENTER_CENTER, "42", 12.0, Color32::WHITE);
        list.end_frame();
    }

    #[test]
    fn test_begin_frame_clears() {
        let mut list = DisplayList::new();
        frame(&mut list);
        let first = list.clone();
        frame(&mut list);
        assert_eq!(list, first);
        assert_eq!(list.len(), 3);
        assert!(list.is_finished());
        assert!(list.contains_text("42"));
    }

    #[test]
    fn test_degenerate_shapes_are_skipped() {
        let mut list = DisplayList::new();
        list.begin_frame(ViewportState::new(10.0, 10.0).unwrap());
        list.draw_path(&[Pos2::ZERO], Stroke::new(1.0, Color32::RED));
        list.draw_polygon(&[Pos2::ZERO, Pos2::new(1.0, 1.0)], Color32::RED, Stroke::NONE);
        assert!(list.is_empty());
        assert_eq!(list.bounds(), None);
    }

    #[test]
    fn test_replay_reproduces_commands() {
        let mut source = DisplayList::new();
        frame(&mut source);
        let mut copy = DisplayList::new();
        replay(&source, &mut copy);
        assert_eq!(copy, source);
        assert_eq!(
            copy.bounds(),
            Some(Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(90.0, 40.0)))
        );
    }
}

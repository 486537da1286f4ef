use egui::{epaint::PathShape, Align2, Color32, FontId, Mesh, Painter, Pos2, Rect, Shape, Stroke, Vec2};
use tracing::trace;
use tv_core::ViewportState;

use crate::Surface;

/// Surface drawing into an egui painter
///
/// Local coordinates are offset by `origin`, the top-left of the widget's
/// allocated rect.
pub struct PainterSurface {
    painter: Painter,
    origin: Vec2,
    shapes: usize,
}

impl PainterSurface {
    pub fn new(painter: Painter, origin: Pos2) -> Self {
        Self {
            painter,
            origin: origin.to_vec2(),
            shapes: 0,
        }
    }

    fn at(&self, pos: Pos2) -> Pos2 {
        pos + self.origin
    }

    fn add(&mut self, shape: Shape) {
        self.shapes += 1;
        self.painter.add(shape);
    }
}

impl Surface for PainterSurface {
    fn begin_frame(&mut self, viewport: ViewportState) {
        self.shapes = 0;
        let clip = viewport.rect().translate(self.origin);
        self.painter = self.painter.with_clip_rect(clip);
    }

    fn end_frame(&mut self) {
        trace!("Painted {} shapes", self.shapes);
    }

    fn draw_line(&mut self, start: Pos2, end: Pos2, stroke: Stroke) {
        self.add(Shape::line_segment([self.at(start), self.at(end)], stroke));
    }

    fn draw_path(&mut self, points: &[Pos2], stroke: Stroke) {
        let points = points.iter().map(|p| self.at(*p)).collect();
        self.add(Shape::line(points, stroke));
    }

    fn draw_polygon(&mut self, points: &[Pos2], fill: Color32, stroke: Stroke) {
        let points: Vec<Pos2> = points.iter().map(|p| self.at(*p)).collect();
        if is_convex(&points) {
            self.add(Shape::Path(PathShape::convex_polygon(points, fill, stroke)));
            return;
        }

        // egui only fills convex paths; anything else goes through a mesh
        if fill != Color32::TRANSPARENT {
            let mut mesh = Mesh::default();
            for p in &points {
                mesh.colored_vertex(*p, fill);
            }
            for [a, b, c] in triangulate(&points) {
                mesh.add_triangle(a as u32, b as u32, c as u32);
            }
            self.add(Shape::mesh(mesh));
        }
        if stroke.width > 0.0 {
            self.add(Shape::closed_line(points, stroke));
        }
    }

    fn draw_circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke) {
        self.add(Shape::circle_filled(self.at(center), radius, fill));
        if stroke.width > 0.0 {
            self.add(Shape::circle_stroke(self.at(center), radius, stroke));
        }
    }

    fn draw_rect(&mut self, rect: Rect, rounding: f32, fill: Color32, stroke: Stroke) {
        let rect = rect.translate(self.origin);
        self.add(Shape::rect_filled(rect, rounding, fill));
        if stroke.width > 0.0 {
            self.add(Shape::rect_stroke(rect, rounding, stroke));
        }
    }

    fn draw_text(&mut self, pos: Pos2, anchor: Align2, text: &str, size: f32, color: Color32) {
        self.shapes += 1;
        self.painter
            .text(self.at(pos), anchor, text, FontId::proportional(size), color);
    }
}

const EPSILON: f32 = 1e-6;

fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn signed_area(points: &[Pos2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        / 2.0
}

/// All turns go the same way
fn is_convex(points: &[Pos2]) -> bool {
    let n = points.len();
    if n < 4 {
        return true;
    }
    let mut sign = 0.0;
    for i in 0..n {
        let turn = cross(points[i], points[(i + 1) % n], points[(i + 2) % n]);
        if turn.abs() <= EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = turn.signum();
        } else if turn.signum() != sign {
            return false;
        }
    }
    true
}

fn in_triangle(p: Pos2, a: Pos2, b: Pos2, c: Pos2) -> bool {
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Ear-clipping triangulation of a simple polygon, as vertex indices
pub(crate) fn triangulate(points: &[Pos2]) -> Vec<[usize; 3]> {
    let mut triangles = Vec::new();
    if points.len() < 3 {
        return triangles;
    }
    let orientation = signed_area(points).signum();
    let mut remaining: Vec<usize> = (0..points.len()).collect();

    while remaining.len() > 3 {
        let n = remaining.len();
        let mut clipped = false;
        for i in 0..n {
            let (prev, cur, next) = (remaining[(i + n - 1) % n], remaining[i], remaining[(i + 1) % n]);
            let (a, b, c) = (points[prev], points[cur], points[next]);
            let turn = cross(a, b, c) * orientation;
            if turn.abs() <= EPSILON {
                // Collinear vertex adds no area
                remaining.remove(i);
                clipped = true;
                break;
            }
            if turn < 0.0 {
                continue;
            }
            let blocked = remaining.iter().any(|&j| {
                let p = points[j];
                j != prev && j != cur && j != next && p != a && p != b && p != c && in_triangle(p, a, b, c)
            });
            if !blocked {
                triangles.push([prev, cur, next]);
                remaining.remove(i);
                clipped = true;
                break;
            }
        }
        if !clipped {
            // Self-intersecting input: fan out what is left
            for i in 1..remaining.len() - 1 {
                triangles.push([remaining[0], remaining[i], remaining[i + 1]]);
            }
            return triangles;
        }
    }
    if cross(points[remaining[0]], points[remaining[1]], points[remaining[2]]).abs() > EPSILON {
        triangles.push([remaining[0], remaining[1], remaining[2]]);
    }
    triangles
}

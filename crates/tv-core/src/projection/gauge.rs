//! Semicircular gauge projection

use std::f64::consts::PI;

use egui::Pos2;

use crate::normalize::{normalize_clamped, Range};

/// Maps a value onto the upper half circle: `min` at the left end, `max` at
/// the right end, passing over the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeProjector {
    center: Pos2,
    radius: f64,
    range: Range,
}

impl GaugeProjector {
    pub fn new(center: Pos2, radius: f64, range: Range) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            range,
        }
    }

    pub fn center(&self) -> Pos2 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn range(&self) -> Range {
        self.range
    }

    /// Sweep angle in `[0, π]` covered by `value`
    pub fn sweep_for(&self, value: f64) -> f64 {
        normalize_clamped(value, self.range.min, self.range.max) * PI
    }

    /// Point at `value` on a circle of `radius`
    pub fn point_at(&self, value: f64, radius: f64) -> Pos2 {
        self.point_at_sweep(self.sweep_for(value), radius)
    }

    pub fn point_at_sweep(&self, sweep: f64, radius: f64) -> Pos2 {
        Pos2::new(
            (self.center.x as f64 - sweep.cos() * radius) as f32,
            (self.center.y as f64 - sweep.sin() * radius) as f32,
        )
    }

    /// Polyline of the arc from `min` to `value` at `radius`
    pub fn arc(&self, value: f64, radius: f64, segments: usize) -> Vec<Pos2> {
        let sweep = self.sweep_for(value);
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point_at_sweep(sweep * i as f64 / segments as f64, radius))
            .collect()
    }

    /// Value under `pos` if it falls inside the band `[inner, outer]` of the upper half
    pub fn value_at(&self, pos: Pos2, inner: f64, outer: f64) -> Option<f64> {
        let dx = self.center.x as f64 - pos.x as f64;
        let dy = self.center.y as f64 - pos.y as f64;
        let radius = (dx * dx + dy * dy).sqrt();
        if radius < inner || radius > outer || dy < 0.0 {
            return None;
        }
        let sweep = dy.atan2(dx);
        Some(self.range.denormalize(sweep / PI))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gauge() -> GaugeProjector {
        GaugeProjector::new(Pos2::new(50.0, 50.0), 40.0, Range::new(0.0, 100.0))
    }

    #[test]
    fn test_endpoints_and_top() {
        let g = gauge();
        let left = g.point_at(0.0, 40.0);
        let top = g.point_at(50.0, 40.0);
        let right = g.point_at(100.0, 40.0);
        assert!((left.x - 10.0).abs() < 1e-4 && (left.y - 50.0).abs() < 1e-4);
        assert!((top.x - 50.0).abs() < 1e-4 && (top.y - 10.0).abs() < 1e-4);
        assert!((right.x - 90.0).abs() < 1e-4 && (right.y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_value_at_round_trip() {
        let g = gauge();
        for v in [5.0, 25.0, 42.0, 75.0, 95.0] {
            let pos = g.point_at(v, 36.0);
            let back = g.value_at(pos, 32.0, 40.0).unwrap();
            assert!((back - v).abs() < 1e-3, "{} vs {}", v, back);
        }
        // Lower half and outside the band miss
        assert_eq!(g.value_at(Pos2::new(50.0, 80.0), 32.0, 40.0), None);
        assert_eq!(g.value_at(Pos2::new(50.0, 30.0), 32.0, 40.0), None);
    }

    #[test]
    fn test_arc_clamps_value() {
        let g = gauge();
        let arc = g.arc(250.0, 40.0, 8);
        assert_eq!(arc.len(), 9);
        let end = *arc.last().unwrap();
        assert!((end.x - 90.0).abs() < 1e-4);
    }
}

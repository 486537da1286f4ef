//! Polar (radar) projection with sector bucketing

use std::f64::consts::{FRAC_PI_2, TAU};

use egui::Pos2;

use super::{angle_from_top, polar_to_surface, wrap_angle};
use crate::normalize::{normalize_clamped, Range};

/// Default slack beyond the outer ring before a pointer counts as off-chart
pub const DEFAULT_RADIUS_TOLERANCE: f64 = 10.0;

/// Pointer position expressed relative to the projector's center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarCoord {
    /// Screen-space angle in `[0, 2π)` (0 = east, clockwise)
    pub angle: f64,
    pub radius: f64,
}

/// Places `k` categories on evenly spaced spokes, starting at the top and
/// running clockwise, with values scaled to `max_radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarProjector {
    center: Pos2,
    max_radius: f64,
    range: Range,
    categories: usize,
}

impl PolarProjector {
    pub fn new(center: Pos2, max_radius: f64, range: Range, categories: usize) -> Self {
        Self {
            center,
            max_radius: max_radius.max(0.0),
            range,
            categories,
        }
    }

    pub fn center(&self) -> Pos2 {
        self.center
    }

    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    pub fn categories(&self) -> usize {
        self.categories
    }

    pub fn range(&self) -> Range {
        self.range
    }

    /// Angle of spoke `i`: `2π·i/k − π/2`. With no categories every spoke points up.
    pub fn angle_for(&self, i: usize) -> f64 {
        if self.categories == 0 {
            return -FRAC_PI_2;
        }
        TAU * i as f64 / self.categories as f64 - FRAC_PI_2
    }

    /// Radius for `value`, clamped to the outer ring
    pub fn radius_for(&self, value: f64) -> f64 {
        normalize_clamped(value, self.range.min, self.range.max) * self.max_radius
    }

    pub fn project(&self, i: usize, value: f64) -> Pos2 {
        self.project_radius(i, self.radius_for(value))
    }

    /// Point on spoke `i` at an explicit radius
    pub fn project_radius(&self, i: usize, radius: f64) -> Pos2 {
        polar_to_surface(self.center, self.angle_for(i), radius)
    }

    pub fn inverse(&self, pos: Pos2) -> PolarCoord {
        let dx = pos.x as f64 - self.center.x as f64;
        let dy = pos.y as f64 - self.center.y as f64;
        PolarCoord {
            angle: wrap_angle(dy.atan2(dx)),
            radius: (dx * dx + dy * dy).sqrt(),
        }
    }

    /// Category whose sector contains `pos`.
    ///
    /// Sectors are centered on their spoke. Returns `None` with no categories
    /// or when the pointer lies beyond `max_radius + tolerance`.
    pub fn category_at(&self, pos: Pos2, tolerance: f64) -> Option<usize> {
        if self.categories == 0 {
            return None;
        }
        let coord = self.inverse(pos);
        if coord.radius > self.max_radius + tolerance {
            return None;
        }
        let sector = TAU / self.categories as f64;
        let from_top = angle_from_top(coord.angle);
        Some((from_top / sector).round() as usize % self.categories)
    }

    /// Closed ring polygon through every spoke at `radius`
    pub fn ring(&self, radius: f64) -> Vec<Pos2> {
        (0..self.categories).map(|i| self.project_radius(i, radius)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radar() -> PolarProjector {
        PolarProjector::new(Pos2::new(100.0, 100.0), 80.0, Range::new(0.0, 100.0), 4)
    }

    fn close(a: Pos2, b: Pos2) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn test_radar_scenario() {
        let p = radar();
        let values = [100.0, 0.0, 50.0, 25.0];
        assert!(close(p.project(0, values[0]), Pos2::new(100.0, 20.0)));
        assert!(close(p.project(1, values[1]), Pos2::new(100.0, 100.0)));
        assert!(close(p.project(2, values[2]), Pos2::new(100.0, 140.0)));
        assert!(close(p.project(3, values[3]), Pos2::new(80.0, 100.0)));
    }

    #[test]
    fn test_inverse_recovers_category() {
        for k in [1usize, 3, 4, 5, 7, 12] {
            let p = PolarProjector::new(Pos2::new(250.0, 250.0), 120.0, Range::new(0.0, 100.0), k);
            for i in 0..k {
                for r in [1.0, 30.0, 119.9, 120.0] {
                    let pos = p.project_radius(i, r);
                    assert_eq!(p.category_at(pos, DEFAULT_RADIUS_TOLERANCE), Some(i), "k={} i={} r={}", k, i, r);
                }
            }
        }
    }

    #[test]
    fn test_beyond_tolerance_is_none() {
        let p = radar();
        let outside = p.project_radius(2, 80.0 + DEFAULT_RADIUS_TOLERANCE + 0.5);
        assert_eq!(p.category_at(outside, DEFAULT_RADIUS_TOLERANCE), None);
        let inside = p.project_radius(2, 80.0 + DEFAULT_RADIUS_TOLERANCE - 0.5);
        assert_eq!(p.category_at(inside, DEFAULT_RADIUS_TOLERANCE), Some(2));
    }

    #[test]
    fn test_zero_categories() {
        let p = PolarProjector::new(Pos2::new(0.0, 0.0), 50.0, Range::new(0.0, 1.0), 0);
        assert_eq!(p.category_at(Pos2::new(1.0, 1.0), 0.0), None);
        assert!((p.angle_for(3) + FRAC_PI_2).abs() < 1e-12);
        assert!(p.ring(10.0).is_empty());
    }

    #[test]
    fn test_inverse_angle_range() {
        let p = radar();
        let up = p.inverse(Pos2::new(100.0, 50.0));
        assert!((up.angle - 1.5 * std::f64::consts::PI).abs() < 1e-9);
        assert!((up.radius - 50.0).abs() < 1e-9);
    }
}

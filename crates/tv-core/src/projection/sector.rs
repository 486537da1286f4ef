//! Pie/donut slice layout and containment

use std::f64::consts::{FRAC_PI_2, TAU};

use egui::Pos2;

use super::{angle_from_top, polar_to_surface};

/// One slice of the layout, angles in screen convention
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    pub index: usize,
    pub value: f64,
    pub fraction: f64,
    pub start: f64,
    pub end: f64,
}

impl Slice {
    pub fn sweep(&self) -> f64 {
        self.end - self.start
    }

    pub fn mid_angle(&self) -> f64 {
        self.start + self.sweep() / 2.0
    }
}

/// Slices laid out clockwise from the top, proportional to their share of the total
#[derive(Debug, Clone, PartialEq)]
pub struct SectorLayout {
    center: Pos2,
    inner_radius: f64,
    outer_radius: f64,
    slices: Vec<Slice>,
}

impl SectorLayout {
    /// Build the layout. Negative or non-finite values count as zero; a
    /// non-positive total produces no slices.
    pub fn new(center: Pos2, inner_radius: f64, outer_radius: f64, values: &[f64]) -> Self {
        let sanitized: Vec<f64> = values
            .iter()
            .map(|v| if v.is_finite() && *v > 0.0 { *v } else { 0.0 })
            .collect();
        let total: f64 = sanitized.iter().sum();

        let mut slices = Vec::new();
        if total > 0.0 {
            let mut start = -FRAC_PI_2;
            for (index, value) in sanitized.into_iter().enumerate() {
                let fraction = value / total;
                let end = start + fraction * TAU;
                slices.push(Slice {
                    index,
                    value,
                    fraction,
                    start,
                    end,
                });
                start = end;
            }
        }

        Self {
            center,
            inner_radius: inner_radius.max(0.0),
            outer_radius: outer_radius.max(0.0),
            slices,
        }
    }

    pub fn center(&self) -> Pos2 {
        self.center
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Anchor point inside a slice at `radius_fraction` of the outer radius
    pub fn label_point(&self, slice: &Slice, radius_fraction: f64) -> Pos2 {
        polar_to_surface(self.center, slice.mid_angle(), self.outer_radius * radius_fraction)
    }

    /// Index of the slice whose donut band contains `pos`
    pub fn slice_at(&self, pos: Pos2, tolerance: f64) -> Option<usize> {
        let dx = pos.x as f64 - self.center.x as f64;
        let dy = pos.y as f64 - self.center.y as f64;
        let radius = (dx * dx + dy * dy).sqrt();
        if radius <= self.inner_radius || radius >= self.outer_radius + tolerance {
            return None;
        }

        let from_top = angle_from_top(dy.atan2(dx));
        self.slices
            .iter()
            .filter(|s| s.sweep() > 0.0)
            .find(|s| {
                let start = s.start + FRAC_PI_2;
                let end = s.end + FRAC_PI_2;
                from_top >= start && from_top <= end
            })
            .map(|s| s.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SectorLayout {
        // image 48, video 37, audio 23, document 18
        SectorLayout::new(Pos2::new(150.0, 150.0), 58.5, 130.0, &[48.0, 37.0, 23.0, 18.0])
    }

    #[test]
    fn test_slices_cover_full_turn() {
        let l = layout();
        assert_eq!(l.slices().len(), 4);
        assert!((l.slices()[0].start + FRAC_PI_2).abs() < 1e-12);
        assert!((l.slices()[3].end - (TAU - FRAC_PI_2)).abs() < 1e-9);
        let fractions: f64 = l.slices().iter().map(|s| s.fraction).sum();
        assert!((fractions - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_slice_hit_at_mid_angle() {
        let l = layout();
        for slice in l.slices() {
            let pos = l.label_point(slice, 0.7);
            assert_eq!(l.slice_at(pos, 10.0), Some(slice.index));
        }
    }

    #[test]
    fn test_hole_and_outside_miss() {
        let l = layout();
        assert_eq!(l.slice_at(Pos2::new(150.0, 150.0), 10.0), None);
        assert_eq!(l.slice_at(Pos2::new(150.0, 120.0), 10.0), None);
        assert_eq!(l.slice_at(Pos2::new(150.0, 5.0), 10.0), None);
        // Inside the hover tolerance ring
        assert_eq!(l.slice_at(Pos2::new(150.0, 15.0), 10.0), Some(0));
    }

    #[test]
    fn test_degenerate_totals() {
        let empty = SectorLayout::new(Pos2::new(0.0, 0.0), 0.0, 10.0, &[0.0, -3.0, f64::NAN]);
        assert!(empty.is_empty());
        assert_eq!(empty.slice_at(Pos2::new(5.0, 0.0), 0.0), None);

        let single = SectorLayout::new(Pos2::new(0.0, 0.0), 0.0, 10.0, &[0.0, 5.0]);
        assert_eq!(single.slice_at(Pos2::new(-5.0, 0.0), 0.0), Some(1));
    }
}

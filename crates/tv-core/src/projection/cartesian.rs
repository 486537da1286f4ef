//! Cartesian time-series projection

use egui::{Pos2, Rect};

use crate::normalize::Range;
use crate::state::ViewportState;

/// Maps (index, value) pairs onto a plot rectangle
///
/// Index `i` of `n` spreads linearly across the width; values are normalized
/// against `range` and flipped so larger values sit higher on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianProjector {
    plot: Rect,
    range: Range,
}

impl CartesianProjector {
    /// Projector covering the whole viewport
    pub fn new(viewport: &ViewportState, range: Range) -> Self {
        Self {
            plot: viewport.rect(),
            range,
        }
    }

    /// Projector covering an inset plot area
    pub fn with_plot_area(plot: Rect, range: Range) -> Self {
        Self { plot, range }
    }

    pub fn plot_area(&self) -> Rect {
        self.plot
    }

    pub fn range(&self) -> Range {
        self.range
    }

    /// Horizontal position of index `i` in a series of `n` points.
    ///
    /// A single point sits in the middle of the plot; an empty series has no positions.
    pub fn x_for_index(&self, i: usize, n: usize) -> Option<f32> {
        match n {
            0 => None,
            1 => Some(self.plot.center().x),
            _ => {
                let t = i as f64 / (n - 1) as f64;
                Some((self.plot.left() as f64 + t * self.plot.width() as f64) as f32)
            }
        }
    }

    /// Vertical position of `value`; a degenerate range lands on the midline
    pub fn y_for_value(&self, value: f64) -> f32 {
        let t = self.range.normalize(value);
        (self.plot.bottom() as f64 - t * self.plot.height() as f64) as f32
    }

    pub fn project(&self, i: usize, n: usize, value: f64) -> Option<Pos2> {
        self.x_for_index(i, n).map(|x| Pos2::new(x, self.y_for_value(value)))
    }

    /// Nearest index to horizontal position `x`, clamped into `[0, n-1]`
    pub fn index_at(&self, x: f32, n: usize) -> Option<usize> {
        match n {
            0 => None,
            1 => Some(0),
            _ => {
                let t = (x - self.plot.left()) as f64 / self.plot.width() as f64;
                let raw = (t * (n - 1) as f64).round();
                Some(raw.clamp(0.0, (n - 1) as f64) as usize)
            }
        }
    }

    /// Data value at vertical position `y`
    pub fn value_at(&self, y: f32) -> f64 {
        let t = (self.plot.bottom() - y) as f64 / self.plot.height() as f64;
        self.range.denormalize(t)
    }

    /// Bottom edge, used to close area fills
    pub fn baseline(&self) -> f32 {
        self.plot.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector() -> CartesianProjector {
        let viewport = ViewportState::new(300.0, 100.0).unwrap();
        CartesianProjector::new(&viewport, Range::new(0.0, 50.0))
    }

    #[test]
    fn test_forward_projection() {
        let p = projector();
        assert_eq!(p.project(0, 4, 0.0), Some(Pos2::new(0.0, 100.0)));
        assert_eq!(p.project(3, 4, 50.0), Some(Pos2::new(300.0, 0.0)));
        assert_eq!(p.project(1, 4, 25.0), Some(Pos2::new(100.0, 50.0)));
    }

    #[test]
    fn test_higher_value_is_higher_on_screen() {
        let p = projector();
        assert!(p.y_for_value(40.0) < p.y_for_value(10.0));
    }

    #[test]
    fn test_degenerate_series() {
        let p = projector();
        assert_eq!(p.x_for_index(0, 0), None);
        assert_eq!(p.x_for_index(0, 1), Some(150.0));
        assert_eq!(p.index_at(12.0, 0), None);
        assert_eq!(p.index_at(299.0, 1), Some(0));

        let flat = CartesianProjector::new(&ViewportState::new(300.0, 100.0).unwrap(), Range::new(7.0, 7.0));
        assert_eq!(flat.y_for_value(7.0), 50.0);
    }

    #[test]
    fn test_inverse_index_and_value() {
        let p = projector();
        assert_eq!(p.index_at(0.0, 31), Some(0));
        assert_eq!(p.index_at(300.0, 31), Some(30));
        assert_eq!(p.index_at(104.0, 31), Some(10));
        assert_eq!(p.index_at(-50.0, 31), Some(0));
        assert_eq!(p.index_at(900.0, 31), Some(30));
        assert!((p.value_at(50.0) - 25.0).abs() < 1e-9);
    }
}

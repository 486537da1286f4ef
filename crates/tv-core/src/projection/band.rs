//! Bar chart band layout

use egui::{Pos2, Rect};

use crate::state::ViewportState;

/// Equal-width bands across a padded plot area, bars scaled against `max_value`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandLayout {
    plot: Rect,
    bands: usize,
    gap: f32,
    max_value: f64,
}

impl BandLayout {
    pub fn new(viewport: &ViewportState, padding: f32, bands: usize, gap: f32, max_value: f64) -> Self {
        let rect = viewport.rect().shrink(padding);
        Self {
            plot: rect,
            bands,
            gap: gap.max(0.0),
            max_value,
        }
    }

    pub fn plot_area(&self) -> Rect {
        self.plot
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn band_width(&self) -> f32 {
        if self.bands == 0 {
            return 0.0;
        }
        self.plot.width() / self.bands as f32
    }

    pub fn bar_width(&self) -> f32 {
        (self.band_width() - self.gap).max(0.0)
    }

    /// Left edge of bar `i`
    pub fn bar_left(&self, i: usize) -> f32 {
        self.plot.left() + i as f32 * self.band_width() + self.gap / 2.0
    }

    /// Bar height for `value`; a non-positive maximum flattens every bar
    pub fn bar_height(&self, value: f64) -> f32 {
        if !(self.max_value > 0.0) || !value.is_finite() {
            return 0.0;
        }
        ((value / self.max_value).clamp(0.0, 1.0) * self.plot.height() as f64) as f32
    }

    /// Rectangle of bar `i` with its height scaled by `progress`
    pub fn bar_rect(&self, i: usize, value: f64, progress: f64) -> Rect {
        let height = self.bar_height(value) * progress.clamp(0.0, 1.0) as f32;
        let left = self.bar_left(i);
        Rect::from_min_max(
            Pos2::new(left, self.plot.bottom() - height),
            Pos2::new(left + self.bar_width(), self.plot.bottom()),
        )
    }

    /// Y coordinate of a gridline at `fraction` of the maximum
    pub fn grid_y(&self, fraction: f64) -> f32 {
        self.plot.bottom() - (fraction.clamp(0.0, 1.0) * self.plot.height() as f64) as f32
    }

    /// Bar whose horizontal extent contains `pos`, within the plot's vertical span
    pub fn band_at(&self, pos: Pos2, top_slack: f32) -> Option<usize> {
        if self.bands == 0 {
            return None;
        }
        if pos.y >= self.plot.bottom() || pos.y <= self.plot.top() - top_slack {
            return None;
        }
        if pos.x <= self.plot.left() || pos.x >= self.plot.right() {
            return None;
        }
        let index = ((pos.x - self.plot.left()) / self.band_width()).floor() as usize;
        if index >= self.bands {
            return None;
        }
        let left = self.bar_left(index);
        (pos.x >= left && pos.x <= left + self.bar_width()).then_some(index)
    }
}

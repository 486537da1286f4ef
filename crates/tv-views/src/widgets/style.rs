//! Shared dark-theme colors

use egui::{Color32, Stroke};

pub const BACKGROUND: Color32 = Color32::from_rgb(15, 23, 42);
pub const TEXT: Color32 = Color32::from_rgb(226, 232, 240);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(148, 163, 184);
pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
pub const ANOMALY: Color32 = Color32::from_rgb(239, 68, 68);

pub fn grid_stroke() -> Stroke {
    Stroke::new(0.5, Color32::from_rgba_unmultiplied(99, 179, 237, 51))
}

pub fn highlight_stroke() -> Stroke {
    Stroke::new(2.0, Color32::WHITE)
}

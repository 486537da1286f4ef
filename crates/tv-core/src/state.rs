//! Per-widget viewport and interaction state

use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConfigError, ConfigResult};

/// Unique identifier of a mounted widget instance
pub type WidgetId = Uuid;

/// Pixel dimensions of a widget's drawing surface
///
/// Every projector scale factor derives from this; it is recomputed when the
/// container resizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub width_px: f32,
    pub height_px: f32,
}

impl ViewportState {
    /// Validated constructor; zero, negative or non-finite sides are rejected
    pub fn new(width_px: f32, height_px: f32) -> ConfigResult<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width_px) || !valid(height_px) {
            return Err(ConfigError::InvalidDimensions {
                width: width_px,
                height: height_px,
            });
        }
        Ok(Self { width_px, height_px })
    }

    pub fn width(&self) -> f64 {
        self.width_px as f64
    }

    pub fn height(&self) -> f64 {
        self.height_px as f64
    }

    /// Surface rectangle in local coordinates (origin at top-left)
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(self.width_px, self.height_px))
    }

    pub fn center(&self) -> Pos2 {
        Pos2::new(self.width_px / 2.0, self.height_px / 2.0)
    }

    pub fn min_side(&self) -> f64 {
        self.width().min(self.height())
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= self.width_px && pos.y <= self.height_px
    }
}

/// Logical entity a pointer can resolve to, by index into the widget's entity list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    /// Point of a time series
    Point(usize),
    /// Radar category, pie slice or bar
    Category(usize),
    /// Geographic marker
    Marker(usize),
    /// Threat blip on the scanner
    Blip(usize),
    /// The gauge's filled arc
    Gauge,
}

impl EntityRef {
    pub fn index(&self) -> Option<usize> {
        match *self {
            EntityRef::Point(i) | EntityRef::Category(i) | EntityRef::Marker(i) | EntityRef::Blip(i) => Some(i),
            EntityRef::Gauge => None,
        }
    }
}

/// Ephemeral hover state of one widget
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionState {
    pub hovered: Option<EntityRef>,
    pub pointer: Option<Pos2>,
}

impl InteractionState {
    pub fn is_hovering(&self) -> bool {
        self.hovered.is_some()
    }

    pub fn clear(&mut self) {
        self.hovered = None;
        self.pointer = None;
    }
}

/// Payload delivered to hover callbacks
#[derive(Debug, Clone, PartialEq)]
pub struct HoverEvent {
    pub widget_id: WidgetId,
    pub entity: EntityRef,
    pub entity_id: String,
    pub label: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_validation() {
        assert!(ViewportState::new(600.0, 300.0).is_ok());
        assert!(matches!(
            ViewportState::new(0.0, 300.0),
            Err(ConfigError::InvalidDimensions { .. })
        ));
        assert!(ViewportState::new(100.0, -1.0).is_err());
        assert!(ViewportState::new(f32::NAN, 10.0).is_err());
        assert!(ViewportState::new(f32::INFINITY, 10.0).is_err());
    }

    #[test]
    fn test_viewport_geometry() {
        let viewport = ViewportState::new(600.0, 300.0).unwrap();
        assert_eq!(viewport.center(), Pos2::new(300.0, 150.0));
        assert_eq!(viewport.min_side(), 300.0);
        assert!(viewport.contains(Pos2::new(600.0, 0.0)));
        assert!(!viewport.contains(Pos2::new(601.0, 10.0)));
    }

    #[test]
    fn test_interaction_clear() {
        let mut state = InteractionState {
            hovered: Some(EntityRef::Point(3)),
            pointer: Some(Pos2::new(1.0, 2.0)),
        };
        state.clear();
        assert_eq!(state, InteractionState::default());
    }
}

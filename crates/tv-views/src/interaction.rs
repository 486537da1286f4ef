//! Pointer hit-testing
//!
//! Maps a pointer position to the logical entity under it, using the inverse
//! of whichever projection the widget drew with.

use egui::Pos2;

use tv_core::projection::{distance, BandLayout, CartesianProjector, GaugeProjector, PolarProjector, SectorLayout};
use tv_core::{EntityRef, InteractionState};

/// Pixel radius within which a marker counts as hit
pub const MARKER_HIT_RADIUS: f64 = 12.0;

/// Horizontal distance beyond which a series point no longer counts as hit
pub const SERIES_HIT_DISTANCE: f32 = 20.0;

/// Entity set of one frame, tagged by projection family
#[derive(Debug, Clone, Copy)]
pub enum HitScene<'a> {
    /// Points of a time series laid out on a cartesian projector
    Series {
        projector: &'a CartesianProjector,
        len: usize,
        max_distance: f32,
    },
    /// Radar axes
    Radar {
        projector: &'a PolarProjector,
        tolerance: f64,
    },
    /// Donut slices
    Slices {
        layout: &'a SectorLayout,
        tolerance: f64,
    },
    /// Bars
    Bars {
        layout: &'a BandLayout,
        top_slack: f32,
    },
    /// Point markers keyed by entity index
    Markers {
        markers: &'a [(usize, Pos2)],
        radius: f64,
        entity: fn(usize) -> EntityRef,
    },
    /// Filled part of a gauge arc
    Gauge {
        projector: &'a GaugeProjector,
        inner: f64,
        outer: f64,
        filled_to: f64,
    },
}

/// Entity under `pointer`, if any
pub fn resolve(pointer: Pos2, scene: &HitScene<'_>) -> Option<EntityRef> {
    match *scene {
        HitScene::Series {
            projector,
            len,
            max_distance,
        } => {
            if !projector.plot_area().contains(pointer) {
                return None;
            }
            let index = projector.index_at(pointer.x, len)?;
            let x = projector.x_for_index(index, len)?;
            ((pointer.x - x).abs() <= max_distance).then_some(EntityRef::Point(index))
        }
        HitScene::Radar { projector, tolerance } => {
            projector.category_at(pointer, tolerance).map(EntityRef::Category)
        }
        HitScene::Slices { layout, tolerance } => layout.slice_at(pointer, tolerance).map(EntityRef::Category),
        HitScene::Bars { layout, top_slack } => layout.band_at(pointer, top_slack).map(EntityRef::Category),
        HitScene::Markers {
            markers,
            radius,
            entity,
        } => {
            let mut best: Option<(usize, f64)> = None;
            for &(index, pos) in markers {
                let d = distance(pointer, pos);
                if d > radius {
                    continue;
                }
                // Strict comparison keeps the earliest marker on ties
                if best.map_or(true, |(_, best_d)| d < best_d) {
                    best = Some((index, d));
                }
            }
            best.map(|(index, _)| entity(index))
        }
        HitScene::Gauge {
            projector,
            inner,
            outer,
            filled_to,
        } => {
            let value = projector.value_at(pointer, inner, outer)?;
            (value <= filled_to).then_some(EntityRef::Gauge)
        }
    }
}

/// A change of the hovered entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverChange {
    pub previous: Option<EntityRef>,
    pub current: Option<EntityRef>,
}

/// Owns a widget's interaction state and reports hover transitions
#[derive(Debug, Clone, Default)]
pub struct PointerResolver {
    state: InteractionState,
}

impl PointerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn hovered(&self) -> Option<EntityRef> {
        self.state.hovered
    }

    /// Record the pointer and re-resolve; `Some` only when the hovered entity changed
    pub fn pointer_moved(&mut self, pointer: Pos2, scene: &HitScene<'_>) -> Option<HoverChange> {
        self.state.pointer = Some(pointer);
        let current = resolve(pointer, scene);
        self.set_hovered(current)
    }

    /// Pointer left the surface; clears the state
    pub fn pointer_left(&mut self) -> Option<HoverChange> {
        self.state.pointer = None;
        self.set_hovered(None)
    }

    /// Drop hover without reporting, used when the entity set is replaced
    pub fn reset(&mut self) {
        self.state.clear();
    }

    fn set_hovered(&mut self, current: Option<EntityRef>) -> Option<HoverChange> {
        let previous = self.state.hovered;
        if previous == current {
            return None;
        }
        self.state.hovered = current;
        Some(HoverChange { previous, current })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tv_core::{Range, ViewportState};

    #[test]
    fn test_series_nearest_index() {
        let viewport = ViewportState::new(800.0, 300.0).unwrap();
        let projector = CartesianProjector::new(&viewport, Range::new(0.0, 100.0));
        let scene = HitScene::Series {
            projector: &projector,
            len: 30,
            max_distance: SERIES_HIT_DISTANCE,
        };
        // Spacing is 800 / 29 ≈ 27.6 px
        assert_eq!(resolve(Pos2::new(0.0, 150.0), &scene), Some(EntityRef::Point(0)));
        assert_eq!(resolve(Pos2::new(30.0, 10.0), &scene), Some(EntityRef::Point(1)));
        assert_eq!(resolve(Pos2::new(800.0, 150.0), &scene), Some(EntityRef::Point(29)));
        assert_eq!(resolve(Pos2::new(900.0, 150.0), &scene), None);
    }

    #[test]
    fn test_sparse_series_respects_distance() {
        let viewport = ViewportState::new(800.0, 300.0).unwrap();
        let projector = CartesianProjector::new(&viewport, Range::new(0.0, 1.0));
        let scene = HitScene::Series {
            projector: &projector,
            len: 2,
            max_distance: SERIES_HIT_DISTANCE,
        };
        assert_eq!(resolve(Pos2::new(10.0, 100.0), &scene), Some(EntityRef::Point(0)));
        assert_eq!(resolve(Pos2::new(300.0, 100.0), &scene), None);

        let empty = HitScene::Series {
            projector: &projector,
            len: 0,
            max_distance: SERIES_HIT_DISTANCE,
        };
        assert_eq!(resolve(Pos2::new(10.0, 100.0), &empty), None);
    }

    #[test]
    fn test_radar_scenario() {
        let projector = PolarProjector::new(Pos2::new(100.0, 100.0), 80.0, Range::new(0.0, 100.0), 4);
        let scene = HitScene::Radar {
            projector: &projector,
            tolerance: 10.0,
        };
        // Category 2 points straight down
        assert_eq!(resolve(Pos2::new(100.0, 150.0), &scene), Some(EntityRef::Category(2)));
        assert_eq!(resolve(Pos2::new(100.0, 195.0), &scene), None);
    }

    #[test]
    fn test_marker_ties_keep_list_order() {
        let markers = [(0, Pos2::new(10.0, 10.0)), (1, Pos2::new(10.0, 10.0)), (2, Pos2::new(30.0, 10.0))];
        let scene = HitScene::Markers {
            markers: &markers,
            radius: MARKER_HIT_RADIUS,
            entity: EntityRef::Marker,
        };
        assert_eq!(resolve(Pos2::new(12.0, 10.0), &scene), Some(EntityRef::Marker(0)));
        assert_eq!(resolve(Pos2::new(27.0, 10.0), &scene), Some(EntityRef::Marker(2)));
        assert_eq!(resolve(Pos2::new(100.0, 100.0), &scene), None);

        let blips = [(4, Pos2::new(0.0, 0.0))];
        let scene = HitScene::Markers {
            markers: &blips,
            radius: MARKER_HIT_RADIUS,
            entity: EntityRef::Blip,
        };
        assert_eq!(resolve(Pos2::new(1.0, 1.0), &scene), Some(EntityRef::Blip(4)));
    }

    #[test]
    fn test_resolver_reports_transitions_only() {
        let markers = [(0, Pos2::new(10.0, 10.0))];
        let scene = HitScene::Markers {
            markers: &markers,
            radius: MARKER_HIT_RADIUS,
            entity: EntityRef::Marker,
        };
        let mut resolver = PointerResolver::new();
        assert_eq!(resolver.pointer_moved(Pos2::new(200.0, 200.0), &scene), None);

        let entered = resolver.pointer_moved(Pos2::new(11.0, 10.0), &scene).unwrap();
        assert_eq!(entered.previous, None);
        assert_eq!(entered.current, Some(EntityRef::Marker(0)));
        assert_eq!(resolver.pointer_moved(Pos2::new(12.0, 10.0), &scene), None);

        let left = resolver.pointer_left().unwrap();
        assert_eq!(left.current, None);
        assert_eq!(*resolver.state(), InteractionState::default());
        assert_eq!(resolver.pointer_left(), None);
    }
}

//! Coordinate projection between data space and surface space
//!
//! Each family provides a forward mapping (data → pixels) and, where
//! hit-testing needs it, an inverse (pixels → data). All math runs in `f64`
//! and is converted to `egui` surface coordinates at the boundary.

pub mod band;
pub mod cartesian;
pub mod gauge;
pub mod geo;
pub mod polar;
pub mod sector;

pub use band::BandLayout;
pub use cartesian::CartesianProjector;
pub use gauge::GaugeProjector;
pub use geo::GeoProjector;
pub use polar::{PolarCoord, PolarProjector};
pub use sector::{SectorLayout, Slice};

use std::f64::consts::{FRAC_PI_2, TAU};

use egui::Pos2;

/// Wrap an angle into `[0, 2π)`
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Angle measured clockwise from the top (12 o'clock), in `[0, 2π)`
pub fn angle_from_top(angle: f64) -> f64 {
    wrap_angle(angle + FRAC_PI_2)
}

/// Point at `angle` (screen convention: 0 = east, positive = clockwise) and `radius` from `center`
pub fn polar_to_surface(center: Pos2, angle: f64, radius: f64) -> Pos2 {
    Pos2::new(
        (center.x as f64 + angle.cos() * radius) as f32,
        (center.y as f64 + angle.sin() * radius) as f32,
    )
}

/// Sample points along a circular arc, inclusive of both ends
pub fn arc_points(center: Pos2, radius: f64, start: f64, end: f64, segments: usize) -> Vec<Pos2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            polar_to_surface(center, start + (end - start) * t, radius)
        })
        .collect()
}

/// Euclidean distance between two surface points
pub fn distance(a: Pos2, b: Pos2) -> f64 {
    let dx = a.x as f64 - b.x as f64;
    let dy = a.y as f64 - b.y as f64;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(-FRAC_PI_2) - 1.5 * PI).abs() < 1e-12);
        assert!((wrap_angle(5.0 * PI) - PI).abs() < 1e-12);
        assert!(wrap_angle(-1e-18) < TAU);
    }

    #[test]
    fn test_angle_from_top() {
        // Straight up is zero, east is a quarter turn
        assert!(angle_from_top(-FRAC_PI_2).abs() < 1e-12);
        assert!((angle_from_top(0.0) - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_arc_points_endpoints() {
        let pts = arc_points(Pos2::new(0.0, 0.0), 10.0, 0.0, PI, 4);
        assert_eq!(pts.len(), 5);
        assert!((pts[0].x - 10.0).abs() < 1e-5);
        assert!((pts[4].x + 10.0).abs() < 1e-5);
        assert!((pts[2].y - 10.0).abs() < 1e-5);
    }
}

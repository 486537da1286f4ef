//! Approximate Mercator projection for map markers

use std::f64::consts::{FRAC_PI_4, PI, TAU};

use egui::Pos2;

use crate::state::ViewportState;

/// Latitude limit keeping the Mercator `y` finite
pub const MAX_LATITUDE: f64 = 85.05113;

/// Forward-only projection of (lat, lng) onto the map plate.
///
/// `x` is linear in longitude; `y = h/2 − w·ln(tan(π/4 + lat·π/360))/(2π)`.
/// Hit-testing is done in screen space, so no inverse is provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoProjector {
    width: f64,
    height: f64,
}

impl GeoProjector {
    pub fn new(viewport: &ViewportState) -> Self {
        Self {
            width: viewport.width(),
            height: viewport.height(),
        }
    }

    pub fn x_for_lng(&self, lng: f64) -> f64 {
        (lng + 180.0) * (self.width / 360.0)
    }

    pub fn y_for_lat(&self, lat: f64) -> f64 {
        let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let merc = (FRAC_PI_4 + lat * PI / 360.0).tan().ln();
        self.height / 2.0 - self.width * merc / TAU
    }

    pub fn project(&self, lat: f64, lng: f64) -> Pos2 {
        Pos2::new(self.x_for_lng(lng) as f32, self.y_for_lat(lat) as f32)
    }

    /// Point on the plate expressed as fractions of a 360°×180° grid.
    ///
    /// Used for the background continent sketches, which are authored in
    /// plate degrees rather than geographic coordinates.
    pub fn plate_point(&self, x_deg: f64, y_deg: f64) -> Pos2 {
        Pos2::new(
            (self.width / 360.0 * x_deg) as f32,
            (self.height / 180.0 * y_deg) as f32,
        )
    }
}

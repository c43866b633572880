//! Spherical Web Mercator on the world-map pixel grid.
//! https://en.wikipedia.org/wiki/Web_Mercator_projection
//!
//! Everything here works in radians. Accurate around the mid latitudes the
//! widget was built for, not a general-purpose geodesy implementation.

use crate::core::constants::{WORLD_MAP_HEIGHT, WORLD_MAP_WIDTH};
use crate::core::geo::{LatLonRadians, Point};
use std::f64::consts::{FRAC_PI_4, PI, TAU};

fn scale(zoom: f64) -> f64 {
    2_f64.powf(zoom)
}

/// Projects a radian coordinate to world pixels at `zoom`
pub fn to_xy(location: LatLonRadians, zoom: f64) -> Point {
    let scale = scale(zoom);
    let x = WORLD_MAP_WIDTH * scale * (location.lon + PI) / TAU;
    let y = WORLD_MAP_HEIGHT * scale * (PI - (FRAC_PI_4 + location.lat / 2.0).tan().ln()) / TAU;
    Point::new(x, y)
}

/// Inverse of [`to_xy`]
pub fn to_location(point: Point, zoom: f64) -> LatLonRadians {
    let scale = scale(zoom);
    let lon = point.x * TAU / (WORLD_MAP_WIDTH * scale) - PI;
    let merc_y = PI - point.y * TAU / (WORLD_MAP_HEIGHT * scale);
    let lat = 2.0 * (merc_y.exp().atan() - FRAC_PI_4);
    LatLonRadians::new(lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_world_center() {
        let p = to_xy(LatLonRadians::new(0.0, 0.0), 0.0);
        assert!((p.x - WORLD_MAP_WIDTH / 2.0).abs() < 1e-6);
        assert!((p.y - WORLD_MAP_HEIGHT / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_doubles_pixels() {
        let location = LatLonRadians::new(0.5, -1.0);
        let z3 = to_xy(location, 3.0);
        let z4 = to_xy(location, 4.0);
        assert!((z4.x - 2.0 * z3.x).abs() < 1e-3);
        assert!((z4.y - 2.0 * z3.y).abs() < 1e-3);
    }

    #[test]
    fn test_north_is_up() {
        let south = to_xy(LatLonRadians::new(0.2, 0.0), 5.0);
        let north = to_xy(LatLonRadians::new(0.6, 0.0), 5.0);
        assert!(north.y < south.y);
    }

    #[test]
    fn test_round_trip() {
        for &(lat, lon) in &[(0.0, 0.0), (0.7, -2.2), (-1.2, 3.0), (1.4, 0.1)] {
            for zoom in [3.0, 8.0, 20.0] {
                let back = to_location(to_xy(LatLonRadians::new(lat, lon), zoom), zoom);
                assert!((back.lat - lat).abs() < 1e-9, "lat {} zoom {}", lat, zoom);
                assert!((back.lon - lon).abs() < 1e-9, "lon {} zoom {}", lon, zoom);
            }
        }
    }
}

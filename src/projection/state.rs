use crate::core::bounds::Bounds;
use crate::core::config::ProjectionMode;
use crate::core::geo::{GeoBoundary, GeoMappedPoint, GeoPoint, Point};

/*
 *                      NE (North East)
 *      |---------------------X
 *      |                     |
 *      X---------------------|
 *  SW (South West)
 *
 * SW sits at pixel (0, height), NE at (width, 0).
 */

/// Everything the transforms read, kept together so one lock covers it
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionState {
    pub zoom_level: f64,
    pub mode: ProjectionMode,
    pub screen_area: Bounds,
    pub south_west: GeoMappedPoint,
    pub north_east: GeoMappedPoint,
    x_ratio: f64,
    y_ratio: f64,
}

impl ProjectionState {
    pub fn new(zoom_level: f64, mode: ProjectionMode, bounds: Option<GeoBoundary>) -> Self {
        let mut state = Self {
            zoom_level,
            mode,
            screen_area: Bounds::default(),
            south_west: GeoMappedPoint::default(),
            north_east: GeoMappedPoint::default(),
            x_ratio: 0.0,
            y_ratio: 0.0,
        };
        if let Some(bounds) = bounds {
            state.set_bounds(&bounds);
        }
        state
    }

    /// Degrees of longitude per pixel
    pub fn x_ratio(&self) -> f64 {
        self.x_ratio
    }

    /// Degrees of latitude per pixel
    pub fn y_ratio(&self) -> f64 {
        self.y_ratio
    }

    pub fn set_screen_size(&mut self, width: f64, height: f64) {
        self.screen_area = Bounds::from_size(width, height);
        self.south_west.set_xy(0.0, height);
        self.north_east.set_xy(width, 0.0);
        self.recompute_ratios();
    }

    pub fn set_bounds(&mut self, bounds: &GeoBoundary) {
        self.south_west.set_location(bounds.min_y, bounds.min_x);
        self.north_east.set_location(bounds.max_y, bounds.max_x);
        self.recompute_ratios();
    }

    pub fn bounds(&self) -> GeoBoundary {
        GeoBoundary::new(
            self.south_west.lon,
            self.north_east.lon,
            self.south_west.lat,
            self.north_east.lat,
        )
    }

    /// Pixel spans are counted inclusively (+1) so a single-pixel screen
    /// never divides by zero.
    pub fn recompute_ratios(&mut self) {
        self.x_ratio = (self.north_east.lon - self.south_west.lon).abs()
            / ((self.north_east.x - self.south_west.x).abs() + 1.0);
        self.y_ratio = (self.south_west.lat - self.north_east.lat).abs()
            / ((self.south_west.y - self.north_east.y).abs() + 1.0);
    }

    /// Linear transform, degrees in
    pub fn linear_to_xy(&self, lat: f64, lon: f64) -> Point {
        Point::new(
            per_ratio(lon - self.south_west.lon, self.x_ratio),
            per_ratio(self.north_east.lat - lat, self.y_ratio),
        )
    }

    /// Inverse linear transform, degrees out
    pub fn linear_to_location(&self, x: f64, y: f64) -> GeoPoint {
        GeoPoint::new(
            self.north_east.lat - self.y_ratio * y,
            self.south_west.lon + self.x_ratio * x,
        )
    }

    /// Center of the anchors in geographic space
    pub fn geo_center(&self) -> GeoPoint {
        self.bounds().center()
    }
}

// A zero geo span collapses every location onto the anchor pixel.
fn per_ratio(delta: f64, ratio: f64) -> f64 {
    if ratio == 0.0 {
        0.0
    } else {
        delta / ratio
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a geographical coordinate with latitude and longitude in degrees
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    /// Carried along for callers that have it; nothing in the engine reads it.
    #[serde(skip)]
    pub elevation: f64,
}

impl GeoPoint {
    /// Creates a new point. Note the (lat, lon) argument order.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            elevation: 0.0,
        }
    }

    /// Sets both coordinates, longitude first.
    pub fn set_location(&mut self, lon: f64, lat: f64) {
        self.lon = lon;
        self.lat = lat;
    }

    /// Brings the coordinate into `-90 <= lat <= 90`, `-180 < lon <= 180`.
    ///
    /// Latitude is first wrapped into `[-180, 180)`. Anything past a pole is
    /// reflected back and the longitude moved to the other side of the globe.
    /// Longitude is then wrapped into `(-180, 180]`.
    pub fn canonicalize(&mut self) {
        let mut lat = Self::wrap_half_open_low(self.lat);
        let mut lon = self.lon;

        if lat > 90.0 {
            lat = 180.0 - lat;
            lon += 180.0;
        } else if lat < -90.0 {
            lat = -180.0 - lat;
            lon += 180.0;
        }

        self.lat = lat;
        self.lon = Self::wrap_half_open_high(lon);
    }

    /// Returns a canonicalized copy, see [`GeoPoint::canonicalize`].
    pub fn canonicalized(mut self) -> Self {
        self.canonicalize();
        self
    }

    /// Checks the canonical range without modifying the point
    pub fn is_canonical(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && self.lon > -180.0 && self.lon <= 180.0
    }

    // Values already in range are returned untouched so that canonicalizing
    // twice never drifts through the +180/-180 round trip.
    fn wrap_half_open_low(value: f64) -> f64 {
        if (-180.0..180.0).contains(&value) {
            return value;
        }
        let mut wrapped = (value + 180.0) % 360.0;
        if wrapped < 0.0 {
            wrapped += 360.0;
        }
        wrapped - 180.0
    }

    fn wrap_half_open_high(value: f64) -> f64 {
        if value > -180.0 && value <= 180.0 {
            return value;
        }
        let mut wrapped = (value + 180.0) % 360.0;
        if wrapped <= 0.0 {
            wrapped += 360.0;
        }
        wrapped - 180.0
    }
}

impl PartialEq for GeoPoint {
    fn eq(&self, other: &Self) -> bool {
        self.lat == other.lat && self.lon == other.lon
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{};{}{};",
            self.lat.abs(),
            if self.lat >= 0.0 { 'N' } else { 'S' },
            self.lon.abs(),
            if self.lon >= 0.0 { 'E' } else { 'W' }
        )
    }
}

impl From<GeoPoint> for geo_types::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        geo_types::Point::new(point.lon, point.lat)
    }
}

impl From<geo_types::Point<f64>> for GeoPoint {
    fn from(point: geo_types::Point<f64>) -> Self {
        GeoPoint::new(point.y(), point.x())
    }
}

/// Latitude/longitude in radians, the unit the raw Mercator transform works in
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLonRadians {
    pub lat: f64,
    pub lon: f64,
}

impl LatLonRadians {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn to_degrees(self) -> GeoPoint {
        GeoPoint::new(self.lat.to_degrees(), self.lon.to_degrees())
    }
}

impl From<GeoPoint> for LatLonRadians {
    fn from(point: GeoPoint) -> Self {
        LatLonRadians::new(point.lat.to_radians(), point.lon.to_radians())
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A geographic coordinate together with the pixel it was last mapped to
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoMappedPoint {
    pub lat: f64,
    pub lon: f64,
    pub x: f64,
    pub y: f64,
}

impl GeoMappedPoint {
    pub fn new(lat: f64, lon: f64, x: f64, y: f64) -> Self {
        Self { lat, lon, x, y }
    }

    pub fn set_xy(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn set_location(&mut self, lat: f64, lon: f64) {
        self.lat = lat;
        self.lon = lon;
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    pub fn pixel(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl fmt::Display for GeoMappedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LatLng: ({}, {}) XY: ({}, {})",
            self.lat, self.lon, self.x, self.y
        )
    }
}

/// Boundary axis selector for [`GeoBoundary::median`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Longitude
    X,
    /// Latitude
    Y,
}

impl From<usize> for Axis {
    /// `0` selects X, every other dimension index selects Y.
    fn from(dimension: usize) -> Self {
        if dimension == 0 {
            Axis::X
        } else {
            Axis::Y
        }
    }
}

/// Axis-aligned rectangle in longitude (X) / latitude (Y) space.
///
/// `min <= max` on both axes is expected but not enforced here; the
/// constructors take whatever the caller hands them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoBoundary {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl GeoBoundary {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Builds a boundary from its south-west and north-east corners
    pub fn from_corners(south_west: GeoPoint, north_east: GeoPoint) -> Self {
        Self::new(south_west.lon, north_east.lon, south_west.lat, north_east.lat)
    }

    pub fn set_bounds(&mut self, min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> &mut Self {
        *self = Self::new(min_x, max_x, min_y, max_y);
        self
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Mean of the two edges along dimension `0` (X) or any other (Y)
    pub fn median(&self, dimension: usize) -> f64 {
        self.median_along(Axis::from(dimension))
    }

    pub fn median_along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => (self.min_x + self.max_x) / 2.0,
            Axis::Y => (self.min_y + self.max_y) / 2.0,
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.median_along(Axis::Y), self.median_along(Axis::X))
    }

    pub fn south_west(&self) -> GeoPoint {
        GeoPoint::new(self.min_y, self.min_x)
    }

    pub fn north_east(&self) -> GeoPoint {
        GeoPoint::new(self.max_y, self.max_x)
    }

    /// Checks whether `other` lies within this boundary.
    ///
    /// Each edge of `other` must fall inside our span, with the min edge
    /// allowed to touch our min edge (but not our max) and the max edge
    /// allowed to touch our max edge (but not our min). A zero-width
    /// boundary sitting exactly on one of our edges is therefore rejected.
    pub fn contains(&self, other: &GeoBoundary) -> bool {
        let mid_min_x = other.min_x >= self.min_x && other.min_x < self.max_x;
        let mid_max_x = other.max_x <= self.max_x && other.max_x > self.min_x;
        let mid_min_y = other.min_y >= self.min_y && other.min_y < self.max_y;
        let mid_max_y = other.max_y <= self.max_y && other.max_y > self.min_y;
        mid_min_x && mid_max_x && mid_min_y && mid_max_y
    }

    /// Checks that every edge is a finite number
    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.max_x.is_finite()
            && self.min_y.is_finite()
            && self.max_y.is_finite()
    }

    /// Checks the `min <= max` invariant on both axes
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }
}

impl fmt::Display for GeoBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NorthWest: ({}, {}) SouthEast: ({}, {})",
            self.max_y, self.min_x, self.min_y, self.max_x
        )
    }
}

/// `Rect` always orders its corners, so an inverted boundary (`min > max`
/// on an axis) comes back from the round trip with those edges swapped.
impl From<GeoBoundary> for geo_types::Rect<f64> {
    fn from(bounds: GeoBoundary) -> Self {
        geo_types::Rect::new(
            geo_types::coord! { x: bounds.min_x, y: bounds.min_y },
            geo_types::coord! { x: bounds.max_x, y: bounds.max_y },
        )
    }
}

impl From<geo_types::Rect<f64>> for GeoBoundary {
    fn from(rect: geo_types::Rect<f64>) -> Self {
        GeoBoundary::new(rect.min().x, rect.max().x, rect.min().y, rect.max().y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_reflects_over_the_pole() {
        let point = GeoPoint::new(100.0, 10.0).canonicalized();
        assert_eq!(point.lat, 80.0);
        assert_eq!(point.lon, -170.0);
    }

    #[test]
    fn test_canonicalize_south_pole() {
        let point = GeoPoint::new(-100.0, -20.0).canonicalized();
        assert_eq!(point.lat, -80.0);
        assert_eq!(point.lon, 160.0);
    }

    #[test]
    fn test_canonicalize_range_conventions() {
        // -180 longitude is excluded, +180 kept
        assert_eq!(GeoPoint::new(0.0, -180.0).canonicalized().lon, 180.0);
        assert_eq!(GeoPoint::new(0.0, 180.0).canonicalized().lon, 180.0);
        assert_eq!(GeoPoint::new(0.0, 540.0).canonicalized().lon, 180.0);
        assert_eq!(GeoPoint::new(90.0, 0.0).canonicalized().lat, 90.0);
        assert_eq!(GeoPoint::new(-90.0, 0.0).canonicalized().lat, -90.0);
        assert_eq!(GeoPoint::new(370.0, 0.0).canonicalized(), GeoPoint::new(10.0, 0.0));
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let samples = [
            (100.0, 10.0),
            (-95.5, 179.0),
            (725.25, -900.75),
            (12.3456789, 98.7654321),
            (-180.0, -180.0),
            (270.0, 45.0),
            (0.1, 359.9),
        ];
        for (lat, lon) in samples {
            let once = GeoPoint::new(lat, lon).canonicalized();
            let twice = once.canonicalized();
            assert_eq!(once, twice, "input ({}, {})", lat, lon);
            assert!(once.is_canonical(), "input ({}, {}) -> {:?}", lat, lon, once);
        }
    }

    #[test]
    fn test_equality_ignores_elevation() {
        let mut a = GeoPoint::new(1.0, 2.0);
        a.elevation = 100.0;
        assert_eq!(a, GeoPoint::new(1.0, 2.0));
        assert_ne!(a, GeoPoint::new(2.0, 1.0));
    }

    #[test]
    fn test_point_display() {
        assert_eq!(GeoPoint::new(80.0, -170.0).to_string(), "80N;170W;");
        assert_eq!(GeoPoint::new(-1.5, 2.0).to_string(), "1.5S;2E;");
    }

    #[test]
    fn test_boundary_contains() {
        let outer = GeoBoundary::new(0.0, 10.0, 0.0, 10.0);
        assert!(outer.contains(&GeoBoundary::new(1.0, 9.0, 1.0, 9.0)));
        assert!(outer.contains(&GeoBoundary::new(0.0, 10.0, 0.0, 10.0)));
        assert!(!outer.contains(&GeoBoundary::new(-1.0, 9.0, 1.0, 9.0)));
        assert!(!outer.contains(&GeoBoundary::new(1.0, 11.0, 1.0, 9.0)));
    }

    #[test]
    fn test_boundary_rejects_slivers_on_edges() {
        let outer = GeoBoundary::new(0.0, 10.0, 0.0, 10.0);
        // Zero-width slice on the max edge: min edge is not < max_x.
        assert!(!outer.contains(&GeoBoundary::new(10.0, 10.0, 1.0, 9.0)));
        // Zero-height slice on the min edge: max edge is not > min_y.
        assert!(!outer.contains(&GeoBoundary::new(1.0, 9.0, 0.0, 0.0)));
        // Interior slivers are fine.
        assert!(outer.contains(&GeoBoundary::new(5.0, 5.0, 5.0, 5.0)));
    }

    #[test]
    fn test_boundary_queries() {
        let bounds = GeoBoundary::new(-10.0, 30.0, 20.0, 40.0);
        assert_eq!(bounds.width(), 40.0);
        assert_eq!(bounds.height(), 20.0);
        assert_eq!(bounds.median(0), 10.0);
        assert_eq!(bounds.median(1), 30.0);
        assert_eq!(bounds.median(7), 30.0);
        assert_eq!(bounds.center(), GeoPoint::new(30.0, 10.0));
        assert_eq!(bounds.south_west(), GeoPoint::new(20.0, -10.0));
        assert_eq!(bounds.north_east(), GeoPoint::new(40.0, 30.0));
    }

    #[test]
    fn test_boundary_copy_is_independent() {
        let original = GeoBoundary::new(0.0, 1.0, 2.0, 3.0);
        let mut copy = original;
        copy.set_bounds(5.0, 6.0, 7.0, 8.0);
        assert_eq!(original, GeoBoundary::new(0.0, 1.0, 2.0, 3.0));
        assert_eq!(copy.min_x, 5.0);
    }

    #[test]
    fn test_geo_types_round_trip() {
        let bounds = GeoBoundary::new(-127.49, -64.56, 29.03, 48.80);
        let rect: geo_types::Rect<f64> = bounds.into();
        assert_eq!(GeoBoundary::from(rect), bounds);

        let inverted = GeoBoundary::new(10.0, -10.0, 5.0, 1.0);
        let normalized = GeoBoundary::from(geo_types::Rect::from(inverted));
        assert_eq!(normalized, GeoBoundary::new(-10.0, 10.0, 1.0, 5.0));
        assert!(normalized.is_valid());

        let point: geo_types::Point<f64> = GeoPoint::new(48.8, 2.35).into();
        assert_eq!(point.x(), 2.35);
        assert_eq!(GeoPoint::from(point), GeoPoint::new(48.8, 2.35));
    }
}

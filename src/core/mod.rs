pub mod bounds;
pub mod config;
pub mod constants;
pub mod geo;

pub use bounds::Bounds;
pub use config::{BridgeConfig, ProjectionConfig, ProjectionMode, ReplayOrder};
pub use geo::{Axis, GeoBoundary, GeoMappedPoint, GeoPoint, LatLonRadians, Point};

//! Engine-wide constants for the projection and the renderer bridge.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Lowest zoom level the projection will step down to.
pub const MIN_ZOOM_LEVEL: f64 = 3.0;

/// Highest zoom level the projection will step up to.
pub const MAX_ZOOM_LEVEL: f64 = 20.0;

/// Zoom level a freshly created projection starts at.
pub const DEFAULT_ZOOM_LEVEL: f64 = 8.0;

/// Zoom level the bridge reports before the renderer says otherwise.
pub const DEFAULT_BRIDGE_ZOOM_LEVEL: f64 = 3.0;

/// Programmatic +/- zoom step when calling `zoom_in/zoom_out`.
pub const ZOOM_STEP: f64 = 1.0;

/// Width of the world map in pixels at zoom 0 for the Mercator transform.
pub const WORLD_MAP_WIDTH: f64 = 1.680_387_096_774_643_3e7;

/// Height of the world map in pixels at zoom 0. Square on purpose.
pub const WORLD_MAP_HEIGHT: f64 = 1.680_387_096_774_643_3e7;

/// Latitude where Web Mercator is cut off.
pub const MAX_LATITUDE: f64 = 85.051129;

/// Upper bound for commands held while the renderer is loading.
pub const DEFAULT_MAX_PENDING_COMMANDS: usize = 1024;

/// Renderer script that pans the map to the bridge's current center.
pub const PAN_TO_SCRIPT: &str = "document.panTo()";

/// Renderer script that recomputes and reports bounds and zoom.
pub const BOUNDS_AND_ZOOM_SCRIPT: &str = "document.boundsAndZoom()";

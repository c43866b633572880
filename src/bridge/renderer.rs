use crate::bridge::map_bridge::{Generation, MapBridge};
use crate::core::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};

/// Which map page the renderer loads
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapSource {
    #[default]
    OpenStreetMap,
    WebMap,
    /// Any other page the renderer knows by name
    Custom(String),
}

impl MapSource {
    /// Name of the page the renderer should load for this source
    pub fn page(&self) -> &str {
        match self {
            MapSource::OpenStreetMap => "osm",
            MapSource::WebMap => "webmap",
            MapSource::Custom(page) => page,
        }
    }
}

impl fmt::Display for MapSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapSource::OpenStreetMap => write!(f, "OSM"),
            MapSource::WebMap => write!(f, "WebMap"),
            MapSource::Custom(page) => write!(f, "Custom({})", page),
        }
    }
}

/// The external, asynchronously loading map renderer (typically a web view).
///
/// Implementations are driven from arbitrary threads and must not assume
/// they are called on a UI thread.
pub trait Renderer: Send + Sync {
    /// Start loading `source`. Should return promptly; completion and any
    /// later viewport changes are reported through `handle`, from any thread.
    /// Calling back synchronously from inside `load` is allowed.
    fn load(&self, source: &MapSource, handle: RendererHandle);

    /// Run a command and return whatever the renderer hands back.
    fn execute(&self, script: &str) -> Option<serde_json::Value>;
}

/// Callbacks the bridge delivers to its owner (the projection)
pub trait BridgeEventHandler: Send + Sync {
    /// The renderer finished loading and queued commands have been replayed
    fn on_web_map_initialized(&self, generation: Generation);

    /// The renderer reported new bounds after a pan/zoom of its own
    fn on_web_map_properties_changed(&self, generation: Generation);
}

/// The renderer's way back into the bridge for one particular load.
///
/// Each load gets its own handle tagged with that load's generation. Once
/// the bridge has moved on to a newer load every call here is ignored and
/// returns `false`.
#[derive(Clone)]
pub struct RendererHandle {
    bridge: Weak<MapBridge>,
    generation: Generation,
}

impl RendererHandle {
    pub(crate) fn new(bridge: &Arc<MapBridge>, generation: Generation) -> Self {
        Self {
            bridge: Arc::downgrade(bridge),
            generation,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether the bridge still exists and this load is the current one
    pub fn is_current(&self) -> bool {
        self.bridge
            .upgrade()
            .map_or(false, |bridge| bridge.generation() == self.generation)
    }

    /// Load succeeded
    pub fn ready(&self) -> bool {
        self.with_bridge(|bridge| bridge.on_ready(self.generation))
    }

    /// The rendered viewport is now `south_west`..`north_east`
    pub fn bounds_changed(&self, south_west: GeoPoint, north_east: GeoPoint) -> bool {
        self.with_bridge(|bridge| bridge.fire_change_event(self.generation, south_west, north_east))
    }

    pub fn zoom_changed(&self, zoom_level: f64) -> bool {
        self.with_bridge(|bridge| bridge.report_zoom_level(self.generation, zoom_level))
    }

    pub fn center_changed(&self, center: GeoPoint) -> bool {
        self.with_bridge(|bridge| bridge.report_center(self.generation, center))
    }

    pub fn report_error(&self, message: impl Into<String>) -> bool {
        let message = message.into();
        self.with_bridge(|bridge| bridge.report_error(self.generation, message))
    }

    fn with_bridge(&self, f: impl FnOnce(&MapBridge) -> bool) -> bool {
        match self.bridge.upgrade() {
            Some(bridge) => f(&bridge),
            None => {
                log::debug!(
                    "renderer callback for generation {} after bridge was dropped",
                    self.generation
                );
                false
            }
        }
    }
}

impl fmt::Debug for RendererHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererHandle")
            .field("generation", &self.generation)
            .finish()
    }
}

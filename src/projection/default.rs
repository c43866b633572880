use crate::bridge::{
    BridgeEventHandler, Generation, MapBridge, MapSource, Renderer, RendererCommand,
};
use crate::core::bounds::Bounds;
use crate::core::config::{ProjectionConfig, ProjectionMode};
use crate::core::constants::{MAX_LATITUDE, ZOOM_STEP};
use crate::core::geo::{GeoBoundary, GeoPoint, LatLonRadians, Point};
use crate::events::{EventDispatcher, ProjectionEvent};
use crate::projection::mercator;
use crate::projection::state::ProjectionState;
use crate::projection::MapProjection;
use crate::{MapError, Result};
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

/// Projection backed by a [`MapBridge`].
///
/// Local state (anchors, ratios, zoom) sits behind one read-write lock.
/// Reads share it, writes take it exclusively, and the lock is never held
/// while talking to the bridge, so renderer callbacks that re-enter the
/// projection cannot deadlock.
///
/// Units: [`MapProjection::location_to_xy`] and
/// [`MapProjection::xy_to_location`] take and return degrees in either
/// mode. The raw transforms are also exposed per unit:
/// [`transform_degrees`](Self::transform_degrees) is the linear transform,
/// [`transform_radians`](Self::transform_radians) the Mercator one.
pub struct DefaultMapProjection {
    state: RwLock<ProjectionState>,
    bridge: Arc<MapBridge>,
    events: EventDispatcher,
    config: ProjectionConfig,
}

impl DefaultMapProjection {
    pub fn new() -> Arc<Self> {
        Self::build(ProjectionConfig::default())
    }

    pub fn with_config(config: ProjectionConfig) -> Result<Arc<Self>> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ProjectionConfig) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let bridge = MapBridge::new(config.bridge.clone());
            let handler: Weak<dyn BridgeEventHandler> = weak.clone();
            bridge.set_event_handler(handler);
            // The bridge starts out agreeing with the projection; its own
            // configured zoom only applies to a standalone bridge.
            bridge.set_zoom_level(config.initial_zoom);

            Self {
                state: RwLock::new(ProjectionState::new(
                    config.initial_zoom,
                    config.mode,
                    config.initial_bounds,
                )),
                bridge,
                events: EventDispatcher::new(),
                config,
            }
        })
    }

    pub fn bridge(&self) -> &Arc<MapBridge> {
        &self.bridge
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn mode(&self) -> ProjectionMode {
        self.state.read().mode
    }

    pub fn set_mode(&self, mode: ProjectionMode) {
        self.state.write().mode = mode;
    }

    /// Copy of the current state, taken under the read lock
    pub fn state(&self) -> ProjectionState {
        self.state.read().clone()
    }

    pub fn x_ratio(&self) -> f64 {
        self.state.read().x_ratio()
    }

    pub fn y_ratio(&self) -> f64 {
        self.state.read().y_ratio()
    }

    /// Sets the zoom directly, clamped to the configured limits, and asks
    /// the renderer to follow.
    pub fn set_zoom_level(&self, zoom_level: f64) {
        let zoom_level = self.clamp_zoom(zoom_level);
        self.state.write().zoom_level = zoom_level;
        self.bridge.set_zoom_level(zoom_level);
        self.bridge.execute_command(RendererCommand::BoundsAndZoom);
    }

    /// Linear transform; degrees in, pixels out
    pub fn transform_degrees(&self, lat: f64, lon: f64) -> Point {
        self.state.read().linear_to_xy(lat, lon)
    }

    /// Inverse linear transform; pixels in, degrees out
    pub fn inverse_degrees(&self, x: f64, y: f64) -> GeoPoint {
        self.state.read().linear_to_location(x, y)
    }

    /// Mercator transform at the current zoom; radians in, world pixels out
    pub fn transform_radians(&self, location: LatLonRadians) -> Point {
        let zoom = self.state.read().zoom_level;
        mercator::to_xy(location, zoom)
    }

    /// Inverse Mercator transform at the current zoom; radians out
    pub fn inverse_radians(&self, x: f64, y: f64) -> LatLonRadians {
        let zoom = self.state.read().zoom_level;
        mercator::to_location(Point::new(x, y), zoom)
    }

    /// Pans the renderer to the center of the local viewport, then adopts
    /// whatever bounds the bridge holds afterwards.
    pub fn move_web_map_to_center(&self) -> Result<()> {
        let center = self.state.read().geo_center();
        self.bridge.set_center(center.lon, center.lat);
        self.bridge.execute_command(RendererCommand::PanTo);
        self.set_bounds(self.bridge.bounds())
    }

    /// Pulls the renderer's view into the local anchors. Returns the new
    /// viewport, or `None` if the bridge has moved past `generation`.
    fn marshal_from_bridge(&self, generation: Generation) -> Option<GeoBoundary> {
        let snapshot = self.bridge.snapshot();
        if snapshot.generation != generation {
            log::debug!(
                "skipping marshal for generation {}, bridge is at {}",
                generation,
                snapshot.generation
            );
            return None;
        }

        let zoom_level = self.clamp_zoom(snapshot.zoom_level);
        if zoom_level != snapshot.zoom_level {
            log::debug!(
                "renderer zoom {} outside [{}, {}], using {}",
                snapshot.zoom_level,
                self.config.min_zoom,
                self.config.max_zoom,
                zoom_level
            );
        }

        let mut state = self.state.write();
        state.zoom_level = zoom_level;
        state
            .south_west
            .set_location(snapshot.south_west.lat, snapshot.south_west.lon);
        state
            .north_east
            .set_location(snapshot.north_east.lat, snapshot.north_east.lon);
        state.recompute_ratios();
        log::debug!(
            "marshalled bridge view: zoom {} ratios ({}, {})",
            state.zoom_level,
            state.x_ratio(),
            state.y_ratio()
        );
        Some(state.bounds())
    }

    fn clamp_zoom(&self, zoom_level: f64) -> f64 {
        zoom_level.clamp(self.config.min_zoom, self.config.max_zoom)
    }

    /// Steps from the renderer's zoom, brought back into range first, so a
    /// step never moves against its direction.
    fn step_zoom(&self, delta: f64) -> bool {
        let current = self.clamp_zoom(self.bridge.zoom_level());
        let target = self.clamp_zoom(current + delta);
        if target == current {
            log::debug!("zoom already at limit {}", current);
            return false;
        }

        self.state.write().zoom_level = target;
        self.bridge.set_zoom_level(target);
        self.bridge.execute_command(RendererCommand::BoundsAndZoom);
        true
    }
}

impl MapProjection for DefaultMapProjection {
    fn set_screen_size(&self, width: u32, height: u32) {
        let mut state = self.state.write();
        state.set_screen_size(f64::from(width), f64::from(height));
        log::debug!(
            "screen {}x{}, ratios ({}, {})",
            width,
            height,
            state.x_ratio(),
            state.y_ratio()
        );
    }

    fn screen_area(&self) -> Bounds {
        self.state.read().screen_area
    }

    fn zoom_level(&self) -> f64 {
        self.state.read().zoom_level
    }

    fn zoom_in(&self) -> bool {
        self.step_zoom(ZOOM_STEP)
    }

    fn zoom_out(&self) -> bool {
        self.step_zoom(-ZOOM_STEP)
    }

    fn bounds(&self) -> GeoBoundary {
        self.state.read().bounds()
    }

    /// Rejects non-finite edges and leaves the state untouched in that case.
    fn set_bounds(&self, bounds: GeoBoundary) -> Result<()> {
        if !bounds.is_finite() {
            log::error!("rejecting bounds update: {}", bounds);
            return Err(MapError::InvalidBounds(bounds.to_string()));
        }

        let old = {
            let mut state = self.state.write();
            let old = state.bounds();
            state.set_bounds(&bounds);
            old
        };

        if old != bounds {
            self.events.emit(ProjectionEvent::BoundsChanged {
                old: Some(old),
                new: bounds,
            });
        }
        Ok(())
    }

    fn set_pre_bounds(&self, bounds: GeoBoundary) {
        let center = bounds.center();
        self.bridge.set_center(center.lon, center.lat);
        self.bridge.execute_command(RendererCommand::PanTo);
    }

    /// In Mercator mode latitudes are clamped to the Mercator limit first,
    /// so the round trip only holds within it.
    fn location_to_xy(&self, lat: f64, lon: f64) -> Point {
        let state = self.state.read();
        match state.mode {
            ProjectionMode::Linear => state.linear_to_xy(lat, lon),
            ProjectionMode::Mercator => {
                let clamped = GeoPoint::new(lat.clamp(-MAX_LATITUDE, MAX_LATITUDE), lon);
                mercator::to_xy(LatLonRadians::from(clamped), state.zoom_level)
            }
        }
    }

    fn xy_to_location(&self, x: f64, y: f64) -> GeoPoint {
        let state = self.state.read();
        match state.mode {
            ProjectionMode::Linear => state.linear_to_location(x, y),
            ProjectionMode::Mercator => {
                mercator::to_location(Point::new(x, y), state.zoom_level).to_degrees()
            }
        }
    }

    /// Moves the renderer's center by a pixel delta. The delta is counted
    /// inclusively, like the pixel spans behind the ratios. Local anchors
    /// only change once the renderer reports its new bounds.
    fn translate_center_in_pixel(&self, dx: f64, dy: f64) {
        let (x_ratio, y_ratio) = {
            let state = self.state.read();
            (state.x_ratio(), state.y_ratio())
        };
        let d_lon = (dx + 1.0) * x_ratio;
        let d_lat = (dy + 1.0) * y_ratio;

        let center = self.bridge.center();
        self.bridge.set_center(center.lon - d_lon, center.lat + d_lat);
        self.bridge.execute_command(RendererCommand::PanTo);
    }

    fn initialize_bridge(&self, renderer: Arc<dyn Renderer>) -> Generation {
        self.bridge.attach(renderer)
    }

    fn switch_map_source(&self, source: MapSource) -> MapSource {
        let source = self.bridge.switch_source(source);
        self.events.emit(ProjectionEvent::SourceChanged {
            source: source.clone(),
        });
        source
    }

    fn events(&self) -> &EventDispatcher {
        &self.events
    }
}

impl BridgeEventHandler for DefaultMapProjection {
    fn on_web_map_initialized(&self, generation: Generation) {
        if self.marshal_from_bridge(generation).is_some() {
            self.events
                .emit(ProjectionEvent::RendererReady { generation });
        }
    }

    fn on_web_map_properties_changed(&self, generation: Generation) {
        if let Some(bounds) = self.marshal_from_bridge(generation) {
            self.events.emit(ProjectionEvent::BoundsChanged {
                old: None,
                new: bounds,
            });
        }
    }
}

impl fmt::Display for DefaultMapProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (south_west, north_east) = {
            let state = self.state.read();
            (state.south_west, state.north_east)
        };
        write!(
            f,
            "DefaultMapProjection's SW: {}, NE: {}\nWebMap's bound: {}",
            south_west, north_east, self.bridge
        )
    }
}

impl fmt::Debug for DefaultMapProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultMapProjection")
            .field("state", &*self.state.read())
            .field("bridge", &self.bridge)
            .field("events", &self.events)
            .finish()
    }
}

use crate::bridge::command::RendererCommand;
use crate::bridge::renderer::{BridgeEventHandler, MapSource, Renderer, RendererHandle};
use crate::core::config::{BridgeConfig, ReplayOrder};
use crate::core::geo::{GeoBoundary, GeoPoint};
use crate::MapError;
use instant::Instant;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};

/// Tag of one renderer load attempt. Bumped on every (re)load.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the renderer behind the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeState {
    /// No renderer attached yet; commands are queued
    Uninitialized,
    /// Renderer attached and loading; commands are queued
    Loading(Generation),
    /// Renderer loaded; commands run immediately
    Ready(Generation),
}

impl BridgeState {
    pub fn is_ready(&self) -> bool {
        matches!(self, BridgeState::Ready(_))
    }
}

/// Consistent copy of the renderer-side view state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeSnapshot {
    pub generation: Generation,
    pub zoom_level: f64,
    pub center: GeoPoint,
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl BridgeSnapshot {
    pub fn bounds(&self) -> GeoBoundary {
        GeoBoundary::from_corners(self.south_west, self.north_east)
    }
}

struct BridgeInner {
    state: BridgeState,
    generation: Generation,
    renderer: Option<Arc<dyn Renderer>>,
    commands: VecDeque<RendererCommand>,
    dropped_commands: u64,
    source: MapSource,
    center: GeoPoint,
    zoom_level: f64,
    south_west: GeoPoint,
    north_east: GeoPoint,
    last_error: Option<String>,
    load_started: Option<Instant>,
}

impl BridgeInner {
    /// Moves to a fresh load generation. Commands queued for a load that is
    /// being abandoned go with it.
    fn begin_load(&mut self) -> Generation {
        if !matches!(self.state, BridgeState::Uninitialized) && !self.commands.is_empty() {
            log::debug!(
                "discarding {} queued command(s) of superseded load {}",
                self.commands.len(),
                self.generation
            );
            self.commands.clear();
        }
        self.generation = self.generation.next();
        self.state = BridgeState::Loading(self.generation);
        self.load_started = Some(Instant::now());
        self.generation
    }

    /// Before the renderer has reported anything the anchors are both the
    /// same point; pin them to the provisional center.
    fn sync_provisional_center(&mut self) {
        if self.north_east == self.south_west && self.south_west != self.center {
            self.north_east = self.center;
            self.south_west = self.center;
        }
    }

    fn enqueue(&mut self, command: RendererCommand, limit: usize) {
        while self.commands.len() >= limit {
            if let Some(evicted) = self.commands.pop_front() {
                self.dropped_commands += 1;
                log::warn!(
                    "command queue full ({} pending), dropping oldest command {}",
                    limit,
                    evicted
                );
            }
        }
        log::debug!("renderer not ready, queueing {}", command);
        self.commands.push_back(command);
    }

    fn take_commands(&mut self, order: ReplayOrder) -> Vec<RendererCommand> {
        match order {
            ReplayOrder::Submission => self.commands.drain(..).collect(),
            ReplayOrder::MostRecentFirst => self.commands.drain(..).rev().collect(),
        }
    }

    fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation && !matches!(self.state, BridgeState::Uninitialized)
    }
}

/// Handle on the external renderer.
///
/// Commands issued before the renderer has finished loading are queued and
/// replayed once it reports ready. Every load is tagged with a
/// [`Generation`]; callbacks carrying an older tag are ignored. Neither the
/// renderer nor the event handler is ever called with the bridge's lock held.
pub struct MapBridge {
    inner: Mutex<BridgeInner>,
    handler: RwLock<Option<Weak<dyn BridgeEventHandler>>>,
    config: BridgeConfig,
}

impl MapBridge {
    pub fn new(config: BridgeConfig) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(BridgeInner {
                state: BridgeState::Uninitialized,
                generation: Generation::default(),
                renderer: None,
                commands: VecDeque::new(),
                dropped_commands: 0,
                source: config.source.clone(),
                center: GeoPoint::default(),
                zoom_level: config.initial_zoom,
                south_west: GeoPoint::default(),
                north_east: GeoPoint::default(),
                last_error: None,
                load_started: None,
            }),
            handler: RwLock::new(None),
            config,
        })
    }

    pub fn set_event_handler(&self, handler: Weak<dyn BridgeEventHandler>) {
        *self.handler.write() = Some(handler);
    }

    /// Binds a renderer and starts loading the current source
    pub fn attach(self: &Arc<Self>, renderer: Arc<dyn Renderer>) -> Generation {
        let (generation, source) = {
            let mut inner = self.inner.lock();
            inner.renderer = Some(Arc::clone(&renderer));
            (inner.begin_load(), inner.source.clone())
        };
        log::info!("loading map source {} as generation {}", source, generation);
        renderer.load(&source, RendererHandle::new(self, generation));
        generation
    }

    /// Switches to another map source and reloads the renderer.
    ///
    /// Returns the source in use afterwards. Asking for the current source
    /// does nothing.
    pub fn switch_source(self: &Arc<Self>, source: MapSource) -> MapSource {
        let reload = {
            let mut inner = self.inner.lock();
            if inner.source == source {
                return source;
            }
            log::info!("switching map source {} -> {}", inner.source, source);
            inner.source = source.clone();
            match inner.renderer.clone() {
                Some(renderer) => Some((renderer, inner.begin_load())),
                None => None,
            }
        };

        if let Some((renderer, generation)) = reload {
            renderer.load(&source, RendererHandle::new(self, generation));
        }
        source
    }

    /// Runs `command` on the renderer, or queues it while the renderer is
    /// not ready (in which case `None` is returned).
    ///
    /// The renderer runs without the bridge lock held. If a source switch
    /// lands while the command is running, the command went to a page that
    /// is being replaced: it is not queued for the new load and its result
    /// is discarded, the same as commands queued for an abandoned load.
    pub fn execute_command(
        &self,
        command: impl Into<RendererCommand>,
    ) -> Option<serde_json::Value> {
        let command = command.into();
        let (renderer, generation) = {
            let mut inner = self.inner.lock();
            if !inner.state.is_ready() {
                inner.sync_provisional_center();
                inner.enqueue(command, self.config.max_pending_commands);
                return None;
            }
            (inner.renderer.clone(), inner.generation)
        };

        let Some(renderer) = renderer else {
            log::error!("bridge ready without a renderer, dropping {}", command);
            return None;
        };
        let result = renderer.execute(command.script());

        let current = self.inner.lock().generation;
        if current != generation {
            log::debug!(
                "generation {} superseded by {} while running {}, discarding result",
                generation,
                current,
                command
            );
            return None;
        }
        result
    }

    /// Renderer of `generation` finished loading.
    ///
    /// Runs the bounds/zoom refresh, replays the queue and notifies the
    /// handler. Returns `false` if the generation is stale.
    pub fn on_ready(&self, generation: Generation) -> bool {
        let (renderer, started) = {
            let mut inner = self.inner.lock();
            if inner.state != BridgeState::Loading(generation) {
                log::debug!(
                    "ignoring ready from generation {} (state {:?})",
                    generation,
                    inner.state
                );
                return false;
            }
            let Some(renderer) = inner.renderer.clone() else {
                return false;
            };
            (renderer, inner.load_started.take())
        };

        if let Some(started) = started {
            log::info!(
                "renderer generation {} ready after {:?}",
                generation,
                started.elapsed()
            );
        }
        renderer.execute(RendererCommand::BoundsAndZoom.script());

        // Commands queued while a batch is replaying land in the next batch,
        // so nothing overtakes the backlog.
        loop {
            let batch = {
                let mut inner = self.inner.lock();
                if inner.state != BridgeState::Loading(generation) {
                    log::debug!("generation {} superseded while replaying", generation);
                    return false;
                }
                if inner.commands.is_empty() {
                    inner.state = BridgeState::Ready(generation);
                    break;
                }
                inner.take_commands(self.config.replay_order)
            };
            log::debug!("replaying {} queued command(s)", batch.len());
            for command in batch {
                renderer.execute(command.script());
            }
        }

        if let Some(handler) = self.handler() {
            handler.on_web_map_initialized(generation);
        }
        true
    }

    /// Renderer of `generation` reports its rendered viewport
    pub fn fire_change_event(
        &self,
        generation: Generation,
        south_west: GeoPoint,
        north_east: GeoPoint,
    ) -> bool {
        {
            let mut inner = self.inner.lock();
            if !inner.is_current(generation) {
                log::debug!("ignoring bounds from stale generation {}", generation);
                return false;
            }
            inner.south_west = south_west;
            inner.north_east = north_east;
        }

        if let Some(handler) = self.handler() {
            handler.on_web_map_properties_changed(generation);
        }
        true
    }

    pub fn report_zoom_level(&self, generation: Generation, zoom_level: f64) -> bool {
        let mut inner = self.inner.lock();
        if !inner.is_current(generation) {
            return false;
        }
        inner.zoom_level = zoom_level;
        true
    }

    pub fn report_center(&self, generation: Generation, center: GeoPoint) -> bool {
        let mut inner = self.inner.lock();
        if !inner.is_current(generation) {
            return false;
        }
        inner.center = center;
        true
    }

    pub fn report_error(&self, generation: Generation, message: String) -> bool {
        let mut inner = self.inner.lock();
        if !inner.is_current(generation) {
            return false;
        }
        log::warn!("renderer generation {} reported: {}", generation, message);
        inner.last_error = Some(message);
        true
    }

    fn handler(&self) -> Option<Arc<dyn BridgeEventHandler>> {
        self.handler.read().as_ref().and_then(Weak::upgrade)
    }

    pub fn state(&self) -> BridgeState {
        self.inner.lock().state
    }

    pub fn generation(&self) -> Generation {
        self.inner.lock().generation
    }

    pub fn source(&self) -> MapSource {
        self.inner.lock().source.clone()
    }

    pub fn snapshot(&self) -> BridgeSnapshot {
        let inner = self.inner.lock();
        BridgeSnapshot {
            generation: inner.generation,
            zoom_level: inner.zoom_level,
            center: inner.center,
            south_west: inner.south_west,
            north_east: inner.north_east,
        }
    }

    pub fn center(&self) -> GeoPoint {
        self.inner.lock().center
    }

    pub fn set_center(&self, lon: f64, lat: f64) {
        self.inner.lock().center = GeoPoint::new(lat, lon);
    }

    pub fn zoom_level(&self) -> f64 {
        self.inner.lock().zoom_level
    }

    pub fn set_zoom_level(&self, zoom_level: f64) {
        self.inner.lock().zoom_level = zoom_level;
    }

    pub fn south_west(&self) -> GeoPoint {
        self.inner.lock().south_west
    }

    pub fn set_south_west(&self, lon: f64, lat: f64) {
        self.inner.lock().south_west.set_location(lon, lat);
    }

    pub fn north_east(&self) -> GeoPoint {
        self.inner.lock().north_east
    }

    pub fn set_north_east(&self, lon: f64, lat: f64) {
        self.inner.lock().north_east.set_location(lon, lat);
    }

    /// Viewport as last reported by the renderer
    pub fn bounds(&self) -> GeoBoundary {
        self.snapshot().bounds()
    }

    pub fn geo_width(&self) -> f64 {
        let inner = self.inner.lock();
        (inner.north_east.lon - inner.south_west.lon).abs()
    }

    pub fn geo_height(&self) -> f64 {
        let inner = self.inner.lock();
        (inner.north_east.lat - inner.south_west.lat).abs()
    }

    pub fn pending_commands(&self) -> usize {
        self.inner.lock().commands.len()
    }

    /// Commands evicted because the queue hit `max_pending_commands`
    pub fn dropped_commands(&self) -> u64 {
        self.inner.lock().dropped_commands
    }

    /// Most recent error reported by the current renderer
    pub fn last_error(&self) -> Option<MapError> {
        self.inner.lock().last_error.clone().map(MapError::Renderer)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

impl fmt::Display for MapBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        write!(
            f,
            "MapSource: {}, Center({}, {}); Zoom = {}, Bounds sw: ({}, {}) ne: ({}, {}), last error: {}",
            inner.source,
            inner.center.lon,
            inner.center.lat,
            inner.zoom_level,
            inner.south_west.lon,
            inner.south_west.lat,
            inner.north_east.lon,
            inner.north_east.lat,
            inner.last_error.as_deref().unwrap_or("none")
        )
    }
}

impl fmt::Debug for MapBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MapBridge")
            .field("state", &inner.state)
            .field("source", &inner.source)
            .field("pending_commands", &inner.commands.len())
            .finish()
    }
}

//! Projection between geographic coordinates and the widget's pixels
//!
//! [`MapProjection`] is the contract the UI shell talks to;
//! [`DefaultMapProjection`] implements it on top of a [`MapBridge`].
//!
//! [`MapBridge`]: crate::bridge::MapBridge

pub mod default;
pub mod mercator;
pub mod state;

pub use default::DefaultMapProjection;
pub use state::ProjectionState;

use crate::bridge::{Generation, MapSource, Renderer};
use crate::core::bounds::Bounds;
use crate::core::geo::{GeoBoundary, GeoPoint, Point};
use crate::events::{EventDispatcher, ListenerId, ProjectionEvent};
use crate::Result;
use crossbeam_channel::Receiver;
use std::sync::Arc;

/// Projection engine contract.
///
/// All methods take `&self`; implementations synchronise internally and
/// may be shared between the UI thread and renderer callbacks.
pub trait MapProjection: Send + Sync {
    /// Redefines the pixel rectangle and recomputes the ratios
    fn set_screen_size(&self, width: u32, height: u32);

    fn screen_area(&self) -> Bounds;

    fn zoom_level(&self) -> f64;

    /// Steps one zoom level in. Returns false if already at the limit.
    fn zoom_in(&self) -> bool;

    /// Steps one zoom level out. Returns false if already at the limit.
    fn zoom_out(&self) -> bool;

    /// Current viewport
    fn bounds(&self) -> GeoBoundary;

    /// Replaces the viewport and notifies listeners
    fn set_bounds(&self, bounds: GeoBoundary) -> Result<()>;

    /// Asks the renderer to center on `bounds` without touching the local
    /// viewport; the renderer's answer arrives through its callbacks.
    fn set_pre_bounds(&self, bounds: GeoBoundary);

    /// Geographic degrees to screen pixels
    fn location_to_xy(&self, lat: f64, lon: f64) -> Point;

    /// Screen pixels to geographic degrees; inverse of `location_to_xy`
    fn xy_to_location(&self, x: f64, y: f64) -> GeoPoint;

    fn translate_center_in_pixel(&self, dx: f64, dy: f64);

    /// Binds the external renderer and starts loading it
    fn initialize_bridge(&self, renderer: Arc<dyn Renderer>) -> Generation;

    /// Returns the source in use after the request, which is the requested
    /// one unless the switch was a no-op.
    fn switch_map_source(&self, source: MapSource) -> MapSource;

    fn events(&self) -> &EventDispatcher;

    fn add_event_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ProjectionEvent) + Send + Sync + 'static,
        Self: Sized,
    {
        self.events().on(listener)
    }

    fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.events().remove(id)
    }

    fn subscribe(&self) -> Receiver<ProjectionEvent> {
        self.events().subscribe()
    }

    fn width(&self) -> f64 {
        self.screen_area().width()
    }

    fn height(&self) -> f64 {
        self.screen_area().height()
    }

    fn center_screen_x(&self) -> f64 {
        self.screen_area().center().x
    }

    fn center_screen_y(&self) -> f64 {
        self.screen_area().center().y
    }
}

/// Slope and intercept `(a, b)` of the line `y = a * x + b` through two points
pub fn line_equation(x1: f64, y1: f64, x2: f64, y2: f64) -> (f64, f64) {
    let a = (y2 - y1) / (x2 - x1);
    let b = y1 - a * x1;
    (a, b)
}

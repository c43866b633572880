//! # fxmap
//!
//! Projection engine for a map widget that embeds an external, asynchronously
//! loading renderer (typically a web view running a JS map).
//!
//! The crate converts between geographic coordinates and the widget's
//! pixels, keeps a local viewport in sync with what the renderer reports,
//! and queues renderer commands until the renderer has finished loading.

pub mod bridge;
pub mod core;
pub mod events;
pub mod prelude;
pub mod projection;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    config::{BridgeConfig, ProjectionConfig, ProjectionMode, ReplayOrder},
    geo::{GeoBoundary, GeoMappedPoint, GeoPoint, LatLonRadians, Point},
};

pub use bridge::{
    BridgeEventHandler, BridgeState, Generation, MapBridge, MapSource, Renderer, RendererCommand,
    RendererHandle,
};

pub use events::{EventDispatcher, ListenerId, ProjectionEvent};

pub use projection::{DefaultMapProjection, MapProjection};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Renderer error: {0}")]
    Renderer(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs an `env_logger` logger reading `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

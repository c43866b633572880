//! Bridge to the external map renderer
//!
//! The renderer (usually a web view running a JS map) loads asynchronously
//! and may be reloaded whenever the map source changes. [`MapBridge`] hides
//! that lifecycle from the projection: commands are queued until the
//! renderer is ready, and callbacks from superseded loads are discarded.

pub mod command;
pub mod map_bridge;
pub mod renderer;

pub use command::RendererCommand;
pub use map_bridge::{BridgeSnapshot, BridgeState, Generation, MapBridge};
pub use renderer::{BridgeEventHandler, MapSource, Renderer, RendererHandle};

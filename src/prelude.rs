//! Prelude module for common fxmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use fxmap::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::{BridgeConfig, ProjectionConfig, ProjectionMode, ReplayOrder},
    geo::{Axis, GeoBoundary, GeoMappedPoint, GeoPoint, LatLonRadians, Point},
};

pub use crate::bridge::{
    BridgeEventHandler, BridgeSnapshot, BridgeState, Generation, MapBridge, MapSource, Renderer,
    RendererCommand, RendererHandle,
};

pub use crate::events::{EventDispatcher, ListenerId, ProjectionEvent};

pub use crate::projection::{line_equation, DefaultMapProjection, MapProjection};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

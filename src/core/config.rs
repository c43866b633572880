//! Configuration for the projection engine and its renderer bridge
//!
//! Plain structs with sensible defaults, a couple of presets, and JSON
//! loading so an embedding application can ship its settings as a file.

use crate::bridge::MapSource;
use crate::core::constants::{
    DEFAULT_BRIDGE_ZOOM_LEVEL, DEFAULT_MAX_PENDING_COMMANDS, DEFAULT_ZOOM_LEVEL, MAX_ZOOM_LEVEL,
    MIN_ZOOM_LEVEL,
};
use crate::core::geo::GeoBoundary;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Which transform `location_to_xy`/`xy_to_location` use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Linear interpolation between the SW/NE anchors
    #[default]
    Linear,
    /// Spherical Web Mercator on the world-map pixel grid
    Mercator,
}

/// Order in which commands queued during loading are replayed once the
/// renderer is ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayOrder {
    /// Oldest first
    #[default]
    Submission,
    /// Newest first, matching the stack-based queue of older renderer hosts
    MostRecentFirst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Zoom the bridge reports until the renderer tells it otherwise.
    /// A bridge owned by a projection starts at the projection's
    /// `initial_zoom` instead.
    pub initial_zoom: f64,
    pub source: MapSource,
    pub replay_order: ReplayOrder,
    /// Commands beyond this count evict the oldest queued command
    pub max_pending_commands: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            initial_zoom: DEFAULT_BRIDGE_ZOOM_LEVEL,
            source: MapSource::default(),
            replay_order: ReplayOrder::default(),
            max_pending_commands: DEFAULT_MAX_PENDING_COMMANDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub initial_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub mode: ProjectionMode,
    /// Anchors to start from before the renderer reports real bounds
    pub initial_bounds: Option<GeoBoundary>,
    pub bridge: BridgeConfig,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            initial_zoom: DEFAULT_ZOOM_LEVEL,
            min_zoom: MIN_ZOOM_LEVEL,
            max_zoom: MAX_ZOOM_LEVEL,
            mode: ProjectionMode::default(),
            initial_bounds: None,
            bridge: BridgeConfig::default(),
        }
    }
}

impl ProjectionConfig {
    /// Preset starting over the continental United States
    pub fn continental_us() -> Self {
        Self {
            initial_bounds: Some(GeoBoundary::new(-127.49, -64.56, 29.03, 48.80)),
            ..Self::default()
        }
    }

    /// Preset using the Mercator transform
    pub fn mercator() -> Self {
        Self {
            mode: ProjectionMode::Mercator,
            ..Self::default()
        }
    }

    /// Parses and validates a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_zoom.is_finite() && self.max_zoom.is_finite()) {
            return Err(MapError::InvalidConfig(
                "zoom limits must be finite".to_string(),
            ));
        }
        if self.min_zoom > self.max_zoom {
            return Err(MapError::InvalidConfig(format!(
                "min_zoom {} is above max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(self.min_zoom..=self.max_zoom).contains(&self.initial_zoom) {
            return Err(MapError::InvalidConfig(format!(
                "initial_zoom {} outside [{}, {}]",
                self.initial_zoom, self.min_zoom, self.max_zoom
            )));
        }
        if let Some(bounds) = &self.initial_bounds {
            if !bounds.is_finite() {
                return Err(MapError::InvalidConfig(format!(
                    "initial_bounds must be finite: {}",
                    bounds
                )));
            }
        }
        if self.bridge.max_pending_commands == 0 {
            return Err(MapError::InvalidConfig(
                "bridge.max_pending_commands must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

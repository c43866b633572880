use crate::core::constants::{BOUNDS_AND_ZOOM_SCRIPT, PAN_TO_SCRIPT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A command for the renderer. The renderer only ever sees the script text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererCommand {
    /// Pan to the center currently held by the bridge
    PanTo,
    /// Recompute bounds and zoom and report them back
    BoundsAndZoom,
    /// Anything else, passed through untouched
    Script(String),
}

impl RendererCommand {
    pub fn script(&self) -> &str {
        match self {
            RendererCommand::PanTo => PAN_TO_SCRIPT,
            RendererCommand::BoundsAndZoom => BOUNDS_AND_ZOOM_SCRIPT,
            RendererCommand::Script(script) => script,
        }
    }
}

impl From<&str> for RendererCommand {
    fn from(script: &str) -> Self {
        match script {
            PAN_TO_SCRIPT => RendererCommand::PanTo,
            BOUNDS_AND_ZOOM_SCRIPT => RendererCommand::BoundsAndZoom,
            other => RendererCommand::Script(other.to_string()),
        }
    }
}

impl From<String> for RendererCommand {
    fn from(script: String) -> Self {
        match script.as_str() {
            PAN_TO_SCRIPT | BOUNDS_AND_ZOOM_SCRIPT => RendererCommand::from(script.as_str()),
            _ => RendererCommand::Script(script),
        }
    }
}

impl fmt::Display for RendererCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.script())
    }
}

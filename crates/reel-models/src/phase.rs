//! Pipeline phases.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The generation phases driven by this pipeline.
///
/// Upstream phases (story, roles, images, tones) run in the
/// conversational front end; the orchestrator only ever streams these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Create one generation job per storyboard scene
    Video,
    /// Assemble downloaded assets into the composite film
    Film,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Video => "video",
            Phase::Film => "film",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

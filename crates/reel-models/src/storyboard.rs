//! Storyboard entities.
//!
//! All storyboard entities carry a 0-based `index` that correlates one
//! scene's tone, description, image, video and audio across the whole
//! run. Indices must be unique within a collection and contiguous
//! `0..n` by the time the assembler sees them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Narration for one storyboard scene, in both subtitle languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Tone {
    /// Storyboard index
    pub index: usize,
    /// Primary-language narration line
    #[serde(default)]
    pub line: String,
    /// Secondary-language narration line
    #[serde(default)]
    pub line_en: String,
}

/// Text prompt describing the video to generate for one scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VideoDescription {
    /// Storyboard index
    pub index: usize,
    /// Prompt text handed to the generation service
    pub description: String,
}

/// First-frame image references for one scene.
///
/// The index may arrive unsynchronized with the matching video
/// description; the reconciler repairs the pairing. Only the first
/// image reference is used for job creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FirstFrameImage {
    /// Storyboard index
    pub index: usize,
    /// Ordered image references, first one wins
    pub images: Vec<String>,
}

impl FirstFrameImage {
    /// The image reference used for job creation, if any.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

//! Top-level pipeline request.

use serde::Deserialize;

use crate::film_phase::FilmPhaseRequest;
use crate::video_phase::VideoPhaseRequest;

/// A phase invocation as submitted by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PipelineRequest {
    Video(VideoPhaseRequest),
    Film(FilmPhaseRequest),
}

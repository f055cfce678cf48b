//! Phase stream chunk types.
//!
//! A phase driver emits an ordered sequence of chunks: first the phase
//! announcement, then the result payload, then the completion marker.
//! On failure the stream terminates with an error chunk instead.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::asset::{Film, Video};
use crate::phase::Phase;

/// One element of the pipeline output stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseChunk {
    /// Announces the phase now streaming
    Phase { phase: Phase },

    /// Carries the phase result payload
    Payload {
        #[serde(flatten)]
        payload: PhasePayload,
    },

    /// Terminal marker, no more chunks follow
    Done,

    /// Terminal error, the stream aborts without a payload
    Error {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

/// Phase result payloads, serialized in the documented wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PhasePayload {
    /// `{"videos": [{index, jobId}, ...]}`
    Videos { videos: Vec<Video> },
    /// `{"film": {"url": ...}}`
    Film { film: Film },
}

impl PhaseChunk {
    /// Create a phase announcement chunk.
    pub fn phase(phase: Phase) -> Self {
        PhaseChunk::Phase { phase }
    }

    /// Create a videos payload chunk.
    pub fn videos(videos: Vec<Video>) -> Self {
        PhaseChunk::Payload {
            payload: PhasePayload::Videos { videos },
        }
    }

    /// Create a film payload chunk.
    pub fn film(film: Film) -> Self {
        PhaseChunk::Payload {
            payload: PhasePayload::Film { film },
        }
    }

    /// Create an error chunk.
    pub fn error(message: impl Into<String>) -> Self {
        PhaseChunk::Error {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Whether this chunk ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PhaseChunk::Done | PhaseChunk::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationJobId;

    #[test]
    fn test_videos_payload_wire_shape() {
        let chunk = PhaseChunk::videos(vec![Video::with_job(
            0,
            GenerationJobId::from_string("cgt-1"),
        )]);
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["type"], "payload");
        assert_eq!(json["videos"][0]["index"], 0);
        assert_eq!(json["videos"][0]["jobId"], "cgt-1");
    }

    #[test]
    fn test_film_payload_wire_shape() {
        let chunk = PhaseChunk::film(Film {
            url: "https://store/film.mp4?sig=x".into(),
        });
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["film"]["url"], "https://store/film.mp4?sig=x");
    }

    #[test]
    fn test_terminality() {
        assert!(PhaseChunk::Done.is_terminal());
        assert!(PhaseChunk::error("boom").is_terminal());
        assert!(!PhaseChunk::phase(Phase::Video).is_terminal());
    }
}

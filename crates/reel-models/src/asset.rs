//! Downloadable assets and the finished film.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::generation::GenerationJobId;

/// A generated video clip for one storyboard scene.
///
/// Created with a job id only, mutated in place once the bytes have
/// been downloaded, consumed by the assembler and then discarded.
/// A missing `job_id` is the fail-soft sentinel: creating the
/// generation job for this index failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Video {
    /// Storyboard index
    pub index: usize,
    /// Remote generation job id, absent when creation failed
    #[serde(rename = "jobId", skip_serializing_if = "Option::is_none", default)]
    pub job_id: Option<GenerationJobId>,
    /// Raw clip bytes, populated by exactly one downloader task
    #[serde(skip)]
    pub data: Option<Vec<u8>>,
}

impl Video {
    /// Create a handle for a freshly created generation job.
    pub fn with_job(index: usize, job_id: GenerationJobId) -> Self {
        Self {
            index,
            job_id: Some(job_id),
            data: None,
        }
    }

    /// Create the fail-soft sentinel for a creation failure.
    pub fn creation_failed(index: usize) -> Self {
        Self {
            index,
            job_id: None,
            data: None,
        }
    }

    /// Whether the downloaded bytes are present.
    pub fn is_downloaded(&self) -> bool {
        self.data.is_some()
    }
}

/// A narration audio asset for one storyboard scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Audio {
    /// Storyboard index
    pub index: usize,
    /// Remote locator of the audio payload
    pub url: String,
    /// Raw audio bytes, populated by exactly one downloader task
    #[serde(skip)]
    pub data: Option<Vec<u8>>,
}

impl Audio {
    pub fn new(index: usize, url: impl Into<String>) -> Self {
        Self {
            index,
            url: url.into(),
            data: None,
        }
    }

    /// Whether the downloaded bytes are present.
    pub fn is_downloaded(&self) -> bool {
        self.data.is_some()
    }
}

/// The finished composite film.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Film {
    /// Time-limited signed URL of the persisted artifact
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_wire_shape() {
        let video = Video::with_job(3, GenerationJobId::from_string("cgt-abc"));
        let json = serde_json::to_value(&video).unwrap();
        assert_eq!(json["index"], 3);
        assert_eq!(json["jobId"], "cgt-abc");
        // Raw bytes never hit the wire
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_creation_failure_sentinel_omits_job_id() {
        let video = Video::creation_failed(1);
        let json = serde_json::to_value(&video).unwrap();
        assert!(json.get("jobId").is_none());
    }

    #[test]
    fn test_video_roundtrip_without_job_id() {
        let parsed: Video = serde_json::from_str(r#"{"index": 4}"#).unwrap();
        assert_eq!(parsed.index, 4);
        assert!(parsed.job_id.is_none());
        assert!(!parsed.is_downloaded());
    }
}

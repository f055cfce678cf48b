//! Chunked output stream.
//!
//! Phase drivers publish typed chunks over a bounded channel; the
//! consumer (CLI, server handler) renders them however it likes. A
//! dropped consumer surfaces as `StreamClosed`.

use tokio::sync::mpsc;

use reel_models::{Film, Phase, PhaseChunk, Video};

use crate::error::{PipelineError, PipelineResult};

/// Sender half of the phase output stream.
#[derive(Clone)]
pub struct ChunkSender {
    tx: mpsc::Sender<PhaseChunk>,
}

/// Create a chunk channel of the given capacity.
pub fn channel(capacity: usize) -> (ChunkSender, mpsc::Receiver<PhaseChunk>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChunkSender { tx }, rx)
}

impl ChunkSender {
    /// Announce the active phase.
    pub async fn phase(&self, phase: Phase) -> PipelineResult<()> {
        self.send(PhaseChunk::phase(phase)).await
    }

    /// Publish the videos payload.
    pub async fn videos(&self, videos: Vec<Video>) -> PipelineResult<()> {
        self.send(PhaseChunk::videos(videos)).await
    }

    /// Publish the film payload.
    pub async fn film(&self, film: Film) -> PipelineResult<()> {
        self.send(PhaseChunk::film(film)).await
    }

    /// Signal stream completion.
    pub async fn done(&self) -> PipelineResult<()> {
        self.send(PhaseChunk::Done).await
    }

    /// Terminate the stream with an error chunk.
    pub async fn error(&self, message: impl Into<String>) -> PipelineResult<()> {
        self.send(PhaseChunk::error(message)).await
    }

    async fn send(&self, chunk: PhaseChunk) -> PipelineResult<()> {
        self.tx
            .send(chunk)
            .await
            .map_err(|_| PipelineError::StreamClosed)
    }
}

//! Generation-task orchestrator and film phase driver.
//!
//! This crate provides:
//! - Positional reconciliation of storyboard inputs
//! - Pre-flight job readiness polling with a wall-clock budget
//! - Per-asset retrying downloads with exponential backoff
//! - Wait-all and drain-as-completed fan-out
//! - The video and film phase drivers and their chunked output stream

pub mod config;
pub mod download;
pub mod error;
pub mod fanout;
pub mod film_phase;
pub mod poller;
pub mod reconcile;
pub mod request;
pub mod stream;
pub mod video_phase;

pub use config::PipelineConfig;
pub use download::{download_audio, download_video, RetryPolicy};
pub use error::{PipelineError, PipelineResult};
pub use film_phase::{run_film_phase, CompositeRenderer, FilmPhaseRequest, IsolatedRenderer};
pub use poller::{wait_for_ready, PollBudget, PreflightReport};
pub use reconcile::{reconcile, ReconciledScene};
pub use request::PipelineRequest;
pub use stream::{channel, ChunkSender};
pub use video_phase::{run_video_phase, VideoPhaseRequest};

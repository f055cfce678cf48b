//! Deterministic timeline assembly and FFmpeg rendering.
//!
//! This crate provides:
//! - Subtitle segmentation with proportional timing
//! - Pure timeline planning (clip placement, cross-fades)
//! - FFprobe/FFmpeg wrappers
//! - Composite rendering from a serialized manifest
//! - An isolated child-process render worker

pub mod command;
pub mod error;
pub mod probe;
pub mod render;
pub mod subtitle;
pub mod timeline;
pub mod worker;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_duration, probe_video, VideoInfo};
pub use render::{render_film, ManifestScene, RenderManifest, RenderReport};
pub use subtitle::{split_primary, split_secondary, SubtitleSpan};
pub use timeline::{build_plan, ClipSource, ClipSpan, TimelinePlan, FADE_DURATION_SECS};
pub use worker::{render_isolated, worker_entry, RENDER_WORKER_ARG};

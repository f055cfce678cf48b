//! Pipeline configuration.

use std::time::Duration;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum storyboard scenes per run; over-limit requests are rejected
    pub max_storyboards: usize,
    /// Wall-clock budget of the pre-flight readiness wait
    pub preflight_max_wait: Duration,
    /// Interval between pre-flight re-polls
    pub preflight_poll_interval: Duration,
    /// Download attempt ceiling per asset
    pub download_max_attempts: u32,
    /// Initial backoff before re-polling a pending video
    pub video_backoff_base: Duration,
    /// Initial backoff before re-fetching an audio
    pub audio_backoff_base: Duration,
    /// Lifetime of the signed film URL
    pub signed_url_ttl: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_storyboards: 10,
            preflight_max_wait: Duration::from_secs(15),
            preflight_poll_interval: Duration::from_secs(3),
            download_max_attempts: 3,
            video_backoff_base: Duration::from_secs(3),
            audio_backoff_base: Duration::from_secs(2),
            signed_url_ttl: Duration::from_secs(3600),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_storyboards: env_parsed("PIPELINE_MAX_STORYBOARDS", defaults.max_storyboards),
            preflight_max_wait: Duration::from_secs(env_parsed(
                "PIPELINE_PREFLIGHT_MAX_WAIT_SECS",
                defaults.preflight_max_wait.as_secs(),
            )),
            preflight_poll_interval: Duration::from_secs(env_parsed(
                "PIPELINE_PREFLIGHT_POLL_SECS",
                defaults.preflight_poll_interval.as_secs(),
            )),
            download_max_attempts: env_parsed(
                "PIPELINE_DOWNLOAD_MAX_ATTEMPTS",
                defaults.download_max_attempts,
            ),
            video_backoff_base: Duration::from_secs(env_parsed(
                "PIPELINE_VIDEO_BACKOFF_SECS",
                defaults.video_backoff_base.as_secs(),
            )),
            audio_backoff_base: Duration::from_secs(env_parsed(
                "PIPELINE_AUDIO_BACKOFF_SECS",
                defaults.audio_backoff_base.as_secs(),
            )),
            signed_url_ttl: Duration::from_secs(env_parsed(
                "PIPELINE_SIGNED_URL_TTL_SECS",
                defaults.signed_url_ttl.as_secs(),
            )),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

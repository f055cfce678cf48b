//! Film phase: download every asset and assemble the composite.
//!
//! Downloads run as one wait-all fan-out per asset class; a single
//! terminal failure aborts the batch and nothing partial is ever
//! persisted. Rendering happens in the isolated worker; the finished
//! film is uploaded and answered as a signed URL.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use reel_genai::{AssetFetcher, GenerationJobs};
use reel_media::{ManifestScene, MediaResult, RenderManifest, RenderReport};
use reel_models::{Audio, Film, Phase, RunId, Tone, Video};
use reel_storage::{film_key, ObjectStore};

use crate::config::PipelineConfig;
use crate::download::{download_audio, download_video, RetryPolicy};
use crate::error::{PipelineError, PipelineResult};
use crate::fanout::wait_all;
use crate::poller::{wait_for_ready, PollBudget};
use crate::stream::ChunkSender;

/// Inbound payload of the film phase.
#[derive(Debug, Clone, Deserialize)]
pub struct FilmPhaseRequest {
    /// Run id, also the storage prefix of the finished film
    #[serde(default)]
    pub run_id: RunId,
    pub tones: Vec<Tone>,
    pub videos: Vec<Video>,
    pub audios: Vec<Audio>,
}

/// Seam over the isolated render step.
#[async_trait]
pub trait CompositeRenderer: Send + Sync {
    async fn render(&self, manifest: &RenderManifest) -> MediaResult<RenderReport>;
}

/// Production renderer: a throwaway child process per run.
pub struct IsolatedRenderer;

#[async_trait]
impl CompositeRenderer for IsolatedRenderer {
    async fn render(&self, manifest: &RenderManifest) -> MediaResult<RenderReport> {
        reel_media::render_isolated(manifest).await
    }
}

/// Drive the film phase, returning the signed film URL.
pub async fn run_film_phase(
    jobs: &dyn GenerationJobs,
    fetcher: &dyn AssetFetcher,
    store: &dyn ObjectStore,
    renderer: &dyn CompositeRenderer,
    config: &PipelineConfig,
    mut request: FilmPhaseRequest,
    chunks: &ChunkSender,
) -> PipelineResult<Film> {
    validate(&mut request, config)?;

    // Latency optimization only; leftovers go to the retrying downloader
    let report = wait_for_ready(
        jobs,
        &request.videos,
        PollBudget {
            max_wait: config.preflight_max_wait,
            poll_interval: config.preflight_poll_interval,
        },
    )
    .await;
    info!(
        ready = report.ready.len(),
        pending = report.pending.len(),
        "Pre-flight readiness check finished"
    );

    chunks.phase(Phase::Film).await?;

    let video_policy = RetryPolicy::new(config.download_max_attempts, config.video_backoff_base);
    let audio_policy = RetryPolicy::new(config.download_max_attempts, config.audio_backoff_base);

    let video_downloads = wait_all(
        request
            .videos
            .iter_mut()
            .map(|v| download_video(jobs, fetcher, v, video_policy)),
    );
    let audio_downloads = wait_all(
        request
            .audios
            .iter_mut()
            .map(|a| download_audio(fetcher, a, audio_policy)),
    );
    futures::future::try_join(video_downloads, audio_downloads).await?;

    // Scoped working directory, removed whatever happens below
    let work_dir = tempfile::tempdir()?;
    let manifest = stage_assets(&request, work_dir.path()).await?;

    let report = renderer.render(&manifest).await?;
    info!(
        clips = report.clip_count,
        duration_secs = report.total_duration,
        "Composite rendered"
    );

    let bytes = tokio::fs::read(&report.output_path).await?;
    let key = film_key(&request.run_id);
    store.put_bytes(&key, bytes, "video/mp4").await?;
    let url = store.presign_get(&key, config.signed_url_ttl).await?;

    let film = Film { url };
    chunks.film(film.clone()).await?;
    chunks.done().await?;

    Ok(film)
}

/// Reject malformed requests before any remote work starts.
fn validate(request: &mut FilmPhaseRequest, config: &PipelineConfig) -> PipelineResult<()> {
    if request.tones.is_empty() {
        return Err(PipelineError::invalid_input("tones not found"));
    }
    if request.videos.is_empty() {
        return Err(PipelineError::invalid_input("videos not found"));
    }
    if request.audios.is_empty() {
        return Err(PipelineError::invalid_input("audios not found"));
    }
    if request.tones.len() != request.videos.len() || request.tones.len() != request.audios.len() {
        return Err(PipelineError::invalid_input(
            "tone, video and audio counts do not match",
        ));
    }
    if request.tones.len() > config.max_storyboards {
        return Err(PipelineError::invalid_input(format!(
            "storyboard count exceeds limit of {}",
            config.max_storyboards
        )));
    }

    request.tones.sort_by_key(|t| t.index);
    request.videos.sort_by_key(|v| v.index);
    request.audios.sort_by_key(|a| a.index);

    for slot in 0..request.tones.len() {
        if request.tones[slot].index != slot
            || request.videos[slot].index != slot
            || request.audios[slot].index != slot
        {
            return Err(PipelineError::invalid_input(format!(
                "storyboard indices are not contiguous at slot {}",
                slot
            )));
        }
        if request.videos[slot].job_id.is_none() {
            return Err(PipelineError::invalid_input(format!(
                "video {} has no generation job",
                slot
            )));
        }
    }

    Ok(())
}

/// Write every downloaded asset into the scoped work dir and build the
/// render manifest.
async fn stage_assets(
    request: &FilmPhaseRequest,
    work_dir: &std::path::Path,
) -> PipelineResult<RenderManifest> {
    let mut scenes = Vec::with_capacity(request.tones.len());

    for (slot, tone) in request.tones.iter().enumerate() {
        let video = &request.videos[slot];
        let audio = &request.audios[slot];

        let video_bytes = video.data.as_ref().ok_or_else(|| {
            PipelineError::Internal(format!("video {} has no downloaded bytes", slot))
        })?;
        let audio_bytes = audio.data.as_ref().ok_or_else(|| {
            PipelineError::Internal(format!("audio {} has no downloaded bytes", slot))
        })?;

        let video_path = work_dir.join(format!("video_{}.mp4", slot));
        let audio_path = work_dir.join(format!("audio_{}.mp3", slot));
        tokio::fs::write(&video_path, video_bytes).await?;
        tokio::fs::write(&audio_path, audio_bytes).await?;

        scenes.push(ManifestScene {
            index: slot,
            tone: tone.clone(),
            video_path,
            audio_path,
        });
    }

    Ok(RenderManifest {
        scenes,
        output_path: work_dir.join("film.mp4"),
        work_dir: work_dir.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::GenerationJobId;

    fn request(n: usize) -> FilmPhaseRequest {
        FilmPhaseRequest {
            run_id: RunId::from_string("run-test"),
            tones: (0..n)
                .map(|i| Tone {
                    index: i,
                    line: format!("场景{}", i),
                    line_en: format!("scene {}", i),
                })
                .collect(),
            videos: (0..n)
                .map(|i| Video::with_job(i, GenerationJobId::from_string(format!("cgt-{}", i))))
                .collect(),
            audios: (0..n)
                .map(|i| Audio::new(i, format!("https://cdn/audio_{}.mp3", i)))
                .collect(),
        }
    }

    #[test]
    fn test_validate_accepts_unsorted_contiguous_indices() {
        let mut req = request(3);
        req.videos.reverse();
        req.audios.rotate_left(1);

        validate(&mut req, &PipelineConfig::default()).unwrap();

        // Sorted back into slot order
        assert_eq!(req.videos[0].index, 0);
        assert_eq!(req.audios[2].index, 2);
    }

    #[test]
    fn test_validate_rejects_count_mismatch() {
        let mut req = request(3);
        req.audios.pop();
        let err = validate(&mut req, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_gap_in_indices() {
        let mut req = request(3);
        req.tones[2].index = 5;
        let err = validate(&mut req, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_sentinel_video() {
        let mut req = request(2);
        req.videos[1] = Video::creation_failed(1);
        let err = validate(&mut req, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_over_limit() {
        let mut req = request(11);
        let err = validate(&mut req, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_stage_assets_writes_per_slot_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(2);
        for v in &mut req.videos {
            v.data = Some(b"VID".to_vec());
        }
        for a in &mut req.audios {
            a.data = Some(b"AUD".to_vec());
        }

        let manifest = stage_assets(&req, dir.path()).await.unwrap();

        assert_eq!(manifest.scenes.len(), 2);
        assert!(manifest.scenes[0].video_path.ends_with("video_0.mp4"));
        assert!(manifest.scenes[1].audio_path.ends_with("audio_1.mp3"));
        assert_eq!(
            tokio::fs::read(&manifest.scenes[0].video_path).await.unwrap(),
            b"VID"
        );
        assert!(manifest.output_path.ends_with("film.mp4"));
    }

    #[tokio::test]
    async fn test_stage_assets_requires_downloaded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(1);

        let err = stage_assets(&req, dir.path()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Internal(_)));
    }
}

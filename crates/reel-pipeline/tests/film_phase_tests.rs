//! End-to-end film phase tests with in-memory collaborators.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use reel_genai::{AssetFetcher, GenAiResult, GenerationJobs, JobPoll};
use reel_media::{MediaError, MediaResult, RenderManifest, RenderReport};
use reel_models::{Audio, GenerationJobId, GenerationStatus, PhaseChunk, RunId, Tone, Video};
use reel_pipeline::{
    channel, run_film_phase, CompositeRenderer, FilmPhaseRequest, PipelineConfig, PipelineError,
};
use reel_storage::{ObjectStore, StorageResult};

/// Jobs double: every job succeeded except an optional failing index.
struct StubJobs {
    failed_job: Option<String>,
}

#[async_trait]
impl GenerationJobs for StubJobs {
    async fn create(&self, _prompt: &str, _image_ref: &str) -> GenAiResult<GenerationJobId> {
        unreachable!("film phase never creates jobs")
    }

    async fn poll(&self, job_id: &GenerationJobId) -> GenAiResult<JobPoll> {
        if self.failed_job.as_deref() == Some(job_id.as_str()) {
            return Ok(JobPoll {
                status: GenerationStatus::Failed,
                video_url: None,
            });
        }
        Ok(JobPoll {
            status: GenerationStatus::Succeeded,
            video_url: Some(format!("https://cdn/{}.mp4", job_id)),
        })
    }
}

/// Fetcher double: bytes derived from the locator.
struct StubFetcher;

#[async_trait]
impl AssetFetcher for StubFetcher {
    async fn fetch(&self, locator: &str) -> GenAiResult<Vec<u8>> {
        Ok(format!("bytes:{}", locator).into_bytes())
    }
}

/// Store double recording every upload.
#[derive(Default)]
struct RecordingStore {
    puts: Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put_bytes(&self, key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<()> {
        self.puts.lock().unwrap().push((key.to_string(), data.len()));
        Ok(())
    }

    async fn presign_get(&self, key: &str, _expires_in: Duration) -> StorageResult<String> {
        Ok(format!("https://signed/{}", key))
    }
}

/// Renderer double that materializes a fake film.
struct StubRenderer {
    called: AtomicBool,
}

impl StubRenderer {
    fn new() -> Self {
        Self {
            called: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl CompositeRenderer for StubRenderer {
    async fn render(&self, manifest: &RenderManifest) -> MediaResult<RenderReport> {
        self.called.store(true, Ordering::SeqCst);
        std::fs::write(&manifest.output_path, b"FILMBYTES")?;
        Ok(RenderReport {
            output_path: manifest.output_path.clone(),
            total_duration: 11.0,
            clip_count: manifest.scenes.len(),
        })
    }
}

/// Renderer double where every clip fails to load.
struct NoClipsRenderer;

#[async_trait]
impl CompositeRenderer for NoClipsRenderer {
    async fn render(&self, _manifest: &RenderManifest) -> MediaResult<RenderReport> {
        Err(MediaError::NoValidClips)
    }
}

fn test_config() -> PipelineConfig {
    PipelineConfig {
        // Skip the pre-flight wait so failure cases return immediately
        preflight_max_wait: Duration::ZERO,
        ..PipelineConfig::default()
    }
}

fn request(n: usize) -> FilmPhaseRequest {
    FilmPhaseRequest {
        run_id: RunId::from_string("run-test"),
        tones: (0..n)
            .map(|i| Tone {
                index: i,
                line: format!("第{}场", i),
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

#[tokio::test]
async fn test_film_phase_persists_and_signs_the_composite() {
    let jobs = StubJobs { failed_job: None };
    let store = RecordingStore::default();
    let renderer = StubRenderer::new();
    let (sender, mut rx) = channel(32);

    let film = run_film_phase(
        &jobs,
        &StubFetcher,
        &store,
        &renderer,
        &test_config(),
        request(3),
        &sender,
    )
    .await
    .unwrap();

    assert_eq!(film.url, "https://signed/run-test/film.mp4");
    assert!(renderer.called.load(Ordering::SeqCst));

    let puts = store.puts.lock().unwrap();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0], ("run-test/film.mp4".to_string(), b"FILMBYTES".len()));
    drop(puts);

    // Stream order: phase announcement, film payload, completion
    assert!(matches!(rx.recv().await, Some(PhaseChunk::Phase { .. })));
    match rx.recv().await {
        Some(PhaseChunk::Payload { .. }) => {}
        other => panic!("expected film payload, got {:?}", other),
    }
    assert!(matches!(rx.recv().await, Some(PhaseChunk::Done)));
}

#[tokio::test]
async fn test_no_valid_clips_persists_nothing() {
    let jobs = StubJobs { failed_job: None };
    let store = RecordingStore::default();
    let (sender, _rx) = channel(32);

    let err = run_film_phase(
        &jobs,
        &StubFetcher,
        &store,
        &NoClipsRenderer,
        &test_config(),
        request(2),
        &sender,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Media(MediaError::NoValidClips)
    ));
    assert!(store.puts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_generation_failure_aborts_the_download_batch() {
    let jobs = StubJobs {
        failed_job: Some("cgt-1".to_string()),
    };
    let store = RecordingStore::default();
    let renderer = StubRenderer::new();
    let (sender, _rx) = channel(32);

    let err = run_film_phase(
        &jobs,
        &StubFetcher,
        &store,
        &renderer,
        &test_config(),
        request(3),
        &sender,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::GenerationFailed { index: 1 }));
    assert!(!renderer.called.load(Ordering::SeqCst));
    assert!(store.puts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_audio_locator_fails_the_batch_fast() {
    let jobs = StubJobs { failed_job: None };
    let store = RecordingStore::default();
    let renderer = StubRenderer::new();
    let (sender, _rx) = channel(32);

    let mut req = request(2);
    req.audios[1] = Audio::new(1, "not-a-url");

    let err = run_film_phase(
        &jobs,
        &StubFetcher,
        &store,
        &renderer,
        &test_config(),
        req,
        &sender,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::InvalidAsset { index: 1, .. }));
    assert!(!renderer.called.load(Ordering::SeqCst));
    assert!(store.puts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_sentinel_video_rejected_before_any_download() {
    let jobs = StubJobs { failed_job: None };
    let store = RecordingStore::default();
    let renderer = StubRenderer::new();
    let (sender, mut rx) = channel(32);

    let mut req = request(2);
    req.videos[0] = Video::creation_failed(0);

    let err = run_film_phase(
        &jobs,
        &StubFetcher,
        &store,
        &renderer,
        &test_config(),
        req,
        &sender,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::InvalidInput(_)));
    // Rejected before the phase chunk was even announced
    assert!(rx.try_recv().is_err());
}

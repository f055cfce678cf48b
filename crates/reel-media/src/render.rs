//! Composite film rendering.
//!
//! Consumes a render manifest (per-scene tone + asset paths), probes
//! the assets, plans the timeline and runs one FFmpeg invocation that
//! cross-fades the clips, mixes the trimmed audio and burns both
//! subtitle tracks.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use reel_models::Tone;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_duration, probe_video};
use crate::subtitle::render_srt;
use crate::timeline::{build_plan, ClipSource, TimelinePlan, FADE_DURATION_SECS};

/// One scene's entry in the render manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestScene {
    /// Storyboard index
    pub index: usize,
    /// Narration for both subtitle tracks
    pub tone: Tone,
    /// Downloaded video clip on disk
    pub video_path: PathBuf,
    /// Downloaded audio on disk
    pub audio_path: PathBuf,
}

/// Instructions handed to the render step.
///
/// All referenced paths live inside one scoped working directory that
/// the orchestrator removes after the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderManifest {
    /// Index-sorted scenes
    pub scenes: Vec<ManifestScene>,
    /// Where the composite is written
    pub output_path: PathBuf,
    /// Directory for generated subtitle files
    pub work_dir: PathBuf,
}

/// Result of a successful render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderReport {
    /// Path of the finished composite
    pub output_path: PathBuf,
    /// Final composite duration, seconds
    pub total_duration: f64,
    /// Number of clips that made it into the composite
    pub clip_count: usize,
}

/// A scene that survived probing, renumbered to its timeline slot.
struct LoadedScene {
    tone: Tone,
    source: ClipSource,
    video_path: PathBuf,
    audio_path: PathBuf,
}

/// Render the composite film described by the manifest.
pub async fn render_film(manifest: &RenderManifest) -> MediaResult<RenderReport> {
    let loaded = load_scenes(&manifest.scenes).await;
    if loaded.is_empty() {
        return Err(MediaError::NoValidClips);
    }

    let tones: Vec<Tone> = loaded.iter().map(|s| s.tone.clone()).collect();
    let sources: Vec<ClipSource> = loaded.iter().map(|s| s.source.clone()).collect();
    let plan = build_plan(&tones, &sources)?;

    let primary_srt = write_srt_track(&manifest.work_dir, "primary.srt", &plan.primary_subtitles)?;
    let secondary_srt =
        write_srt_track(&manifest.work_dir, "secondary.srt", &plan.secondary_subtitles)?;

    let mut cmd = FfmpegCommand::new(&manifest.output_path);
    for scene in &loaded {
        cmd.input(&scene.video_path);
    }
    for scene in &loaded {
        cmd.input(&scene.audio_path);
    }

    let (graph, video_label, audio_label) = composite_filter(
        &plan,
        primary_srt.as_deref(),
        secondary_srt.as_deref(),
    );

    cmd.filter_complex(graph)
        .map(format!("[{}]", video_label))
        .map(format!("[{}]", audio_label))
        .video_codec("libx264")
        .audio_codec("aac")
        .output_args(["-movflags", "+faststart"])
        .run()
        .await?;

    info!(
        clips = loaded.len(),
        duration_secs = plan.total_duration,
        "Rendered composite film"
    );

    Ok(RenderReport {
        output_path: manifest.output_path.clone(),
        total_duration: plan.total_duration,
        clip_count: loaded.len(),
    })
}

/// Probe every scene's assets; scenes that fail to load are skipped and
/// the survivors renumbered to contiguous timeline slots.
async fn load_scenes(scenes: &[ManifestScene]) -> Vec<LoadedScene> {
    let mut loaded = Vec::with_capacity(scenes.len());

    for scene in scenes {
        let video = match probe_video(&scene.video_path).await {
            Ok(info) => info,
            Err(e) => {
                warn!(index = scene.index, error = %e, "Skipping clip, video failed to load");
                continue;
            }
        };
        let audio_duration = match probe_duration(&scene.audio_path).await {
            Ok(d) => d,
            Err(e) => {
                warn!(index = scene.index, error = %e, "Skipping clip, audio failed to load");
                continue;
            }
        };

        let slot = loaded.len();
        let mut tone = scene.tone.clone();
        tone.index = slot;
        loaded.push(LoadedScene {
            tone,
            source: ClipSource {
                index: slot,
                video_duration: video.duration,
                audio_duration,
            },
            video_path: scene.video_path.clone(),
            audio_path: scene.audio_path.clone(),
        });
    }

    loaded
}

/// Write one subtitle track as SRT, if it has any spans.
fn write_srt_track(
    work_dir: &Path,
    file_name: &str,
    spans: &[crate::subtitle::SubtitleSpan],
) -> MediaResult<Option<PathBuf>> {
    if spans.is_empty() {
        return Ok(None);
    }
    let path = work_dir.join(file_name);
    std::fs::write(&path, render_srt(spans))?;
    Ok(Some(path))
}

/// Build the filter graph for the planned composite.
///
/// Video inputs occupy `0..n`, audio inputs `n..2n`. Adjacent clips are
/// joined with `xfade` at the plan's fade-adjusted offsets, which
/// realizes both the fade-out of clip `i` and the fade-in of clip
/// `i+1`. Audio is trimmed (never extended) to the video, padded with
/// silence where shorter, and joined with `acrossfade` to keep the
/// same overlap.
fn composite_filter(
    plan: &TimelinePlan,
    primary_srt: Option<&Path>,
    secondary_srt: Option<&Path>,
) -> (String, String, String) {
    let n = plan.clips.len();
    let mut parts = Vec::new();

    // Per-clip audio conditioning
    for (i, clip) in plan.clips.iter().enumerate() {
        let vdur = clip.video_duration();
        parts.push(format!(
            "[{}:a]atrim=0:{:.3},apad=whole_dur={:.3}[a{}]",
            n + i,
            clip.audio_duration,
            vdur,
            i
        ));
    }

    // Video cross-fades
    let mut video_label = "0:v".to_string();
    for i in 1..n {
        let merged = format!("vx{}", i);
        parts.push(format!(
            "[{}][{}:v]xfade=transition=fade:duration={}:offset={:.3}[{}]",
            video_label,
            i,
            FADE_DURATION_SECS,
            plan.clips[i].start,
            merged
        ));
        video_label = merged;
    }

    // Audio cross-fades
    let mut audio_label = "a0".to_string();
    for i in 1..n {
        let merged = format!("ax{}", i);
        parts.push(format!(
            "[{}][a{}]acrossfade=d={}[{}]",
            audio_label, i, FADE_DURATION_SECS, merged
        ));
        audio_label = merged;
    }

    // Single-clip runs still need a named video label to map
    if n == 1 {
        parts.push(format!("[{}]null[vx0]", video_label));
        video_label = "vx0".to_string();
    }

    // Burn subtitle tracks onto the merged video
    for (srt, label, margin) in [
        (primary_srt, "vsp", 60),
        (secondary_srt, "vss", 30),
    ] {
        if let Some(path) = srt {
            parts.push(format!(
                "[{}]subtitles={}:force_style='FontSize=24,Alignment=2,MarginV={}'[{}]",
                video_label,
                path.display(),
                margin,
                label
            ));
            video_label = label.to_string();
        }
    }

    (parts.join(";"), video_label, audio_label)
}

//! Deterministic timeline planning.
//!
//! Computes where every clip sits on the composite timeline and when
//! every subtitle segment is shown, before any FFmpeg invocation. The
//! plan is pure arithmetic over probed durations so it can be tested
//! without media files.

use serde::{Deserialize, Serialize};

use reel_models::Tone;

use crate::error::{MediaError, MediaResult};
use crate::subtitle::{split_line_over_window, split_primary, split_secondary, SubtitleSpan};

/// Cross-fade duration applied between adjacent clips, seconds.
pub const FADE_DURATION_SECS: f64 = 0.5;

/// Probed durations for one scene's assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSource {
    /// Storyboard index
    pub index: usize,
    /// Probed video duration, seconds
    pub video_duration: f64,
    /// Probed audio duration, seconds
    pub audio_duration: f64,
}

/// One clip's placement on the composite timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSpan {
    /// Storyboard index
    pub index: usize,
    /// On-timeline start, seconds
    pub start: f64,
    /// Pre-fade end (`start + video_duration`), seconds
    pub end: f64,
    /// Audio playback length, trimmed to the video if longer
    pub audio_duration: f64,
    /// Whether a fade-in is applied (every clip but the first)
    pub fade_in: bool,
    /// Whether a fade-out is applied (every clip but the last)
    pub fade_out: bool,
}

impl ClipSpan {
    /// Video playback length of this clip.
    pub fn video_duration(&self) -> f64 {
        self.end - self.start
    }

    /// End after fade adjustment; the next clip starts here, overlapping
    /// this one by the fade duration.
    pub fn effective_end(&self) -> f64 {
        if self.fade_out {
            self.end - FADE_DURATION_SECS
        } else {
            self.end
        }
    }
}

/// The composite timeline: clip placements plus both subtitle tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePlan {
    pub clips: Vec<ClipSpan>,
    pub primary_subtitles: Vec<SubtitleSpan>,
    pub secondary_subtitles: Vec<SubtitleSpan>,
    /// Final composite duration, seconds
    pub total_duration: f64,
}

/// Build the composite plan from index-sorted (tone, durations) pairs.
///
/// Inputs must already be reconciled: one tone per source, matching
/// indices. Violations are rejected, never repaired here.
pub fn build_plan(tones: &[Tone], sources: &[ClipSource]) -> MediaResult<TimelinePlan> {
    if sources.is_empty() {
        return Err(MediaError::NoValidClips);
    }
    if tones.len() != sources.len() {
        return Err(MediaError::mismatched_inputs(format!(
            "{} tones vs {} clips",
            tones.len(),
            sources.len()
        )));
    }
    for (slot, (tone, source)) in tones.iter().zip(sources).enumerate() {
        if tone.index != slot || source.index != slot {
            return Err(MediaError::mismatched_inputs(format!(
                "slot {} carries tone index {} and clip index {}",
                slot, tone.index, source.index
            )));
        }
    }

    let count = sources.len();
    let mut clips = Vec::with_capacity(count);
    let mut primary_subtitles = Vec::new();
    let mut secondary_subtitles = Vec::new();
    let mut clip_start = 0.0f64;

    for (i, (tone, source)) in tones.iter().zip(sources).enumerate() {
        let clip_end = clip_start + source.video_duration;

        // Subtitles span the pre-fade window
        if !tone.line.is_empty() {
            primary_subtitles.extend(split_line_over_window(
                &tone.line,
                clip_start,
                clip_end,
                split_primary,
            ));
        }
        if !tone.line_en.is_empty() {
            secondary_subtitles.extend(split_line_over_window(
                &tone.line_en,
                clip_start,
                clip_end,
                split_secondary,
            ));
        }

        let span = ClipSpan {
            index: source.index,
            start: clip_start,
            end: clip_end,
            // Trim the audio to the video, never extend it
            audio_duration: source.audio_duration.min(source.video_duration),
            fade_in: i != 0,
            fade_out: i != count - 1,
        };
        clip_start = span.effective_end();
        clips.push(span);
    }

    let total_duration = clips.last().map(|c| c.effective_end()).unwrap_or(0.0);

    Ok(TimelinePlan {
        clips,
        primary_subtitles,
        secondary_subtitles,
        total_duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(index: usize, line: &str, line_en: &str) -> Tone {
        Tone {
            index,
            line: line.to_string(),
            line_en: line_en.to_string(),
        }
    }

    fn source(index: usize, video: f64, audio: f64) -> ClipSource {
        ClipSource {
            index,
            video_duration: video,
            audio_duration: audio,
        }
    }

    #[test]
    fn test_three_clip_arithmetic() {
        let tones = vec![tone(0, "", ""), tone(1, "", ""), tone(2, "", "")];
        let sources = vec![source(0, 4.0, 4.0), source(1, 5.0, 5.0), source(2, 3.0, 3.0)];

        let plan = build_plan(&tones, &sources).unwrap();

        // Total 4 + 5 + 3 - 2 * 0.5
        assert!((plan.total_duration - 11.0).abs() < 1e-9);

        // Clip 2's pre-fade start overlaps clip 1 by the fade duration
        assert!((plan.clips[1].start - 3.5).abs() < 1e-9);
        assert!((plan.clips[1].end - 8.5).abs() < 1e-9);
        assert!((plan.clips[2].start - 8.0).abs() < 1e-9);

        // Fades: none in on the first, none out on the last
        assert!(!plan.clips[0].fade_in);
        assert!(plan.clips[0].fade_out);
        assert!(plan.clips[2].fade_in);
        assert!(!plan.clips[2].fade_out);
    }

    #[test]
    fn test_single_clip_has_no_fades() {
        let plan = build_plan(&[tone(0, "", "")], &[source(0, 6.0, 6.0)]).unwrap();
        assert_eq!(plan.clips.len(), 1);
        assert!(!plan.clips[0].fade_in);
        assert!(!plan.clips[0].fade_out);
        assert!((plan.total_duration - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_audio_trimmed_never_extended() {
        let plan = build_plan(
            &[tone(0, "", ""), tone(1, "", "")],
            &[source(0, 4.0, 9.0), source(1, 4.0, 2.0)],
        )
        .unwrap();
        // Longer audio is cut to the video
        assert!((plan.clips[0].audio_duration - 4.0).abs() < 1e-9);
        // Shorter audio is left alone
        assert!((plan.clips[1].audio_duration - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_subtitles_use_pre_fade_window() {
        let line = "a".repeat(10);
        let tones = vec![tone(0, &line, ""), tone(1, &line, "")];
        let sources = vec![source(0, 4.0, 4.0), source(1, 4.0, 4.0)];

        let plan = build_plan(&tones, &sources).unwrap();

        // Clip 0's subtitles run to its pre-fade end, not its effective end
        assert!((plan.primary_subtitles[0].start - 0.0).abs() < 1e-9);
        assert!((plan.primary_subtitles[0].end - 4.0).abs() < 1e-9);
        // Clip 1's subtitles start at its fade-adjusted start
        assert!((plan.primary_subtitles[1].start - 3.5).abs() < 1e-9);
        assert!((plan.primary_subtitles[1].end - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_sources_rejected() {
        let err = build_plan(&[], &[]).unwrap_err();
        assert!(matches!(err, MediaError::NoValidClips));
    }

    #[test]
    fn test_cardinality_mismatch_rejected() {
        let err = build_plan(&[tone(0, "", "")], &[source(0, 1.0, 1.0), source(1, 1.0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, MediaError::MismatchedInputs(_)));
    }

    #[test]
    fn test_non_contiguous_indices_rejected() {
        let err = build_plan(
            &[tone(0, "", ""), tone(2, "", "")],
            &[source(0, 1.0, 1.0), source(2, 1.0, 1.0)],
        )
        .unwrap_err();
        assert!(matches!(err, MediaError::MismatchedInputs(_)));
    }
}

use crate::assets::resolver::{ImageSource, ResolvedLine, SpeechAsset};
use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::Fnv1a64;

/// Layout parameters for [`build_timeline`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineSettings {
    /// Shortest on-screen time per line, in seconds.
    pub min_segment_duration: f64,
    /// Pause inserted between consecutive lines, in seconds.
    pub transition_gap: f64,
    /// Prefix subtitles with the speaker's display name.
    pub show_speaker_name: bool,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            min_segment_duration: 1.0,
            transition_gap: 0.0,
            show_speaker_name: false,
        }
    }
}

impl TimelineSettings {
    /// Reject negative or non-finite durations.
    pub fn validate(&self) -> ReelResult<()> {
        if !self.min_segment_duration.is_finite() || self.min_segment_duration < 0.0 {
            return Err(ReelError::validation(
                "min_segment_duration must be finite and >= 0",
            ));
        }
        if !self.transition_gap.is_finite() || self.transition_gap < 0.0 {
            return Err(ReelError::validation(
                "transition_gap must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// One line's slot on the timeline, `[start_time, end_time)` in seconds.
#[derive(Clone, Debug, serde::Serialize)]
pub struct TimelineSegment {
    /// 0-based script line index.
    pub index: usize,
    /// Start of the slot.
    pub start_time: f64,
    /// End of the slot (exclusive).
    pub end_time: f64,
    /// Speaker identifier.
    pub speaker_id: String,
    /// Subtitle shown during the slot.
    pub subtitle: String,
    /// Effective scene id.
    pub scene: Option<String>,
    /// Background for the slot.
    pub image: ImageSource,
    /// Speech clip placed at `start_time`.
    pub speech: SpeechAsset,
}

impl TimelineSegment {
    /// Slot length in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Where a point in time falls on the timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimelinePosition {
    /// Inside segment `i`.
    Segment(usize),
    /// In the gap between two segments; `progress` runs from 0 to 1 across the gap.
    Gap {
        /// Outgoing segment.
        from: usize,
        /// Incoming segment.
        to: usize,
        /// Normalized position inside the gap.
        progress: f64,
    },
    /// At or after `total_duration`.
    End,
}

/// Immutable schedule shared by the mixer and the compositor.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Timeline {
    /// Total length, equal to the last segment's end.
    pub total_duration: f64,
    /// Gap between consecutive segments.
    pub transition_gap: f64,
    /// Segments in script order.
    pub segments: Vec<TimelineSegment>,
}

/// Lay out resolved lines back to back in script order.
///
/// Each segment lasts `max(speech duration, min_segment_duration)`; consecutive segments are
/// separated by `transition_gap` and the timeline ends at the last segment's end.
#[tracing::instrument(level = "info", skip_all, fields(lines = lines.len()))]
pub fn build_timeline(lines: &[ResolvedLine], settings: TimelineSettings) -> ReelResult<Timeline> {
    settings.validate()?;
    if lines.is_empty() {
        return Err(ReelError::EmptyScript);
    }

    let mut cursor = 0.0f64;
    let mut segments = Vec::with_capacity(lines.len());
    for resolved in lines {
        let duration = resolved
            .speech
            .duration_secs
            .max(settings.min_segment_duration);
        let start_time = cursor;
        let end_time = start_time + duration;
        segments.push(TimelineSegment {
            index: resolved.index,
            start_time,
            end_time,
            speaker_id: resolved.line.speaker_id.clone(),
            subtitle: resolved.line.subtitle_text(settings.show_speaker_name),
            scene: resolved.image.scene.clone(),
            image: resolved.image.source.clone(),
            speech: resolved.speech.clone(),
        });
        cursor = end_time + settings.transition_gap;
    }

    let total_duration = segments.last().map_or(0.0, |s| s.end_time);
    tracing::info!(
        segments = segments.len(),
        total_duration,
        "timeline built"
    );
    Ok(Timeline {
        total_duration,
        transition_gap: settings.transition_gap,
        segments,
    })
}

impl Timeline {
    /// Locate `t` (seconds). Times before zero map to the first segment.
    pub fn locate(&self, t: f64) -> TimelinePosition {
        if self.segments.is_empty() || t >= self.total_duration {
            return TimelinePosition::End;
        }
        let after = self.segments.partition_point(|s| s.start_time <= t);
        if after == 0 {
            return TimelinePosition::Segment(0);
        }
        let i = after - 1;
        let seg = &self.segments[i];
        if t < seg.end_time || after == self.segments.len() {
            return TimelinePosition::Segment(i);
        }

        let gap = self.segments[after].start_time - seg.end_time;
        let progress = if gap > 0.0 {
            ((t - seg.end_time) / gap).clamp(0.0, 1.0)
        } else {
            1.0
        };
        TimelinePosition::Gap {
            from: i,
            to: after,
            progress,
        }
    }

    /// Number of video frames needed to cover the timeline at `fps`, at least one.
    pub fn frame_count(&self, fps: Fps) -> u64 {
        fps.secs_to_frames_round(self.total_duration).max(1)
    }

    /// Stable hash of every segment boundary and its bound assets.
    ///
    /// Identical inputs always produce identical fingerprints.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_u64(self.segments.len() as u64);
        h.write_f64(self.total_duration);
        h.write_f64(self.transition_gap);
        for seg in &self.segments {
            h.write_u64(seg.index as u64);
            h.write_f64(seg.start_time);
            h.write_f64(seg.end_time);
            h.write_str(&seg.subtitle);
            match &seg.scene {
                Some(scene) => {
                    h.write_u8(1);
                    h.write_str(scene);
                }
                None => h.write_u8(0),
            }
            match &seg.image {
                ImageSource::File(p) => {
                    h.write_u8(1);
                    h.write_str(&p.to_string_lossy());
                }
                ImageSource::Fallback => h.write_u8(0),
            }
            h.write_str(&seg.speech.path.to_string_lossy());
        }
        h.finish()
    }

    /// Pretty JSON report of the timeline.
    pub fn to_json(&self) -> ReelResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ReelError::serde(format!("serialize timeline: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/builder.rs"]
mod tests;

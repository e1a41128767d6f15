use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::media::{AudioDecoder, FfmpegDecoder};
use crate::assets::resolver::{ResolvedScript, resolve_assets};
use crate::audio::mix::{MixSettings, MixedAudioTrack, mix_timeline, write_mix_to_f32le_file};
use crate::audio::music::{LoadedMusic, load_music};
use crate::config::RenderConfig;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::mux::{AudioInputConfig, mux_to_file};
use crate::encode::sink::FrameSink;
use crate::foundation::error::{Degradation, ReelError, ReelResult};
use crate::render::compositor::{CompositeSettings, CompositeStats, Compositor};
use crate::render::frame::FrameRGBA;
use crate::render::subtitle::SubtitleRenderer;
use crate::script::project::ProjectManifest;
use crate::timeline::builder::{Timeline, TimelineSettings, build_timeline};

/// Timeline plus every fallback applied while producing it.
#[derive(Clone, Debug, serde::Serialize)]
pub struct TimelinePlan {
    /// The laid-out timeline.
    pub timeline: Timeline,
    /// Fallbacks applied during resolution and layout.
    pub degradations: Vec<Degradation>,
}

/// Result of streaming a project into a caller-provided sink.
#[derive(Clone, Debug)]
pub struct SinkRender {
    /// Timeline that was rendered.
    pub timeline: Timeline,
    /// Mixed audio for the whole timeline.
    pub audio: MixedAudioTrack,
    /// Compositor counters.
    pub stats: CompositeStats,
    /// Every fallback applied.
    pub degradations: Vec<Degradation>,
}

/// Summary of a finished render.
#[derive(Clone, Debug, serde::Serialize)]
pub struct RenderReport {
    /// Published output file.
    pub output: PathBuf,
    /// Timeline length in seconds.
    pub total_duration: f64,
    /// Video frames written.
    pub frames: u64,
    /// Number of timeline segments.
    pub segments: usize,
    /// Compositor counters.
    pub stats: CompositeStats,
    /// Fallbacks applied; empty for a clean run.
    pub degradations: Vec<Degradation>,
    /// [`Timeline::fingerprint`] of the rendered timeline.
    pub timeline_fingerprint: u64,
}

/// Timeline synchronization and composition engine.
///
/// Holds the render configuration and the audio decoder; each call processes one project.
pub struct Engine {
    config: RenderConfig,
    decoder: Arc<dyn AudioDecoder>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Engine decoding audio with the system `ffmpeg`.
    pub fn new(config: RenderConfig) -> ReelResult<Self> {
        Self::with_decoder(config, Arc::new(FfmpegDecoder))
    }

    /// Engine with a custom audio decoder.
    pub fn with_decoder(config: RenderConfig, decoder: Arc<dyn AudioDecoder>) -> ReelResult<Self> {
        config.validate()?;
        Ok(Self { config, decoder })
    }

    /// Active configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Bind every line to its assets.
    pub fn resolve(&self, project: &ProjectManifest) -> ReelResult<ResolvedScript> {
        resolve_assets(project, self.decoder.as_ref(), self.config.sample_rate)
    }

    /// Resolve assets and lay out the timeline.
    #[tracing::instrument(level = "info", skip_all, fields(lines = project.script.len()))]
    pub fn plan(&self, project: &ProjectManifest) -> ReelResult<TimelinePlan> {
        let resolved = self.resolve(project)?;
        let timeline = build_timeline(&resolved.lines, self.timeline_settings())?;
        if timeline.total_duration <= 0.0 {
            return Err(ReelError::validation(
                "timeline has zero length; raise min_segment_duration or supply non-empty speech",
            ));
        }

        let mut degradations = resolved.degradations;
        for seg in timeline.segments.iter().filter(|s| s.subtitle.is_empty()) {
            tracing::warn!(line = seg.index, "line has no subtitle text");
            degradations.push(Degradation::EmptySubtitle { line: seg.index });
        }
        Ok(TimelinePlan {
            timeline,
            degradations,
        })
    }

    /// Compose the single frame shown at `time` seconds.
    pub fn render_frame_at(&self, project: &ProjectManifest, time: f64) -> ReelResult<FrameRGBA> {
        if !time.is_finite() || time < 0.0 {
            return Err(ReelError::validation("preview time must be finite and >= 0"));
        }
        let plan = self.plan(project)?;
        let subtitles = self.subtitle_renderer();
        let compositor = Compositor::new(&plan.timeline, self.composite_settings(), &subtitles)?;
        compositor.render_at(time)
    }

    /// Mix audio and stream video frames into `sink`, without muxing.
    pub fn render_with_sink(
        &self,
        project: &ProjectManifest,
        sink: &mut dyn FrameSink,
    ) -> ReelResult<SinkRender> {
        let TimelinePlan {
            timeline,
            mut degradations,
        } = self.plan(project)?;
        let music = self.load_music(project, &mut degradations);

        let subtitles = self.subtitle_renderer();
        let compositor = Compositor::new(&timeline, self.composite_settings(), &subtitles)?;
        degradations.extend_from_slice(compositor.degradations());

        let (audio, stats) = rayon::join(
            || mix_timeline(&timeline, music.as_ref(), self.mix_settings()),
            || compositor.render_into_sink(sink),
        );
        let (audio, stats) = (audio?, stats?);
        drop(compositor);

        Ok(SinkRender {
            timeline,
            audio,
            stats,
            degradations,
        })
    }

    /// Render `project` to `out_path`.
    ///
    /// Audio and video are produced concurrently into a temporary directory, then muxed. Nothing
    /// is written at `out_path` unless the whole run succeeds.
    #[tracing::instrument(level = "info", skip_all, fields(out = %out_path.display()))]
    pub fn render_to_file(
        &self,
        project: &ProjectManifest,
        out_path: &Path,
    ) -> ReelResult<RenderReport> {
        let TimelinePlan {
            timeline,
            mut degradations,
        } = self.plan(project)?;
        let music = self.load_music(project, &mut degradations);

        let subtitles = self.subtitle_renderer();
        let compositor = Compositor::new(&timeline, self.composite_settings(), &subtitles)?;
        degradations.extend_from_slice(compositor.degradations());

        let scratch = tempfile::tempdir()
            .map_err(|e| ReelError::encode(format!("failed to create scratch directory: {e}")))?;
        let video_path = scratch.path().join("video.mp4");
        let audio_path = scratch.path().join("mix.f32le");

        let mut sink = FfmpegSink::new(FfmpegSinkOpts {
            out_path: video_path.clone(),
            crf: self.config.video_crf,
            preset: self.config.video_preset.clone(),
            bg_rgba: self.config.fallback_background,
        });
        let (audio, stats) = rayon::join(
            || -> ReelResult<MixedAudioTrack> {
                let track = mix_timeline(&timeline, music.as_ref(), self.mix_settings())?;
                write_mix_to_f32le_file(&track, &audio_path)?;
                Ok(track)
            },
            || compositor.render_into_sink(&mut sink),
        );
        let (audio, stats) = (audio?, stats?);

        mux_to_file(
            &video_path,
            &AudioInputConfig {
                path: audio_path,
                sample_rate: audio.sample_rate,
                channels: audio.channels,
            },
            timeline.total_duration,
            out_path,
        )?;

        let report = RenderReport {
            output: out_path.to_path_buf(),
            total_duration: timeline.total_duration,
            frames: stats.frames_total,
            segments: timeline.segments.len(),
            stats,
            degradations,
            timeline_fingerprint: timeline.fingerprint(),
        };
        tracing::info!(
            output = %report.output.display(),
            total_duration = report.total_duration,
            frames = report.frames,
            degradations = report.degradations.len(),
            "render finished"
        );
        Ok(report)
    }

    fn load_music(
        &self,
        project: &ProjectManifest,
        degradations: &mut Vec<Degradation>,
    ) -> Option<LoadedMusic> {
        let source = project.music.as_ref()?;
        match load_music(
            source,
            self.config.music_pick,
            self.decoder.as_ref(),
            self.config.sample_rate,
        ) {
            Ok(music) => Some(music),
            Err(d) => {
                degradations.push(d);
                None
            }
        }
    }

    fn timeline_settings(&self) -> TimelineSettings {
        TimelineSettings {
            min_segment_duration: self.config.min_segment_duration,
            transition_gap: self.config.transition_gap,
            show_speaker_name: self.config.subtitle.show_speaker_name,
        }
    }

    fn mix_settings(&self) -> MixSettings {
        MixSettings {
            sample_rate: self.config.sample_rate,
            voice_gain: self.config.voice_gain,
            music_duck_level: self.config.music_duck_level,
            music_fade_in: self.config.music_fade_in,
            music_fade_out: self.config.music_fade_out,
        }
    }

    fn composite_settings(&self) -> CompositeSettings {
        CompositeSettings {
            canvas: self.config.resolution,
            fps: self.config.frame_rate,
            transition: self.config.transition,
            ease: self.config.transition_ease,
            fallback_background: self.config.fallback_background,
        }
    }

    fn subtitle_renderer(&self) -> SubtitleRenderer {
        SubtitleRenderer::new(&self.config.subtitle, self.config.resolution)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/engine.rs"]
mod tests;

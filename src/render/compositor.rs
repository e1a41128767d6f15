use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::decode::{PreparedImage, load_background};
use crate::assets::resolver::ImageSource;
use crate::effects::composite::{WipeParams, crossfade_into, over_region, wipe_into};
use crate::effects::transitions::{TransitionEase, TransitionKind};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{Degradation, ReelResult};
use crate::render::frame::FrameRGBA;
use crate::render::subtitle::{SubtitleOverlay, SubtitleRenderer};
use crate::timeline::builder::{Timeline, TimelinePosition};

/// Visual parameters for [`Compositor`].
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeSettings {
    /// Output size.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Effect used in gaps where the background changes.
    pub transition: TransitionKind,
    /// Easing of transition progress.
    pub ease: TransitionEase,
    /// Colour shown when a scene has no usable image.
    pub fallback_background: [u8; 4],
}

/// Frame counters from one compositing run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CompositeStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Frames that were actually composed.
    pub frames_rendered: u64,
    /// Frames reused unchanged from the previous frame.
    pub frames_elided: u64,
}

/// What a frame shows. Two frames with equal keys are pixel-identical.
#[derive(Clone, Copy, Debug, PartialEq)]
enum FrameKey {
    Still {
        background: usize,
        subtitle: Option<usize>,
    },
    Blend {
        from: usize,
        to: usize,
        progress: f64,
    },
}

/// Renders the visual track of a [`Timeline`].
///
/// Backgrounds and subtitle overlays are prepared once up front; per-frame work is a copy, a
/// blend and an overlay.
pub struct Compositor<'a> {
    timeline: &'a Timeline,
    settings: CompositeSettings,
    backgrounds: Vec<Arc<PreparedImage>>,
    subtitles: Vec<Option<SubtitleOverlay>>,
    degradations: Vec<Degradation>,
}

impl<'a> Compositor<'a> {
    /// Decode backgrounds and rasterize subtitles for every segment.
    #[tracing::instrument(level = "info", skip_all, fields(segments = timeline.segments.len()))]
    pub fn new(
        timeline: &'a Timeline,
        settings: CompositeSettings,
        subtitles: &SubtitleRenderer,
    ) -> ReelResult<Self> {
        let settings = CompositeSettings {
            transition: settings.transition.normalized()?,
            ..settings
        };
        let (backgrounds, mut degradations) =
            load_backgrounds(timeline, settings.canvas, settings.fallback_background);

        let overlays = timeline
            .segments
            .par_iter()
            .map(|seg| subtitles.render(&seg.subtitle))
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<ReelResult<Vec<_>>>()?;

        if let Some(d) = subtitles.font_degradation() {
            degradations.push(d.clone());
        }

        Ok(Self {
            timeline,
            settings,
            backgrounds,
            subtitles: overlays,
            degradations,
        })
    }

    /// Fallbacks applied while preparing backgrounds and fonts.
    pub fn degradations(&self) -> &[Degradation] {
        &self.degradations
    }

    /// Number of frames in the visual track.
    pub fn frame_count(&self) -> u64 {
        self.timeline.frame_count(self.settings.fps)
    }

    fn key_at(&self, t: f64) -> FrameKey {
        let last = self.timeline.segments.len().saturating_sub(1);
        match self.timeline.locate(t) {
            TimelinePosition::Segment(i) => FrameKey::Still {
                background: i,
                subtitle: self.subtitles[i].as_ref().map(|_| i),
            },
            TimelinePosition::Gap { from, to, progress } => {
                let same = Arc::ptr_eq(&self.backgrounds[from], &self.backgrounds[to]);
                if same || matches!(self.settings.transition, TransitionKind::Cut) {
                    FrameKey::Still {
                        background: from,
                        subtitle: None,
                    }
                } else {
                    FrameKey::Blend {
                        from,
                        to,
                        progress: self.settings.ease.apply(progress),
                    }
                }
            }
            TimelinePosition::End => FrameKey::Still {
                background: last,
                subtitle: None,
            },
        }
    }

    fn compose(&self, key: FrameKey) -> ReelResult<FrameRGBA> {
        let Canvas { width, height } = self.settings.canvas;
        let data = match key {
            FrameKey::Still {
                background,
                subtitle,
            } => {
                let mut data = self.backgrounds[background].rgba8_premul.as_ref().clone();
                if let Some(ov) = subtitle.and_then(|i| self.subtitles[i].as_ref()) {
                    over_region(
                        &mut data,
                        width,
                        height,
                        &ov.rgba8_premul,
                        ov.width,
                        ov.height,
                        ov.x,
                        ov.y,
                    )?;
                }
                data
            }
            FrameKey::Blend { from, to, progress } => {
                let a = &self.backgrounds[from].rgba8_premul;
                let b = &self.backgrounds[to].rgba8_premul;
                let mut data = vec![0u8; a.len()];
                match self.settings.transition {
                    TransitionKind::Wipe { dir, soft_edge } => wipe_into(
                        &mut data,
                        a,
                        b,
                        WipeParams {
                            width,
                            height,
                            t: progress as f32,
                            dir,
                            soft_edge,
                        },
                    )?,
                    TransitionKind::Crossfade | TransitionKind::Cut => {
                        crossfade_into(&mut data, a, b, progress as f32)?
                    }
                }
                data
            }
        };
        Ok(FrameRGBA {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// Compose the frame shown at `t` seconds.
    pub fn render_at(&self, t: f64) -> ReelResult<FrameRGBA> {
        self.compose(self.key_at(t))
    }

    /// Compose frame `idx` of the visual track.
    pub fn render_frame(&self, idx: FrameIndex) -> ReelResult<FrameRGBA> {
        self.render_at(self.settings.fps.frame_time_secs(idx))
    }

    /// Stream every frame into `sink`, reusing the previous frame whenever nothing changed.
    #[tracing::instrument(level = "info", skip_all)]
    pub fn render_into_sink(&self, sink: &mut dyn FrameSink) -> ReelResult<CompositeStats> {
        let n = self.frame_count();
        let Canvas { width, height } = self.settings.canvas;
        sink.begin(SinkConfig {
            width,
            height,
            fps: self.settings.fps,
        })?;

        let mut stats = CompositeStats::default();
        let mut prev: Option<(FrameKey, FrameRGBA)> = None;
        for f in 0..n {
            let idx = FrameIndex(f);
            let key = self.key_at(self.settings.fps.frame_time_secs(idx));
            match &prev {
                Some((k, frame)) if *k == key => {
                    sink.push_frame(idx, frame)?;
                    stats.frames_elided += 1;
                }
                _ => {
                    let frame = self.compose(key)?;
                    sink.push_frame(idx, &frame)?;
                    stats.frames_rendered += 1;
                    prev = Some((key, frame));
                }
            }
            stats.frames_total += 1;
        }
        sink.end()?;

        tracing::info!(
            frames = stats.frames_total,
            rendered = stats.frames_rendered,
            elided = stats.frames_elided,
            "video composited"
        );
        Ok(stats)
    }
}

/// Decode each distinct background once and map it onto the segments.
///
/// An image that fails to decode falls back to the flat background for the segments using it.
fn load_backgrounds(
    timeline: &Timeline,
    canvas: Canvas,
    fallback: [u8; 4],
) -> (Vec<Arc<PreparedImage>>, Vec<Degradation>) {
    let fallback_img = Arc::new(PreparedImage::solid(canvas, fallback));

    let mut first_scene: BTreeMap<PathBuf, Option<String>> = BTreeMap::new();
    for seg in &timeline.segments {
        if let ImageSource::File(path) = &seg.image {
            first_scene
                .entry(path.clone())
                .or_insert_with(|| seg.scene.clone());
        }
    }

    let decoded: Vec<(PathBuf, ReelResult<PreparedImage>)> = first_scene
        .keys()
        .cloned()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|path| {
            let img = load_background(&path, canvas, fallback);
            (path, img)
        })
        .collect();

    let mut degradations = Vec::new();
    let mut by_path: BTreeMap<PathBuf, Arc<PreparedImage>> = BTreeMap::new();
    for (path, result) in decoded {
        let img = match result {
            Ok(img) => Arc::new(img),
            Err(e) => {
                let scene = first_scene.get(&path).cloned().flatten();
                tracing::warn!(
                    path = %path.display(),
                    scene = ?scene,
                    error = %e,
                    "background image unreadable, using fallback"
                );
                degradations.push(Degradation::ImageDecode {
                    scene,
                    path: path.clone(),
                    reason: e.to_string(),
                });
                Arc::clone(&fallback_img)
            }
        };
        by_path.insert(path, img);
    }

    let backgrounds = timeline
        .segments
        .iter()
        .map(|seg| match &seg.image {
            ImageSource::File(path) => by_path
                .get(path)
                .cloned()
                .unwrap_or_else(|| Arc::clone(&fallback_img)),
            ImageSource::Fallback => Arc::clone(&fallback_img),
        })
        .collect();
    (backgrounds, degradations)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::media::MIX_SAMPLE_RATE;
use crate::audio::music::MusicPick;
use crate::effects::transitions::{TransitionEase, TransitionKind};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};

/// Subtitle appearance.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SubtitleStyle {
    /// Preferred font family. Falls back to the platform default when not installed.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Text colour (straight alpha). Accepts `[r,g,b,a]` or `"#rrggbb[aa]"`.
    #[serde(with = "color_serde")]
    pub text_color: [u8; 4],
    /// Backing box colour (straight alpha).
    #[serde(with = "color_serde")]
    pub box_color: [u8; 4],
    /// Distance from the bottom edge to the box, in pixels.
    pub bottom_margin: u32,
    /// Characters per wrapped subtitle row.
    pub max_chars_per_line: usize,
    /// Prefix subtitles with `speaker_name: ` when the line has one.
    pub show_speaker_name: bool,
    /// Extra directories searched for font files.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_family: "Noto Sans CJK JP".to_owned(),
            font_size: 28.0,
            text_color: [255, 255, 255, 255],
            box_color: [0, 0, 0, 160],
            bottom_margin: 40,
            max_chars_per_line: 25,
            show_speaker_name: false,
            font_dirs: Vec::new(),
        }
    }
}

/// Everything the engine needs to lay out and render a project.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output size in pixels. Both sides must be even.
    pub resolution: Canvas,
    /// Output frame rate.
    pub frame_rate: Fps,
    /// Shortest time a line stays on screen, in seconds.
    pub min_segment_duration: f64,
    /// Pause between consecutive lines, in seconds.
    pub transition_gap: f64,
    /// Effect shown during the gap when the background changes.
    pub transition: TransitionKind,
    /// Easing applied to transition progress.
    pub transition_ease: TransitionEase,
    /// Music gain under the voice track, in `[0, 1]`.
    pub music_duck_level: f32,
    /// Voice gain, in `[0, 4]`.
    pub voice_gain: f32,
    /// Music fade-in at timeline start, in seconds.
    pub music_fade_in: f64,
    /// Music fade-out before timeline end, in seconds.
    pub music_fade_out: f64,
    /// Track choice when music comes from a directory.
    pub music_pick: MusicPick,
    /// Subtitle appearance.
    pub subtitle: SubtitleStyle,
    /// Background used when a scene has no usable image.
    #[serde(with = "color_serde")]
    pub fallback_background: [u8; 4],
    /// Mix sample rate in Hz.
    pub sample_rate: u32,
    /// x264 constant rate factor.
    pub video_crf: u8,
    /// x264 preset name.
    pub video_preset: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            resolution: Canvas {
                width: 1280,
                height: 720,
            },
            frame_rate: Fps { num: 24, den: 1 },
            min_segment_duration: 1.0,
            transition_gap: 0.0,
            transition: TransitionKind::default(),
            transition_ease: TransitionEase::default(),
            music_duck_level: 0.05,
            voice_gain: 1.0,
            music_fade_in: 0.0,
            music_fade_out: 1.0,
            music_pick: MusicPick::First,
            subtitle: SubtitleStyle::default(),
            fallback_background: [0x1e, 0x22, 0x30, 255],
            sample_rate: MIX_SAMPLE_RATE,
            video_crf: 20,
            video_preset: "medium".to_owned(),
        }
    }
}

const X264_PRESETS: [&str; 10] = [
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
    "placebo",
];

impl RenderConfig {
    /// Load a JSON config. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> ReelResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read render config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&json)
            .map_err(|e| ReelError::serde(format!("invalid render config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every field for values the engine cannot honour.
    pub fn validate(&self) -> ReelResult<()> {
        let Canvas { width, height } = self.resolution;
        if width == 0 || height == 0 {
            return Err(ReelError::validation("resolution must be non-zero"));
        }
        if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "resolution must be even (required for yuv420p output)",
            ));
        }
        Fps::new(self.frame_rate.num, self.frame_rate.den)?;

        for (name, v) in [
            ("min_segment_duration", self.min_segment_duration),
            ("transition_gap", self.transition_gap),
            ("music_fade_in", self.music_fade_in),
            ("music_fade_out", self.music_fade_out),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ReelError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if !self.music_duck_level.is_finite() || !(0.0..=1.0).contains(&self.music_duck_level) {
            return Err(ReelError::validation("music_duck_level must be in [0, 1]"));
        }
        if !self.voice_gain.is_finite() || !(0.0..=4.0).contains(&self.voice_gain) {
            return Err(ReelError::validation("voice_gain must be in [0, 4]"));
        }
        if self.sample_rate == 0 {
            return Err(ReelError::validation("sample_rate must be non-zero"));
        }
        if self.video_crf > 51 {
            return Err(ReelError::validation("video_crf must be in [0, 51]"));
        }
        if !X264_PRESETS.contains(&self.video_preset.as_str()) {
            return Err(ReelError::validation(format!(
                "unknown video_preset '{}'",
                self.video_preset
            )));
        }
        self.transition.normalized()?;

        let sub = &self.subtitle;
        if !sub.font_size.is_finite() || sub.font_size <= 0.0 {
            return Err(ReelError::validation("subtitle.font_size must be > 0"));
        }
        if sub.max_chars_per_line == 0 {
            return Err(ReelError::validation(
                "subtitle.max_chars_per_line must be > 0",
            ));
        }
        if sub.bottom_margin >= height {
            return Err(ReelError::validation(
                "subtitle.bottom_margin must be smaller than the frame height",
            ));
        }
        Ok(())
    }
}

mod color_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ColorRepr {
        Rgba([u8; 4]),
        Hex(String),
    }

    pub(super) fn serialize<S: Serializer>(c: &[u8; 4], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            c[0], c[1], c[2], c[3]
        ))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 4], D::Error> {
        match ColorRepr::deserialize(d)? {
            ColorRepr::Rgba(c) => Ok(c),
            ColorRepr::Hex(s) => {
                crate::assets::decode::parse_hex_color(&s).map_err(serde::de::Error::custom)
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

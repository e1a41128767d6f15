//! Storyreel turns a narrated script into a subtitled video.
//!
//! Every script line has a speech clip whose decoded length drives the timeline. The engine
//! lays lines out back to back, mixes the voice track over an optional ducked music bed, draws
//! each line's scene image with a bottom subtitle, and muxes the result into one MP4:
//!
//! - Load a [`ProjectManifest`] and a [`RenderConfig`]
//! - Create an [`Engine`]
//! - [`Engine::plan`] the timeline, preview single frames, or [`Engine::render_to_file`]
//!
//! Missing images, music and fonts never abort a render; each fallback is reported as a
//! [`Degradation`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(dead_code)]

mod assets;
mod config;
mod foundation;

pub(crate) mod audio;
pub(crate) mod effects;
/// Video sinks and the final mux step.
pub mod encode;
pub(crate) mod render;
pub(crate) mod script;
/// Engine entry points.
pub mod session;
pub(crate) mod timeline;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex};
pub use crate::foundation::error::{Degradation, ReelError, ReelResult};

pub use crate::assets::decode::parse_hex_color;
pub use crate::assets::media::{
    AudioDecoder, AudioPcm, FfmpegDecoder, MIX_CHANNELS, MIX_SAMPLE_RATE, probe_media_duration,
};
pub use crate::assets::resolver::{
    ImageAsset, ImageSource, ResolvedLine, ResolvedScript, SpeechAsset,
};
pub use crate::audio::mix::{MixSettings, MixedAudioTrack};
pub use crate::audio::music::{MusicPick, MusicSource};
pub use crate::config::{RenderConfig, SubtitleStyle};
pub use crate::effects::transitions::{TransitionEase, TransitionKind, WipeDir};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::mux::{AudioInputConfig, mux_to_file};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::compositor::CompositeStats;
pub use crate::render::frame::FrameRGBA;
pub use crate::render::wrap::wrap_subtitle;
pub use crate::script::model::{Line, Script};
pub use crate::script::project::ProjectManifest;
pub use crate::session::engine::{Engine, RenderReport, SinkRender, TimelinePlan};
pub use crate::timeline::builder::{Timeline, TimelinePosition, TimelineSegment};
pub use crate::timeline::srt::format_srt_time;

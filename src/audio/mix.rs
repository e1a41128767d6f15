use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::assets::media::{AudioPcm, MIX_CHANNELS};
use crate::audio::music::LoadedMusic;
use crate::foundation::core::secs_to_samples;
use crate::foundation::error::{ReelError, ReelResult};
use crate::timeline::builder::Timeline;

#[derive(Clone, Debug)]
/// One scheduled audio contribution in timeline sample space.
pub(crate) struct AudioSegment {
    pub(crate) timeline_start_sample: u64,
    pub(crate) timeline_end_sample: u64,
    pub(crate) volume: f32,
    pub(crate) fade_in_sec: f64,
    pub(crate) fade_out_sec: f64,
    /// Restart the source from its beginning when it runs out.
    pub(crate) looped: bool,
    pub(crate) source: Arc<AudioPcm>,
}

#[derive(Clone, Debug)]
/// Every contribution to the mix, laid out over `total_samples` output frames.
pub(crate) struct AudioManifest {
    pub(crate) sample_rate: u32,
    pub(crate) channels: u16,
    pub(crate) total_samples: u64,
    pub(crate) segments: Vec<AudioSegment>,
}

/// Gains and fades applied by the mixer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MixSettings {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Gain applied to every voice clip.
    pub voice_gain: f32,
    /// Gain applied to the music bed.
    pub music_duck_level: f32,
    /// Music fade-in from timeline start, in seconds.
    pub music_fade_in: f64,
    /// Music fade-out before timeline end, in seconds.
    pub music_fade_out: f64,
}

/// Final interleaved audio spanning the whole timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct MixedAudioTrack {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved samples, `total_samples * channels` long.
    pub samples: Vec<f32>,
}

impl MixedAudioTrack {
    /// Number of sample frames.
    pub fn frames(&self) -> u64 {
        (self.samples.len() / usize::from(self.channels.max(1))) as u64
    }

    /// Length in seconds.
    pub fn duration_secs(&self) -> f64 {
        crate::foundation::core::samples_to_secs(self.frames(), self.sample_rate)
    }
}

fn pcm_segment(pcm: &Arc<AudioPcm>, start: u64, end: u64, volume: f32) -> AudioSegment {
    AudioSegment {
        timeline_start_sample: start,
        timeline_end_sample: end,
        volume,
        fade_in_sec: 0.0,
        fade_out_sec: 0.0,
        looped: false,
        source: Arc::clone(pcm),
    }
}

/// Lay voice clips and the optional music bed over the timeline.
///
/// Voice clip `i` starts at sample `round(start_time * sample_rate)` and is cut at its segment's
/// end. Music covers the whole timeline, looped, at the ducking gain.
pub(crate) fn build_audio_manifest(
    timeline: &Timeline,
    music: Option<&LoadedMusic>,
    settings: MixSettings,
) -> ReelResult<AudioManifest> {
    if settings.sample_rate == 0 {
        return Err(ReelError::validation("mix sample_rate must be non-zero"));
    }
    let sr = settings.sample_rate;
    let total_samples = secs_to_samples(timeline.total_duration, sr);

    let mut segments = Vec::with_capacity(timeline.segments.len() + 1);
    for seg in &timeline.segments {
        let pcm = &seg.speech.pcm;
        if pcm.sample_rate != sr {
            return Err(ReelError::validation(format!(
                "speech for line {} decoded at {} Hz, mix runs at {sr} Hz",
                seg.index, pcm.sample_rate
            )));
        }
        let start = secs_to_samples(seg.start_time, sr);
        let end = secs_to_samples(seg.end_time, sr).min(total_samples);
        segments.push(pcm_segment(pcm, start, end, settings.voice_gain));
    }

    if let Some(music) = music {
        let mut bed = pcm_segment(&music.pcm, 0, total_samples, settings.music_duck_level);
        bed.looped = true;
        bed.fade_in_sec = settings.music_fade_in;
        bed.fade_out_sec = settings.music_fade_out;
        segments.push(bed);
    }

    Ok(AudioManifest {
        sample_rate: sr,
        channels: MIX_CHANNELS,
        total_samples,
        segments,
    })
}

/// Mix all manifest segments into interleaved output PCM.
///
/// When the summed peak exceeds full scale the whole buffer is scaled down uniformly.
pub(crate) fn mix_manifest(manifest: &AudioManifest) -> MixedAudioTrack {
    let frames = manifest.total_samples as usize;
    let mut out = vec![0.0f32; frames * usize::from(manifest.channels)];

    for seg in &manifest.segments {
        mix_segment(&mut out, manifest, seg);
    }

    let peak = out.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if peak > 1.0 {
        let scale = 1.0 / peak;
        for s in &mut out {
            *s *= scale;
        }
        tracing::debug!(peak, "mix normalized to full scale");
    }

    MixedAudioTrack {
        sample_rate: manifest.sample_rate,
        channels: manifest.channels,
        samples: out,
    }
}

fn mix_segment(out: &mut [f32], manifest: &AudioManifest, seg: &AudioSegment) {
    let end = seg.timeline_end_sample.min(manifest.total_samples);
    let seg_len_samples = end.saturating_sub(seg.timeline_start_sample);
    if seg_len_samples == 0 || seg.source.channels == 0 {
        return;
    }

    let src = seg.source.interleaved_f32.as_slice();
    let src_channels = usize::from(seg.source.channels);
    let src_frames = src.len() / src_channels;
    if src_frames == 0 {
        return;
    }
    let rate = f64::from(seg.source.sample_rate) / f64::from(manifest.sample_rate);

    for dst_sample in seg.timeline_start_sample..end {
        let rel_sample = dst_sample - seg.timeline_start_sample;
        let mut src_pos = (rel_sample as f64) * rate;
        if seg.looped {
            src_pos %= src_frames as f64;
        }
        let src_frame0 = src_pos.floor() as usize;
        if src_frame0 >= src_frames {
            break;
        }
        let src_frame1 = if src_frame0 + 1 < src_frames {
            src_frame0 + 1
        } else if seg.looped {
            0
        } else {
            src_frame0
        };
        let frac = (src_pos - src_frame0 as f64) as f32;

        let rel_sec = (rel_sample as f64) / f64::from(manifest.sample_rate);
        let gain = fade_gain(seg, rel_sec, seg_len_samples, manifest.sample_rate) * seg.volume;
        let dst_idx = dst_sample as usize * usize::from(manifest.channels);

        let i0 = src_frame0 * src_channels;
        let i1 = src_frame1 * src_channels;
        let (l, r) = if src_channels == 1 {
            let v = src[i0] + ((src[i1] - src[i0]) * frac);
            (v, v)
        } else {
            (
                src[i0] + ((src[i1] - src[i0]) * frac),
                src[i0 + 1] + ((src[i1 + 1] - src[i0 + 1]) * frac),
            )
        };

        out[dst_idx] += l * gain;
        if manifest.channels > 1 {
            out[dst_idx + 1] += r * gain;
        }
    }
}

fn fade_gain(seg: &AudioSegment, rel_sec: f64, seg_len_samples: u64, sample_rate: u32) -> f32 {
    let mut gain = 1.0f32;
    if seg.fade_in_sec > 0.0 {
        let t = (rel_sec / seg.fade_in_sec).clamp(0.0, 1.0) as f32;
        gain *= t;
    }
    if seg.fade_out_sec > 0.0 {
        let seg_len_sec = (seg_len_samples as f64) / f64::from(sample_rate);
        let rem = (seg_len_sec - rel_sec).max(0.0);
        let t = (rem / seg.fade_out_sec).clamp(0.0, 1.0) as f32;
        gain *= t;
    }
    gain
}

/// Build and mix the full audio track for `timeline`.
#[tracing::instrument(level = "info", skip_all, fields(total_duration = timeline.total_duration))]
pub fn mix_timeline(
    timeline: &Timeline,
    music: Option<&LoadedMusic>,
    settings: MixSettings,
) -> ReelResult<MixedAudioTrack> {
    let manifest = build_audio_manifest(timeline, music, settings)?;
    let track = mix_manifest(&manifest);
    tracing::info!(
        frames = track.frames(),
        with_music = music.is_some(),
        "audio mixed"
    );
    Ok(track)
}

/// Write interleaved `f32` PCM samples to raw little-endian `.f32le` file.
pub(crate) fn write_mix_to_f32le_file(track: &MixedAudioTrack, out_path: &Path) -> ReelResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!(
                "failed to create audio mix output directory '{}'",
                parent.display()
            )
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(track.samples.len() * 4);
    for &sample in &track.samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes)
        .with_context(|| format!("failed to write mixed audio file '{}'", out_path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;

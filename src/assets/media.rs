use std::path::Path;

use crate::foundation::core::samples_to_secs;
use crate::foundation::error::{ReelError, ReelResult};

/// Internal audio mixing sample rate used across decode/mix/encode pipeline.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Channel layout used for every decoded clip and for the mix.
pub const MIX_CHANNELS: u16 = 2;

#[derive(Clone, Debug, PartialEq)]
/// Decoded interleaved floating-point PCM.
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> u64 {
        if self.channels == 0 {
            return 0;
        }
        (self.interleaved_f32.len() / usize::from(self.channels)) as u64
    }

    /// Duration measured from the decoded sample count.
    pub fn duration_secs(&self) -> f64 {
        samples_to_secs(self.frames(), self.sample_rate)
    }

    /// Stereo silence lasting `secs` at `sample_rate`.
    pub fn silence(secs: f64, sample_rate: u32) -> Self {
        let frames = crate::foundation::core::secs_to_samples(secs, sample_rate) as usize;
        Self {
            sample_rate,
            channels: MIX_CHANNELS,
            interleaved_f32: vec![0.0; frames * usize::from(MIX_CHANNELS)],
        }
    }
}

/// Decodes an audio file into PCM at a requested sample rate.
///
/// Clip durations are measured from the decoded output, so implementations must return every
/// sample of the source.
pub trait AudioDecoder: Send + Sync {
    /// Decode `path` into interleaved PCM at `sample_rate`.
    fn decode(&self, path: &Path, sample_rate: u32) -> ReelResult<AudioPcm>;
}

/// [`AudioDecoder`] backed by the system `ffmpeg` binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegDecoder;

impl AudioDecoder for FfmpegDecoder {
    fn decode(&self, path: &Path, sample_rate: u32) -> ReelResult<AudioPcm> {
        decode_audio_f32_stereo(path, sample_rate)
    }
}

/// Decode audio from media source to stereo interleaved `f32` PCM.
#[tracing::instrument(level = "debug", fields(path = %path.display()))]
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> ReelResult<AudioPcm> {
    if sample_rate == 0 {
        return Err(ReelError::validation("decode sample_rate must be non-zero"));
    }
    if !path.is_file() {
        return Err(ReelError::decode(format!(
            "audio file '{}' does not exist",
            path.display()
        )));
    }

    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &MIX_CHANNELS.to_string(),
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| ReelError::decode(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(ReelError::decode(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let interleaved_f32 = pcm_from_f32le_bytes(&out.stdout)?;
    Ok(AudioPcm {
        sample_rate,
        channels: MIX_CHANNELS,
        interleaved_f32,
    })
}

pub(crate) fn pcm_from_f32le_bytes(bytes: &[u8]) -> ReelResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(ReelError::decode(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Container duration in seconds as reported by `ffprobe`.
pub fn probe_media_duration(path: &Path) -> ReelResult<f64> {
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        format: ProbeFormat,
    }

    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .map_err(|e| ReelError::decode(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::decode(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelError::decode(format!("ffprobe json parse failed: {e}")))?;
    parsed
        .format
        .duration
        .as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| {
            ReelError::decode(format!(
                "ffprobe reported no duration for '{}'",
                path.display()
            ))
        })
}

/// Return `true` when `tool -version` runs successfully from `PATH`.
pub fn is_tool_on_path(tool: &str) -> bool {
    std::process::Command::new(tool)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;

use crate::assets::media::is_tool_on_path;
use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{ReelError, ReelResult};

/// Raw PCM audio stream handed to the muxer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Combine a silent video and raw PCM audio into `out_path`, trimmed to `total_duration`.
///
/// ffmpeg writes to a hidden sibling of `out_path` that is renamed into place only on success, so
/// a failed mux never leaves a file at `out_path`.
#[tracing::instrument(level = "info", skip(audio), fields(out = %out_path.display()))]
pub fn mux_to_file(
    video_path: &Path,
    audio: &AudioInputConfig,
    total_duration: f64,
    out_path: &Path,
) -> ReelResult<()> {
    if audio.sample_rate == 0 || audio.channels == 0 {
        return Err(ReelError::validation(
            "audio sample_rate and channels must be non-zero",
        ));
    }
    if !total_duration.is_finite() || total_duration <= 0.0 {
        return Err(ReelError::validation("mux duration must be positive"));
    }
    if !is_tool_on_path("ffmpeg") {
        return Err(ReelError::encode(
            "ffmpeg is required for muxing, but was not found on PATH",
        ));
    }

    ensure_parent_dir(out_path)?;
    let dir = match out_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let suffix = out_path
        .extension()
        .and_then(|e| e.to_str())
        .map_or_else(|| ".mp4".to_owned(), |e| format!(".{e}"));
    let staging = tempfile::Builder::new()
        .prefix(".storyreel-")
        .suffix(&suffix)
        .tempfile_in(&dir)
        .with_context(|| format!("create staging file in '{}'", dir.display()))?;

    let out = Command::new("ffmpeg")
        .args(["-y", "-loglevel", "error", "-i"])
        .arg(video_path)
        .args([
            "-f",
            "f32le",
            "-ar",
            &audio.sample_rate.to_string(),
            "-ac",
            &audio.channels.to_string(),
            "-i",
        ])
        .arg(&audio.path)
        .args([
            "-map",
            "0:v:0",
            "-map",
            "1:a:0",
            "-c:v",
            "copy",
            "-c:a",
            "aac",
            "-b:a",
            "192k",
            "-t",
            &format!("{total_duration:.6}"),
            "-movflags",
            "+faststart",
        ])
        .arg(staging.path())
        .output()
        .map_err(|e| ReelError::encode(format!("failed to run ffmpeg for mux: {e}")))?;

    if !out.status.success() {
        return Err(ReelError::encode(format!(
            "ffmpeg mux failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    staging.persist(out_path).map_err(|e| {
        ReelError::encode(format!(
            "failed to move muxed file into '{}': {}",
            out_path.display(),
            e.error
        ))
    })?;
    tracing::info!(out = %out_path.display(), total_duration, "output muxed");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mux.rs"]
mod tests;

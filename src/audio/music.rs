use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::media::{AudioDecoder, AudioPcm};
use crate::foundation::error::Degradation;
use crate::foundation::math::Fnv1a64;

/// File extensions considered when picking music from a directory.
pub const MUSIC_EXTENSIONS: [&str; 6] = ["mp3", "wav", "ogg", "flac", "m4a", "aac"];

/// Where background music comes from.
///
/// Deserializes from `{"file": path}`, `{"dir": path}` or a bare path string. A bare path naming a
/// directory is treated as [`MusicSource::Dir`] when resolved.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", from = "MusicSourceRepr")]
pub enum MusicSource {
    /// One explicit track.
    File(PathBuf),
    /// A folder of candidate tracks.
    Dir(PathBuf),
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum MusicSourceRepr {
    Bare(PathBuf),
    Tagged(TaggedMusicSource),
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedMusicSource {
    File(PathBuf),
    Dir(PathBuf),
}

impl From<MusicSourceRepr> for MusicSource {
    fn from(repr: MusicSourceRepr) -> Self {
        match repr {
            MusicSourceRepr::Bare(p) | MusicSourceRepr::Tagged(TaggedMusicSource::File(p)) => {
                Self::File(p)
            }
            MusicSourceRepr::Tagged(TaggedMusicSource::Dir(p)) => Self::Dir(p),
        }
    }
}

impl MusicSource {
    /// Path of the file or directory.
    pub fn path(&self) -> &Path {
        match self {
            Self::File(p) | Self::Dir(p) => p,
        }
    }

    /// Same source with a relative path joined onto `base`.
    pub fn resolved_against(&self, base: &Path) -> Self {
        let join = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                base.join(p)
            }
        };
        match self {
            Self::File(p) => Self::File(join(p)),
            Self::Dir(p) => Self::Dir(join(p)),
        }
    }
}

/// How one track is chosen from a music directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MusicPick {
    /// First candidate in file-name order.
    #[default]
    First,
    /// Candidate at an index derived from the seed.
    Seeded(u64),
}

/// Background music ready for mixing.
#[derive(Clone, Debug)]
pub struct LoadedMusic {
    /// Track that was chosen.
    pub path: PathBuf,
    /// Decoded samples.
    pub pcm: Arc<AudioPcm>,
}

/// Audio files in `dir`, sorted by file name.
pub fn music_candidates(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        if MUSIC_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            out.push(path);
        }
    }
    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(out)
}

/// Pick the track to use from `source`.
pub fn select_track(source: &MusicSource, pick: MusicPick) -> Result<PathBuf, String> {
    let dir = match source {
        MusicSource::File(p) if !p.is_dir() => {
            if !p.is_file() {
                return Err(format!("music file '{}' does not exist", p.display()));
            }
            return Ok(p.clone());
        }
        MusicSource::File(p) | MusicSource::Dir(p) => p,
    };

    let candidates = music_candidates(dir)
        .map_err(|e| format!("cannot list music directory '{}': {e}", dir.display()))?;
    if candidates.is_empty() {
        return Err(format!(
            "music directory '{}' contains no audio files",
            dir.display()
        ));
    }

    let idx = match pick {
        MusicPick::First => 0,
        MusicPick::Seeded(seed) => {
            let mut h = Fnv1a64::new_default();
            h.write_u64(seed);
            (h.finish() % candidates.len() as u64) as usize
        }
    };
    tracing::debug!(
        dir = %dir.display(),
        candidates = candidates.len(),
        idx,
        "picked background music"
    );
    Ok(candidates[idx].clone())
}

/// Select and decode background music.
///
/// Every failure is recoverable: the caller renders without music and records the returned
/// [`Degradation`].
pub fn load_music(
    source: &MusicSource,
    pick: MusicPick,
    decoder: &dyn AudioDecoder,
    sample_rate: u32,
) -> Result<LoadedMusic, Degradation> {
    let unavailable = |reason: String| {
        tracing::warn!(source = %source.path().display(), %reason, "background music dropped");
        Degradation::MusicUnavailable { reason }
    };

    let path = select_track(source, pick).map_err(unavailable)?;
    let pcm = decoder
        .decode(&path, sample_rate)
        .map_err(|e| unavailable(format!("'{}': {e}", path.display())))?;
    if pcm.frames() == 0 {
        return Err(unavailable(format!(
            "'{}' decoded to zero duration",
            path.display()
        )));
    }

    tracing::info!(
        path = %path.display(),
        duration_secs = pcm.duration_secs(),
        "background music loaded"
    );
    Ok(LoadedMusic {
        path,
        pcm: Arc::new(pcm),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/music.rs"]
mod tests;

use std::path::PathBuf;

/// Convenience result type used across storyreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Fatal error taxonomy used by engine APIs.
///
/// Every variant aborts the run. Recoverable conditions are reported as [`Degradation`]
/// instead and never surface here.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// The script has no lines, so there is nothing to render.
    #[error("empty script: nothing to render")]
    EmptyScript,

    /// A script line has no usable speech clip.
    #[error("missing audio asset for line {line}: {reason}")]
    MissingAudioAsset {
        /// 0-based script line index.
        line: usize,
        /// Human-readable cause (absent from the mapping, undecodable, ...).
        reason: String,
    },

    /// Invalid user-provided configuration or project data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while decoding media.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors while encoding or muxing the output.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped error from lower-level dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ReelError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`ReelError::MissingAudioAsset`] value for script line `line`.
    pub fn missing_audio(line: usize, reason: impl Into<String>) -> Self {
        Self::MissingAudioAsset {
            line,
            reason: reason.into(),
        }
    }

    /// Script line index this error refers to, if any.
    pub fn line_index(&self) -> Option<usize> {
        match self {
            Self::MissingAudioAsset { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// A recoverable condition that was handled by substituting a default.
///
/// Degradations are logged with `tracing::warn!` where they occur and collected into the run
/// report so callers can decide whether to regenerate the affected asset.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// No image resolved for a scene; the flat fallback background is used.
    MissingImage {
        /// Scene id, or `None` for lines before the first scene.
        scene: Option<String>,
        /// Why the image was not resolved.
        reason: String,
    },
    /// An image file existed but could not be decoded.
    ImageDecode {
        /// Scene id the image belongs to.
        scene: Option<String>,
        /// Offending file.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },
    /// Background music could not be used; the run proceeds without it.
    MusicUnavailable {
        /// Why the music was dropped.
        reason: String,
    },
    /// The configured subtitle font family is not installed.
    FontFallback {
        /// Family name requested by the configuration.
        requested: String,
    },
    /// A line has no subtitle text; it still occupies its minimum duration.
    EmptySubtitle {
        /// 0-based script line index.
        line: usize,
    },
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingImage { scene, reason } => {
                write!(f, "missing image for scene {scene:?}: {reason}")
            }
            Self::ImageDecode {
                scene,
                path,
                reason,
            } => write!(
                f,
                "failed to decode image '{}' for scene {scene:?}: {reason}",
                path.display()
            ),
            Self::MusicUnavailable { reason } => write!(f, "background music dropped: {reason}"),
            Self::FontFallback { requested } => {
                write!(f, "font family '{requested}' unavailable, using default")
            }
            Self::EmptySubtitle { line } => write!(f, "line {line} has empty subtitle text"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

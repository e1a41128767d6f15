use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::audio::music::MusicSource;
use crate::foundation::error::{ReelError, ReelResult};
use crate::script::model::Script;

/// Persisted project state: the script plus every asset the generators produced.
///
/// A manifest loaded from disk is equivalent to one assembled in memory from fresh generator
/// output.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectManifest {
    /// Dialogue in presentation order.
    pub script: Script,
    /// Speech clip per line index. Keys are decimal strings in JSON.
    #[serde(default)]
    pub speech: BTreeMap<usize, PathBuf>,
    /// Background image per scene id.
    #[serde(default)]
    pub images: BTreeMap<String, PathBuf>,
    /// Scenes whose image generation failed, with the reported cause.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub image_failures: BTreeMap<String, String>,
    /// Optional background music.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<MusicSource>,
}

impl ProjectManifest {
    /// Manifest for `script` with no assets attached yet.
    pub fn new(script: Script) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    /// Parse a manifest from JSON, resolving relative asset paths against `base_dir`.
    pub fn from_json_str(json: &str, base_dir: &Path) -> ReelResult<Self> {
        let manifest: Self = serde_json::from_str(json)
            .map_err(|e| ReelError::serde(format!("invalid project manifest: {e}")))?;
        Ok(manifest.resolved_against(base_dir))
    }

    /// Load a manifest file. Relative paths inside it are resolved against its directory.
    #[tracing::instrument(level = "debug", fields(path = %path.display()))]
    pub fn load(path: &Path) -> ReelResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read project manifest '{}'", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json_str(&json, base)
    }

    /// Write the manifest as pretty JSON.
    pub fn save(&self, path: &Path) -> ReelResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ReelError::serde(format!("serialize project manifest: {e}")))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory '{}'", parent.display()))?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("write project manifest '{}'", path.display()))?;
        Ok(())
    }

    /// Copy of this manifest with every relative path joined onto `base`.
    pub fn resolved_against(mut self, base: &Path) -> Self {
        let join = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        self.speech = std::mem::take(&mut self.speech)
            .into_iter()
            .map(|(k, p)| (k, join(p)))
            .collect();
        self.images = std::mem::take(&mut self.images)
            .into_iter()
            .map(|(k, p)| (k, join(p)))
            .collect();
        self.music = self.music.map(|m| m.resolved_against(base));
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/project.rs"]
mod tests;

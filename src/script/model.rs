use crate::foundation::error::{ReelError, ReelResult};

/// One line of dialogue in presentation order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Line {
    /// Stable speaker identifier (selects the voice upstream).
    #[serde(alias = "role")]
    pub speaker_id: String,
    /// Optional display name shown before the subtitle.
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub speaker_name: Option<String>,
    /// Spoken text, also used as the subtitle.
    #[serde(default)]
    pub text: String,
    /// Scene this line belongs to. `None` continues the previous line's scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_id: Option<String>,
    /// Prompt that was used to generate the scene image, kept for provenance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
}

impl Line {
    /// Create a line with no scene or display name.
    pub fn new(speaker_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker_id: speaker_id.into(),
            speaker_name: None,
            text: text.into(),
            scene_id: None,
            image_prompt: None,
        }
    }

    /// Builder-style setter for the scene id.
    pub fn with_scene(mut self, scene_id: impl Into<String>) -> Self {
        self.scene_id = Some(scene_id.into());
        self
    }

    /// Builder-style setter for the display name.
    pub fn with_speaker_name(mut self, name: impl Into<String>) -> Self {
        self.speaker_name = Some(name.into());
        self
    }

    /// Subtitle text for this line, optionally prefixed by the speaker's display name.
    pub fn subtitle_text(&self, show_speaker_name: bool) -> String {
        match (&self.speaker_name, show_speaker_name) {
            (Some(name), true) if !name.trim().is_empty() && !self.text.trim().is_empty() => {
                format!("{}: {}", name.trim(), self.text.trim())
            }
            _ => self.text.trim().to_owned(),
        }
    }
}

/// Ordered, non-empty sequence of lines.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Script {
    /// Lines in presentation order.
    pub lines: Vec<Line>,
}

impl Script {
    /// Wrap `lines` into a script.
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Return `true` when the script has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Fail with [`ReelError::EmptyScript`] when there is nothing to render.
    pub fn ensure_non_empty(&self) -> ReelResult<()> {
        if self.lines.is_empty() {
            return Err(ReelError::EmptyScript);
        }
        Ok(())
    }

    /// Effective scene key per line.
    ///
    /// A line without `scene_id` inherits the key of the line before it; lines ahead of the first
    /// scene get `None`.
    pub fn scene_keys(&self) -> Vec<Option<String>> {
        let mut current: Option<String> = None;
        self.lines
            .iter()
            .map(|line| {
                if let Some(id) = line.scene_id.as_ref().filter(|s| !s.trim().is_empty()) {
                    current = Some(id.clone());
                }
                current.clone()
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/model.rs"]
mod tests;

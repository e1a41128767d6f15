use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::media::{AudioDecoder, AudioPcm};
use crate::foundation::error::{Degradation, ReelError, ReelResult};
use crate::script::model::Line;
use crate::script::project::ProjectManifest;

/// Speech clip bound to one line, with its duration measured from decoded samples.
#[derive(Clone, Debug, serde::Serialize)]
pub struct SpeechAsset {
    /// Source file.
    pub path: PathBuf,
    /// Decoded duration in seconds.
    pub duration_secs: f64,
    /// Decoded samples at the mix rate.
    #[serde(skip)]
    pub pcm: Arc<AudioPcm>,
}

/// Where a scene's background comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// An image file on disk (still subject to decode failure at render time).
    File(PathBuf),
    /// The flat fallback colour.
    Fallback,
}

/// Background image chosen for a scene.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ImageAsset {
    /// Effective scene id; `None` for lines ahead of the first scene.
    pub scene: Option<String>,
    /// Image to show.
    pub source: ImageSource,
}

/// A line with every asset it needs.
#[derive(Clone, Debug)]
pub struct ResolvedLine {
    /// 0-based script position.
    pub index: usize,
    /// The line itself.
    pub line: Line,
    /// Its speech clip.
    pub speech: SpeechAsset,
    /// Its scene background.
    pub image: ImageAsset,
}

/// Output of [`resolve_assets`].
#[derive(Clone, Debug)]
pub struct ResolvedScript {
    /// One entry per script line, in script order.
    pub lines: Vec<ResolvedLine>,
    /// Fallbacks applied while resolving.
    pub degradations: Vec<Degradation>,
}

/// Bind every line of `project` to its speech clip and scene image.
///
/// Speech is decoded in parallel; the first failure in script order aborts with
/// [`ReelError::MissingAudioAsset`]. Image problems never abort and fall back to the flat
/// background instead.
#[tracing::instrument(level = "info", skip_all, fields(lines = project.script.len()))]
pub fn resolve_assets(
    project: &ProjectManifest,
    decoder: &dyn AudioDecoder,
    sample_rate: u32,
) -> ReelResult<ResolvedScript> {
    let script = &project.script;
    script.ensure_non_empty()?;
    check_speech_coverage(project)?;

    let speech = project
        .speech
        .par_iter()
        .map(|(&idx, path)| decode_speech(idx, path, decoder, sample_rate))
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<ReelResult<Vec<_>>>()?;

    let (images, degradations) = resolve_scene_images(project);

    let lines = script
        .lines
        .iter()
        .zip(script.scene_keys())
        .zip(speech)
        .enumerate()
        .map(|(index, ((line, scene), speech))| {
            let source = images
                .get(&scene)
                .cloned()
                .unwrap_or(ImageSource::Fallback);
            ResolvedLine {
                index,
                line: line.clone(),
                speech,
                image: ImageAsset { scene, source },
            }
        })
        .collect::<Vec<_>>();

    tracing::info!(
        lines = lines.len(),
        degradations = degradations.len(),
        "assets resolved"
    );
    Ok(ResolvedScript {
        lines,
        degradations,
    })
}

fn check_speech_coverage(project: &ProjectManifest) -> ReelResult<()> {
    let n = project.script.len();
    if let Some((&extra, _)) = project.speech.range(n..).next() {
        return Err(ReelError::validation(format!(
            "speech mapping has index {extra} but the script only has {n} lines"
        )));
    }
    if let Some(missing) = (0..n).find(|i| !project.speech.contains_key(i)) {
        return Err(ReelError::missing_audio(
            missing,
            "no speech clip in the mapping",
        ));
    }
    Ok(())
}

fn decode_speech(
    index: usize,
    path: &std::path::Path,
    decoder: &dyn AudioDecoder,
    sample_rate: u32,
) -> ReelResult<SpeechAsset> {
    let pcm = decoder
        .decode(path, sample_rate)
        .map_err(|e| ReelError::missing_audio(index, format!("'{}': {e}", path.display())))?;
    let duration_secs = pcm.duration_secs();
    tracing::debug!(line = index, path = %path.display(), duration_secs, "speech measured");
    Ok(SpeechAsset {
        path: path.to_path_buf(),
        duration_secs,
        pcm: Arc::new(pcm),
    })
}

/// Scene images in first-appearance order, with one degradation per scene that falls back.
fn resolve_scene_images(
    project: &ProjectManifest,
) -> (BTreeMap<Option<String>, ImageSource>, Vec<Degradation>) {
    let mut images = BTreeMap::new();
    let mut degradations = Vec::new();

    for scene in project.script.scene_keys() {
        if images.contains_key(&scene) {
            continue;
        }
        let outcome = match &scene {
            None => Err("line precedes the first scene".to_owned()),
            Some(id) => match (project.images.get(id), project.image_failures.get(id)) {
                (_, Some(reason)) => Err(format!("image generation failed: {reason}")),
                (None, None) => Err("no image in the mapping".to_owned()),
                (Some(path), None) if !path.is_file() => {
                    Err(format!("image file '{}' does not exist", path.display()))
                }
                (Some(path), None) => Ok(path.clone()),
            },
        };

        let source = match outcome {
            Ok(path) => ImageSource::File(path),
            Err(reason) => {
                tracing::warn!(scene = ?scene, %reason, "using fallback background");
                degradations.push(Degradation::MissingImage {
                    scene: scene.clone(),
                    reason,
                });
                ImageSource::Fallback
            }
        };
        images.insert(scene, source);
    }

    (images, degradations)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolver.rs"]
mod tests;

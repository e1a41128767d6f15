use std::path::Path;

use super::*;
use crate::script::model::{Line, Script};

/// Decodes `<secs>.wav` file names into silence of that length; anything else fails.
struct NameDecoder;

impl AudioDecoder for NameDecoder {
    fn decode(&self, path: &Path, sample_rate: u32) -> ReelResult<AudioPcm> {
        let secs: f64 = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.split('_').next_back())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ReelError::decode(format!("cannot decode '{}'", path.display())))?;
        Ok(AudioPcm::silence(secs, sample_rate))
    }
}

fn project(lines: Vec<Line>, durations: &[&str]) -> ProjectManifest {
    let mut m = ProjectManifest::new(Script::new(lines));
    for (i, d) in durations.iter().enumerate() {
        m.speech.insert(i, PathBuf::from(format!("voice/{i}_{d}.wav")));
    }
    m
}

#[test]
fn empty_script_aborts() {
    let err = resolve_assets(&ProjectManifest::default(), &NameDecoder, 48_000).unwrap_err();
    assert!(matches!(err, ReelError::EmptyScript));
}

#[test]
fn durations_come_from_decoded_audio() {
    let p = project(
        vec![Line::new("a", "x"), Line::new("b", "a much longer line of text")],
        &["2.5", "0.5"],
    );
    let resolved = resolve_assets(&p, &NameDecoder, 48_000).unwrap();
    assert_eq!(resolved.lines.len(), 2);
    assert!((resolved.lines[0].speech.duration_secs - 2.5).abs() < 1e-9);
    assert!((resolved.lines[1].speech.duration_secs - 0.5).abs() < 1e-9);
    assert_eq!(resolved.lines[1].index, 1);
}

#[test]
fn missing_speech_index_reports_line() {
    let mut p = project(
        vec![Line::new("a", "x"), Line::new("b", "y"), Line::new("c", "z")],
        &["1.0", "1.0", "1.0"],
    );
    p.speech.remove(&1);
    let err = resolve_assets(&p, &NameDecoder, 48_000).unwrap_err();
    assert_eq!(err.line_index(), Some(1));
}

#[test]
fn undecodable_speech_reports_first_failing_line() {
    let mut p = project(
        vec![Line::new("a", "x"), Line::new("b", "y"), Line::new("c", "z")],
        &["1.0", "1.0", "1.0"],
    );
    p.speech.insert(1, PathBuf::from("voice/garbage.wav"));
    p.speech.insert(2, PathBuf::from("voice/also_garbage.wav"));
    let err = resolve_assets(&p, &NameDecoder, 48_000).unwrap_err();
    assert!(matches!(err, ReelError::MissingAudioAsset { line: 1, .. }));
}

#[test]
fn out_of_range_speech_index_is_a_validation_error() {
    let mut p = project(vec![Line::new("a", "x")], &["1.0"]);
    p.speech.insert(5, PathBuf::from("voice/5_1.0.wav"));
    let err = resolve_assets(&p, &NameDecoder, 48_000).unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
}

#[test]
fn missing_images_fall_back_without_aborting() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("s1.png");
    std::fs::write(&good, b"png bytes are checked later").unwrap();

    let mut p = project(
        vec![
            Line::new("a", "intro"),
            Line::new("a", "one").with_scene("s1"),
            Line::new("b", "two"),
            Line::new("a", "three").with_scene("s2"),
            Line::new("b", "four").with_scene("s3"),
            Line::new("b", "five").with_scene("s4"),
        ],
        &["1", "1", "1", "1", "1", "1"],
    );
    p.images.insert("s1".to_owned(), good.clone());
    p.images.insert("s3".to_owned(), dir.path().join("gone.png"));
    p.image_failures.insert("s4".to_owned(), "quota".to_owned());

    let resolved = resolve_assets(&p, &NameDecoder, 48_000).unwrap();
    let sources: Vec<_> = resolved.lines.iter().map(|l| l.image.source.clone()).collect();
    assert_eq!(
        sources,
        vec![
            ImageSource::Fallback,
            ImageSource::File(good.clone()),
            ImageSource::File(good),
            ImageSource::Fallback,
            ImageSource::Fallback,
            ImageSource::Fallback,
        ]
    );
    assert_eq!(resolved.lines[2].image.scene.as_deref(), Some("s1"));

    let scenes: Vec<_> = resolved
        .degradations
        .iter()
        .map(|d| match d {
            Degradation::MissingImage { scene, .. } => scene.clone(),
            other => panic!("unexpected degradation {other:?}"),
        })
        .collect();
    assert_eq!(
        scenes,
        vec![
            None,
            Some("s2".to_owned()),
            Some("s3".to_owned()),
            Some("s4".to_owned())
        ]
    );
}

use super::*;
use crate::foundation::error::{ReelError, ReelResult};

struct FixedDecoder {
    secs: f64,
}

impl AudioDecoder for FixedDecoder {
    fn decode(&self, path: &Path, sample_rate: u32) -> ReelResult<AudioPcm> {
        if path.extension().and_then(|s| s.to_str()) == Some("ogg") {
            return Err(ReelError::decode("corrupt stream"));
        }
        Ok(AudioPcm::silence(self.secs, sample_rate))
    }
}

fn touch(dir: &Path, name: &str) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, b"x").unwrap();
    p
}

#[test]
fn candidates_are_filtered_and_sorted_by_name() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "b.wav");
    touch(dir.path(), "a.MP3");
    touch(dir.path(), "notes.txt");
    touch(dir.path(), "c.flac");

    let names: Vec<_> = music_candidates(dir.path())
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.MP3", "b.wav", "c.flac"]);
}

#[test]
fn pick_policies_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["1.wav", "2.wav", "3.wav", "4.wav"] {
        touch(dir.path(), name);
    }
    let src = MusicSource::Dir(dir.path().to_path_buf());

    let first = select_track(&src, MusicPick::First).unwrap();
    assert!(first.ends_with("1.wav"));

    let a = select_track(&src, MusicPick::Seeded(7)).unwrap();
    let b = select_track(&src, MusicPick::Seeded(7)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn bare_directory_path_is_searched() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "only.mp3");
    let src = MusicSource::File(dir.path().to_path_buf());
    assert!(select_track(&src, MusicPick::First).unwrap().ends_with("only.mp3"));
}

#[test]
fn empty_directory_degrades() {
    let dir = tempfile::tempdir().unwrap();
    let src = MusicSource::Dir(dir.path().to_path_buf());
    let err = load_music(&src, MusicPick::First, &FixedDecoder { secs: 1.0 }, 48_000).unwrap_err();
    assert!(matches!(err, Degradation::MusicUnavailable { .. }));
}

#[test]
fn zero_duration_and_corrupt_tracks_degrade() {
    let dir = tempfile::tempdir().unwrap();
    let silent = touch(dir.path(), "silent.wav");
    let corrupt = touch(dir.path(), "corrupt.ogg");

    let err = load_music(
        &MusicSource::File(silent),
        MusicPick::First,
        &FixedDecoder { secs: 0.0 },
        48_000,
    )
    .unwrap_err();
    assert!(matches!(err, Degradation::MusicUnavailable { .. }));

    let err = load_music(
        &MusicSource::File(corrupt),
        MusicPick::First,
        &FixedDecoder { secs: 2.0 },
        48_000,
    )
    .unwrap_err();
    assert!(matches!(err, Degradation::MusicUnavailable { .. }));
}

#[test]
fn loads_music_when_available() {
    let dir = tempfile::tempdir().unwrap();
    let track = touch(dir.path(), "theme.wav");
    let music = load_music(
        &MusicSource::File(track.clone()),
        MusicPick::First,
        &FixedDecoder { secs: 2.0 },
        48_000,
    )
    .unwrap();
    assert_eq!(music.path, track);
    assert!((music.pcm.duration_secs() - 2.0).abs() < 1e-9);
}

#[test]
fn source_deserializes_from_bare_or_tagged_paths() {
    let bare: MusicSource = serde_json::from_str(r#""bgm/theme.mp3""#).unwrap();
    assert_eq!(bare, MusicSource::File(PathBuf::from("bgm/theme.mp3")));
    let dir: MusicSource = serde_json::from_str(r#"{"dir": "bgm"}"#).unwrap();
    assert_eq!(dir, MusicSource::Dir(PathBuf::from("bgm")));

    let resolved = dir.resolved_against(Path::new("/proj"));
    assert_eq!(resolved, MusicSource::Dir(PathBuf::from("/proj/bgm")));
}

use std::path::PathBuf;

use super::*;
use crate::assets::resolver::{ImageAsset, ImageSource, ResolvedLine, SpeechAsset};
use crate::script::model::Line;
use crate::timeline::builder::{TimelineSettings, build_timeline};

const SR: u32 = 1_000;

fn constant_pcm(secs: f64, value: f32) -> AudioPcm {
    let frames = secs_to_samples(secs, SR) as usize;
    AudioPcm {
        sample_rate: SR,
        channels: 2,
        interleaved_f32: vec![value; frames * 2],
    }
}

fn timeline(clips: &[(f64, f32)], gap: f64) -> Timeline {
    let lines: Vec<ResolvedLine> = clips
        .iter()
        .enumerate()
        .map(|(index, &(secs, value))| ResolvedLine {
            index,
            line: Line::new("host", "text"),
            speech: SpeechAsset {
                path: PathBuf::from(format!("{index}.wav")),
                duration_secs: secs,
                pcm: Arc::new(constant_pcm(secs, value)),
            },
            image: ImageAsset {
                scene: None,
                source: ImageSource::Fallback,
            },
        })
        .collect();
    build_timeline(
        &lines,
        TimelineSettings {
            min_segment_duration: 1.0,
            transition_gap: gap,
            show_speaker_name: false,
        },
    )
    .unwrap()
}

fn settings() -> MixSettings {
    MixSettings {
        sample_rate: SR,
        voice_gain: 1.0,
        music_duck_level: 0.05,
        music_fade_in: 0.0,
        music_fade_out: 0.0,
    }
}

fn left(track: &MixedAudioTrack, frame: usize) -> f32 {
    track.samples[frame * 2]
}

#[test]
fn voice_track_spans_total_with_silence_in_padding_and_gaps() {
    let tl = timeline(&[(2.0, 0.5), (0.3, 0.25), (4.0, 0.1)], 0.2);
    let track = mix_timeline(&tl, None, settings()).unwrap();
    assert_eq!(track.frames(), 7_400);
    assert!((track.duration_secs() - tl.total_duration).abs() < 1e-9);

    assert!((left(&track, 0) - 0.5).abs() < 1e-6);
    assert!((left(&track, 1_999) - 0.5).abs() < 1e-6);
    // Gap between line 0 and 1.
    assert_eq!(left(&track, 2_100), 0.0);
    // Line 1 starts at 2.2s and its clip ends 0.3s later; the rest is padding.
    assert!((left(&track, 2_200) - 0.25).abs() < 1e-6);
    assert_eq!(left(&track, 2_600), 0.0);
    assert!((left(&track, 3_400) - 0.1).abs() < 1e-6);
}

#[test]
fn short_music_is_looped_to_total_length() {
    let tl = timeline(&[(2.0, 0.0), (3.0, 0.0)], 0.0);
    let music = LoadedMusic {
        path: PathBuf::from("bgm.wav"),
        pcm: Arc::new(constant_pcm(0.7, 1.0)),
    };
    let track = mix_timeline(&tl, Some(&music), settings()).unwrap();
    assert_eq!(track.frames(), 5_000);
    for frame in [0usize, 699, 700, 2_500, 4_999] {
        assert!(
            (left(&track, frame) - 0.05).abs() < 1e-6,
            "frame {frame} = {}",
            left(&track, frame)
        );
    }
}

#[test]
fn long_music_is_truncated() {
    let tl = timeline(&[(1.0, 0.0)], 0.0);
    let music = LoadedMusic {
        path: PathBuf::from("bgm.wav"),
        pcm: Arc::new(constant_pcm(30.0, 1.0)),
    };
    let track = mix_timeline(&tl, Some(&music), settings()).unwrap();
    assert_eq!(track.frames(), 1_000);
}

#[test]
fn music_fades_out_at_the_end() {
    let tl = timeline(&[(2.0, 0.0)], 0.0);
    let music = LoadedMusic {
        path: PathBuf::from("bgm.wav"),
        pcm: Arc::new(constant_pcm(5.0, 1.0)),
    };
    let mut s = settings();
    s.music_duck_level = 1.0;
    s.music_fade_out = 1.0;
    let track = mix_timeline(&tl, Some(&music), s).unwrap();
    assert!((left(&track, 500) - 1.0).abs() < 1e-6);
    assert!(left(&track, 1_500) < 0.6);
    assert!(left(&track, 1_999) < 0.01);
}

#[test]
fn summed_peaks_are_normalized_not_clipped() {
    let tl = timeline(&[(1.0, 0.9)], 0.0);
    let music = LoadedMusic {
        path: PathBuf::from("bgm.wav"),
        pcm: Arc::new(AudioPcm {
            sample_rate: SR,
            channels: 2,
            interleaved_f32: [0.9f32, 0.9, 0.3, 0.3].repeat(500),
        }),
    };
    let mut s = settings();
    s.music_duck_level = 1.0;
    let track = mix_timeline(&tl, Some(&music), s).unwrap();
    let peak = track.samples.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    assert!((peak - 1.0).abs() < 1e-6);
    // Relative levels survive: 1.8 -> 1.0 and 1.2 -> 1.2/1.8.
    assert!((left(&track, 1) - 1.2 / 1.8).abs() < 1e-4);
}

#[test]
fn mismatched_sample_rate_is_rejected() {
    let tl = timeline(&[(1.0, 0.5)], 0.0);
    let mut s = settings();
    s.sample_rate = 48_000;
    assert!(mix_timeline(&tl, None, s).is_err());
}

#[test]
fn writes_f32le_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/mix.f32le");
    let track = MixedAudioTrack {
        sample_rate: SR,
        channels: 2,
        samples: vec![0.25, -0.5],
    };
    write_mix_to_f32le_file(&track, &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8);
    assert_eq!(f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), -0.5);
}

use std::path::PathBuf;
use std::sync::Arc;

use super::*;
use crate::assets::media::AudioPcm;
use crate::assets::resolver::ImageAsset;
use crate::script::model::Line;

fn resolved(durations: &[f64]) -> Vec<ResolvedLine> {
    durations
        .iter()
        .enumerate()
        .map(|(index, &d)| ResolvedLine {
            index,
            line: Line::new("host", format!("line {index}")).with_speaker_name("Aoi"),
            speech: SpeechAsset {
                path: PathBuf::from(format!("{index}.wav")),
                duration_secs: d,
                pcm: Arc::new(AudioPcm::silence(d, 48_000)),
            },
            image: ImageAsset {
                scene: Some("s1".to_owned()),
                source: ImageSource::Fallback,
            },
        })
        .collect()
}

fn settings(gap: f64) -> TimelineSettings {
    TimelineSettings {
        min_segment_duration: 1.0,
        transition_gap: gap,
        show_speaker_name: false,
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn short_lines_are_padded_to_minimum() {
    let tl = build_timeline(&resolved(&[2.0, 0.3, 4.0]), settings(0.0)).unwrap();
    let durations: Vec<f64> = tl.segments.iter().map(|s| s.duration()).collect();
    assert!(approx(durations[0], 2.0));
    assert!(approx(durations[1], 1.0));
    assert!(approx(durations[2], 4.0));
    assert!(approx(tl.total_duration, 7.0));
    for pair in tl.segments.windows(2) {
        assert_eq!(pair[0].end_time, pair[1].start_time);
    }
}

#[test]
fn gaps_shift_later_segments() {
    let tl = build_timeline(&resolved(&[2.0, 0.3, 4.0]), settings(0.2)).unwrap();
    let starts: Vec<f64> = tl.segments.iter().map(|s| s.start_time).collect();
    assert!(approx(starts[0], 0.0));
    assert!(approx(starts[1], 2.2));
    assert!(approx(starts[2], 3.4));
    assert!(approx(tl.total_duration, 7.4));
    for pair in tl.segments.windows(2) {
        assert!(approx(pair[1].start_time, pair[0].end_time + 0.2));
    }
}

#[test]
fn total_is_sum_of_durations_plus_gaps() {
    let durations = [0.1, 3.25, 1.5, 0.0, 2.75];
    let tl = build_timeline(&resolved(&durations), settings(0.5)).unwrap();
    let sum: f64 = tl.segments.iter().map(|s| s.duration()).sum();
    assert!(approx(tl.total_duration, sum + 0.5 * 4.0));
    for (seg, d) in tl.segments.iter().zip(durations) {
        assert!(seg.duration() >= d.max(1.0) - 1e-12);
    }
}

#[test]
fn empty_input_is_rejected() {
    let err = build_timeline(&[], settings(0.0)).unwrap_err();
    assert!(matches!(err, ReelError::EmptyScript));
}

#[test]
fn negative_gap_is_rejected() {
    assert!(build_timeline(&resolved(&[1.0]), settings(-1.0)).is_err());
}

#[test]
fn identical_inputs_share_a_fingerprint() {
    let a = build_timeline(&resolved(&[2.0, 0.3, 4.0]), settings(0.2)).unwrap();
    let b = build_timeline(&resolved(&[2.0, 0.3, 4.0]), settings(0.2)).unwrap();
    let c = build_timeline(&resolved(&[2.0, 1.4, 4.0]), settings(0.2)).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
}

#[test]
fn locate_finds_segments_gaps_and_end() {
    let tl = build_timeline(&resolved(&[2.0, 0.3, 4.0]), settings(0.2)).unwrap();
    assert_eq!(tl.locate(-1.0), TimelinePosition::Segment(0));
    assert_eq!(tl.locate(0.0), TimelinePosition::Segment(0));
    assert_eq!(tl.locate(1.99), TimelinePosition::Segment(0));
    match tl.locate(2.1) {
        TimelinePosition::Gap { from, to, progress } => {
            assert_eq!((from, to), (0, 1));
            assert!((progress - 0.5).abs() < 1e-6);
        }
        other => panic!("expected gap, got {other:?}"),
    }
    assert_eq!(tl.locate(2.3), TimelinePosition::Segment(1));
    assert_eq!(tl.locate(7.0), TimelinePosition::Segment(2));
    assert_eq!(tl.locate(7.4), TimelinePosition::End);
}

#[test]
fn frame_count_rounds_to_nearest_frame() {
    let fps = Fps::new(24, 1).unwrap();
    let a = build_timeline(&resolved(&[2.0, 0.3, 4.0]), settings(0.0)).unwrap();
    assert_eq!(a.frame_count(fps), 168);
    let b = build_timeline(&resolved(&[2.0, 0.3, 4.0]), settings(0.2)).unwrap();
    assert_eq!(b.frame_count(fps), 178);
}

#[test]
fn speaker_name_prefix_follows_settings() {
    let tl = build_timeline(
        &resolved(&[1.0]),
        TimelineSettings {
            show_speaker_name: true,
            ..settings(0.0)
        },
    )
    .unwrap();
    assert_eq!(tl.segments[0].subtitle, "Aoi: line 0");
}

#[test]
fn json_report_lists_segments() {
    let tl = build_timeline(&resolved(&[2.0, 0.3]), settings(0.0)).unwrap();
    let v: serde_json::Value = serde_json::from_str(&tl.to_json().unwrap()).unwrap();
    assert_eq!(v["segments"].as_array().unwrap().len(), 2);
    assert_eq!(v["total_duration"], 3.0);
    assert_eq!(v["segments"][1]["start_time"], 2.0);
    assert_eq!(v["segments"][0]["image"], "fallback");
    assert!(v["segments"][0]["speech"].get("pcm").is_none());
}

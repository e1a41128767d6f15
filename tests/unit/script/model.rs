use super::*;

#[test]
fn parses_generator_field_names() {
    let script: Script = serde_json::from_str(
        r#"[
            {"role": "host", "name": "Aoi", "text": "Hello", "image_prompt": "a desk"},
            {"speaker_id": "guest", "text": "Hi", "scene_id": "s1"}
        ]"#,
    )
    .unwrap();
    assert_eq!(script.len(), 2);
    assert_eq!(script.lines[0].speaker_id, "host");
    assert_eq!(script.lines[0].speaker_name.as_deref(), Some("Aoi"));
    assert_eq!(script.lines[0].image_prompt.as_deref(), Some("a desk"));
    assert_eq!(script.lines[1].scene_id.as_deref(), Some("s1"));
}

#[test]
fn empty_script_is_rejected() {
    let err = Script::default().ensure_non_empty().unwrap_err();
    assert!(matches!(err, ReelError::EmptyScript));
}

#[test]
fn scene_keys_inherit_previous_scene() {
    let script = Script::new(vec![
        Line::new("a", "intro"),
        Line::new("a", "one").with_scene("s1"),
        Line::new("b", "two"),
        Line::new("a", "three").with_scene("s2"),
        Line::new("b", "four"),
    ]);
    assert_eq!(
        script.scene_keys(),
        vec![
            None,
            Some("s1".to_owned()),
            Some("s1".to_owned()),
            Some("s2".to_owned()),
            Some("s2".to_owned()),
        ]
    );
}

#[test]
fn subtitle_text_prefixes_speaker_name_when_enabled() {
    let line = Line::new("host", "  Good morning ").with_speaker_name("Aoi");
    assert_eq!(line.subtitle_text(false), "Good morning");
    assert_eq!(line.subtitle_text(true), "Aoi: Good morning");

    let silent = Line::new("host", "").with_speaker_name("Aoi");
    assert_eq!(silent.subtitle_text(true), "");
}

use super::*;

fn canvas() -> Canvas {
    Canvas {
        width: 320,
        height: 180,
    }
}

fn style() -> SubtitleStyle {
    SubtitleStyle {
        font_size: 16.0,
        bottom_margin: 10,
        box_color: [0, 0, 0, 255],
        ..SubtitleStyle::default()
    }
}

#[test]
fn blank_text_has_no_overlay() {
    let r = SubtitleRenderer::new(&style(), canvas());
    assert!(r.render("  ").unwrap().is_none());
}

#[test]
fn overlay_sits_in_the_lower_third() {
    let r = SubtitleRenderer::new(&style(), canvas());
    let overlay = r.render("こんにちは").unwrap().unwrap();
    assert_eq!(overlay.width, 320);
    assert_eq!(
        overlay.rgba8_premul.len(),
        overlay.width as usize * overlay.height as usize * 4
    );
    assert!(overlay.y >= 120);
    assert!(overlay.y + i64::from(overlay.height) <= 170);

    // Box is opaque at its left edge area, transparent outside it.
    let px = |x: usize, y: usize| {
        let i = (y * overlay.width as usize + x) * 4;
        overlay.rgba8_premul[i + 3]
    };
    assert_eq!(px(1, overlay.height as usize / 2), 0);
    assert_eq!(px(30, overlay.height as usize / 2), 255);
}

#[test]
fn more_rows_make_a_taller_block() {
    let r = SubtitleRenderer::new(
        &SubtitleStyle {
            max_chars_per_line: 5,
            ..style()
        },
        canvas(),
    );
    let one = r.render("あいう").unwrap().unwrap();
    let three = r.render("あいうえおかきくけこさしすせ").unwrap().unwrap();
    assert!(three.height > one.height);
    assert!(three.y < one.y);
}

#[test]
fn layout_stays_on_canvas() {
    let layout = SubtitleLayout::new(&style(), canvas(), 40);
    assert_eq!(layout.height, 180);
    assert_eq!(layout.top, 0);
}

#[test]
fn unknown_font_family_degrades() {
    let r = SubtitleRenderer::new(
        &SubtitleStyle {
            font_family: "No Such Family 12345".to_owned(),
            ..style()
        },
        canvas(),
    );
    assert_eq!(
        r.font_degradation(),
        Some(&Degradation::FontFallback {
            requested: "No Such Family 12345".to_owned()
        })
    );
    assert!(r.render("still renders").unwrap().is_some());
}

#[test]
fn markup_in_text_is_escaped() {
    assert_eq!(escape_xml(r#"<b>&"'"#), "&lt;b&gt;&amp;&quot;&apos;");
    let r = SubtitleRenderer::new(&style(), canvas());
    assert!(r.render("1 < 2 & </text>").unwrap().is_some());
}

#[test]
fn control_characters_are_dropped() {
    assert_eq!(escape_xml("hello\u{1}world\u{1f}"), "helloworld");
    assert_eq!(escape_xml("tab\there"), "tab\there");
    let r = SubtitleRenderer::new(&style(), canvas());
    assert!(r.render("hello\u{1}world").unwrap().is_some());
}

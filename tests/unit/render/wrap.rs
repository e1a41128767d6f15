use super::*;

#[test]
fn short_text_is_untouched() {
    assert_eq!(wrap_subtitle("こんにちは", 25), vec!["こんにちは"]);
    assert!(wrap_subtitle("   ", 25).is_empty());
}

#[test]
fn prefers_breaking_after_punctuation() {
    assert_eq!(
        wrap_subtitle("こんにちは、今日は晴れ", 10),
        vec!["こんにちは、", "今日は晴れ"]
    );
}

#[test]
fn closing_bracket_never_starts_a_row() {
    let rows = wrap_subtitle("あいうえおかきくけ」こさ", 10);
    assert_eq!(rows, vec!["あいうえおかきく", "け」こさ"]);
}

#[test]
fn opening_bracket_never_ends_a_row() {
    let rows = wrap_subtitle("あいうえおかきく「けこさ", 10);
    assert_eq!(rows, vec!["あいうえおかきく", "「けこさ"]);
}

#[test]
fn latin_text_breaks_at_spaces() {
    assert_eq!(
        wrap_subtitle("the quick brown fox jumps over", 12),
        vec!["the quick", "brown fox", "jumps over"]
    );
}

#[test]
fn unbreakable_runs_are_cut_at_the_limit() {
    let rows = wrap_subtitle(&"ー".repeat(12), 10);
    assert_eq!(rows, vec!["ー".repeat(10), "ー".repeat(2)]);
}

#[test]
fn explicit_newlines_are_kept() {
    assert_eq!(wrap_subtitle("一行目\n二行目", 25), vec!["一行目", "二行目"]);
}

#[test]
fn rows_never_exceed_limit() {
    let text = "吾輩は猫である。名前はまだ無い。どこで生れたかとんと見当がつかぬ。何でも薄暗いじめじめした所でニャーニャー泣いていた事だけは記憶している。";
    for row in wrap_subtitle(text, 12) {
        assert!(row.chars().count() <= 12, "{row}");
        let first = row.chars().next().unwrap();
        assert!(!"。、」』）".contains(first), "{row}");
    }
}

//! Subtitle line breaking with Japanese kinsoku rules.

/// Characters that may not begin a row.
const NO_START: &str = "。、．，！？」』）】〉》・：；ー～…‥っゃゅょぁぃぅぇぉァィゥェォッャュョ";
/// Characters that may not end a row.
const NO_END: &str = "「『（【〈《";
/// Preferred break points; the break goes after them.
const BREAK_AFTER: &str = "。！？、」』）】〉》… ";
/// How far back from the limit a better break point is searched for.
const LOOK_BACK: usize = 10;

/// Wrap `text` into rows of at most `max_chars` characters.
///
/// Explicit newlines always break. Within a paragraph the break is moved back (up to ten
/// characters) to just after punctuation or a space, never leaving a forbidden character at the
/// start or end of a row. Rows that cannot be broken legally are cut at the limit.
pub fn wrap_subtitle(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    text.lines()
        .flat_map(|paragraph| wrap_paragraph(paragraph.trim(), max_chars))
        .filter(|row| !row.is_empty())
        .collect()
}

fn wrap_paragraph(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return vec![text.to_owned()];
    }

    let mut rows = Vec::new();
    let mut current: Vec<char> = Vec::with_capacity(max_chars + 1);
    for &c in &chars {
        current.push(c);
        if current.len() < max_chars {
            continue;
        }

        match find_break(&current) {
            Some(at) => {
                let rest = current.split_off(at);
                rows.push(finish_row(&current));
                current = rest;
                while current.first().is_some_and(|c| *c == ' ') {
                    current.remove(0);
                }
            }
            None => {
                rows.push(finish_row(&current));
                current.clear();
            }
        }
    }
    if !current.is_empty() {
        rows.push(finish_row(&current));
    }
    rows
}

/// Index where the next row should start, or `None` to cut at the end of `row`.
fn find_break(row: &[char]) -> Option<usize> {
    let len = row.len();
    let lowest = len.saturating_sub(LOOK_BACK) + 1;
    let mut best = None;
    for j in (lowest..len.saturating_sub(1)).rev() {
        let (curr, next) = (row[j], row[j + 1]);
        if NO_START.contains(next) || NO_END.contains(curr) {
            continue;
        }
        if BREAK_AFTER.contains(curr) {
            return Some(j + 1);
        }
        if best.is_none() {
            best = Some(j + 1);
        }
    }
    best
}

fn finish_row(chars: &[char]) -> String {
    chars.iter().collect::<String>().trim_end().to_owned()
}

#[cfg(test)]
#[path = "../../tests/unit/render/wrap.rs"]
mod tests;

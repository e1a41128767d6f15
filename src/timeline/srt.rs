use crate::timeline::builder::Timeline;

/// `HH:MM:SS,mmm` as used by SubRip.
pub fn format_srt_time(secs: f64) -> String {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let s = (total_ms / 1000) % 60;
    let m = (total_ms / 60_000) % 60;
    let h = total_ms / 3_600_000;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

impl Timeline {
    /// Render the subtitles as a SubRip document. Segments without text are skipped.
    pub fn to_srt(&self) -> String {
        let mut out = String::new();
        let mut n = 0usize;
        for seg in self.segments.iter().filter(|s| !s.subtitle.trim().is_empty()) {
            n += 1;
            out.push_str(&format!(
                "{n}\n{} --> {}\n{}\n\n",
                format_srt_time(seg.start_time),
                format_srt_time(seg.end_time),
                seg.subtitle.trim()
            ));
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/srt.rs"]
mod tests;

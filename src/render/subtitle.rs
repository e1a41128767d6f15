use std::fmt::Write as _;
use std::sync::Arc;

use crate::assets::fonts::{build_subtitle_fontdb, has_family, make_font_resolver};
use crate::config::SubtitleStyle;
use crate::foundation::core::Canvas;
use crate::foundation::error::{Degradation, ReelError, ReelResult};
use crate::render::wrap::wrap_subtitle;

/// Rasterized subtitle block, positioned on the output canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct SubtitleOverlay {
    /// Left edge on the canvas.
    pub x: i64,
    /// Top edge on the canvas.
    pub y: i64,
    /// Overlay width in pixels.
    pub width: u32,
    /// Overlay height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 pixels.
    pub rgba8_premul: Vec<u8>,
}

/// Turns subtitle text into overlays using `resvg`.
pub struct SubtitleRenderer {
    style: SubtitleStyle,
    canvas: Canvas,
    fontdb: Arc<usvg::fontdb::Database>,
    font_fallback: Option<Degradation>,
}

impl std::fmt::Debug for SubtitleRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubtitleRenderer")
            .field("font_family", &self.style.font_family)
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

impl SubtitleRenderer {
    /// Load fonts and check that the configured family is installed.
    pub fn new(style: &SubtitleStyle, canvas: Canvas) -> Self {
        let fontdb = build_subtitle_fontdb(&style.font_dirs);
        let font_fallback = if has_family(&fontdb, &style.font_family) {
            None
        } else {
            tracing::warn!(
                requested = %style.font_family,
                "subtitle font not installed, falling back to the default face"
            );
            Some(Degradation::FontFallback {
                requested: style.font_family.clone(),
            })
        };
        Self {
            style: style.clone(),
            canvas,
            fontdb,
            font_fallback,
        }
    }

    /// Degradation recorded when the configured family was unavailable.
    pub fn font_degradation(&self) -> Option<&Degradation> {
        self.font_fallback.as_ref()
    }

    /// Rasterize `text`. Blank text yields `None`.
    pub fn render(&self, text: &str) -> ReelResult<Option<SubtitleOverlay>> {
        let rows = wrap_subtitle(text, self.style.max_chars_per_line);
        if rows.is_empty() {
            return Ok(None);
        }

        let layout = SubtitleLayout::new(&self.style, self.canvas, rows.len());
        let svg = subtitle_svg(&self.style, &layout, &rows);

        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            font_resolver: make_font_resolver(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts)
            .map_err(|e| ReelError::validation(format!("subtitle svg rejected: {e}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(layout.width, layout.height)
            .ok_or_else(|| ReelError::validation("failed to allocate subtitle pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        Ok(Some(SubtitleOverlay {
            x: 0,
            y: layout.top,
            width: layout.width,
            height: layout.height,
            rgba8_premul: pixmap.take(),
        }))
    }
}

/// Geometry of one subtitle block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SubtitleLayout {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) top: i64,
    pub(crate) line_height: f32,
    pub(crate) padding: f32,
}

impl SubtitleLayout {
    pub(crate) fn new(style: &SubtitleStyle, canvas: Canvas, rows: usize) -> Self {
        let line_height = style.font_size * 1.4;
        let padding = style.font_size * 0.5;
        let height = ((rows as f32) * line_height + 2.0 * padding).ceil().max(1.0) as u32;
        let height = height.min(canvas.height);

        // Bottom-anchored, but never above the lower third unless the block is taller than it.
        let bottom = i64::from(canvas.height) - i64::from(style.bottom_margin);
        let lower_third = i64::from(canvas.height) * 2 / 3;
        let top = (bottom - i64::from(height))
            .max(lower_third.min(i64::from(canvas.height) - i64::from(height)))
            .max(0);

        Self {
            width: canvas.width,
            height,
            top,
            line_height,
            padding,
        }
    }
}

fn subtitle_svg(style: &SubtitleStyle, layout: &SubtitleLayout, rows: &[String]) -> String {
    let w = layout.width as f32;
    let box_x = w * 0.05;
    let box_w = w * 0.9;
    let [br, bg, bb, ba] = style.box_color;
    let [tr, tg, tb, ta] = style.text_color;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
        layout.width, layout.height
    );
    let _ = write!(
        svg,
        r#"<rect x="{box_x:.1}" y="0" width="{box_w:.1}" height="{}" rx="{:.1}" fill="rgb({br},{bg},{bb})" fill-opacity="{:.3}"/>"#,
        layout.height,
        layout.padding * 0.6,
        f32::from(ba) / 255.0
    );
    let _ = write!(
        svg,
        r#"<text font-family="'{}', sans-serif" font-size="{:.1}" fill="rgb({tr},{tg},{tb})" fill-opacity="{:.3}" text-anchor="middle">"#,
        escape_xml(&style.font_family),
        style.font_size,
        f32::from(ta) / 255.0
    );
    for (i, row) in rows.iter().enumerate() {
        let baseline = layout.padding + layout.line_height * (i as f32) + style.font_size * 1.1;
        let _ = write!(
            svg,
            r#"<tspan x="{:.1}" y="{baseline:.1}">{}</tspan>"#,
            w / 2.0,
            escape_xml(row)
        );
    }
    svg.push_str("</text></svg>");
    svg
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Not representable in XML 1.0.
            '\u{0}'..='\u{8}'
            | '\u{b}'
            | '\u{c}'
            | '\u{e}'..='\u{1f}'
            | '\u{fffe}'
            | '\u{ffff}' => {}
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/subtitle.rs"]
mod tests;

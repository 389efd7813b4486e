//! Visible watermark overlay.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// Appearance of the overlay tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayStyle {
    pub tile_width: u32,
    pub tile_height: u32,
    pub font_size: u32,
    pub font_family: String,
    pub color: String,
    pub opacity: f32,
    /// Degrees, negative is counter-clockwise.
    pub rotation: i32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            tile_width: 320,
            tile_height: 200,
            font_size: 14,
            font_family: "sans-serif".to_string(),
            color: "#808080".to_string(),
            opacity: 0.12,
            rotation: -30,
        }
    }
}

/// Renders `text` as a tiled overlay image with the default style.
///
/// Returns a `data:image/svg+xml;base64,...` URI for use as a CSS
/// background.
pub fn render_watermark_overlay(text: &str) -> String {
    render_watermark_overlay_with(text, &OverlayStyle::default())
}

pub fn render_watermark_overlay_with(text: &str, style: &OverlayStyle) -> String {
    let cx = style.tile_width / 2;
    let cy = style.tile_height / 2;
    let svg = format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">"#,
            r#"<text x="{cx}" y="{cy}" text-anchor="middle" dominant-baseline="middle" "#,
            r#"font-family="{family}" font-size="{size}" fill="{color}" fill-opacity="{opacity}" "#,
            r#"transform="rotate({rotation} {cx} {cy})">{text}</text></svg>"#
        ),
        w = style.tile_width,
        h = style.tile_height,
        cx = cx,
        cy = cy,
        family = escape_xml(&style.font_family),
        size = style.font_size,
        color = escape_xml(&style.color),
        opacity = style.opacity.clamp(0.0, 1.0),
        rotation = style.rotation,
        text = escape_xml(text),
    );
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

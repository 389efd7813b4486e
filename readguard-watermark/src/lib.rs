//! Forensic watermarking for rendered text.
//!
//! Two independent marks:
//! - An invisible one: payload bits hidden between words as zero-width
//!   characters. Survives copy-paste of plain text, so a leaked excerpt
//!   can be traced back to a reader.
//! - A visible one: a tiled SVG overlay with the reader's identity. Purely
//!   a deterrent; nothing is recovered from it.
//!
//! Extraction is best effort. Re-flowing or editing the text, or running it
//! through anything that drops zero-width characters, loses the mark.

mod error;
mod invisible;
mod overlay;
mod payload;

pub use error::{WatermarkError, WatermarkResult};
pub use invisible::{
    embed_watermark, extract_watermark, has_watermark, strip_watermark, ONE_MARKER, ZERO_MARKER,
};
pub use overlay::{render_watermark_overlay, render_watermark_overlay_with, OverlayStyle};
pub use payload::{ForensicPayload, TOKEN_PREFIX_LEN};

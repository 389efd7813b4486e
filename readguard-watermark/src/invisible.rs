//! Zero-width character watermark.
//!
//! Bits are written as INVISIBLE TIMES and INVISIBLE SEPARATOR. Both are
//! default-ignorable and do not occur in prose, so joiners and spaces that
//! scripts such as Persian or Thai depend on pass through untouched.

use tracing::debug;

/// Encodes a 0 bit.
pub const ZERO_MARKER: char = '\u{2062}';

/// Encodes a 1 bit.
pub const ONE_MARKER: char = '\u{2063}';

fn is_marker(c: char) -> bool {
    c == ZERO_MARKER || c == ONE_MARKER
}

fn payload_bits(payload: &str) -> Vec<bool> {
    payload
        .bytes()
        .flat_map(|byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
        .collect()
}

fn marker(bit: bool) -> char {
    if bit { ONE_MARKER } else { ZERO_MARKER }
}

/// Removes every marker character from `content`.
pub fn strip_watermark(content: &str) -> String {
    content.chars().filter(|&c| !is_marker(c)).collect()
}

/// True if `content` carries at least one full byte of markers.
pub fn has_watermark(content: &str) -> bool {
    content.chars().filter(|&c| is_marker(c)).count() >= 8
}

/// Hides `payload` in `content`.
///
/// One marker is placed after every `stride`-th word, where
/// `stride = max(1, words / bits)`. Bits left over once the words run out
/// go after the final word. Any existing watermark is removed first.
pub fn embed_watermark(content: &str, payload: &str) -> String {
    let clean = strip_watermark(content);
    let bits = payload_bits(payload);
    if bits.is_empty() {
        return clean;
    }

    let words: Vec<&str> = clean.split(' ').collect();
    let stride = (words.len() / bits.len()).max(1);
    let mut bits = bits.into_iter();
    let mut out = String::with_capacity(clean.len() + bits.len() * ONE_MARKER.len_utf8());

    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(word);
        if i % stride == 0 {
            if let Some(bit) = bits.next() {
                out.push(marker(bit));
            }
        }
    }
    out.extend(bits.map(marker));

    debug!(words = words.len(), stride, "Embedded watermark");
    out
}

/// Recovers a payload hidden by [`embed_watermark`].
///
/// Returns `None` when fewer than 8 markers are present. Trailing bits that
/// do not fill a byte are ignored; invalid UTF-8 is replaced.
pub fn extract_watermark(content: &str) -> Option<String> {
    let bits: Vec<bool> = content
        .chars()
        .filter(|&c| is_marker(c))
        .map(|c| c == ONE_MARKER)
        .collect();
    if bits.len() < 8 {
        return None;
    }

    let bytes: Vec<u8> = bits
        .chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit)))
        .collect();
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

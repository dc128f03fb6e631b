// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Extent handling: parsing the packed blob the trigram index emits,
//! merging overlapping spans, and wrapping line text with highlight
//! markers.
//!
//! An extent is a half-open byte range `(start, end)` within a line.
//! Spans outside the line clip away, and marker insertion snaps to char
//! boundaries so a span that lands mid-codepoint can never split a
//! character.
//!

use crate::MyError;
use encoding_rs::Encoding;

/// Parse the trigram index's extents blob: packed little-endian `u32`
/// pairs, one `(start, end)` per match. A trailing partial chunk is
/// ignored.
pub(crate) fn parse_extents(blob: &[u8]) -> Vec<(u32, u32)> {
    blob.chunks_exact(8)
        .map(|c| {
            (
                u32::from_le_bytes([c[0], c[1], c[2], c[3]]),
                u32::from_le_bytes([c[4], c[5], c[6], c[7]]),
            )
        })
        .collect()
}

/// Sort the spans and merge every overlapping or contained pair into a
/// single outer span. Empty and inverted spans are dropped.
pub(crate) fn merge_extents(mut extents: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    extents.retain(|(s, e)| e > s);
    extents.sort_unstable();
    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(extents.len());
    for (start, end) in extents {
        match merged.last_mut() {
            // overlap w/ the previous span, extend it...
            Some((_, last_end)) if start < *last_end => *last_end = (*last_end).max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Decode line bytes using the file's declared encoding label. An unknown
/// label or a malformed byte sequence raises [`MyError::Encoding`] so the
/// caller can skip the line and carry on.
pub(crate) fn decode(bytes: &[u8], label: &str) -> Result<String, MyError> {
    let encoding =
        Encoding::for_label(label.as_bytes()).ok_or_else(|| MyError::Encoding(label.to_owned()))?;
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(MyError::Encoding(label.to_owned()));
    }
    Ok(text.into_owned())
}

// largest char boundary <= i, clamped to the text...
fn floor_boundary(text: &str, i: usize) -> usize {
    let mut i = i.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Wrap each extent span of `text` with the `open`/`close` markers.
/// Overlapping or contained extents are merged into a single outer span
/// first, so markers never nest; an empty extent set is the identity.
pub fn highlight_line(text: &str, extents: &[(u32, u32)], open: &str, close: &str) -> String {
    let merged = merge_extents(extents.to_vec());
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for (start, end) in merged {
        let start = floor_boundary(text, start as usize);
        let end = floor_boundary(text, end as usize);
        if start >= text.len() || end <= start {
            continue; // clipped away
        }
        out.push_str(&text[cursor..start.max(cursor)]);
        out.push_str(open);
        out.push_str(&text[start.max(cursor)..end]);
        out.push_str(close);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

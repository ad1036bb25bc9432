//! Quote record codec for the file backends
//!
//! A record is a flat JSON object with `id`, `content` and `author` in that
//! order, tab-indented:
//!
//! ```text
//! {
//! 	"id": 1,
//! 	"content": "...",
//! 	"author": "..."
//! }
//! ```
//!
//! A collection is an array of such objects. Decoding never fails loudly: text
//! that is not a record decodes to `None`.

use quotes_core::Quote;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::value::RawValue;

use crate::error::Result;

fn to_tabbed<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Encode one record as a standalone unit, newline terminated
pub fn encode(quote: &Quote) -> Result<String> {
    let mut text = to_tabbed(quote)?;
    text.push('\n');
    Ok(text)
}

/// Encode a whole collection as one array unit, preserving order
pub fn encode_collection(quotes: &[Quote]) -> Result<String> {
    to_tabbed(quotes)
}

/// Decode one record; blank or malformed text yields `None`
pub fn decode(text: &str) -> Option<Quote> {
    if text.trim().is_empty() {
        return None;
    }
    serde_json::from_str(text).ok()
}

/// Split an array unit into the raw text of each element.
///
/// Returns `None` when the text is not an array at all.
pub fn split_segments(text: &str) -> Option<Vec<Box<RawValue>>> {
    serde_json::from_str(text).ok()
}

/// Decode an array unit record by record.
///
/// Elements that do not decode are dropped; `None` when the text is not an
/// array.
pub fn decode_collection(text: &str) -> Option<Vec<Quote>> {
    let segments = split_segments(text)?;
    Some(segments.iter().filter_map(|s| decode(s.get())).collect())
}

//! Text decoding for uploaded tables.
//!
//! UTF-8 (with or without byte-order mark) is tried first, then a configured
//! fallback such as CP949 for Korean exports.

use crate::{Error, Result};
use encoding_rs::Encoding;
use std::borrow::Cow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode raw bytes into text.
pub fn decode<'a>(bytes: &'a [u8], fallback_label: &str) -> Result<Cow<'a, str>> {
    let without_bom = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(without_bom) {
        return Ok(Cow::Borrowed(text));
    }

    let fallback = Encoding::for_label(fallback_label.as_bytes()).ok_or_else(|| {
        Error::FileFormat(format!("unknown fallback encoding: {}", fallback_label))
    })?;

    match fallback.decode_without_bom_handling_and_without_replacement(without_bom) {
        Some(text) => {
            tracing::warn!("Input is not UTF-8, decoded as {}", fallback.name());
            Ok(text)
        }
        None => Err(Error::FileFormat(format!(
            "unreadable encoding: input is neither UTF-8 nor {}",
            fallback.name()
        ))),
    }
}

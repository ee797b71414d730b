//! Low-level byte reading and text helpers.

use std::io::{Error as IoError, ErrorKind as IoErrorKind};

use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::UTF_8;

use super::types::error::{Result, VceError};

/// Splits `len` bytes off the front of `reader` without copying.
///
/// Fails with `UnexpectedEof` when fewer than `len` bytes remain.
pub fn take<'a>(reader: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
    if reader.len() < len {
        return Err(VceError::Io(IoError::new(
            IoErrorKind::UnexpectedEof,
            format!("need {} bytes, only {} remain", len, reader.len()),
        )));
    }
    let (head, tail) = reader.split_at(len);
    *reader = tail;
    Ok(head)
}

/// Advances `reader` past `len` bytes that carry no meaning for the decoder.
pub fn skip(reader: &mut &[u8], len: usize) -> Result<()> {
    take(reader, len).map(|_| ())
}

/// Reads a little-endian `i32` item count; negative counts are rejected.
pub fn read_count(reader: &mut &[u8], what: &str) -> Result<usize> {
    let count = reader.read_i32::<LittleEndian>()?;
    usize::try_from(count)
        .map_err(|_| VceError::InvalidFormat(format!("Negative {} count: {}", what, count)))
}

/// Returns true for bytes that are control characters when read as a single
/// UTF-16 code unit (C0, DEL and C1 ranges).
fn is_control_byte(byte: u8) -> bool {
    byte < 0x20 || (0x7F..=0x9F).contains(&byte)
}

/// Decodes field bytes as UTF-8 after dropping every control byte.
///
/// The filter runs on raw bytes, before decoding, so it also drops bytes in
/// 0x80..=0x9F that would otherwise continue a multi-byte sequence.
pub fn decode_text(bytes: &[u8]) -> String {
    let filtered: Vec<u8> = bytes.iter().copied().filter(|&b| !is_control_byte(b)).collect();
    let (text, _) = UTF_8.decode_without_bom_handling(&filtered);
    text.into_owned()
}

/// [`decode_text`] followed by removal of any remaining NUL characters.
pub fn decode_plain_text(bytes: &[u8]) -> String {
    decode_text(bytes).replace('\0', "")
}

/// Removes every leading and trailing repetition of `pattern`.
pub fn trim_repeated<'s>(text: &'s str, pattern: &str) -> &'s str {
    if pattern.is_empty() {
        return text;
    }
    let mut result = text;
    while let Some(rest) = result.strip_prefix(pattern) {
        result = rest;
    }
    while let Some(rest) = result.strip_suffix(pattern) {
        result = rest;
    }
    result
}

/// Drops `count` trailing bytes, yielding an empty slice when fewer remain.
pub fn drop_tail(bytes: &[u8], count: usize) -> &[u8] {
    &bytes[..bytes.len().saturating_sub(count)]
}

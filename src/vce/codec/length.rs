//! Obfuscated length prefixes.
//!
//! Every variable-length field is preceded by 5 bytes: a seed byte followed by
//! the 4 little-endian length bytes, each XOR-mixed with a rolling state.
//!
//! # Transform
//! ```text
//! state = (0x80 + ((seed ^ (seed ^ 0x80)) & 0xff)) | 0
//! for i in 1..=4:
//!     out[i-1] = (state ^ raw) & 0xff
//!     state    = (state + ((raw ^ (state ^ raw)) & 0xff)) | i
//! ```
//! The mixing terms cancel the raw byte out of the next state, so the
//! keystream is the same for every field. It is still computed step by step
//! so that the decoder stays a literal rendition of the wire transform.

use byteorder::ReadBytesExt;
use log::trace;

use crate::vce::types::error::{Result, VceError};
use crate::vce::utils;

/// Number of bytes a length prefix occupies on the wire.
pub const PREFIX_LEN: usize = 5;

#[inline]
fn mix_xor(a: u32, b: u32) -> u32 {
    (a ^ b) & 0xff
}

#[inline]
fn mix_or(a: u32, b: u32, counter: u32) -> u32 {
    a.wrapping_add(b) | counter
}

fn initial_state(seed: u8) -> u32 {
    let seed = seed as u32;
    mix_or(0x80, mix_xor(seed, seed ^ 0x80), 0)
}

/// Decodes one obfuscated length prefix and advances `reader` past it.
///
/// The result is signed because the writer stores a signed 32-bit value;
/// callers decide how to treat negative lengths.
pub fn decode_length(reader: &mut &[u8]) -> Result<i32> {
    let seed = reader.read_u8()?;
    let mut state = initial_state(seed);
    let mut out = [0u8; 4];

    for (i, slot) in out.iter_mut().enumerate() {
        let raw = reader.read_u8()? as u32;
        *slot = ((state ^ raw) & 0xff) as u8;
        let carry = mix_xor(raw, state ^ raw);
        state = mix_or(state, carry, i as u32 + 1);
    }

    let length = i32::from_le_bytes(out);
    trace!("Decoded length prefix: seed={:#04x}, length={}", seed, length);
    Ok(length)
}

/// Encodes `length` as a 5-byte obfuscated prefix using `seed` as first byte.
///
/// This is the inverse of [`decode_length`], used by writers and tests.
pub fn encode_length(length: i32, seed: u8) -> [u8; PREFIX_LEN] {
    let mut encoded = [0u8; PREFIX_LEN];
    encoded[0] = seed;
    let mut state = initial_state(seed);

    for (i, byte) in length.to_le_bytes().iter().enumerate() {
        let raw = (state ^ *byte as u32) & 0xff;
        encoded[i + 1] = raw as u8;
        let carry = mix_xor(raw, state ^ raw);
        state = mix_or(state, carry, i as u32 + 1);
    }

    encoded
}

/// Reads a length-prefixed field verbatim (no decryption).
///
/// Only the two key arrays at the top of the container are stored this way.
pub fn read_raw_array(reader: &mut &[u8]) -> Result<Vec<u8>> {
    let length = decode_length(reader)?;
    let length = usize::try_from(length)
        .map_err(|_| VceError::InvalidFormat(format!("Negative raw array length: {}", length)))?;
    Ok(utils::take(reader, length)?.to_vec())
}

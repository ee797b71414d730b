//! Field decryption for VCE containers.
//!
//! Encrypted fields are laid out as:
//! ```text
//! [5 bytes]  obfuscated length (covers everything below)
//! [1 byte ]  key selector: < 0x80 in-file keys, >= 0x80 caller decrypt keys
//! [4 bytes]  key offset into the selected buffer (version >= 61 only)
//! [N bytes]  AES-256-CBC ciphertext, no padding
//! ```
//! The AES key is `keys[offset..offset + 32]`, the IV `keys[offset + 32..offset + 48]`.

use aes::Aes256;
use byteorder::{LittleEndian, ReadBytesExt};
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use log::trace;

use super::length;
use crate::vce::types::error::{Result, VceError};
use crate::vce::types::models::FormatVersion;
use crate::vce::utils;

const AES_BLOCK_LEN: usize = 16;
const AES_KEY_LEN: usize = 32;
const SELECTOR_DECRYPT_KEYS: u8 = 0x80;

/// Which key buffer a field selector points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySlot {
    /// The key material stored inside the container.
    Encrypt,
    /// The caller-supplied decrypt key material.
    Decrypt,
}

impl From<u8> for KeySlot {
    fn from(selector: u8) -> Self {
        if selector < SELECTOR_DECRYPT_KEYS {
            KeySlot::Encrypt
        } else {
            KeySlot::Decrypt
        }
    }
}

/// Decrypts length-prefixed fields with one of two key buffers.
#[derive(Debug, Clone, Copy)]
pub struct FieldDecryptor<'k> {
    version: FormatVersion,
    encrypt_keys: &'k [u8],
    decrypt_keys: &'k [u8],
}

impl<'k> FieldDecryptor<'k> {
    pub fn new(version: FormatVersion, encrypt_keys: &'k [u8], decrypt_keys: &'k [u8]) -> Self {
        Self {
            version,
            encrypt_keys,
            decrypt_keys,
        }
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Returns the key buffer for `selector`, failing when it is empty.
    pub fn select_keys(&self, selector: u8) -> Result<&'k [u8]> {
        let keys = match KeySlot::from(selector) {
            KeySlot::Encrypt => self.encrypt_keys,
            KeySlot::Decrypt => self.decrypt_keys,
        };
        if keys.is_empty() {
            return Err(VceError::MissingKey { selector });
        }
        Ok(keys)
    }

    /// Reads one encrypted field and returns its plaintext.
    ///
    /// A zero length yields an empty buffer without touching key material.
    pub fn read_encrypted(&self, reader: &mut &[u8]) -> Result<Vec<u8>> {
        let declared = length::decode_length(reader)?;
        if declared == 0 {
            return Ok(Vec::new());
        }

        // One unit of the length is the selector byte itself.
        let mut remaining = i64::from(declared) - 1;
        let selector = reader.read_u8()?;
        let keys = self.select_keys(selector)?;

        let mut offset = 0i32;
        if self.version.has_key_offset() {
            remaining -= 4;
            offset = reader.read_i32::<LittleEndian>()?;
        }

        let remaining = usize::try_from(remaining).map_err(|_| {
            VceError::InvalidFormat(format!("Encrypted field length {} is too small", declared))
        })?;
        let offset = usize::try_from(offset)
            .map_err(|_| VceError::InvalidFormat(format!("Negative key offset: {}", offset)))?;

        trace!(
            "Decrypting field: selector={:#04x}, slot={:?}, offset={}, {} bytes",
            selector,
            KeySlot::from(selector),
            offset,
            remaining
        );

        let (key, iv) = derive_key_iv(keys, offset)?;
        let ciphertext = utils::take(reader, remaining)?;
        decrypt_aes256_cbc(ciphertext, key, iv)
    }
}

/// Slices the AES key and IV out of `keys` starting at `offset`.
pub fn derive_key_iv(keys: &[u8], offset: usize) -> Result<(&[u8], &[u8])> {
    let end = offset
        .checked_add(AES_KEY_LEN + AES_BLOCK_LEN)
        .filter(|&end| end <= keys.len())
        .ok_or(VceError::KeyTooShort {
            offset,
            available: keys.len(),
        })?;
    let material = &keys[offset..end];
    Ok(material.split_at(AES_KEY_LEN))
}

/// Decrypts AES-256-CBC ciphertext without removing any padding.
///
/// The ciphertext must be a whole number of 16-byte blocks.
pub fn decrypt_aes256_cbc(ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() % AES_BLOCK_LEN != 0 {
        return Err(VceError::DecryptionError(format!(
            "ciphertext length must be a multiple of 16 bytes, got {}",
            ciphertext.len()
        )));
    }
    let decryptor = cbc::Decryptor::<Aes256>::new_from_slices(key, iv).map_err(|_| {
        VceError::DecryptionError(format!(
            "invalid AES key/IV lengths {}/{}; expected 32/16",
            key.len(),
            iv.len()
        ))
    })?;

    let mut plaintext = ciphertext.to_vec();
    decryptor
        .decrypt_padded_mut::<NoPadding>(&mut plaintext)
        .map_err(|e| VceError::DecryptionError(format!("AES-CBC decryption failed: {}", e)))?;
    Ok(plaintext)
}

//! Codec layer for length prefixes and field decryption.
//!
//! # Submodules
//!
//! - [`length`][]: obfuscated 4-byte length prefixes
//! - [`crypto`][]: key selection and AES-256-CBC field decryption

pub mod crypto;
pub mod length;

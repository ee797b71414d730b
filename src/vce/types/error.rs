//! Custom error types for the vce-reader crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
///
/// Every error aborts the current parse. No partial document tree is ever
/// returned alongside an error.
#[derive(Debug, Error)]
pub enum VceError {
    /// An error originating from I/O operations, including reads past the end
    /// of a truncated container or field.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The container does not start with the `0x85 0xA8` magic.
    #[error("Invalid magic: expected 85 a8, found {found:02x?}")]
    InvalidMagic { found: [u8; 2] },

    /// The trailing length field disagrees with the size of the input buffer.
    #[error("File length mismatch: trailer declares {declared} bytes, buffer holds {actual}")]
    LengthMismatch { declared: i64, actual: u64 },

    /// A discriminant byte on the wire is outside the known set.
    #[error("Unknown {kind} type: {value}")]
    UnknownType { kind: &'static str, value: i64 },

    /// The file is structurally invalid.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The key buffer chosen by a field's selector byte is empty.
    #[error("Key material for selector {selector:#04x} is empty")]
    MissingKey { selector: u8 },

    /// The key buffer is too short to slice a 32-byte key and a 16-byte IV.
    #[error("Key material too short: need 48 bytes from offset {offset}, have {available}")]
    KeyTooShort { offset: usize, available: usize },

    /// AES decryption failed, usually due to a ciphertext that is not block aligned.
    #[error("Decryption failed: {0}")]
    DecryptionError(String),

    /// A format directive matched a pattern with an unsupported number of fields.
    #[error("Unrecognized format directive with {fields} fields: {directive:?}")]
    PatternError { fields: usize, directive: String },

    /// The image capability could not decode, crop or re-encode a bitmap.
    #[error("Image processing failed: {0}")]
    ImageError(String),
}

/// Coarse classification of a [`VceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad magic, bad trailer, unknown discriminants, truncated data.
    Format,
    /// Required key buffer empty or too short.
    Key,
    /// AES failure.
    Crypto,
    /// Format directive field count outside {0, 6, 7, 10}.
    Pattern,
    /// Failure inside the image crop capability.
    Image,
}

impl VceError {
    /// Returns the taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VceError::Io(_)
            | VceError::InvalidMagic { .. }
            | VceError::LengthMismatch { .. }
            | VceError::UnknownType { .. }
            | VceError::InvalidFormat(_) => ErrorKind::Format,
            VceError::MissingKey { .. } | VceError::KeyTooShort { .. } => ErrorKind::Key,
            VceError::DecryptionError(_) => ErrorKind::Crypto,
            VceError::PatternError { .. } => ErrorKind::Pattern,
            VceError::ImageError(_) => ErrorKind::Image,
        }
    }
}

/// A convenience `Result` type alias using the crate's `VceError` type.
pub type Result<T> = std::result::Result<T, VceError>;

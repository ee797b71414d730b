use std::fmt;
use std::fs;
use std::path::Path;

use log::info;

use super::format::container;
use super::formatting::image::{ImageCropper, PngCropper};
use super::types::error::Result;
use super::types::models::FileContainer;

/// The main reader for VCE exam containers.
///
/// Holds the caller's key material and the image capability used to crop
/// drag-and-drop areas. A reader carries no per-file state, so one instance
/// can decode any number of files.
pub struct VceReader {
    encrypt_keys: Vec<u8>,
    decrypt_keys: Vec<u8>,
    cropper: Box<dyn ImageCropper>,
}

impl VceReader {
    /// Creates a reader with the given key buffers and the default PNG cropper.
    ///
    /// # Arguments
    /// * `encrypt_keys` - Key buffer labelled "encrypt"
    /// * `decrypt_keys` - Key buffer for fields whose selector byte is >= 0x80
    pub fn new(encrypt_keys: impl Into<Vec<u8>>, decrypt_keys: impl Into<Vec<u8>>) -> Self {
        Self {
            encrypt_keys: encrypt_keys.into(),
            decrypt_keys: decrypt_keys.into(),
            cropper: Box::new(PngCropper),
        }
    }

    /// Replaces the image capability used for drag-and-drop areas.
    pub fn with_cropper(mut self, cropper: Box<dyn ImageCropper>) -> Self {
        self.cropper = cropper;
        self
    }

    /// Decodes a container held in memory.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The magic or the trailing length is wrong
    /// - A type discriminant is unknown
    /// - A selected key buffer is empty or too short
    /// - A field fails to decrypt or a format directive is unrecognized
    pub fn read_bytes(&self, data: &[u8]) -> Result<FileContainer> {
        info!("Decoding VCE container: {} bytes", data.len());
        container::parse(data, &self.encrypt_keys, &self.decrypt_keys, self.cropper.as_ref())
    }

    /// Reads and decodes a container file.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<FileContainer> {
        let path = path.as_ref();
        info!("Opening VCE file: {}", path.display());
        let data = fs::read(path)?;
        self.read_bytes(&data)
    }
}

impl fmt::Debug for VceReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VceReader")
            .field("encrypt_keys", &self.encrypt_keys.len())
            .field("decrypt_keys", &self.decrypt_keys.len())
            .finish_non_exhaustive()
    }
}

//! Container header, file information and trailer parsing.
//!
//! # Layout
//! ```text
//! [2 bytes]  magic 0x85 0xA8
//! [2 bytes]  version digits
//! [4 bytes]  reserved
//! [raw]      in-file key material
//! [raw]      reserved array
//! [1 byte ]  reserved
//! [enc]      number, title
//! [8 bytes]  passing score (i32), time limit (i32)
//! [enc]      file version
//! [16 bytes] reserved
//! [...]      legacy block (version <= 61): 16 + 2 bytes, one encrypted field
//! [enc]      styles, description (unused)
//! [...]      global sections: count, { id: i32, name: enc } * count
//! [enc]      unused
//! [...]      exams: count, exam * count
//! [4 bytes]  total file length
//! ```

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, info, trace};

use super::exam;
use crate::vce::codec::crypto::FieldDecryptor;
use crate::vce::codec::length;
use crate::vce::formatting::image::ImageCropper;
use crate::vce::types::error::{Result, VceError};
use crate::vce::types::models::{FileContainer, FormatVersion, GlobalSection};
use crate::vce::utils;

/// Leading bytes of every container.
pub const MAGIC: [u8; 2] = [0x85, 0xA8];

/// Parses a whole container held in memory.
///
/// # Parameters
/// * `data` - The complete file contents
/// * `encrypt_keys` - Caller key buffer labelled "encrypt", kept on the result
/// * `decrypt_keys` - Caller key buffer used by fields with a selector >= 0x80
/// * `cropper` - Image capability used for drag-and-drop areas
///
/// # Errors
/// Any structural, key, decryption, directive or image failure aborts the
/// parse; no partial tree is returned.
pub fn parse(
    data: &[u8],
    encrypt_keys: &[u8],
    decrypt_keys: &[u8],
    cropper: &dyn ImageCropper,
) -> Result<FileContainer> {
    let mut reader = data;

    // Step 1: Magic and version
    let found = [reader.read_u8()?, reader.read_u8()?];
    if found != MAGIC {
        return Err(VceError::InvalidMagic { found });
    }
    let version = FormatVersion::from_digits(reader.read_u8()?, reader.read_u8()?);
    debug!("Container version: {}", version);

    // Step 2: In-file key material
    utils::skip(&mut reader, 4)?;
    let keys = length::read_raw_array(&mut reader)?;
    length::read_raw_array(&mut reader)?;
    trace!("In-file key material: {} bytes", keys.len());

    let decryptor = FieldDecryptor::new(version, &keys, decrypt_keys);

    // Step 3: File information
    utils::skip(&mut reader, 1)?;
    let number = read_text(&mut reader, &decryptor)?;
    let title = read_text(&mut reader, &decryptor)?;
    let passing_score = reader.read_i32::<LittleEndian>()?;
    let time_limit = reader.read_i32::<LittleEndian>()?;
    let file_version = read_text(&mut reader, &decryptor)?;
    utils::skip(&mut reader, 16)?;

    if version.has_legacy_info() {
        trace!("Skipping legacy file information block");
        utils::skip(&mut reader, 16 + 2)?;
        decryptor.read_encrypted(&mut reader)?;
    }

    // Styles and description
    decryptor.read_encrypted(&mut reader)?;
    decryptor.read_encrypted(&mut reader)?;

    // Step 4: Global sections
    let section_count = utils::read_count(&mut reader, "section")?;
    let mut sections = Vec::with_capacity(section_count.min(reader.len()));
    for _ in 0..section_count {
        let id = reader.read_i32::<LittleEndian>()?;
        let name = read_text(&mut reader, &decryptor)?;
        sections.push(GlobalSection { id, name });
    }
    debug!("Global sections: {}", sections.len());

    decryptor.read_encrypted(&mut reader)?;

    // Step 5: Exams
    let exam_count = utils::read_count(&mut reader, "exam")?;
    let mut exams = Vec::with_capacity(exam_count.min(reader.len()));
    for position in 0..exam_count {
        exams.push(exam::parse_exam(&mut reader, &decryptor, cropper, position as u32 + 1)?);
    }

    // Step 6: Trailer
    let declared = reader.read_i32::<LittleEndian>()?;
    if i64::from(declared) != data.len() as i64 {
        return Err(VceError::LengthMismatch {
            declared: i64::from(declared),
            actual: data.len() as u64,
        });
    }

    info!(
        "Container parsed: title='{}', number='{}', version={}, {} sections, {} exams",
        title,
        number,
        version,
        sections.len(),
        exams.len()
    );

    Ok(FileContainer {
        version,
        encrypt_keys: encrypt_keys.to_vec(),
        decrypt_keys: decrypt_keys.to_vec(),
        keys,
        number,
        title,
        passing_score,
        time_limit,
        file_version,
        sections,
        exams,
    })
}

fn read_text(reader: &mut &[u8], decryptor: &FieldDecryptor<'_>) -> Result<String> {
    Ok(utils::decode_text(&decryptor.read_encrypted(reader)?))
}

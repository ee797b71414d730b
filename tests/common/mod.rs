#![allow(dead_code)]

use aes::Aes256;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockEncryptMut, KeyIvInit};
use vce_reader::{ImageCropper, QuestionType};
use vce_reader::vce::codec::length::encode_length;
use vce_reader::vce::formatting::sections::SECTION_SENTINEL;

/// Key offset written into every encrypted field of version >= 61 containers.
pub const KEY_OFFSET: usize = 8;
/// Selector byte pointing at the in-file key material.
pub const IN_FILE_SELECTOR: u8 = 0x10;
/// Selector byte pointing at the caller's decrypt keys.
pub const DECRYPT_SELECTOR: u8 = 0x90;

pub fn in_file_keys() -> Vec<u8> {
    (0..64u8).collect()
}

pub fn decrypt_keys() -> Vec<u8> {
    (0..64u8).map(|b| b.wrapping_mul(7).wrapping_add(3)).collect()
}

/// AES-256-CBC with zero padding up to the next block boundary.
pub fn encrypt_aes256_cbc(plaintext: &[u8], key: &[u8], iv: &[u8]) -> Vec<u8> {
    let mut data = padded(plaintext);
    let len = data.len();
    cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
        .expect("32-byte key and 16-byte IV")
        .encrypt_padded_mut::<NoPadding>(&mut data, len)
        .expect("block-aligned plaintext");
    data
}

/// Plaintext as it comes back from decryption (zero padded to 16 bytes).
pub fn padded(plaintext: &[u8]) -> Vec<u8> {
    let mut data = plaintext.to_vec();
    data.resize(plaintext.len().div_ceil(16) * 16, 0);
    data
}

/// Little-endian field writer mirroring the container encoding.
pub struct FieldWriter {
    pub version: u32,
    pub buf: Vec<u8>,
    keys: Vec<u8>,
    decrypt_keys: Vec<u8>,
}

impl FieldWriter {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            buf: Vec::new(),
            keys: in_file_keys(),
            decrypt_keys: decrypt_keys(),
        }
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn i64(&mut self, value: i64) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn length(&mut self, value: i32) -> &mut Self {
        self.bytes(&encode_length(value, 0x3C))
    }

    pub fn raw_array(&mut self, data: &[u8]) -> &mut Self {
        self.length(data.len() as i32);
        self.bytes(data)
    }

    /// Encrypted field using the in-file key material.
    pub fn field(&mut self, plaintext: &[u8]) -> &mut Self {
        self.field_with(IN_FILE_SELECTOR, plaintext)
    }

    /// Encrypted field using the key buffer a selector points at.
    pub fn field_with(&mut self, selector: u8, plaintext: &[u8]) -> &mut Self {
        if plaintext.is_empty() {
            return self.length(0);
        }
        let keys = if selector < 0x80 {
            self.keys.clone()
        } else {
            self.decrypt_keys.clone()
        };
        let offset = if self.version >= 61 { KEY_OFFSET } else { 0 };
        let key = &keys[offset..offset + 32];
        let iv = &keys[offset + 32..offset + 48];
        let ciphertext = encrypt_aes256_cbc(plaintext, key, iv);

        let header_len = if self.version >= 61 { 5 } else { 1 };
        self.length((header_len + ciphertext.len()) as i32);
        self.u8(selector);
        if self.version >= 61 {
            self.i32(offset as i32);
        }
        self.bytes(&ciphertext)
    }

    pub fn text(&mut self, text: &str) -> &mut Self {
        self.field(text.as_bytes())
    }
}

/// Builds a container: header, key material, file information, then `body`
/// (global sections onwards), then the length trailer.
pub fn container(version: u32, body: impl FnOnce(&mut FieldWriter)) -> Vec<u8> {
    let mut w = FieldWriter::new(version);
    w.bytes(&[0x85, 0xA8]);
    w.u8((version / 10) as u8).u8((version % 10) as u8);
    w.i32(0);
    w.raw_array(&in_file_keys());
    w.raw_array(&[9, 9, 9]);
    w.u8(0);

    w.text("EX-101").text("Sample Exam");
    w.i32(700).i32(90);
    w.text("5.1");
    w.i64(0).i64(0);
    if version <= 61 {
        w.i64(0).i64(0).u8(0).u8(0);
        w.text("legacy");
    }
    w.text("styles").text("description");

    body(&mut w);

    let total = w.buf.len() as i32 + 4;
    w.i32(total);
    w.buf
}

/// Body with no global sections and no exams.
pub fn empty_body(w: &mut FieldWriter) {
    w.i32(0);
    w.text("unused");
    w.i32(0);
}

/// Joins sections with the sentinel protocol: a preamble, then every section
/// but the last followed by a 5-byte artifact and a sentinel.
pub fn rich_field(sections: &[&[u8]]) -> Vec<u8> {
    let mut field = b"HEAD".to_vec();
    field.extend_from_slice(SECTION_SENTINEL);
    for (i, section) in sections.iter().enumerate() {
        field.extend_from_slice(section);
        if i + 1 < sections.len() {
            field.extend_from_slice(&[0x01; 5]);
            field.extend_from_slice(SECTION_SENTINEL);
        }
    }
    field
}

/// Fill-in-the-blank answers joined with the `0x02 0x07` delimiter.
pub fn blank_answers(answers: &[&str]) -> Vec<u8> {
    let mut field = b"lead".to_vec();
    for (i, answer) in answers.iter().enumerate() {
        field.extend_from_slice(&[0x02, 0x07]);
        field.extend_from_slice(answer.as_bytes());
        if i + 1 < answers.len() {
            field.extend_from_slice(&[0x01; 3]);
        }
    }
    field
}

pub fn rects(rects: &[(i32, i32, i32, i32)]) -> Vec<u8> {
    let mut data = (rects.len() as i32).to_le_bytes().to_vec();
    for (x0, y0, x1, y1) in rects {
        for value in [x0, y0, x1, y1] {
            data.extend_from_slice(&value.to_le_bytes());
        }
    }
    data
}

pub fn flags(flags: &[u8]) -> Vec<u8> {
    let mut data = (flags.len() as i32).to_le_bytes().to_vec();
    data.extend_from_slice(flags);
    data
}

pub fn drag_drop_areas(areas: &[(u8, (i32, i32, i32, i32))]) -> Vec<u8> {
    let mut data = (areas.len() as i32).to_le_bytes().to_vec();
    for (tag, (x0, y0, x1, y1)) in areas {
        data.push(*tag);
        data.extend_from_slice(&0i32.to_le_bytes());
        for value in [x0, y0, x1, y1] {
            data.extend_from_slice(&value.to_le_bytes());
        }
    }
    data
}

pub fn ints(values: &[i32]) -> Vec<u8> {
    let mut data = (values.len() as i32).to_le_bytes().to_vec();
    for value in values {
        data.extend_from_slice(&value.to_le_bytes());
    }
    data
}

/// Common question prefix: optional extra length, discarded field, type,
/// section id, complexity, reserved.
pub fn question_header(w: &mut FieldWriter, question_type: u8, section_id: i32, complexity: i32) {
    if w.version >= 61 {
        w.length(0x1234);
    }
    w.text("question-guid");
    w.u8(question_type).i32(section_id).i32(complexity).i32(0);
}

pub fn choice_question(
    w: &mut FieldWriter,
    question_type: QuestionType,
    sections: &[&[u8]],
    answer: &str,
    variant_count: i32,
) {
    question_header(w, question_type.into(), 1, 2);
    w.field(&rich_field(sections));
    w.text(answer);
    w.i32(variant_count);
    w.bytes(&[0, 0, 0]);
    w.text("explanation");
}

pub fn area_question(
    w: &mut FieldWriter,
    question_type: QuestionType,
    variants: &[u8],
    answers: &[u8],
    question: &[&[u8]],
    image: &[u8],
) {
    question_header(w, question_type.into(), 2, 3);
    w.field(variants);
    w.field(answers);
    w.field(&rich_field(question));
    w.bytes(&[0, 0]);
    w.field(image);
}

pub fn blank_question(w: &mut FieldWriter, question: &[&[u8]], answers: &[&str]) {
    question_header(w, QuestionType::FillInTheBlank.into(), 1, 1);
    w.field(&rich_field(question));
    w.field(&blank_answers(answers));
    w.i32(answers.len() as i32);
    w.bytes(&[0, 0, 0]);
}

/// Cropper that returns the requested rectangle as text instead of pixels.
pub struct GeometryCropper;

impl ImageCropper for GeometryCropper {
    fn crop_png(
        &self,
        _image: &[u8],
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> vce_reader::Result<Vec<u8>> {
        Ok(format!("{},{},{},{}", x, y, width, height).into_bytes())
    }
}

//! Container parsing layer.
//!
//! - [`container`]: header, key material, file information, global sections, trailer
//! - [`exam`]: exams, exam sections and questions
//!
//! Every opaque field goes through [`FieldDecryptor`](crate::vce::codec::crypto::FieldDecryptor);
//! every rich or structured field is handed to [`formatting`](crate::vce::formatting).

pub mod container;
pub mod exam;

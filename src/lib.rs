//! # vce-reader
//!
//! A reader for VCE practice-exam containers.
//! Decrypts the container fields, rebuilds the exam tree and converts the
//! embedded rich text into an HTML subset, including inline images, hot-area
//! geometry and drag-and-drop areas cropped from the question image.
pub mod vce;

// Re-export the main types for convenience
pub use vce::{
    ErrorKind, Result, VceError, VceReader,
    formatting::image::{ImageCropper, PngCropper},
    models::{
        ChoiceKind, DragDropArea, DragDropKind, ExamKind, ExamNode, ExamQuestion, ExamSection,
        FileContainer, FormatVersion, GlobalSection, HotArea, QuestionBody, QuestionType,
        SectionKind,
    },
};

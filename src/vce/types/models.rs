//! Core data structures for the VCE document tree.
//!
//! This module defines the fundamental types used throughout the library:
//! - The container root and its exam tree
//! - Question variants and their geometry
//! - Version and wire discriminant enumerations

use super::error::{Result, VceError};

/// Container format version, combined from the two version digits of the header.
///
/// Version 61 is the pivot of two format changes: files up to 61 carry a
/// legacy block in the file information, files from 61 on carry a per-field
/// key offset and an extra length prefix in front of every question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormatVersion(pub u32);

impl FormatVersion {
    /// Builds the version from the two header digits (`b0 * 10 + b1`).
    pub fn from_digits(major: u8, minor: u8) -> Self {
        Self(major as u32 * 10 + minor as u32)
    }

    /// Encrypted fields carry a 4-byte offset into the key material.
    pub fn has_key_offset(&self) -> bool {
        self.0 >= 61
    }

    /// The file information block carries the legacy reserved fields.
    pub fn has_legacy_info(&self) -> bool {
        self.0 <= 61
    }

    /// Every question is preceded by an extra length prefix.
    pub fn has_question_prefix(&self) -> bool {
        self.0 >= 61
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Root of a decoded container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContainer {
    pub version: FormatVersion,
    /// Caller-supplied key buffer labelled "encrypt".
    pub encrypt_keys: Vec<u8>,
    /// Caller-supplied key buffer labelled "decrypt".
    pub decrypt_keys: Vec<u8>,
    /// Key material stored inside the container itself.
    pub keys: Vec<u8>,
    pub number: String,
    pub title: String,
    pub passing_score: i32,
    pub time_limit: i32,
    pub file_version: String,
    pub sections: Vec<GlobalSection>,
    pub exams: Vec<ExamNode>,
}

impl FileContainer {
    /// Iterates over every question of every exam, in file order.
    pub fn questions(&self) -> impl Iterator<Item = &ExamQuestion> {
        self.exams.iter().flat_map(|exam| exam.questions())
    }
}

/// A named section declared at file level (topic grouping).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSection {
    pub id: i32,
    pub name: String,
}

/// One exam inside the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamNode {
    pub id: u32,
    pub name: String,
    pub kind: ExamKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamKind {
    /// A flat list of questions.
    Questions(Vec<ExamQuestion>),
    /// Questions grouped into question sets and testlets.
    Sections(Vec<ExamSection>),
}

impl ExamNode {
    /// Iterates over the exam's questions regardless of how they are grouped.
    pub fn questions(&self) -> Box<dyn Iterator<Item = &ExamQuestion> + '_> {
        match &self.kind {
            ExamKind::Questions(questions) => Box::new(questions.iter()),
            ExamKind::Sections(sections) => {
                Box::new(sections.iter().flat_map(|section| section.questions().iter()))
            }
        }
    }

    pub fn question_count(&self) -> usize {
        self.questions().count()
    }
}

/// A grouping of questions inside a section exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSection {
    pub id: u32,
    pub time_limit: i32,
    pub kind: SectionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    QuestionSet(Vec<ExamQuestion>),
    Testlet {
        title: String,
        description: String,
        questions: Vec<ExamQuestion>,
    },
}

impl ExamSection {
    pub fn questions(&self) -> &[ExamQuestion] {
        match &self.kind {
            SectionKind::QuestionSet(questions) => questions,
            SectionKind::Testlet { questions, .. } => questions,
        }
    }
}

/// A single question with the attributes shared by every question kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamQuestion {
    /// 1-based position within the owning exam.
    pub id: u32,
    /// Id of the owning exam section, `None` for questions of a question exam.
    pub exam_section_id: Option<u32>,
    /// Id of the [`GlobalSection`] this question is filed under.
    pub section_id: i32,
    pub complexity: i32,
    pub body: QuestionBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionBody {
    Choice {
        kind: ChoiceKind,
        question: String,
        variants: Vec<String>,
        answers: String,
        reference: String,
    },
    HotArea {
        question: String,
        reference: String,
        image: String,
        areas: Vec<HotArea>,
        /// Comma-joined 1-based indices of the correct areas.
        answers: String,
    },
    DragAndDrop {
        question: String,
        reference: String,
        image: String,
        areas: Vec<DragDropArea>,
        /// Raw type tags of `areas`, in wire order.
        drag_drop_types: Vec<u8>,
        /// For every drop area, the 1-based drag slot that belongs there.
        answers: String,
    },
    FillInTheBlank {
        question: String,
        reference: String,
        answers: Vec<String>,
    },
}

impl QuestionBody {
    pub fn question(&self) -> &str {
        match self {
            QuestionBody::Choice { question, .. }
            | QuestionBody::HotArea { question, .. }
            | QuestionBody::DragAndDrop { question, .. }
            | QuestionBody::FillInTheBlank { question, .. } => question,
        }
    }

    pub fn reference(&self) -> &str {
        match self {
            QuestionBody::Choice { reference, .. }
            | QuestionBody::HotArea { reference, .. }
            | QuestionBody::DragAndDrop { reference, .. }
            | QuestionBody::FillInTheBlank { reference, .. } => reference,
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionBody::Choice { kind: ChoiceKind::Single, .. } => QuestionType::SingleChoice,
            QuestionBody::Choice { kind: ChoiceKind::Multiple, .. } => QuestionType::MultipleChoice,
            QuestionBody::HotArea { .. } => QuestionType::HotArea,
            QuestionBody::DragAndDrop { .. } => QuestionType::DragAndDrop,
            QuestionBody::FillInTheBlank { .. } => QuestionType::FillInTheBlank,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceKind {
    Single,
    Multiple,
}

/// Axis-aligned rectangle over a question's base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HotArea {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl HotArea {
    /// Builds a rectangle from its two corners.
    pub fn from_corners(start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> Self {
        Self {
            x: start_x,
            y: start_y,
            width: end_x.wrapping_sub(start_x),
            height: end_y.wrapping_sub(start_y),
        }
    }
}

/// A drag source or drop target of a drag-and-drop question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragDropArea {
    pub area: HotArea,
    pub kind: DragDropKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragDropKind {
    /// Draggable item; `image` is an `<img>` fragment cropped from the base image.
    Drag { image: String },
    Drop,
}

impl DragDropArea {
    pub fn is_drag(&self) -> bool {
        matches!(self.kind, DragDropKind::Drag { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamType {
    Question,
    Section,
}

impl TryFrom<u8> for ExamType {
    type Error = VceError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Question),
            1 => Ok(Self::Section),
            _ => Err(VceError::UnknownType { kind: "exam", value: value as i64 }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionType {
    QuestionSet,
    Testlet,
}

impl TryFrom<u8> for SectionType {
    type Error = VceError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::QuestionSet),
            1 => Ok(Self::Testlet),
            _ => Err(VceError::UnknownType { kind: "exam section", value: value as i64 }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    HotArea,
    DragAndDrop,
    FillInTheBlank,
}

impl TryFrom<u8> for QuestionType {
    type Error = VceError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::SingleChoice),
            1 => Ok(Self::MultipleChoice),
            2 => Ok(Self::HotArea),
            3 => Ok(Self::DragAndDrop),
            4 => Ok(Self::FillInTheBlank),
            _ => Err(VceError::UnknownType { kind: "exam question", value: value as i64 }),
        }
    }
}

impl From<QuestionType> for u8 {
    fn from(value: QuestionType) -> Self {
        match value {
            QuestionType::SingleChoice => 0,
            QuestionType::MultipleChoice => 1,
            QuestionType::HotArea => 2,
            QuestionType::DragAndDrop => 3,
            QuestionType::FillInTheBlank => 4,
        }
    }
}

/// Type tag of a drag-and-drop area record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragDropType {
    Drag = 1,
    Drop = 2,
}

impl TryFrom<u8> for DragDropType {
    type Error = VceError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Drag),
            2 => Ok(Self::Drop),
            _ => Err(VceError::UnknownType { kind: "drag and drop area", value: value as i64 }),
        }
    }
}

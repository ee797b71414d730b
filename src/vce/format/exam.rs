//! Exam tree parsing: exams, exam sections and questions.
//!
//! Question ids are allocated per exam, so questions inside sections continue
//! the counter of their exam rather than restarting per section.

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace};

use crate::vce::codec::crypto::FieldDecryptor;
use crate::vce::codec::length;
use crate::vce::formatting::areas;
use crate::vce::formatting::image::{self, ImageCropper};
use crate::vce::formatting::sections;
use crate::vce::types::error::Result;
use crate::vce::types::models::{
    ChoiceKind, ExamKind, ExamNode, ExamQuestion, ExamSection, ExamType, QuestionBody,
    QuestionType, SectionKind, SectionType,
};
use crate::vce::utils;

/// Parses one exam node. `id` is the exam's 1-based position in the file.
pub fn parse_exam(
    reader: &mut &[u8],
    decryptor: &FieldDecryptor<'_>,
    cropper: &dyn ImageCropper,
    id: u32,
) -> Result<ExamNode> {
    let exam_type = ExamType::try_from(reader.read_u8()?)?;
    let name = utils::decode_text(&decryptor.read_encrypted(reader)?);

    let mut parser = ExamParser::new(decryptor, cropper);
    let kind = match exam_type {
        ExamType::Question => {
            let count = utils::read_count(reader, "exam question")?;
            debug!("Exam {} '{}': {} questions", id, name, count);
            ExamKind::Questions(parser.parse_questions(reader, count, None)?)
        }
        ExamType::Section => {
            let count = utils::read_count(reader, "exam section")?;
            debug!("Exam {} '{}': {} sections", id, name, count);
            let sections = (1..=count as u32)
                .map(|section_id| parser.parse_section(reader, section_id))
                .collect::<Result<Vec<_>>>()?;
            ExamKind::Sections(sections)
        }
    };

    Ok(ExamNode { id, name, kind })
}

/// Per-exam parsing state.
struct ExamParser<'p, 'k> {
    decryptor: &'p FieldDecryptor<'k>,
    cropper: &'p dyn ImageCropper,
    question_count: u32,
}

impl<'p, 'k> ExamParser<'p, 'k> {
    fn new(decryptor: &'p FieldDecryptor<'k>, cropper: &'p dyn ImageCropper) -> Self {
        Self {
            decryptor,
            cropper,
            question_count: 0,
        }
    }

    fn read_field(&self, reader: &mut &[u8]) -> Result<Vec<u8>> {
        self.decryptor.read_encrypted(reader)
    }

    fn parse_section(&mut self, reader: &mut &[u8], id: u32) -> Result<ExamSection> {
        let section_type = SectionType::try_from(reader.read_u8()?)?;
        let time_limit = reader.read_i32::<LittleEndian>()?;

        let kind = match section_type {
            SectionType::QuestionSet => {
                let count = utils::read_count(reader, "exam question")?;
                debug!("Question set {}: {} questions", id, count);
                SectionKind::QuestionSet(self.parse_questions(reader, count, Some(id))?)
            }
            SectionType::Testlet => {
                let title = utils::decode_text(&self.read_field(reader)?);
                utils::skip(reader, 4)?;
                self.read_field(reader)?;
                let description = sections::format_description(&self.read_field(reader)?)?;
                utils::skip(reader, 4)?;

                let count = utils::read_count(reader, "exam question")?;
                debug!("Testlet {} '{}': {} questions", id, title, count);
                let questions = self.parse_questions(reader, count, Some(id))?;
                SectionKind::Testlet {
                    title,
                    description,
                    questions,
                }
            }
        };

        Ok(ExamSection {
            id,
            time_limit,
            kind,
        })
    }

    fn parse_questions(
        &mut self,
        reader: &mut &[u8],
        count: usize,
        exam_section_id: Option<u32>,
    ) -> Result<Vec<ExamQuestion>> {
        (0..count)
            .map(|_| self.parse_question(reader, exam_section_id))
            .collect()
    }

    fn parse_question(
        &mut self,
        reader: &mut &[u8],
        exam_section_id: Option<u32>,
    ) -> Result<ExamQuestion> {
        if self.decryptor.version().has_question_prefix() {
            length::decode_length(reader)?;
        }
        self.read_field(reader)?;

        let question_type = QuestionType::try_from(reader.read_u8()?)?;
        let section_id = reader.read_i32::<LittleEndian>()?;
        let complexity = reader.read_i32::<LittleEndian>()?;
        utils::skip(reader, 4)?;

        let body = match question_type {
            QuestionType::SingleChoice => self.parse_choice(reader, ChoiceKind::Single)?,
            QuestionType::MultipleChoice => self.parse_choice(reader, ChoiceKind::Multiple)?,
            QuestionType::HotArea => self.parse_hot_area(reader)?,
            QuestionType::DragAndDrop => self.parse_drag_and_drop(reader)?,
            QuestionType::FillInTheBlank => self.parse_fill_in_the_blank(reader)?,
        };

        self.question_count += 1;
        let id = self.question_count;
        trace!(
            "Question {}: {:?}, section_id={}, complexity={}",
            id, question_type, section_id, complexity
        );

        Ok(ExamQuestion {
            id,
            exam_section_id,
            section_id,
            complexity,
            body,
        })
    }

    fn parse_choice(&self, reader: &mut &[u8], kind: ChoiceKind) -> Result<QuestionBody> {
        let question = self.read_field(reader)?;
        let answers = self.read_field(reader)?;
        let variant_count = utils::read_count(reader, "variant")?;
        utils::skip(reader, 3)?;
        self.read_field(reader)?;

        let text = sections::format_choice_question(&question, variant_count)?;
        Ok(QuestionBody::Choice {
            kind,
            question: text.question,
            variants: text.variants,
            answers: sections::format_plain_answer(&answers),
            reference: text.reference,
        })
    }

    /// Reads the shared field layout of hot-area and drag-and-drop questions:
    /// `(variants, answers, question, image)`.
    fn read_area_fields(&self, reader: &mut &[u8]) -> Result<[Vec<u8>; 4]> {
        let variants = self.read_field(reader)?;
        let answers = self.read_field(reader)?;
        let question = self.read_field(reader)?;
        utils::skip(reader, 2)?;
        let image = self.read_field(reader)?;
        Ok([variants, answers, question, image])
    }

    fn parse_hot_area(&self, reader: &mut &[u8]) -> Result<QuestionBody> {
        let [variants, answers, question, picture] = self.read_area_fields(reader)?;

        let text = sections::format_question(&question)?;
        Ok(QuestionBody::HotArea {
            question: text.question,
            reference: text.reference,
            image: image::image_tag(&picture),
            areas: areas::decode_hot_areas(&variants)?,
            answers: areas::decode_hot_area_answers(&answers)?,
        })
    }

    fn parse_drag_and_drop(&self, reader: &mut &[u8]) -> Result<QuestionBody> {
        let [variants, answers, question, picture] = self.read_area_fields(reader)?;

        let text = sections::format_question(&question)?;
        let layout = areas::decode_drag_drop_areas(&variants, &picture, self.cropper)?;
        let answers = areas::decode_drag_drop_answers(&answers, &layout.types)?;

        Ok(QuestionBody::DragAndDrop {
            question: text.question,
            reference: text.reference,
            image: image::image_tag(&picture),
            areas: layout.areas,
            drag_drop_types: layout.types,
            answers,
        })
    }

    fn parse_fill_in_the_blank(&self, reader: &mut &[u8]) -> Result<QuestionBody> {
        let question = self.read_field(reader)?;
        let answers = self.read_field(reader)?;
        let answer_count = utils::read_count(reader, "blank answer")?;
        utils::skip(reader, 3)?;

        let text = sections::format_question(&question)?;
        Ok(QuestionBody::FillInTheBlank {
            question: text.question,
            reference: text.reference,
            answers: sections::format_blank_answers(&answers, answer_count)?,
        })
    }
}

//! Section protocol of rich-text fields.
//!
//! A rich-text field holds several logical sections (question, variants,
//! reference) separated by the 8-byte sentinel `"-8 1 3 1"`. A section that is
//! followed by a sentinel carries a 5-byte artifact at its end, which is
//! dropped before the section is rendered.

use std::borrow::Cow;

use super::text;
use super::tokenizer::ByteTokenizer;
use crate::vce::types::error::{Result, VceError};
use crate::vce::utils;

pub const SECTION_SENTINEL: &[u8] = b"-8 1 3 1";
const SECTION_TRAILER_LEN: usize = 5;
const SECTION_DELIMITERS: &[&[u8]] = &[SECTION_SENTINEL];

pub const BLANK_ANSWER_DELIMITER: &[u8] = &[0x02, 0x07];
const BLANK_ANSWER_TRAILER_LEN: usize = 3;
const BLANK_ANSWER_DELIMITERS: &[&[u8]] = &[BLANK_ANSWER_DELIMITER];

/// Pull reader over the sentinel-separated sections of one field.
#[derive(Debug)]
pub struct SectionReader<'a> {
    stream: ByteTokenizer<'a>,
}

impl<'a> SectionReader<'a> {
    pub fn new(field: &'a [u8]) -> Self {
        Self {
            stream: ByteTokenizer::new(field, SECTION_DELIMITERS),
        }
    }

    /// Drops the leading chunk and the sentinel that may follow it.
    pub fn skip_preamble(&mut self) {
        self.stream.pop();
        self.skip_sentinel();
    }

    /// Pops a sentinel if it is the next token.
    pub fn skip_sentinel(&mut self) {
        if self.stream.next_is(SECTION_SENTINEL) {
            self.stream.pop();
        }
    }

    pub fn has_value(&self) -> bool {
        self.stream.has_value()
    }

    /// Pops the next section, trimming its trailer when a sentinel follows.
    pub fn next_section(&mut self) -> Cow<'a, [u8]> {
        let section = self.stream.pop();
        if !self.stream.next_is(SECTION_SENTINEL) {
            return section;
        }
        self.stream.pop();
        match section {
            Cow::Borrowed(bytes) => Cow::Borrowed(utils::drop_tail(bytes, SECTION_TRAILER_LEN)),
            Cow::Owned(bytes) => Cow::Owned(utils::drop_tail(&bytes, SECTION_TRAILER_LEN).to_vec()),
        }
    }

    /// Pops the next section and renders it to HTML.
    pub fn next_html(&mut self) -> Result<String> {
        let section = self.next_section();
        text::format_text(&section)
    }
}

/// Rendered sections of a choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceText {
    pub question: String,
    pub variants: Vec<String>,
    pub reference: String,
}

/// Rendered sections of a question without inline variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionText {
    pub question: String,
    pub reference: String,
}

/// Splits a choice question field into question, `variant_count` variants and reference.
///
/// Fails when the field runs out before every variant is read.
pub fn format_choice_question(field: &[u8], variant_count: usize) -> Result<ChoiceText> {
    let mut sections = SectionReader::new(field);
    sections.skip_preamble();

    let question = sections.next_html()?;
    let mut variants = Vec::new();
    for i in 0..variant_count {
        if !sections.has_value() {
            return Err(VceError::InvalidFormat(format!(
                "Choice question declares {} variants, but the field ends after {}",
                variant_count, i
            )));
        }
        variants.push(sections.next_html()?);
    }
    let reference = sections.next_html()?;

    Ok(ChoiceText {
        question,
        variants,
        reference,
    })
}

/// Splits a hot-area, drag-and-drop or fill-in-the-blank question field.
pub fn format_question(field: &[u8]) -> Result<QuestionText> {
    let mut sections = SectionReader::new(field);
    sections.skip_preamble();

    let question = sections.next_html()?;
    let reference = sections.next_html()?;

    Ok(QuestionText { question, reference })
}

/// Renders a testlet description: an optional sentinel, then one section.
pub fn format_description(field: &[u8]) -> Result<String> {
    let mut sections = SectionReader::new(field);
    sections.skip_sentinel();
    let description = sections.stream.pop();
    text::format_text(&description)
}

/// Decodes the answer of a choice question (plain text, e.g. `"AC"`).
pub fn format_plain_answer(field: &[u8]) -> String {
    utils::decode_plain_text(field)
}

/// Splits the answers of a fill-in-the-blank question.
///
/// Every answer but the last carries a 3-byte trailer before the next delimiter.
/// Fails when the field runs out before `count` answers are read.
pub fn format_blank_answers(field: &[u8], count: usize) -> Result<Vec<String>> {
    let mut stream = ByteTokenizer::new(field, BLANK_ANSWER_DELIMITERS);
    stream.pop();

    let mut answers = Vec::new();
    for i in 0..count {
        if !stream.has_value() {
            return Err(VceError::InvalidFormat(format!(
                "Blank question declares {} answers, but the field ends after {}",
                count, i
            )));
        }
        stream.pop();
        let answer = stream.pop();
        let answer = if i + 1 < count {
            utils::drop_tail(&answer, BLANK_ANSWER_TRAILER_LEN)
        } else {
            &answer
        };
        answers.push(utils::decode_text(answer));
    }
    Ok(answers)
}

//! Rich-text to HTML conversion.
//!
//! A rich-text section is a flat byte stream cut by two delimiters:
//! - `") "` ends a run of plain text (rendered as text followed by `<br>`)
//! - `"\r\n"` ends a format directive, a line of space-separated integers
//!
//! Embedded pictures start with a token naming the picture class
//! (`TJPEGImage`, `TPngImage`), followed by optional `width=`/`height=`
//! tokens and a raw `i32` length + payload.
//!
//! Directives drive a two-slot state machine: the currently open line
//! wrapper and the currently open font wrapper. Each slot holds the end tag
//! that must be emitted before the slot is reopened.

use std::borrow::Cow;
use std::sync::OnceLock;

use log::trace;
use regex::Regex;

use super::image;
use super::tokenizer::ByteTokenizer;
use crate::vce::types::error::{Result, VceError};
use crate::vce::utils;

pub const BLOCK_DELIMITER: &[u8] = b"\r\n";
pub const LINE_DELIMITER: &[u8] = b") ";
pub const LINE_BREAK: &str = "<br>";

const TEXT_DELIMITERS: &[&[u8]] = &[BLOCK_DELIMITER, LINE_DELIMITER];
const IMAGE_MARKERS: &[&[u8]] = &[b"TJPEGImage", b"TPngImage"];
const URL_PLACEHOLDER: &str = "UrlData";
const BULLET: &str = "• ";

/// One classified unit of a rich-text section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(Cow<'a, [u8]>),
    Directive(Cow<'a, [u8]>),
    Image {
        data: Cow<'a, [u8]>,
        width: Option<Cow<'a, [u8]>>,
        height: Option<Cow<'a, [u8]>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StyleTags {
    start: &'static str,
    end: &'static str,
}

const fn tags(start: &'static str, end: &'static str) -> StyleTags {
    StyleTags { start, end }
}

const PLAIN: StyleTags = tags("", "");

/// Font styles indexed by directive font id.
const FONT_STYLES: [StyleTags; 17] = [
    PLAIN,
    tags("<b>", "</b>"),
    tags("<span style=\"font-family: Courier, monospace\">", "</span>"),
    tags("<span style=\"font-family: Courier, monospace\"><b>", "</b></span>"),
    tags("<span style=\"font-size: large\"><b>", "</b></span>"),
    tags("<u>", "</u>"),
    tags("<i>", "</i>"),
    tags("<u><a href=\"UrlData\">UrlData", "</a></u>"),
    tags("<b><u>", "</u></b>"),
    tags("<span style=\"font-size: small\">", "</span>"),
    tags("<span style=\"font-size: large\">", "</span>"),
    tags("<a href=\"UrlData\">UrlData", "</a>"),
    tags("<i><a href=\"UrlData\">UrlData", "</a></i>"),
    tags("<b><a href=\"UrlData\">UrlData", "</a></b>"),
    tags("<b><i><a href=\"UrlData\">UrlData", "</a><i></b>"),
    tags("<b><i><u><a href=\"UrlData\">UrlData", "</a></u><i></b>"),
    tags("<b><i>", "</i></b>"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineStyle {
    /// Removes the line break emitted just before the directive.
    Delete,
    Wrap(StyleTags),
}

/// Line styles indexed by directive line id:
/// delete, left, sub-paragraph, center, right, justify, next-line, and two
/// layout ids that render like left.
const LINE_STYLES: [LineStyle; 9] = [
    LineStyle::Delete,
    LineStyle::Wrap(PLAIN),
    LineStyle::Wrap(PLAIN),
    LineStyle::Wrap(tags("<div style=\"text-align: center\">", "</div>")),
    LineStyle::Wrap(tags("<div style=\"text-align: right\">", "</div>")),
    LineStyle::Wrap(tags("<div style=\"text-align: justify\">", "</div>")),
    LineStyle::Wrap(PLAIN),
    LineStyle::Wrap(PLAIN),
    LineStyle::Wrap(PLAIN),
];

fn font_style(id: i32) -> Option<StyleTags> {
    // Only 17 fonts are known; higher ids render unstyled.
    if id >= FONT_STYLES.len() as i32 {
        return Some(FONT_STYLES[0]);
    }
    usize::try_from(id).ok().and_then(|i| FONT_STYLES.get(i)).copied()
}

fn line_style(id: i32) -> Option<LineStyle> {
    usize::try_from(id).ok().and_then(|i| LINE_STYLES.get(i)).copied()
}

static DIRECTIVE_PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();

/// Returns the cached directive patterns, tried in order.
fn directive_patterns() -> &'static [Regex; 4] {
    DIRECTIVE_PATTERNS.get_or_init(|| {
        [
            r#"^(-?\d+) (-?\d+) (-?\d+) (-?\d+) (-?\d+) (".*")$"#,
            r"^(-?\d+) (-?\d+) (-?\d+) (-?\d+) (-?\d+) (-?\d+)$",
            r"^(-?\d+) (-?\d+) (-?\d+) (-?\d+) (-?\d+) (-?\d+) (-?\d+)$",
            r"^(-?\d+) (-?\d+) (-?\d+) (-?\d+) (-?\d+) (-?\d+) (-?\d+) (-?\d+) (-?\d+) (-?\d+)$",
        ]
        .map(|pattern| Regex::new(pattern).expect("Invalid format directive pattern"))
    })
}

/// Collects the capture groups of every pattern that matches `directive`.
pub fn split_directive(directive: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    for pattern in directive_patterns() {
        for captures in pattern.captures_iter(directive) {
            fields.extend(
                captures
                    .iter()
                    .skip(1)
                    .map(|group| group.map_or("", |m| m.as_str())),
            );
        }
    }
    fields
}

/// Splits a rich-text section into text runs, directives and images.
///
/// A trailing text run without a closing line delimiter is kept as text.
pub fn tokenize(bytes: &[u8]) -> Result<Vec<Token<'_>>> {
    let mut stream = ByteTokenizer::new(bytes, TEXT_DELIMITERS);
    let mut tokens = Vec::new();
    let mut pending: Option<Cow<'_, [u8]>> = None;

    while stream.has_value() {
        let chunk = stream.pop();

        if chunk.as_ref() == LINE_DELIMITER {
            tokens.push(Token::Text(pending.take().unwrap_or_default()));
            continue;
        }
        if chunk.as_ref() == BLOCK_DELIMITER {
            tokens.push(Token::Directive(pending.take().unwrap_or_default()));
            continue;
        }
        if let Some(marker_end) = image_marker_end(&chunk) {
            stream.push(&chunk[marker_end..]);
            tokens.push(read_image(&mut stream)?);
            pending = None;
            continue;
        }

        pending = Some(match pending.take() {
            None => chunk,
            Some(mut run) => {
                run.to_mut().extend_from_slice(&chunk);
                run
            }
        });
    }

    if let Some(run) = pending.filter(|run| !run.is_empty()) {
        tokens.push(Token::Text(run));
    }

    Ok(tokens)
}

/// Position just past the picture class name inside `chunk`, if any.
fn image_marker_end(chunk: &[u8]) -> Option<usize> {
    IMAGE_MARKERS.iter().find_map(|marker| {
        chunk
            .windows(marker.len())
            .position(|window| window == *marker)
            .map(|start| start + marker.len())
    })
}

fn skip_delimiters(stream: &mut ByteTokenizer<'_>) {
    while stream.has_value() && TEXT_DELIMITERS.iter().any(|d| *d == stream.peek()) {
        stream.pop();
    }
}

fn read_image_property<'a>(stream: &mut ByteTokenizer<'a>, name: &str) -> Option<Cow<'a, [u8]>> {
    if !utils::decode_text(stream.peek()).contains(name) {
        return None;
    }
    let property = stream.pop();
    skip_delimiters(stream);
    Some(property)
}

fn read_image<'a>(stream: &mut ByteTokenizer<'a>) -> Result<Token<'a>> {
    skip_delimiters(stream);
    let width = read_image_property(stream, "width");
    let height = read_image_property(stream, "height");

    let length = stream.read_i32()?;
    let length = usize::try_from(length)
        .map_err(|_| VceError::InvalidFormat(format!("Negative inline image length: {}", length)))?;
    let data = stream.read_bytes(length)?;
    trace!("Inline image: {} bytes", length);

    Ok(Token::Image { data, width, height })
}

/// Open end tags of the line and font wrappers.
#[derive(Debug, Default)]
struct OpenTags {
    line_end: &'static str,
    font_end: &'static str,
}

fn parse_field(field: &str) -> Result<i32> {
    field.parse::<i32>().map_err(|_| {
        VceError::InvalidFormat(format!(
            "Format directive field {:?} is not a 32-bit integer",
            field
        ))
    })
}

/// Applies a 6-field directive `(font, _, line, _, _, url)`.
///
/// The url is substituted exactly as captured, quotes included.
fn apply_style(
    fields: &[&str],
    fragments: &mut Vec<Cow<'static, str>>,
    open: &mut OpenTags,
) -> Result<()> {
    let font_id = parse_field(fields[0])?;
    let line_id = parse_field(fields[2])?;
    let url = fields[5];

    match line_style(line_id) {
        Some(LineStyle::Delete) => {
            if fragments.last().is_some_and(|last| last == LINE_BREAK) {
                fragments.pop();
            }
        }
        other => {
            fragments.push(Cow::Borrowed(open.line_end));
            if let Some(LineStyle::Wrap(style)) = other {
                open.line_end = style.end;
                fragments.push(Cow::Borrowed(style.start));
            }
        }
    }

    fragments.push(Cow::Borrowed(open.font_end));
    if let Some(style) = font_style(font_id) {
        open.font_end = style.end;
        if style.start.contains(URL_PLACEHOLDER) {
            fragments.push(Cow::Owned(style.start.replace(URL_PLACEHOLDER, url)));
        } else {
            fragments.push(Cow::Borrowed(style.start));
        }
    }

    Ok(())
}

/// Renders classified tokens to the HTML subset.
pub fn render(tokens: &[Token<'_>]) -> Result<String> {
    let mut fragments: Vec<Cow<'static, str>> = Vec::new();
    let mut open = OpenTags::default();

    for token in tokens {
        match token {
            Token::Text(data) => {
                fragments.push(Cow::Owned(utils::decode_text(data)));
                fragments.push(Cow::Borrowed(LINE_BREAK));
            }
            Token::Directive(data) => {
                let directive = utils::decode_text(data);
                let fields = split_directive(&directive);
                match fields.len() {
                    0 | 7 => {}
                    6 => apply_style(&fields, &mut fragments, &mut open)?,
                    10 => {
                        fragments.push(Cow::Borrowed(BULLET));
                        fragments.push(Cow::Borrowed(LINE_BREAK));
                    }
                    count => {
                        return Err(VceError::PatternError {
                            fields: count,
                            directive: directive.clone(),
                        });
                    }
                }
            }
            Token::Image { data, width, height } => {
                let attributes: Vec<String> = [width, height]
                    .into_iter()
                    .flatten()
                    .map(|property| image_attribute(property))
                    .collect();
                fragments.push(Cow::Owned(image::image_tag_with_attributes(data, &attributes)));
            }
        }
    }

    let joined = fragments.concat();
    Ok(utils::trim_repeated(&joined, LINE_BREAK).to_string())
}

/// Turns a `width=120` property token into `width="120"`.
fn image_attribute(property: &[u8]) -> String {
    format!("{}\"", utils::decode_plain_text(property).replace('=', "=\""))
}

/// Converts one rich-text section to HTML.
pub fn format_text(bytes: &[u8]) -> Result<String> {
    render(&tokenize(bytes)?)
}

//! Delimiter-driven pull tokenizer over a byte buffer.

use std::borrow::Cow;
use std::io::{Error as IoError, ErrorKind as IoErrorKind};

use crate::vce::types::error::{Result, VceError};

/// Splits a byte buffer on fixed delimiter sequences.
///
/// Each token is either one whole delimiter (when the stream starts with one)
/// or the longest run of bytes before the next delimiter. At every scan
/// position delimiters are tried in declaration order and the first match wins.
///
/// The tokenizer borrows its input and only switches to an owned buffer when
/// [`push`](Self::push) reinserts bytes that did not come from the stream.
#[derive(Debug, Clone)]
pub struct ByteTokenizer<'a> {
    buffer: Cow<'a, [u8]>,
    position: usize,
    delimiters: &'a [&'a [u8]],
}

impl<'a> ByteTokenizer<'a> {
    pub fn new(data: &'a [u8], delimiters: &'a [&'a [u8]]) -> Self {
        Self {
            buffer: Cow::Borrowed(data),
            position: 0,
            delimiters,
        }
    }

    /// Returns true while unread bytes remain.
    pub fn has_value(&self) -> bool {
        self.position < self.buffer.len()
    }

    /// Unread bytes left in the stream.
    pub fn remaining(&self) -> &[u8] {
        &self.buffer[self.position..]
    }

    /// Length of the next token, or 0 when the stream is exhausted.
    fn next_token_len(&self) -> usize {
        let rest = self.remaining();
        for start in 0..rest.len() {
            let window = &rest[start..];
            let matched = self
                .delimiters
                .iter()
                .find(|d| !d.is_empty() && window.starts_with(**d));
            if let Some(delimiter) = matched {
                return if start == 0 { delimiter.len() } else { start };
            }
        }
        rest.len()
    }

    /// Returns the next token without consuming it.
    pub fn peek(&self) -> &[u8] {
        let len = self.next_token_len();
        &self.remaining()[..len]
    }

    /// True when the next token is exactly `delimiter`.
    pub fn next_is(&self, delimiter: &[u8]) -> bool {
        self.peek() == delimiter
    }

    /// Consumes and returns the next token.
    pub fn pop(&mut self) -> Cow<'a, [u8]> {
        let len = self.next_token_len();
        self.advance(len)
    }

    /// Consumes exactly `len` raw bytes, ignoring delimiters.
    pub fn read_bytes(&mut self, len: usize) -> Result<Cow<'a, [u8]>> {
        let available = self.buffer.len() - self.position;
        if available < len {
            return Err(VceError::Io(IoError::new(
                IoErrorKind::UnexpectedEof,
                format!("need {} raw bytes, only {} remain in token stream", len, available),
            )));
        }
        Ok(self.advance(len))
    }

    /// Consumes a raw little-endian `i32`, ignoring delimiters.
    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.read_bytes(4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes);
        Ok(i32::from_le_bytes(raw))
    }

    /// Puts `bytes` back in front of the unread stream.
    ///
    /// Reinserting the bytes that were just consumed only rewinds the cursor.
    pub fn push(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let rewind = bytes.len() <= self.position
            && &self.buffer[self.position - bytes.len()..self.position] == bytes;
        if rewind {
            self.position -= bytes.len();
            return;
        }
        let mut joined = Vec::with_capacity(bytes.len() + self.buffer.len() - self.position);
        joined.extend_from_slice(bytes);
        joined.extend_from_slice(self.remaining());
        self.buffer = Cow::Owned(joined);
        self.position = 0;
    }

    fn advance(&mut self, len: usize) -> Cow<'a, [u8]> {
        let start = self.position;
        self.position += len;
        match &self.buffer {
            Cow::Borrowed(data) => {
                let data: &'a [u8] = *data;
                Cow::Borrowed(&data[start..start + len])
            }
            Cow::Owned(data) => Cow::Owned(data[start..start + len].to_vec()),
        }
    }
}

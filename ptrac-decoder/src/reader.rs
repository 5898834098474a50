//! Line-oriented input with line tracking
//!
//! [`LineReader`] hands out one physical line at a time and remembers its
//! 1-based number for diagnostics. [`TokenCursor`] turns a run of lines into a
//! single whitespace-token stream, as used by the header's declaration blocks.

use crate::types::{DecoderError, Result};
use std::collections::VecDeque;
use std::io::BufRead;

/// One physical line, terminator stripped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number
    pub number: usize,
    pub text: &'a str,
}

impl<'a> Line<'a> {
    /// Whitespace-separated tokens of the line
    pub fn tokens(&self) -> impl Iterator<Item = &'a str> {
        self.text.split_ascii_whitespace()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Buffered line reader that counts lines
pub struct LineReader<R> {
    inner: R,
    buffer: String,
    line_no: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: String::new(),
            line_no: 0,
        }
    }

    /// Number of the last line handed out (0 before the first read)
    pub fn line_number(&self) -> usize {
        self.line_no
    }

    /// Read the next line, `None` at end of input
    pub fn next_line(&mut self) -> Result<Option<Line<'_>>> {
        self.buffer.clear();
        let bytes_read = self.inner.read_line(&mut self.buffer)?;
        if bytes_read == 0 {
            return Ok(None);
        }

        self.line_no += 1;
        Ok(Some(Line {
            number: self.line_no,
            text: self.buffer.trim_end_matches(|c: char| c == '\n' || c == '\r'),
        }))
    }

    /// Read the next line, treating end of input as an error
    pub fn expect_line(&mut self, context: &'static str) -> Result<Line<'_>> {
        let line = self.line_no;
        self.next_line()?
            .ok_or(DecoderError::UnexpectedEndOfInput { line, context })
    }
}

/// Continuous token stream over consecutive physical lines
///
/// A new line is pulled only when the current one has no tokens left, so
/// after the last expected token the underlying reader sits at the end of
/// that token's line.
pub struct TokenCursor<'r, R> {
    lines: &'r mut LineReader<R>,
    context: &'static str,
    tokens: VecDeque<String>,
    line: usize,
    width: usize,
    lines_loaded: usize,
}

impl<'r, R: BufRead> TokenCursor<'r, R> {
    pub fn new(lines: &'r mut LineReader<R>, context: &'static str) -> Self {
        let line = lines.line_number();
        Self {
            lines,
            context,
            tokens: VecDeque::new(),
            line,
            width: 0,
            lines_loaded: 0,
        }
    }

    /// Next token and the line it sits on
    pub fn next_token(&mut self) -> Result<(usize, String)> {
        while self.tokens.is_empty() {
            let line = self.lines.expect_line(self.context)?;
            self.tokens = line.tokens().map(str::to_string).collect();
            self.line = line.number;
            self.width = self.tokens.len();
            self.lines_loaded += 1;
            log::trace!("{}: line {} holds {} tokens", self.context, self.line, self.width);
        }

        match self.tokens.pop_front() {
            Some(token) => Ok((self.line, token)),
            None => Err(DecoderError::UnexpectedEndOfInput {
                line: self.line,
                context: self.context,
            }),
        }
    }

    /// Line of the most recently returned token
    pub fn line(&self) -> usize {
        self.line
    }

    /// Token count of the current physical line
    pub fn line_width(&self) -> usize {
        self.width
    }

    /// Physical lines pulled so far
    pub fn lines_loaded(&self) -> usize {
        self.lines_loaded
    }

    /// Tokens left unread on the current line
    pub fn remaining(&self) -> &VecDeque<String> {
        &self.tokens
    }
}

/// Parse an integer token
pub fn parse_int(token: &str) -> Option<i64> {
    token.parse::<i64>().ok()
}

/// Parse a real token, accepting Fortran `D` exponents
pub fn parse_real(token: &str) -> Option<f64> {
    match token.parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) if token.contains(['d', 'D']) => token.replace(['d', 'D'], "e").parse().ok(),
        Err(_) => None,
    }
}

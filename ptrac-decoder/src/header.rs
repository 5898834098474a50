//! PTRAC header parser
//!
//! The header describes the file itself: code metadata, the echoed input
//! block, and the field layout of every record kind that follows. Layouts are
//! declared in two token streams that may wrap across physical lines: first
//! the field counts, then the variable type code of each field.

use crate::config::DecoderConfig;
use crate::format::{
    EventCategory, FormatSpec, FormatTable, Schema, VariableType, DECLARATION_WRAP_WIDTH,
};
use crate::reader::{parse_int, parse_real, LineReader, TokenCursor};
use crate::types::{DecoderError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// Value of the first header line
pub const FILE_IDENTIFIER: i64 = -1;

/// Reals per echoed input line
pub const INPUT_ITEMS_PER_LINE: usize = 10;

/// Parsed PTRAC file header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHeader {
    /// Code name, e.g. "mcnp"
    pub code: String,
    pub version: String,
    pub load_date: String,
    pub machine_date: String,
    pub machine_time: String,
    pub title: String,
    /// Echoed input values, 10 per header line, in file order
    pub input_items: Vec<f64>,
    pub transport_particle: i64,
    pub output_multiplier: i64,
    /// Record layouts declared by the header
    pub formats: FormatTable,
}

impl FileHeader {
    /// Load date of the code, if it is in a recognised format
    pub fn load_date_parsed(&self) -> Option<NaiveDate> {
        parse_date(&self.load_date)
    }

    /// Date and time the run was made, if both are in a recognised format
    pub fn machine_timestamp(&self) -> Option<NaiveDateTime> {
        let date = parse_date(&self.machine_date)?;
        let time = NaiveTime::parse_from_str(&self.machine_time, "%H:%M:%S").ok()?;
        Some(date.and_time(time))
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    ["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn malformed(line: usize, reason: impl Into<String>) -> DecoderError {
    DecoderError::MalformedHeader {
        line,
        reason: reason.into(),
    }
}

/// Parse the header and leave `lines` at the first history start line
///
/// Nothing is returned unless every header section parsed; any malformed
/// section makes the rest of the file untrustworthy.
pub fn parse_header<R: BufRead>(
    lines: &mut LineReader<R>,
    config: &DecoderConfig,
) -> Result<FileHeader> {
    let schema = Schema::new(config.schema);

    // Line 1: file identifier
    {
        let line = lines.expect_line("file identifier")?;
        let token = line
            .tokens()
            .next()
            .ok_or_else(|| malformed(line.number, "empty identifier line"))?;
        let identifier = parse_int(token).ok_or_else(|| {
            malformed(line.number, format!("identifier '{}' is not an integer", token))
        })?;
        if identifier != FILE_IDENTIFIER {
            return Err(malformed(
                line.number,
                format!(
                    "file identifier mismatch: {} != {}",
                    identifier, FILE_IDENTIFIER
                ),
            ));
        }
    }

    // Line 2: code, version, load date, machine date, machine time
    let (code, version, load_date, machine_date, machine_time) = {
        let line = lines.expect_line("code metadata")?;
        let tokens: Vec<&str> = line.tokens().collect();
        if tokens.len() < 5 {
            return Err(malformed(
                line.number,
                format!("expected 5 metadata fields, found {}", tokens.len()),
            ));
        }
        (
            tokens[0].to_string(),
            tokens[1].to_string(),
            tokens[2].to_string(),
            tokens[3].to_string(),
            tokens[4].to_string(),
        )
    };
    if !code.starts_with(config.expected_code.as_str()) {
        log::warn!(
            "Expected code '{}' on line 2, got '{}'; continuing",
            config.expected_code,
            code
        );
    }
    log::info!(
        "{} version {} (loaded {}), run {} {}",
        code,
        version,
        load_date,
        machine_date,
        machine_time
    );

    // Line 3: title
    let title = lines.expect_line("title")?.text.to_string();
    log::info!("Title: '{}'", title);

    // Echoed input block
    let mut input_items = Vec::with_capacity(config.input_lines * INPUT_ITEMS_PER_LINE);
    for _ in 0..config.input_lines {
        let line = lines.expect_line("echoed input")?;
        let mut count = 0;
        for token in line.tokens() {
            let value = parse_real(token).ok_or_else(|| {
                malformed(line.number, format!("input item '{}' is not a real", token))
            })?;
            input_items.push(value);
            count += 1;
        }
        if count != INPUT_ITEMS_PER_LINE {
            return Err(malformed(
                line.number,
                format!(
                    "expected {} input items, found {}",
                    INPUT_ITEMS_PER_LINE, count
                ),
            ));
        }
    }
    log::debug!("Read {} echoed input items", input_items.len());

    let (mut formats, transport_particle, output_multiplier) = parse_layout(lines, &schema)?;
    parse_variable_codes(lines, &mut formats)?;
    validate_layouts(&formats, lines.line_number())?;

    log::info!(
        "Header parsed ({} lines): transport particle {}, output multiplier {}",
        lines.line_number(),
        transport_particle,
        output_multiplier
    );
    for spec in std::iter::once(&formats.start).chain(formats.kinds.iter()) {
        log::debug!(
            "{} layout: {} integer {:?}, {} real {:?}",
            spec.category,
            spec.n_integer,
            spec.integer_fields,
            spec.n_real,
            spec.real_fields
        );
    }

    Ok(FileHeader {
        code,
        version,
        load_date,
        machine_date,
        machine_time,
        title,
        input_items,
        transport_particle,
        output_multiplier,
        formats,
    })
}

/// Field counts: start record, one pair per record kind, then the
/// transport particle and output multiplier
fn parse_layout<R: BufRead>(
    lines: &mut LineReader<R>,
    schema: &Schema,
) -> Result<(FormatTable, i64, i64)> {
    let mut cursor = TokenCursor::new(lines, "layout declaration");

    let n_start = next_count(&mut cursor)?;
    let mut kinds = Vec::with_capacity(schema.record_kinds().len());
    for &category in schema.record_kinds() {
        let n_integer = next_count(&mut cursor)?;
        let n_real = next_count(&mut cursor)?;
        kinds.push(FormatSpec::with_counts(category, n_integer, n_real));
    }
    let transport_particle = next_int(&mut cursor)?;
    let output_multiplier = next_int(&mut cursor)?;

    let extra = cursor.remaining().len();
    if extra > 0 {
        return Err(malformed(
            cursor.line(),
            format!(
                "{} unexpected tokens after the layout declaration; \
                 the file does not match the '{}' schema ({} record kinds)",
                extra,
                schema.version,
                schema.record_kinds().len()
            ),
        ));
    }

    let table = FormatTable {
        start: FormatSpec::with_counts(EventCategory::HistoryStart, n_start, 0),
        kinds,
    };
    Ok((table, transport_particle, output_multiplier))
}

/// Variable type codes: start record first, then for each record kind its
/// integer fields followed by its real fields
fn parse_variable_codes<R: BufRead>(
    lines: &mut LineReader<R>,
    formats: &mut FormatTable,
) -> Result<()> {
    let mut cursor = TokenCursor::new(lines, "variable type declaration");
    let start_codes = formats.start.n_integer;

    for _ in 0..formats.start.n_integer {
        let var = next_variable(&mut cursor, start_codes)?;
        formats.start.integer_fields.push(var);
    }

    for spec in formats.kinds.iter_mut() {
        for _ in 0..spec.n_integer {
            let var = next_variable(&mut cursor, start_codes)?;
            spec.integer_fields.push(var);
        }
        for _ in 0..spec.n_real {
            let var = next_variable(&mut cursor, start_codes)?;
            spec.real_fields.push(var);
        }
    }

    let extra = cursor.remaining().len();
    if extra > 0 {
        return Err(malformed(
            cursor.line(),
            format!("{} variable codes beyond the declared layout", extra),
        ));
    }
    Ok(())
}

fn next_int<R: BufRead>(cursor: &mut TokenCursor<'_, R>) -> Result<i64> {
    let (line, token) = cursor.next_token()?;
    parse_int(&token)
        .ok_or_else(|| malformed(line, format!("'{}' is not an integer", token)))
}

fn next_count<R: BufRead>(cursor: &mut TokenCursor<'_, R>) -> Result<usize> {
    let value = next_int(cursor)?;
    usize::try_from(value)
        .map_err(|_| malformed(cursor.line(), format!("negative field count {}", value)))
}

fn next_variable<R: BufRead>(
    cursor: &mut TokenCursor<'_, R>,
    start_codes: usize,
) -> Result<VariableType> {
    let (line, token) = cursor.next_token()?;

    // The first line also carries the start record codes
    let allowed = if cursor.lines_loaded() == 1 {
        DECLARATION_WRAP_WIDTH + start_codes
    } else {
        DECLARATION_WRAP_WIDTH
    };
    if cursor.line_width() > allowed {
        return Err(malformed(
            line,
            format!(
                "{} variable codes on one line; declarations wrap at {} per line",
                cursor.line_width(),
                DECLARATION_WRAP_WIDTH
            ),
        ));
    }

    let code = parse_int(&token)
        .ok_or_else(|| malformed(line, format!("variable code '{}' is not an integer", token)))?;
    u8::try_from(code)
        .ok()
        .and_then(VariableType::from_code)
        .ok_or(DecoderError::UnknownVariableType { line, token })
}

/// Every layout must carry what the event loop needs to advance
fn validate_layouts(formats: &FormatTable, line: usize) -> Result<()> {
    if !formats.start.declares(VariableType::FirstEventType) {
        return Err(malformed(
            line,
            "start record does not declare the type of first event",
        ));
    }

    for spec in formats.kinds.iter().filter(|spec| spec.is_declared()) {
        if !spec.declares(VariableType::NextEventType) {
            return Err(malformed(
                line,
                format!("{} record does not declare the next event type", spec.category),
            ));
        }
    }
    Ok(())
}

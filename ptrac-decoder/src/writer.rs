//! ASCII PTRAC writer
//!
//! Writes a header and histories back out in the layout the decoder reads.
//! Reals use Rust's shortest exponent form, which parses back to the same
//! bits, so decoding the output reproduces the original histories exactly.

use crate::format::{FieldKind, FormatTable, VariableType, DECLARATION_WRAP_WIDTH};
use crate::header::{FileHeader, FILE_IDENTIFIER, INPUT_ITEMS_PER_LINE};
use crate::types::{DecoderError, History, Result, Step};
use std::io::Write;

/// Writes PTRAC text to any `Write` sink
pub struct PtracWriter<W: Write> {
    out: W,
    lines_written: usize,
}

impl<W: Write> PtracWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            lines_written: 0,
        }
    }

    /// Lines written so far
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Write every header section, ending just before the first history
    pub fn write_header(&mut self, header: &FileHeader) -> Result<()> {
        if header.input_items.len() % INPUT_ITEMS_PER_LINE != 0 {
            return Err(DecoderError::MalformedHeader {
                line: self.lines_written + 4,
                reason: format!(
                    "{} input items do not fill whole lines of {}",
                    header.input_items.len(),
                    INPUT_ITEMS_PER_LINE
                ),
            });
        }

        self.line(&FILE_IDENTIFIER.to_string())?;
        self.line(&format!(
            "{} {} {} {} {}",
            header.code,
            header.version,
            header.load_date,
            header.machine_date,
            header.machine_time
        ))?;
        self.line(&header.title)?;

        for chunk in header.input_items.chunks(INPUT_ITEMS_PER_LINE) {
            let text = join(chunk.iter().map(|v| format_real(*v)));
            self.line(&text)?;
        }

        let formats = &header.formats;
        let mut counts = vec![formats.start.n_integer.to_string()];
        for spec in &formats.kinds {
            counts.push(spec.n_integer.to_string());
            counts.push(spec.n_real.to_string());
        }
        counts.push(header.transport_particle.to_string());
        counts.push(header.output_multiplier.to_string());
        self.line(&counts.join(" "))?;

        // Start codes lead the first line; only record-kind codes count
        // toward the wrap width
        let kind_codes: Vec<String> = formats
            .kinds
            .iter()
            .flat_map(|spec| spec.integer_fields.iter().chain(spec.real_fields.iter()))
            .map(|var| var.code().to_string())
            .collect();
        let split = kind_codes.len().min(DECLARATION_WRAP_WIDTH);
        let mut first: Vec<String> = formats
            .start
            .integer_fields
            .iter()
            .map(|var| var.code().to_string())
            .collect();
        first.extend_from_slice(&kind_codes[..split]);
        self.line(&first.join(" "))?;
        for chunk in kind_codes[split..].chunks(DECLARATION_WRAP_WIDTH) {
            self.line(&chunk.join(" "))?;
        }

        log::debug!("Wrote header ({} lines)", self.lines_written);
        Ok(())
    }

    /// Write one history: its start line and two lines per step
    pub fn write_history(&mut self, history: &History, formats: &FormatTable) -> Result<()> {
        let line = self.lines_written + 1;
        let start = formats
            .start
            .integer_fields
            .iter()
            .map(|&var| {
                let value = match var {
                    VariableType::Nps => Some(history.nps),
                    VariableType::FirstEventType => Some(history.first_event),
                    VariableType::NpsCell => history.initial_cell,
                    _ => None,
                };
                value
                    .map(|v| v.to_string())
                    .ok_or_else(|| missing_value(line, var))
            })
            .collect::<Result<Vec<_>>>()?;
        self.line(&start.join(" "))?;

        for step in &history.steps {
            let line = self.lines_written + 1;
            let spec = formats
                .spec_for(step.category)
                .ok_or(DecoderError::MissingFormatForCategory {
                    line,
                    category: step.category,
                })?;

            let integers = step_fields(step, &spec.integer_fields, line)?;
            self.line(&integers)?;
            let reals = step_fields(step, &spec.real_fields, line + 1)?;
            self.line(&reals)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Flush and hand back the sink
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        self.lines_written += 1;
        Ok(())
    }
}

/// Render the declared fields of one step half
fn step_fields(step: &Step, fields: &[VariableType], line: usize) -> Result<String> {
    let values = fields
        .iter()
        .map(|&var| {
            let text = match var.kind() {
                FieldKind::Integer => step.integer_value(var).map(|v| v.to_string()),
                FieldKind::Real => step.real_value(var).map(format_real),
            };
            text.ok_or_else(|| missing_value(line, var))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(values.join(" "))
}

fn missing_value(line: usize, var: VariableType) -> DecoderError {
    DecoderError::MalformedRecord {
        line,
        reason: format!("no value for declared field '{}'", var),
    }
}

fn format_real(value: f64) -> String {
    format!("{:E}", value)
}

fn join(values: impl Iterator<Item = String>) -> String {
    values.collect::<Vec<_>>().join(" ")
}

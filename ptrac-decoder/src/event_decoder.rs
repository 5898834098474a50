//! History decoding state machine
//!
//! After the header, a PTRAC file is a sequence of histories. Each history is
//! one start line followed by two-line step records. The type of every step
//! is announced by the step before it (or, for the first step, by the start
//! line), and a next event type in the end-of-history band closes the
//! history.
//!
//! ```text
//! AwaitingHistoryStart -> AwaitingStepLine1 -> AwaitingStepLine2
//!                               ^                    |
//!                               +--------------------+ (next != end)
//!                                                    |
//!                                          HistoryComplete (next == end)
//! ```

use crate::dispatch::FieldDispatcher;
use crate::format::{EventCategory, EventTypeCode, FormatSpec};
use crate::header::FileHeader;
use crate::reader::{parse_int, parse_real, Line, LineReader};
use crate::types::{DecoderError, History, Result, Step};
use std::io::BufRead;

/// Position of the decoder within the history stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    AwaitingHistoryStart,
    AwaitingStepLine1,
    AwaitingStepLine2,
    HistoryComplete,
    Eof,
}

/// Decodes one history per call from the lines following the header
pub struct EventDecoder {
    max_steps: usize,
    state: DecodeState,
}

impl EventDecoder {
    /// Create a decoder that rejects histories longer than `max_steps`
    pub fn new(max_steps: usize) -> Self {
        Self {
            max_steps,
            state: DecodeState::AwaitingHistoryStart,
        }
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Decode the next history
    ///
    /// Returns `Ok(None)` when the input ends cleanly before a new history
    /// starts. End of input anywhere inside a history is an error, and no
    /// partial history is ever returned.
    pub fn next_history<R: BufRead>(
        &mut self,
        header: &FileHeader,
        lines: &mut LineReader<R>,
    ) -> Result<Option<History>> {
        if self.state == DecodeState::Eof {
            return Ok(None);
        }
        self.transition(DecodeState::AwaitingHistoryStart);

        let mut history = History::new();

        // Start line; blank lines between histories are tolerated
        loop {
            let line = match lines.next_line()? {
                Some(line) => line,
                None => {
                    self.transition(DecodeState::Eof);
                    return Ok(None);
                }
            };
            if line.is_blank() {
                continue;
            }
            decode_start_line(&header.formats.start, &mut history, &line)?;
            break;
        }

        let mut next_event = history.first_event;
        loop {
            self.transition(DecodeState::AwaitingStepLine1);
            let step = self.decode_step(header, lines, &history, next_event)?;
            next_event = step.next_event.ok_or_else(|| DecoderError::MalformedRecord {
                line: lines.line_number(),
                reason: format!("{} record carries no next event type", step.category),
            })?;
            history.steps.push(step);

            if EventTypeCode(next_event).category() == Some(EventCategory::EndOfHistory) {
                break;
            }
        }

        self.transition(DecodeState::HistoryComplete);
        log::debug!(
            "History {} complete: {} steps (line {})",
            history.nps,
            history.n_steps(),
            lines.line_number()
        );
        Ok(Some(history))
    }

    /// Decode one two-line step record announced by `event`
    fn decode_step<R: BufRead>(
        &mut self,
        header: &FileHeader,
        lines: &mut LineReader<R>,
        history: &History,
        event: i64,
    ) -> Result<Step> {
        let line = lines.expect_line("step record")?;

        let (category, bank_reason) = EventTypeCode(event)
            .decompose()
            .ok_or(DecoderError::UnknownEventCategory {
                line: line.number,
                code: event,
            })?;

        if history.n_steps() >= self.max_steps {
            return Err(DecoderError::StepLimitExceeded {
                line: line.number,
                nps: history.nps,
                limit: self.max_steps,
            });
        }

        let spec = header
            .formats
            .spec_for(category)
            .ok_or(DecoderError::MissingFormatForCategory {
                line: line.number,
                category,
            })?;

        let mut step = Step::new(category, bank_reason);
        decode_integer_line(spec, &mut step, &line)?;

        self.transition(DecodeState::AwaitingStepLine2);
        let line = lines.expect_line("step record")?;
        decode_real_line(spec, &mut step, &line)?;

        log::trace!(
            "History {} step {}: {} (bank reason {:?}) -> next {:?}",
            history.nps,
            history.n_steps() + 1,
            category,
            bank_reason,
            step.next_event
        );
        Ok(step)
    }

    fn transition(&mut self, next: DecodeState) {
        log::trace!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Tokens of a record line, which must match the declared field count
fn record_tokens<'a>(line: &Line<'a>, expected: usize, what: &str) -> Result<Vec<&'a str>> {
    let tokens: Vec<&'a str> = line.tokens().collect();
    if tokens.len() != expected {
        return Err(DecoderError::MalformedRecord {
            line: line.number,
            reason: format!(
                "expected {} {} fields, found {}",
                expected,
                what,
                tokens.len()
            ),
        });
    }
    Ok(tokens)
}

fn bad_token(line: usize, token: &str, expected: &str) -> DecoderError {
    DecoderError::MalformedRecord {
        line,
        reason: format!("'{}' is not {}", token, expected),
    }
}

fn decode_start_line(spec: &FormatSpec, history: &mut History, line: &Line<'_>) -> Result<()> {
    let tokens = record_tokens(line, spec.n_integer, "history start")?;
    for (&var, token) in spec.integer_fields.iter().zip(tokens) {
        let value = parse_int(token).ok_or_else(|| bad_token(line.number, token, "an integer"))?;
        FieldDispatcher::apply_start(history, var, value, line.number)?;
    }
    Ok(())
}

fn decode_integer_line(spec: &FormatSpec, step: &mut Step, line: &Line<'_>) -> Result<()> {
    let tokens = record_tokens(line, spec.n_integer, "integer")?;
    for (&var, token) in spec.integer_fields.iter().zip(tokens) {
        let value = parse_int(token).ok_or_else(|| bad_token(line.number, token, "an integer"))?;
        FieldDispatcher::apply_integer(step, var, value, line.number)?;
    }
    Ok(())
}

fn decode_real_line(spec: &FormatSpec, step: &mut Step, line: &Line<'_>) -> Result<()> {
    let tokens = record_tokens(line, spec.n_real, "real")?;
    for (&var, token) in spec.real_fields.iter().zip(tokens) {
        let value = parse_real(token).ok_or_else(|| bad_token(line.number, token, "a real"))?;
        FieldDispatcher::apply_real(step, var, value, line.number)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecoderConfig;
    use crate::dispatch::RecordHalf;
    use crate::format::VariableType;
    use crate::header::parse_header;
    use std::io::Cursor;

    const MINIMAL: &str = include_str!("../tests/data/minimal.ptrac");
    const FULL: &str = include_str!("../tests/data/full.ptrac");

    fn open(text: &str, input_lines: usize) -> (FileHeader, LineReader<Cursor<String>>) {
        let mut lines = LineReader::new(Cursor::new(text.to_string()));
        let config = DecoderConfig::new().with_input_lines(input_lines);
        let header = parse_header(&mut lines, &config).unwrap();
        (header, lines)
    }

    fn decode_all(text: &str, input_lines: usize, max_steps: usize) -> Result<Vec<History>> {
        let (header, mut lines) = open(text, input_lines);
        let mut decoder = EventDecoder::new(max_steps);
        let mut histories = Vec::new();
        while let Some(history) = decoder.next_history(&header, &mut lines)? {
            histories.push(history);
        }
        Ok(histories)
    }

    #[test]
    fn test_minimal_history() {
        let histories = decode_all(MINIMAL, 1, 100).unwrap();
        assert_eq!(histories.len(), 1);

        let history = &histories[0];
        assert_eq!(history.nps, 1);
        assert_eq!(history.first_event, 4000);
        assert_eq!(history.initial_cell, Some(5));
        assert_eq!(history.n_steps(), 2);

        let first = &history.steps[0];
        assert_eq!(first.category, EventCategory::Collision);
        assert_eq!(first.next_event, Some(4000));
        assert_eq!(first.cell_number, Some(10));
        assert_eq!(first.material_number, Some(2));
        assert_eq!(first.collision_count, Some(1));
        assert_eq!(
            (first.x, first.y, first.z),
            (Some(1.0), Some(2.0), Some(3.0))
        );
        assert_eq!((first.u, first.v, first.w), (Some(0.0), Some(0.0), Some(1.0)));
        assert_eq!(first.energy, Some(14.1));
        assert_eq!(first.weight, Some(1.0));
        assert_eq!(first.time, Some(0.5));
        assert_eq!(first.surface_number, None);

        // The step announcing the end marker belongs to the history
        let last = &history.steps[1];
        assert_eq!(last.category, EventCategory::Collision);
        assert_eq!(last.next_event, Some(9000));
        assert_eq!(last.collision_count, Some(2));
        assert_eq!(last.time, Some(0.75));
    }

    #[test]
    fn test_clean_end_of_stream() {
        let (header, mut lines) = open(MINIMAL, 1);
        let mut decoder = EventDecoder::new(100);

        assert!(decoder.next_history(&header, &mut lines).unwrap().is_some());
        assert_eq!(decoder.state(), DecodeState::HistoryComplete);
        assert!(decoder.next_history(&header, &mut lines).unwrap().is_none());
        assert_eq!(decoder.state(), DecodeState::Eof);
        assert!(decoder.next_history(&header, &mut lines).unwrap().is_none());
    }

    #[test]
    fn test_categories_and_bank_reasons() {
        let histories = decode_all(FULL, 2, 100).unwrap();
        assert_eq!(histories.len(), 2);

        let history = &histories[0];
        assert_eq!(history.nps, 7);
        let categories: Vec<_> = history.steps.iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            vec![
                EventCategory::Source,
                EventCategory::Bank,
                EventCategory::Surface,
                EventCategory::Collision,
                EventCategory::Bank,
                EventCategory::Termination,
            ]
        );

        let reasons: Vec<_> = history.steps.iter().map(|s| s.bank_reason).collect();
        assert_eq!(reasons, vec![None, Some(5), None, None, Some(500), None]);

        let surface = &history.steps[2];
        assert_eq!(surface.surface_number, Some(10));
        assert_eq!(surface.surface_angle, Some(45));
        assert_eq!(surface.energy, Some(13.5));
        assert_eq!(surface.weight, None);

        let collision = &history.steps[3];
        assert_eq!(collision.nuclide, Some(1001));
        assert_eq!(collision.reaction_type, Some(2));
        assert_eq!(collision.next_event, Some(2500));
        assert_eq!(collision.time, Some(1.25e-9));

        let termination = &history.steps[5];
        assert_eq!(termination.termination_type, Some(11));
        assert_eq!(termination.time, Some(3.5e-8));

        let second = &histories[1];
        assert_eq!(second.nps, 8);
        assert_eq!(second.n_steps(), 1);
        assert_eq!(second.steps[0].next_category(), Some(EventCategory::EndOfHistory));
    }

    #[test]
    fn test_step_limit() {
        // Two steps fit exactly
        assert_eq!(decode_all(MINIMAL, 1, 2).unwrap()[0].n_steps(), 2);

        let (header, mut lines) = open(MINIMAL, 1);
        let mut decoder = EventDecoder::new(1);
        match decoder.next_history(&header, &mut lines) {
            Err(DecoderError::StepLimitExceeded { line, nps, limit }) => {
                assert_eq!(line, 10);
                assert_eq!(nps, 1);
                assert_eq!(limit, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_category() {
        let text = MINIMAL.replacen("1 4000 5", "1 6000 5", 1);
        match decode_all(&text, 1, 100) {
            Err(DecoderError::UnknownEventCategory { line, code }) => {
                assert_eq!(line, 8);
                assert_eq!(code, 6000);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_format_for_category() {
        let text = MINIMAL.replacen("1 4000 5", "1 3000 5", 1);
        match decode_all(&text, 1, 100) {
            Err(DecoderError::MissingFormatForCategory { line, category }) => {
                assert_eq!(line, 8);
                assert_eq!(category, EventCategory::Surface);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_end_of_input_inside_history() {
        let cut = MINIMAL.trim_end().rsplit_once('\n').unwrap().0;
        match decode_all(cut, 1, 100) {
            Err(DecoderError::UnexpectedEndOfInput { line, .. }) => assert_eq!(line, 10),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_field_count_mismatch() {
        let text = MINIMAL.replacen("4000 10 2 1\n", "4000 10 2\n", 1);
        assert!(matches!(
            decode_all(&text, 1, 100),
            Err(DecoderError::MalformedRecord { line: 8, .. })
        ));
    }

    #[test]
    fn test_bad_real_token() {
        let text = MINIMAL.replacen("14.1", "fourteen", 1);
        assert!(matches!(
            decode_all(&text, 1, 100),
            Err(DecoderError::MalformedRecord { line: 9, .. })
        ));
    }

    #[test]
    fn test_field_not_valid_in_context() {
        // Declare the energy column (26) on the integer line of collisions
        let text = MINIMAL
            .replacen("3 0 0 0 0 0 0 4 9", "3 0 0 0 0 0 0 5 8", 1)
            .replacen("7 17 18 19 20", "7 17 18 19 26 20", 1)
            .replacen("24 25 26 27 28", "24 25 27 28", 1)
            .replacen("4000 10 2 1\n1.0 2.0 3.0 0.0 0.0 1.0 14.1 1.0 0.5", "4000 10 2 1 14\n1.0 2.0 3.0 0.0 0.0 1.0 1.0 0.5", 1);
        match decode_all(&text, 1, 100) {
            Err(DecoderError::FieldNotValidInContext {
                line,
                variable,
                context,
            }) => {
                assert_eq!(line, 8);
                assert_eq!(variable, VariableType::Energy);
                assert_eq!(context, RecordHalf::Integer);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

//! Core types for the PTRAC decoder library
//!
//! This module defines the values the decoder emits: one [`History`] per
//! particle, each holding the ordered [`Step`]s recorded for it, and the
//! [`DecoderError`] taxonomy.

use crate::dispatch::RecordHalf;
use crate::format::{EventCategory, EventTypeCode, VariableType};
use serde::{Deserialize, Serialize};

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that can occur during decoding
///
/// None of these are recoverable within a decode session: the format is not
/// self-delimiting, so the decoder never tries to skip ahead. Histories
/// yielded before the error stay valid.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Malformed header at line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },

    #[error("Unknown variable type code '{token}' at line {line}")]
    UnknownVariableType { line: usize, token: String },

    #[error("Unknown event type {code} at line {line}")]
    UnknownEventCategory { line: usize, code: i64 },

    #[error("No record layout declared for {category} events (line {line})")]
    MissingFormatForCategory { line: usize, category: EventCategory },

    #[error("History {nps} exceeds the maximum of {limit} steps at line {line}")]
    StepLimitExceeded { line: usize, nps: i64, limit: usize },

    #[error("Unexpected end of input after line {line} while reading {context}")]
    UnexpectedEndOfInput { line: usize, context: &'static str },

    #[error("'{variable}' is not valid in the {context} (line {line})")]
    FieldNotValidInContext {
        line: usize,
        variable: VariableType,
        context: RecordHalf,
    },

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DecoderError {
    /// Line the error was detected on, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            DecoderError::MalformedHeader { line, .. }
            | DecoderError::UnknownVariableType { line, .. }
            | DecoderError::UnknownEventCategory { line, .. }
            | DecoderError::MissingFormatForCategory { line, .. }
            | DecoderError::StepLimitExceeded { line, .. }
            | DecoderError::UnexpectedEndOfInput { line, .. }
            | DecoderError::FieldNotValidInContext { line, .. }
            | DecoderError::MalformedRecord { line, .. } => Some(*line),
            DecoderError::IoError(_) => None,
        }
    }
}

/// All recorded steps of one simulated particle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    /// History number (NPS)
    pub nps: i64,
    /// Raw event type code of the first event
    pub first_event: i64,
    /// Starting cell, if the start record declares it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_cell: Option<i64>,
    /// Steps in file order
    pub steps: Vec<Step>,
}

impl History {
    pub fn new() -> Self {
        Self {
            nps: 0,
            first_event: 0,
            initial_cell: None,
            steps: Vec::new(),
        }
    }

    /// Category of the first event
    pub fn first_category(&self) -> Option<EventCategory> {
        EventTypeCode(self.first_event).category()
    }

    pub fn n_steps(&self) -> usize {
        self.steps.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

/// One recorded event of a history
///
/// Every physical field is `None` unless the layout of this record kind
/// declares it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Step {
    /// Category of this step
    pub category: EventCategory,
    /// Bank sub-reason, only for bank steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_reason: Option<u32>,
    /// Raw event type code of the following step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_event: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_number: Option<i64>,
    /// ZZAAA identifier of the interaction nuclide
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nuclide: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_type: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_number: Option<i64>,
    /// Angle with the surface normal, degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_angle: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_type: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub particle_type: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collision_count: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub u: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
}

impl Step {
    /// Empty step of the given category
    pub fn new(category: EventCategory, bank_reason: Option<u32>) -> Self {
        Self {
            category,
            bank_reason,
            ..Default::default()
        }
    }

    /// Category of the following step, if the next event code is known and valid
    pub fn next_category(&self) -> Option<EventCategory> {
        self.next_event
            .and_then(|code| EventTypeCode(code).category())
    }

    /// Value of an integer-kind step field
    pub fn integer_value(&self, var: VariableType) -> Option<i64> {
        match var {
            VariableType::NextEventType => self.next_event,
            VariableType::NodeCount => self.node_count,
            VariableType::SourceNumber => self.source_number,
            VariableType::Nuclide => self.nuclide,
            VariableType::ReactionType => self.reaction_type,
            VariableType::SurfaceNumber => self.surface_number,
            VariableType::SurfaceAngle => self.surface_angle,
            VariableType::TerminationType => self.termination_type,
            VariableType::BranchNumber => self.branch_number,
            VariableType::ParticleType => self.particle_type,
            VariableType::CellNumber => self.cell_number,
            VariableType::MaterialNumber => self.material_number,
            VariableType::CollisionCount => self.collision_count,
            _ => None,
        }
    }

    /// Value of a real-kind step field
    pub fn real_value(&self, var: VariableType) -> Option<f64> {
        match var {
            VariableType::X => self.x,
            VariableType::Y => self.y,
            VariableType::Z => self.z,
            VariableType::U => self.u,
            VariableType::V => self.v,
            VariableType::W => self.w,
            VariableType::Energy => self.energy,
            VariableType::Weight => self.weight,
            VariableType::Time => self.time,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_line_numbers() {
        let err = DecoderError::StepLimitExceeded {
            line: 42,
            nps: 7,
            limit: 10,
        };
        assert_eq!(err.line(), Some(42));
        assert_eq!(
            err.to_string(),
            "History 7 exceeds the maximum of 10 steps at line 42"
        );

        let io = DecoderError::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(io.line(), None);
    }

    #[test]
    fn test_step_accessors() {
        let mut step = Step::new(EventCategory::Bank, Some(6));
        step.next_event = Some(9000);
        step.cell_number = Some(12);
        step.energy = Some(2.5);

        assert_eq!(step.next_category(), Some(EventCategory::EndOfHistory));
        assert_eq!(step.integer_value(VariableType::CellNumber), Some(12));
        assert_eq!(step.integer_value(VariableType::Energy), None);
        assert_eq!(step.real_value(VariableType::Energy), Some(2.5));
        assert_eq!(step.real_value(VariableType::X), None);
    }

    #[test]
    fn test_history_first_category() {
        let mut history = History::new();
        history.nps = 3;
        history.first_event = 2004;
        history.steps.push(Step::new(EventCategory::Bank, Some(4)));

        assert_eq!(history.first_category(), Some(EventCategory::Bank));
        assert_eq!(history.n_steps(), 1);

        history.first_event = 6000;
        assert_eq!(history.first_category(), None);
    }
}

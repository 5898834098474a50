//! Field dispatch
//!
//! Routes a decoded value, tagged with its [`VariableType`], into the matching
//! field of the [`History`] or [`Step`] being assembled. Each record context
//! accepts a fixed set of variable types; anything else is an error rather
//! than being dropped.

use crate::format::{FieldKind, VariableType};
use crate::types::{DecoderError, History, Result, Step};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record context a field was decoded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordHalf {
    /// History start line
    Start,
    /// First physical line of a step record
    Integer,
    /// Second physical line of a step record
    Real,
}

impl fmt::Display for RecordHalf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordHalf::Start => write!(f, "history start record"),
            RecordHalf::Integer => write!(f, "integer half of a step record"),
            RecordHalf::Real => write!(f, "real half of a step record"),
        }
    }
}

/// Routing table from variable types to history and step fields
pub struct FieldDispatcher;

impl FieldDispatcher {
    /// Whether `var` may appear in `half`
    pub fn accepts(half: RecordHalf, var: VariableType) -> bool {
        match half {
            RecordHalf::Start => matches!(
                var,
                VariableType::Nps | VariableType::FirstEventType | VariableType::NpsCell
            ),
            RecordHalf::Integer => Self::integer_step_field(var),
            RecordHalf::Real => Self::integer_step_field(var) || var.kind() == FieldKind::Real,
        }
    }

    /// Store a start-record value into the history
    pub fn apply_start(
        history: &mut History,
        var: VariableType,
        value: i64,
        line: usize,
    ) -> Result<()> {
        match var {
            VariableType::Nps => history.nps = value,
            VariableType::FirstEventType => history.first_event = value,
            VariableType::NpsCell => history.initial_cell = Some(value),
            _ => return Err(not_valid(var, RecordHalf::Start, line)),
        }
        Ok(())
    }

    /// Store an integer-half value into the step
    pub fn apply_integer(step: &mut Step, var: VariableType, value: i64, line: usize) -> Result<()> {
        let slot = integer_slot(step, var).ok_or_else(|| not_valid(var, RecordHalf::Integer, line))?;
        *slot = Some(value);
        Ok(())
    }

    /// Store a real-half value into the step
    ///
    /// Integer fields (node count, cell number, ...) may also be declared on
    /// the real line; they are decoded as reals and truncated toward zero.
    /// Values that are not finite or fall outside `i64` are rejected.
    pub fn apply_real(step: &mut Step, var: VariableType, value: f64, line: usize) -> Result<()> {
        if let Some(slot) = real_slot(step, var) {
            *slot = Some(value);
            return Ok(());
        }

        let slot = integer_slot(step, var).ok_or_else(|| not_valid(var, RecordHalf::Real, line))?;
        *slot = Some(truncate_to_integer(var, value, line)?);
        Ok(())
    }

    fn integer_step_field(var: VariableType) -> bool {
        var.kind() == FieldKind::Integer && var.code() >= VariableType::NextEventType.code()
    }
}

fn not_valid(variable: VariableType, context: RecordHalf, line: usize) -> DecoderError {
    DecoderError::FieldNotValidInContext {
        line,
        variable,
        context,
    }
}

/// Exact `i64` range as reals: [-2^63, 2^63)
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

fn truncate_to_integer(var: VariableType, value: f64, line: usize) -> Result<i64> {
    let truncated = value.trunc();
    if !(truncated >= I64_LOWER && truncated < I64_UPPER) {
        return Err(DecoderError::MalformedRecord {
            line,
            reason: format!("'{}' value {} is not a representable integer", var, value),
        });
    }
    Ok(truncated as i64)
}

fn integer_slot(step: &mut Step, var: VariableType) -> Option<&mut Option<i64>> {
    let slot = match var {
        VariableType::NextEventType => &mut step.next_event,
        VariableType::NodeCount => &mut step.node_count,
        VariableType::SourceNumber => &mut step.source_number,
        VariableType::Nuclide => &mut step.nuclide,
        VariableType::ReactionType => &mut step.reaction_type,
        VariableType::SurfaceNumber => &mut step.surface_number,
        VariableType::SurfaceAngle => &mut step.surface_angle,
        VariableType::TerminationType => &mut step.termination_type,
        VariableType::BranchNumber => &mut step.branch_number,
        VariableType::ParticleType => &mut step.particle_type,
        VariableType::CellNumber => &mut step.cell_number,
        VariableType::MaterialNumber => &mut step.material_number,
        VariableType::CollisionCount => &mut step.collision_count,
        _ => return None,
    };
    Some(slot)
}

fn real_slot(step: &mut Step, var: VariableType) -> Option<&mut Option<f64>> {
    let slot = match var {
        VariableType::X => &mut step.x,
        VariableType::Y => &mut step.y,
        VariableType::Z => &mut step.z,
        VariableType::U => &mut step.u,
        VariableType::V => &mut step.v,
        VariableType::W => &mut step.w,
        VariableType::Energy => &mut step.energy,
        VariableType::Weight => &mut step.weight,
        VariableType::Time => &mut step.time,
        _ => return None,
    };
    Some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::EventCategory;

    #[test]
    fn test_start_record_fields() {
        let mut history = History::new();
        FieldDispatcher::apply_start(&mut history, VariableType::Nps, 17, 1).unwrap();
        FieldDispatcher::apply_start(&mut history, VariableType::FirstEventType, 1000, 1).unwrap();
        FieldDispatcher::apply_start(&mut history, VariableType::NpsCell, 4, 1).unwrap();

        assert_eq!(history.nps, 17);
        assert_eq!(history.first_event, 1000);
        assert_eq!(history.initial_cell, Some(4));
    }

    #[test]
    fn test_start_record_rejects_other_fields() {
        let mut history = History::new();
        let err = FieldDispatcher::apply_start(&mut history, VariableType::NpsSurface, 3, 9)
            .unwrap_err();
        match err {
            DecoderError::FieldNotValidInContext {
                line,
                variable,
                context,
            } => {
                assert_eq!(line, 9);
                assert_eq!(variable, VariableType::NpsSurface);
                assert_eq!(context, RecordHalf::Start);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_integer_half() {
        let mut step = Step::new(EventCategory::Collision, None);
        FieldDispatcher::apply_integer(&mut step, VariableType::NextEventType, 9000, 2).unwrap();
        FieldDispatcher::apply_integer(&mut step, VariableType::CellNumber, 12, 2).unwrap();

        assert_eq!(step.next_event, Some(9000));
        assert_eq!(step.cell_number, Some(12));

        assert!(FieldDispatcher::apply_integer(&mut step, VariableType::Energy, 1, 2).is_err());
        assert!(FieldDispatcher::apply_integer(&mut step, VariableType::Nps, 1, 2).is_err());
        assert!(
            FieldDispatcher::apply_integer(&mut step, VariableType::TallySpecifier, 1, 2).is_err()
        );
    }

    #[test]
    fn test_real_half_accepts_integer_fields() {
        let mut step = Step::new(EventCategory::Surface, None);
        FieldDispatcher::apply_real(&mut step, VariableType::Energy, 14.1, 3).unwrap();
        FieldDispatcher::apply_real(&mut step, VariableType::NodeCount, 3.0, 3).unwrap();
        FieldDispatcher::apply_real(&mut step, VariableType::CellNumber, 7.9, 3).unwrap();

        assert_eq!(step.energy, Some(14.1));
        assert_eq!(step.node_count, Some(3));
        assert_eq!(step.cell_number, Some(7));

        assert!(FieldDispatcher::apply_real(&mut step, VariableType::FirstEventType, 1.0, 3).is_err());
    }

    #[test]
    fn test_real_half_rejects_unrepresentable_integers() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1.0e30, -1.0e19] {
            let mut step = Step::new(EventCategory::Collision, None);
            match FieldDispatcher::apply_real(&mut step, VariableType::CellNumber, value, 4) {
                Err(DecoderError::MalformedRecord { line, .. }) => assert_eq!(line, 4),
                other => panic!("{} accepted: {:?}", value, other),
            }
            assert_eq!(step.cell_number, None);
        }

        // Real fields keep whatever was written
        let mut step = Step::new(EventCategory::Collision, None);
        FieldDispatcher::apply_real(&mut step, VariableType::Energy, f64::INFINITY, 4).unwrap();
        assert_eq!(step.energy, Some(f64::INFINITY));

        FieldDispatcher::apply_real(&mut step, VariableType::NodeCount, -2.7, 4).unwrap();
        assert_eq!(step.node_count, Some(-2));
    }

    #[test]
    fn test_acceptance_matches_dispatch() {
        for var in VariableType::ALL {
            let mut history = History::new();
            let mut step = Step::default();
            assert_eq!(
                FieldDispatcher::accepts(RecordHalf::Start, var),
                FieldDispatcher::apply_start(&mut history, var, 1, 1).is_ok(),
                "start {:?}",
                var
            );
            assert_eq!(
                FieldDispatcher::accepts(RecordHalf::Integer, var),
                FieldDispatcher::apply_integer(&mut step, var, 1, 1).is_ok(),
                "integer {:?}",
                var
            );
            assert_eq!(
                FieldDispatcher::accepts(RecordHalf::Real, var),
                FieldDispatcher::apply_real(&mut step, var, 1.0, 1).is_ok(),
                "real {:?}",
                var
            );
        }
    }
}

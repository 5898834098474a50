//! PTRAC variable type table
//!
//! Every numeric column in a PTRAC record is tagged in the header with a small
//! integer code. This module maps those codes to their meaning.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a field holds an integer or a real value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Integer,
    Real,
}

/// Meaning of one decoded numeric field
///
/// The discriminants are the codes written in the PTRAC header. The set is
/// closed: codes outside `1..=28` do not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VariableType {
    /// History number (NPS)
    Nps = 1,
    /// Type of first history event
    FirstEventType = 2,
    /// Cell number on the start record
    NpsCell = 3,
    /// Nearest surface on the start record
    NpsSurface = 4,
    /// Tally specifier (JPTAL)
    TallySpecifier = 5,
    /// TFC specifier (TAL)
    TfcSpecifier = 6,
    /// Next event type
    NextEventType = 7,
    /// Number of nodes in track
    NodeCount = 8,
    /// Source number
    SourceNumber = 9,
    /// ZZAAA of the interaction nuclide
    Nuclide = 10,
    /// Reaction type
    ReactionType = 11,
    /// Surface number
    SurfaceNumber = 12,
    /// Angle with surface normal, degrees
    SurfaceAngle = 13,
    /// Termination type
    TerminationType = 14,
    /// Branch number
    BranchNumber = 15,
    /// Particle type
    ParticleType = 16,
    /// Cell number
    CellNumber = 17,
    /// Material number
    MaterialNumber = 18,
    /// Number of collisions
    CollisionCount = 19,
    X = 20,
    Y = 21,
    Z = 22,
    U = 23,
    V = 24,
    W = 25,
    /// Energy after the event
    Energy = 26,
    /// Weight after the event
    Weight = 27,
    /// Time of the event
    Time = 28,
}

impl VariableType {
    /// All variable types in code order
    pub const ALL: [VariableType; 28] = [
        VariableType::Nps,
        VariableType::FirstEventType,
        VariableType::NpsCell,
        VariableType::NpsSurface,
        VariableType::TallySpecifier,
        VariableType::TfcSpecifier,
        VariableType::NextEventType,
        VariableType::NodeCount,
        VariableType::SourceNumber,
        VariableType::Nuclide,
        VariableType::ReactionType,
        VariableType::SurfaceNumber,
        VariableType::SurfaceAngle,
        VariableType::TerminationType,
        VariableType::BranchNumber,
        VariableType::ParticleType,
        VariableType::CellNumber,
        VariableType::MaterialNumber,
        VariableType::CollisionCount,
        VariableType::X,
        VariableType::Y,
        VariableType::Z,
        VariableType::U,
        VariableType::V,
        VariableType::W,
        VariableType::Energy,
        VariableType::Weight,
        VariableType::Time,
    ];

    /// Look up a variable type by its header code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1..=28 => Some(Self::ALL[code as usize - 1]),
            _ => None,
        }
    }

    /// Header code of this variable type
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether the field carries an integer or a real value
    pub fn kind(self) -> FieldKind {
        if self.code() >= VariableType::X.code() {
            FieldKind::Real
        } else {
            FieldKind::Integer
        }
    }

    /// Human-readable name
    pub fn description(self) -> &'static str {
        match self {
            VariableType::Nps => "History number",
            VariableType::FirstEventType => "Type of first event",
            VariableType::NpsCell => "Cell number (NPS)",
            VariableType::NpsSurface => "Nearest surface (NPS)",
            VariableType::TallySpecifier => "Tally specifier",
            VariableType::TfcSpecifier => "TFC specifier",
            VariableType::NextEventType => "Next event type",
            VariableType::NodeCount => "Number of nodes in track",
            VariableType::SourceNumber => "Source number",
            VariableType::Nuclide => "ZZAAA for interaction",
            VariableType::ReactionType => "Reaction type",
            VariableType::SurfaceNumber => "Surface number",
            VariableType::SurfaceAngle => "Angle with surface normal (deg)",
            VariableType::TerminationType => "Termination type",
            VariableType::BranchNumber => "Branch number",
            VariableType::ParticleType => "Particle type",
            VariableType::CellNumber => "Cell number",
            VariableType::MaterialNumber => "Material number",
            VariableType::CollisionCount => "Number of collisions",
            VariableType::X => "x coordinate of event (cm)",
            VariableType::Y => "y coordinate of event (cm)",
            VariableType::Z => "z coordinate of event (cm)",
            VariableType::U => "x coordinate of exit vector",
            VariableType::V => "y coordinate of exit vector",
            VariableType::W => "z coordinate of exit vector",
            VariableType::Energy => "Energy of particle after event",
            VariableType::Weight => "Weight of particle after event",
            VariableType::Time => "Time of event",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

//! Record layouts declared by the PTRAC header

use super::event::EventCategory;
use super::variable::VariableType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Variable codes per physical line in the header's declaration block
pub const DECLARATION_WRAP_WIDTH: usize = 30;

/// Field layout of one record kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSpec {
    /// Event category this layout describes
    pub category: EventCategory,
    /// Number of integer-typed fields (first physical line)
    pub n_integer: usize,
    /// Number of real-typed fields (second physical line)
    pub n_real: usize,
    /// Meaning of each integer field, in column order
    pub integer_fields: Vec<VariableType>,
    /// Meaning of each real field, in column order
    pub real_fields: Vec<VariableType>,
}

impl FormatSpec {
    /// Layout with declared counts but no field meanings yet
    pub(crate) fn with_counts(category: EventCategory, n_integer: usize, n_real: usize) -> Self {
        Self {
            category,
            n_integer,
            n_real,
            integer_fields: Vec::with_capacity(n_integer),
            real_fields: Vec::with_capacity(n_real),
        }
    }

    /// False for a `(0, 0)` layout, which the header uses for record kinds
    /// that are never written
    pub fn is_declared(&self) -> bool {
        self.n_integer + self.n_real > 0
    }

    /// Total declared columns over both lines
    pub fn n_fields(&self) -> usize {
        self.n_integer + self.n_real
    }

    /// True if either half carries `var`
    pub fn declares(&self, var: VariableType) -> bool {
        self.integer_fields.contains(&var) || self.real_fields.contains(&var)
    }
}

/// All layouts of one file: the start record plus one entry per record kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatTable {
    pub start: FormatSpec,
    /// One layout per schema record kind, in schema order
    pub kinds: Vec<FormatSpec>,
}

impl FormatTable {
    /// Declared layout for a step category, if any
    pub fn spec_for(&self, category: EventCategory) -> Option<&FormatSpec> {
        self.kinds
            .iter()
            .find(|spec| spec.category == category)
            .filter(|spec| spec.is_declared())
    }
}

/// Known revisions of the header layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaVersion {
    /// Source, bank, surface, collision and termination records
    #[default]
    Standard,
    /// Older layout without bank records
    NoBank,
}

impl FromStr for SchemaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(SchemaVersion::Standard),
            "no-bank" | "nobank" => Ok(SchemaVersion::NoBank),
            other => Err(format!(
                "unknown schema '{}' (expected 'standard' or 'no-bank')",
                other
            )),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::Standard => write!(f, "standard"),
            SchemaVersion::NoBank => write!(f, "no-bank"),
        }
    }
}

/// Record kinds and variable table for one schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub version: SchemaVersion,
    record_kinds: &'static [EventCategory],
}

const STANDARD_KINDS: [EventCategory; 5] = [
    EventCategory::Source,
    EventCategory::Bank,
    EventCategory::Surface,
    EventCategory::Collision,
    EventCategory::Termination,
];

const NO_BANK_KINDS: [EventCategory; 4] = [
    EventCategory::Source,
    EventCategory::Surface,
    EventCategory::Collision,
    EventCategory::Termination,
];

impl Schema {
    pub fn new(version: SchemaVersion) -> Self {
        let record_kinds: &'static [EventCategory] = match version {
            SchemaVersion::Standard => &STANDARD_KINDS,
            SchemaVersion::NoBank => &NO_BANK_KINDS,
        };
        Self {
            version,
            record_kinds,
        }
    }

    /// Step record kinds in header declaration order
    pub fn record_kinds(&self) -> &'static [EventCategory] {
        self.record_kinds
    }
}

impl From<SchemaVersion> for Schema {
    fn from(version: SchemaVersion) -> Self {
        Self::new(version)
    }
}

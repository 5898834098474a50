//! PTRAC format vocabulary
//!
//! Variable types, event type codes and the record layouts a header declares.

pub mod event;
pub mod layout;
pub mod variable;

// Re-export format types
pub use event::{bank_reason_description, EventCategory, EventTypeCode};
pub use layout::{FormatSpec, FormatTable, Schema, SchemaVersion, DECLARATION_WRAP_WIDTH};
pub use variable::{FieldKind, VariableType};

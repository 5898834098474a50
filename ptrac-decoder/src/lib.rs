//! PTRAC Decoder Library
//!
//! A reusable library for decoding ASCII PTRAC particle-track files written by
//! MCNP-family transport codes.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Parses the self-describing header into a table of record layouts
//! - Decodes each history into typed steps, one at a time
//! - Writes headers and histories back out in the same text layout
//!
//! The library does NOT:
//! - Aggregate statistics across histories
//! - Choose output formats or file names
//! - Read binary or HDF5 PTRAC files
//!
//! All higher-level functionality is in the application layer (ptrac-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use ptrac_decoder::{Decoder, DecoderConfig};
//! use std::path::Path;
//!
//! // The header does not say how many echoed input lines it carries
//! let config = DecoderConfig::new()
//!     .with_input_lines(2)
//!     .with_max_steps(5000);
//!
//! let decoder = Decoder::new(config);
//! let mut stream = decoder.open(Path::new("run.ptrac")).unwrap();
//! println!("Title: {}", stream.header().title);
//!
//! while let Some(history) = stream.next_history().unwrap() {
//!     for step in &history.steps {
//!         println!("{} {}: {:?} MeV", history.nps, step.category, step.energy);
//!     }
//! }
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod event_decoder;
pub mod format;
pub mod header;
pub mod reader;
pub mod types;
pub mod writer;

// Re-export main types for convenience
pub use config::DecoderConfig;
pub use decoder::{Decoder, HistoryStream};
pub use event_decoder::{DecodeState, EventDecoder};
pub use format::{
    bank_reason_description, EventCategory, EventTypeCode, FieldKind, FormatSpec, FormatTable,
    SchemaVersion, VariableType,
};
pub use header::FileHeader;
pub use types::{DecoderError, History, Result, Step};
pub use writer::PtracWriter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

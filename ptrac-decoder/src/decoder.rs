//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! The Decoder struct is the entry point: it parses the header of a PTRAC
//! file and hands back a lazy stream of histories.

use crate::config::DecoderConfig;
use crate::event_decoder::EventDecoder;
use crate::header::{parse_header, FileHeader};
use crate::reader::LineReader;
use crate::types::{DecoderError, History, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// The main decoder struct - entry point for all decoding operations
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Create a new decoder instance
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Open a PTRAC file and parse its header
    ///
    /// # Arguments
    /// * `path` - Path to the ASCII PTRAC file
    ///
    /// # Returns
    /// * `Result<HistoryStream<_>>` - Stream positioned at the first history
    ///
    /// # Example
    /// ```no_run
    /// use ptrac_decoder::{Decoder, DecoderConfig};
    /// use std::path::Path;
    ///
    /// let decoder = Decoder::new(DecoderConfig::new().with_input_lines(2));
    /// let stream = decoder.open(Path::new("run.ptrac")).unwrap();
    ///
    /// for history in stream {
    ///     match history {
    ///         Ok(history) => println!("History {}: {} steps", history.nps, history.n_steps()),
    ///         Err(e) => eprintln!("Error: {}", e),
    ///     }
    /// }
    /// ```
    pub fn open(&self, path: &Path) -> Result<HistoryStream<BufReader<File>>> {
        log::info!("Opening PTRAC file: {:?}", path);
        let file = File::open(path)?;
        self.from_reader(BufReader::new(file))
    }

    /// Parse the header from any buffered reader
    pub fn from_reader<R: BufRead>(&self, reader: R) -> Result<HistoryStream<R>> {
        let mut lines = LineReader::new(reader);
        let header = parse_header(&mut lines, &self.config)?;
        Ok(HistoryStream {
            header,
            lines,
            events: EventDecoder::new(self.config.max_steps),
            failed: false,
            histories_read: 0,
        })
    }
}

/// Histories of one file, decoded on demand
///
/// The stream yields `Ok` histories until the input ends. After the first
/// error it yields nothing further.
pub struct HistoryStream<R> {
    header: FileHeader,
    lines: LineReader<R>,
    events: EventDecoder,
    failed: bool,
    histories_read: usize,
}

impl<R: BufRead> HistoryStream<R> {
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Physical lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.lines.line_number()
    }

    /// Histories returned so far
    pub fn histories_read(&self) -> usize {
        self.histories_read
    }

    /// Decode the next history, `Ok(None)` once the input is exhausted
    pub fn next_history(&mut self) -> Result<Option<History>> {
        if self.failed {
            return Ok(None);
        }

        match self.events.next_history(&self.header, &mut self.lines) {
            Ok(Some(history)) => {
                self.histories_read += 1;
                Ok(Some(history))
            }
            Ok(None) => {
                log::info!(
                    "End of input after {} histories ({} lines)",
                    self.histories_read,
                    self.lines.line_number()
                );
                Ok(None)
            }
            Err(e) => {
                self.failed = true;
                log::error!("Decoding stopped: {}", e);
                Err(e)
            }
        }
    }

    /// Feed every history to `sink` in file order
    ///
    /// Stops at the first decode error or the first error returned by the
    /// sink, whichever comes first.
    pub fn for_each_history<F, E>(&mut self, mut sink: F) -> std::result::Result<usize, E>
    where
        F: FnMut(History) -> std::result::Result<(), E>,
        E: From<DecoderError>,
    {
        let mut count = 0;
        while let Some(history) = self.next_history()? {
            sink(history)?;
            count += 1;
        }
        Ok(count)
    }
}

impl<R: BufRead> Iterator for HistoryStream<R> {
    type Item = Result<History>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_history().transpose()
    }
}

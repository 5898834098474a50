//! Destinations for decoded histories

use anyhow::{Context, Result};
use ptrac_decoder::{FileHeader, FormatTable, History, PtracWriter};
use std::io::Write;

/// Receives histories in file order
pub trait HistorySink {
    fn accept(&mut self, history: &History) -> Result<()>;

    /// Called once after the last history, also when decoding stopped early
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One JSON object per line
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> HistorySink for JsonLinesSink<W> {
    fn accept(&mut self, history: &History) -> Result<()> {
        serde_json::to_writer(&mut self.out, history)
            .with_context(|| format!("Failed to serialize history {}", history.nps))?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// ASCII PTRAC with the header of the source file
pub struct PtracSink<W: Write> {
    writer: PtracWriter<W>,
    formats: FormatTable,
}

impl<W: Write> PtracSink<W> {
    /// Create the sink and write the header immediately
    pub fn new(out: W, header: &FileHeader) -> Result<Self> {
        let mut writer = PtracWriter::new(out);
        writer.write_header(header)?;
        Ok(Self {
            writer,
            formats: header.formats.clone(),
        })
    }
}

impl<W: Write> HistorySink for PtracSink<W> {
    fn accept(&mut self, history: &History) -> Result<()> {
        self.writer.write_history(history, &self.formats)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        log::debug!("Wrote {} PTRAC lines", self.writer.lines_written());
        Ok(())
    }
}

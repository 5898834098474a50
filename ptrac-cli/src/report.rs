//! Report generation
//!
//! A [`Summary`] collects per-file statistics while histories stream past,
//! and [`render_text`] turns a batch of summaries into a plain-text report.

use crate::sink::HistorySink;
use anyhow::Result;
use chrono::NaiveDateTime;
use ptrac_decoder::{bank_reason_description, EventCategory, FileHeader, History};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Statistics for one input file
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub code: String,
    pub version: String,
    pub title: String,
    pub run_at: Option<NaiveDateTime>,
    pub histories: usize,
    pub steps: usize,
    pub longest_history: usize,
    pub steps_by_category: BTreeMap<EventCategory, usize>,
    pub bank_reasons: BTreeMap<u32, usize>,
    pub lines_read: usize,
    /// Set when decoding stopped before the end of the file
    pub error: Option<String>,
}

impl Summary {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            ..Default::default()
        }
    }

    /// Copy the identifying header fields
    pub fn set_header(&mut self, header: &FileHeader) {
        self.code = header.code.clone();
        self.version = header.version.clone();
        self.title = header.title.clone();
        self.run_at = header.machine_timestamp();
    }

    pub fn record(&mut self, history: &History) {
        self.histories += 1;
        self.steps += history.n_steps();
        self.longest_history = self.longest_history.max(history.n_steps());

        for step in &history.steps {
            *self.steps_by_category.entry(step.category).or_insert(0) += 1;
            if let Some(reason) = step.bank_reason {
                *self.bank_reasons.entry(reason).or_insert(0) += 1;
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl HistorySink for Summary {
    fn accept(&mut self, history: &History) -> Result<()> {
        self.record(history);
        Ok(())
    }
}

/// Plain-text report over all inputs
pub fn render_text(summaries: &[Summary]) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "  PTRAC Decode Report");
    let _ = writeln!(out, "{}", rule);

    for summary in summaries {
        let _ = writeln!(out);
        let _ = writeln!(out, "File:      {}", summary.input.display());
        if !summary.code.is_empty() {
            let _ = writeln!(out, "Code:      {} {}", summary.code, summary.version);
            let _ = writeln!(out, "Title:     {}", summary.title);
        }
        if let Some(run_at) = summary.run_at {
            let _ = writeln!(out, "Run at:    {}", run_at.format("%Y-%m-%d %H:%M:%S"));
        }
        if let Some(output) = &summary.output {
            let _ = writeln!(out, "Output:    {}", output.display());
        }
        let _ = writeln!(
            out,
            "Histories: {} ({} steps, longest {}, {} lines)",
            summary.histories, summary.steps, summary.longest_history, summary.lines_read
        );

        for (category, count) in &summary.steps_by_category {
            let _ = writeln!(out, "  {:<12} {:>10}", category.name(), count);
        }

        if !summary.bank_reasons.is_empty() {
            let _ = writeln!(out, "  Bank reasons:");
            for (reason, count) in &summary.bank_reasons {
                let description = bank_reason_description(*reason).unwrap_or("unlisted");
                let _ = writeln!(out, "    {:>4} {:>10}  {}", reason, count, description);
            }
        }

        match &summary.error {
            Some(error) => {
                let _ = writeln!(out, "Status:    FAILED: {}", error);
            }
            None => {
                let _ = writeln!(out, "Status:    OK");
            }
        }
    }

    let failed = summaries.iter().filter(|s| !s.is_ok()).count();
    let total: usize = summaries.iter().map(|s| s.histories).sum();
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "  {} file(s), {} histories, {} failed",
        summaries.len(),
        total,
        failed
    );
    let _ = writeln!(out, "{}", rule);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptrac_decoder::{Decoder, DecoderConfig};
    use std::io::Cursor;

    const FULL: &str = include_str!("../../ptrac-decoder/tests/data/full.ptrac");

    fn summarize() -> Summary {
        let decoder = Decoder::new(DecoderConfig::new().with_input_lines(2));
        let mut stream = decoder.from_reader(Cursor::new(FULL)).unwrap();
        let mut summary = Summary::new(PathBuf::from("full.ptrac"));
        summary.set_header(stream.header());
        while let Some(history) = stream.next_history().unwrap() {
            summary.accept(&history).unwrap();
        }
        summary.lines_read = stream.lines_read();
        summary
    }

    #[test]
    fn test_summary_counts() {
        let summary = summarize();
        assert_eq!(summary.histories, 2);
        assert_eq!(summary.steps, 7);
        assert_eq!(summary.longest_history, 6);
        assert_eq!(summary.steps_by_category[&EventCategory::Source], 2);
        assert_eq!(summary.steps_by_category[&EventCategory::Bank], 2);
        assert_eq!(summary.bank_reasons[&5], 1);
        assert_eq!(summary.bank_reasons[&500], 1);
        assert_eq!(summary.lines_read, 24);
        assert!(summary.run_at.is_some());
    }

    #[test]
    fn test_render_text() {
        let mut failed = Summary::new(PathBuf::from("broken.ptrac"));
        failed.error = Some("Unexpected end of input".to_string());

        let text = render_text(&[summarize(), failed]);
        assert!(text.contains("Title:     Slab shield with importance splitting"));
        assert!(text.contains("Run at:    2022-11-02 09:15:00"));
        assert!(text.contains("unlisted"));
        assert!(text.contains("FAILED: Unexpected end of input"));
        assert!(text.contains("2 file(s), 2 histories, 1 failed"));
    }
}

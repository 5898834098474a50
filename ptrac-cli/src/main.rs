//! PTRAC Decoder CLI Application
//!
//! This is the command-line interface for the PTRAC trace decoder.
//! It uses the ptrac-decoder library and adds:
//! - TOML configuration with command-line overrides
//! - Conversion to JSON lines or re-emitted ASCII PTRAC
//! - Per-file summaries and a text report
//! - Parallel decoding of several input files

use anyhow::{Context, Result};
use clap::Parser;
use ptrac_decoder::{Decoder, FileHeader, SchemaVersion};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

mod config;
mod report;
mod sink;

use config::{AppConfig, OutputFormat};
use report::Summary;
use sink::{HistorySink, JsonLinesSink, PtracSink};

/// PTRAC Decoder - Decode and summarize MCNP particle track files
#[derive(Parser, Debug)]
#[command(name = "ptrac-cli")]
#[command(about = "Decode and summarize ASCII PTRAC particle track files", long_about = None)]
#[command(version)]
struct Args {
    /// PTRAC file(s) to decode (can be repeated)
    #[arg(short, long = "input", value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Number of echoed input lines in the header
    #[arg(short = 'n', long, value_name = "COUNT")]
    input_lines: Option<usize>,

    /// Maximum number of steps in one history
    #[arg(long, value_name = "COUNT")]
    max_steps: Option<usize>,

    /// Header layout revision (standard, no-bank)
    #[arg(long, value_name = "SCHEMA")]
    schema: Option<SchemaVersion>,

    /// Stop each file after this many histories
    #[arg(long, value_name = "COUNT")]
    max_histories: Option<usize>,

    /// Output format for converted files
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Directory for converted files (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("PTRAC Decoder CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", ptrac_decoder::VERSION);

    let config = build_config(&args)?;

    if config.input.files.is_empty() {
        println!("PTRAC Decoder - No input specified");
        println!("\nQuick Start:");
        println!("  ptrac-cli --input run.ptrac --input-lines 2");
        println!("  ptrac-cli -i a.ptrac -i b.ptrac -n 2 --format ptrac -o out/");
        println!("\nWith a configuration file:");
        println!("  ptrac-cli --config config.toml");
        println!("\nUse --help for more options");
        return Ok(());
    }

    if let Some(dir) = &config.output.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    }

    // One stream per file; nothing is shared between them
    let summaries: Vec<Summary> = config
        .input
        .files
        .par_iter()
        .map(|path| process_file(path, &config))
        .collect();

    if !args.quiet {
        print!("{}", report::render_text(&summaries));
    }
    if let Some(dir) = &config.output.output_dir {
        write_json_report(&dir.join("report.json"), &summaries)?;
    }

    let failed = summaries.iter().filter(|s| !s.is_ok()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} input file(s) failed", failed, summaries.len());
    }
    Ok(())
}

/// Load the config file, if any, and apply command-line overrides
fn build_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if !args.inputs.is_empty() {
        config.input.files = args.inputs.clone();
    }
    if let Some(input_lines) = args.input_lines {
        config.decoder.input_lines = input_lines;
    }
    if let Some(max_steps) = args.max_steps {
        config.decoder.max_steps = max_steps;
    }
    if let Some(schema) = args.schema {
        config.decoder.schema = schema;
    }
    if let Some(max_histories) = args.max_histories {
        config.output.max_histories = Some(max_histories);
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(dir) = &args.output_dir {
        config.output.output_dir = Some(dir.clone());
    }

    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Decode one file; failures end up in the summary
fn process_file(path: &Path, config: &AppConfig) -> Summary {
    let mut summary = Summary::new(path.to_path_buf());
    if let Err(e) = decode_into(path, config, &mut summary) {
        log::error!("{:?}: {:#}", path, e);
        summary.error = Some(format!("{:#}", e));
    }
    summary
}

fn decode_into(path: &Path, config: &AppConfig, summary: &mut Summary) -> Result<()> {
    let decoder = Decoder::new(config.decoder.clone());
    let mut stream = decoder
        .open(path)
        .with_context(|| format!("Failed to read header of {:?}", path))?;
    summary.set_header(stream.header());

    let output = config.output_path(path);
    if let Some(output) = &output {
        if config::is_same_file(path, output) {
            anyhow::bail!("Output {:?} would overwrite its input", output);
        }
    }
    let mut sink = open_sink(output.as_deref(), config.output.format, stream.header())?;
    summary.output = output;

    let limit = config.output.max_histories.unwrap_or(usize::MAX);
    let mut outcome = Ok(());
    while summary.histories < limit {
        match stream.next_history() {
            Ok(Some(history)) => {
                summary.accept(&history)?;
                if let Some(sink) = sink.as_mut() {
                    sink.accept(&history)?;
                }
            }
            Ok(None) => break,
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }
    summary.lines_read = stream.lines_read();

    // Histories already delivered stay written
    if let Some(sink) = sink.as_mut() {
        sink.finish()?;
    }

    outcome.with_context(|| format!("Decoding stopped after {} histories", summary.histories))?;
    log::info!(
        "{:?}: {} histories, {} steps",
        path,
        summary.histories,
        summary.steps
    );
    Ok(())
}

fn open_sink(
    output: Option<&Path>,
    format: OutputFormat,
    header: &FileHeader,
) -> Result<Option<Box<dyn HistorySink>>> {
    let Some(output) = output else {
        return Ok(None);
    };
    let file = File::create(output)
        .with_context(|| format!("Failed to create output file: {:?}", output))?;
    let out = BufWriter::new(file);

    let sink: Box<dyn HistorySink> = match format {
        OutputFormat::Jsonl => Box::new(JsonLinesSink::new(out)),
        OutputFormat::Ptrac => Box::new(PtracSink::new(out, header)?),
        OutputFormat::None => return Ok(None),
    };
    log::info!("Writing {:?}", output);
    Ok(Some(sink))
}

fn write_json_report(path: &Path, summaries: &[Summary]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file: {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summaries)
        .with_context(|| format!("Failed to write report file: {:?}", path))?;
    log::info!("Report written to {:?}", path);
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

// End-to-end decoding of PTRAC files on disk

use ptrac_decoder::{
    Decoder, DecoderConfig, DecoderError, EventCategory, History, PtracWriter, SchemaVersion,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn data_file(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn decode_path(path: &Path, config: DecoderConfig) -> ptrac_decoder::Result<Vec<History>> {
    Decoder::new(config).open(path)?.collect()
}

fn temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_decode_minimal_file() {
    init_logging();
    let histories =
        decode_path(&data_file("minimal.ptrac"), DecoderConfig::new().with_input_lines(1)).unwrap();

    assert_eq!(histories.len(), 1);
    assert_eq!(histories[0].nps, 1);
    assert_eq!(histories[0].n_steps(), 2);
    assert_eq!(histories[0].first_category(), Some(EventCategory::Collision));
}

#[test]
fn test_decode_full_file() {
    init_logging();
    let decoder = Decoder::new(DecoderConfig::new().with_input_lines(2));
    let mut stream = decoder.open(&data_file("full.ptrac")).unwrap();

    let header = stream.header().clone();
    assert_eq!(header.title, "Slab shield with importance splitting");
    assert_eq!(header.input_items.len(), 20);
    assert_eq!(header.input_items[4], 1000.0);
    assert_eq!(header.formats.kinds.len(), 5);

    let mut total_steps = 0;
    let mut banked = Vec::new();
    let count = stream
        .for_each_history(|history| {
            total_steps += history.n_steps();
            banked.extend(history.steps.iter().filter_map(|s| s.bank_reason));
            Ok::<(), DecoderError>(())
        })
        .unwrap();

    assert_eq!(count, 2);
    assert_eq!(total_steps, 7);
    assert_eq!(banked, vec![5, 500]);
}

#[test]
fn test_decoding_is_repeatable() {
    init_logging();
    let config = DecoderConfig::new().with_input_lines(2);
    let first = decode_path(&data_file("full.ptrac"), config.clone()).unwrap();
    let second = decode_path(&data_file("full.ptrac"), config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_rewrite_and_decode_again() {
    init_logging();
    let config = DecoderConfig::new().with_input_lines(2);
    let decoder = Decoder::new(config.clone());
    let stream = decoder.open(&data_file("full.ptrac")).unwrap();
    let header = stream.header().clone();
    let histories: Vec<History> = stream.collect::<Result<_, _>>().unwrap();

    let output = NamedTempFile::new().unwrap();
    let mut writer = PtracWriter::new(std::io::BufWriter::new(output.reopen().unwrap()));
    writer.write_header(&header).unwrap();
    for history in &histories {
        writer.write_history(history, &header.formats).unwrap();
    }
    writer.finish().unwrap();

    let reread = decode_path(output.path(), config).unwrap();
    assert_eq!(reread, histories);
}

#[test]
fn test_wrong_input_line_count() {
    init_logging();
    // One input line too few: the second echoed line is read as the layout
    let result = decode_path(&data_file("full.ptrac"), DecoderConfig::new().with_input_lines(1));
    assert!(matches!(result, Err(DecoderError::MalformedHeader { .. })));
}

#[test]
fn test_no_bank_schema_file() {
    init_logging();
    let text = "\
-1
mcnp 5 01/01/08 06/30/10 08:00:00
legacy
2 3 3 0 0 0 0 3 4 1 1
1 2 7 9 17 20 21 22 7 14 17 20 26 27 28
11 1000
9000 1 3
0.0 0.0 0.0
";
    let file = temp_file(text);

    let histories = decode_path(
        file.path(),
        DecoderConfig::new().with_schema(SchemaVersion::NoBank),
    )
    .unwrap();
    assert_eq!(histories.len(), 1);
    assert_eq!(histories[0].nps, 11);
    assert_eq!(histories[0].initial_cell, None);
    assert_eq!(histories[0].steps[0].category, EventCategory::Source);
    assert_eq!(histories[0].steps[0].cell_number, Some(3));

    // The same file does not fit the five-kind layout
    assert!(decode_path(file.path(), DecoderConfig::new()).is_err());
}

#[test]
fn test_step_limit_reports_history() {
    init_logging();
    let result = decode_path(
        &data_file("full.ptrac"),
        DecoderConfig::new().with_input_lines(2).with_max_steps(5),
    );
    match result {
        Err(DecoderError::StepLimitExceeded { nps, limit, line }) => {
            assert_eq!(nps, 7);
            assert_eq!(limit, 5);
            assert_eq!(line, 20);
        }
        other => panic!("unexpected result: {:?}", other.map(|h| h.len())),
    }
}

#[test]
fn test_truncated_file() {
    init_logging();
    let full = std::fs::read_to_string(data_file("full.ptrac")).unwrap();
    let cut: String = full.lines().take(20).map(|l| format!("{}\n", l)).collect();
    let file = temp_file(&cut);

    let decoder = Decoder::new(DecoderConfig::new().with_input_lines(2));
    let results: Vec<_> = decoder.open(file.path()).unwrap().collect();
    assert_eq!(results.len(), 1);
    assert!(matches!(
        results[0],
        Err(DecoderError::UnexpectedEndOfInput { line: 20, .. })
    ));
}

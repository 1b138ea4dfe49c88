//! Integration tests for chat dataset preparation

mod common;

use chattune_engine::dataset::TRAIN_SPLIT;
use chattune_engine::{
    ChatError, InstructionPair, TextRecord, get_dataset, get_dataset_in, read_pairs, write_jsonl,
};
use common::tokenizer;
use std::io::{self, Write};
use tempfile::NamedTempFile;

fn pairs() -> Vec<InstructionPair> {
    vec![
        InstructionPair::new("hello", "world"),
        InstructionPair::new("what is rust?", "a language"),
        InstructionPair::new("ok", "ok"),
    ]
}

#[test]
fn test_jsonl_has_one_templated_record_per_pair() {
    let tokenizer = tokenizer();
    let mut buf = Vec::new();
    let written = write_jsonl(&mut buf, &pairs(), &tokenizer).unwrap();
    assert_eq!(written, 3);

    let content = String::from_utf8(buf).unwrap();
    assert!(content.ends_with('\n'));
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        [
            r#"{"text":"<s><|user|> hello <|assistant|> world "}"#,
            r#"{"text":"<s><|user|> what is rust? <|assistant|> a language "}"#,
            r#"{"text":"<s><|user|> ok <|assistant|> ok "}"#,
        ]
    );
}

#[test]
fn test_get_dataset_matches_input_count_and_order() {
    let tokenizer = tokenizer();
    let pairs = pairs();
    let dataset = get_dataset(&pairs, &tokenizer).unwrap();

    assert_eq!(dataset.split(), TRAIN_SPLIT);
    assert_eq!(dataset.len(), pairs.len());
    for (record, pair) in dataset.iter().zip(&pairs) {
        let expected = tokenizer
            .apply_chat_template(&pair.to_messages(), false)
            .unwrap();
        assert_eq!(record.text, expected);
    }
}

#[test]
fn test_get_dataset_empty_input() {
    let dataset = get_dataset(&[], &tokenizer()).unwrap();
    assert!(dataset.is_empty());
}

#[test]
fn test_get_dataset_preserves_quotes_and_newlines() {
    let tokenizer = tokenizer();
    let pairs = [InstructionPair::new("say \"hi\"\nplease", "\"hi\"\t\\o/")];
    let dataset = get_dataset(&pairs, &tokenizer).unwrap();
    assert_eq!(
        dataset.get(0),
        Some(&TextRecord {
            text: "<s><|user|> say \"hi\"\nplease <|assistant|> \"hi\"\t\\o/ ".to_string()
        })
    );
}

#[test]
fn test_read_pairs_then_prepare() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"instruction": "hello", "response": "world"}}"#).unwrap();
    writeln!(file, r#"{{"instruction": "ok", "response": "ok"}}"#).unwrap();

    let pairs = read_pairs(file.path()).unwrap();
    assert_eq!(pairs.len(), 2);

    let dataset = get_dataset(&pairs, &tokenizer()).unwrap();
    assert_eq!(
        dataset.texts().collect::<Vec<_>>(),
        [
            "<s><|user|> hello <|assistant|> world ",
            "<s><|user|> ok <|assistant|> ok ",
        ]
    );
}

#[test]
fn test_temp_file_removed_after_call() {
    let dir = tempfile::tempdir().unwrap();

    let dataset = get_dataset_in(dir.path(), &pairs(), &tokenizer()).unwrap();

    assert_eq!(dataset.len(), 3);
    let leftover = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftover, 0, "temporary dataset file was not removed");
}

/// Writer that rejects every write
struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }
}

#[test]
fn test_write_failure_is_io_error() {
    let err = write_jsonl(BrokenPipe, &pairs(), &tokenizer()).unwrap_err();
    assert!(matches!(err, ChatError::Io(_)), "{err:?}");
}

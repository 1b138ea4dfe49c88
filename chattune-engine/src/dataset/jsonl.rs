use std::io::{BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;

use super::TextRecord;
use crate::chat::InstructionPair;
use crate::error::{ChatError, Result};
use crate::tokenizer::ChatTokenizer;

/// Render each pair through the chat template and write one `{"text": ...}` line per pair.
///
/// Returns the number of records written.
pub fn write_jsonl<W: Write>(
    writer: W,
    pairs: &[InstructionPair],
    tokenizer: &ChatTokenizer,
) -> Result<usize> {
    let mut writer = BufWriter::new(writer);
    for pair in pairs {
        let text = tokenizer.apply_chat_template(&pair.to_messages(), false)?;
        // A `String` field always serializes; any failure here is the writer's.
        serde_json::to_writer(&mut writer, &TextRecord { text })
            .map_err(|e| ChatError::Io(e.into()))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(pairs.len())
}

/// Parse records from JSON lines, or from one top-level JSON array.
///
/// Blank lines are skipped. Errors carry the 1-based line number.
pub fn parse_records<T: DeserializeOwned>(content: &str) -> Result<Vec<T>> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).map_err(|source| ChatError::Json {
            line: source.line(),
            source,
        });
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| ChatError::Json { line: i + 1, source })
        })
        .collect()
}

/// Read instruction pairs from a JSON lines or JSON array file.
pub fn read_pairs<P: AsRef<Path>>(path: P) -> Result<Vec<InstructionPair>> {
    let content = std::fs::read_to_string(path)?;
    parse_records(&content)
}

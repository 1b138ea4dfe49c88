//! Chat-formatted training datasets
//!
//! Instruction pairs are rendered through the chat template, written as
//! `{"text": ...}` JSON lines, and loaded back as a dataset split.

mod jsonl;

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chat::InstructionPair;
use crate::error::Result;
use crate::tokenizer::ChatTokenizer;

pub use jsonl::{parse_records, read_pairs, write_jsonl};

/// Split name used by [`get_dataset`]
pub const TRAIN_SPLIT: &str = "train";

/// One dataset row: the fully templated conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    pub text: String,
}

/// An in-memory dataset split with a single `text` column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    split: String,
    records: Vec<TextRecord>,
}

impl Dataset {
    pub fn new(split: impl Into<String>, records: Vec<TextRecord>) -> Self {
        Dataset {
            split: split.into(),
            records,
        }
    }

    /// Load a JSON dataset file: JSON lines, or a single JSON array of records.
    pub fn load_json<P: AsRef<Path>>(path: P, split: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let records: Vec<TextRecord> = parse_records(&content)?;
        debug!("Loaded {} records from {:?}", records.len(), path);
        Ok(Self::new(split, records))
    }

    pub fn split(&self) -> &str {
        &self.split
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TextRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextRecord> {
        self.records.iter()
    }

    /// The `text` column
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.text.as_str())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a TextRecord;
    type IntoIter = std::slice::Iter<'a, TextRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Build the training split for `pairs`.
///
/// Each pair becomes a user/assistant conversation rendered through the
/// tokenizer's chat template. The rows go through a temporary `.json` file
/// that is removed before this returns.
pub fn get_dataset(pairs: &[InstructionPair], tokenizer: &ChatTokenizer) -> Result<Dataset> {
    get_dataset_in(std::env::temp_dir(), pairs, tokenizer)
}

/// [`get_dataset`] with the temporary file created in `dir`.
pub fn get_dataset_in<P: AsRef<Path>>(
    dir: P,
    pairs: &[InstructionPair],
    tokenizer: &ChatTokenizer,
) -> Result<Dataset> {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile_in(dir)?;
    let written = write_jsonl(&mut file, pairs, tokenizer)?;
    file.flush()?;
    debug!("Wrote {} records to {:?}", written, file.path());

    let dataset = Dataset::load_json(file.path(), TRAIN_SPLIT)?;
    info!("Prepared {} chat examples", dataset.len());
    Ok(dataset)
}

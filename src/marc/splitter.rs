use super::line::LineKind;
use crate::core::{
    Record,
    RepairProfile,
};

/// Splits a batch into records. A record starts at every `=LDR` line; text
/// before the first one becomes its own record when it is not blank.
pub fn split_records(input: &str, profile: &RepairProfile) -> Vec<Record> {
    let text = input.trim();
    let mut chunks: Vec<&str> = Vec::new();
    let mut chunk_start = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if offset > 0 && LineKind::classify(line, profile) == LineKind::RecordStart {
            chunks.push(&text[chunk_start..offset]);
            chunk_start = offset;
        }
        offset += line.len();
    }
    chunks.push(&text[chunk_start..]);

    chunks
        .into_iter()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .enumerate()
        .map(|(ordinal, chunk)| Record::new(ordinal, chunk))
        .collect()
}

pub fn join_records(records: &[Record], profile: &RepairProfile) -> String {
    records
        .iter()
        .map(|record| record.text.as_str())
        .collect::<Vec<_>>()
        .join(&profile.record_separator)
}

use serde::Serialize;

/// Integer carried by the target field's numeric sub-field.
pub type Marker = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub ordinal: usize, // Position in the batch, 0-based
    pub text: String,   // Trimmed record text, starting at its =LDR line when present
}

impl Record {
    pub fn new(ordinal: usize, text: impl Into<String>) -> Self {
        Self { ordinal, text: text.into() }
    }
}

/// Values synthesized into one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insertion {
    pub ordinal: usize,
    pub values: Vec<Marker>,
}

/// A gap between neighbouring records too wide to fill. The output still
/// lacks every value strictly between `after` and `before`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedGap {
    pub ordinal: usize, // Earlier record of the pair
    pub after: Marker,
    pub before: Marker,
}

impl SkippedGap {
    pub fn width(&self) -> u64 {
        self.before.saturating_sub(self.after).saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingStats {
    pub original_records: usize,
    pub processed_records: usize,
    pub original_field_count: usize,
    pub processed_field_count: usize,
    pub added_fields: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub output: String,
    pub stats: ProcessingStats,
    pub insertions: Vec<Insertion>,
    pub skipped_gaps: Vec<SkippedGap>,
}

impl RepairReport {
    pub fn is_unchanged(&self) -> bool {
        self.insertions.is_empty()
    }
}

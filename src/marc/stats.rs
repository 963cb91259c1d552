use crate::core::{
    ProcessingStats,
    RepairProfile,
};

/// Records are counted on the raw text: chunks between blank-line record
/// starts that are not blank.
pub fn count_records(text: &str, profile: &RepairProfile) -> usize {
    let boundary = format!("{}{}", profile.record_separator, profile.record_start);
    text.split(boundary.as_str()).filter(|chunk| !chunk.trim().is_empty()).count()
}

pub fn count_target_fields(text: &str, profile: &RepairProfile) -> usize {
    text.matches(profile.target_token().as_str()).count()
}

pub fn compute_stats(original: &str, processed: &str, profile: &RepairProfile) -> ProcessingStats {
    let original_field_count = count_target_fields(original, profile);
    let processed_field_count = count_target_fields(processed, profile);

    ProcessingStats {
        original_records: count_records(original, profile),
        processed_records: count_records(processed, profile),
        original_field_count,
        processed_field_count,
        added_fields: processed_field_count as i64 - original_field_count as i64,
    }
}

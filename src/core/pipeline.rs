use std::time::Instant;

use super::{
    ProcessingStats,
    RepairProfile,
    RepairReport,
    SkippedGap,
};
use crate::marc::{
    gaps::detect_gaps,
    sequence::MarkerSequence,
    splitter::{
        join_records,
        split_records,
    },
    stats::compute_stats,
    synth::{
        add_missing_fields,
        FieldTemplate,
    },
};

/// Repairs a batch with the default 852/$p profile.
pub fn process(input: &str) -> String {
    process_with(input, &RepairProfile::default())
}

pub fn process_with(input: &str, profile: &RepairProfile) -> String {
    repair(input, profile).output
}

pub fn stats(original: &str, processed: &str) -> ProcessingStats {
    compute_stats(original, processed, &RepairProfile::default())
}

/// Runs split -> extract -> detect -> synthesize -> join. Anything that stops
/// the repair early returns the input untouched.
pub fn repair(input: &str, profile: &RepairProfile) -> RepairReport {
    let start = Instant::now();

    let mut records = split_records(input, profile);
    if records.is_empty() {
        return unchanged(input, profile, Vec::new());
    }

    let Some(template) = FieldTemplate::find(&records, profile) else {
        tracing::info!("No {} field in {} records, nothing to do", profile.target_tag, records.len());
        return unchanged(input, profile, Vec::new());
    };
    tracing::debug!("Using template: {}", template.line());

    let sequence = MarkerSequence::extract(&records, profile);
    let table = detect_gaps(&sequence, profile);
    if table.is_empty() {
        tracing::info!(
            "{} records, {} distinct markers, no gaps found",
            records.len(),
            sequence.distinct.len()
        );
        return unchanged(input, profile, table.skipped().to_vec());
    }

    for record in &mut records {
        let values = table.get(record.ordinal);
        if !values.is_empty() {
            record.text = add_missing_fields(&record.text, values, Some(&template), profile);
        }
    }

    let output = join_records(&records, profile);
    let stats = compute_stats(input, &output, profile);

    tracing::info!(
        "Added {} {} fields to {} of {} records ({:.1}ms)",
        table.total(),
        profile.target_tag,
        table.insertions().len(),
        records.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    warn_if_defects_remain(&output, profile);

    RepairReport {
        output,
        stats,
        insertions: table.insertions(),
        skipped_gaps: table.skipped().to_vec(),
    }
}

fn unchanged(input: &str, profile: &RepairProfile, skipped_gaps: Vec<SkippedGap>) -> RepairReport {
    RepairReport {
        output: input.to_string(),
        stats: compute_stats(input, input, profile),
        insertions: Vec::new(),
        skipped_gaps,
    }
}

/// A single pass does not chain runs of empty records, so a second pass
/// may still find work.
fn warn_if_defects_remain(output: &str, profile: &RepairProfile) {
    let records = split_records(output, profile);
    let sequence = MarkerSequence::extract(&records, profile);
    let second_pass = detect_gaps(&sequence, profile);
    if !second_pass.is_empty() {
        tracing::warn!(
            "{} values still missing after one pass ({} holes in the marker run)",
            second_pass.total(),
            sequence.hole_count()
        );
    }
}

use super::sequence::MarkerSequence;
use crate::core::{
    Insertion,
    Marker,
    RepairProfile,
    SkippedGap,
};

/// Values each record must receive, indexed by record ordinal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentTable {
    slots: Vec<Vec<Marker>>,
    skipped: Vec<SkippedGap>,
}

impl AssignmentTable {
    pub fn new(record_count: usize) -> Self {
        Self { slots: vec![Vec::new(); record_count], skipped: Vec::new() }
    }

    pub fn push(&mut self, ordinal: usize, value: Marker) {
        if let Some(slot) = self.slots.get_mut(ordinal) {
            slot.push(value);
        }
    }

    pub fn extend(&mut self, ordinal: usize, values: impl IntoIterator<Item = Marker>) {
        if let Some(slot) = self.slots.get_mut(ordinal) {
            slot.extend(values);
        }
    }

    pub fn get(&self, ordinal: usize) -> &[Marker] {
        self.slots.get(ordinal).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Gaps left unfilled because they exceed `max_gap_fill`.
    pub fn skipped(&self) -> &[SkippedGap] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    pub fn total(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    pub fn insertions(&self) -> Vec<Insertion> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, values)| !values.is_empty())
            .map(|(ordinal, values)| Insertion { ordinal, values: values.clone() })
            .collect()
    }
}

/// Builds the assignment table. Records without markers are handled first,
/// then numeric gaps between neighbouring records; a record that qualifies
/// for both gets the values in that order.
pub fn detect_gaps(sequence: &MarkerSequence, profile: &RepairProfile) -> AssignmentTable {
    let mut table = AssignmentTable::new(sequence.per_record.len());

    let Some(global_min) = sequence.global_min() else {
        return table;
    };

    fill_empty_records(sequence, global_min, &mut table);
    fill_numeric_gaps(sequence, profile, &mut table);

    table
}

/// A record with no markers continues from the largest marker seen in any
/// earlier record. With nothing earlier it starts at the batch minimum.
/// Values assigned here do not move the running maximum.
fn fill_empty_records(sequence: &MarkerSequence, global_min: Marker, table: &mut AssignmentTable) {
    let mut running_max: Option<Marker> = None;

    for (ordinal, markers) in sequence.per_record.iter().enumerate() {
        if markers.is_empty() {
            let expected = match running_max {
                Some(max) => max.checked_add(1),
                None => Some(global_min),
            };

            match expected {
                Some(value) => {
                    tracing::debug!("Record {} has no markers, assigning {}", ordinal, value);
                    table.push(ordinal, value);
                }
                None => {
                    tracing::warn!("Record {} has no markers and no next value fits", ordinal);
                }
            }
        }

        if let Some(&max) = markers.iter().max() {
            running_max = Some(running_max.map_or(max, |current| current.max(max)));
        }
    }
}

/// Values strictly between the last marker of a record and the first marker
/// of the record after it go to the earlier record.
fn fill_numeric_gaps(
    sequence: &MarkerSequence,
    profile: &RepairProfile,
    table: &mut AssignmentTable,
) {
    for (ordinal, pair) in sequence.per_record.windows(2).enumerate() {
        let (Some(&last), Some(&first)) = (pair[0].iter().max(), pair[1].iter().min()) else {
            continue;
        };

        if first <= last {
            continue;
        }

        let gap = SkippedGap { ordinal, after: last, before: first };
        let width = gap.width();
        if width == 0 {
            continue;
        }

        if width > profile.max_gap_fill {
            tracing::warn!(
                "Gap of {} values between records {} and {} ({} -> {}) exceeds max_gap_fill {}; \
                 the output still lacks these values",
                width,
                ordinal,
                ordinal + 1,
                last,
                first,
                profile.max_gap_fill
            );
            table.skipped.push(gap);
            continue;
        }

        tracing::debug!("Record {} is followed by a gap {}..{}", ordinal, last + 1, first);
        table.extend(ordinal, (last + 1)..first);
    }
}

use std::collections::BTreeSet;

use super::line::LineKind;
use crate::core::{
    Marker,
    Record,
    RepairProfile,
};

/// Markers of every target field in `text`, in line order. Duplicates are kept.
pub fn record_markers(text: &str, profile: &RepairProfile) -> Vec<Marker> {
    text.lines()
        .filter_map(|line| match LineKind::classify(line, profile) {
            LineKind::Field(field) if field.tag == profile.target_tag => {
                field.marker(profile.marker_code)
            }
            _ => None,
        })
        .collect()
}

/// Markers of a whole batch: per record, and the distinct sorted set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerSequence {
    pub per_record: Vec<Vec<Marker>>,
    pub distinct: Vec<Marker>,
}

impl MarkerSequence {
    pub fn extract(records: &[Record], profile: &RepairProfile) -> Self {
        let per_record: Vec<Vec<Marker>> =
            records.iter().map(|record| record_markers(&record.text, profile)).collect();

        let distinct: Vec<Marker> = per_record
            .iter()
            .flatten()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self { per_record, distinct }
    }

    pub fn is_empty(&self) -> bool {
        self.distinct.is_empty()
    }

    pub fn global_min(&self) -> Option<Marker> {
        self.distinct.first().copied()
    }

    pub fn markers_of(&self, ordinal: usize) -> &[Marker] {
        self.per_record.get(ordinal).map(Vec::as_slice).unwrap_or(&[])
    }

    /// How many values are missing from the run between the smallest and
    /// largest marker.
    pub fn hole_count(&self) -> u64 {
        self.distinct.windows(2).map(|pair| pair[1] - pair[0] - 1).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_markers_keep_duplicates_and_order() {
        let text = "=LDR  x\n=852  \\\\$p9\n=653  \\\\$aTopic\n=852  \\\\$aMain$p9\n=852  \\\\$p2";
        assert_eq!(record_markers(text, &RepairProfile::default()), vec![9, 9, 2]);
    }

    #[test]
    fn test_other_fields_do_not_contribute() {
        let text = "=LDR  x\n=853  \\\\$p1\n=8520  \\\\$p2\n=500  \\\\$aSee =852 $p3";
        assert!(record_markers(text, &RepairProfile::default()).is_empty());
    }

    #[test]
    fn test_marker_does_not_cross_into_next_field() {
        let text = "=852  \\\\$aMain\n=653  \\\\$p7";
        assert!(record_markers(text, &RepairProfile::default()).is_empty());
    }

    #[test]
    fn test_sequence_over_batch() {
        let records = vec![
            Record::new(0, "=LDR  a\n=852  \\\\$p4"),
            Record::new(1, "=LDR  b"),
            Record::new(2, "=LDR  c\n=852  \\\\$p1\n=852  \\\\$p4"),
        ];
        let sequence = MarkerSequence::extract(&records, &RepairProfile::default());
        assert_eq!(sequence.per_record, vec![vec![4], vec![], vec![1, 4]]);
        assert_eq!(sequence.distinct, vec![1, 4]);
        assert_eq!(sequence.global_min(), Some(1));
        assert_eq!(sequence.markers_of(1), &[] as &[Marker]);
        assert_eq!(sequence.markers_of(9), &[] as &[Marker]);
        assert_eq!(sequence.hole_count(), 2);
    }

    #[test]
    fn test_empty_sequence() {
        let records = vec![Record::new(0, "=LDR  a\n=852  \\\\$aNo number")];
        let sequence = MarkerSequence::extract(&records, &RepairProfile::default());
        assert!(sequence.is_empty());
        assert_eq!(sequence.global_min(), None);
        assert_eq!(sequence.hole_count(), 0);
    }
}

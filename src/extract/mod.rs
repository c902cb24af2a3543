/// Record extraction from a loaded Timeline document.
///
/// Two independent passes feed the row collection: the recursive position
/// finder over the whole tree, then the segment extractor over the
/// top-level `semanticSegments` sequence.
pub mod positions;
pub mod segments;

use serde_json::Value;
use tracing::info;

use crate::normalize::Diagnostics;
use crate::record::Record;

/// All rows extracted from one document, positions first.
#[derive(Debug, Default)]
pub struct Extraction {
    pub records: Vec<Record>,
    pub positions_found: usize,
    pub segments_found: usize,
}

/// Run both extraction passes over `root`.
pub fn extract_records(root: &Value, diag: &mut Diagnostics) -> Extraction {
    let found = positions::find_positions(root);
    info!("Found {} position entries", found.len());

    let mut records: Vec<Record> = found
        .iter()
        .map(|position| positions::position_record(position, diag))
        .collect();

    let segment_values = segments::semantic_segments(root, diag);
    info!("Found {} semantic segments", segment_values.len());
    records.extend(segments::extract_segments(segment_values, diag));

    Extraction {
        records,
        positions_found: found.len(),
        segments_found: segment_values.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SegmentKind;
    use serde_json::json;

    #[test]
    fn test_empty_document() {
        let mut diag = Diagnostics::new();
        let extraction = extract_records(&json!({"userLocationProfile": {}}), &mut diag);
        assert!(extraction.records.is_empty());
        assert_eq!(extraction.positions_found, 0);
        assert_eq!(extraction.segments_found, 0);
    }

    #[test]
    fn test_positions_precede_segments() {
        let doc = json!({
            "semanticSegments": [{
                "startTime": "2024-01-01T00:00:00Z",
                "timelinePath": [{"point": "1,1"}]
            }],
            "rawSignals": [{"position": {"LatLng": "2,2", "timestamp": "2025-01-01T00:00:00Z"}}]
        });
        let mut diag = Diagnostics::new();
        let extraction = extract_records(&doc, &mut diag);

        let kinds: Vec<SegmentKind> = extraction.records.iter().map(Record::kind).collect();
        assert_eq!(kinds, vec![SegmentKind::Position, SegmentKind::TimelinePath]);
        assert_eq!(extraction.positions_found, 1);
        assert_eq!(extraction.segments_found, 1);
    }
}

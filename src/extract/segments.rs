//! Flattening of `semanticSegments` into path, visit and activity rows.
use serde_json::{Map, Value};

use crate::normalize::Diagnostics;
use crate::normalize::coords::parse_coordinates;
use crate::normalize::time::parse_datetime;
use crate::record::{ActivityRecord, PathRecord, Record, SegmentSpan, VisitRecord};

pub const SEGMENTS_KEY: &str = "semanticSegments";

/// The top-level segment sequence; empty when the key is absent.
pub fn semantic_segments<'a>(root: &'a Value, diag: &mut Diagnostics) -> &'a [Value] {
    match root.get(SEGMENTS_KEY) {
        None | Some(Value::Null) => &[],
        Some(Value::Array(segments)) => segments.as_slice(),
        Some(_) => {
            diag.skipped(SEGMENTS_KEY, "not an array");
            &[]
        }
    }
}

/// Extract rows from every segment, in input order.
pub fn extract_segments(segments: &[Value], diag: &mut Diagnostics) -> Vec<Record> {
    let mut records = Vec::new();
    for (index, segment) in segments.iter().enumerate() {
        match segment {
            Value::Object(segment) => extract_segment(segment, index, diag, &mut records),
            _ => diag.skipped(&format!("segment #{index}"), "not an object"),
        }
    }
    records
}

/// Path points, visit and activity are independent: one segment may yield
/// all three kinds.
fn extract_segment(
    segment: &Map<String, Value>,
    index: usize,
    diag: &mut Diagnostics,
    records: &mut Vec<Record>,
) {
    let span = SegmentSpan {
        start: parse_datetime(segment.get("startTime"), diag),
        end: parse_datetime(segment.get("endTime"), diag),
    };

    match segment.get("timelinePath") {
        None | Some(Value::Null) => {}
        Some(Value::Array(points)) => {
            for (point_index, point) in points.iter().enumerate() {
                match point {
                    Value::Object(point) => records.push(path_record(point, &span, diag)),
                    _ => diag.skipped(
                        &format!("segment #{index} path point #{point_index}"),
                        "not an object",
                    ),
                }
            }
        }
        Some(_) => diag.skipped(&format!("segment #{index} timelinePath"), "not an array"),
    }

    if let Some(visit) = sub_record(segment, "visit", index, diag) {
        records.push(visit_record(visit, &span, diag));
    }

    if let Some(activity) = sub_record(segment, "activity", index, diag) {
        records.push(activity_record(activity, &span, diag));
    }
}

/// A non-empty object under `key`. Empty objects count as absent.
fn sub_record<'a>(
    segment: &'a Map<String, Value>,
    key: &str,
    index: usize,
    diag: &mut Diagnostics,
) -> Option<&'a Map<String, Value>> {
    match segment.get(key)? {
        Value::Object(record) if !record.is_empty() => Some(record),
        Value::Object(_) | Value::Null => None,
        _ => {
            diag.skipped(&format!("segment #{index} {key}"), "not an object");
            None
        }
    }
}

fn path_record(point: &Map<String, Value>, span: &SegmentSpan, diag: &mut Diagnostics) -> Record {
    let own_time = parse_datetime(point.get("time"), diag);
    let location = point.get("point");

    Record::TimelinePath(PathRecord {
        time: own_time.or(&span.start),
        span: span.clone(),
        point: location.cloned(),
        coordinate: parse_coordinates(location, diag),
    })
}

fn visit_record(visit: &Map<String, Value>, span: &SegmentSpan, diag: &mut Diagnostics) -> Record {
    let candidate = visit.get("topCandidate");
    let place_location = candidate
        .and_then(|c| c.get("placeLocation"))
        .and_then(|l| l.get("latLng"));

    Record::Visit(VisitRecord {
        span: span.clone(),
        hierarchy_level: scalar(visit.get("hierarchyLevel")),
        probability: scalar(visit.get("probability")),
        place_id: scalar(candidate.and_then(|c| c.get("placeId"))),
        semantic_type: scalar(candidate.and_then(|c| c.get("semanticType"))),
        place_probability: scalar(candidate.and_then(|c| c.get("probability"))),
        place_coordinate: parse_coordinates(place_location, diag),
    })
}

fn activity_record(
    activity: &Map<String, Value>,
    span: &SegmentSpan,
    diag: &mut Diagnostics,
) -> Record {
    let candidate = activity.get("topCandidate");
    let start = activity.get("start").and_then(|s| s.get("latLng"));
    let end = activity.get("end").and_then(|e| e.get("latLng"));

    Record::Activity(ActivityRecord {
        span: span.clone(),
        start: parse_coordinates(start, diag),
        end: parse_coordinates(end, diag),
        distance_meters: scalar(activity.get("distanceMeters")),
        activity_type: scalar(candidate.and_then(|c| c.get("type"))),
        probability: scalar(candidate.and_then(|c| c.get("probability"))),
    })
}

fn scalar(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Column, SegmentKind};
    use serde_json::json;

    fn full_segment() -> Value {
        json!({
            "startTime": "2024-03-02T08:00:00.000+01:00",
            "endTime": "2024-03-02T09:30:00.000+01:00",
            "timelinePath": [
                {"point": "52.5200°, 13.4050°", "time": "2024-03-02T08:10:00.000+01:00"},
                {"point": "52.5210°, 13.4060°"}
            ],
            "visit": {
                "hierarchyLevel": 0,
                "probability": 0.91,
                "topCandidate": {
                    "placeId": "ChIJ_home",
                    "semanticType": "HOME",
                    "probability": 0.75,
                    "placeLocation": {"latLng": "52.5200°, 13.4050°"}
                }
            },
            "activity": {
                "start": {"latLng": "52.5200°, 13.4050°"},
                "end": {"latLng": "52.5300°, 13.4100°"},
                "distanceMeters": 1234.5,
                "topCandidate": {"type": "WALKING", "probability": 0.8}
            }
        })
    }

    #[test]
    fn test_missing_segments_key() {
        let mut diag = Diagnostics::new();
        assert!(semantic_segments(&json!({"rawSignals": []}), &mut diag).is_empty());
        assert!(semantic_segments(&json!([1, 2]), &mut diag).is_empty());
        assert!(diag.is_clean());
    }

    #[test]
    fn test_segments_not_an_array() {
        let mut diag = Diagnostics::new();
        assert!(semantic_segments(&json!({"semanticSegments": {}}), &mut diag).is_empty());
        assert_eq!(diag.skipped_records(), 1);
    }

    #[test]
    fn test_full_segment_yields_four_rows() {
        let mut diag = Diagnostics::new();
        let segments = [full_segment()];
        let records = extract_segments(&segments, &mut diag);

        let kinds: Vec<SegmentKind> = records.iter().map(Record::kind).collect();
        assert_eq!(
            kinds,
            vec![
                SegmentKind::TimelinePath,
                SegmentKind::TimelinePath,
                SegmentKind::Visit,
                SegmentKind::Activity
            ]
        );

        // Own time, then fallback to the segment start
        assert_eq!(records[0].time(), Some("2024-03-02 08:10:00.000"));
        assert_eq!(records[1].time(), Some("2024-03-02 08:00:00.000"));
        assert_eq!(records[2].time(), Some("2024-03-02 08:00:00.000"));
        assert_eq!(records[3].time(), Some("2024-03-02 08:00:00.000"));

        for record in &records {
            assert_eq!(
                record.cell(Column::StartTime).render(),
                "2024-03-02 08:00:00.000"
            );
            assert_eq!(record.cell(Column::EndTime).render(), "2024-03-02 09:30:00.000");
            assert_eq!(record.cell(Column::EndTimeOffset).render(), "+01:00");
        }
        assert!(diag.is_clean());
    }

    #[test]
    fn test_visit_and_activity_fields() {
        let mut diag = Diagnostics::new();
        let segments = [full_segment()];
        let records = extract_segments(&segments, &mut diag);

        let visit = &records[2];
        assert_eq!(visit.cell(Column::PlaceId).render(), "ChIJ_home");
        assert_eq!(visit.cell(Column::SemanticType).render(), "HOME");
        assert_eq!(visit.cell(Column::HierarchyLevel).render(), "0");
        assert_eq!(visit.cell(Column::Latitude).render(), "52.52");

        let activity = &records[3];
        assert_eq!(activity.cell(Column::ActivityType).render(), "WALKING");
        assert_eq!(activity.cell(Column::DistanceMeters).render(), "1234.5");
        assert_eq!(activity.cell(Column::EndLatitude).render(), "52.53");
        assert_eq!(activity.cell(Column::EndLongitude).render(), "13.41");
    }

    #[test]
    fn test_path_offset_falls_back_independently() {
        let mut diag = Diagnostics::new();
        let segments = [json!({
            "startTime": "2024-03-02T08:00:00+01:00",
            "timelinePath": [{"point": "1,1", "time": "2024-03-02T08:05:00"}]
        })];
        let records = extract_segments(&segments, &mut diag);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].time(), Some("2024-03-02 08:05:00.000"));
        assert_eq!(records[0].cell(Column::TimeOffset).render(), "+01:00");
    }

    #[test]
    fn test_empty_sub_records_are_absent() {
        let mut diag = Diagnostics::new();
        let segments = [json!({
            "startTime": "2024-03-02T08:00:00Z",
            "endTime": "2024-03-02T09:00:00Z",
            "visit": {},
            "activity": null,
            "timelinePath": []
        })];
        assert!(extract_segments(&segments, &mut diag).is_empty());
        assert!(diag.is_clean());
    }

    #[test]
    fn test_visit_without_candidate() {
        let mut diag = Diagnostics::new();
        let segments = [json!({"visit": {"probability": 0.4}})];
        let records = extract_segments(&segments, &mut diag);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].time(), None);
        assert_eq!(records[0].cell(Column::PlaceId).render(), "");
        assert_eq!(records[0].cell(Column::VisitProbability).render(), "0.4");
        assert!(diag.is_clean());
    }

    #[test]
    fn test_malformed_parts_are_skipped() {
        let mut diag = Diagnostics::new();
        let segments = [
            json!("not a segment"),
            json!({
                "startTime": "bogus",
                "timelinePath": [42, {"point": "1,1"}],
                "visit": "yes"
            }),
        ];
        let records = extract_segments(&segments, &mut diag);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind(), SegmentKind::TimelinePath);
        assert_eq!(records[0].time(), None);
        assert_eq!(diag.skipped_records(), 3);
        assert_eq!(diag.time_failures(), 1);
    }
}

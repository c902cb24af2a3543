//! Row assembly and CSV serialization.
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::record::{Column, Record};

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize CSV: {0}")]
    Serialize(#[from] csv::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Union of the columns used by any record, in order of first appearance.
pub fn column_superset(records: &[Record]) -> Vec<Column> {
    let mut columns: Vec<Column> = Vec::new();
    for record in records {
        for column in record.columns() {
            if !columns.contains(column) {
                columns.push(*column);
            }
        }
    }
    columns
}

/// Stable ascending sort on the `Time` column; untimed rows go last.
pub fn sort_by_time(records: &mut [Record]) {
    records.sort_by(|a, b| compare_time(a.time(), b.time()));
}

fn compare_time(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Serialize `records` as CSV with a header row naming `columns`.
pub fn to_csv(records: &[Record], columns: &[Column]) -> Result<Vec<u8>, WriteError> {
    let mut data = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut data);

        writer.write_record(columns.iter().map(Column::as_str))?;
        for record in records {
            writer.write_record(columns.iter().map(|c| record.cell(*c).render()))?;
        }
        writer.flush().map_err(csv::Error::from)?;
    }
    Ok(data)
}

/// Render the first `limit` rows (plus header) for console display.
pub fn preview(records: &[Record], columns: &[Column], limit: usize) -> Result<String, WriteError> {
    let head = &records[..records.len().min(limit)];
    let data = to_csv(head, columns)?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Write the table to `path` in one shot, creating parent directories.
///
/// An existing file at `path` is replaced.
pub fn write_csv(path: &Path, records: &[Record], columns: &[Column]) -> Result<(), WriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let data = to_csv(records, columns)?;
    fs::write(path, &data).map_err(|source| WriteError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Wrote {} rows ({} bytes) to {}", records.len(), data.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::time::ParsedTime;
    use crate::record::{ActivityRecord, PathRecord, PositionRecord, SegmentSpan};
    use serde_json::json;

    fn at(time: Option<&str>) -> ParsedTime {
        ParsedTime {
            time: time.map(str::to_string),
            offset: time.map(|_| "+00:00".to_string()),
        }
    }

    fn position(time: Option<&str>, source: &str) -> Record {
        Record::Position(PositionRecord {
            time: at(time),
            point: None,
            coordinate: None,
            accuracy_meters: None,
            altitude_meters: None,
            source: Some(json!(source)),
            speed_meters_per_second: None,
        })
    }

    fn path(time: Option<&str>) -> Record {
        Record::TimelinePath(PathRecord {
            time: at(time),
            span: SegmentSpan::default(),
            point: Some(json!("1°, 2°")),
            coordinate: None,
        })
    }

    fn activity(start: Option<&str>) -> Record {
        Record::Activity(ActivityRecord {
            span: SegmentSpan {
                start: at(start),
                end: ParsedTime::absent(),
            },
            start: None,
            end: None,
            distance_meters: Some(json!(10)),
            activity_type: Some(json!("CYCLING")),
            probability: None,
        })
    }

    fn sources(records: &[Record]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.cell(Column::Source).render())
            .collect()
    }

    #[test]
    fn test_superset_first_appearance_order() {
        let records = vec![path(None), activity(None)];
        let columns = column_superset(&records);

        let names: Vec<&str> = columns.iter().map(Column::as_str).collect();
        assert_eq!(names[0], "Time");
        assert_eq!(names[9], "Segment Type");
        assert_eq!(names[10], "Start Latitude");
        assert_eq!(names.len(), 17);
        assert!(!names.contains(&"Source"));
    }

    #[test]
    fn test_superset_only_from_present_kinds() {
        let records = vec![position(Some("2024-01-01 00:00:00.000"), "GPS")];
        let columns = column_superset(&records);
        assert_eq!(columns.len(), 10);
        assert!(!columns.contains(&Column::StartTime));
    }

    #[test]
    fn test_sort_is_stable_with_untimed_last() {
        let mut records = vec![
            position(None, "untimed-1"),
            position(Some("2024-01-02 00:00:00.000"), "late"),
            position(Some("2024-01-01 00:00:00.000"), "tie-1"),
            position(None, "untimed-2"),
            position(Some("2024-01-01 00:00:00.000"), "tie-2"),
        ];
        sort_by_time(&mut records);
        assert_eq!(
            sources(&records),
            vec!["tie-1", "tie-2", "late", "untimed-1", "untimed-2"]
        );
    }

    #[test]
    fn test_to_csv_renders_absent_as_empty() {
        let records = vec![path(Some("2024-01-01 00:00:00.000")), activity(None)];
        let columns = column_superset(&records);
        let data = String::from_utf8(to_csv(&records, &columns).unwrap()).unwrap();
        let lines: Vec<&str> = data.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Time,Time Offset,Start Time"));
        assert!(lines[1].contains("\"1°, 2°\""));
        assert!(lines[1].ends_with("Timeline Path,,,,,,,"));
        assert!(lines[2].starts_with(",,,,,,,,,Activity"));
        assert!(lines[2].ends_with(",10,CYCLING,"));
    }

    #[test]
    fn test_preview_limits_rows() {
        let records: Vec<Record> = (0..8).map(|_| path(None)).collect();
        let columns = column_superset(&records);
        let text = preview(&records, &columns, 5).unwrap();
        assert_eq!(text.lines().count(), 6);
    }

    #[test]
    fn test_write_creates_directories_and_overwrites() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("nested").join("dir").join("out.csv");
        let records = vec![path(Some("2024-01-01 00:00:00.000"))];
        let columns = column_superset(&records);

        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, "stale contents\n".repeat(100)).unwrap();

        write_csv(&target, &records, &columns).unwrap();
        let written = fs::read_to_string(&target).unwrap();
        assert_eq!(written.lines().count(), 2);
        assert!(!written.contains("stale"));

        let fresh = temp.path().join("other").join("out.csv");
        write_csv(&fresh, &records, &columns).unwrap();
        assert!(fresh.exists());
    }

    #[test]
    fn test_write_to_directory_fails() {
        let temp = tempfile::tempdir().unwrap();
        let records = vec![path(None)];
        let columns = column_superset(&records);

        let err = write_csv(temp.path(), &records, &columns).unwrap_err();
        assert!(matches!(err, WriteError::Write { .. }));
    }
}

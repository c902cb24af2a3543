//! Discovery of raw position fixes at any nesting depth.
//!
//! Exports nest positions under different parents (`rawSignals[].position`,
//! per-device arrays, ...), so the finder does not rely on any path: any
//! object holding both a `LatLng` and a `timestamp` key is a position.
use serde_json::{Map, Value};

use crate::normalize::Diagnostics;
use crate::normalize::coords::parse_coordinates;
use crate::normalize::time::parse_datetime;
use crate::record::{PositionRecord, Record};

pub const COORDINATE_KEY: &str = "LatLng";
pub const TIMESTAMP_KEY: &str = "timestamp";

fn is_position(map: &Map<String, Value>) -> bool {
    map.contains_key(COORDINATE_KEY) && map.contains_key(TIMESTAMP_KEY)
}

/// Every position-shaped object in `root`, in document pre-order.
///
/// A matching object is still descended into, so positions nested inside
/// positions are reported too (parent first). The walk uses an explicit
/// stack, so nesting depth is bounded only by memory.
pub fn find_positions(root: &Value) -> Vec<&Map<String, Value>> {
    let mut found = Vec::new();
    let mut pending = vec![root];

    while let Some(node) = pending.pop() {
        match node {
            Value::Object(map) => {
                if is_position(map) {
                    found.push(map);
                }
                // Reversed so the first child is popped first
                pending.extend(map.values().rev());
            }
            Value::Array(items) => pending.extend(items.iter().rev()),
            _ => {}
        }
    }
    found
}

/// Normalize one position object into a row.
pub fn position_record(position: &Map<String, Value>, diag: &mut Diagnostics) -> Record {
    let point = position.get(COORDINATE_KEY);

    Record::Position(PositionRecord {
        time: parse_datetime(position.get(TIMESTAMP_KEY), diag),
        point: point.cloned(),
        coordinate: parse_coordinates(point, diag),
        accuracy_meters: scalar(position, "accuracyMeters"),
        altitude_meters: scalar(position, "altitudeMeters"),
        source: scalar(position, "source"),
        speed_meters_per_second: scalar(position, "speedMetersPerSecond"),
    })
}

fn scalar(map: &Map<String, Value>, key: &str) -> Option<Value> {
    map.get(key).filter(|v| !v.is_null()).cloned()
}

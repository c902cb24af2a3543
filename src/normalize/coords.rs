//! Coordinate string normalization (`"12.345°, -67.890°"` → degrees).
use serde_json::Value;
use thiserror::Error;

use super::Diagnostics;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateParseError {
    #[error("no coordinate value")]
    Missing,

    #[error("coordinate is not a string")]
    NotAString,

    #[error("expected 2 comma-separated components, found {found}")]
    ComponentCount { found: usize },

    #[error("invalid number {0:?}")]
    InvalidNumber(String),
}

/// A latitude/longitude pair in floating-point degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Strip decoration from a coordinate string and parse both components.
///
/// Non-ASCII characters (including `°`) and spaces are dropped before
/// splitting on commas.
pub fn try_parse_coordinates(input: &str) -> Result<Coordinate, CoordinateParseError> {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii() && *c != ' ')
        .collect();

    let parts: Vec<&str> = cleaned.split(',').collect();
    let [lat, lon] = parts.as_slice() else {
        return Err(CoordinateParseError::ComponentCount { found: parts.len() });
    };

    Ok(Coordinate {
        latitude: parse_component(lat)?,
        longitude: parse_component(lon)?,
    })
}

fn parse_component(component: &str) -> Result<f64, CoordinateParseError> {
    component
        .trim()
        .parse::<f64>()
        .map_err(|_| CoordinateParseError::InvalidNumber(component.to_string()))
}

/// Parse an optional JSON value as a coordinate, never failing.
///
/// A missing or `null` value is plain absence; anything else that does not
/// parse is reported to `diag`.
pub fn parse_coordinates(value: Option<&Value>, diag: &mut Diagnostics) -> Option<Coordinate> {
    let result = match value {
        None | Some(Value::Null) => Err(CoordinateParseError::Missing),
        Some(Value::String(s)) => try_parse_coordinates(s),
        Some(_) => Err(CoordinateParseError::NotAString),
    };

    match result {
        Ok(coordinate) => Some(coordinate),
        Err(CoordinateParseError::Missing) => None,
        Err(e) => {
            if let Some(v) = value {
                diag.coordinate_failure(v, &e);
            }
            None
        }
    }
}

//! Typed output rows and their projection onto the flat CSV schema.
//!
//! Each record kind carries only its own fields. The wide table exists
//! only at serialization time, when [`Record::cell`] is asked for every
//! column of the run's column superset.
use serde_json::Value;

use crate::normalize::coords::Coordinate;
use crate::normalize::time::ParsedTime;

// ── Columns ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Time,
    TimeOffset,
    StartTime,
    StartTimeOffset,
    EndTime,
    EndTimeOffset,
    Point,
    Latitude,
    Longitude,
    AccuracyMeters,
    AltitudeMeters,
    Source,
    SpeedMetersPerSecond,
    SegmentType,
    HierarchyLevel,
    VisitProbability,
    PlaceId,
    SemanticType,
    PlaceProbability,
    StartLatitude,
    StartLongitude,
    EndLatitude,
    EndLongitude,
    DistanceMeters,
    ActivityType,
    ActivityProbability,
}

impl Column {
    /// Header text for this column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Time => "Time",
            Column::TimeOffset => "Time Offset",
            Column::StartTime => "Start Time",
            Column::StartTimeOffset => "Start Time Offset",
            Column::EndTime => "End Time",
            Column::EndTimeOffset => "End Time Offset",
            Column::Point => "Point",
            Column::Latitude => "Latitude",
            Column::Longitude => "Longitude",
            Column::AccuracyMeters => "Accuracy Meters",
            Column::AltitudeMeters => "Altitude Meters",
            Column::Source => "Source",
            Column::SpeedMetersPerSecond => "Speed Meters/Second",
            Column::SegmentType => "Segment Type",
            Column::HierarchyLevel => "Hierarchy Level",
            Column::VisitProbability => "Visit Probability",
            Column::PlaceId => "Place ID",
            Column::SemanticType => "Semantic Type",
            Column::PlaceProbability => "Place Probability",
            Column::StartLatitude => "Start Latitude",
            Column::StartLongitude => "Start Longitude",
            Column::EndLatitude => "End Latitude",
            Column::EndLongitude => "End Longitude",
            Column::DistanceMeters => "Distance Meters",
            Column::ActivityType => "Activity Type",
            Column::ActivityProbability => "Activity Probability",
        }
    }
}

const POSITION_COLUMNS: &[Column] = &[
    Column::Time,
    Column::TimeOffset,
    Column::Point,
    Column::Latitude,
    Column::Longitude,
    Column::AccuracyMeters,
    Column::AltitudeMeters,
    Column::Source,
    Column::SpeedMetersPerSecond,
    Column::SegmentType,
];

const PATH_COLUMNS: &[Column] = &[
    Column::Time,
    Column::TimeOffset,
    Column::StartTime,
    Column::StartTimeOffset,
    Column::EndTime,
    Column::EndTimeOffset,
    Column::Point,
    Column::Latitude,
    Column::Longitude,
    Column::SegmentType,
];

const VISIT_COLUMNS: &[Column] = &[
    Column::Time,
    Column::TimeOffset,
    Column::StartTime,
    Column::StartTimeOffset,
    Column::EndTime,
    Column::EndTimeOffset,
    Column::SegmentType,
    Column::HierarchyLevel,
    Column::VisitProbability,
    Column::PlaceId,
    Column::SemanticType,
    Column::PlaceProbability,
    Column::Latitude,
    Column::Longitude,
];

const ACTIVITY_COLUMNS: &[Column] = &[
    Column::Time,
    Column::TimeOffset,
    Column::StartTime,
    Column::StartTimeOffset,
    Column::EndTime,
    Column::EndTimeOffset,
    Column::SegmentType,
    Column::StartLatitude,
    Column::StartLongitude,
    Column::EndLatitude,
    Column::EndLongitude,
    Column::DistanceMeters,
    Column::ActivityType,
    Column::ActivityProbability,
];

// ── Segment kinds ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Position,
    TimelinePath,
    Visit,
    Activity,
}

impl SegmentKind {
    /// Value of the `Segment Type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Position => "Position",
            SegmentKind::TimelinePath => "Timeline Path",
            SegmentKind::Visit => "Visit",
            SegmentKind::Activity => "Activity",
        }
    }

    /// Columns a record of this kind populates, in header order.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            SegmentKind::Position => POSITION_COLUMNS,
            SegmentKind::TimelinePath => PATH_COLUMNS,
            SegmentKind::Visit => VISIT_COLUMNS,
            SegmentKind::Activity => ACTIVITY_COLUMNS,
        }
    }
}

// ── Cells ────────────────────────────────────────────────────────────

/// One CSV field.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    fn text(value: Option<&str>) -> Self {
        value.map_or(Cell::Empty, |s| Cell::Text(s.to_string()))
    }

    fn number(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }

    /// Pass-through JSON value: strings unquoted, everything else as JSON text.
    fn scalar(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Cell::Empty,
            Some(Value::String(s)) => Cell::Text(s.clone()),
            Some(other) => Cell::Text(other.to_string()),
        }
    }

    pub fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                let mut out = n.to_string();
                // Floats keep a fractional digit so `12.0` stays distinct from `12`
                if n.is_finite() && !out.contains('.') {
                    out.push_str(".0");
                }
                out
            }
        }
    }
}

// ── Records ──────────────────────────────────────────────────────────

/// A raw device fix found anywhere in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRecord {
    pub time: ParsedTime,
    pub point: Option<Value>,
    pub coordinate: Option<Coordinate>,
    pub accuracy_meters: Option<Value>,
    pub altitude_meters: Option<Value>,
    pub source: Option<Value>,
    pub speed_meters_per_second: Option<Value>,
}

/// Start and end of the semantic segment a record came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentSpan {
    pub start: ParsedTime,
    pub end: ParsedTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathRecord {
    /// Point's own time, falling back to the segment start.
    pub time: ParsedTime,
    pub span: SegmentSpan,
    pub point: Option<Value>,
    pub coordinate: Option<Coordinate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisitRecord {
    pub span: SegmentSpan,
    pub hierarchy_level: Option<Value>,
    pub probability: Option<Value>,
    pub place_id: Option<Value>,
    pub semantic_type: Option<Value>,
    pub place_probability: Option<Value>,
    pub place_coordinate: Option<Coordinate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub span: SegmentSpan,
    pub start: Option<Coordinate>,
    pub end: Option<Coordinate>,
    pub distance_meters: Option<Value>,
    pub activity_type: Option<Value>,
    pub probability: Option<Value>,
}

/// One output row.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Position(PositionRecord),
    TimelinePath(PathRecord),
    Visit(VisitRecord),
    Activity(ActivityRecord),
}

impl Record {
    pub fn kind(&self) -> SegmentKind {
        match self {
            Record::Position(_) => SegmentKind::Position,
            Record::TimelinePath(_) => SegmentKind::TimelinePath,
            Record::Visit(_) => SegmentKind::Visit,
            Record::Activity(_) => SegmentKind::Activity,
        }
    }

    /// The `Time`/`Time Offset` pair used for ordering.
    pub fn row_time(&self) -> &ParsedTime {
        match self {
            Record::Position(p) => &p.time,
            Record::TimelinePath(p) => &p.time,
            Record::Visit(v) => &v.span.start,
            Record::Activity(a) => &a.span.start,
        }
    }

    /// Value of the `Time` column, if determinable.
    pub fn time(&self) -> Option<&str> {
        self.row_time().time.as_deref()
    }

    pub fn columns(&self) -> &'static [Column] {
        self.kind().columns()
    }

    fn span(&self) -> Option<&SegmentSpan> {
        match self {
            Record::Position(_) => None,
            Record::TimelinePath(p) => Some(&p.span),
            Record::Visit(v) => Some(&v.span),
            Record::Activity(a) => Some(&a.span),
        }
    }

    /// Project this record onto `column`; columns foreign to the record's
    /// kind are empty.
    pub fn cell(&self, column: Column) -> Cell {
        match column {
            Column::Time => return Cell::text(self.row_time().time.as_deref()),
            Column::TimeOffset => return Cell::text(self.row_time().offset.as_deref()),
            Column::SegmentType => return Cell::Text(self.kind().as_str().to_string()),
            _ => {}
        }

        if let Some(span) = self.span() {
            match column {
                Column::StartTime => return Cell::text(span.start.time.as_deref()),
                Column::StartTimeOffset => return Cell::text(span.start.offset.as_deref()),
                Column::EndTime => return Cell::text(span.end.time.as_deref()),
                Column::EndTimeOffset => return Cell::text(span.end.offset.as_deref()),
                _ => {}
            }
        }

        match (self, column) {
            (Record::Position(p), Column::Point) => Cell::scalar(p.point.as_ref()),
            (Record::Position(p), Column::Latitude) => latitude(p.coordinate),
            (Record::Position(p), Column::Longitude) => longitude(p.coordinate),
            (Record::Position(p), Column::AccuracyMeters) => {
                Cell::scalar(p.accuracy_meters.as_ref())
            }
            (Record::Position(p), Column::AltitudeMeters) => {
                Cell::scalar(p.altitude_meters.as_ref())
            }
            (Record::Position(p), Column::Source) => Cell::scalar(p.source.as_ref()),
            (Record::Position(p), Column::SpeedMetersPerSecond) => {
                Cell::scalar(p.speed_meters_per_second.as_ref())
            }

            (Record::TimelinePath(p), Column::Point) => Cell::scalar(p.point.as_ref()),
            (Record::TimelinePath(p), Column::Latitude) => latitude(p.coordinate),
            (Record::TimelinePath(p), Column::Longitude) => longitude(p.coordinate),

            (Record::Visit(v), Column::HierarchyLevel) => Cell::scalar(v.hierarchy_level.as_ref()),
            (Record::Visit(v), Column::VisitProbability) => Cell::scalar(v.probability.as_ref()),
            (Record::Visit(v), Column::PlaceId) => Cell::scalar(v.place_id.as_ref()),
            (Record::Visit(v), Column::SemanticType) => Cell::scalar(v.semantic_type.as_ref()),
            (Record::Visit(v), Column::PlaceProbability) => {
                Cell::scalar(v.place_probability.as_ref())
            }
            (Record::Visit(v), Column::Latitude) => latitude(v.place_coordinate),
            (Record::Visit(v), Column::Longitude) => longitude(v.place_coordinate),

            (Record::Activity(a), Column::StartLatitude) => latitude(a.start),
            (Record::Activity(a), Column::StartLongitude) => longitude(a.start),
            (Record::Activity(a), Column::EndLatitude) => latitude(a.end),
            (Record::Activity(a), Column::EndLongitude) => longitude(a.end),
            (Record::Activity(a), Column::DistanceMeters) => {
                Cell::scalar(a.distance_meters.as_ref())
            }
            (Record::Activity(a), Column::ActivityType) => Cell::scalar(a.activity_type.as_ref()),
            (Record::Activity(a), Column::ActivityProbability) => {
                Cell::scalar(a.probability.as_ref())
            }

            _ => Cell::Empty,
        }
    }
}

fn latitude(coordinate: Option<Coordinate>) -> Cell {
    Cell::number(coordinate.map(|c| c.latitude))
}

fn longitude(coordinate: Option<Coordinate>) -> Cell {
    Cell::number(coordinate.map(|c| c.longitude))
}

/// Lenient value normalization for Timeline records.
///
/// Each normalizer exposes a strict `try_*` function returning a typed error,
/// and a lenient wrapper that degrades failures to absent values and reports
/// them to a [`Diagnostics`] sink supplied by the caller.
pub mod coords;
pub mod time;

use std::fmt::Display;

use tracing::warn;

/// Collects per-record parse failures for one conversion run.
///
/// Every reported failure is logged at `warn` level as it happens; the
/// counters feed the end-of-run summary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    time_failures: usize,
    coordinate_failures: usize,
    skipped_records: usize,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A timestamp could not be parsed; the affected columns stay empty.
    pub fn time_failure(&mut self, input: impl Display, reason: impl Display) {
        self.time_failures += 1;
        warn!("Error parsing datetime {input}: {reason}");
    }

    /// A coordinate could not be parsed; the affected columns stay empty.
    pub fn coordinate_failure(&mut self, input: impl Display, reason: impl Display) {
        self.coordinate_failures += 1;
        warn!("Error parsing coordinates {input}: {reason}");
    }

    /// A record had an unexpected shape and produced no row.
    pub fn skipped(&mut self, what: &str, reason: impl Display) {
        self.skipped_records += 1;
        warn!("Skipping {what}: {reason}");
    }

    #[must_use]
    pub fn time_failures(&self) -> usize {
        self.time_failures
    }

    #[must_use]
    pub fn coordinate_failures(&self) -> usize {
        self.coordinate_failures
    }

    #[must_use]
    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    /// Whether nothing at all was reported.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.time_failures == 0 && self.coordinate_failures == 0 && self.skipped_records == 0
    }
}

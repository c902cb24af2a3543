//! # timeline2csv — Timeline export flattener
//!
//! Converts a location-history Timeline export (raw position fixes plus
//! semantic segments) into a single CSV table sorted by time.
//!
//! ## Architecture
//!
//! - **[`config`]** — Input/output path configuration (JSON file + CLI overrides)
//! - **[`document`]** — Whole-document JSON loading
//! - **[`extract`]** — Recursive position finder and semantic segment extractor
//! - **[`normalize`]** — Lenient timestamp and coordinate parsing with diagnostics
//! - **[`record`]** — Typed output rows and their projection onto CSV columns
//! - **[`writer`]** — Column superset, time ordering and CSV serialization
//! - **[`convert`]** — The end-to-end conversion pipeline

pub mod config;
pub mod convert;
pub mod document;
pub mod extract;
pub mod normalize;
pub mod record;
pub mod writer;

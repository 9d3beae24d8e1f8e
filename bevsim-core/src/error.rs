//! Module containing the per-stage error types of the pipeline.
//!
//! Each stage fails with its own type so a caller can tell a bad vehicle
//! config from an engine-version mismatch without inspecting message text.
//! All of these convert into `anyhow::Error` at the scenario layer.

use thiserror::Error;

/// Vehicle configuration rejected. Violations are collected exhaustively so a
/// hand-authored config can be fixed in one pass rather than one field at a time.
#[derive(Error, Debug)]
#[error("vehicle config validation failed: {}", violations.join("; "))]
pub struct ConfigValidationError {
    pub violations: Vec<String>,
}

/// Drive cycle could not be loaded or fails its ordering invariants.
#[derive(Error, Debug)]
pub enum CycleLoadError {
    #[error("cycle file not found: {path}")]
    NotFound { path: String },
    #[error("could not read cycle {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unparsable row in cycle {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("unknown standard cycle {name:?}; available: {available:?}")]
    UnknownName { name: String, available: Vec<String> },
    #[error("cycle {name:?} contains no samples")]
    Empty { name: String },
    #[error("time must be strictly increasing; sample {index}: {prev} -> {next}")]
    NonMonotonicTime { index: usize, prev: f64, next: f64 },
    #[error("negative time at sample {index}: {value}")]
    NegativeTime { index: usize, value: f64 },
    #[error("negative speed at sample {index}: {value}")]
    NegativeSpeed { index: usize, value: f64 },
    #[error("cannot concatenate an empty sequence of cycles")]
    EmptyConcat,
}

/// Simulation engine failure. Deterministic for fixed inputs, so neither
/// variant is retriable; both are terminal for the scenario.
#[derive(Error, Debug)]
pub enum SimError {
    #[error(
        "charge-sustaining solve did not converge after {iterations} iterations \
         (final SOC residual {residual:.4})"
    )]
    SimulationDivergence { iterations: usize, residual: f64 },
    #[error("required {what} {required:.1} exceeds limit {limit:.1} at step {index}")]
    InfeasibleTrace {
        index: usize,
        what: &'static str,
        required: f64,
        limit: f64,
    },
}

/// Raw simulation output could not be mapped onto the canonical schema,
/// usually an engine-version mismatch.
#[derive(Error, Debug)]
pub enum SchemaAdapterError {
    #[error("no raw field found for canonical {canonical:?}; candidates tried: {candidates:?}")]
    MissingField {
        canonical: &'static str,
        candidates: Vec<&'static str>,
    },
    #[error("raw field {field:?} has length {len}, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("time_s decreases at sample {index}: {prev} -> {next}")]
    NonMonotonicTime { index: usize, prev: f64, next: f64 },
}

/// Non-finite sample in the canonical series. Invalid data is never silently
/// replaced with zero.
#[derive(Error, Debug)]
#[error("non-finite {field} at sample {index}: {value}")]
pub struct IntegrationError {
    pub field: &'static str,
    pub index: usize,
    pub value: f64,
}

/// Upstream simulation produced zero timesteps.
#[derive(Error, Debug)]
#[error("telemetry series is empty; simulation produced zero timesteps")]
pub struct EmptySeriesError;

/// Dataset could not be written. The previous output file, if any, is left
/// untouched because writes go through a temp file and atomic rename.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("derived series has {derived} samples but telemetry has {telemetry}")]
    LengthMismatch { telemetry: usize, derived: usize },
    #[error("could not stage dataset next to {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write dataset row: {0}")]
    Write(#[from] csv::Error),
    #[error("could not finalize dataset at {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

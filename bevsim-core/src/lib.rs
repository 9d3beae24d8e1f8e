//! Crate containing the drive-cycle simulation, telemetry normalization, and
//! energy-integration pipeline for battery-electric vehicles.
//!
//! The pipeline is a strictly sequential function chain per scenario:
//! [vehicle::Vehicle] + [cycle::Cycle] -> [simdrive::SimulationInvoker] ->
//! [simdrive::RawSimResult] -> [telemetry::TelemetrySeries] ->
//! [integrate::DerivedSeries] -> [summary::SummaryReport] / [export].

pub mod cycle;
pub mod error;
pub mod export;
pub mod imports;
pub mod integrate;
pub mod params;
pub mod scenario;
pub mod simdrive;
pub mod summary;
pub mod telemetry;
pub mod traits;
pub mod utils;
pub mod vehicle;

#[cfg(feature = "resources")]
pub mod resources;

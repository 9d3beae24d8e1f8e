//! Module containing the per-step dataset export.
//!
//! The dataset is a fixed-schema CSV meant for downstream energy-model
//! training, so the export is deterministic: identical inputs produce
//! byte-identical files. Floats are written with the shortest representation
//! that round-trips. Writes stage into a temp file in the destination
//! directory and rename into place, so an existing file is either fully
//! replaced or left untouched.

use crate::error::ExportError;
use crate::imports::*;
use crate::integrate::DerivedSeries;
use crate::telemetry::TelemetrySeries;

/// One exported timestep. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub time_s: f64,
    pub speed_mps: f64,
    pub soc: f64,
    pub step_energy_j: f64,
    pub cumulative_energy_j: f64,
}

/// Writes the per-step dataset for one run to `path`, replacing any existing
/// file atomically.
pub fn write_dataset(
    telemetry: &TelemetrySeries,
    derived: &DerivedSeries,
    path: &Path,
) -> Result<(), ExportError> {
    if derived.step_energy_j.len() != telemetry.len()
        || derived.cumulative_energy_j.len() != telemetry.len()
    {
        return Err(ExportError::LengthMismatch {
            telemetry: telemetry.len(),
            derived: derived.step_energy_j.len(),
        });
    }

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let staged = tempfile::NamedTempFile::new_in(dir).map_err(|source| ExportError::Create {
        path: path.to_string_lossy().into_owned(),
        source,
    })?;

    let mut wtr = csv::Writer::from_writer(staged);
    for i in 0..telemetry.len() {
        wtr.serialize(DatasetRow {
            time_s: telemetry.time_s[i],
            speed_mps: telemetry.speed_mps[i],
            soc: telemetry.soc[i],
            step_energy_j: derived.step_energy_j[i],
            cumulative_energy_j: derived.cumulative_energy_j[i],
        })?;
    }
    let staged = wtr.into_inner().map_err(|e| ExportError::Create {
        path: path.to_string_lossy().into_owned(),
        source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
    })?;

    staged.persist(path).map_err(|e| ExportError::Persist {
        path: path.to_string_lossy().into_owned(),
        source: e.error,
    })?;
    Ok(())
}

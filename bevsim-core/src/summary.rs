//! Module containing the end-of-run scalar summary.

use crate::error::EmptySeriesError;
use crate::imports::*;
use crate::integrate::DerivedSeries;
use crate::telemetry::TelemetrySeries;

/// Headline scalars for one completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub vehicle: String,
    pub route: String,
    pub total_distance_km: f64,
    pub final_soc: f64,
    pub total_energy_kwh: f64,
}

impl SerdeAPI for SummaryReport {}

/// Reduces a telemetry/derived pair to its headline scalars. Fails on empty
/// series rather than inventing zeros.
pub fn summarize(
    vehicle: &str,
    route: &str,
    telemetry: &TelemetrySeries,
    derived: &DerivedSeries,
) -> Result<SummaryReport, EmptySeriesError> {
    let final_soc = *telemetry.soc.last().ok_or(EmptySeriesError)?;
    if derived.cumulative_energy_j.is_empty() {
        return Err(EmptySeriesError);
    }
    Ok(SummaryReport {
        vehicle: vehicle.to_string(),
        route: route.to_string(),
        total_distance_km: derived.total_distance_km(),
        final_soc,
        total_energy_kwh: derived.total_energy_kwh(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrate::derive;

    #[test]
    fn test_summary_scalars() {
        let ts = TelemetrySeries {
            time_s: array![0.0, 1.0, 2.0],
            speed_mps: array![0.0, 10.0, 20.0],
            electrical_power_w: array![0.0, 1.8e6, 1.8e6],
            soc: array![0.8, 0.79, 0.78],
        };
        let derived = derive(&ts).unwrap();
        let report = summarize("truck", "udds", &ts, &derived).unwrap();
        assert_eq!(report.vehicle, "truck");
        assert_eq!(report.route, "udds");
        assert_eq!(report.final_soc, 0.78);
        assert!(report.total_energy_kwh.approx_eq(&1.0, 1e-9));
        assert!(report.total_distance_km.approx_eq(&0.03, 1e-9));
    }

    #[test]
    fn test_empty_series_is_an_error() {
        let ts = TelemetrySeries::default();
        let derived = DerivedSeries::default();
        assert!(summarize("truck", "udds", &ts, &derived).is_err());
    }
}

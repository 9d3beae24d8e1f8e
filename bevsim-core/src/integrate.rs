//! Module containing discrete integration of telemetry into per-step and
//! cumulative energy and distance series.
//!
//! Integration is left-sampled: each step interval is attributed to the
//! sample at its right edge using the power recorded there, and the first
//! sample has a zero-width interval. Negative power (regen) integrates
//! negatively, so cumulative energy can locally decrease.

use crate::error::IntegrationError;
use crate::imports::*;
use crate::telemetry::TelemetrySeries;
use crate::utils::{diff, ndarrcumsum};

/// Series derived from telemetry by discrete integration, index-aligned with
/// the telemetry that produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    /// Interval width ending at each sample [s], zero at index 0
    pub dt_s: Array1<f64>,
    /// Battery energy over each interval [J]
    pub step_energy_j: Array1<f64>,
    /// Running total of step energy [J]
    pub cumulative_energy_j: Array1<f64>,
    /// Running distance [m]
    pub cumulative_distance_m: Array1<f64>,
}

impl SerdeAPI for DerivedSeries {}

impl DerivedSeries {
    /// Net battery energy over the whole series [kWh]
    pub fn total_energy_kwh(&self) -> f64 {
        self.cumulative_energy_j.last().copied().unwrap_or(0.0) / crate::params::J_PER_KWH
    }

    /// Total distance over the whole series [km]
    pub fn total_distance_km(&self) -> f64 {
        self.cumulative_distance_m.last().copied().unwrap_or(0.0) / crate::params::M_PER_KM
    }
}

fn check_finite(field: &'static str, values: &Array1<f64>) -> Result<(), IntegrationError> {
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(IntegrationError {
                field,
                index,
                value,
            });
        }
    }
    Ok(())
}

/// Integrates power into energy and speed into distance over the telemetry
/// time base. Non-finite inputs are rejected before any arithmetic so a NaN
/// cannot silently poison the cumulative sums.
pub fn derive(telemetry: &TelemetrySeries) -> Result<DerivedSeries, IntegrationError> {
    check_finite("time_s", &telemetry.time_s)?;
    check_finite("speed_mps", &telemetry.speed_mps)?;
    check_finite("electrical_power_w", &telemetry.electrical_power_w)?;

    let dt_s = diff(&telemetry.time_s);
    let step_energy_j = &telemetry.electrical_power_w * &dt_s;
    let cumulative_energy_j = ndarrcumsum(&step_energy_j);
    let step_distance_m = &telemetry.speed_mps * &dt_s;
    let cumulative_distance_m = ndarrcumsum(&step_distance_m);

    Ok(DerivedSeries {
        dt_s,
        step_energy_j,
        cumulative_energy_j,
        cumulative_distance_m,
    })
}

//! Module containing scenario assembly and the pipeline that runs one
//! prepared scenario through an engine into canonical results.

use crate::cycle::Cycle;
use crate::imports::*;
use crate::integrate::{self, DerivedSeries};
use crate::simdrive::{InitSocSpec, SimulationInvoker};
use crate::summary::{self, SummaryReport};
use crate::telemetry::{self, TelemetrySeries};
use crate::vehicle::Vehicle;
use rayon::prelude::*;

/// A fully prepared run: validated vehicle, resolved cycle, initial SOC
/// policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub veh: Vehicle,
    pub cyc: Cycle,
    pub init_soc: InitSocSpec,
}

impl Scenario {
    pub fn new(veh: Vehicle, cyc: Cycle, init_soc: InitSocSpec) -> Self {
        Self { veh, cyc, init_soc }
    }
}

/// Canonical results of one completed scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutput {
    pub telemetry: TelemetrySeries,
    pub derived: DerivedSeries,
    pub summary: SummaryReport,
}

/// Runs one scenario end to end: validate the vehicle, invoke the engine,
/// adapt the raw output, integrate, summarize. Validation failures surface
/// before the engine is ever invoked.
pub fn run_scenario(
    scenario: &Scenario,
    invoker: &dyn SimulationInvoker,
) -> anyhow::Result<ScenarioOutput> {
    scenario.veh.validate_config()?;
    log::info!(
        "running `{}` over `{}` ({} samples, {:.1} km)",
        scenario.veh.veh_name,
        scenario.cyc.name,
        scenario.cyc.len(),
        scenario.cyc.dist_m().sum() / crate::params::M_PER_KM,
    );
    let raw = invoker
        .run(&scenario.veh, &scenario.cyc, scenario.init_soc)
        .with_context(|| format!("simulating `{}` over `{}`", scenario.veh.veh_name, scenario.cyc.name))?;
    let telemetry = telemetry::adapt(&raw).context("adapting raw simulation output")?;
    let derived = integrate::derive(&telemetry).context("integrating telemetry")?;
    let summary = summary::summarize(&scenario.veh.veh_name, &scenario.cyc.name, &telemetry, &derived)?;
    log::info!(
        "`{}` over `{}`: {:.2} kWh, final SOC {:.3}",
        summary.vehicle,
        summary.route,
        summary.total_energy_kwh,
        summary.final_soc,
    );
    Ok(ScenarioOutput {
        telemetry,
        derived,
        summary,
    })
}

/// Runs scenarios in parallel. One scenario failing does not abort the
/// others; each slot carries its own outcome.
pub fn run_batch<I>(scenarios: &[Scenario], invoker: &I) -> Vec<anyhow::Result<ScenarioOutput>>
where
    I: SimulationInvoker + Sync,
{
    scenarios
        .par_iter()
        .map(|scenario| run_scenario(scenario, invoker))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simdrive::RoadLoadSim;

    #[test]
    fn test_pipeline_runs_on_test_cycle() {
        let scenario = Scenario::new(
            Vehicle::mock_vehicle(),
            Cycle::test_cyc(),
            InitSocSpec::Fixed(0.8),
        );
        let out = run_scenario(&scenario, &RoadLoadSim::default()).unwrap();
        assert_eq!(out.telemetry.len(), scenario.cyc.len());
        assert_eq!(out.derived.dt_s[0], 0.0);
        assert!(out.summary.total_energy_kwh > 0.0);
        assert!(out.summary.final_soc < 0.8);
    }

    #[test]
    fn test_invalid_vehicle_fails_before_the_engine_runs() {
        let mut veh = Vehicle::mock_vehicle();
        veh.drag_coef = -1.0;
        let scenario = Scenario::new(veh, Cycle::test_cyc(), InitSocSpec::Fixed(0.8));
        let err = run_scenario(&scenario, &RoadLoadSim::default()).unwrap_err();
        assert!(err.to_string().contains("drag_coef"));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let good = Scenario::new(
            Vehicle::mock_vehicle(),
            Cycle::test_cyc(),
            InitSocSpec::Fixed(0.8),
        );
        let mut bad_veh = Vehicle::mock_vehicle();
        bad_veh.frontal_area_m2 = 0.0;
        let bad = Scenario::new(bad_veh, Cycle::test_cyc(), InitSocSpec::Fixed(0.8));
        let results = run_batch(&[good, bad], &RoadLoadSim::default());
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}

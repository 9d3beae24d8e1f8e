//! Command-line app for running a battery-electric vehicle over a drive
//! cycle and exporting the per-step dataset.

use anyhow::{bail, ensure, Context};
use bevsim_core::cycle::Cycle;
use bevsim_core::export::write_dataset;
use bevsim_core::scenario::{run_scenario, Scenario};
use bevsim_core::simdrive::{InitSocSpec, RoadLoadSim};
use bevsim_core::traits::SerdeAPI;
use bevsim_core::vehicle::Vehicle;
use clap::Parser;
use std::path::PathBuf;

const ROUTES: [&str; 4] = ["udds", "hwfet", "us06", "mixed"];

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct BevsimApi {
    /// Route to simulate: `udds`, `hwfet`, `us06`, or `mixed` (all three
    /// back to back)
    #[clap(long, short)]
    cycle: String,
    /// Vehicle config file (yaml or json); defaults to the built-in Class 8
    /// BEV when omitted
    #[clap(long)]
    veh_file: Option<PathBuf>,
    /// Initial battery state of charge; defaults to the vehicle's max SOC
    #[clap(long)]
    init_soc: Option<f64>,
    /// Solve for a charge-sustaining initial SOC instead of a fixed one
    #[clap(long)]
    charge_sustaining: bool,
    /// Output dataset path; defaults to `<route>_results.csv`
    #[clap(long, short)]
    output: Option<PathBuf>,
}

fn load_route(route: &str) -> anyhow::Result<Cycle> {
    if route == "mixed" {
        let legs = [
            Cycle::from_resource("udds")?,
            Cycle::from_resource("hwfet")?,
            Cycle::from_resource("us06")?,
        ];
        Ok(Cycle::concat(&legs)?)
    } else {
        Ok(Cycle::from_resource(route)?)
    }
}

pub fn main() -> anyhow::Result<()> {
    env_logger::init();
    let api = BevsimApi::parse();

    // reject bad argument combinations before touching any input
    let route = api.cycle.to_lowercase();
    if !ROUTES.contains(&route.as_str()) {
        bail!("unknown cycle {:?}; choose one of {ROUTES:?}", api.cycle);
    }
    ensure!(
        !(api.charge_sustaining && api.init_soc.is_some()),
        "--init-soc and --charge-sustaining are mutually exclusive"
    );

    let veh = match &api.veh_file {
        Some(path) => Vehicle::from_file(path)
            .with_context(|| format!("loading vehicle from {path:?}"))?,
        None => Vehicle::mock_vehicle(),
    };
    let init_soc = if api.charge_sustaining {
        InitSocSpec::ChargeSustaining
    } else {
        InitSocSpec::Fixed(api.init_soc.unwrap_or(veh.max_soc))
    };

    let cyc = load_route(&route)?;
    let scenario = Scenario::new(veh, cyc, init_soc);
    let out = run_scenario(&scenario, &RoadLoadSim::default())?;

    let output = api
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{route}_results.csv")));
    write_dataset(&out.telemetry, &out.derived, &output)
        .with_context(|| format!("writing dataset to {output:?}"))?;
    log::info!("wrote {} rows to {output:?}", out.telemetry.len());

    println!("{}", serde_json::to_string_pretty(&out.summary)?);
    Ok(())
}

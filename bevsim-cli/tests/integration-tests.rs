use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_udds_run_writes_dataset_and_prints_summary() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("udds.csv");
    Command::cargo_bin("bevsim-cli")
        .unwrap()
        .args(["--cycle", "udds", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"route\": \"udds\""))
        .stdout(predicate::str::contains("total_energy_kwh"));
    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(contents.starts_with("time_s,speed_mps,soc,step_energy_j,cumulative_energy_j"));
    assert!(contents.lines().count() > 100);
}

#[test]
fn test_mixed_route_concatenates_all_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("mixed.csv");
    Command::cargo_bin("bevsim-cli")
        .unwrap()
        .args(["--cycle", "mixed", "--init-soc", "0.8", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"route\": \"udds+hwfet+us06\""));
}

#[test]
fn test_unknown_cycle_fails_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.csv");
    Command::cargo_bin("bevsim-cli")
        .unwrap()
        .args(["--cycle", "nycc", "--output"])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown cycle"));
    assert!(!output.exists());
}

#[test]
fn test_init_soc_and_charge_sustaining_conflict() {
    Command::cargo_bin("bevsim-cli")
        .unwrap()
        .args(["--cycle", "udds", "--init-soc", "0.8", "--charge-sustaining"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mutually exclusive"));
}

#[test]
fn test_invalid_vehicle_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let veh_file = dir.path().join("bad.yaml");
    std::fs::write(&veh_file, "veh_name: broken\nveh_pt_type: BEV\n").unwrap();
    Command::cargo_bin("bevsim-cli")
        .unwrap()
        .args(["--cycle", "udds", "--veh-file"])
        .arg(&veh_file)
        .assert()
        .failure();
}

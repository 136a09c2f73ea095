//! Command-line behaviour of the `dem-builder` binary.

use std::process::Command;

fn dem_builder() -> Command {
    Command::new(env!("CARGO_BIN_EXE_dem-builder"))
}

#[test]
fn test_unknown_dem_source_exits_with_usage() {
    let output = dem_builder().args(["-d", "bedmap"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(r#"Unrecognized DEM source bedmap, should be either "cresis" or "morlighem""#));
    assert!(stderr.contains("Usage:"), "{}", stderr);
}

#[test]
fn test_run_with_nothing_configured_succeeds() {
    let dir = test_utils::temp_test_dir_with_prefix("dem_builder_");
    let config = dir.path().join("empty.yaml");
    std::fs::write(
        &config,
        "velocity: {}\nbed: []\nremote_surface: []\nlocal_surface: {}\npostprocess: []\n",
    )
    .unwrap();

    let status = dem_builder()
        .args(["--dem", "cresis", "--config"])
        .arg(&config)
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .arg("--sif-dir")
        .arg(dir.path().join("elmer"))
        .status()
        .unwrap();

    assert!(status.success());
}

#[test]
fn test_failed_dataset_exits_non_zero() {
    let dir = test_utils::temp_test_dir_with_prefix("dem_builder_");
    let config = dir.path().join("missing.yaml");
    std::fs::write(
        &config,
        "velocity:\n  helheim: does_not_exist\nbed: []\nremote_surface: []\nlocal_surface: {}\npostprocess: []\n",
    )
    .unwrap();

    let output = dem_builder()
        .args(["--dem", "morlighem", "--config"])
        .arg(&config)
        .arg("--data-dir")
        .arg(dir.path().join("data"))
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(!dir.path().join("out/helheim/UDEM.xy").exists());
}

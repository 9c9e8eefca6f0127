//! Integration tests for the diffpool CLI.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn diffpool() -> Command {
    Command::new(env!("CARGO_BIN_EXE_diffpool"))
}

/// Write a solid-color RGB PNG.
fn solid_png(dir: &Path, name: &str, size: u32, value: u8) -> PathBuf {
    let path = dir.join(name);
    let data = vec![value; (size * size * 3) as usize];
    image::save_buffer(&path, &data, size, size, image::ColorType::Rgb8)
        .expect("Failed to write PNG");
    path
}

fn run(args: &[&Path], extra: &[&str]) -> Output {
    diffpool()
        .args(args)
        .args(extra)
        .output()
        .expect("Failed to run diffpool")
}

#[test]
fn test_identical_images_report_zero_error() {
    let dir = tempfile::tempdir().unwrap();
    let a = solid_png(dir.path(), "a.png", 16, 128);
    let b = solid_png(dir.path(), "b.png", 16, 128);

    let output = run(&[Path::new("compare"), &a, &b], &[]);
    assert!(output.status.success(), "Exit code should be 0");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Assumed tone mapper: ACES"));
    assert!(stdout.contains("Pooled error between reference image <"));
    for label in ["Mean", "Weighted median", "1st weighted quartile", "3rd weighted quartile", "Min", "Max"] {
        assert!(
            stdout.contains(&format!("     {label}: 0.000000\n")),
            "{label} should be zero:\n{stdout}"
        );
    }
}

#[test]
fn test_black_against_white_is_maximal() {
    let dir = tempfile::tempdir().unwrap();
    let black = solid_png(dir.path(), "black.png", 8, 0);
    let white = solid_png(dir.path(), "white.png", 8, 255);

    let output = run(&[Path::new("compare"), &black, &white], &[]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("     Mean: 1.000000\n"));
    assert!(stdout.contains("     Weighted median: 1.000000\n"));
    assert!(stdout.contains("     Min: 1.000000\n"));
}

#[test]
fn test_dimension_mismatch_fails_without_stats() {
    let dir = tempfile::tempdir().unwrap();
    let small = solid_png(dir.path(), "small.png", 4, 100);
    let large = solid_png(dir.path(), "large.png", 8, 100);

    let output = run(&[Path::new("compare"), &small, &large], &[]);
    assert!(!output.status.success(), "Mismatched sizes should fail");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Mean:"), "No statistics expected: {stdout}");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Dimension mismatch"), "stderr: {stderr}");
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let a = solid_png(dir.path(), "a.png", 4, 0);
    let missing = dir.path().join("missing.png");

    let output = run(&[Path::new("compare"), &a, &missing], &[]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.png"), "stderr: {stderr}");
}

#[test]
fn test_json_and_csv_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let a = solid_png(dir.path(), "a.png", 8, 10);
    let b = solid_png(dir.path(), "b.png", 8, 200);
    let json = dir.path().join("report.json");
    let csv = dir.path().join("results.csv");

    let output = diffpool()
        .arg("compare")
        .args([&a, &b])
        .arg("--json")
        .arg(&json)
        .arg("--csv")
        .arg(&csv)
        .output()
        .expect("Failed to run diffpool");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(value["width"], 8);
    assert_eq!(value["hdr"], false);
    assert_eq!(value["evaluator"], "color-distance");
    let mean = value["summary"]["mean"].as_f64().unwrap();
    assert!(mean > 0.0 && mean <= 1.0);

    let rows = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(rows.lines().count(), 2);
}

#[test]
fn test_histogram_command() {
    let dir = tempfile::tempdir().unwrap();
    let a = solid_png(dir.path(), "a.png", 8, 50);
    let b = solid_png(dir.path(), "b.png", 8, 50);

    let output = run(&[Path::new("histogram"), &a, &b], &["--bins", "10"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "bin,lower,upper,count,weighted_mass");
    assert_eq!(lines.len(), 11);
    assert!(lines[1].starts_with("0,0.000000,0.100000,64,"));
}

#[test]
fn test_bins_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let a = solid_png(dir.path(), "a.png", 4, 50);
    let b = solid_png(dir.path(), "b.png", 4, 60);
    let out = dir.path().join("hist.csv");

    let output = diffpool()
        .env("DIFFPOOL_BINS", "20")
        .arg("histogram")
        .args([&a, &b])
        .arg("-o")
        .arg(&out)
        .output()
        .expect("Failed to run diffpool");
    assert!(output.status.success());

    let content = std::fs::read_to_string(&out).unwrap();
    assert_eq!(content.lines().count(), 21);
}

#[test]
fn test_zero_bins_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let a = solid_png(dir.path(), "a.png", 4, 50);

    let output = run(&[Path::new("compare"), &a, &a], &["--bins", "0"]);
    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Mean:"));
}

#[test]
fn test_unknown_tonemapper_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let a = solid_png(dir.path(), "a.png", 4, 50);

    let output = run(&[Path::new("compare"), &a, &a], &["--tonemapper", "filmic"]);
    assert!(!output.status.success());
}

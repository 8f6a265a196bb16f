//! Smoke tests for the markcheck CLI

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command for the markcheck binary
fn markcheck() -> Command {
    Command::cargo_bin("markcheck").expect("markcheck binary should exist")
}

fn write_config(dir: &Path, workbook: &Path) -> std::path::PathBuf {
    let path = dir.join("markcheck.yaml");
    fs::write(
        &path,
        format!(
            "environments:\n  staging: https://staging.shop.example\n  prod: https://shop.example/\nworkbook:\n  path: {}\n",
            workbook.display()
        ),
    )
    .unwrap();
    path
}

fn write_workbook(path: &Path) {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).unwrap();
    for (i, h) in ["Product Name", "Color", "Sizes", "Regular Price", "Markdown Price", "Class", "Markdown Product ID"]
        .iter()
        .enumerate()
    {
        sheet.get_cell_mut((i as u32 + 1, 2)).set_value(*h);
    }
    sheet.get_cell_mut("A3").set_value("Fast and Free Short");
    sheet.get_cell_mut("G3").set_value("prod1");
    sheet.get_cell_mut("N3").set_value("Product not available in the catalog.");
    umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    markcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.1"));
}

#[test]
fn test_help_flag() {
    markcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("reset"));
}

#[test]
fn test_no_args_fails() {
    markcheck().assert().failure();
}

#[test]
fn test_run_help_mentions_rows() {
    markcheck()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--rows"))
        .stdout(predicate::str::contains("--env"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_missing_config_is_reported() {
    let dir = TempDir::new().unwrap();
    markcheck()
        .args(["reset", "--config"])
        .arg(dir.path().join("absent.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_envs_lists_environments() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &dir.path().join("data.xlsx"));
    markcheck()
        .args(["envs", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("staging\thttps://staging.shop.example/"))
        .stdout(predicate::str::contains("prod\thttps://shop.example/"));
}

#[test]
fn test_run_rejects_unknown_environment() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &dir.path().join("data.xlsx"));
    markcheck()
        .args(["run", "--env", "qa", "--config"])
        .arg(&config)
        .env_remove("MARKCHECK_USERNAME")
        .env_remove("MARKCHECK_PASSWORD")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown environment"));
}

#[test]
fn test_run_rejects_bad_row_range() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &dir.path().join("data.xlsx"));
    markcheck()
        .args(["run", "--env", "staging", "--rows", "5-2", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("row range"));
}

// ============================================================================
// Workbook
// ============================================================================

#[test]
fn test_reset_clears_notes() {
    let dir = TempDir::new().unwrap();
    let workbook = dir.path().join("data.xlsx");
    write_workbook(&workbook);
    let config = write_config(dir.path(), &workbook);

    markcheck()
        .args(["reset", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared results of 1 rows"));

    let book = umya_spreadsheet::reader::xlsx::read(&workbook).unwrap();
    let sheet = book.get_sheet(&0).unwrap();
    assert!(sheet.get_value("N3").is_empty());
    assert_eq!(sheet.get_value("A3"), "Fast and Free Short");
}

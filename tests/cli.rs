use assert_cmd::prelude::*;
use predicates::str::contains;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn headless_run_loads_components_and_saves_settings() {
    let dir = tempdir().expect("temp dir");
    let settings = dir.path().join("config").join("settings.toml");

    let mut cmd = Command::cargo_bin("cubica").expect("binary exists");
    cmd.arg("--headless")
        .arg("--frames")
        .arg("3")
        .arg("--settings")
        .arg(&settings);
    cmd.assert()
        .success()
        .stdout(contains("component(s)"))
        .stdout(contains("Ran 3 frame(s)"))
        .stdout(contains(" - DebuggingBag"))
        .stdout(contains(" - ThreadPool"));

    let saved = fs::read_to_string(&settings).expect("settings written");
    assert!(saved.contains("music_volume = 70"));
}

#[test]
fn existing_settings_are_kept() {
    let dir = tempdir().expect("temp dir");
    let settings = dir.path().join("settings.toml");
    fs::write(&settings, "fullscreen = true\nmusic_volume = 25\n").expect("seed settings");

    let mut cmd = Command::cargo_bin("cubica").expect("binary exists");
    cmd.arg("--headless")
        .arg("--frames")
        .arg("1")
        .arg("--settings")
        .arg(&settings);
    cmd.assert().success().stdout(contains("Ran 1 frame(s)"));

    let saved = fs::read_to_string(&settings).expect("settings written");
    assert!(saved.contains("fullscreen = true"));
    assert!(saved.contains("music_volume = 25"));
}

#[test]
fn preview_needs_six_camera_coordinates() {
    let dir = tempdir().expect("temp dir");
    let mut cmd = Command::cargo_bin("cubica").expect("binary exists");
    cmd.arg("scene.xml")
        .arg("1")
        .arg("2")
        .arg("--headless")
        .arg("--settings")
        .arg(dir.path().join("settings.toml"));
    cmd.assert()
        .failure()
        .stderr(contains("six camera coordinates"));
}

#[test]
fn preview_run_leaves_saved_settings_alone() {
    let dir = tempdir().expect("temp dir");
    let settings = dir.path().join("settings.toml");
    fs::write(&settings, "fullscreen = true\n").expect("seed settings");

    let mut cmd = Command::cargo_bin("cubica").expect("binary exists");
    cmd.args(["data/scenes/level.xml", "0", "5", "-10", "0", "0", "0"])
        .arg("--headless")
        .arg("--frames")
        .arg("2")
        .arg("--settings")
        .arg(&settings);
    cmd.assert().success().stdout(contains("Ran 2 frame(s)"));

    let saved = fs::read_to_string(&settings).expect("settings written");
    assert!(saved.contains("fullscreen = true"));
}

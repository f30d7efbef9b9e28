//! Command-line surface tests

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cuemix() -> Command {
    let mut cmd = Command::cargo_bin("cuemix").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("CUEMIX_LOG_LEVEL")
        .env_remove("CUEMIX_LOG_FORMAT");
    cmd
}

#[test]
fn test_help_lists_commands() {
    cuemix()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("align"));
}

#[test]
fn test_render_requires_a_cue_source() {
    let dir = TempDir::new().unwrap();
    cuemix()
        .current_dir(dir.path())
        .args(["render", "--input-clips", "clips", "--input-video", "v.mp4"])
        .args(["--output-dir", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--cues"));
}

#[test]
fn test_audio_without_transcript_is_rejected() {
    let dir = TempDir::new().unwrap();
    cuemix()
        .current_dir(dir.path())
        .args(["plan", "--input-clips", "clips", "--input-video", "v.mp4"])
        .args(["--input-audio", "voice.mp3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input-txt"));
}

#[test]
fn test_workers_out_of_range_is_rejected() {
    let dir = TempDir::new().unwrap();
    cuemix()
        .current_dir(dir.path())
        .args(["render", "--input-clips", "clips", "--input-video", "v.mp4"])
        .args(["--cues", "c.srt", "--output-dir", "out", "--workers", "0"])
        .assert()
        .failure();
}

#[test]
fn test_missing_base_video_fails_before_output() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("clips")).unwrap();
    fs::write(
        dir.path().join("c.srt"),
        "1\n00:00:00,000 --> 00:00:02,000\nhello\n",
    )
    .unwrap();

    cuemix()
        .current_dir(dir.path())
        .args(["render", "--input-clips", "clips", "--input-video", "missing.mp4"])
        .args(["--cues", "c.srt", "--output-dir", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input video not found"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_missing_asset_root_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("v.mp4"), b"not really a video").unwrap();
    fs::write(
        dir.path().join("c.srt"),
        "1\n00:00:00,000 --> 00:00:02,000\nhello\n",
    )
    .unwrap();

    cuemix()
        .current_dir(dir.path())
        .args(["plan", "--input-clips", "nowhere", "--input-video", "v.mp4"])
        .args(["--cues", "c.srt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere"));
}

#[test]
fn test_invalid_aspect_override_is_rejected() {
    let dir = TempDir::new().unwrap();
    cuemix()
        .current_dir(dir.path())
        .args(["plan", "--input-clips", "clips", "--input-video", "v.mp4"])
        .args(["--cues", "c.srt", "--aspect", "wide"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --aspect"));
}

#[test]
fn test_bad_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cuemix.toml"), "[render]\nworkers = \"many\"\n").unwrap();

    cuemix()
        .current_dir(dir.path())
        .args(["align", "--input-audio", "a.mp3", "--input-txt", "t.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

use std::fs;
use std::process::Command;

use sha2::{Digest, Sha256};

fn digest_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[test]
fn recovers_hex_input() {
    let exe = env!("CARGO_BIN_EXE_bitforce");
    let output = Command::new(exe)
        .args([
            "--input",
            "00000000",
            "--expect",
            &digest_hex(&[0, 0, 0, 1]),
            "--max",
            "3",
            "--workers",
            "2",
        ])
        .output()
        .expect("run failed");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "00000001");
}

#[test]
fn recovers_file_input_as_json() {
    let exe = env!("CARGO_BIN_EXE_bitforce");
    let dir = tempfile::tempdir().unwrap();
    let intact = b"PCR0 measurement";
    let mut corrupted = intact.to_vec();
    corrupted[3] ^= 0x40;
    corrupted[9] ^= 0x01;
    let input = dir.path().join("observed.bin");
    fs::write(&input, &corrupted).unwrap();

    let output = Command::new(exe)
        .args([
            "--input",
            input.to_str().unwrap(),
            "--expect",
            &digest_hex(intact),
            "--min",
            "1",
            "--max",
            "2",
            "--unit",
            "64",
            "--json",
        ])
        .output()
        .expect("run failed");
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["found"], true);
    assert_eq!(report["distance"], 2);
    assert_eq!(report["positions"], serde_json::json!([30, 72]));
    assert_eq!(report["buffer"], hex::encode(intact));
}

#[test]
fn no_match_exits_with_two() {
    let exe = env!("CARGO_BIN_EXE_bitforce");
    let output = Command::new(exe)
        .args(["--input", "ff", "--expect", &digest_hex(b"unrelated"), "--max", "2"])
        .output()
        .expect("run failed");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No match within 0..=2"));
}

#[test]
fn bad_distance_is_explained() {
    let exe = env!("CARGO_BIN_EXE_bitforce");
    let output = Command::new(exe)
        .args(["--input", "ff", "--expect", &digest_hex(b"x"), "--max", "9"])
        .output()
        .expect("run failed");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Lower --max"));
}

#[test]
fn malformed_digest_is_rejected() {
    let exe = env!("CARGO_BIN_EXE_bitforce");
    let output = Command::new(exe)
        .args(["--input", "00", "--expect", "abcd"])
        .output()
        .expect("run failed");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SHA-256 hex digest"));
}

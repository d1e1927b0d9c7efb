use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use boottools::{TrapTableGenerator, DATA_MAX, STAGE2_BASE_ENV, TEXT_MAX};

const BOOT2_VERIFY: &str = env!("CARGO_BIN_EXE_boot2-verify");
const MKVECT: &str = env!("CARGO_BIN_EXE_mkvect");

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "boottools-cli-{}-{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_stage2(dir: &Path, text: u64, rest: u64) {
    for (section, size) in [(".text", text), (".data", rest), (".bss", rest), (".rodata", rest)] {
        let path = dir.join(format!("boot-stage2{}", section));
        fs::write(path, vec![0u8; size as usize]).unwrap();
    }
}

/// `boot2-verify` run from `dir` with no base override in the environment.
fn boot2_verify(dir: &Path) -> Command {
    let mut cmd = Command::new(BOOT2_VERIFY);
    cmd.current_dir(dir)
        .env_remove(STAGE2_BASE_ENV)
        .env("NO_COLOR", "1")
        .env("CLICOLOR", "0");
    cmd
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| l.to_string())
        .collect()
}

#[test]
fn test_passing_stage2_exits_zero() {
    let dir = scratch_dir("pass");
    write_stage2(&dir, TEXT_MAX, DATA_MAX);

    let output = boot2_verify(&dir).output().unwrap();
    let lines = stdout_lines(&output);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(lines.first().unwrap(), "*** Boot stage 2 verification ***");
    assert_eq!(lines.last().unwrap(), "Boot stage 2 has been verified.");
    assert!(!lines.iter().any(|l| l.contains("FATAL ERROR")));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_file_exits_one() {
    let dir = scratch_dir("missing");
    write_stage2(&dir, 100, 100);
    fs::remove_file(dir.join("boot-stage2.bss")).unwrap();

    let output = boot2_verify(&dir).output().unwrap();
    let lines = stdout_lines(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(lines[1].contains("FATAL ERROR: Boot stage 2"));
    assert!(lines[2].starts_with("Unable to stat .bss file (./boot-stage2.bss)"));
    assert!(!lines.iter().any(|l| l.contains("has been verified")));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_oversized_section_exits_one() {
    let dir = scratch_dir("oversized");
    write_stage2(&dir, TEXT_MAX + 1, 0);

    let output = boot2_verify(&dir).output().unwrap();
    let lines = stdout_lines(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(lines[1].contains("FATAL ERROR: Boot stage 2"));
    assert_eq!(lines[2], ".text section too large: 65537 bytes (limit 65536)");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_base_env_points_elsewhere() {
    let run_dir = scratch_dir("env-cwd");
    let image_dir = scratch_dir("env-image");
    write_stage2(&image_dir, 10, 10);

    // nothing in the working directory, so only the env override can pass
    let output = boot2_verify(&run_dir)
        .env(STAGE2_BASE_ENV, image_dir.join("boot-stage2"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_lines(&output).last().unwrap(), "Boot stage 2 has been verified.");

    // --base wins over the environment
    let output = boot2_verify(&run_dir)
        .env(STAGE2_BASE_ENV, image_dir.join("boot-stage2"))
        .arg("--base")
        .arg(run_dir.join("boot-stage2"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    fs::remove_dir_all(&run_dir).unwrap();
    fs::remove_dir_all(&image_dir).unwrap();
}

#[test]
fn test_json_output() {
    let dir = scratch_dir("json");
    write_stage2(&dir, 1000, 10);

    let output = boot2_verify(&dir).args(["--format", "json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["sections"][0]["section"], ".text");
    assert_eq!(report["sections"][0]["size"], 1000);

    fs::remove_file(dir.join("boot-stage2.rodata")).unwrap();
    let output = boot2_verify(&dir).args(["--format", "json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let failure: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(failure["verified"], false);
    assert_eq!(failure["section"], ".rodata");
    assert!(failure["error"]
        .as_str()
        .unwrap()
        .starts_with("Unable to stat .rodata file"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_mkvect_writes_the_artifact() {
    let dir = scratch_dir("mkvect");
    let path = dir.join("vectors.s");

    let output = Command::new(MKVECT).arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        TrapTableGenerator::default().render()
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_mkvect_prints_to_stdout() {
    let output = Command::new(MKVECT).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        TrapTableGenerator::default().render()
    );
}

#[test]
fn test_mkvect_write_failure_exits_one() {
    let path = scratch_dir("mkvect-fail").join("no-such-dir").join("vectors.s");

    let output = Command::new(MKVECT).arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to write"));
}

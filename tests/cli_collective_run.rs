use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Job file in the system temp dir, removed on drop.
struct JobFile(PathBuf);

impl JobFile {
    fn new(tag: &str, json: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "collnet-rs-{tag}-{}.json",
            std::process::id()
        ));
        fs::write(&path, json).expect("write job file");
        Self(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for JobFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

fn run_with_job(job: &Path, extra: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_collective_run"))
        .arg("--job")
        .arg(job)
        .args(extra)
        .output()
        .expect("run collective_run")
}

fn rank_lines(stdout: &str) -> Vec<&str> {
    stdout
        .lines()
        .filter(|line| line.starts_with("rank "))
        .collect()
}

#[test]
fn collective_run_inline_prefix_sum() {
    let output = Command::new(env!("CARGO_BIN_EXE_collective_run"))
        .args(["--collective", "prefix_sum", "--values", "1,2,3,4,5"])
        .output()
        .expect("run collective_run");
    assert!(
        output.status.success(),
        "collective_run failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines = rank_lines(&stdout);
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("rank 0 value=1 "));
    assert!(lines[4].starts_with("rank 4 value=15 "));
    assert!(stdout.contains("max_rounds=3"));
}

#[test]
fn collective_run_exclusive_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_collective_run"))
        .args([
            "--collective",
            "prefix_sum",
            "--exclusive",
            "--values",
            "1,2,3,4,5",
        ])
        .output()
        .expect("run collective_run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let values: Vec<&str> = rank_lines(&stdout)
        .iter()
        .filter_map(|line| line.split_whitespace().nth(2))
        .collect();
    assert_eq!(
        values,
        vec!["value=0", "value=1", "value=3", "value=6", "value=10"]
    );
}

#[test]
fn collective_run_job_file_json_report() {
    let job = JobFile::new(
        "job-json",
        r#"
{
    "schema_version": 1,
    "num_hosts": 4,
    "collective": "all_reduce_hypercube",
    "op": "concat",
    "values": ["a", "b", "c", "d"]
}
        "#,
    );

    let output = run_with_job(job.path(), &["--json"]);
    assert!(
        output.status.success(),
        "collective_run failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: Value = serde_json::from_slice(&output.stdout).expect("parse report");
    assert_eq!(v["collective"], "all_reduce_hypercube");
    assert_eq!(v["max_rounds"], 2);
    let hosts = v["hosts"].as_array().expect("hosts array");
    assert_eq!(hosts.len(), 4);
    for host in hosts {
        assert_eq!(host["value"], "abcd");
        assert_eq!(host["stats"]["sent_msgs"], 2);
        assert_eq!(host["stats"]["received_msgs"], 2);
    }
}

#[test]
fn collective_run_reduce_hides_non_root_values() {
    let output = Command::new(env!("CARGO_BIN_EXE_collective_run"))
        .args([
            "--collective",
            "reduce",
            "--root",
            "1",
            "--op",
            "concat",
            "--values",
            "x,y,z",
        ])
        .output()
        .expect("run collective_run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines = rank_lines(&stdout);
    assert!(lines[0].starts_with("rank 0 value=- "));
    assert!(lines[1].starts_with("rank 1 value=\"xyz\" "));
    assert!(lines[2].starts_with("rank 2 value=- "));
}

#[test]
fn collective_run_rejects_bad_jobs() {
    let output = Command::new(env!("CARGO_BIN_EXE_collective_run"))
        .args(["--collective", "all_reduce_hypercube", "--values", "1,2,3"])
        .output()
        .expect("run collective_run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("power-of-two"), "stderr={stderr}");

    let output = Command::new(env!("CARGO_BIN_EXE_collective_run"))
        .args(["--op", "concat", "--values", "1,2"])
        .output()
        .expect("run collective_run");
    assert_eq!(output.status.code(), Some(2));

    let output = Command::new(env!("CARGO_BIN_EXE_collective_run"))
        .output()
        .expect("run collective_run");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn collective_run_initial_offsets_prefix() {
    let output = Command::new(env!("CARGO_BIN_EXE_collective_run"))
        .args([
            "--collective",
            "prefix_sum",
            "--exclusive",
            "--initial",
            "100",
            "--values",
            "1,2,3",
        ])
        .output()
        .expect("run collective_run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let values: Vec<&str> = rank_lines(&stdout)
        .iter()
        .filter_map(|line| line.split_whitespace().nth(2))
        .collect();
    assert_eq!(values, vec!["value=100", "value=101", "value=103"]);
}

#[test]
fn collective_run_job_file_rejects_initial_on_all_reduce() {
    let job = JobFile::new(
        "bad-initial",
        r#"{"num_hosts": 2, "collective": "all_reduce", "values": [1, 2], "initial": 5}"#,
    );
    let output = run_with_job(job.path(), &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("initial"), "stderr={stderr}");
}

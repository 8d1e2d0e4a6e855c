// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

use analysis_backends::builtins::{FailOn, Square};
use analysis_backends::worker::protocol::{
    decode_line, encode_line, encode_tasks, FailureKind, WorkerRequest, WorkerResponse,
};

const BIN: &str = env!("CARGO_BIN_EXE_analysis-backends");

fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn run(config: &tempfile::NamedTempFile, args: &[&str]) -> std::process::Output {
    Command::new(BIN)
        .arg("run")
        .arg(config.path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_worker_serves_protocol() {
    let mut child = Command::new(BIN)
        .arg("worker")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let square = encode_tasks(&Square, &[12]).unwrap().remove(0);
    let mut failing = encode_tasks(&FailOn { value: 5 }, &[5]).unwrap().remove(0);
    failing.index = 1;
    let mut missing = square.clone();
    missing.index = 2;
    missing.function = "missing".to_string();

    let mut responses = Vec::new();
    for task in [square, failing, missing] {
        stdin
            .write_all(encode_line(&WorkerRequest::Call(task)).unwrap().as_bytes())
            .unwrap();
        let mut line = String::new();
        stdout.read_line(&mut line).unwrap();
        responses.push(decode_line::<WorkerResponse>(&line).unwrap());
    }
    stdin
        .write_all(encode_line(&WorkerRequest::Shutdown).unwrap().as_bytes())
        .unwrap();

    match &responses[0] {
        WorkerResponse::Completed { index: 0, output } => {
            assert_eq!(output.decode::<i64>().unwrap(), 144)
        }
        other => panic!("expected completed response, got {:?}", other),
    }
    assert_eq!(
        responses[1],
        WorkerResponse::Failed {
            index: 1,
            kind: FailureKind::Execution,
            message: "invalid value 5".to_string(),
        }
    );
    assert!(matches!(
        responses[2],
        WorkerResponse::Failed { index: 2, kind: FailureKind::Transfer, .. }
    ));
    assert!(child.wait().unwrap().success());
}

#[test]
fn test_run_square_with_yaml_config() {
    let config = write_config(
        ".yaml",
        &format!(
            "backend: multiprocessing\nn_workers: 2\nworker:\n  program: {}\n  args: [worker]\n",
            BIN
        ),
    );

    let output = run(&config, &["square", "1", "2", "3"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Backend: process_pool"));
    assert!(stdout.contains("3 -> 9"));
}

#[test]
fn test_run_sum_of_squares_with_toml_config() {
    let config = write_config(".toml", "backend = \"serial\"\nn_workers = 1\n");

    let output = run(&config, &["sum-of-squares", "10"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("total: 285"));
}

#[test]
fn test_run_rejects_invalid_worker_count() {
    let config = write_config(".yaml", "backend: serial\nn_workers: 0\n");

    let output = run(&config, &["square", "1"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("n_workers should be positive integer, got n_workers=0"));
}

#[test]
fn test_usage_without_arguments() {
    let output = Command::new(BIN).output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage:"));
}

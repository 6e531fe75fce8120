//! Tests for the pipeline runner.

use super::*;
use crate::options::{InputSource, OutputSink};
use crate::resolve::{resolve_program, search_path_from_env};
use crate::test_support::wait_until_reaped;
use serial_test::serial;
use std::fs::{self, File};
use tempfile::TempDir;

fn stage(program: &str, args: &[&str]) -> RunningCommand {
    let path = resolve_program(program, &search_path_from_env()).unwrap();
    RunningCommand::new(
        path,
        program,
        args.iter().map(|a| a.to_string()).collect(),
        ExecOptions::new(),
        Termination::default(),
    )
}

fn pipeline(stages: Vec<RunningCommand>) -> RunningPipeline {
    let mut pipeline = RunningPipeline::default();
    for stage in stages {
        pipeline.register(stage).unwrap();
    }
    pipeline
}

#[test]
fn test_input_flows_through_every_stage() {
    let mut p = pipeline(vec![stage("cat", &[]), stage("wc", &["-c"])]);
    p.run(ExecOptions::new().with_input_data("hello")).unwrap();

    assert_eq!(p.stdout_lossy().trim(), "5");
    assert_eq!(p.exit_code(), Some(0));
    assert!(p.ok());
    assert_eq!(p.state(), RunState::Exited);
}

#[test]
fn test_three_stages() {
    let mut p = pipeline(vec![
        stage("echo", &["hello"]),
        stage("cat", &[]),
        stage("cat", &[]),
    ]);
    p.run(ExecOptions::new()).unwrap();
    assert_eq!(p.stdout(), b"hello\n");
}

#[test]
fn test_exit_code_is_last_stage() {
    let mut p = pipeline(vec![
        stage("sh", &["-c", "exit 2"]),
        stage("cat", &[]),
        stage("cat", &[]),
    ]);
    p.run(ExecOptions::new()).unwrap();

    assert_eq!(p.exit_code(), Some(0));
    assert_eq!(p.stage_exit_codes(), vec![Some(2), Some(0), Some(0)]);
    assert_eq!(p.stages()[0].exit_code(), Some(2));
}

#[test]
fn test_failing_last_stage_fails_pipeline() {
    let mut p = pipeline(vec![stage("echo", &["x"]), stage("sh", &["-c", "cat; exit 3"])]);
    let err = p.run(ExecOptions::new()).unwrap_err();

    match err {
        ProcshError::CommandReturnFailure { exit_code, message } => {
            assert_eq!(exit_code, Some(3));
            assert!(message.contains(" | "));
            assert!(message.contains("STDOUT:\nx\n"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_accepted_codes_apply_to_last_stage() {
    let mut p = pipeline(vec![stage("true", &[]), stage("sh", &["-c", "exit 1"])]);
    p.run(ExecOptions::new().with_ok_codes([0, 1])).unwrap();
    assert_eq!(p.exit_code(), Some(1));
}

#[test]
fn test_stdout_to_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.txt");

    let mut p = pipeline(vec![stage("echo", &["hello"]), stage("cat", &[])]);
    p.run(ExecOptions::new().with_output(OutputSink::path(&path)))
        .unwrap();

    assert!(p.stdout().is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
}

#[test]
fn test_descriptors_at_pipeline_boundaries() {
    let dir = TempDir::new().unwrap();
    let in_path = dir.path().join("in.txt");
    let out_path = dir.path().join("out.txt");
    let err_path = dir.path().join("err.txt");
    fs::write(&in_path, "hello").unwrap();

    let mut p = pipeline(vec![
        stage("sh", &["-c", "cat; echo first >&2"]),
        stage("wc", &["-c"]),
    ]);
    p.run(
        ExecOptions::new()
            .with_input(InputSource::descriptor(File::open(&in_path).unwrap()))
            .with_output(OutputSink::descriptor(File::create(&out_path).unwrap()))
            .with_error(OutputSink::descriptor(File::create(&err_path).unwrap())),
    )
    .unwrap();

    assert!(p.stdout().is_empty());
    assert!(p.stderr().is_empty());
    assert_eq!(fs::read_to_string(&out_path).unwrap().trim(), "5");
    assert_eq!(fs::read_to_string(&err_path).unwrap(), "first\n");
}

#[test]
fn test_err_to_out_with_descriptor_sink() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.txt");

    let mut p = pipeline(vec![
        stage("echo", &["piped"]),
        stage("sh", &["-c", "cat; echo last >&2"]),
    ]);
    p.run(
        ExecOptions::new()
            .with_output(OutputSink::descriptor(File::create(&path).unwrap()))
            .with_err_to_out(true),
    )
    .unwrap();

    assert!(p.stdout().is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "piped\nlast\n");
}

#[test]
fn test_stderr_is_shared_by_all_stages() {
    let mut p = pipeline(vec![
        stage("sh", &["-c", "echo first >&2"]),
        stage("sh", &["-c", "cat >/dev/null; echo second >&2"]),
    ]);
    p.run(ExecOptions::new()).unwrap();

    let stderr = p.stderr_lossy();
    assert!(stderr.contains("first\n"));
    assert!(stderr.contains("second\n"));
}

#[test]
fn test_err_to_out_routes_each_stage_stderr_downstream() {
    let mut p = pipeline(vec![
        stage("sh", &["-c", "echo err >&2"]),
        stage("cat", &[]),
    ]);
    p.run(ExecOptions::new().with_err_to_out(true)).unwrap();

    assert_eq!(p.stdout(), b"err\n");
    assert!(p.stderr().is_empty());
}

#[test]
fn test_pipeline_env_overrides_stages() {
    let mut p = pipeline(vec![stage("env", &[]), stage("cat", &[])]);
    p.run(ExecOptions::new().with_env([("PROCSH_PIPE", "1")]))
        .unwrap();
    assert_eq!(p.stdout_lossy(), "PROCSH_PIPE=1\n");
}

#[test]
fn test_pipeline_cwd_overrides_stage_cwd() {
    let dir = TempDir::new().unwrap();
    let path = resolve_program("pwd", &search_path_from_env()).unwrap();
    let pwd = RunningCommand::new(
        path,
        "pwd",
        Vec::new(),
        ExecOptions::new().with_cwd(dir.path()),
        Termination::default(),
    );

    let mut p = pipeline(vec![pwd, stage("cat", &[])]);
    p.run(ExecOptions::new().with_cwd("/")).unwrap();
    assert_eq!(p.stdout_lossy(), "/\n");
}

#[test]
fn test_stage_cwd_applies_without_pipeline_cwd() {
    let path = resolve_program("pwd", &search_path_from_env()).unwrap();
    let pwd = RunningCommand::new(
        path,
        "pwd",
        Vec::new(),
        ExecOptions::new().with_cwd("/"),
        Termination::default(),
    );

    let mut p = pipeline(vec![pwd]);
    p.run(ExecOptions::new()).unwrap();
    assert_eq!(p.stdout_lossy(), "/\n");
}

#[test]
fn test_spawn_failure_unwinds_started_stages() {
    let dir = TempDir::new().unwrap();
    let path = resolve_program("cat", &search_path_from_env()).unwrap();
    let broken = RunningCommand::new(
        path,
        "cat",
        Vec::new(),
        ExecOptions::new().with_cwd(dir.path().join("missing")),
        Termination::default(),
    );

    let started = Instant::now();
    let mut p = pipeline(vec![stage("sleep", &["5"]), broken]);
    let err = p.run(ExecOptions::new()).unwrap_err();

    assert!(matches!(err, ProcshError::Io(_)));
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(p.stages()[0].state(), RunState::Exited);
    assert_eq!(p.stages()[0].exit_code(), None);
    assert!(p.stages()[0].finished_at().is_some());
    assert_eq!(p.stages()[1].state(), RunState::Unspawned);
}

#[test]
fn test_empty_pipeline_is_command_not_found() {
    let mut p = RunningPipeline::default();
    let err = p.run(ExecOptions::new()).unwrap_err();
    assert!(matches!(err, ProcshError::CommandNotFound(ref msg) if msg == "no commands"));
}

#[test]
fn test_argument_style_options_are_rejected() {
    let mut p = pipeline(vec![stage("true", &[])]);
    let err = p.run(ExecOptions::new().with_long_prefix("-")).unwrap_err();
    assert!(matches!(err, ProcshError::InvalidArgument(_)));
    assert_eq!(p.state(), RunState::Unspawned);
}

#[test]
fn test_register_after_run_is_rejected() {
    let mut p = pipeline(vec![stage("true", &[])]);
    p.run(ExecOptions::new()).unwrap();

    let err = p.register(stage("true", &[])).unwrap_err();
    assert!(matches!(err, ProcshError::InvalidArgument(_)));
    assert!(p.run(ExecOptions::new()).is_err());
}

#[test]
fn test_display_joins_stages() {
    let p = pipeline(vec![stage("echo", &["a"]), stage("cat", &[])]);
    let display = p.to_string();
    assert!(display.contains("echo a | "));
    assert!(display.ends_with("cat"));
}

#[test]
fn test_background_then_wait() {
    let mut p = pipeline(vec![stage("echo", &["bg"]), stage("cat", &[])]);
    p.run(ExecOptions::new().with_background(true)).unwrap();
    assert_eq!(p.state(), RunState::Spawned);
    assert_eq!(p.exit_code(), None);

    p.wait().unwrap();
    assert_eq!(p.stdout(), b"bg\n");
    assert!(p.wall_time().is_some());
    assert!(p.started_at().unwrap() <= p.finished_at().unwrap());
}

#[test]
fn test_dropped_background_pipeline_is_reaped() {
    let mut p = pipeline(vec![stage("echo", &["bg"]), stage("sleep", &["0.3"])]);
    p.run(ExecOptions::new().with_background(true)).unwrap();
    let pids: Vec<u32> = p.stages().iter().filter_map(RunningCommand::pid).collect();
    assert_eq!(pids.len(), 2);

    drop(p);
    assert!(wait_until_reaped(&pids, Duration::from_secs(5)));
}

#[test]
#[serial]
fn test_timeout_terminates_every_stage() {
    let started = Instant::now();
    let mut p = pipeline(vec![stage("sleep", &["4"]), stage("sleep", &["4"])]);
    let err = p
        .run(ExecOptions::new().with_timeout(Duration::from_secs(1)))
        .unwrap_err();

    let elapsed = started.elapsed();
    assert!(matches!(err, ProcshError::CommandTimeout(_)));
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_secs(3));
    assert_eq!(p.state(), RunState::TimedOut);
    assert_eq!(p.stage_exit_codes(), vec![None, None]);
    assert!(p.stages().iter().all(|s| s.state() == RunState::TimedOut));
}

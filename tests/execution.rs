//! Integration tests for the execution engine
//!
//! Everything here drives the unsandboxed fallback path or the isolation
//! probe; tests that need a Python interpreter detect availability first and
//! degrade gracefully when it is absent, so the suite passes on minimal CI
//! hosts.

use runbox::config::{RuntimeConfig, ServiceConfig};
use runbox::types::{ExecError, ExecutionRequest};
use runbox::{ExecutionEngine, ExecutionResponse};
use std::path::Path;
use std::time::{Duration, Instant};

fn python_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn python_engine(staging: &Path) -> ExecutionEngine {
    let mut config = ServiceConfig::default();
    config.staging_dir = Some(staging.to_path_buf());
    ExecutionEngine::new(config)
}

fn shell_engine(staging: &Path) -> ExecutionEngine {
    let mut config = ServiceConfig::default();
    config.staging_dir = Some(staging.to_path_buf());
    config.runtime.fallback_interpreter = "/bin/sh".to_string();
    ExecutionEngine::new(config)
}

fn staging_entry_count(base: &Path) -> usize {
    match std::fs::read_dir(base) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

#[test]
fn test_print_arithmetic_completes_with_stdout() {
    if !python_available() {
        println!("python3 not available, skipping");
        return;
    }
    let base = tempfile::tempdir().unwrap();
    let engine = python_engine(base.path());

    let outcome = engine.execute(&ExecutionRequest::new("print(2+2)")).unwrap();
    assert_eq!(outcome.stdout, "4\n");
    assert_eq!(outcome.stderr, "");
    assert_eq!(outcome.exit_code, 0);
    assert!(!outcome.sandboxed);
}

#[test]
fn test_division_by_zero_is_a_program_error_not_a_service_error() {
    if !python_available() {
        println!("python3 not available, skipping");
        return;
    }
    let base = tempfile::tempdir().unwrap();
    let engine = python_engine(base.path());

    let outcome = engine.execute(&ExecutionRequest::new("x = 1/0")).unwrap();
    assert_ne!(outcome.exit_code, 0);
    assert!(
        outcome.stderr.contains("ZeroDivisionError"),
        "stderr should carry the traceback, got: {}",
        outcome.stderr
    );
}

#[test]
fn test_sleep_beyond_budget_times_out_promptly() {
    if !python_available() {
        println!("python3 not available, skipping");
        return;
    }
    let base = tempfile::tempdir().unwrap();
    let engine = python_engine(base.path());

    let request = ExecutionRequest::new("import time; time.sleep(30)").with_timeout(1);
    let start = Instant::now();
    let err = engine.execute(&request).unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, ExecError::ExecutionTimedOut { .. }));
    assert!(
        elapsed < Duration::from_secs(5),
        "termination took {:?}",
        elapsed
    );
    assert_eq!(staging_entry_count(base.path()), 0);
}

#[test]
fn test_unreachable_isolation_runtime_never_falls_back() {
    let base = tempfile::tempdir().unwrap();
    let mut config = ServiceConfig::default();
    config.staging_dir = Some(base.path().to_path_buf());
    config.runtime = RuntimeConfig {
        engine: "runbox-test-missing-engine".to_string(),
        probe_timeout_secs: 1,
        ..RuntimeConfig::default()
    };
    let engine = ExecutionEngine::new(config);

    let err = engine
        .execute(&ExecutionRequest::new("print(2+2)").sandboxed())
        .unwrap_err();
    assert!(matches!(err, ExecError::IsolationUnavailable(_)));
    // No staging area was created, so no fallback run can have happened.
    assert_eq!(staging_entry_count(base.path()), 0);
}

#[test]
fn test_timeout_boundary_completion_inside_budget() {
    let base = tempfile::tempdir().unwrap();
    let engine = shell_engine(base.path());

    let outcome = engine
        .execute(&ExecutionRequest::new("echo quick").with_timeout(5))
        .unwrap();
    assert_eq!(outcome.stdout, "quick\n");
    assert_eq!(outcome.exit_code, 0);
}

#[test]
fn test_timeout_boundary_overrun_is_a_distinct_signal() {
    let base = tempfile::tempdir().unwrap();
    let engine = shell_engine(base.path());

    let err = engine
        .execute(&ExecutionRequest::new("sleep 30").with_timeout(1))
        .unwrap_err();
    assert!(matches!(
        err,
        ExecError::ExecutionTimedOut { limit } if limit == Duration::from_secs(1)
    ));
}

#[test]
fn test_budget_validation_boundaries() {
    let base = tempfile::tempdir().unwrap();
    let engine = shell_engine(base.path());

    for request in [
        ExecutionRequest::new("echo hi").with_timeout(0),
        ExecutionRequest::new("echo hi").with_timeout(-5),
        ExecutionRequest::new("echo hi").with_memory_limit(0),
        ExecutionRequest::new("echo hi").with_memory_limit(-1),
        ExecutionRequest::new("echo hi").with_timeout(61),
        ExecutionRequest::new("echo hi").with_memory_limit(513),
    ] {
        let err = engine.execute(&request).unwrap_err();
        assert!(
            matches!(err, ExecError::InvalidResourceRequest { .. }),
            "expected rejection for {:?}/{:?}",
            request.timeout_seconds,
            request.memory_limit_mb
        );
    }

    // At the configured maximum both fields are accepted.
    let outcome = engine
        .execute(
            &ExecutionRequest::new("echo max")
                .with_timeout(60)
                .with_memory_limit(512),
        )
        .unwrap();
    assert_eq!(outcome.stdout, "max\n");
}

#[test]
fn test_repeated_runs_use_independent_staging_and_recover_from_failure() {
    let base = tempfile::tempdir().unwrap();
    let engine = shell_engine(base.path());

    let first = engine
        .execute(&ExecutionRequest::new("echo run"))
        .unwrap();
    let timed_out = engine
        .execute(&ExecutionRequest::new("sleep 30").with_timeout(1))
        .unwrap_err();
    let second = engine
        .execute(&ExecutionRequest::new("echo run"))
        .unwrap();

    assert_eq!(first.stdout, "run\n");
    assert!(matches!(timed_out, ExecError::ExecutionTimedOut { .. }));
    assert_eq!(second.stdout, "run\n");
    // Post-condition: no staging directory survived any of the three runs.
    assert_eq!(staging_entry_count(base.path()), 0);
}

#[test]
fn test_response_translation_round_trip_at_the_boundary() {
    let base = tempfile::tempdir().unwrap();
    let engine = shell_engine(base.path());

    let response = runbox::to_response(engine.execute(&ExecutionRequest::new("echo hi")));
    assert!(matches!(
        response,
        ExecutionResponse::Completed { ref stdout, exit_code: 0, sandboxed: false, .. }
            if stdout == "hi\n"
    ));

    let response = runbox::to_response(
        engine.execute(&ExecutionRequest::new("sleep 30").with_timeout(1)),
    );
    assert_eq!(response, ExecutionResponse::TimedOut { limit_seconds: 1 });
}

/// Launch strategies and the container isolation runtime
///
/// The supervisor only ever sees a [`LaunchPlan`], so the container engine
/// can be swapped without touching timeout or teardown logic.
use crate::config::RuntimeConfig;
use crate::events;
use crate::limits::ResourceBudget;
use crate::staging::{StagingDir, SOURCE_FILE_NAME};
use crate::types::{ExecError, Result};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Working directory the staging area is mounted at inside the container
const CONTAINER_WORKDIR: &str = "/workdir";

/// Fully resolved command for the supervisor to run
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub program: String,
    pub args: Vec<String>,
    pub workdir: Option<PathBuf>,
    /// Whether this plan carries container isolation guarantees
    pub sandboxed: bool,
}

/// Execution strategy, selected exactly once per request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStrategy {
    /// Hardened container execution via the configured engine
    Isolated,
    /// Direct interpreter execution with no isolation (degraded trust)
    Direct,
}

impl LaunchStrategy {
    /// Build the launch plan for a staged source under the given budget
    pub fn plan(
        &self,
        runtime: &RuntimeConfig,
        staging: &StagingDir,
        budget: &ResourceBudget,
    ) -> LaunchPlan {
        match self {
            LaunchStrategy::Isolated => isolated_plan(runtime, staging, budget),
            LaunchStrategy::Direct => LaunchPlan {
                program: runtime.fallback_interpreter.clone(),
                args: vec![SOURCE_FILE_NAME.to_string()],
                workdir: Some(staging.dir().to_path_buf()),
                sandboxed: false,
            },
        }
    }
}

/// Hardened container invocation.
///
/// Every constraint here is a non-negotiable default for isolated runs: no
/// network, memory and pids ceilings, no privilege escalation, all
/// capabilities dropped, read-only root filesystem with a size-capped
/// writable /tmp, non-root user, and the source mounted read-only.
fn isolated_plan(
    runtime: &RuntimeConfig,
    staging: &StagingDir,
    budget: &ResourceBudget,
) -> LaunchPlan {
    let args = vec![
        "run".to_string(),
        "--rm".to_string(),
        "--network".to_string(),
        "none".to_string(),
        format!("--memory={}m", budget.memory_limit_mb),
        "--pids-limit".to_string(),
        budget.process_count_limit.to_string(),
        "--security-opt".to_string(),
        "no-new-privileges".to_string(),
        "--cap-drop".to_string(),
        "ALL".to_string(),
        "--read-only".to_string(),
        "--tmpfs".to_string(),
        format!("/tmp:rw,exec,nosuid,size={}m", runtime.tmpfs_size_mb),
        "-v".to_string(),
        format!("{}:{}:ro", staging.dir().display(), CONTAINER_WORKDIR),
        "-w".to_string(),
        CONTAINER_WORKDIR.to_string(),
        "--user".to_string(),
        runtime.user.clone(),
        runtime.image.clone(),
        "python".to_string(),
        SOURCE_FILE_NAME.to_string(),
    ];

    LaunchPlan {
        program: runtime.engine.clone(),
        args,
        workdir: None,
        sandboxed: true,
    }
}

/// Probe the container runtime before any staging happens.
///
/// Isolated execution must fail fast with `IsolationUnavailable` when the
/// engine is unreachable, never silently downgrade to the fallback path.
/// `info` exercises the daemon connection, not just the client binary.
pub fn probe_isolation(runtime: &RuntimeConfig) -> Result<()> {
    let mut child = Command::new(&runtime.engine)
        .arg("info")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            events::isolation_probe_failed(&runtime.engine, &e.to_string());
            ExecError::IsolationUnavailable(format!("{} not found: {}", runtime.engine, e))
        })?;

    let deadline = Duration::from_secs(runtime.probe_timeout_secs);
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if status.success() {
                    return Ok(());
                }
                let mut detail = String::new();
                if let Some(mut stderr) = child.stderr.take() {
                    let _ = stderr.read_to_string(&mut detail);
                }
                let detail = detail.trim();
                let reason = if detail.is_empty() {
                    format!("{} info exited with {}", runtime.engine, status)
                } else {
                    format!("{} info failed: {}", runtime.engine, detail)
                };
                events::isolation_probe_failed(&runtime.engine, &reason);
                return Err(ExecError::IsolationUnavailable(reason));
            }
            Ok(None) => {
                if start.elapsed() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    let reason = format!(
                        "{} info did not respond within {} seconds",
                        runtime.engine, runtime.probe_timeout_secs
                    );
                    events::isolation_probe_failed(&runtime.engine, &reason);
                    return Err(ExecError::IsolationUnavailable(reason));
                }
                thread::sleep(Duration::from_millis(20));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                let reason = format!("failed to monitor {} probe: {}", runtime.engine, e);
                events::isolation_probe_failed(&runtime.engine, &reason);
                return Err(ExecError::IsolationUnavailable(reason));
            }
        }
    }
}

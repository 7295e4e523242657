/// Process supervision: spawn, wall clock deadline, capture, termination
///
/// The supervisor owns the single blocking operation in the engine (wait
/// for process exit or deadline) and guarantees it unblocks exactly once.
/// Its deadline is enforced independently of the isolation layer, so a stuck
/// or isolation-bypassing payload is still killed on time.
use crate::limits::ResourceBudget;
use crate::output::{OutputCollector, OutputLimits};
use crate::runtime::LaunchPlan;
use crate::types::{ExecError, ExecutionOutcome, Result};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::os::unix::process::{CommandExt, ExitStatusExt};

/// Grace period between SIGTERM and SIGKILL
const TERM_GRACE: Duration = Duration::from_millis(100);
/// Poll interval while the child is running
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Run one process to completion under the budget's wall clock limit.
///
/// Exactly one of: a complete outcome, `ProcessLaunchFailed`, or
/// `ExecutionTimedOut` is produced. On timeout the process group is forcibly
/// terminated and any partial output is discarded.
pub fn supervise(
    plan: &LaunchPlan,
    budget: &ResourceBudget,
    limits: &OutputLimits,
) -> Result<ExecutionOutcome> {
    let mut cmd = Command::new(&plan.program);
    cmd.args(&plan.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(workdir) = &plan.workdir {
        cmd.current_dir(workdir);
    }

    // Own process group, so termination reaches interpreter children too.
    #[cfg(unix)]
    cmd.process_group(0);

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(|e| {
        ExecError::ProcessLaunchFailed(format!("failed to start {}: {}", plan.program, e))
    })?;
    let pid = child.id();

    let collector = OutputCollector::spawn(child.stdout.take(), child.stderr.take(), limits);
    let deadline = budget.wall_clock_limit;

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let (stdout, stderr) = collector.join();
                let wall_time = start.elapsed().as_secs_f64();

                let signal = {
                    #[cfg(unix)]
                    {
                        status.signal()
                    }
                    #[cfg(not(unix))]
                    {
                        None
                    }
                };
                let exit_code = status
                    .code()
                    .unwrap_or_else(|| signal.map(|s| -s).unwrap_or(-1));

                return Ok(ExecutionOutcome {
                    stdout: stdout.into_string(),
                    stderr: stderr.into_string(),
                    exit_code,
                    signal,
                    wall_time,
                    sandboxed: plan.sandboxed,
                });
            }
            Ok(None) => {
                if start.elapsed() >= deadline {
                    log::info!(
                        "wall clock limit {:?} reached, terminating pid {}",
                        deadline,
                        pid
                    );
                    terminate(pid);
                    let _ = child.wait();
                    collector.discard();
                    return Err(ExecError::ExecutionTimedOut { limit: deadline });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                terminate(pid);
                let _ = child.wait();
                collector.discard();
                return Err(ExecError::ProcessLaunchFailed(format!(
                    "process monitoring error: {}",
                    e
                )));
            }
        }
    }
}

/// SIGTERM the process group, short grace, then SIGKILL
fn terminate(pid: u32) {
    let group = Pid::from_raw(-(pid as i32));
    let _ = signal::kill(group, Signal::SIGTERM);
    thread::sleep(TERM_GRACE);
    let _ = signal::kill(group, Signal::SIGKILL);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn shell_plan(script: &str) -> LaunchPlan {
        LaunchPlan {
            program: "/bin/sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            workdir: None,
            sandboxed: false,
        }
    }

    fn budget(secs: u64) -> ResourceBudget {
        ResourceBudget {
            wall_clock_limit: Duration::from_secs(secs),
            memory_limit_mb: 128,
            process_count_limit: 64,
        }
    }

    #[test]
    fn test_captures_stdout_and_exit_code() {
        let outcome = supervise(
            &shell_plan("echo hello"),
            &budget(5),
            &OutputLimits::default(),
        )
        .unwrap();
        assert_eq!(outcome.stdout, "hello\n");
        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.signal.is_none());
        assert!(!outcome.sandboxed);
    }

    #[test]
    fn test_nonzero_exit_is_an_outcome_not_an_error() {
        let outcome = supervise(
            &shell_plan("echo oops >&2; exit 3"),
            &budget(5),
            &OutputLimits::default(),
        )
        .unwrap();
        assert_eq!(outcome.exit_code, 3);
        assert_eq!(outcome.stderr, "oops\n");
    }

    #[test]
    fn test_deadline_terminates_and_discards_output() {
        let start = Instant::now();
        let err = supervise(
            &shell_plan("echo partial; sleep 30"),
            &budget(1),
            &OutputLimits::default(),
        )
        .unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(err, ExecError::ExecutionTimedOut { .. }));
        // Deadline plus termination grace, with headroom for slow CI.
        assert!(
            elapsed < Duration::from_secs(5),
            "termination took {:?}",
            elapsed
        );
    }

    #[test]
    fn test_missing_executable_is_launch_failure() {
        let plan = LaunchPlan {
            program: "/nonexistent/runbox-missing-interpreter".to_string(),
            args: vec![],
            workdir: None,
            sandboxed: false,
        };
        let err = supervise(&plan, &budget(5), &OutputLimits::default()).unwrap_err();
        assert!(matches!(err, ExecError::ProcessLaunchFailed(_)));
    }
}

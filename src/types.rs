/// Core request, outcome, and error types for the runbox engine
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A single code execution request.
///
/// Immutable once submitted. Budget fields left unset fall back to the
/// documented defaults during validation; no unbounded value ever reaches
/// process creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Source code to execute
    pub source: String,
    /// Wall clock budget in seconds
    #[serde(default)]
    pub timeout_seconds: Option<i64>,
    /// Memory ceiling in megabytes
    #[serde(default)]
    pub memory_limit_mb: Option<i64>,
    /// Run inside the container isolation runtime
    #[serde(default)]
    pub isolation_requested: bool,
}

impl ExecutionRequest {
    /// Request with defaults for every budget field, unsandboxed
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            timeout_seconds: None,
            memory_limit_mb: None,
            isolation_requested: false,
        }
    }

    pub fn with_timeout(mut self, seconds: i64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn with_memory_limit(mut self, mb: i64) -> Self {
        self.memory_limit_mb = Some(mb);
        self
    }

    pub fn sandboxed(mut self) -> Self {
        self.isolation_requested = true;
        self
    }
}

/// Captured result of one completed execution.
///
/// Produced exactly once per request and never partially populated: a run
/// that misses its wall clock budget surfaces [`ExecError::ExecutionTimedOut`]
/// instead of an outcome. A non-zero exit code from the executed code is not
/// a service-level error.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Exit code; signal terminations are reported as the negated signal number
    pub exit_code: i32,
    /// Terminating signal, if the process was signaled
    pub signal: Option<i32>,
    /// Wall clock time used (in seconds)
    pub wall_time: f64,
    /// Whether the run carried container isolation guarantees
    pub sandboxed: bool,
}

/// Error taxonomy for the execution engine.
///
/// Every failure kind stays structurally distinguishable to the caller; none
/// of them are retried by the engine.
#[derive(Error, Debug)]
pub enum ExecError {
    /// Rejected before any process was created; carries the offending field
    #[error("invalid {field}: {reason}")]
    InvalidResourceRequest { field: &'static str, reason: String },

    /// Staging directory could not be created or populated
    #[error("failed to stage execution environment: {0}")]
    EnvironmentSetupFailed(String),

    /// Isolation was requested but the container runtime is unreachable.
    /// Never silently downgraded to unsandboxed execution.
    #[error("isolation runtime unavailable: {0}")]
    IsolationUnavailable(String),

    /// The interpreter process could not start inside a prepared environment
    #[error("failed to launch process: {0}")]
    ProcessLaunchFailed(String),

    /// Wall clock budget exceeded; the process was forcibly terminated and
    /// partial output discarded
    #[error("execution exceeded wall clock limit of {limit:?}")]
    ExecutionTimedOut { limit: Duration },
}

/// Convert engine errors to process exit codes for the CLI boundary
impl From<&ExecError> for i32 {
    fn from(err: &ExecError) -> i32 {
        match err {
            ExecError::InvalidResourceRequest { .. } => 2, // Usage error
            ExecError::IsolationUnavailable(_) => 69,      // Service unavailable
            ExecError::EnvironmentSetupFailed(_) => 73,    // Can't create
            ExecError::ProcessLaunchFailed(_) => 71,       // OS error
            ExecError::ExecutionTimedOut { .. } => 124,    // timeout(1) convention
        }
    }
}

/// Result type alias for runbox operations
pub type Result<T> = std::result::Result<T, ExecError>;

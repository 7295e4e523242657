/// Pure translation from engine results to the caller-facing response shape
use crate::types::{ExecError, ExecutionOutcome};
use serde::Serialize;

/// Caller-facing response taxonomy.
///
/// Each kind stays structurally distinguishable via the `status` tag;
/// message text is never the discriminant. A timeout is not a success
/// shape, and a non-zero exit code still serializes as `completed`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionResponse {
    Completed {
        stdout: String,
        stderr: String,
        exit_code: i32,
        sandboxed: bool,
    },
    TimedOut {
        limit_seconds: u64,
    },
    InvalidRequest {
        field: String,
        reason: String,
    },
    IsolationUnavailable {
        reason: String,
    },
    SetupFailed {
        reason: String,
    },
    LaunchFailed {
        reason: String,
    },
}

/// Map an engine result to the response shape. No I/O, no mutation.
pub fn to_response(result: Result<ExecutionOutcome, ExecError>) -> ExecutionResponse {
    match result {
        Ok(outcome) => ExecutionResponse::Completed {
            stdout: outcome.stdout,
            stderr: outcome.stderr,
            exit_code: outcome.exit_code,
            sandboxed: outcome.sandboxed,
        },
        Err(ExecError::ExecutionTimedOut { limit }) => ExecutionResponse::TimedOut {
            limit_seconds: limit.as_secs(),
        },
        Err(ExecError::InvalidResourceRequest { field, reason }) => {
            ExecutionResponse::InvalidRequest {
                field: field.to_string(),
                reason,
            }
        }
        Err(ExecError::IsolationUnavailable(reason)) => {
            ExecutionResponse::IsolationUnavailable { reason }
        }
        Err(ExecError::EnvironmentSetupFailed(reason)) => ExecutionResponse::SetupFailed { reason },
        Err(ExecError::ProcessLaunchFailed(reason)) => ExecutionResponse::LaunchFailed { reason },
    }
}

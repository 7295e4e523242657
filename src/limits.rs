/// Resource limit policy: validation and normalization of execution budgets
use crate::types::{ExecError, ExecutionRequest, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wall clock budget applied when the request omits one
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
/// Memory ceiling applied when the request omits one
pub const DEFAULT_MEMORY_MB: u64 = 128;
/// Cap on concurrently live processes/threads inside one sandbox
pub const DEFAULT_PROCESS_LIMIT: u32 = 64;

/// Configured ceilings for caller-supplied budgets
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitPolicy {
    /// Maximum accepted wall clock budget in seconds
    pub max_timeout_secs: u64,
    /// Maximum accepted memory ceiling in megabytes
    pub max_memory_mb: u64,
    /// Process count cap handed to the isolation layer
    pub process_limit: u32,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            max_timeout_secs: 60,
            max_memory_mb: 512,
            process_limit: DEFAULT_PROCESS_LIMIT,
        }
    }
}

/// Normalized, validated budget applied to exactly one execution.
/// Read-only once derived.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBudget {
    /// Wall clock limit enforced by the supervisor
    pub wall_clock_limit: Duration,
    /// Memory ceiling enforced by the isolation layer
    pub memory_limit_mb: u64,
    /// Process count cap enforced by the isolation layer
    pub process_count_limit: u32,
}

impl LimitPolicy {
    /// Validate and normalize a request's budget fields.
    ///
    /// Rejects zero, negative, and over-ceiling values before any process is
    /// spawned. Omitted fields take the documented defaults.
    pub fn normalize(&self, request: &ExecutionRequest) -> Result<ResourceBudget> {
        let timeout = request
            .timeout_seconds
            .unwrap_or(DEFAULT_TIMEOUT_SECS as i64);
        if timeout <= 0 {
            return Err(ExecError::InvalidResourceRequest {
                field: "timeout_seconds",
                reason: "must be greater than zero".to_string(),
            });
        }
        if timeout as u64 > self.max_timeout_secs {
            return Err(ExecError::InvalidResourceRequest {
                field: "timeout_seconds",
                reason: format!("exceeds maximum of {} seconds", self.max_timeout_secs),
            });
        }

        let memory = request.memory_limit_mb.unwrap_or(DEFAULT_MEMORY_MB as i64);
        if memory <= 0 {
            return Err(ExecError::InvalidResourceRequest {
                field: "memory_limit_mb",
                reason: "must be greater than zero".to_string(),
            });
        }
        if memory as u64 > self.max_memory_mb {
            return Err(ExecError::InvalidResourceRequest {
                field: "memory_limit_mb",
                reason: format!("exceeds maximum of {} MB", self.max_memory_mb),
            });
        }

        Ok(ResourceBudget {
            wall_clock_limit: Duration::from_secs(timeout as u64),
            memory_limit_mb: memory as u64,
            process_count_limit: self.process_limit,
        })
    }
}

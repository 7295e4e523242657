/// Execution orchestration: one request, one strategy, one supervised process
use crate::config::ServiceConfig;
use crate::events;
use crate::output::OutputLimits;
use crate::runtime::{self, LaunchStrategy};
use crate::staging::StagingDir;
use crate::supervisor;
use crate::types::{ExecError, ExecutionOutcome, ExecutionRequest, Result};

/// The sandboxed execution engine.
///
/// Holds only immutable configuration, so one engine can serve many
/// concurrent requests; each request owns its own staging area and child
/// process and blocks only its own caller.
pub struct ExecutionEngine {
    config: ServiceConfig,
    output_limits: OutputLimits,
}

impl ExecutionEngine {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            output_limits: OutputLimits::default(),
        }
    }

    /// Run one request to completion.
    ///
    /// Lifecycle: validate budget, select the launch strategy exactly once,
    /// probe the isolation runtime (isolated runs only), stage, supervise.
    /// The staging area is torn down on every exit path, including panics.
    /// An isolated request whose runtime is unreachable fails with
    /// `IsolationUnavailable`; it never falls back to direct execution.
    pub fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionOutcome> {
        let budget = self.config.limits.normalize(request).map_err(|e| {
            if let ExecError::InvalidResourceRequest { field, reason } = &e {
                events::resource_request_rejected(field, reason);
            }
            e
        })?;

        let strategy = if request.isolation_requested {
            runtime::probe_isolation(&self.config.runtime)?;
            LaunchStrategy::Isolated
        } else {
            LaunchStrategy::Direct
        };

        let staging = StagingDir::create(&self.config.staging_base(), &request.source)?;
        log::debug!(
            "staged run {} in {}",
            staging.run_id(),
            staging.dir().display()
        );

        if strategy == LaunchStrategy::Direct {
            events::unsandboxed_execution(staging.run_id());
        }

        let plan = strategy.plan(&self.config.runtime, &staging, &budget);
        let result = supervisor::supervise(&plan, &budget, &self.output_limits);

        if let Err(ExecError::ExecutionTimedOut { limit }) = &result {
            events::deadline_kill(staging.run_id(), limit.as_secs());
        }

        result
        // staging drops here, removing the directory on every path
    }
}

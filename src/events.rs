/// Structured logging of security-relevant execution events
use log::{info, warn};
use serde::Serialize;

/// Types of security-relevant events the engine reports
#[derive(Debug, Clone, Serialize)]
pub enum SecurityEventType {
    /// Code ran without container isolation (degraded trust)
    UnsandboxedExecution,
    /// A caller-supplied budget was rejected before process creation
    ResourceRequestRejected,
    /// Isolation was requested but the runtime probe failed
    IsolationProbeFailed,
    /// A payload hit its wall clock limit and was killed
    DeadlineKill,
}

/// Event severity levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl SecurityEventType {
    /// Default severity for this event type
    pub fn severity(&self) -> Severity {
        match self {
            SecurityEventType::UnsandboxedExecution => Severity::High,
            SecurityEventType::IsolationProbeFailed => Severity::Medium,
            SecurityEventType::DeadlineKill => Severity::Medium,
            SecurityEventType::ResourceRequestRejected => Severity::Low,
        }
    }
}

/// Individual security event
#[derive(Debug, Clone, Serialize)]
pub struct SecurityEvent {
    pub event_type: SecurityEventType,
    pub severity: Severity,
    pub run_id: Option<String>,
    pub details: String,
}

impl SecurityEvent {
    /// Create a new event with the type's default severity
    pub fn new(event_type: SecurityEventType, details: String) -> Self {
        let severity = event_type.severity();
        Self {
            event_type,
            severity,
            run_id: None,
            details,
        }
    }

    pub fn with_run_id(mut self, run_id: &str) -> Self {
        self.run_id = Some(run_id.to_string());
        self
    }

    /// Emit through the log facade as a single JSON line
    pub fn emit(&self) {
        let line = serde_json::to_string(self)
            .unwrap_or_else(|_| format!("{:?}", self));
        match self.severity {
            Severity::High => warn!("security event: {}", line),
            Severity::Medium | Severity::Low => info!("security event: {}", line),
        }
    }
}

pub fn unsandboxed_execution(run_id: &str) {
    SecurityEvent::new(
        SecurityEventType::UnsandboxedExecution,
        "executing without container isolation; code has host filesystem and network access"
            .to_string(),
    )
    .with_run_id(run_id)
    .emit();
}

pub fn resource_request_rejected(field: &str, reason: &str) {
    SecurityEvent::new(
        SecurityEventType::ResourceRequestRejected,
        format!("{}: {}", field, reason),
    )
    .emit();
}

pub fn isolation_probe_failed(engine: &str, reason: &str) {
    SecurityEvent::new(
        SecurityEventType::IsolationProbeFailed,
        format!("{}: {}", engine, reason),
    )
    .emit();
}

pub fn deadline_kill(run_id: &str, limit_secs: u64) {
    SecurityEvent::new(
        SecurityEventType::DeadlineKill,
        format!("payload exceeded wall clock limit of {} seconds", limit_secs),
    )
    .with_run_id(run_id)
    .emit();
}

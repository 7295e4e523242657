//! runbox: sandboxed execution of untrusted source code
//!
//! The engine accepts a source snippet plus a resource budget, runs it in an
//! isolated, disposable environment, and returns captured output. Isolation
//! is delegated to a container runtime with hardened defaults; a degraded
//! trust direct execution path exists for callers that do not request it.
//!
//! # Architecture
//!
//! - [`limits`]: budget validation and normalization (no process is spawned
//!   until the budget is bounded)
//! - [`staging`]: run-scoped staging directory for the source artifact,
//!   removed unconditionally on every exit path
//! - [`runtime`]: launch strategies, the hardened container invocation, and
//!   the isolation availability probe
//! - [`supervisor`]: process lifecycle with an independent wall clock
//!   deadline and forced termination
//! - [`translate`]: pure mapping from engine results to the caller-facing
//!   response taxonomy
//! - [`engine`]: per-request orchestration tying the above together
//! - [`registry`]: server catalog behind an injected storage interface,
//!   independent of the execution core
//! - [`events`]: structured logging of security-relevant events
//!
//! # Design principles
//!
//! 1. **Bound before spawn** - no unbounded resource request reaches process
//!    creation
//! 2. **One request, one environment** - no cross-request shared mutable
//!    state; staging areas never outlive their request
//! 3. **Fail closed** - requested isolation that cannot be provided is an
//!    error, never a silent downgrade
//! 4. **Deadline as defense in depth** - the supervisor kills on wall clock
//!    overrun even when the isolation layer should have

pub mod cli;
pub mod config;
pub mod engine;
pub mod events;
pub mod limits;
pub mod output;
pub mod registry;
pub mod runtime;
pub mod staging;
pub mod supervisor;
pub mod translate;
pub mod types;

pub use engine::ExecutionEngine;
pub use limits::{LimitPolicy, ResourceBudget};
pub use translate::{to_response, ExecutionResponse};
pub use types::{ExecError, ExecutionOutcome, ExecutionRequest, Result};

//! Action execution boundary
//!
//! The dashboard never talks to processes or sockets directly. Probing and
//! command execution live behind this trait so the cli crate can supply the
//! shell-facing implementation and tests can supply a canned one.

use async_trait::async_trait;

use crate::catalog::{ActionId, ProbeSpec, ServiceStatus};

/// Result of running a command action
#[derive(Clone, Debug)]
pub struct CommandOutcome {
    /// Combined stdout and stderr text
    pub output: String,
    pub failed: bool,
}

/// Backend that probes service status and runs command actions
///
/// Both methods are total: a probe that cannot decide reports
/// [`ServiceStatus::Unknown`], and an execution failure of any kind comes
/// back as a `failed` outcome with the error text as output. Callers never
/// see an error type here.
#[async_trait]
pub trait ActionRunner: Send + Sync {
    async fn probe_status(&self, probe: &ProbeSpec) -> ServiceStatus;

    async fn run_command(&self, action: ActionId) -> CommandOutcome;
}

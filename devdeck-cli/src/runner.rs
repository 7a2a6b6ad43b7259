//! Shell-backed [`ActionRunner`] plus the workers that feed results into
//! the dashboard event channel.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sysinfo::System;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinSet;

use devdeck_core::catalog::{ActionId, Catalog, ProbeSpec, ServiceStatus};
use devdeck_core::dashboard::DashboardEvent;
use devdeck_core::runner::{ActionRunner, CommandOutcome};

/// Shell invocation behind each command action
pub fn action_command(action: ActionId) -> &'static str {
    match action {
        ActionId::StartAllServices => "./scripts/services.sh start",
        ActionId::StopAllServices => "./scripts/services.sh stop",
        ActionId::BuildImages => "nix run .#build-images",
        ActionId::RunTests => "pnpm nx test && cargo test --workspace",
        ActionId::StartTilt => "tilt up",
        ActionId::MobileDev => "cd apps/mobile && npx expo start",
        ActionId::CleanAll => "./scripts/services.sh clean",
    }
}

/// Probes the local machine and runs actions through the shell
pub struct ShellRunner {
    sys: Arc<RwLock<System>>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self {
            sys: Arc::new(RwLock::new(System::new())),
        }
    }

    /// A service counts as running when some process command line contains
    /// every whitespace-separated token of the pattern
    async fn probe_process(&self, pattern: &str) -> ServiceStatus {
        let needles: Vec<String> = pattern
            .split_whitespace()
            .map(|token| token.to_lowercase())
            .collect();
        if needles.is_empty() {
            return ServiceStatus::Unknown;
        }

        let mut sys = self.sys.write().await;
        sys.refresh_processes(sysinfo::ProcessesToUpdate::All, true);

        let found = sys.processes().values().any(|process| {
            let cmdline = process
                .cmd()
                .iter()
                .map(|part| part.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            !cmdline.is_empty() && needles.iter().all(|needle| cmdline.contains(needle.as_str()))
        });

        if found {
            ServiceStatus::Running
        } else {
            ServiceStatus::Stopped
        }
    }

    async fn probe_port(&self, port: u16) -> ServiceStatus {
        let addr = format!("127.0.0.1:{}", port);
        match tokio::time::timeout(Duration::from_secs(2), TcpStream::connect(&addr)).await {
            Ok(Ok(_)) => ServiceStatus::Running,
            Ok(Err(_)) => ServiceStatus::Stopped,
            // Nothing answered and nothing refused; can't tell
            Err(_) => ServiceStatus::Unknown,
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionRunner for ShellRunner {
    async fn probe_status(&self, probe: &ProbeSpec) -> ServiceStatus {
        match probe {
            ProbeSpec::Process { pattern } => self.probe_process(pattern).await,
            ProbeSpec::Port { port } => self.probe_port(*port).await,
        }
    }

    async fn run_command(&self, action: ActionId) -> CommandOutcome {
        let shell = action_command(action);

        #[cfg(unix)]
        let output = Command::new("sh")
            .arg("-c")
            .arg(shell)
            .stdin(Stdio::null())
            .output()
            .await;
        #[cfg(windows)]
        let output = Command::new("cmd")
            .args(["/C", shell])
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Ok(out) => {
                let mut chunks = Vec::new();
                let stdout = String::from_utf8_lossy(&out.stdout);
                let stderr = String::from_utf8_lossy(&out.stderr);
                if !stdout.trim().is_empty() {
                    chunks.push(stdout.trim_end().to_string());
                }
                if !stderr.trim().is_empty() {
                    chunks.push(stderr.trim_end().to_string());
                }
                CommandOutcome {
                    output: chunks.join("\n"),
                    failed: !out.status.success(),
                }
            }
            Err(e) => CommandOutcome {
                output: format!("failed to spawn '{}': {}", shell, e),
                failed: true,
            },
        }
    }
}

/// Probe every service concurrently and post one aggregate event once all
/// probes have finished; the dashboard never sees a partial batch
pub fn spawn_status_refresh(
    runner: Arc<dyn ActionRunner>,
    catalog: &Catalog,
    events: mpsc::Sender<DashboardEvent>,
) {
    let probes: Vec<(String, ProbeSpec)> = catalog
        .services
        .iter()
        .map(|svc| (svc.name.clone(), svc.probe.clone()))
        .collect();

    tokio::spawn(async move {
        let mut set = JoinSet::new();
        for (name, probe) in probes {
            let runner = runner.clone();
            set.spawn(async move {
                let status = runner.probe_status(&probe).await;
                (name, status)
            });
        }

        let mut statuses = Vec::with_capacity(set.len());
        while let Some(joined) = set.join_next().await {
            if let Ok(pair) = joined {
                statuses.push(pair);
            }
        }

        let _ = events
            .send(DashboardEvent::StatusRefreshed { statuses })
            .await;
    });
}

/// Run one command action off the UI loop and post its result
pub fn spawn_command(
    runner: Arc<dyn ActionRunner>,
    name: String,
    action: ActionId,
    events: mpsc::Sender<DashboardEvent>,
) {
    tokio::spawn(async move {
        let outcome = runner.run_command(action).await;
        let _ = events
            .send(DashboardEvent::CommandFinished {
                name,
                output: outcome.output,
                failed: outcome.failed,
            })
            .await;
    });
}

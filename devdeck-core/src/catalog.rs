//! Catalog data model
//!
//! The catalog is the static description of what the dashboard manages:
//! services that can be probed and commands that can be executed. Entries
//! come either from the compiled-in default or from a config file.

use serde::{Deserialize, Serialize};

/// Last observed status of a service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Unknown,
    Running,
    Stopped,
}

impl ServiceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceStatus::Unknown => "unknown",
            ServiceStatus::Running => "running",
            ServiceStatus::Stopped => "stopped",
        }
    }

    /// Icon character for the status
    pub fn icon(&self) -> &'static str {
        match self {
            ServiceStatus::Unknown => "?",
            ServiceStatus::Running => "●",
            ServiceStatus::Stopped => "○",
        }
    }
}

/// Category of a service (affects display grouping)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Infrastructure,
    Backend,
    Frontend,
    Mobile,
}

impl ServiceCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceCategory::Infrastructure => "infra",
            ServiceCategory::Backend => "backend",
            ServiceCategory::Frontend => "frontend",
            ServiceCategory::Mobile => "mobile",
        }
    }
}

/// How to determine whether a service is up
///
/// Opaque to the dashboard; only the runner interprets it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProbeSpec {
    /// Match running process command lines; every whitespace-separated
    /// token of `pattern` must appear
    Process { pattern: String },
    /// TCP connect to a local port
    Port { port: u16 },
}

/// Identifier for a command the dashboard can run
///
/// A closed set: the runner resolves each variant to a shell invocation
/// through a lookup table, so config files can only reference actions
/// that actually exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionId {
    StartAllServices,
    StopAllServices,
    BuildImages,
    RunTests,
    StartTilt,
    MobileDev,
    CleanAll,
}

/// A service shown on the Services tab
#[derive(Clone, Debug)]
pub struct ServiceEntry {
    pub name: String,
    /// Directory within the repo (informational)
    pub dir: String,
    pub category: ServiceCategory,
    pub status: ServiceStatus,
    /// Port the service listens on (informational)
    pub port: Option<u16>,
    pub description: String,
    pub probe: ProbeSpec,
}

/// A command shown on the Commands tab
#[derive(Clone, Debug)]
pub struct CommandEntry {
    pub name: String,
    pub description: String,
    /// Display grouping (free-form, e.g. "Build", "Testing")
    pub category: String,
    pub action: ActionId,
}

/// The full set of services and commands the dashboard knows about
#[derive(Clone, Debug)]
pub struct Catalog {
    /// Project name shown in the header
    pub name: String,
    pub services: Vec<ServiceEntry>,
    pub commands: Vec<CommandEntry>,
}

impl Catalog {
    /// The compiled-in catalog used when no config file is present
    pub fn builtin() -> Self {
        let services = vec![
            ServiceEntry {
                name: "message-broker".into(),
                dir: "common/services/message-broker".into(),
                category: ServiceCategory::Infrastructure,
                status: ServiceStatus::Unknown,
                port: Some(5672),
                description: "RabbitMQ message broker".into(),
                probe: ProbeSpec::Process {
                    pattern: "rabbitmq".into(),
                },
            },
            ServiceEntry {
                name: "maps-storage".into(),
                dir: "maps/services/storage".into(),
                category: ServiceCategory::Infrastructure,
                status: ServiceStatus::Unknown,
                port: Some(5432),
                description: "PostgreSQL storage for maps".into(),
                probe: ProbeSpec::Process {
                    pattern: "postgres haydov".into(),
                },
            },
            ServiceEntry {
                name: "geography-dispatcher".into(),
                dir: "services/geography/dispatcher".into(),
                category: ServiceCategory::Backend,
                status: ServiceStatus::Unknown,
                port: Some(8001),
                description: "Rust routing service".into(),
                probe: ProbeSpec::Process {
                    pattern: "geography dispatcher".into(),
                },
            },
            ServiceEntry {
                name: "geography-importer".into(),
                dir: "services/geography/importer".into(),
                category: ServiceCategory::Backend,
                status: ServiceStatus::Unknown,
                port: Some(8002),
                description: "Node.js data processing".into(),
                probe: ProbeSpec::Process {
                    pattern: "geography importer".into(),
                },
            },
            ServiceEntry {
                name: "mobile-app".into(),
                dir: "apps/mobile".into(),
                category: ServiceCategory::Mobile,
                status: ServiceStatus::Unknown,
                port: Some(8081),
                description: "Expo React Native app".into(),
                probe: ProbeSpec::Process {
                    pattern: "expo start".into(),
                },
            },
        ];

        let commands = vec![
            CommandEntry {
                name: "Start All Services".into(),
                description: "Start all development services".into(),
                category: "Services".into(),
                action: ActionId::StartAllServices,
            },
            CommandEntry {
                name: "Stop All Services".into(),
                description: "Stop all running services".into(),
                category: "Services".into(),
                action: ActionId::StopAllServices,
            },
            CommandEntry {
                name: "Build Docker Images".into(),
                description: "Build all Docker images for services".into(),
                category: "Build".into(),
                action: ActionId::BuildImages,
            },
            CommandEntry {
                name: "Run Tests".into(),
                description: "Run all tests (pnpm + cargo)".into(),
                category: "Testing".into(),
                action: ActionId::RunTests,
            },
            CommandEntry {
                name: "Start Tilt".into(),
                description: "Start Tilt development environment".into(),
                category: "Development".into(),
                action: ActionId::StartTilt,
            },
            CommandEntry {
                name: "Mobile Dev Server".into(),
                description: "Start Expo development server".into(),
                category: "Mobile".into(),
                action: ActionId::MobileDev,
            },
            CommandEntry {
                name: "Clean All".into(),
                description: "Clean all services and build artifacts".into(),
                category: "Maintenance".into(),
                action: ActionId::CleanAll,
            },
        ];

        Self {
            name: "Haydov Development Environment".into(),
            services,
            commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.services.len(), 5);
        assert_eq!(catalog.commands.len(), 7);

        // Every service starts out with an unknown status
        assert!(
            catalog
                .services
                .iter()
                .all(|s| s.status == ServiceStatus::Unknown)
        );

        let broker = &catalog.services[0];
        assert_eq!(broker.name, "message-broker");
        assert_eq!(broker.port, Some(5672));
        assert_eq!(broker.category, ServiceCategory::Infrastructure);
    }

    #[test]
    fn test_builtin_commands_are_unique() {
        let catalog = Catalog::builtin();
        let mut names: Vec<&str> = catalog.commands.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog.commands.len());
    }

    #[test]
    fn test_status_labels_and_icons() {
        assert_eq!(ServiceStatus::Running.label(), "running");
        assert_eq!(ServiceStatus::Stopped.icon(), "○");
        assert_eq!(ServiceStatus::Unknown.icon(), "?");
    }

    #[test]
    fn test_action_id_serde_names() {
        let yaml: ActionId = serde_yaml::from_str("run_tests").unwrap();
        assert_eq!(yaml, ActionId::RunTests);
        assert!(serde_yaml::from_str::<ActionId>("reboot_moon").is_err());
    }

    #[test]
    fn test_probe_spec_tagged_form() {
        let probe: ProbeSpec =
            serde_yaml::from_str("{ type: process, pattern: \"expo start\" }").unwrap();
        assert_eq!(
            probe,
            ProbeSpec::Process {
                pattern: "expo start".into()
            }
        );

        let probe: ProbeSpec = serde_yaml::from_str("{ type: port, port: 5432 }").unwrap();
        assert_eq!(probe, ProbeSpec::Port { port: 5432 });
    }
}

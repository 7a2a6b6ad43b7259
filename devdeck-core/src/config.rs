use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{
    ActionId, Catalog, CommandEntry, ProbeSpec, ServiceCategory, ServiceEntry, ServiceStatus,
};

/// Service definition in the config file
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Directory within the repo (informational)
    #[serde(default)]
    pub dir: Option<String>,

    #[serde(default = "default_category")]
    pub category: ServiceCategory,

    /// Port the service listens on (informational)
    #[serde(default)]
    pub port: Option<u16>,

    /// Description for display in the UI
    #[serde(default)]
    pub description: Option<String>,

    /// How to probe the service
    pub probe: ProbeSpec,
}

fn default_category() -> ServiceCategory {
    ServiceCategory::Backend
}

/// Command definition in the config file
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CommandConfig {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Display grouping
    #[serde(default = "default_command_category")]
    pub category: String,

    /// Symbolic action name, resolved by the runner
    pub action: ActionId,
}

fn default_command_category() -> String {
    "General".into()
}

/// Root configuration file structure
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DeckConfig {
    /// Config file version
    #[serde(default = "default_version")]
    pub version: String,

    /// Project name shown in the dashboard header
    #[serde(default)]
    pub name: Option<String>,

    /// Service definitions, keyed by service name
    pub services: BTreeMap<String, ServiceConfig>,

    /// Command definitions, in display order
    pub commands: Vec<CommandConfig>,
}

fn default_version() -> String {
    "1".into()
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    NoServices,
    NoCommands,
    DuplicateCommand { name: String },
    NotFound { searched: Vec<PathBuf> },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Yaml(e) => write!(f, "YAML parse error: {}", e),
            Self::NoServices => write!(f, "config defines no services"),
            Self::NoCommands => write!(f, "config defines no commands"),
            Self::DuplicateCommand { name } => {
                write!(f, "duplicate command name '{}'", name)
            }
            Self::NotFound { searched } => {
                write!(f, "no config file found, searched: {:?}", searched)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

impl DeckConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a string (useful for testing)
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: DeckConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Search for a config file in standard locations
    pub fn discover(start_dir: &Path) -> Result<(PathBuf, Self), ConfigError> {
        let names = ["devdeck.yaml", "devdeck.yml", ".devdeck.yaml", ".devdeck.yml"];
        let mut searched = Vec::new();

        // Check environment variable first
        if let Ok(env_path) = std::env::var("DEVDECK_CONFIG") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Ok((path.clone(), Self::load(&path)?));
            }
            searched.push(path);
        }

        // Search current directory and parents
        let mut dir = Some(start_dir);
        while let Some(current) = dir {
            for name in &names {
                let path = current.join(name);
                if path.exists() {
                    return Ok((path.clone(), Self::load(&path)?));
                }
                searched.push(path);
            }
            dir = current.parent();
        }

        Err(ConfigError::NotFound { searched })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.services.is_empty() {
            return Err(ConfigError::NoServices);
        }
        if self.commands.is_empty() {
            return Err(ConfigError::NoCommands);
        }

        let mut seen = std::collections::BTreeSet::new();
        for command in &self.commands {
            if !seen.insert(command.name.as_str()) {
                return Err(ConfigError::DuplicateCommand {
                    name: command.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Convert to the catalog the dashboard consumes
    ///
    /// Services come out sorted by name, commands in file order.
    pub fn to_catalog(&self) -> Catalog {
        let services = self
            .services
            .iter()
            .map(|(name, svc)| ServiceEntry {
                name: name.clone(),
                dir: svc.dir.clone().unwrap_or_default(),
                category: svc.category,
                status: ServiceStatus::Unknown,
                port: svc.port,
                description: svc.description.clone().unwrap_or_default(),
                probe: svc.probe.clone(),
            })
            .collect();

        let commands = self
            .commands
            .iter()
            .map(|cmd| CommandEntry {
                name: cmd.name.clone(),
                description: cmd.description.clone().unwrap_or_default(),
                category: cmd.category.clone(),
                action: cmd.action,
            })
            .collect();

        Catalog {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| "Development Environment".into()),
            services,
            commands,
        }
    }

    /// Starter config mirroring the compiled-in catalog, for `devdeck init`
    pub fn starter() -> Self {
        let catalog = Catalog::builtin();

        let services = catalog
            .services
            .iter()
            .map(|svc| {
                (
                    svc.name.clone(),
                    ServiceConfig {
                        dir: Some(svc.dir.clone()),
                        category: svc.category,
                        port: svc.port,
                        description: Some(svc.description.clone()),
                        probe: svc.probe.clone(),
                    },
                )
            })
            .collect();

        let commands = catalog
            .commands
            .iter()
            .map(|cmd| CommandConfig {
                name: cmd.name.clone(),
                description: Some(cmd.description.clone()),
                category: cmd.category.clone(),
                action: cmd.action,
            })
            .collect();

        Self {
            version: default_version(),
            name: Some(catalog.name),
            services,
            commands,
        }
    }
}

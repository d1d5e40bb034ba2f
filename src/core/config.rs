//! Operator configuration
//!
//! Loaded from `.hbt/config.yaml` in the project when present, otherwise
//! from the user config directory. Records created by the CLI default their
//! attribution (farmer, processor, manufacturer) from this config.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::project::Project;

/// Supply-chain roles an operator can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Farmer,
    Processor,
    Lab,
    Manufacturer,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Farmer => write!(f, "farmer"),
            Role::Processor => write!(f, "processor"),
            Role::Lab => write!(f, "lab"),
            Role::Manufacturer => write!(f, "manufacturer"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "farmer" => Some(Role::Farmer),
            "processor" => Some(Role::Processor),
            "lab" => Some(Role::Lab),
            "manufacturer" => Some(Role::Manufacturer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Operator name recorded on new entries
    pub operator: Option<String>,

    /// Stable operator id; derived from the name when absent
    pub operator_id: Option<String>,

    pub role: Option<Role>,
}

impl Config {
    /// Load configuration, preferring the project config over the user-level
    /// one. Unreadable config degrades to defaults.
    pub fn load(project: Option<&Project>) -> Self {
        if let Some(project) = project {
            if let Some(config) = Self::read(&project.config_path()) {
                return config;
            }
        }

        if let Some(dirs) = directories::ProjectDirs::from("", "", "hbt") {
            if let Some(config) = Self::read(&dirs.config_dir().join("config.yaml")) {
                return config;
            }
        }

        Self::default()
    }

    fn read(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str(&content).ok()
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = serde_yml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Operator name, falling back to $USER
    pub fn operator(&self) -> String {
        self.operator
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Stable operator id, derived from the name when not configured
    pub fn operator_id(&self) -> String {
        self.operator_id
            .clone()
            .unwrap_or_else(|| self.operator().to_lowercase().replace(' ', "-"))
    }
}

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::FormMode;

/// Application-level constants
pub const APP_NAME: &str = "LabSlip";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REPORT_CAPACITY: usize = 64;

/// Environment overrides.
pub const ENV_CONFIG: &str = "LABSLIP_CONFIG";
pub const ENV_ADDR: &str = "LABSLIP_ADDR";
pub const ENV_PORT: &str = "LABSLIP_PORT";
pub const ENV_FORM_MODE: &str = "LABSLIP_FORM_MODE";
pub const ENV_REPORT_CAPACITY: &str = "LABSLIP_REPORT_CAPACITY";

/// Filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "labslip_lib=info,labslip=info,tower_http=warn"
}

/// Get the configuration directory (`<config dir>/labslip`)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("labslip"))
}

/// Get the default configuration file path
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.json"))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

/// A person signing the printed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Signatory {
    pub name: String,
    pub qualification: String,
    pub title: String,
}

impl Default for Signatory {
    fn default() -> Self {
        Self {
            name: "Laboratory In-charge".into(),
            qualification: "D.M.T (Laboratory Medicine)".into(),
            title: "Medical Technologist (Lab)".into(),
        }
    }
}

/// Letterhead and footer of every printed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicProfile {
    pub facility_name: String,
    pub location: String,
    pub department: String,
    pub sample_type: String,
    pub signatories: Vec<Signatory>,
}

impl Default for ClinicProfile {
    fn default() -> Self {
        Self {
            facility_name: "Upazila Health Complex".into(),
            location: "Banaripara, Barishal".into(),
            department: "Laboratory Services".into(),
            sample_type: "Blood".into(),
            signatories: vec![
                Signatory::default(),
                Signatory {
                    name: "Duty Technologist".into(),
                    ..Signatory::default()
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub form_mode: FormMode,
    /// Reports kept in memory for the print view; oldest evicted first.
    pub report_capacity: usize,
    pub clinic: ClinicProfile,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            form_mode: FormMode::Multiple,
            report_capacity: DEFAULT_REPORT_CAPACITY,
            clinic: ClinicProfile::default(),
        }
    }
}

impl AppConfig {
    /// Load from `LABSLIP_CONFIG` or the default path (if present), then
    /// apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(ENV_CONFIG)
            .map(PathBuf::from)
            .or_else(default_config_path);
        let mut config = match path {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn invalid(key: &'static str, value: String) -> ConfigError {
            ConfigError::InvalidEnv { key, value }
        }

        if let Some(value) = lookup(ENV_ADDR) {
            self.bind_addr = value.parse().map_err(|_| invalid(ENV_ADDR, value))?;
        }
        if let Some(value) = lookup(ENV_PORT) {
            self.port = value.parse().map_err(|_| invalid(ENV_PORT, value))?;
        }
        if let Some(value) = lookup(ENV_FORM_MODE) {
            self.form_mode = value.parse().map_err(|_| invalid(ENV_FORM_MODE, value))?;
        }
        if let Some(value) = lookup(ENV_REPORT_CAPACITY) {
            match value.parse::<usize>() {
                Ok(n) if n > 0 => self.report_capacity = n,
                _ => return Err(invalid(ENV_REPORT_CAPACITY, value)),
            }
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

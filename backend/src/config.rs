//! Application configuration.
//!
//! Loaded from a YAML file (path in `MHAAS_CONFIG`, default
//! `mhaas.yaml`); a missing file means defaults, which run the service
//! against a local data directory with the console notifier. Provider
//! credentials belong in the config file, not in code.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::notifier::{ConsoleNotifier, Notifier, ProviderNotifier, SmsConfig, SmtpConfig};

pub const CONFIG_PATH_ENV: &str = "MHAAS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "mhaas.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the CSV collections
    pub data_dir: PathBuf,
    /// Address the REST listener binds to
    pub bind_addr: String,
    /// Minutes between reminder dispatch passes
    pub reminder_interval_minutes: u64,
    /// Local hour of day the tip generation pass runs at
    pub tip_generation_hour: u32,
    /// Use configured providers instead of the console notifier
    pub live_notifications: bool,
    pub smtp: Option<SmtpConfig>,
    pub sms: Option<SmsConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            bind_addr: "127.0.0.1:5000".to_string(),
            reminder_interval_minutes: 14,
            tip_generation_hour: 6,
            live_notifications: false,
            smtp: None,
            sms: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the path in `MHAAS_CONFIG`, falling back
    /// to `mhaas.yaml`, falling back to defaults when neither exists.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Config file {} not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Build the notifier this configuration asks for.
    pub fn build_notifier(&self) -> Result<Arc<dyn Notifier>> {
        if self.live_notifications {
            info!("Using live notification providers");
            Ok(Arc::new(ProviderNotifier::new(
                self.smtp.clone(),
                self.sms.clone(),
            )?))
        } else {
            info!("Using console notifier (live_notifications is off)");
            Ok(Arc::new(ConsoleNotifier))
        }
    }
}

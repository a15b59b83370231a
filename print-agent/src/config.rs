//! Agent configuration
//!
//! Stored as JSON in the agent data directory
//! (`$PRINT_AGENT_DIR`, `%APPDATA%\DeliveryPrintAgent` or
//! `~/.delivery-print-agent`). Loading merges the file over defaults;
//! a missing or broken file never prevents startup.

use crate::queue::ReceiptDefaults;
use serde::{Deserialize, Serialize};
use shared::PrinterConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Agent configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Event channel address (host:port)
    pub server_url: String,
    /// Agent token issued by the admin panel
    pub token: String,
    pub auto_start: bool,
    /// Company header used when the order carries none
    pub header_name: String,
    pub header_city: String,
    /// Company-wide receipt template, used by printers without their own
    pub receipt_template: Option<String>,
    pub printers: Vec<PrinterConfig>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            token: String::new(),
            auto_start: true,
            header_name: String::new(),
            header_city: String::new(),
            receipt_template: None,
            printers: Vec::new(),
        }
    }
}

/// Agent data directory
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PRINT_AGENT_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(appdata) = std::env::var("APPDATA") {
        return Path::new(&appdata).join("DeliveryPrintAgent");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".delivery-print-agent")
}

/// Path of the configuration file
pub fn config_file() -> PathBuf {
    config_dir().join("config.json")
}

impl AgentConfig {
    pub fn load() -> Self {
        Self::load_from(&config_file())
    }

    /// Load from an explicit path; missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::error!(error = %e, path = %path.display(), "config parse failed, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Company-wide fallbacks handed to the job queue
    pub fn receipt_defaults(&self) -> ReceiptDefaults {
        let non_empty = |s: &String| {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        };
        ReceiptDefaults {
            header_name: non_empty(&self.header_name),
            header_city: non_empty(&self.header_city),
            template: self.receipt_template.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let cfg = AgentConfig::load_from(Path::new("/nonexistent/config.json"));
        assert!(cfg.server_url.is_empty());
        assert!(cfg.auto_start);
        assert!(cfg.printers.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let cfg = AgentConfig {
            server_url: "backend.example.com:8085".to_string(),
            token: "tok-123".to_string(),
            header_name: "Pizzaria do Zé".to_string(),
            printers: vec![PrinterConfig::network("Cozinha", "192.168.0.50", 9100)],
            ..Default::default()
        };
        cfg.save_to(&path).unwrap();

        let loaded = AgentConfig::load_from(&path);
        assert_eq!(loaded.server_url, "backend.example.com:8085");
        assert_eq!(loaded.header_name, "Pizzaria do Zé");
        assert_eq!(loaded.printers.len(), 1);
        assert_eq!(loaded.printers[0].alias, "Cozinha");
    }

    #[test]
    fn test_receipt_defaults_skip_empty() {
        let cfg = AgentConfig {
            header_name: "Loja".to_string(),
            ..Default::default()
        };
        let defaults = cfg.receipt_defaults();
        assert_eq!(defaults.header_name.as_deref(), Some("Loja"));
        assert!(defaults.header_city.is_none());
        assert!(defaults.template.is_none());
    }
}

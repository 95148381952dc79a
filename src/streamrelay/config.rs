use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Serialize, Deserialize};
use crate::error::{RelayError, ErrorCode};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub server: ServerSection,
    pub store: StoreSection,
    pub delivery: DeliverySection,
    pub subscriptions: SubscriptionSection,
    pub console: ConsoleSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub addr: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { addr: "0.0.0.0:8090".to_string() }
    }
}

/// Where subscriber sets are persisted; no path keeps them in memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliverySection {
    pub timeout_ms: u64,
}

impl Default for DeliverySection {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

impl DeliverySection {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionSection {
    pub trigger: String,
    /// Lowercase topics on subscribe, matching the dispatch-side lookup
    pub normalize_topics: bool,
}

impl Default for SubscriptionSection {
    fn default() -> Self {
        Self {
            trigger: "/twitch".to_string(),
            normalize_topics: true,
        }
    }
}

/// Identity used for commands typed on stdin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSection {
    pub handle: String,
    pub group: bool,
}

impl Default for ConsoleSection {
    fn default() -> Self {
        Self {
            handle: "console".to_string(),
            group: false,
        }
    }
}

impl RelayConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, RelayError> {
        let content = fs::read_to_string(path)
            .map_err(|e| RelayError::new(ErrorCode::ConfigInvalid, format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RelayError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| RelayError::new(ErrorCode::ConfigInvalid, format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), RelayError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RelayError::new(ErrorCode::ConfigInvalid, format!("Failed to serialize to TOML: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| RelayError::new(ErrorCode::ConfigInvalid, format!("Failed to write config file: {}", e)))
    }

    fn validate(&self) -> Result<(), RelayError> {
        if self.delivery.timeout_ms == 0 {
            return Err(RelayError::new(ErrorCode::ConfigInvalid, "delivery.timeout_ms must be positive"));
        }
        if self.subscriptions.trigger.is_empty() || self.subscriptions.trigger.contains(',') {
            return Err(RelayError::new(
                ErrorCode::ConfigInvalid,
                "subscriptions.trigger must be non-empty and contain no comma",
            ));
        }
        Ok(())
    }
}

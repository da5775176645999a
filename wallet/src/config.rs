// wallet/src/config.rs
use crate::errors::WalletError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Receive addresses scanned per recovery when no range is given.
pub const DEFAULT_SCAN_FACTOR: u32 = 20;

/// Widest range a single consolidation recovery may cover.
pub const MAX_SCAN_RANGE: u32 = 10 * DEFAULT_SCAN_FACTOR;

/// Recovery settings for one node endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// JSON-RPC endpoint of a full node
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Network name, used for display and address formatting
    #[serde(default = "default_network")]
    pub network: String,

    /// Addresses scanned by `recover` when no count is given
    #[serde(default = "default_scan_factor")]
    pub scan_factor: u32,

    /// Mortality window of sweep transactions, in blocks
    #[serde(default = "default_max_validity_duration")]
    pub max_validity_duration: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:9933".to_string()
}

fn default_network() -> String {
    "westend".to_string()
}

fn default_scan_factor() -> u32 {
    DEFAULT_SCAN_FACTOR
}

fn default_max_validity_duration() -> u64 {
    2400
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            network: default_network(),
            scan_factor: default_scan_factor(),
            max_validity_duration: default_max_validity_duration(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl WalletConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let data = std::fs::read(path.as_ref())?;
        let config: Self = serde_json::from_slice(&data)?;
        config.validate().map_err(WalletError::Config)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.rpc_url.trim().is_empty() {
            return Err("rpc_url must not be empty".to_string());
        }
        if self.scan_factor == 0 {
            return Err("scan_factor must be at least 1".to_string());
        }
        if self.scan_factor > MAX_SCAN_RANGE {
            return Err(format!(
                "scan_factor {} exceeds the maximum range of {}",
                self.scan_factor, MAX_SCAN_RANGE
            ));
        }
        if self.max_validity_duration == 0 {
            return Err("max_validity_duration must be at least 1".to_string());
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::AssetError;
use crate::id::TransactionId;

/// Endpoint addresses and asset metadata for one pipeline run
///
/// Defaults carry the well-known mainnet endpoints; a TOML file can override
/// any subset of fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Public gateway used to resolve published content
    pub gateway_url: String,
    /// Ledger transaction submission endpoint
    pub ledger_submit_url: String,
    /// Bundling relay node
    pub bundler_url: String,
    /// Contract deployment endpoint (registration POST target)
    pub deploy_url: String,
    /// Read endpoint for current contract state
    pub contract_state_url: String,

    /// The contract whose holder distribution seeds new asset ownership
    pub contract_ref: String,
    /// Source transaction of the asset contract code
    pub contract_src: String,
    /// Grouping/pool reference stamped on every asset
    pub pool_id: String,

    pub app_name: String,
    pub app_version: String,

    /// Descriptive fields written into the asset's initial state
    pub asset_name: String,
    pub asset_title: String,
    pub asset_description: String,

    /// Bounded timeout applied to every network round trip
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_url: "https://arweave.net".to_string(),
            ledger_submit_url: "https://arweave.net/tx".to_string(),
            bundler_url: "https://node2.bundlr.network".to_string(),
            deploy_url: "https://gateway.redstone.finance/gateway/contracts/deploy".to_string(),
            contract_state_url: "https://gateway.redstone.finance/gateway/contract-state"
                .to_string(),
            contract_ref: "t6AAwEvvR-dbp_1FrSfJQsruLraJCobKl9qsJh9yb2M".to_string(),
            contract_src: "eLUFzkrDnqXRdmBZtSgz1Bgy8nKC8ED3DoC__PaBJj8".to_string(),
            pool_id: "CCobTPEONmH0OaQvGYt47sIif-9F78Y2r1weg3X2owc".to_string(),
            app_name: "SmartWeaveContract".to_string(),
            app_version: "0.3.0".to_string(),
            asset_name: "Atomic Asset".to_string(),
            asset_title: "Atomic Asset".to_string(),
            asset_description: "Content archived as an atomic asset".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults for
    /// any field the file omits
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Public URL where published content can be resolved
    pub fn resource_url(&self, id: TransactionId) -> String {
        format!("{}/{}", self.gateway_url.trim_end_matches('/'), id)
    }
}

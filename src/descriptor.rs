use chrono::Utc;
use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clients::ContractStateProvider;
use crate::config::Config;
use crate::error::AssetError;
use crate::id::TransactionId;
use crate::selector::select_holder;
use crate::tx::Tag;

/// MIME type of the path manifest itself
pub const MANIFEST_CONTENT_TYPE: &str = "application/x.arweave-manifest+json";

/// The unit passed from builder to dispatcher to registrar: manifest bytes
/// plus the full ordered tag list of the new asset
#[derive(Debug, Clone)]
pub struct AssetDescriptor {
    pub data: Vec<u8>,
    pub tags: Vec<Tag>,
}

impl AssetDescriptor {
    /// The value of the first tag with the given name, if present
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }
}

/// Path manifest pointing at the published base content
///
/// The manifest has exactly one path entry, `index.html`, whose id is the
/// base content transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathManifest {
    pub manifest: String,
    pub version: String,
    pub index: ManifestIndex,
    pub paths: IndexMap<String, ManifestPath>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestIndex {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestPath {
    pub id: TransactionId,
}

impl PathManifest {
    fn for_content(base_content_id: TransactionId) -> Self {
        let mut paths = IndexMap::new();
        paths.insert("index.html".to_string(), ManifestPath { id: base_content_id });
        Self {
            manifest: "arweave/paths".to_string(),
            version: "0.1.0".to_string(),
            index: ManifestIndex {
                path: "index.html".to_string(),
            },
            paths,
        }
    }
}

/// Serialized into the `Init-State` tag: the contract-visible initial
/// ownership record of the new asset
///
/// Invariant: `balances` always sums to exactly `max_supply`, and both are 1.
/// The asset is single-owner and non-fractional by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitState {
    pub ticker: String,
    pub balances: IndexMap<String, u64>,
    pub content_type: String,
    pub description: String,
    pub last_transfer_timestamp: Option<u64>,
    pub lock_time: u64,
    pub max_supply: u64,
    pub name: String,
    pub title: String,
    pub transferable: bool,
}

impl InitState {
    pub fn balances_total(&self) -> u64 {
        self.balances.values().sum()
    }
}

/// Assembles the asset descriptor for a freshly published piece of content
pub struct DescriptorBuilder<'a> {
    config: &'a Config,
    state_provider: &'a dyn ContractStateProvider,
}

impl<'a> DescriptorBuilder<'a> {
    pub fn new(config: &'a Config, state_provider: &'a dyn ContractStateProvider) -> Self {
        Self {
            config,
            state_provider,
        }
    }

    /// Build the manifest and tag list for a new asset
    ///
    /// Queries current contract state, selects the initial holder by
    /// balance weight, and assembles the fixed-shape tag list. Fails with
    /// `StateQuery` if the state read fails and `Distribution` if no holder
    /// can be selected.
    pub async fn build<R: Rng + Send + ?Sized>(
        &self,
        base_content_id: TransactionId,
        asset_type: &str,
        content_type: &str,
        rng: &mut R,
    ) -> Result<AssetDescriptor, AssetError> {
        let state = self
            .state_provider
            .query_state(&self.config.contract_ref)
            .await?;
        let selected = select_holder(&state.holders, state.total_supply, rng)?;
        debug!(holder = %selected, total_supply = state.total_supply, "selected initial holder");

        let manifest = PathManifest::for_content(base_content_id);

        let mut balances = IndexMap::new();
        balances.insert(selected, 1);
        let init_state = InitState {
            ticker: format!("ATOMIC-ASSET-{}", base_content_id),
            balances,
            content_type: content_type.to_string(),
            description: self.config.asset_description.clone(),
            last_transfer_timestamp: None,
            lock_time: 0,
            max_supply: 1,
            name: self.config.asset_name.clone(),
            title: self.config.asset_title.clone(),
            transferable: true,
        };

        let tags = vec![
            Tag::new("App-Name", &self.config.app_name),
            Tag::new("App-Version", &self.config.app_version),
            Tag::new("Content-Type", MANIFEST_CONTENT_TYPE),
            Tag::new("Contract-Src", &self.config.contract_src),
            Tag::new("Pool-Id", &self.config.pool_id),
            Tag::new(
                "Artefact-Name",
                format!("{} - {}", self.config.asset_name, base_content_id),
            ),
            Tag::new("Created-At", Utc::now().timestamp_millis().to_string()),
            Tag::new("Type", asset_type),
            Tag::new("Init-State", serde_json::to_string(&init_state)?),
        ];

        Ok(AssetDescriptor {
            data: serde_json::to_vec(&manifest)?,
            tags,
        })
    }
}

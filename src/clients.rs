use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::error::AssetError;
use crate::id::TransactionId;
use crate::tx::Transaction;

/// Current holder distribution of the source contract
///
/// `holders` keeps insertion order (the order the state endpoint reported)
/// so weighted selection iterates a stable sequence. `total_supply` is
/// supplied by the contract state and trusted as given, never re-derived
/// from the balances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractState {
    #[serde(rename = "tokens")]
    pub holders: IndexMap<String, u64>,
    #[serde(rename = "totalSupply")]
    pub total_supply: u64,
}

/// Read access to a contract's current state
///
/// A stale or cached snapshot is acceptable; no freshness guarantee is
/// required of implementations.
#[async_trait]
pub trait ContractStateProvider: Send + Sync {
    async fn query_state(&self, contract_ref: &str) -> Result<ContractState, AssetError>;
}

/// Transaction submission endpoint of the ledger
#[async_trait]
pub trait LedgerEndpoint: Send + Sync {
    /// Submit a signed transaction; the ledger acknowledges without a body
    async fn submit(&self, tx: &Transaction) -> Result<(), AssetError>;
}

/// Bundling relay that aggregates transactions for batched ledger submission
#[async_trait]
pub trait BundlingRelay: Send + Sync {
    /// Upload a signed transaction payload, returning the id the relay
    /// issued for it
    async fn upload(&self, tx: &Transaction) -> Result<TransactionId, AssetError>;
}

/// Contract-registration endpoint
#[async_trait]
pub trait ContractDeployEndpoint: Send + Sync {
    /// Post a signed contract transaction for registration
    async fn deploy(&self, contract_tx: &Transaction) -> Result<(), AssetError>;
}

// ---------------------------------------------------------------------------
// HTTP implementations
// ---------------------------------------------------------------------------

/// Contract state read over the gateway's state endpoint
pub struct HttpStateProvider {
    client: reqwest::Client,
    state_url: String,
}

impl HttpStateProvider {
    pub fn new(client: reqwest::Client, state_url: impl Into<String>) -> Self {
        Self {
            client,
            state_url: state_url.into(),
        }
    }
}

#[async_trait]
impl ContractStateProvider for HttpStateProvider {
    async fn query_state(&self, contract_ref: &str) -> Result<ContractState, AssetError> {
        let url = format!("{}/{}", self.state_url.trim_end_matches('/'), contract_ref);
        let state = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AssetError::StateQuery(e.to_string()))?
            .json::<ContractState>()
            .await
            .map_err(|e| AssetError::StateQuery(e.to_string()))?;
        Ok(state)
    }
}

/// Ledger submission over HTTP POST
pub struct HttpLedgerEndpoint {
    client: reqwest::Client,
    submit_url: String,
}

impl HttpLedgerEndpoint {
    pub fn new(client: reqwest::Client, submit_url: impl Into<String>) -> Self {
        Self {
            client,
            submit_url: submit_url.into(),
        }
    }
}

#[async_trait]
impl LedgerEndpoint for HttpLedgerEndpoint {
    async fn submit(&self, tx: &Transaction) -> Result<(), AssetError> {
        self.client
            .post(&self.submit_url)
            .json(tx)
            .send()
            .await
            .and_then(|r| r.error_for_status())?;
        Ok(())
    }
}

/// Relay upload acknowledgment body
#[derive(Debug, Deserialize)]
struct UploadAck {
    id: TransactionId,
}

/// Bundling relay client
pub struct HttpBundlingRelay {
    client: reqwest::Client,
    node_url: String,
}

impl HttpBundlingRelay {
    pub fn new(client: reqwest::Client, node_url: impl Into<String>) -> Self {
        Self {
            client,
            node_url: node_url.into(),
        }
    }
}

#[async_trait]
impl BundlingRelay for HttpBundlingRelay {
    async fn upload(&self, tx: &Transaction) -> Result<TransactionId, AssetError> {
        let url = format!("{}/tx", self.node_url.trim_end_matches('/'));
        let ack = self
            .client
            .post(&url)
            .json(tx)
            .send()
            .await
            .and_then(|r| r.error_for_status())?
            .json::<UploadAck>()
            .await?;
        Ok(ack.id)
    }
}

/// Registration POST body: `{"contractTx": <signed transaction>}`
#[derive(Debug, Serialize)]
struct DeployRequest<'a> {
    #[serde(rename = "contractTx")]
    contract_tx: &'a Transaction,
}

/// Contract deployment endpoint client
pub struct HttpDeployEndpoint {
    client: reqwest::Client,
    deploy_url: String,
}

impl HttpDeployEndpoint {
    pub fn new(client: reqwest::Client, deploy_url: impl Into<String>) -> Self {
        Self {
            client,
            deploy_url: deploy_url.into(),
        }
    }
}

#[async_trait]
impl ContractDeployEndpoint for HttpDeployEndpoint {
    async fn deploy(&self, contract_tx: &Transaction) -> Result<(), AssetError> {
        // The response body is not inspected, but the status is: a non-2xx
        // answer means the registration did not happen.
        self.client
            .post(&self.deploy_url)
            .json(&DeployRequest { contract_tx })
            .send()
            .await
            .and_then(|r| r.error_for_status())?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Mock implementations for testing purposes
// ---------------------------------------------------------------------------

/// Mock state provider answering with a fixed snapshot
pub struct MockStateProvider {
    state: ContractState,
    fail: bool,
}

impl MockStateProvider {
    /// Answer every query with the given snapshot
    pub fn new(state: ContractState) -> Self {
        Self { state, fail: false }
    }

    /// Fail every query with a `StateQuery` error
    pub fn failing() -> Self {
        Self {
            state: ContractState {
                holders: IndexMap::new(),
                total_supply: 0,
            },
            fail: true,
        }
    }
}

#[async_trait]
impl ContractStateProvider for MockStateProvider {
    async fn query_state(&self, _contract_ref: &str) -> Result<ContractState, AssetError> {
        if self.fail {
            return Err(AssetError::StateQuery("mock state query failure".to_string()));
        }
        Ok(self.state.clone())
    }
}

/// Mock ledger endpoint recording every submitted transaction
pub struct MockLedgerEndpoint {
    pub submitted: Mutex<Vec<Transaction>>,
    fail: bool,
}

impl MockLedgerEndpoint {
    pub fn new() -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Simulate a network failure on every submission
    pub fn failing() -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn submitted_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }
}

impl Default for MockLedgerEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerEndpoint for MockLedgerEndpoint {
    async fn submit(&self, tx: &Transaction) -> Result<(), AssetError> {
        if self.fail {
            return Err(AssetError::Http("mock ledger connection refused".to_string()));
        }
        self.submitted.lock().unwrap().push(tx.clone());
        Ok(())
    }
}

/// Mock bundling relay that issues the transaction's own id, recording uploads
pub struct MockBundlingRelay {
    pub uploaded: Mutex<Vec<Transaction>>,
    fail: bool,
}

impl MockBundlingRelay {
    pub fn new() -> Self {
        Self {
            uploaded: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            uploaded: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn uploaded_count(&self) -> usize {
        self.uploaded.lock().unwrap().len()
    }
}

impl Default for MockBundlingRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BundlingRelay for MockBundlingRelay {
    async fn upload(&self, tx: &Transaction) -> Result<TransactionId, AssetError> {
        if self.fail {
            return Err(AssetError::Http("mock relay unreachable".to_string()));
        }
        self.uploaded.lock().unwrap().push(tx.clone());
        Ok(tx.id)
    }
}

/// Mock deployment endpoint recording every registration
pub struct MockDeployEndpoint {
    pub deployed: Mutex<Vec<Transaction>>,
    fail: bool,
}

impl MockDeployEndpoint {
    pub fn new() -> Self {
        Self {
            deployed: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            deployed: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn deployed_count(&self) -> usize {
        self.deployed.lock().unwrap().len()
    }
}

impl Default for MockDeployEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContractDeployEndpoint for MockDeployEndpoint {
    async fn deploy(&self, contract_tx: &Transaction) -> Result<(), AssetError> {
        if self.fail {
            return Err(AssetError::Http("mock deploy endpoint returned 500".to_string()));
        }
        self.deployed.lock().unwrap().push(contract_tx.clone());
        Ok(())
    }
}

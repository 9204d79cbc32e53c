use rand::Rng;
use tracing::{info, warn};

use crate::clients::{BundlingRelay, ContractDeployEndpoint, ContractStateProvider, LedgerEndpoint};
use crate::config::Config;
use crate::content::Content;
use crate::descriptor::DescriptorBuilder;
use crate::dispatcher::BundleDispatcher;
use crate::error::{AtomicAssetCreationError, PipelineStage};
use crate::id::TransactionId;
use crate::publisher::ContentPublisher;
use crate::registrar::ContractRegistrar;
use crate::wallet::Wallet;

/// The identifiers of a successfully created atomic asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedAsset {
    /// Ledger transaction holding the raw content, referenced by the
    /// asset's manifest
    pub base_content_id: TransactionId,
    /// The single id shared by the bundled transaction and the
    /// registration transaction
    pub atomic_id: TransactionId,
}

/// Sequences the four stages that turn content into an atomic asset
///
/// publish -> build -> dispatch -> register, strictly sequential; each
/// stage's output is the next stage's required input. A failure at publish,
/// build, or dispatch aborts the run. A registration failure is logged and
/// swallowed: the asset already exists under its atomic id at that point,
/// so the run still reports success.
pub struct AssetPipeline<'a> {
    config: &'a Config,
    wallet: &'a Wallet,
    ledger: &'a dyn LedgerEndpoint,
    state_provider: &'a dyn ContractStateProvider,
    relay: &'a dyn BundlingRelay,
    deploy: &'a dyn ContractDeployEndpoint,
}

impl<'a> AssetPipeline<'a> {
    pub fn new(
        config: &'a Config,
        wallet: &'a Wallet,
        ledger: &'a dyn LedgerEndpoint,
        state_provider: &'a dyn ContractStateProvider,
        relay: &'a dyn BundlingRelay,
        deploy: &'a dyn ContractDeployEndpoint,
    ) -> Self {
        Self {
            config,
            wallet,
            ledger,
            state_provider,
            relay,
            deploy,
        }
    }

    /// Run the full creation pipeline for one piece of content
    pub async fn create_atomic_asset<R: Rng + Send + ?Sized>(
        &self,
        content: &Content,
        asset_type: &str,
        rng: &mut R,
    ) -> Result<CreatedAsset, AtomicAssetCreationError> {
        let publisher = ContentPublisher::new(self.wallet, self.ledger);
        let base_content_id = publisher
            .publish(content)
            .await
            .map_err(|e| AtomicAssetCreationError::new(PipelineStage::ContentPublish, e))?;

        let builder = DescriptorBuilder::new(self.config, self.state_provider);
        let descriptor = builder
            .build(base_content_id, asset_type, &content.content_type, rng)
            .await
            .map_err(|e| AtomicAssetCreationError::new(PipelineStage::DescriptorBuild, e))?;

        let dispatcher = BundleDispatcher::new(self.wallet, self.relay);
        let atomic_id = dispatcher
            .dispatch(&descriptor)
            .await
            .map_err(|e| AtomicAssetCreationError::new(PipelineStage::BundleDispatch, e))?;

        // The asset is already addressable under atomic_id; a registration
        // failure degrades indexing but does not undo creation.
        let registrar = ContractRegistrar::new(self.wallet, self.deploy);
        if let Err(err) = registrar.register(atomic_id, &descriptor).await {
            warn!(%atomic_id, error = %err, "contract registration failed, asset remains addressable");
        }

        info!(%base_content_id, %atomic_id, "atomic asset created");
        Ok(CreatedAsset {
            base_content_id,
            atomic_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{
        ContractState, MockBundlingRelay, MockDeployEndpoint, MockLedgerEndpoint,
        MockStateProvider,
    };
    use crate::error::AssetError;
    use crate::wallet::tests::test_wallet;
    use indexmap::IndexMap;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state() -> ContractState {
        let mut holders = IndexMap::new();
        holders.insert("alice".to_string(), 3);
        holders.insert("bob".to_string(), 7);
        ContractState {
            holders,
            total_supply: 10,
        }
    }

    fn content() -> Content {
        Content::new(b"<html>page</html>".to_vec(), "text/html")
    }

    #[tokio::test]
    async fn test_successful_run_threads_one_atomic_id() {
        let config = Config::default();
        let wallet = test_wallet();
        let ledger = MockLedgerEndpoint::new();
        let provider = MockStateProvider::new(state());
        let relay = MockBundlingRelay::new();
        let deploy = MockDeployEndpoint::new();
        let pipeline = AssetPipeline::new(&config, &wallet, &ledger, &provider, &relay, &deploy);
        let mut rng = StdRng::seed_from_u64(0);

        let created = pipeline
            .create_atomic_asset(&content(), "web-page", &mut rng)
            .await
            .unwrap();

        // every service saw exactly one transaction
        assert_eq!(ledger.submitted_count(), 1);
        assert_eq!(relay.uploaded_count(), 1);
        assert_eq!(deploy.deployed_count(), 1);

        // the bundled and registration transactions share the atomic id
        let uploaded = relay.uploaded.lock().unwrap();
        let deployed = deploy.deployed.lock().unwrap();
        assert_eq!(uploaded[0].id, created.atomic_id);
        assert_eq!(deployed[0].id, created.atomic_id);

        // the base content transaction is a distinct id referenced by the
        // dispatched manifest
        let submitted = ledger.submitted.lock().unwrap();
        assert_eq!(submitted[0].id, created.base_content_id);
        assert_ne!(created.base_content_id, created.atomic_id);
        let manifest_json = String::from_utf8(uploaded[0].data.clone()).unwrap();
        assert!(manifest_json.contains(&created.base_content_id.to_string()));
    }

    #[tokio::test]
    async fn test_publish_failure_aborts_before_dispatch() {
        let config = Config::default();
        let wallet = test_wallet();
        let ledger = MockLedgerEndpoint::failing();
        let provider = MockStateProvider::new(state());
        let relay = MockBundlingRelay::new();
        let deploy = MockDeployEndpoint::new();
        let pipeline = AssetPipeline::new(&config, &wallet, &ledger, &provider, &relay, &deploy);
        let mut rng = StdRng::seed_from_u64(0);

        let err = pipeline
            .create_atomic_asset(&content(), "web-page", &mut rng)
            .await
            .unwrap_err();

        assert_eq!(err.stage, PipelineStage::ContentPublish);
        assert!(matches!(err.source, AssetError::Publish(_)));
        assert_eq!(relay.uploaded_count(), 0);
        assert_eq!(deploy.deployed_count(), 0);
    }

    #[tokio::test]
    async fn test_state_query_failure_aborts_at_build() {
        let config = Config::default();
        let wallet = test_wallet();
        let ledger = MockLedgerEndpoint::new();
        let provider = MockStateProvider::failing();
        let relay = MockBundlingRelay::new();
        let deploy = MockDeployEndpoint::new();
        let pipeline = AssetPipeline::new(&config, &wallet, &ledger, &provider, &relay, &deploy);
        let mut rng = StdRng::seed_from_u64(0);

        let err = pipeline
            .create_atomic_asset(&content(), "web-page", &mut rng)
            .await
            .unwrap_err();

        assert_eq!(err.stage, PipelineStage::DescriptorBuild);
        assert!(matches!(err.source, AssetError::StateQuery(_)));
        assert_eq!(relay.uploaded_count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_failure_aborts_before_registration() {
        let config = Config::default();
        let wallet = test_wallet();
        let ledger = MockLedgerEndpoint::new();
        let provider = MockStateProvider::new(state());
        let relay = MockBundlingRelay::failing();
        let deploy = MockDeployEndpoint::new();
        let pipeline = AssetPipeline::new(&config, &wallet, &ledger, &provider, &relay, &deploy);
        let mut rng = StdRng::seed_from_u64(0);

        let err = pipeline
            .create_atomic_asset(&content(), "web-page", &mut rng)
            .await
            .unwrap_err();

        assert_eq!(err.stage, PipelineStage::BundleDispatch);
        assert!(matches!(err.source, AssetError::Dispatch(_)));
        assert_eq!(deploy.deployed_count(), 0);
    }

    #[tokio::test]
    async fn test_registration_failure_still_reports_success() {
        let config = Config::default();
        let wallet = test_wallet();
        let ledger = MockLedgerEndpoint::new();
        let provider = MockStateProvider::new(state());
        let relay = MockBundlingRelay::new();
        let deploy = MockDeployEndpoint::failing();
        let pipeline = AssetPipeline::new(&config, &wallet, &ledger, &provider, &relay, &deploy);
        let mut rng = StdRng::seed_from_u64(0);

        let created = pipeline
            .create_atomic_asset(&content(), "web-page", &mut rng)
            .await
            .unwrap();

        let uploaded = relay.uploaded.lock().unwrap();
        assert_eq!(created.atomic_id, uploaded[0].id);
        assert_eq!(deploy.deployed_count(), 0);
    }
}

use tracing::info;

use crate::clients::BundlingRelay;
use crate::descriptor::AssetDescriptor;
use crate::error::AssetError;
use crate::id::TransactionId;
use crate::tx::Transaction;
use crate::wallet::Wallet;

/// Uploads the asset descriptor through the bundling relay
pub struct BundleDispatcher<'a> {
    wallet: &'a Wallet,
    relay: &'a dyn BundlingRelay,
}

impl<'a> BundleDispatcher<'a> {
    pub fn new(wallet: &'a Wallet, relay: &'a dyn BundlingRelay) -> Self {
        Self { wallet, relay }
    }

    /// Sign a relay-native transaction over the descriptor and upload it
    ///
    /// The id issued here is the canonical atomic id of the whole asset:
    /// the registration transaction is later bound to the same value.
    pub async fn dispatch(&self, descriptor: &AssetDescriptor) -> Result<TransactionId, AssetError> {
        let mut tx = Transaction::new(descriptor.data.clone(), descriptor.tags.clone());
        tx.sign(self.wallet);

        let atomic_id = self
            .relay
            .upload(&tx)
            .await
            .map_err(|e| AssetError::Dispatch(e.to_string()))?;

        info!(%atomic_id, "dispatched asset descriptor to bundling relay");
        Ok(atomic_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockBundlingRelay;
    use crate::tx::Tag;
    use crate::wallet::tests::test_wallet;

    fn descriptor() -> AssetDescriptor {
        AssetDescriptor {
            data: b"{\"manifest\":\"arweave/paths\"}".to_vec(),
            tags: vec![Tag::new("Type", "web-page")],
        }
    }

    #[tokio::test]
    async fn test_dispatch_uploads_descriptor_and_returns_relay_id() {
        let wallet = test_wallet();
        let relay = MockBundlingRelay::new();
        let dispatcher = BundleDispatcher::new(&wallet, &relay);

        let atomic_id = dispatcher.dispatch(&descriptor()).await.unwrap();

        let uploaded = relay.uploaded.lock().unwrap();
        assert_eq!(uploaded.len(), 1);
        assert_eq!(uploaded[0].id, atomic_id);
        assert_eq!(uploaded[0].data, descriptor().data);
        assert_eq!(uploaded[0].tags, descriptor().tags);
    }

    #[tokio::test]
    async fn test_upload_failure_maps_to_dispatch_error() {
        let wallet = test_wallet();
        let relay = MockBundlingRelay::failing();
        let dispatcher = BundleDispatcher::new(&wallet, &relay);

        let result = dispatcher.dispatch(&descriptor()).await;
        assert!(matches!(result, Err(AssetError::Dispatch(_))));
    }
}

use tracing::info;

use crate::clients::ContractDeployEndpoint;
use crate::descriptor::AssetDescriptor;
use crate::error::AssetError;
use crate::id::TransactionId;
use crate::tx::Transaction;
use crate::wallet::Wallet;

/// Registers the dispatched asset as a contract on the ledger
pub struct ContractRegistrar<'a> {
    wallet: &'a Wallet,
    deploy: &'a dyn ContractDeployEndpoint,
}

impl<'a> ContractRegistrar<'a> {
    pub fn new(wallet: &'a Wallet, deploy: &'a dyn ContractDeployEndpoint) -> Self {
        Self { wallet, deploy }
    }

    /// Build a second, independent transaction from the descriptor, sign
    /// it, bind its id to `atomic_id`, and post it for registration
    ///
    /// Binding the id is intentional cross-service correlation: indexers
    /// treat the bundled transaction and the registration transaction as
    /// one object because they share an identifier.
    pub async fn register(
        &self,
        atomic_id: TransactionId,
        descriptor: &AssetDescriptor,
    ) -> Result<(), AssetError> {
        let mut tx = Transaction::new(descriptor.data.clone(), descriptor.tags.clone());
        tx.sign(self.wallet);
        tx.bind_id(atomic_id);

        self.deploy
            .deploy(&tx)
            .await
            .map_err(|e| AssetError::Registration(e.to_string()))?;

        info!(%atomic_id, "registered contract for atomic asset");
        Ok(())
    }
}

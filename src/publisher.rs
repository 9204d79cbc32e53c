use tracing::info;

use crate::clients::LedgerEndpoint;
use crate::content::Content;
use crate::error::AssetError;
use crate::id::TransactionId;
use crate::tx::{Tag, Transaction};
use crate::wallet::Wallet;

/// Publishes raw content bytes as a signed ledger transaction
pub struct ContentPublisher<'a> {
    wallet: &'a Wallet,
    ledger: &'a dyn LedgerEndpoint,
}

impl<'a> ContentPublisher<'a> {
    pub fn new(wallet: &'a Wallet, ledger: &'a dyn LedgerEndpoint) -> Self {
        Self { wallet, ledger }
    }

    /// Sign and submit the content, returning the transaction id that the
    /// asset manifest will reference as its base content
    pub async fn publish(&self, content: &Content) -> Result<TransactionId, AssetError> {
        let mut tx = Transaction::new(
            content.bytes.clone(),
            vec![Tag::new("Content-Type", &content.content_type)],
        );
        tx.sign(self.wallet);

        self.ledger
            .submit(&tx)
            .await
            .map_err(|e| AssetError::Publish(e.to_string()))?;

        info!(id = %tx.id, bytes = content.bytes.len(), "published base content");
        Ok(tx.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockLedgerEndpoint;
    use crate::wallet::tests::test_wallet;

    #[tokio::test]
    async fn test_publish_submits_signed_tagged_transaction() {
        let wallet = test_wallet();
        let ledger = MockLedgerEndpoint::new();
        let publisher = ContentPublisher::new(&wallet, &ledger);
        let content = Content::new(b"<html>hi</html>".to_vec(), "text/html");

        let id = publisher.publish(&content).await.unwrap();

        let submitted = ledger.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        let tx = &submitted[0];
        assert_eq!(tx.id, id);
        assert_eq!(tx.data, content.bytes);
        assert_eq!(tx.tags.len(), 1);
        assert_eq!(tx.tags[0].name, "Content-Type");
        assert_eq!(tx.tags[0].value, "text/html");
        assert!(!tx.signature.is_empty());
    }

    #[tokio::test]
    async fn test_submission_failure_maps_to_publish_error() {
        let wallet = test_wallet();
        let ledger = MockLedgerEndpoint::failing();
        let publisher = ContentPublisher::new(&wallet, &ledger);
        let content = Content::new(Vec::new(), "text/html");

        let result = publisher.publish(&content).await;
        assert!(matches!(result, Err(AssetError::Publish(_))));
        assert_eq!(ledger.submitted_count(), 0);
    }
}

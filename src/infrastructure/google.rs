use super::billing::{BillingChannel, BillingRequest};
use crate::domain::ports::{ProductMetadata, StoreBackend};
use crate::domain::product::{Catalog, ProductId};
use crate::domain::receipt::Receipt;
use crate::error::{PurchaseError, Result};
use async_trait::async_trait;

/// Google Play backend over the billing bridge.
///
/// Play has no user-triggered restore flow; instead, purchases completed while
/// the app was away are acknowledged right after initialization.
pub struct GooglePlayBackend {
    channel: BillingChannel,
}

impl GooglePlayBackend {
    pub fn new(channel: BillingChannel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl StoreBackend for GooglePlayBackend {
    async fn initialize(&self, catalog: &Catalog) -> Result<()> {
        let products = catalog.iter().cloned().collect();
        self.channel
            .call(|reply| BillingRequest::Initialize { products, reply })
            .await?
            .map_err(PurchaseError::from)?;

        let confirmed = self
            .channel
            .call(|reply| BillingRequest::ConfirmPending { reply })
            .await?;
        if confirmed > 0 {
            tracing::debug!(confirmed, "acknowledged pending purchases");
        }
        Ok(())
    }

    async fn initiate_purchase(&self, id: &ProductId) -> Result<Receipt> {
        let product_id = id.clone();
        self.channel
            .call(|reply| BillingRequest::Purchase { product_id, reply })
            .await?
            .map_err(PurchaseError::Transaction)
    }

    async fn query_ownership(&self, id: &ProductId) -> Result<bool> {
        let product_id = id.clone();
        self.channel
            .call(|reply| BillingRequest::QueryOwnership { product_id, reply })
            .await
    }

    async fn query_metadata(&self, id: &ProductId) -> Result<Option<ProductMetadata>> {
        let product_id = id.clone();
        self.channel
            .call(|reply| BillingRequest::QueryMetadata { product_id, reply })
            .await
    }

    async fn restore(&self) -> Result<Vec<Receipt>> {
        tracing::warn!("restore is not supported on Google Play");
        Err(PurchaseError::RestoreUnsupported)
    }
}

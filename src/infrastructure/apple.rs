use super::billing::{BillingChannel, BillingRequest};
use crate::domain::ports::{ProductMetadata, StoreBackend};
use crate::domain::product::{Catalog, ProductId};
use crate::domain::receipt::Receipt;
use crate::error::{PurchaseError, Result};
use async_trait::async_trait;

/// App Store backend: forwards every operation to the native StoreKit glue
/// over the billing bridge. Supports transaction restore.
pub struct AppleBackend {
    channel: BillingChannel,
}

impl AppleBackend {
    pub fn new(channel: BillingChannel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl StoreBackend for AppleBackend {
    async fn initialize(&self, catalog: &Catalog) -> Result<()> {
        let products = catalog.iter().cloned().collect();
        self.channel
            .call(|reply| BillingRequest::Initialize { products, reply })
            .await?
            .map_err(PurchaseError::from)
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
        tracing::info!("requesting transaction restore from the App Store");
        self.channel
            .call(|reply| BillingRequest::Restore { reply })
            .await
    }
}

use super::product::{Catalog, ProductId};
use super::receipt::Receipt;
use crate::error::{PurchaseError, ReceiptError, Result};
use async_trait::async_trait;

/// Store-reported product metadata, localized for the current user.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductMetadata {
    pub localized_price: String,
    pub currency_code: Option<String>,
}

/// Reasons a store backend can refuse to initialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitFailure {
    AppNotKnown,
    PurchasingUnavailable,
    NoProducts,
}

impl From<InitFailure> for PurchaseError {
    fn from(failure: InitFailure) -> Self {
        match failure {
            InitFailure::AppNotKnown => PurchaseError::AppNotKnown,
            InitFailure::PurchasingUnavailable => PurchaseError::BackendUnavailable,
            InitFailure::NoProducts => PurchaseError::NoProductsAvailable,
        }
    }
}

/// Platform billing adapter.
///
/// Implementations are selected at coordinator construction time: `StubBackend`
/// for local/dev use, `AppleBackend` and `GooglePlayBackend` for devices.
///
/// `initiate_purchase` reports transaction failures as
/// `PurchaseError::Transaction` so the coordinator can pass the store's reason
/// through verbatim.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn initialize(&self, catalog: &Catalog) -> Result<()>;

    async fn initiate_purchase(&self, id: &ProductId) -> Result<Receipt>;

    /// Whether the store holds an active receipt for the product.
    async fn query_ownership(&self, id: &ProductId) -> Result<bool>;

    async fn query_metadata(&self, id: &ProductId) -> Result<Option<ProductMetadata>>;

    /// Re-deliver receipts for previously completed transactions.
    /// Platform-gated: not every store supports it.
    async fn restore(&self) -> Result<Vec<Receipt>>;
}

pub type StoreBackendBox = Box<dyn StoreBackend>;

#[async_trait]
impl<B> StoreBackend for std::sync::Arc<B>
where
    B: StoreBackend + ?Sized,
{
    async fn initialize(&self, catalog: &Catalog) -> Result<()> {
        (**self).initialize(catalog).await
    }

    async fn initiate_purchase(&self, id: &ProductId) -> Result<Receipt> {
        (**self).initiate_purchase(id).await
    }

    async fn query_ownership(&self, id: &ProductId) -> Result<bool> {
        (**self).query_ownership(id).await
    }

    async fn query_metadata(&self, id: &ProductId) -> Result<Option<ProductMetadata>> {
        (**self).query_metadata(id).await
    }

    async fn restore(&self) -> Result<Vec<Receipt>> {
        (**self).restore().await
    }
}

/// Checks a transaction receipt against the platform's public key material.
///
/// Synchronous: validation is CPU-bound signature work, there is nothing to
/// await.
pub trait ReceiptValidator: Send + Sync {
    fn validate(&self, receipt: &Receipt) -> std::result::Result<(), ReceiptError>;
}

pub type ReceiptValidatorBox = Box<dyn ReceiptValidator>;

use crate::domain::ports::{InitFailure, ProductMetadata, StoreBackend};
use crate::domain::product::{Catalog, Product, ProductId, ProductKind};
use crate::domain::purchase::FailureReason;
use crate::domain::receipt::{Receipt, ReceiptBody, StoreKind};
use crate::error::{PurchaseError, Result};
use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct StubState {
    initialized: bool,
    init_failure: Option<InitFailure>,
    products: HashMap<ProductId, Product>,
    owned: HashSet<ProductId>,
    receipts: HashMap<ProductId, Receipt>,
    scripted_failures: HashMap<ProductId, FailureReason>,
}

/// In-process store backend for local development and tests.
///
/// Purchases resolve immediately: success by default, or a scripted failure.
/// Ownership is tracked for non-consumed kinds only, so a consumable is never
/// "owned" after purchase. With a signing key attached, issued receipts verify
/// against a `CrossStoreValidator` holding the matching public key.
#[derive(Default)]
pub struct StubBackend {
    state: RwLock<StubState>,
    next_tx: AtomicU64,
    purchase_attempts: AtomicU64,
    init_calls: AtomicU64,
    signing_key: Option<SigningKey>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signs issued receipts with `key`.
    pub fn with_signing_key(mut self, key: SigningKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    /// Makes the next `initialize` call fail with the given reason.
    pub async fn refuse_initialization(&self, failure: InitFailure) {
        self.state.write().await.init_failure = Some(failure);
    }

    /// Makes purchases of `id` fail with `reason` until cleared.
    pub async fn script_failure(&self, id: &str, reason: FailureReason) {
        self.state
            .write()
            .await
            .scripted_failures
            .insert(ProductId::from(id), reason);
    }

    pub async fn clear_failure(&self, id: &str) {
        self.state
            .write()
            .await
            .scripted_failures
            .remove(&ProductId::from(id));
    }

    /// Marks `id` as owned with a stored receipt, as if bought on another
    /// device. Useful for restore tests.
    pub async fn grant(&self, id: &str) -> Result<()> {
        let receipt = self.make_receipt(&ProductId::from(id), "stub-prior")?;
        let mut state = self.state.write().await;
        state.owned.insert(receipt.product_id.clone());
        state.receipts.insert(receipt.product_id.clone(), receipt);
        Ok(())
    }

    /// How many purchases were initiated against this backend.
    pub fn purchase_attempts(&self) -> u64 {
        self.purchase_attempts.load(Ordering::Relaxed)
    }

    /// How many times `initialize` was called.
    pub fn init_calls(&self) -> u64 {
        self.init_calls.load(Ordering::Relaxed)
    }

    fn make_receipt(&self, product_id: &ProductId, tag: &str) -> Result<Receipt> {
        let n = self.next_tx.fetch_add(1, Ordering::Relaxed) + 1;
        let transaction_id = format!("{tag}-{n:04}");
        let body = ReceiptBody {
            product_id: product_id.clone(),
            transaction_id: transaction_id.clone(),
        };
        let payload = body.to_bytes()?;
        let signature = match &self.signing_key {
            Some(key) => key.sign(&payload).to_bytes().to_vec(),
            None => Vec::new(),
        };
        Ok(Receipt {
            store: StoreKind::Stub,
            product_id: product_id.clone(),
            transaction_id,
            payload,
            signature,
        })
    }
}

#[async_trait]
impl StoreBackend for StubBackend {
    async fn initialize(&self, catalog: &Catalog) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.write().await;
        if let Some(failure) = state.init_failure {
            return Err(failure.into());
        }
        state.products = catalog
            .iter()
            .cloned()
            .map(|product| (product.id.clone(), product))
            .collect();
        state.initialized = true;
        Ok(())
    }

    async fn initiate_purchase(&self, id: &ProductId) -> Result<Receipt> {
        self.purchase_attempts.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.write().await;
        if !state.initialized {
            return Err(PurchaseError::BackendUninitialized);
        }
        let Some(product) = state.products.get(id).cloned() else {
            return Err(PurchaseError::UnknownProduct(id.clone()));
        };
        if let Some(reason) = state.scripted_failures.get(id).cloned() {
            return Err(PurchaseError::Transaction(reason));
        }
        if product.kind == ProductKind::NonConsumable && state.owned.contains(id) {
            return Err(PurchaseError::Transaction(FailureReason::AlreadyOwned));
        }

        let receipt = self.make_receipt(id, "stub")?;
        if product.kind != ProductKind::Consumable {
            state.owned.insert(id.clone());
        }
        state.receipts.insert(id.clone(), receipt.clone());
        Ok(receipt)
    }

    async fn query_ownership(&self, id: &ProductId) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.owned.contains(id))
    }

    async fn query_metadata(&self, id: &ProductId) -> Result<Option<ProductMetadata>> {
        let state = self.state.read().await;
        Ok(state.products.get(id).map(|product| ProductMetadata {
            localized_price: format!("${}", product.price),
            currency_code: Some("USD".to_string()),
        }))
    }

    async fn restore(&self) -> Result<Vec<Receipt>> {
        let state = self.state.read().await;
        Ok(state
            .owned
            .iter()
            .filter_map(|id| state.receipts.get(id).cloned())
            .collect())
    }
}

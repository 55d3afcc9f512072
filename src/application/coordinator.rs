use crate::application::events::CoordinatorEvents;
use crate::domain::ports::{ReceiptValidatorBox, StoreBackendBox};
use crate::domain::product::{Catalog, Product, ProductId, ProductKind};
use crate::domain::purchase::{
    FailureReason, PurchaseCallbacks, PurchaseFailure, PurchaseOutcome, PurchaseState,
    TrackedPurchase,
};
use crate::domain::receipt::Receipt;
use crate::error::{PurchaseError, Result};
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::Mutex;

struct Attempt {
    state: PurchaseState,
    callbacks: PurchaseCallbacks,
    started: Instant,
}

impl Attempt {
    fn new(callbacks: PurchaseCallbacks) -> Self {
        Self {
            state: PurchaseState::Initiated,
            callbacks,
            started: Instant::now(),
        }
    }
}

#[derive(Default)]
struct CoordinatorState {
    initialized: bool,
    in_flight: HashMap<ProductId, Attempt>,
}

/// Owns the lifecycle of purchase requests from initiation to terminal
/// outcome.
///
/// The coordinator is explicitly constructed and owned by the host
/// application; it holds the immutable catalog, the store backend selected at
/// construction time, and an optional receipt validator. All methods take
/// `&self` and may be called from any task; in-flight state lives behind a
/// single mutex that is never held across a backend await.
pub struct PurchaseCoordinator {
    catalog: Catalog,
    backend: StoreBackendBox,
    validator: Option<ReceiptValidatorBox>,
    events: CoordinatorEvents,
    state: Mutex<CoordinatorState>,
}

impl PurchaseCoordinator {
    pub fn new(catalog: Catalog, backend: StoreBackendBox) -> Self {
        Self {
            catalog,
            backend,
            validator: None,
            events: CoordinatorEvents::default(),
            state: Mutex::new(CoordinatorState::default()),
        }
    }

    /// Enables receipt validation. Validation must pass before any purchase is
    /// declared successful.
    pub fn with_validator(mut self, validator: ReceiptValidatorBox) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn events(&self) -> &CoordinatorEvents {
        &self.events
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.lock().await.initialized
    }

    /// Initializes the store backend with the catalog. Idempotent: calling
    /// again while initialized is a no-op.
    ///
    /// The lock is held across the backend call so concurrent initializations
    /// serialize instead of racing the backend.
    pub async fn initialize(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.initialized {
            return Ok(());
        }

        match self.backend.initialize(&self.catalog).await {
            Ok(()) => {
                state.initialized = true;
                tracing::info!(products = self.catalog.len(), "store backend initialized");
                Ok(())
            }
            Err(err) => {
                match &err {
                    PurchaseError::AppNotKnown => {
                        tracing::error!("is the app correctly uploaded to the store console?")
                    }
                    PurchaseError::BackendUnavailable => {
                        tracing::warn!("in-app purchases disabled in device settings")
                    }
                    PurchaseError::NoProductsAvailable => {
                        tracing::warn!("no products available for purchase")
                    }
                    _ => {}
                }
                Err(err)
            }
        }
    }

    /// Starts a purchase and drives it to its terminal outcome.
    ///
    /// Unknown products, an uninitialized backend and an unresolved attempt
    /// for the same id fail synchronously with `Err` before any backend call
    /// and before any event fires. Once the backend is involved, failures are
    /// reported through events and `PurchaseOutcome::Failed`, never as `Err`.
    pub async fn purchase(&self, id: &str) -> Result<PurchaseOutcome> {
        self.purchase_with(id, PurchaseCallbacks::new()).await
    }

    /// `purchase` with per-attempt success/failure hooks. Hooks fire at most
    /// once and are cleared when the attempt resolves.
    pub async fn purchase_with(
        &self,
        id: &str,
        callbacks: PurchaseCallbacks,
    ) -> Result<PurchaseOutcome> {
        let product = self
            .catalog
            .get(id)
            .ok_or_else(|| PurchaseError::UnknownProduct(ProductId::from(id)))?
            .clone();

        {
            let mut state = self.state.lock().await;
            if !state.initialized {
                return Err(PurchaseError::BackendUninitialized);
            }
            if state.in_flight.contains_key(&product.id) {
                return Err(PurchaseError::PurchaseInFlight(product.id));
            }
            state
                .in_flight
                .insert(product.id.clone(), Attempt::new(callbacks));
        }

        self.events.native_popup.emit(&true);
        tracing::debug!(product = %product.id, "purchase initiated");

        match self.backend.initiate_purchase(&product.id).await {
            Ok(receipt) => Ok(self.settle(product, receipt).await),
            Err(err) => {
                let reason = match err {
                    PurchaseError::Transaction(reason) => reason,
                    other => FailureReason::Unknown(other.to_string()),
                };
                Ok(self.fail(product.id, reason).await)
            }
        }
    }

    /// Current state of an in-flight attempt, if any.
    pub async fn purchase_state(&self, id: &str) -> Option<PurchaseState> {
        let state = self.state.lock().await;
        state
            .in_flight
            .get(&ProductId::from(id))
            .map(|attempt| attempt.state)
    }

    /// Whether the store holds an active receipt for a non-consumable.
    ///
    /// Only `NonConsumable` products are checked against the backend;
    /// consumables and subscriptions answer `false`. Returns `Ok(false)` when
    /// the backend is not initialized.
    pub async fn is_purchased(&self, id: &str) -> Result<bool> {
        let product = self
            .catalog
            .get(id)
            .ok_or_else(|| PurchaseError::UnknownProduct(ProductId::from(id)))?;

        if !self.is_initialized().await {
            return Ok(false);
        }
        if product.kind != ProductKind::NonConsumable {
            return Ok(false);
        }
        self.backend.query_ownership(&product.id).await
    }

    /// Store-localized price string, `None` until the backend is initialized.
    pub async fn localized_price(&self, id: &str) -> Result<Option<String>> {
        let product = self
            .catalog
            .get(id)
            .ok_or_else(|| PurchaseError::UnknownProduct(ProductId::from(id)))?;

        if !self.is_initialized().await {
            return Ok(None);
        }
        let metadata = self.backend.query_metadata(&product.id).await?;
        Ok(metadata.map(|m| m.localized_price))
    }

    /// Asks the store to re-deliver completed transactions. Each restored
    /// receipt re-enters the same settle pipeline as a fresh purchase.
    /// Returns how many receipts were settled.
    pub async fn restore(&self) -> Result<usize> {
        if !self.is_initialized().await {
            return Err(PurchaseError::BackendUninitialized);
        }

        tracing::info!("restore started");
        let receipts = self.backend.restore().await?;
        if receipts.is_empty() {
            tracing::info!("no purchases available to restore");
            return Ok(0);
        }

        let mut settled = 0;
        for receipt in receipts {
            let Some(product) = self.catalog.get(receipt.product_id.as_str()).cloned() else {
                tracing::warn!(product = %receipt.product_id, "restored receipt for unknown product");
                continue;
            };

            {
                let mut state = self.state.lock().await;
                if state.in_flight.contains_key(&product.id) {
                    tracing::debug!(product = %product.id, "skipping restore, attempt in flight");
                    continue;
                }
                state
                    .in_flight
                    .insert(product.id.clone(), Attempt::new(PurchaseCallbacks::new()));
            }

            self.settle(product, receipt).await;
            settled += 1;
        }
        Ok(settled)
    }

    /// Validates (when configured) and resolves a completed transaction.
    async fn settle(&self, product: Product, receipt: Receipt) -> PurchaseOutcome {
        if let Some(validator) = &self.validator {
            {
                let mut state = self.state.lock().await;
                if let Some(attempt) = state.in_flight.get_mut(&product.id) {
                    attempt.state = PurchaseState::PendingValidation;
                }
            }

            if let Err(err) = validator.validate(&receipt) {
                tracing::warn!(product = %product.id, %err, "invalid receipt, not unlocking content");
                return self.fail(product.id, FailureReason::InvalidReceipt).await;
            }
            tracing::debug!(product = %product.id, "receipt is valid");
        }

        self.succeed(product, receipt).await
    }

    async fn succeed(&self, product: Product, receipt: Receipt) -> PurchaseOutcome {
        let attempt = self.take_attempt(&product.id).await;

        self.events.native_popup.emit(&false);
        self.events.tracking_revenue.emit(&TrackedPurchase {
            product: product.clone(),
            transaction_id: receipt.transaction_id.clone(),
        });
        self.events.purchase_succeeded.emit(&product.id);

        if let Some(attempt) = attempt {
            tracing::info!(
                product = %product.id,
                transaction = %receipt.transaction_id,
                elapsed_ms = attempt.started.elapsed().as_millis() as u64,
                "purchase succeeded"
            );
            attempt.callbacks.fire_success();
        }

        PurchaseOutcome::Succeeded {
            product_id: product.id,
            transaction_id: receipt.transaction_id,
        }
    }

    async fn fail(&self, product_id: ProductId, reason: FailureReason) -> PurchaseOutcome {
        let attempt = self.take_attempt(&product_id).await;

        self.events.native_popup.emit(&false);
        self.events.purchase_failed.emit(&PurchaseFailure {
            product_id: product_id.clone(),
            reason: reason.clone(),
        });

        if let Some(attempt) = attempt {
            tracing::warn!(
                product = %product_id,
                %reason,
                elapsed_ms = attempt.started.elapsed().as_millis() as u64,
                "purchase failed"
            );
            attempt.callbacks.fire_failure();
        }

        PurchaseOutcome::Failed { product_id, reason }
    }

    async fn take_attempt(&self, id: &ProductId) -> Option<Attempt> {
        self.state.lock().await.in_flight.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::stub::StubBackend;
    use rust_decimal_macros::dec;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Product {
                id: ProductId::from("coin.100"),
                kind: ProductKind::Consumable,
                price: dec!(0.99),
            },
            Product {
                id: ProductId::from("remove.ads"),
                kind: ProductKind::NonConsumable,
                price: dec!(2.99),
            },
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_product_fails_before_backend() {
        let backend = StubBackend::new();
        let coordinator = PurchaseCoordinator::new(catalog(), Box::new(backend));
        coordinator.initialize().await.unwrap();

        let result = coordinator.purchase("coin.999").await;
        assert!(matches!(result, Err(PurchaseError::UnknownProduct(_))));
    }

    #[tokio::test]
    async fn test_purchase_requires_initialization() {
        let coordinator = PurchaseCoordinator::new(catalog(), Box::new(StubBackend::new()));

        let result = coordinator.purchase("coin.100").await;
        assert!(matches!(result, Err(PurchaseError::BackendUninitialized)));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let coordinator = PurchaseCoordinator::new(catalog(), Box::new(StubBackend::new()));

        coordinator.initialize().await.unwrap();
        coordinator.initialize().await.unwrap();
        assert!(coordinator.is_initialized().await);
    }

    #[tokio::test]
    async fn test_successful_purchase_without_validation() {
        let coordinator = PurchaseCoordinator::new(catalog(), Box::new(StubBackend::new()));
        coordinator.initialize().await.unwrap();

        let outcome = coordinator.purchase("coin.100").await.unwrap();
        assert!(outcome.succeeded());
        assert!(coordinator.purchase_state("coin.100").await.is_none());
    }

    #[tokio::test]
    async fn test_localized_price_requires_initialization() {
        let coordinator = PurchaseCoordinator::new(catalog(), Box::new(StubBackend::new()));

        assert_eq!(coordinator.localized_price("coin.100").await.unwrap(), None);

        coordinator.initialize().await.unwrap();
        let price = coordinator.localized_price("coin.100").await.unwrap();
        assert_eq!(price.as_deref(), Some("$0.99"));
    }

    #[tokio::test]
    async fn test_restore_requires_initialization() {
        let coordinator = PurchaseCoordinator::new(catalog(), Box::new(StubBackend::new()));

        let result = coordinator.restore().await;
        assert!(matches!(result, Err(PurchaseError::BackendUninitialized)));
    }
}

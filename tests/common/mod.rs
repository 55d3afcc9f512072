use purchasekit::domain::purchase::FailureReason;
use purchasekit::domain::receipt::{Receipt, ReceiptBody, StoreKind};
use purchasekit::{Catalog, Product, ProductId, ProductKind, PurchaseCoordinator};
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};

pub fn catalog() -> Catalog {
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
        Product {
            id: ProductId::from("vip.monthly"),
            kind: ProductKind::Subscription,
            price: dec!(9.99),
        },
    ])
    .unwrap()
}

pub fn signing_key() -> ed25519_dalek::SigningKey {
    ed25519_dalek::SigningKey::from_bytes(&[7u8; 32])
}

/// Unsigned receipt as a platform bridge would deliver it.
pub fn plain_receipt(store: StoreKind, id: &str, tx: &str) -> Receipt {
    let body = ReceiptBody {
        product_id: ProductId::from(id),
        transaction_id: tx.to_string(),
    };
    Receipt {
        store,
        product_id: body.product_id.clone(),
        transaction_id: body.transaction_id.clone(),
        payload: body.to_bytes().unwrap(),
        signature: Vec::new(),
    }
}

/// Records every coordinator event for later assertions.
#[derive(Default, Clone)]
pub struct EventLog {
    succeeded: Arc<Mutex<Vec<String>>>,
    failed: Arc<Mutex<Vec<(String, FailureReason)>>>,
    revenue: Arc<Mutex<Vec<String>>>,
    popup: Arc<Mutex<Vec<bool>>>,
}

impl EventLog {
    pub fn attach(coordinator: &PurchaseCoordinator) -> Self {
        let log = Self::default();
        {
            let succeeded = log.succeeded.clone();
            coordinator.events().purchase_succeeded.subscribe(move |id| {
                succeeded.lock().unwrap().push(id.to_string());
            });
        }
        {
            let failed = log.failed.clone();
            coordinator
                .events()
                .purchase_failed
                .subscribe(move |failure| {
                    failed
                        .lock()
                        .unwrap()
                        .push((failure.product_id.to_string(), failure.reason.clone()));
                });
        }
        {
            let revenue = log.revenue.clone();
            coordinator
                .events()
                .tracking_revenue
                .subscribe(move |tracked| {
                    revenue.lock().unwrap().push(tracked.transaction_id.clone());
                });
        }
        {
            let popup = log.popup.clone();
            coordinator.events().native_popup.subscribe(move |visible| {
                popup.lock().unwrap().push(*visible);
            });
        }
        log
    }

    pub fn succeeded_ids(&self) -> Vec<String> {
        self.succeeded.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<(String, FailureReason)> {
        self.failed.lock().unwrap().clone()
    }

    pub fn revenue_transactions(&self) -> Vec<String> {
        self.revenue.lock().unwrap().clone()
    }

    pub fn popup_sequence(&self) -> Vec<bool> {
        self.popup.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.succeeded_ids().is_empty()
            && self.failures().is_empty()
            && self.revenue_transactions().is_empty()
            && self.popup_sequence().is_empty()
    }
}

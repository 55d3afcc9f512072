use crate::domain::ports::{InitFailure, ProductMetadata};
use crate::domain::product::{Product, ProductId};
use crate::domain::purchase::FailureReason;
use crate::domain::receipt::Receipt;
use crate::error::{PurchaseError, Result};
use tokio::sync::{mpsc, oneshot};

/// Requests carried over the bridge to the native billing service.
///
/// Each request carries its own reply channel; the service side answers by
/// sending on it. Dropping the reply sender counts as the service going away.
#[derive(Debug)]
pub enum BillingRequest {
    Initialize {
        products: Vec<Product>,
        reply: oneshot::Sender<std::result::Result<(), InitFailure>>,
    },
    Purchase {
        product_id: ProductId,
        reply: oneshot::Sender<std::result::Result<Receipt, FailureReason>>,
    },
    QueryOwnership {
        product_id: ProductId,
        reply: oneshot::Sender<bool>,
    },
    QueryMetadata {
        product_id: ProductId,
        reply: oneshot::Sender<Option<ProductMetadata>>,
    },
    Restore {
        reply: oneshot::Sender<Vec<Receipt>>,
    },
    /// Acknowledge transactions that completed while the app was away.
    ConfirmPending {
        reply: oneshot::Sender<usize>,
    },
}

/// Client half of the billing bridge, held by the platform backends.
///
/// The receiver half is serviced by the platform glue that talks to the
/// actual billing library. A closed channel surfaces as `BackendUnavailable`
/// on every call.
#[derive(Clone)]
pub struct BillingChannel {
    requests: mpsc::Sender<BillingRequest>,
}

impl BillingChannel {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<BillingRequest>) {
        let (requests, service) = mpsc::channel(capacity);
        (Self { requests }, service)
    }

    pub(crate) async fn call<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> BillingRequest,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(build(reply))
            .await
            .map_err(|_| PurchaseError::BackendUnavailable)?;
        response.await.map_err(|_| PurchaseError::BackendUnavailable)
    }
}

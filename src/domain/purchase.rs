use crate::domain::product::{Product, ProductId};
use std::fmt;

/// Why a transaction failed, passed through from the store verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    UserCancelled,
    BillingUnavailable,
    NetworkError,
    AlreadyOwned,
    InvalidReceipt,
    Unknown(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::UserCancelled => f.write_str("user cancelled"),
            FailureReason::BillingUnavailable => f.write_str("billing unavailable"),
            FailureReason::NetworkError => f.write_str("network error"),
            FailureReason::AlreadyOwned => f.write_str("already owned"),
            FailureReason::InvalidReceipt => f.write_str("invalid receipt"),
            FailureReason::Unknown(detail) => write!(f, "unknown: {detail}"),
        }
    }
}

/// Where an in-flight purchase attempt currently sits.
///
/// Terminal outcomes are not states: they are reported once through events and
/// the `PurchaseOutcome` return value, then the attempt is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseState {
    Initiated,
    PendingValidation,
}

/// Terminal result of a purchase attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    Succeeded {
        product_id: ProductId,
        transaction_id: String,
    },
    Failed {
        product_id: ProductId,
        reason: FailureReason,
    },
}

impl PurchaseOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, PurchaseOutcome::Succeeded { .. })
    }
}

/// Event payload for failed purchases.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseFailure {
    pub product_id: ProductId,
    pub reason: FailureReason,
}

/// Event payload for revenue tracking, emitted once per verified purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedPurchase {
    pub product: Product,
    pub transaction_id: String,
}

type Callback = Box<dyn FnOnce() + Send>;

/// Optional per-attempt hooks, registered when the purchase starts and invoked
/// at most once when it resolves. Consuming them on fire is what guarantees
/// the cleared-after-firing invariant.
#[derive(Default)]
pub struct PurchaseCallbacks {
    success: Option<Callback>,
    failure: Option<Callback>,
}

impl PurchaseCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.success = Some(Box::new(hook));
        self
    }

    pub fn on_failure(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.failure = Some(Box::new(hook));
        self
    }

    pub(crate) fn fire_success(self) {
        if let Some(hook) = self.success {
            hook();
        }
    }

    pub(crate) fn fire_failure(self) {
        if let Some(hook) = self.failure {
            hook();
        }
    }
}

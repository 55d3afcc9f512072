use crate::domain::product::ProductId;
use crate::domain::purchase::FailureReason;
use crate::domain::receipt::StoreKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PurchaseError>;

#[derive(Error, Debug)]
pub enum PurchaseError {
    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),
    #[error("duplicate product id in catalog: {0}")]
    DuplicateProduct(ProductId),
    #[error("store backend is not initialized")]
    BackendUninitialized,
    #[error("purchasing is unavailable on this device")]
    BackendUnavailable,
    #[error("app not recognized by the store")]
    AppNotKnown,
    #[error("no products available for purchase")]
    NoProductsAvailable,
    #[error("a purchase is already in flight for product: {0}")]
    PurchaseInFlight(ProductId),
    #[error("restoring purchases is not supported by this store")]
    RestoreUnsupported,
    #[error("transaction failed: {0}")]
    Transaction(FailureReason),
    #[error("invalid receipt: {0}")]
    InvalidReceipt(#[from] ReceiptError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Receipt rejection kinds. Structural damage and cryptographic mismatch are
/// distinct so callers can tell a garbled payload from a forged one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReceiptError {
    #[error("malformed receipt payload: {0}")]
    Malformed(String),
    #[error("receipt signature does not verify")]
    SignatureMismatch,
    #[error("no public key material for store: {0}")]
    MissingKey(StoreKind),
}

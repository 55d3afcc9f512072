use crate::domain::product::ProductId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which store issued a receipt. Determines the public key material used to
/// verify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    AppStore,
    GooglePlay,
    Stub,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::AppStore => f.write_str("app-store"),
            StoreKind::GooglePlay => f.write_str("google-play"),
            StoreKind::Stub => f.write_str("stub"),
        }
    }
}

/// Signed proof of purchase issued by the platform store.
///
/// `payload` is the store-signed body; `signature` covers the payload bytes
/// exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub store: StoreKind,
    pub product_id: ProductId,
    pub transaction_id: String,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Structure of the signed payload body.
///
/// Validators cross-check these fields against the receipt envelope so a valid
/// signature cannot be replayed for a different product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptBody {
    pub product_id: ProductId,
    pub transaction_id: String,
}

impl ReceiptBody {
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

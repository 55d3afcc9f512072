use crate::domain::ports::ReceiptValidator;
use crate::domain::receipt::{Receipt, ReceiptBody, StoreKind};
use crate::error::{PurchaseError, ReceiptError, Result};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use std::collections::HashMap;

/// Receipt validator holding per-store public key material.
///
/// A receipt passes when its payload parses, the payload fields match the
/// receipt envelope, and the signature verifies under the issuing store's key.
#[derive(Default)]
pub struct CrossStoreValidator {
    keys: HashMap<StoreKind, VerifyingKey>,
}

impl CrossStoreValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, store: StoreKind, key: VerifyingKey) -> Self {
        self.keys.insert(store, key);
        self
    }

    /// Decodes hex-encoded key material, e.g. from the store configuration
    /// file.
    pub fn key_from_hex(material: &str) -> Result<VerifyingKey> {
        let bytes = hex::decode(material)
            .map_err(|err| PurchaseError::Config(format!("bad public key hex: {err}")))?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| PurchaseError::Config("public key must be 32 bytes".to_string()))?;
        VerifyingKey::from_bytes(&bytes)
            .map_err(|err| PurchaseError::Config(format!("invalid public key: {err}")))
    }
}

impl ReceiptValidator for CrossStoreValidator {
    fn validate(&self, receipt: &Receipt) -> std::result::Result<(), ReceiptError> {
        let key = self
            .keys
            .get(&receipt.store)
            .ok_or(ReceiptError::MissingKey(receipt.store))?;

        let body: ReceiptBody = serde_json::from_slice(&receipt.payload)
            .map_err(|err| ReceiptError::Malformed(err.to_string()))?;
        if body.product_id != receipt.product_id || body.transaction_id != receipt.transaction_id {
            return Err(ReceiptError::Malformed(
                "payload does not match receipt envelope".to_string(),
            ));
        }

        let signature = Signature::from_slice(&receipt.signature)
            .map_err(|_| ReceiptError::Malformed("bad signature encoding".to_string()))?;
        key.verify(&receipt.payload, &signature)
            .map_err(|_| ReceiptError::SignatureMismatch)
    }
}

use crate::domain::product::{Catalog, Product};
use crate::domain::receipt::StoreKind;
use crate::error::Result;
use crate::infrastructure::validator::CrossStoreValidator;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// On-disk store configuration: the product catalog plus validation settings.
///
/// Key material is hex-encoded Ed25519 public keys exported from the store
/// consoles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub products: Vec<Product>,
    #[serde(default)]
    pub validate_receipts: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_play_public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_store_public_key: Option<String>,
}

impl StoreConfig {
    /// Builds the validated catalog. Duplicate ids are rejected here, at load
    /// time.
    pub fn catalog(&self) -> Result<Catalog> {
        Catalog::new(self.products.clone())
    }

    /// Builds the receipt validator when validation is enabled. Malformed key
    /// material fails here rather than at purchase time.
    pub fn validator(&self) -> Result<Option<CrossStoreValidator>> {
        if !self.validate_receipts {
            return Ok(None);
        }
        let mut validator = CrossStoreValidator::new();
        if let Some(material) = &self.google_play_public_key {
            validator = validator.with_key(
                StoreKind::GooglePlay,
                CrossStoreValidator::key_from_hex(material)?,
            );
        }
        if let Some(material) = &self.app_store_public_key {
            validator = validator.with_key(
                StoreKind::AppStore,
                CrossStoreValidator::key_from_hex(material)?,
            );
        }
        Ok(Some(validator))
    }
}

/// Reads a store configuration from a JSON source.
pub struct ConfigReader<R: Read> {
    source: R,
}

impl<R: Read> ConfigReader<R> {
    /// Creates a new `ConfigReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn read(self) -> Result<StoreConfig> {
        Ok(serde_json::from_reader(self.source)?)
    }
}

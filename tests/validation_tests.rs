mod common;

use common::EventLog;
use purchasekit::domain::purchase::FailureReason;
use purchasekit::domain::receipt::StoreKind;
use purchasekit::infrastructure::stub::StubBackend;
use purchasekit::infrastructure::validator::CrossStoreValidator;
use purchasekit::{PurchaseCoordinator, PurchaseOutcome};

#[tokio::test]
async fn test_valid_receipt_unlocks_content() {
    let key = common::signing_key();
    let backend = StubBackend::new().with_signing_key(key.clone());
    let validator = CrossStoreValidator::new().with_key(StoreKind::Stub, key.verifying_key());

    let coordinator = PurchaseCoordinator::new(common::catalog(), Box::new(backend))
        .with_validator(Box::new(validator));
    coordinator.initialize().await.unwrap();
    let log = EventLog::attach(&coordinator);

    let outcome = coordinator.purchase("remove.ads").await.unwrap();

    assert!(outcome.succeeded());
    assert_eq!(log.succeeded_ids(), vec!["remove.ads".to_string()]);
    assert!(coordinator.is_purchased("remove.ads").await.unwrap());
}

#[tokio::test]
async fn test_mis_signed_receipt_never_succeeds() {
    let wrong_key = ed25519_dalek::SigningKey::from_bytes(&[9u8; 32]);
    let backend = StubBackend::new().with_signing_key(common::signing_key());
    let validator =
        CrossStoreValidator::new().with_key(StoreKind::Stub, wrong_key.verifying_key());

    let coordinator = PurchaseCoordinator::new(common::catalog(), Box::new(backend))
        .with_validator(Box::new(validator));
    coordinator.initialize().await.unwrap();
    let log = EventLog::attach(&coordinator);

    let outcome = coordinator.purchase("remove.ads").await.unwrap();

    assert!(matches!(
        outcome,
        PurchaseOutcome::Failed {
            reason: FailureReason::InvalidReceipt,
            ..
        }
    ));
    assert!(log.succeeded_ids().is_empty());
    assert_eq!(
        log.failures(),
        vec![("remove.ads".to_string(), FailureReason::InvalidReceipt)]
    );
}

#[tokio::test]
async fn test_unsigned_receipt_fails_when_validation_is_on() {
    // Backend without a signing key issues empty signatures; with validation
    // enabled that is a structural failure, not a success.
    let backend = StubBackend::new();
    let validator = CrossStoreValidator::new()
        .with_key(StoreKind::Stub, common::signing_key().verifying_key());

    let coordinator = PurchaseCoordinator::new(common::catalog(), Box::new(backend))
        .with_validator(Box::new(validator));
    coordinator.initialize().await.unwrap();

    let outcome = coordinator.purchase("coin.100").await.unwrap();
    assert!(matches!(
        outcome,
        PurchaseOutcome::Failed {
            reason: FailureReason::InvalidReceipt,
            ..
        }
    ));
}

#[tokio::test]
async fn test_restored_receipts_are_validated_too() {
    let key = common::signing_key();
    let stub = std::sync::Arc::new(StubBackend::new().with_signing_key(key.clone()));
    let validator = CrossStoreValidator::new().with_key(StoreKind::Stub, key.verifying_key());

    let coordinator = PurchaseCoordinator::new(common::catalog(), Box::new(stub.clone()))
        .with_validator(Box::new(validator));
    coordinator.initialize().await.unwrap();
    stub.grant("remove.ads").await.unwrap();
    let log = EventLog::attach(&coordinator);

    let settled = coordinator.restore().await.unwrap();

    assert_eq!(settled, 1);
    assert_eq!(log.succeeded_ids(), vec!["remove.ads".to_string()]);
}

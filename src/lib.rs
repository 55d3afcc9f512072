pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;

pub use application::coordinator::PurchaseCoordinator;
pub use application::events::{EventHub, SubscriptionId};
pub use domain::product::{Catalog, Product, ProductId, ProductKind};
pub use domain::purchase::{
    FailureReason, PurchaseCallbacks, PurchaseOutcome, PurchaseState,
};
pub use error::{PurchaseError, Result};

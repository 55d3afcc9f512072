//! Application layer containing the purchase lifecycle orchestration.
//!
//! This module defines the `PurchaseCoordinator`, the single entry point for
//! purchase, ownership and price operations, plus the event hubs it notifies.

pub mod coordinator;
pub mod events;

use crate::domain::product::ProductId;
use crate::domain::purchase::{PurchaseFailure, TrackedPurchase};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Instance-owned observer registry.
///
/// Every live handler receives each emitted event; ordering across subscribers
/// is unspecified. Handlers run while the registry lock is held and must not
/// subscribe or unsubscribe from inside a handler.
pub struct EventHub<T> {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(SubscriptionId, Handler<T>)>>,
}

impl<T> Default for EventHub<T> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            handlers: Mutex::new(Vec::new()),
        }
    }
}

impl<T> EventHub<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut handlers = self.handlers.lock().expect("event hub lock poisoned");
        handlers.push((id, Box::new(handler)));
        id
    }

    /// Removes a subscription. Returns false if the handle was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock().expect("event hub lock poisoned");
        let before = handlers.len();
        handlers.retain(|(handle, _)| *handle != id);
        handlers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().expect("event hub lock poisoned").len()
    }

    pub(crate) fn emit(&self, event: &T) {
        let handlers = self.handlers.lock().expect("event hub lock poisoned");
        for (_, handler) in handlers.iter() {
            handler(event);
        }
    }
}

/// The coordinator's notification surface.
///
/// All hubs are fire-and-forget: no return values, multiple subscribers
/// allowed.
#[derive(Default)]
pub struct CoordinatorEvents {
    /// Fired once per successful purchase with the product id.
    pub purchase_succeeded: EventHub<ProductId>,
    /// Fired once per failed purchase with the store's reason.
    pub purchase_failed: EventHub<PurchaseFailure>,
    /// Fired for each verified purchase, before the success notification.
    pub tracking_revenue: EventHub<TrackedPurchase>,
    /// `true` while the native purchase UI should be visible.
    pub native_popup: EventHub<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_all_subscribers_receive_events() {
        let hub = EventHub::<u32>::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        {
            let first = first.clone();
            hub.subscribe(move |value| {
                first.fetch_add(*value as usize, Ordering::SeqCst);
            });
        }
        {
            let second = second.clone();
            hub.subscribe(move |value| {
                second.fetch_add(*value as usize, Ordering::SeqCst);
            });
        }

        hub.emit(&3);
        assert_eq!(first.load(Ordering::SeqCst), 3);
        assert_eq!(second.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let hub = EventHub::<()>::new();
        let count = Arc::new(AtomicUsize::new(0));

        let id = {
            let count = count.clone();
            hub.subscribe(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };

        hub.emit(&());
        assert!(hub.unsubscribe(id));
        hub.emit(&());

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!hub.unsubscribe(id), "second unsubscribe finds nothing");
    }

    #[test]
    fn test_emit_without_subscribers() {
        let hub = EventHub::<String>::new();
        hub.emit(&"nobody listening".to_string());
        assert_eq!(hub.subscriber_count(), 0);
    }
}

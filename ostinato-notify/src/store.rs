//! In-memory subscription store
//!
//! An explicit store value with a defined lifecycle: created empty, mutated
//! only through subscribe/unsubscribe, never persisted. Callers own the
//! store and pass it to the broadcaster - there is no process-wide list.

use crate::subscription::{Subscription, SubscriptionError};

#[derive(Debug, Default)]
pub struct SubscriptionStore {
    records: Vec<Subscription>,
}

impl SubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Subscription] {
        &self.records
    }

    /// Add a record, rejecting malformed ones without touching the store.
    ///
    /// Records are deduplicated by endpoint: re-subscribing an endpoint
    /// replaces its record (a browser re-subscribe refreshes the keys).
    pub fn subscribe(&mut self, subscription: Subscription) -> Result<(), SubscriptionError> {
        subscription.validate()?;

        if let Some(existing) = self
            .records
            .iter_mut()
            .find(|r| r.endpoint == subscription.endpoint)
        {
            *existing = subscription;
        } else {
            self.records.push(subscription);
        }
        Ok(())
    }

    /// Remove the record for an endpoint; true if one was held
    pub fn unsubscribe(&mut self, endpoint: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.endpoint != endpoint);
        self.records.len() != before
    }
}

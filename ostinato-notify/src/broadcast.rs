//! Best-effort broadcast across all held subscriptions

use crate::store::SubscriptionStore;
use crate::subscription::Subscription;
use serde::Serialize;
use thiserror::Error;

/// Broadcast-level failures
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("no subscriptions available")]
    NoSubscriptions,
    #[error("payload serialization failed: {0}")]
    Payload(String),
}

/// A single delivery failure, reported by the transport
#[derive(Debug, Error)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// The message fanned out to every endpoint
#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
}

impl NotificationPayload {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            title: "Ostinato Notification".to_string(),
            body: body.into(),
            icon: "/icon-192x192.png".to_string(),
        }
    }
}

/// Wire delivery for one subscription.
///
/// Implementors handle the actual push protocol (VAPID signing, payload
/// encryption, the HTTP POST). This crate only cares whether each delivery
/// succeeded.
pub trait PushTransport {
    fn deliver(&self, subscription: &Subscription, payload_json: &str)
        -> Result<(), DeliveryError>;
}

/// Transport that records deliveries in the log instead of sending them.
///
/// Stands in wherever no push service is configured.
#[derive(Debug, Default)]
pub struct LoggingTransport;

impl PushTransport for LoggingTransport {
    fn deliver(
        &self,
        subscription: &Subscription,
        payload_json: &str,
    ) -> Result<(), DeliveryError> {
        tracing::info!(
            endpoint = %subscription.endpoint,
            payload = payload_json,
            "push delivery (logging transport)"
        );
        Ok(())
    }
}

/// Aggregate result of a broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Fans one payload out to every record in a store
pub struct Broadcaster<T: PushTransport> {
    transport: T,
}

impl<T: PushTransport> Broadcaster<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Attempt delivery to every held record independently.
    ///
    /// Per-record failures are counted, never escalated; only an empty
    /// store fails the whole operation.
    pub fn broadcast(
        &self,
        store: &SubscriptionStore,
        payload: &NotificationPayload,
    ) -> Result<BroadcastReport, NotifyError> {
        if store.is_empty() {
            return Err(NotifyError::NoSubscriptions);
        }

        let payload_json =
            serde_json::to_string(payload).map_err(|e| NotifyError::Payload(e.to_string()))?;

        let mut report = BroadcastReport::default();
        for subscription in store.records() {
            match self.transport.deliver(subscription, &payload_json) {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    tracing::warn!(endpoint = %subscription.endpoint, "push delivery failed: {e}");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "broadcast complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Transport that fails for endpoints containing "invalid"
    struct FlakyTransport;

    impl PushTransport for FlakyTransport {
        fn deliver(
            &self,
            subscription: &Subscription,
            _payload_json: &str,
        ) -> Result<(), DeliveryError> {
            if subscription.endpoint.contains("invalid") {
                Err(DeliveryError("endpoint gone".into()))
            } else {
                Ok(())
            }
        }
    }

    fn store_with(endpoints: &[&str]) -> SubscriptionStore {
        let mut store = SubscriptionStore::new();
        for ep in endpoints {
            store
                .subscribe(Subscription::new(*ep, "key", "auth"))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_empty_store_is_hard_failure() {
        let broadcaster = Broadcaster::new(LoggingTransport);
        let store = SubscriptionStore::new();
        let err = broadcaster
            .broadcast(&store, &NotificationPayload::new("hello"))
            .unwrap_err();
        assert!(matches!(err, NotifyError::NoSubscriptions));
    }

    #[test]
    fn test_partial_failure_is_counted_not_raised() {
        let broadcaster = Broadcaster::new(FlakyTransport);
        let store = store_with(&[
            "https://push.example/a",
            "https://push.example/invalid",
            "https://push.example/c",
        ]);

        let report = broadcaster
            .broadcast(&store, &NotificationPayload::new("hello"))
            .unwrap();
        assert_eq!(
            report,
            BroadcastReport {
                succeeded: 2,
                failed: 1
            }
        );
    }

    #[test]
    fn test_all_deliveries_attempted() {
        let broadcaster = Broadcaster::new(LoggingTransport);
        let store = store_with(&["https://push.example/a", "https://push.example/b"]);

        let report = broadcaster
            .broadcast(&store, &NotificationPayload::new("hello"))
            .unwrap();
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn test_payload_wire_shape() {
        let payload = NotificationPayload::new("loop saved");
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains(r#""title":"Ostinato Notification""#));
        assert!(json.contains(r#""body":"loop saved""#));
        assert!(json.contains(r#""icon":"/icon-192x192.png""#));
    }
}

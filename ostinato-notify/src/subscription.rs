//! Push subscription records and validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a subscription record is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("subscription is missing an endpoint")]
    MissingEndpoint,
    #[error("subscription is missing its p256dh key")]
    MissingP256dh,
    #[error("subscription is missing its auth key")]
    MissingAuth,
    #[error("subscription is not valid JSON: {0}")]
    Malformed(String),
}

/// Client key material for payload encryption
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    #[serde(default)]
    pub p256dh: String,
    #[serde(default)]
    pub auth: String,
}

/// A push subscription as registered by a browser:
/// `{endpoint, keys: {p256dh, auth}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub keys: SubscriptionKeys,
}

impl Subscription {
    pub fn new(
        endpoint: impl Into<String>,
        p256dh: impl Into<String>,
        auth: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            keys: SubscriptionKeys {
                p256dh: p256dh.into(),
                auth: auth.into(),
            },
        }
    }

    /// A record is usable only with an endpoint and both keys
    pub fn validate(&self) -> Result<(), SubscriptionError> {
        if self.endpoint.is_empty() {
            return Err(SubscriptionError::MissingEndpoint);
        }
        if self.keys.p256dh.is_empty() {
            return Err(SubscriptionError::MissingP256dh);
        }
        if self.keys.auth.is_empty() {
            return Err(SubscriptionError::MissingAuth);
        }
        Ok(())
    }

    /// Parse and validate a record from its JSON wire shape
    pub fn from_json(raw: &str) -> Result<Self, SubscriptionError> {
        let sub: Subscription = serde_json::from_str(raw)
            .map_err(|e| SubscriptionError::Malformed(e.to_string()))?;
        sub.validate()?;
        Ok(sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_record_is_valid() {
        let sub = Subscription::new("https://push.example/ep1", "key", "auth");
        assert_eq!(sub.validate(), Ok(()));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let no_endpoint = Subscription::new("", "key", "auth");
        assert_eq!(no_endpoint.validate(), Err(SubscriptionError::MissingEndpoint));

        let no_p256dh = Subscription::new("https://push.example/ep1", "", "auth");
        assert_eq!(no_p256dh.validate(), Err(SubscriptionError::MissingP256dh));

        let no_auth = Subscription::new("https://push.example/ep1", "key", "");
        assert_eq!(no_auth.validate(), Err(SubscriptionError::MissingAuth));
    }

    #[test]
    fn test_from_json_wire_shape() {
        let raw = r#"{"endpoint":"https://push.example/ep1","keys":{"p256dh":"k","auth":"a"}}"#;
        let sub = Subscription::from_json(raw).unwrap();
        assert_eq!(sub.endpoint, "https://push.example/ep1");
        assert_eq!(sub.keys.p256dh, "k");
        assert_eq!(sub.keys.auth, "a");
    }

    #[test]
    fn test_from_json_missing_auth_key() {
        let raw = r#"{"endpoint":"https://push.example/ep1","keys":{"p256dh":"k"}}"#;
        assert_eq!(
            Subscription::from_json(raw),
            Err(SubscriptionError::MissingAuth)
        );
    }

    #[test]
    fn test_from_json_garbage() {
        assert!(matches!(
            Subscription::from_json("not json at all"),
            Err(SubscriptionError::Malformed(_))
        ));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::AuthenticationFactor;

/// Request metadata recorded alongside a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An authenticated session.
///
/// The three lifecycle instants arrive as ISO 8601 strings and are exposed
/// as typed instants. `custom_claims` is encoded back as `null` when the
/// service sent `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub authentication_factors: Vec<AuthenticationFactor>,
    #[serde(default)]
    pub custom_claims: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// Returns true if the session has expired relative to `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeliveryMethod, FactorDetails};
    use chrono::TimeZone;
    use serde_json::json;

    fn session_json() -> Value {
        json!({
            "session_id": "session-test-1",
            "user_id": "user-test-1",
            "started_at": "2023-12-31T23:00:00Z",
            "last_accessed_at": "2023-12-31T23:30:00+00:00",
            "expires_at": "2024-01-01T00:00:00Z",
            "attributes": {"ip_address": "203.0.113.1", "user_agent": "curl/8"},
            "authentication_factors": [{
                "delivery_method": "knowledge",
                "type": "password",
                "last_authenticated_at": "2023-12-31T23:00:00Z"
            }],
            "custom_claims": {"role": "admin"}
        })
    }

    #[test]
    fn test_session_expires_at_is_typed_instant() {
        let session: Session = serde_json::from_value(session_json()).unwrap();

        assert_eq!(
            session.expires_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            session.last_accessed_at,
            Utc.with_ymd_and_hms(2023, 12, 31, 23, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_session_factors_and_attributes() {
        let session: Session = serde_json::from_value(session_json()).unwrap();

        assert_eq!(session.attributes.ip_address.as_deref(), Some("203.0.113.1"));
        assert_eq!(session.authentication_factors.len(), 1);

        let factor = &session.authentication_factors[0];
        assert_eq!(factor.delivery_method, DeliveryMethod::Knowledge);
        assert_eq!(factor.details, FactorDetails::Password);
    }

    #[test]
    fn test_session_round_trip_keeps_nulls_and_nested_fields() {
        let wire = json!({
            "session_id": "session-test-2",
            "user_id": "user-test-1",
            "started_at": "2023-12-31T23:00:00Z",
            "last_accessed_at": "2023-12-31T23:30:00Z",
            "expires_at": "2024-01-01T00:00:00Z",
            "attributes": {"ip_address": "203.0.113.1", "user_agent": "curl/8", "country": "DE"},
            "authentication_factors": [{
                "delivery_method": "email",
                "type": "magic_link",
                "last_authenticated_at": "2023-12-31T23:00:00Z",
                "email_factor": {"email_id": "email-1", "email_address": "ada@example.com"}
            }],
            "custom_claims": null,
            "roles": ["stytch_user"]
        });

        let session: Session = serde_json::from_value(wire.clone()).unwrap();
        assert!(session.custom_claims.is_none());
        assert_eq!(session.attributes.extra["country"], "DE");
        assert_eq!(session.extra["roles"], json!(["stytch_user"]));

        assert_eq!(serde_json::to_value(&session).unwrap(), wire);
    }

    #[test]
    fn test_session_is_expired_at() {
        let session: Session = serde_json::from_value(session_json()).unwrap();

        assert!(!session.is_expired_at(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap()));
        assert!(session.is_expired_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    }
}

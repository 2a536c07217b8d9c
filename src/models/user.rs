use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Public representation of a user account.
///
/// The password hash and the avatar blob are deliberately not part of this
/// struct; queries that produce a `User` never select them, so they cannot
/// leak into a response body.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Unique login identifier, stored lowercase.
    pub email: String,
    /// Optional, non-negative.
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The explicit schema of user fields a client may change.
///
/// `deny_unknown_fields` is the allow-list enforcement point: a payload
/// containing any other key fails deserialization with a 400 before any
/// mutation is applied. Partial payloads over the allowed fields are fine.
#[derive(Debug, Deserialize, Validate, Default)]
#[serde(deny_unknown_fields)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    /// Replacement password; hashed by the write path before storage.
    #[validate(length(min = 6))]
    pub password: Option<String>,

    #[validate(range(min = 0))]
    pub age: Option<i32>,
}

impl UserUpdate {
    /// True when no mutable field is present; the update is then a no-op.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none() && self.age.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_user_update_validation() {
        let update = UserUpdate {
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            password: Some("password123".to_string()),
            age: Some(36),
        };
        assert!(update.validate().is_ok());

        let update = UserUpdate {
            email: Some("invalid-email".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UserUpdate {
            password: Some("short".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UserUpdate {
            age: Some(-3),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_user_update_rejects_unknown_fields() {
        // `owner` is not a mutable user field; the whole payload must fail.
        let payload = serde_json::json!({ "name": "Ada", "owner": 9 });
        let parsed: Result<UserUpdate, _> = serde_json::from_value(payload);
        assert!(parsed.is_err());

        let payload = serde_json::json!({ "id": 5 });
        let parsed: Result<UserUpdate, _> = serde_json::from_value(payload);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_user_update_partial_payload_is_ok() {
        let payload = serde_json::json!({ "age": 30 });
        let parsed: UserUpdate = serde_json::from_value(payload).unwrap();
        assert_eq!(parsed.age, Some(30));
        assert!(!parsed.is_empty());

        let parsed: UserUpdate = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_user_serialization_has_no_secret_material() {
        let user = User {
            id: 1,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            age: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert!(!keys.contains(&"password"));
        assert!(!keys.contains(&"password_hash"));
        assert!(!keys.contains(&"avatar"));
    }
}

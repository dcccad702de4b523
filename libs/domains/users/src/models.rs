use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// User entity as stored in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
}

/// Incoming payload for create and update operations.
///
/// All fields are optional at the serde level so that missing fields produce
/// validation errors (with field-specific messages) instead of a
/// deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UserRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters")
    )]
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,

    #[validate(
        required(message = "Email is required"),
        email(message = "Email should be valid"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,

    #[validate(
        required(message = "Age is required"),
        range(min = 0, max = 150, message = "Age must be between 0 and 150")
    )]
    #[schema(example = 30)]
    pub age: Option<i32>,
}

impl UserRequest {
    /// Convert a validated request into a persistence record.
    ///
    /// Call only after `validate()` has passed; the field defaults are never
    /// observable on the happy path.
    pub fn into_record(self, id: Option<i64>) -> UserRecord {
        UserRecord {
            id,
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            age: self.age.unwrap_or_default(),
        }
    }
}

/// Client-facing projection of a [`User`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
    /// Creation timestamp in RFC 3339 format
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: user.created_at,
        }
    }
}

/// Input to [`crate::repository::UserRepository::save`].
///
/// `id: None` inserts a new row (the store assigns the id and stamps
/// `created_at`); `id: Some` updates name/email/age of the matching row.
/// `id` and `created_at` are never mutated by an update.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub age: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> UserRequest {
        UserRequest {
            name: Some("Jane Doe".to_string()),
            email: Some("jane@example.com".to_string()),
            age: Some(30),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_report_per_field_messages() {
        let request = UserRequest {
            name: None,
            email: None,
            age: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("age"));
    }

    #[test]
    fn test_invalid_email_rejected() {
        let request = UserRequest {
            email: Some("not-an-email".to_string()),
            ..valid_request()
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        let message = fields["email"][0].message.as_ref().unwrap();
        assert_eq!(message, "Email should be valid");
    }

    #[test]
    fn test_age_out_of_range_rejected() {
        let request = UserRequest {
            age: Some(151),
            ..valid_request()
        };
        assert!(request.validate().is_err());

        let request = UserRequest {
            age: Some(-1),
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let request = UserRequest {
            name: Some(String::new()),
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_into_record_carries_fields() {
        let record = valid_request().into_record(Some(7));
        assert_eq!(record.id, Some(7));
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.email, "jane@example.com");
        assert_eq!(record.age, 30);
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = UserResponse {
            id: 1,
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            age: 30,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
    }
}

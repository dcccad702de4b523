//! User lifecycle events and the publisher abstraction.
//!
//! Delivery is best-effort and fire-and-forget: implementations log the
//! outcome and never propagate failures, so a committed write is never
//! rolled back by the message bus.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::User;

/// Lifecycle transitions that produce an event.
///
/// Updates intentionally produce none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserEventType {
    Created,
    Deleted,
}

/// Event published when a user is created or deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEvent {
    pub event_type: UserEventType,
    pub email: String,
    pub user_id: i64,
    pub timestamp: DateTime<Utc>,
}

impl UserEvent {
    pub fn created(user: &User) -> Self {
        Self::new(UserEventType::Created, user)
    }

    pub fn deleted(user: &User) -> Self {
        Self::new(UserEventType::Deleted, user)
    }

    fn new(event_type: UserEventType, user: &User) -> Self {
        Self {
            event_type,
            email: user.email.clone(),
            user_id: user.id,
            timestamp: Utc::now(),
        }
    }
}

/// Publisher abstraction for user lifecycle events
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserEventPublisher: Send + Sync {
    async fn publish_user_event(&self, event: &UserEvent);
}

/// Fallback publisher used when no message bus is configured.
///
/// Logs the event at info level; the default in development and tests.
#[derive(Debug, Default, Clone)]
pub struct LoggingUserEventPublisher;

#[async_trait]
impl UserEventPublisher for LoggingUserEventPublisher {
    async fn publish_user_event(&self, event: &UserEvent) {
        info!(
            event_type = ?event.event_type,
            user_id = event.user_id,
            email = %event.email,
            "User event (bus disabled)"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 7,
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            age: 30,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_created_event_fields() {
        let event = UserEvent::created(&user());
        assert_eq!(event.event_type, UserEventType::Created);
        assert_eq!(event.email, "jane@example.com");
        assert_eq!(event.user_id, 7);
    }

    #[test]
    fn test_event_wire_shape() {
        let event = UserEvent::deleted(&user());
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["eventType"], "DELETED");
        assert_eq!(value["email"], "jane@example.com");
        assert_eq!(value["userId"], 7);
        assert!(value.get("timestamp").is_some());
    }
}

use async_nats::{Client, HeaderMap};
use async_trait::async_trait;
use tracing::{error, info, instrument};

use crate::events::{UserEvent, UserEventPublisher};

/// Header carrying the partitioning key (the user's email). Consumers that
/// shard by email read it without deserializing the payload.
pub const USER_EMAIL_HEADER: &str = "User-Email";

/// NATS-backed [`UserEventPublisher`].
///
/// Events for the same user are published over one connection in call
/// order, which preserves per-user event ordering.
#[derive(Clone)]
pub struct NatsUserEventPublisher {
    client: Client,
    subject: String,
}

impl NatsUserEventPublisher {
    pub fn new(client: Client, subject: impl Into<String>) -> Self {
        Self {
            client,
            subject: subject.into(),
        }
    }

    /// Flush buffered publishes; called by the binary during shutdown.
    pub async fn flush(&self) {
        if let Err(e) = self.client.flush().await {
            error!(error = %e, "Failed to flush NATS client");
        }
    }
}

#[async_trait]
impl UserEventPublisher for NatsUserEventPublisher {
    #[instrument(skip(self, event), fields(subject = %self.subject))]
    async fn publish_user_event(&self, event: &UserEvent) {
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "Failed to serialize user event");
                return;
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(USER_EMAIL_HEADER, event.email.as_str());

        match self
            .client
            .publish_with_headers(self.subject.clone(), headers, payload.into())
            .await
        {
            Ok(_) => {
                info!(
                    event_type = ?event.event_type,
                    user_id = event.user_id,
                    "User event published"
                );
            }
            Err(e) => {
                error!(
                    error = %e,
                    event_type = ?event.event_type,
                    user_id = event.user_id,
                    "Failed to publish user event"
                );
            }
        }
    }
}

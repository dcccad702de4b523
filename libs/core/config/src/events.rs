use crate::{env_or_default, ConfigError, FromEnv};

/// Message-bus configuration for lifecycle event publishing.
///
/// The bus is optional: when `NATS_URL` is unset the application falls back to
/// a logging publisher, so a missing broker never blocks startup.
#[derive(Clone, Debug)]
pub struct EventsConfig {
    /// NATS endpoint, e.g. "nats://localhost:4222". `None` disables the bus.
    pub url: Option<String>,
    /// Subject user lifecycle events are published to.
    pub topic: String,
}

impl EventsConfig {
    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }
}

impl FromEnv for EventsConfig {
    /// Reads from environment variables:
    /// - NATS_URL: optional, no default
    /// - USER_EVENTS_TOPIC: defaults to "user-events"
    fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var("NATS_URL").ok().filter(|v| !v.is_empty());
        let topic = env_or_default("USER_EVENTS_TOPIC", "user-events");

        Ok(Self { url, topic })
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            url: None,
            topic: "user-events".to_string(),
        }
    }
}

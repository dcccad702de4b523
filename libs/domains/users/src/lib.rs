//! User domain: models, repository, service, event publishing, and HTTP handlers.
//!
//! The domain is self-contained: the binary wires a repository implementation
//! and an event publisher into [`UserService`] and mounts
//! [`handlers::router`] under its public base path.

pub mod entity;
pub mod error;
pub mod events;
pub mod handlers;
pub mod links;
pub mod models;
pub mod nats;
pub mod postgres;
pub mod repository;
pub mod resource;
pub mod service;

pub use error::{UserError, UserResult};
pub use events::{LoggingUserEventPublisher, UserEvent, UserEventPublisher, UserEventType};
pub use handlers::ApiDoc;
pub use links::UserLinks;
pub use models::{User, UserRecord, UserRequest, UserResponse};
pub use nats::NatsUserEventPublisher;
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use resource::{UserCollection, UserResource};
pub use service::UserService;

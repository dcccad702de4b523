use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserRecord};

/// Repository trait for User persistence.
///
/// Email comparisons are literal (case-sensitive): the stored value is the
/// value compared against.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert (`record.id == None`) or update (`record.id == Some`) a user.
    ///
    /// Insert assigns the id and stamps `created_at`; update rewrites
    /// name/email/age of the matching row and fails with `NotFound` when the
    /// row does not exist. Neither path mutates `id` or `created_at`.
    async fn save(&self, record: UserRecord) -> UserResult<User>;

    /// Get a user by ID
    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>>;

    /// Get a user by email (literal equality)
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Check if a user with this email exists
    async fn exists_by_email(&self, email: &str) -> UserResult<bool>;

    /// Check if a user other than `id` holds this email
    async fn exists_by_email_and_id_not(&self, email: &str, id: i64) -> UserResult<bool>;

    /// List all users ordered by id ascending
    async fn find_all(&self) -> UserResult<Vec<User>>;

    /// Delete a user by ID; `NotFound` when absent
    async fn delete_by_id(&self, id: i64) -> UserResult<()>;
}

/// In-memory implementation of UserRepository (for development/testing).
///
/// A `BTreeMap` keyed by id gives the same id-ascending iteration order as
/// the Postgres implementation.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<BTreeMap<i64, User>>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, record: UserRecord) -> UserResult<User> {
        let mut users = self.users.write().await;

        match record.id {
            None => {
                // Mirrors the unique index on email
                if users.values().any(|u| u.email == record.email) {
                    return Err(UserError::DuplicateEmail(record.email));
                }

                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                let user = User {
                    id,
                    name: record.name,
                    email: record.email,
                    age: record.age,
                    created_at: Utc::now(),
                };
                users.insert(id, user.clone());

                tracing::info!(user_id = id, email = %user.email, "Created user");
                Ok(user)
            }
            Some(id) => {
                if users
                    .values()
                    .any(|u| u.id != id && u.email == record.email)
                {
                    return Err(UserError::DuplicateEmail(record.email));
                }

                let user = users.get_mut(&id).ok_or(UserError::NotFound(id))?;
                user.name = record.name;
                user.email = record.email;
                user.age = record.age;

                tracing::info!(user_id = id, "Updated user");
                Ok(user.clone())
            }
        }
    }

    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.email == email))
    }

    async fn exists_by_email_and_id_not(&self, email: &str, id: i64) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.id != id && u.email == email))
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }

    async fn delete_by_id(&self, id: i64) -> UserResult<()> {
        let mut users = self.users.write().await;

        if users.remove(&id).is_some() {
            tracing::info!(user_id = id, "Deleted user");
            Ok(())
        } else {
            Err(UserError::NotFound(id))
        }
    }
}

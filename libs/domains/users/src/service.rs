use std::sync::Arc;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::events::{UserEvent, UserEventPublisher};
use crate::models::{UserRequest, UserResponse};
use crate::repository::UserRepository;

/// Service layer for User business logic.
///
/// Validates requests, enforces the email-uniqueness pre-checks, and
/// publishes lifecycle events after successful writes. Event publishing is
/// fire-and-forget: a failed publish never fails the request.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    publisher: Arc<dyn UserEventPublisher>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, publisher: Arc<dyn UserEventPublisher>) -> Self {
        Self {
            repository: Arc::new(repository),
            publisher,
        }
    }

    /// Create a new user and publish a CREATED event
    pub async fn create_user(&self, request: UserRequest) -> UserResult<UserResponse> {
        request.validate()?;
        let record = request.into_record(None);

        if self.repository.exists_by_email(&record.email).await? {
            return Err(UserError::DuplicateEmail(record.email));
        }

        let user = self.repository.save(record).await?;
        self.publisher
            .publish_user_event(&UserEvent::created(&user))
            .await;

        Ok(user.into())
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> UserResult<UserResponse> {
        self.repository
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or(UserError::NotFound(id))
    }

    /// List all users, id ascending
    pub async fn get_all_users(&self) -> UserResult<Vec<UserResponse>> {
        let users = self.repository.find_all().await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Update an existing user.
    ///
    /// No event is published for updates.
    pub async fn update_user(&self, id: i64, request: UserRequest) -> UserResult<UserResponse> {
        request.validate()?;
        let record = request.into_record(Some(id));

        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if self
            .repository
            .exists_by_email_and_id_not(&record.email, id)
            .await?
        {
            return Err(UserError::DuplicateEmail(record.email));
        }

        let user = self.repository.save(record).await?;
        Ok(user.into())
    }

    /// Delete a user and publish a DELETED event carrying the prior email
    pub async fn delete_user(&self, id: i64) -> UserResult<()> {
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        self.repository.delete_by_id(id).await?;
        self.publisher
            .publish_user_event(&UserEvent::deleted(&user))
            .await;

        Ok(())
    }

    /// Get a user by email (literal equality)
    pub async fn get_user_by_email(&self, email: &str) -> UserResult<UserResponse> {
        self.repository
            .find_by_email(email)
            .await?
            .map(Into::into)
            .ok_or_else(|| UserError::NotFoundByEmail(email.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{MockUserEventPublisher, UserEventType};
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Publisher that records every event it receives
    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<UserEvent>>,
    }

    #[async_trait]
    impl UserEventPublisher for RecordingPublisher {
        async fn publish_user_event(&self, event: &UserEvent) {
            self.events.lock().await.push(event.clone());
        }
    }

    fn request(name: &str, email: &str, age: i32) -> UserRequest {
        UserRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            age: Some(age),
        }
    }

    fn service_with_recorder() -> (UserService<InMemoryUserRepository>, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher::default());
        let service = UserService::new(InMemoryUserRepository::new(), publisher.clone());
        (service, publisher)
    }

    #[tokio::test]
    async fn test_create_user_assigns_id_and_publishes_created() {
        let (service, publisher) = service_with_recorder();

        let created = service
            .create_user(request("Jane", "jane@example.com", 30))
            .await
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.name, "Jane");
        assert_eq!(created.email, "jane@example.com");
        assert_eq!(created.age, 30);

        let events = publisher.events.lock().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, UserEventType::Created);
        assert_eq!(events[0].email, "jane@example.com");
        assert_eq!(events[0].user_id, created.id);
    }

    #[tokio::test]
    async fn test_create_duplicate_email_conflicts_and_publishes_nothing() {
        let (service, publisher) = service_with_recorder();
        service
            .create_user(request("Jane", "jane@example.com", 30))
            .await
            .unwrap();

        let result = service
            .create_user(request("Other", "jane@example.com", 40))
            .await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
        assert_eq!(publisher.events.lock().await.len(), 1); // only the first create
    }

    #[tokio::test]
    async fn test_create_invalid_request_is_rejected_before_persistence() {
        let (service, publisher) = service_with_recorder();

        let result = service
            .create_user(UserRequest {
                name: Some("Jane".to_string()),
                email: Some("not-an-email".to_string()),
                age: None,
            })
            .await;

        assert!(matches!(result, Err(UserError::Validation(_))));
        assert!(service.get_all_users().await.unwrap().is_empty());
        assert!(publisher.events.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_preserves_identity_and_publishes_no_event() {
        let (service, publisher) = service_with_recorder();
        let created = service
            .create_user(request("Jane", "jane@example.com", 30))
            .await
            .unwrap();

        let updated = service
            .update_user(created.id, request("Janet", "janet@example.com", 31))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Janet");
        assert_eq!(updated.email, "janet@example.com");

        // Still only the CREATED event
        assert_eq!(publisher.events.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let (service, _) = service_with_recorder();

        let result = service
            .update_user(99, request("Jane", "jane@example.com", 30))
            .await;

        assert!(matches!(result, Err(UserError::NotFound(99))));
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let (service, _) = service_with_recorder();
        service
            .create_user(request("A", "a@example.com", 20))
            .await
            .unwrap();
        let second = service
            .create_user(request("B", "b@example.com", 30))
            .await
            .unwrap();

        let result = service
            .update_user(second.id, request("B", "a@example.com", 30))
            .await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_update_keeping_own_email_is_allowed() {
        let (service, _) = service_with_recorder();
        let created = service
            .create_user(request("Jane", "jane@example.com", 30))
            .await
            .unwrap();

        let updated = service
            .update_user(created.id, request("Janet", "jane@example.com", 31))
            .await
            .unwrap();

        assert_eq!(updated.name, "Janet");
    }

    #[tokio::test]
    async fn test_delete_publishes_deleted_with_prior_email() {
        let (service, publisher) = service_with_recorder();
        let created = service
            .create_user(request("Jane", "jane@example.com", 30))
            .await
            .unwrap();

        service.delete_user(created.id).await.unwrap();

        let events = publisher.events.lock().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event_type, UserEventType::Deleted);
        assert_eq!(events[1].email, "jane@example.com");
        assert_eq!(events[1].user_id, created.id);
        drop(events);

        let result = service.get_user_by_id(created.id).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let (service, publisher) = service_with_recorder();

        let result = service.delete_user(42).await;

        assert!(matches!(result, Err(UserError::NotFound(42))));
        assert!(publisher.events.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_all_users_is_id_ascending() {
        let (service, _) = service_with_recorder();
        for (name, email) in [("A", "a@example.com"), ("B", "b@example.com"), ("C", "c@example.com")] {
            service.create_user(request(name, email, 30)).await.unwrap();
        }

        let all = service.get_all_users().await.unwrap();
        let ids: Vec<i64> = all.iter().map(|u| u.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_get_user_by_email_not_found() {
        let (service, _) = service_with_recorder();

        let result = service.get_user_by_email("ghost@example.com").await;

        assert!(matches!(result, Err(UserError::NotFoundByEmail(ref email)) if email == "ghost@example.com"));
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email()
            .returning(|_| Err(UserError::Transient("pool exhausted".to_string())));

        let service = UserService::new(repo, Arc::new(MockUserEventPublisher::new()));

        let result = service
            .create_user(request("Jane", "jane@example.com", 30))
            .await;

        assert!(matches!(result, Err(UserError::Transient(_))));
    }

    #[tokio::test]
    async fn test_create_checks_email_before_saving() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email()
            .with(mockall::predicate::eq("jane@example.com"))
            .times(1)
            .returning(|_| Ok(true));
        // No expect_save: saving after a positive pre-check would panic

        let service = UserService::new(repo, Arc::new(MockUserEventPublisher::new()));

        let result = service
            .create_user(request("Jane", "jane@example.com", 30))
            .await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_duplicate_from_unique_index_surfaces_as_conflict() {
        // The pre-check can miss a concurrent insert; the index violation
        // from save must still map to a conflict.
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email().returning(|_| Ok(false));
        repo.expect_save().returning(|record| {
            Err(UserError::DuplicateEmail(record.email))
        });

        let service = UserService::new(repo, Arc::new(MockUserEventPublisher::new()));

        let result = service
            .create_user(request("Jane", "jane@example.com", 30))
            .await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }
}

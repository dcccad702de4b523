use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{User, UserRecord},
    repository::UserRepository,
};

/// PostgreSQL implementation of [`UserRepository`] over SeaORM.
///
/// The unique index on `users.email` is the ground truth for email
/// uniqueness: service-level pre-checks are best-effort, and a violating
/// write surfaces here as `DuplicateEmail`.
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn save(&self, record: UserRecord) -> UserResult<User> {
        match record.id {
            None => {
                // id and created_at are filled by the database
                let active = entity::ActiveModel {
                    name: Set(record.name),
                    email: Set(record.email.clone()),
                    age: Set(record.age),
                    ..Default::default()
                };

                let model = active
                    .insert(&self.db)
                    .await
                    .map_err(|e| map_write_err(e, &record.email))?;

                tracing::info!(user_id = model.id, email = %model.email, "Created user");
                Ok(model.into())
            }
            Some(id) => {
                // Load and rewrite inside one transaction
                let txn = self.db.begin().await.map_err(map_db_err)?;

                let model = entity::Entity::find_by_id(id)
                    .one(&txn)
                    .await
                    .map_err(map_db_err)?
                    .ok_or(UserError::NotFound(id))?;

                let mut active = model.into_active_model();
                active.name = Set(record.name);
                active.email = Set(record.email.clone());
                active.age = Set(record.age);

                let updated = active
                    .update(&txn)
                    .await
                    .map_err(|e| map_write_err(e, &record.email))?;

                txn.commit().await.map_err(map_db_err)?;

                tracing::info!(user_id = id, "Updated user");
                Ok(updated.into())
            }
        }
    }

    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.map(|m| m.into()))
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.map(|m| m.into()))
    }

    async fn exists_by_email(&self, email: &str) -> UserResult<bool> {
        let exists = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .is_some();

        Ok(exists)
    }

    async fn exists_by_email_and_id_not(&self, email: &str, id: i64) -> UserResult<bool> {
        let exists = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .filter(entity::Column::Id.ne(id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .is_some();

        Ok(exists)
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn delete_by_id(&self, id: i64) -> UserResult<()> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(UserError::NotFound(id));
        }

        tracing::info!(user_id = id, "Deleted user");
        Ok(())
    }
}

/// Map write errors, surfacing unique-index violations as `DuplicateEmail`.
fn map_write_err(e: DbErr, email: &str) -> UserError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            UserError::DuplicateEmail(email.to_string())
        }
        _ => map_db_err(e),
    }
}

fn map_db_err(e: DbErr) -> UserError {
    match e {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => UserError::Transient(e.to_string()),
        _ => UserError::Internal(format!("Database error: {}", e)),
    }
}

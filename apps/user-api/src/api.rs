use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_helpers::server::{run_health_checks, HealthCheckFuture};
use sea_orm::DatabaseConnection;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix is added by the `create_router` helper, so the user
/// routes end up under `/api/users`.
pub fn routes<R>(service: domain_users::UserService<R>) -> Router
where
    R: domain_users::UserRepository + 'static,
{
    Router::new().nest("/users", domain_users::handlers::router(service, "/api/users"))
}

/// Creates a router with the /ready endpoint backed by a live database check
pub fn ready_router(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/ready", get(ready_handler))
        .with_state(db)
}

/// Readiness check that pings the database
async fn ready_handler(State(db): State<DatabaseConnection>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            database::postgres::check_health(&db)
                .await
                .map_err(|e| format!("Database ping failed: {}", e))
        }),
    )];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}

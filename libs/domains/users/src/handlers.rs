use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
    ValidatedJson,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::links::{Link, UserLinks};
use crate::models::{UserRequest, UserResponse};
use crate::repository::UserRepository;
use crate::resource::{
    collection_model, email_entity_model, entity_model, UserCollection, UserResource,
};
use crate::service::UserService;

const TAG: &str = "users";

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        get_all_users,
        create_user,
        get_user_by_id,
        update_user,
        delete_user,
        get_user_by_email,
    ),
    components(
        schemas(UserRequest, UserResponse, UserResource, UserCollection, Link),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "User management endpoints")
    )
)]
pub struct ApiDoc;

struct AppState<R: UserRepository> {
    service: UserService<R>,
    links: UserLinks,
}

/// Create the user router with all HTTP endpoints.
///
/// `base_path` is the public path the router is mounted at (e.g.
/// `/api/users`); the hypermedia links in every response are built from it.
pub fn router<R: UserRepository + 'static>(service: UserService<R>, base_path: &str) -> Router {
    let state = Arc::new(AppState {
        service,
        links: UserLinks::new(base_path),
    });

    Router::new()
        .route("/health", get(health))
        .route("/", get(get_all_users).post(create_user))
        .route(
            "/{id}",
            get(get_user_by_id).put(update_user).delete(delete_user),
        )
        .route("/email/{email}", get(get_user_by_email))
        .with_state(state)
}

/// Liveness probe for the user routes
#[utoipa::path(
    get,
    path = "/health",
    tag = TAG,
    responses(
        (status = 200, description = "Service is running", body = String)
    )
)]
async fn health() -> &'static str {
    "User Service is running"
}

/// List all users
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "All users, id ascending", body = UserCollection),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_all_users<R: UserRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> UserResult<Json<UserCollection>> {
    let users = state.service.get_all_users().await?;
    Ok(Json(collection_model(users, &state.links)))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResource),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(state): State<Arc<AppState<R>>>,
    ValidatedJson(input): ValidatedJson<UserRequest>,
) -> UserResult<impl IntoResponse> {
    let user = state.service.create_user(input).await?;
    let resource = entity_model(user, &state.links, false);
    Ok((StatusCode::CREATED, Json(resource)))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResource),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user_by_id<R: UserRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<i64>,
) -> UserResult<Json<UserResource>> {
    let user = state.service.get_user_by_id(id).await?;
    Ok(Json(entity_model(user, &state.links, true)))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = UserResource),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<i64>,
    ValidatedJson(input): ValidatedJson<UserRequest>,
) -> UserResult<Json<UserResource>> {
    let user = state.service.update_user(id, input).await?;
    Ok(Json(entity_model(user, &state.links, false)))
}

/// Delete a user.
///
/// The empty response carries a `Link` header pointing back at the
/// collection.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<i64>,
) -> UserResult<impl IntoResponse> {
    state.service.delete_user(id).await?;

    let link = format!("<{}>; rel=\"all-users\"", state.links.all().href);
    Ok((StatusCode::NO_CONTENT, [(header::LINK, link)]))
}

/// Get a user by email
#[utoipa::path(
    get,
    path = "/email/{email}",
    tag = TAG,
    params(
        ("email" = String, Path, description = "User email address")
    ),
    responses(
        (status = 200, description = "User found", body = UserResource),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user_by_email<R: UserRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(email): Path<String>,
) -> UserResult<Json<UserResource>> {
    let user = state.service.get_user_by_email(&email).await?;
    Ok(Json(email_entity_model(user, &state.links)))
}

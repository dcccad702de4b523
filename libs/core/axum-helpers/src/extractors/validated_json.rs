//! JSON extractor with automatic validation using the validator crate.

use axum::{
    extract::{FromRequest, Json, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Validates the request body using the `validator` crate's `Validate` trait.
/// On failure responds 400 with a flat field-to-message map, e.g.
/// `{"email": "Email should be valid", "age": "Age is required"}` — one
/// message per field, the first declared violation wins.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::post;
/// use axum_helpers::extractors::ValidatedJson;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct CreateUser {
///     #[validate(length(min = 3, max = 50))]
///     username: String,
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn create_user(ValidatedJson(payload): ValidatedJson<CreateUser>) -> String {
///     format!("Creating user: {}", payload.username)
/// }
///
/// let app = Router::new().route("/users", post(create_user));
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| e.into_response())?;

        data.validate().map_err(|e| {
            let body = validation_error_body(&e);
            (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
        })?;

        Ok(ValidatedJson(data))
    }
}

/// Flattens validator errors into a `{field: message}` JSON object.
pub fn validation_error_body(errors: &validator::ValidationErrors) -> serde_json::Value {
    let fields = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let message = errors
                .first()
                .and_then(|err| err.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Invalid value".to_string());
            (field.to_string(), serde_json::json!(message))
        })
        .collect::<serde_json::Map<_, _>>();

    serde_json::Value::Object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(serde::Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
        name: String,
        #[validate(email(message = "Email should be valid"))]
        email: String,
    }

    #[test]
    fn test_validation_error_body_flat_map() {
        let payload = Payload {
            name: "ab".to_string(),
            email: "not-an-email".to_string(),
        };
        let errors = payload.validate().unwrap_err();
        let body = validation_error_body(&errors);

        assert_eq!(body["name"], "Name must be at least 3 characters");
        assert_eq!(body["email"], "Email should be valid");
    }

    #[test]
    fn test_validation_error_body_valid_payload_has_no_errors() {
        let payload = Payload {
            name: "abc".to_string(),
            email: "a@b.com".to_string(),
        };
        assert!(payload.validate().is_ok());
    }
}

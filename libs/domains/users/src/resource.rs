//! Hypermedia envelopes for user responses.
//!
//! Single users are wrapped in an entity model (`{...fields, _links}`),
//! lists in a collection model (`{_embedded: {users: [...]}, _links}`).
//! Links live in a `BTreeMap` so their order on the wire is stable.

use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::links::{Link, UserLinks};
use crate::models::UserResponse;

/// A single user with its hypermedia links
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResource {
    #[serde(flatten)]
    pub user: UserResponse,
    #[serde(rename = "_links")]
    #[schema(value_type = Object)]
    pub links: BTreeMap<&'static str, Link>,
}

/// A list of users with collection-level links
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserCollection {
    #[serde(rename = "_embedded")]
    pub embedded: EmbeddedUsers,
    #[serde(rename = "_links")]
    #[schema(value_type = Object)]
    pub links: BTreeMap<&'static str, Link>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmbeddedUsers {
    pub users: Vec<UserResource>,
}

/// Envelope for create, update, and get-by-id responses.
///
/// `include_email_lookup` adds the `by-email` relation (get-by-id only).
pub fn entity_model(
    user: UserResponse,
    links: &UserLinks,
    include_email_lookup: bool,
) -> UserResource {
    let mut rels = BTreeMap::new();
    rels.insert("self", links.user(user.id));
    rels.insert("all-users", links.all());
    rels.insert("update", links.user(user.id));
    rels.insert("delete", links.user(user.id));
    if include_email_lookup {
        rels.insert("by-email", links.by_email(&user.email));
    }

    UserResource { user, links: rels }
}

/// Envelope for get-by-email responses: `self` points at the email lookup,
/// `by-id` at the canonical resource.
pub fn email_entity_model(user: UserResponse, links: &UserLinks) -> UserResource {
    let mut rels = BTreeMap::new();
    rels.insert("self", links.by_email(&user.email));
    rels.insert("by-id", links.user(user.id));
    rels.insert("all-users", links.all());

    UserResource { user, links: rels }
}

/// Envelope for the user list
pub fn collection_model(users: Vec<UserResponse>, links: &UserLinks) -> UserCollection {
    let users = users
        .into_iter()
        .map(|user| {
            let mut rels = BTreeMap::new();
            rels.insert("self", links.user(user.id));
            rels.insert("update", links.user(user.id));
            rels.insert("delete", links.user(user.id));
            UserResource { user, links: rels }
        })
        .collect();

    let mut rels = BTreeMap::new();
    rels.insert("self", links.all());
    rels.insert("create-user", links.all());

    UserCollection {
        embedded: EmbeddedUsers { users },
        links: rels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn response(id: i64, email: &str) -> UserResponse {
        UserResponse {
            id,
            name: "Jane".to_string(),
            email: email.to_string(),
            age: 30,
            created_at: Utc::now(),
        }
    }

    fn links() -> UserLinks {
        UserLinks::new("/api/users")
    }

    #[test]
    fn test_entity_model_relations() {
        let resource = entity_model(response(1, "jane@example.com"), &links(), false);
        let rels: Vec<&str> = resource.links.keys().copied().collect();
        assert_eq!(rels, vec!["all-users", "delete", "self", "update"]);
        assert_eq!(resource.links["self"].href, "/api/users/1");
    }

    #[test]
    fn test_entity_model_with_email_lookup() {
        let resource = entity_model(response(1, "jane@example.com"), &links(), true);
        assert_eq!(
            resource.links["by-email"].href,
            "/api/users/email/jane%40example.com"
        );
    }

    #[test]
    fn test_email_entity_model_relations() {
        let resource = email_entity_model(response(2, "jane@example.com"), &links());
        assert_eq!(
            resource.links["self"].href,
            "/api/users/email/jane%40example.com"
        );
        assert_eq!(resource.links["by-id"].href, "/api/users/2");
        assert_eq!(resource.links["all-users"].href, "/api/users");
    }

    #[test]
    fn test_collection_model_shape() {
        let collection = collection_model(
            vec![response(1, "a@example.com"), response(2, "b@example.com")],
            &links(),
        );

        assert_eq!(collection.embedded.users.len(), 2);
        assert_eq!(collection.links["self"].href, "/api/users");
        assert_eq!(collection.links["create-user"].href, "/api/users");
        assert_eq!(
            collection.embedded.users[0].links["self"].href,
            "/api/users/1"
        );
    }

    #[test]
    fn test_entity_model_serializes_flat_with_links() {
        let resource = entity_model(response(1, "jane@example.com"), &links(), false);
        let value = serde_json::to_value(&resource).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["email"], "jane@example.com");
        assert_eq!(value["_links"]["self"]["href"], "/api/users/1");
    }
}

use serde::Serialize;
use utoipa::ToSchema;

/// A hypermedia link
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Link {
    #[schema(example = "/api/users/1")]
    pub href: String,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// Builds hrefs from the public base path the user routes are mounted at
/// (e.g. `/api/users`).
#[derive(Debug, Clone)]
pub struct UserLinks {
    base: String,
}

impl UserLinks {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    /// The collection itself
    pub fn all(&self) -> Link {
        Link::new(&self.base)
    }

    /// A single user by id
    pub fn user(&self, id: i64) -> Link {
        Link::new(format!("{}/{}", self.base, id))
    }

    /// Lookup by email; the email is percent-encoded
    pub fn by_email(&self, email: &str) -> Link {
        Link::new(format!("{}/email/{}", self.base, urlencoding::encode(email)))
    }
}

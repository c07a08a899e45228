use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Principal role. Closed at the type level; the string form exists only at
/// the store boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// The representation persisted by the store.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Parses the store's persisted representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

/// Lower-cases and trims an email for identity comparison and cache keying.
///
/// Emails compare case-insensitively everywhere in this crate; canonicalize
/// once at the boundary instead of sprinkling `to_lowercase` at call sites.
pub fn canonical_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Snapshot of a principal as held by the persistent store.
///
/// The store owns the source of truth; tokens and the cache only ever hold
/// read-only copies of this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub role: Role,
    pub confirmed: bool,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The cache key for this principal.
    pub fn cache_key(&self) -> String {
        canonical_email(&self.email)
    }

    /// Returns true for administrators.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(any(test, feature = "mocks"))]
impl User {
    pub fn mock_from_email(email: &str) -> Self {
        User {
            id: 1,
            username: "testuser".to_owned(),
            email: email.to_owned(),
            hashed_password: "fakehashedpassword".to_owned(),
            role: Role::User,
            confirmed: true,
            avatar: None,
            created_at: Utc::now(),
        }
    }

    pub fn mock_admin(email: &str) -> Self {
        User {
            role: Role::Admin,
            ..Self::mock_from_email(email)
        }
    }
}

/// Fields for creating a principal.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub role: Role,
}

/// The persistent user store, assumed durable and immediately consistent
/// from its own perspective.
///
/// Implementations report their failures as
/// `AuthError::UpstreamUnavailable`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AuthError>;
    /// Lookup by email; implementations compare case-insensitively.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
    async fn create_user(&self, fields: NewUser) -> Result<User, AuthError>;
    async fn update_password(&self, id: i64, hashed_password: &str) -> Result<(), AuthError>;
    async fn confirm_email(&self, id: i64) -> Result<(), AuthError>;
    async fn update_avatar(&self, id: i64, url: &str) -> Result<(), AuthError>;
}

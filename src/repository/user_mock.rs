#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use super::user::{canonical_email, NewUser, User, UserRepository};
use crate::AuthError;

/// In-memory user store for tests.
///
/// `find_email_calls` counts store lookups so tests can observe whether the
/// cache absorbed a read.
#[derive(Clone, Default)]
pub struct MockUserRepository {
    pub users: Arc<Mutex<Vec<User>>>,
    pub find_email_calls: Arc<AtomicUsize>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user and returns it.
    pub fn insert(&self, user: User) -> User {
        self.users.lock().unwrap().push(user.clone());
        user
    }
}

fn poisoned(_: impl std::fmt::Debug) -> AuthError {
    AuthError::UpstreamUnavailable("mock store lock poisoned".to_owned())
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        self.find_email_calls.fetch_add(1, Ordering::SeqCst);
        let wanted = canonical_email(email);
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users
            .iter()
            .find(|u| canonical_email(&u.email) == wanted)
            .cloned())
    }

    async fn create_user(&self, fields: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        let user = User {
            id: users.len() as i64 + 1,
            username: fields.username,
            email: fields.email,
            hashed_password: fields.hashed_password,
            role: fields.role,
            confirmed: false,
            avatar: None,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_password(&self, id: i64, hashed_password: &str) -> Result<(), AuthError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                hashed_password.clone_into(&mut user.hashed_password);
                Ok(())
            }
            None => Err(AuthError::UpstreamUnavailable(format!(
                "no user with id {id}"
            ))),
        }
    }

    async fn confirm_email(&self, id: i64) -> Result<(), AuthError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.confirmed = true;
                Ok(())
            }
            None => Err(AuthError::UpstreamUnavailable(format!(
                "no user with id {id}"
            ))),
        }
    }

    async fn update_avatar(&self, id: i64, url: &str) -> Result<(), AuthError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.avatar = Some(url.to_owned());
                Ok(())
            }
            None => Err(AuthError::UpstreamUnavailable(format!(
                "no user with id {id}"
            ))),
        }
    }
}

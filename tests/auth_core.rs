//! End-to-end scenarios across the guard, cache, codec, rate limiter, and
//! recovery actions, wired together the way a host application would.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::Duration;
use warden::actions::{
    CompleteEmailConfirmationAction, CompletePasswordResetAction, RequestEmailConfirmationAction,
    RequestPasswordResetAction,
};
use warden::{
    AccessGuard, Argon2Hasher, AuthConfig, AuthError, InMemoryStore, MockMailer,
    MockUserRepository, PasswordHasher, Purpose, RateLimiter, Role, TokenCodec, User, UserCache,
    UserRepository,
};

const SECRET: &str = "integration-secret-32-bytes-long!";

struct Harness {
    config: AuthConfig,
    codec: TokenCodec,
    repo: MockUserRepository,
    mailer: MockMailer,
    cache: Arc<UserCache>,
    guard: AccessGuard<MockUserRepository>,
}

impl Harness {
    fn new() -> Self {
        let config = AuthConfig::new(SECRET).unwrap();
        let codec = TokenCodec::new(&config.secret, config.algorithm).unwrap();
        let repo = MockUserRepository::new();
        let mailer = MockMailer::new();
        let cache = Arc::new(UserCache::new());
        let guard = AccessGuard::new(repo.clone(), codec.clone(), Arc::clone(&cache), &config);

        Harness {
            config,
            codec,
            repo,
            mailer,
            cache,
            guard,
        }
    }

    fn request_reset(&self) -> RequestPasswordResetAction<MockUserRepository, MockMailer> {
        RequestPasswordResetAction::new(
            self.repo.clone(),
            self.mailer.clone(),
            self.codec.clone(),
            &self.config,
        )
    }

    fn complete_reset(&self) -> CompletePasswordResetAction<MockUserRepository, Argon2Hasher> {
        CompletePasswordResetAction::new(
            self.repo.clone(),
            Argon2Hasher::default(),
            self.codec.clone(),
            Arc::clone(&self.cache),
            &self.config,
        )
    }

    fn request_confirm(&self) -> RequestEmailConfirmationAction<MockUserRepository, MockMailer> {
        RequestEmailConfirmationAction::new(
            self.repo.clone(),
            self.mailer.clone(),
            self.codec.clone(),
            &self.config,
        )
    }

    fn complete_confirm(&self) -> CompleteEmailConfirmationAction<MockUserRepository> {
        CompleteEmailConfirmationAction::new(
            self.repo.clone(),
            self.codec.clone(),
            Arc::clone(&self.cache),
            &self.config,
        )
    }
}

fn token_from_mail(body: &str, marker: &str) -> String {
    body.split(marker)
        .nth(1)
        .unwrap()
        .split_whitespace()
        .next()
        .unwrap()
        .to_owned()
}

#[tokio::test]
async fn access_token_lifecycle() {
    let h = Harness::new();
    h.repo.insert(User::mock_from_email("alice@example.com"));

    // Fresh one-hour token resolves to Alice.
    let token = h
        .codec
        .issue("alice@example.com", Purpose::Access, Duration::hours(1))
        .unwrap();
    let principal = h.guard.resolve(&token).await.unwrap();
    assert_eq!(principal.email, "alice@example.com");

    // Past expiry the same flow is unauthenticated.
    let expired = h
        .codec
        .issue("alice@example.com", Purpose::Access, Duration::seconds(-1))
        .unwrap();
    assert_eq!(
        h.guard.resolve(&expired).await.unwrap_err(),
        AuthError::Unauthenticated
    );
}

#[tokio::test]
async fn password_reset_round_trip() {
    let h = Harness::new();
    let hasher = Argon2Hasher::default();
    let mut bob = User::mock_from_email("bob@example.com");
    bob.hashed_password = hasher.hash("OldPass1!").unwrap();
    let bob = h.repo.insert(bob);

    // Request leaves a reset link in Bob's inbox.
    h.request_reset().execute("bob@example.com").await.unwrap();
    let mail = h.mailer.last_sent().unwrap();
    let token = token_from_mail(&mail.body, "/auth/reset-password/");

    // Completing the reset swaps the stored credential.
    h.complete_reset()
        .execute(&token, "NewPass1!")
        .await
        .unwrap();

    let stored = h
        .repo
        .find_user_by_id(bob.id)
        .await
        .unwrap()
        .unwrap()
        .hashed_password;
    assert!(!hasher.verify("OldPass1!", &stored), "old password must fail");
    assert!(hasher.verify("NewPass1!", &stored), "new password must work");
}

#[tokio::test]
async fn reset_evicts_cached_snapshot() {
    let h = Harness::new();
    let hasher = Argon2Hasher::default();
    let mut bob = User::mock_from_email("bob@example.com");
    bob.hashed_password = hasher.hash("OldPass1!").unwrap();
    h.repo.insert(bob);

    // Prime the cache through the guard.
    let access = h
        .codec
        .issue("bob@example.com", Purpose::Access, Duration::hours(1))
        .unwrap();
    let before = h.guard.resolve(&access).await.unwrap();

    h.request_reset().execute("bob@example.com").await.unwrap();
    let token = token_from_mail(&h.mailer.last_sent().unwrap().body, "/auth/reset-password/");
    h.complete_reset()
        .execute(&token, "NewPass1!")
        .await
        .unwrap();

    // The completed reset dropped the cached snapshot, so the next resolve
    // goes back to the store and sees the new credential.
    assert!(h.cache.get("bob@example.com").is_none());
    let calls_before = h.repo.find_email_calls.load(Ordering::SeqCst);
    let after = h.guard.resolve(&access).await.unwrap();
    assert_ne!(before.hashed_password, after.hashed_password);
    assert_eq!(
        h.repo.find_email_calls.load(Ordering::SeqCst),
        calls_before + 1
    );
}

#[tokio::test]
async fn reset_token_is_not_an_access_token() {
    let h = Harness::new();
    h.repo.insert(User::mock_from_email("bob@example.com"));

    h.request_reset().execute("bob@example.com").await.unwrap();
    let token = token_from_mail(&h.mailer.last_sent().unwrap().body, "/auth/reset-password/");

    assert_eq!(
        h.guard.resolve(&token).await.unwrap_err(),
        AuthError::Unauthenticated
    );
}

#[tokio::test]
async fn unknown_email_reset_is_silent_success() {
    let h = Harness::new();

    let result = h.request_reset().execute("nonexistent@example.com").await;

    assert!(result.is_ok());
    assert_eq!(h.mailer.sent_count(), 0);
}

#[tokio::test]
async fn email_confirmation_round_trip() {
    let h = Harness::new();
    let mut carol = User::mock_from_email("carol@example.com");
    carol.confirmed = false;
    let carol = h.repo.insert(carol);

    h.request_confirm()
        .execute("carol@example.com")
        .await
        .unwrap();
    let token = token_from_mail(&h.mailer.last_sent().unwrap().body, "/auth/confirm-email/");

    h.complete_confirm().execute(&token).await.unwrap();

    assert!(h
        .repo
        .find_user_by_id(carol.id)
        .await
        .unwrap()
        .unwrap()
        .confirmed);

    // A second request after confirmation sends nothing.
    h.request_confirm()
        .execute("carol@example.com")
        .await
        .unwrap();
    assert_eq!(h.mailer.sent_count(), 1);
}

#[tokio::test]
async fn confirmation_token_cannot_reset_password() {
    let h = Harness::new();
    let mut carol = User::mock_from_email("carol@example.com");
    carol.confirmed = false;
    h.repo.insert(carol);

    h.request_confirm()
        .execute("carol@example.com")
        .await
        .unwrap();
    let token = token_from_mail(&h.mailer.last_sent().unwrap().body, "/auth/confirm-email/");

    assert_eq!(
        h.complete_reset()
            .execute(&token, "NewPass1!")
            .await
            .unwrap_err(),
        AuthError::InvalidRecoveryToken
    );
}

#[tokio::test]
async fn role_policy_gates_admin_operations() {
    let h = Harness::new();
    let user = h.repo.insert(User::mock_from_email("user@example.com"));
    let admin = h.repo.insert(User::mock_admin("admin@example.com"));

    assert_eq!(
        h.guard.require_role(&user, Role::Admin).unwrap_err(),
        AuthError::Forbidden
    );
    assert!(h.guard.require_role(&admin, Role::Admin).is_ok());
}

#[tokio::test]
async fn self_lookup_rate_limit() {
    let h = Harness::new();
    let limiter = RateLimiter::new(Arc::new(InMemoryStore::new()), &h.config.rate_limit);

    // The default ceiling admits exactly five requests per window.
    for _ in 0..5 {
        assert!(limiter.allow("203.0.113.7").await.unwrap());
    }

    let err = limiter.enforce("203.0.113.7").await.unwrap_err();
    match err {
        AuthError::RateLimited { retry_after_secs } => assert!(retry_after_secs >= 0),
        other => panic!("expected RateLimited, got {other:?}"),
    }

    // Another client is unaffected.
    assert!(limiter.allow("198.51.100.4").await.unwrap());
}

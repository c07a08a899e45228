//! Read-through TTL cache of user snapshots.
//!
//! The cache sits ahead of the persistent user store and is a pure
//! performance optimization: it never holds a mutation that the store does
//! not. Every write path that changes a principal must [`invalidate`] (or
//! overwrite) that principal's entry as part of the same operation.
//!
//! Entries shard across a [`DashMap`], so lookups and writes for different
//! keys never contend and same-key operations are linearizable.
//!
//! [`invalidate`]: UserCache::invalidate

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::repository::User;

#[derive(Debug, Clone)]
struct Entry {
    user: User,
    inserted_at: DateTime<Utc>,
    ttl: Duration,
}

impl Entry {
    fn fresh(&self) -> bool {
        Utc::now() - self.inserted_at < self.ttl
    }
}

/// Maps a canonical lookup key (the principal's email) to a user snapshot
/// with an insertion timestamp.
#[derive(Debug, Default)]
pub struct UserCache {
    entries: DashMap<String, Entry>,
}

impl UserCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Returns the cached snapshot for `key`, or `None` on a miss.
    ///
    /// An entry older than its TTL counts as a miss and is dropped; callers
    /// treat both cases identically and fall through to the store.
    pub fn get(&self, key: &str) -> Option<User> {
        let hit = self
            .entries
            .get(key)
            .and_then(|entry| entry.fresh().then(|| entry.user.clone()));

        if hit.is_none() {
            self.entries.remove_if(key, |_, entry| !entry.fresh());
        }

        hit
    }

    /// Stores a snapshot for `key`, replacing any previous entry.
    pub fn put(&self, key: &str, user: User, ttl: Duration) {
        self.entries.insert(
            key.to_owned(),
            Entry {
                user,
                inserted_at: Utc::now(),
                ttl,
            },
        );
    }

    /// Drops the entry for `key`, if any.
    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Number of entries currently held, including not-yet-swept expired
    /// ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry. Expired entries are also dropped lazily on
    /// lookup; call this periodically in long-running processes to bound
    /// memory growth for keys that are never read again.
    pub fn prune_expired(&self) {
        self.entries.retain(|_, entry| entry.fresh());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::User;

    #[test]
    fn test_put_get_round_trip() {
        let cache = UserCache::new();
        let user = User::mock_from_email("alice@example.com");

        cache.put("alice@example.com", user.clone(), Duration::minutes(15));

        let cached = cache.get("alice@example.com").unwrap();
        assert_eq!(cached.email, user.email);
    }

    #[test]
    fn test_unknown_key_misses() {
        let cache = UserCache::new();
        assert!(cache.get("nobody@example.com").is_none());
    }

    #[test]
    fn test_expired_entry_misses_and_is_swept() {
        let cache = UserCache::new();
        let user = User::mock_from_email("alice@example.com");

        cache.put("alice@example.com", user, Duration::seconds(-1));

        assert!(cache.get("alice@example.com").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_drops_entry() {
        let cache = UserCache::new();
        let user = User::mock_from_email("alice@example.com");

        cache.put("alice@example.com", user, Duration::minutes(15));
        cache.invalidate("alice@example.com");

        assert!(cache.get("alice@example.com").is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let cache = UserCache::new();
        let mut user = User::mock_from_email("alice@example.com");

        cache.put("alice@example.com", user.clone(), Duration::minutes(15));

        user.confirmed = false;
        cache.put("alice@example.com", user, Duration::minutes(15));

        assert!(!cache.get("alice@example.com").unwrap().confirmed);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_prune_expired() {
        let cache = UserCache::new();

        cache.put(
            "stale@example.com",
            User::mock_from_email("stale@example.com"),
            Duration::seconds(-1),
        );
        cache.put(
            "fresh@example.com",
            User::mock_from_email("fresh@example.com"),
            Duration::minutes(15),
        );

        cache.prune_expired();

        assert_eq!(cache.len(), 1);
        assert!(cache.get("fresh@example.com").is_some());
    }
}

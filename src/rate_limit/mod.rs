//! Fixed-window request rate limiting.
//!
//! Guards the self-lookup endpoint in the surrounding service, counting
//! requests per client key (typically the remote address) inside a fixed
//! window. The mechanism is generic enough to reuse elsewhere.

mod limiter;
mod store;

pub use limiter::{RateLimitDecision, RateLimiter};
pub use store::{InMemoryStore, RateLimitStore, WindowInfo};

//! Signed, self-contained, expiring tokens.
//!
//! The codec is purely cryptographic plumbing: it knows subjects, purposes,
//! and lifetimes, never users or stores. Tokens are stateless: expiry is
//! enforced by the embedded `exp` claim, and the only global revocation
//! lever is rotating the signing secret.

mod claims;
mod codec;

pub use claims::{Claims, Purpose};
pub use codec::{InvalidToken, TokenCodec};

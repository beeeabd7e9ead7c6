//! Pluggable leaf and node hashing
//!
//! This module provides:
//! - the [`HashDigestProvider`] trait and its five implementations
//! - the validated [`HashDigest`] configuration enum selecting between them

pub mod digest;
pub mod provider;

pub use self::digest::{create_hash_digest, DigestOption, HashDigest, HashDigestSpec};
pub use self::provider::{
    DefaultDigest, HashDigestProvider, NonceDigest, NonceSizeOnlyVerifyDigest, NonceVerifyDigest,
    TweakableDigest, ENTROPY_LEN,
};

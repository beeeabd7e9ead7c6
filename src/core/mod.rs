//! Core types and utilities for merkle_disclosure
//!
//! This module contains the algorithm-tagged hash type, error handling,
//! and the raw hashing primitives used by every digest provider.

pub mod error;
pub mod hash;
pub mod types;

// Re-export commonly used items
pub use error::{DisclosureError, Result};
pub use hash::{hash_bytes, hash_parts, sha256};
pub use types::{DigestAlgorithm, Hash, HashParseError};

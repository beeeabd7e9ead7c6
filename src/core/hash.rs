//! Hash utilities for merkle_disclosure

use crate::core::types::{DigestAlgorithm, Hash};
use digest::Digest;
use sha2::{Sha256, Sha384, Sha512};

fn digest_parts<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

/// Hash the concatenation of `parts` without building the joined buffer
pub fn hash_parts(algorithm: DigestAlgorithm, parts: &[&[u8]]) -> Hash {
    let bytes = match algorithm {
        DigestAlgorithm::Sha256 => digest_parts::<Sha256>(parts),
        DigestAlgorithm::Sha384 => digest_parts::<Sha384>(parts),
        DigestAlgorithm::Sha512 => digest_parts::<Sha512>(parts),
    };
    Hash::from_digest_output(algorithm, bytes)
}

/// Hash a single byte string
pub fn hash_bytes(algorithm: DigestAlgorithm, data: &[u8]) -> Hash {
    hash_parts(algorithm, &[data])
}

/// Compute SHA-256 hash of data
pub fn sha256(data: &[u8]) -> Hash {
    hash_bytes(DigestAlgorithm::Sha256, data)
}

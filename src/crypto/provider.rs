//! Leaf and node hashing strategies
//!
//! Every provider is a plain immutable value, so the same instance can hash
//! leaves from many threads at once.

use crate::core::{error::*, hash::hash_parts, types::*};
use std::fmt;

/// Discriminator prepended to leaf preimages
pub const LEAF_PREFIX: u8 = 0x00;
/// Discriminator prepended to node preimages
pub const NODE_PREFIX: u8 = 0x01;
/// Length of the entropy a nonce digest derives its nonces from
pub const ENTROPY_LEN: usize = 32;

/// Strategy used to hash tree leaves and combine child hashes
pub trait HashDigestProvider: Send + Sync {
    /// Base algorithm every produced hash is tagged with
    fn algorithm(&self) -> DigestAlgorithm;

    /// Nonce to disclose alongside leaf `index` in an audit proof
    fn leaf_nonce(&self, _index: u32) -> Option<Vec<u8>> {
        None
    }

    /// Hash of the leaf at `index`
    fn leaf_hash(&self, index: u32, nonce: Option<&[u8]>, data: &[u8]) -> Result<Hash>;

    /// Hash of an inner node from its two children
    fn node_hash(&self, left: &Hash, right: &Hash) -> Hash;
}

fn prefixed_node_hash(algorithm: DigestAlgorithm, prefix: &[u8], left: &Hash, right: &Hash) -> Hash {
    hash_parts(algorithm, &[prefix, left.as_bytes(), right.as_bytes()])
}

/// `H(0x00 ++ index ++ data)` leaves and `H(0x01 ++ left ++ right)` nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultDigest {
    algorithm: DigestAlgorithm,
}

impl DefaultDigest {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl HashDigestProvider for DefaultDigest {
    fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn leaf_hash(&self, index: u32, _nonce: Option<&[u8]>, data: &[u8]) -> Result<Hash> {
        Ok(hash_parts(
            self.algorithm,
            &[&[LEAF_PREFIX], &index.to_be_bytes(), data],
        ))
    }

    fn node_hash(&self, left: &Hash, right: &Hash) -> Hash {
        prefixed_node_hash(self.algorithm, &[NODE_PREFIX], left, right)
    }
}

/// Salts every leaf with a nonce derived from secret entropy
#[derive(Clone, PartialEq, Eq)]
pub struct NonceDigest {
    algorithm: DigestAlgorithm,
    entropy: [u8; ENTROPY_LEN],
}

impl NonceDigest {
    /// Create from entropy of exactly 32 bytes
    pub fn new(algorithm: DigestAlgorithm, entropy: &[u8]) -> Result<Self> {
        let entropy: [u8; ENTROPY_LEN] = entropy.try_into().map_err(|_| {
            DisclosureError::invalid_argument(format!(
                "entropy must be exactly {} bytes, got {}",
                ENTROPY_LEN,
                entropy.len()
            ))
        })?;
        Ok(Self::with_entropy(algorithm, entropy))
    }

    pub fn with_entropy(algorithm: DigestAlgorithm, entropy: [u8; ENTROPY_LEN]) -> Self {
        Self { algorithm, entropy }
    }

    pub fn entropy(&self) -> &[u8; ENTROPY_LEN] {
        &self.entropy
    }

    fn derive_nonce(&self, index: u32) -> Hash {
        hash_parts(self.algorithm, &[&self.entropy, &index.to_be_bytes()])
    }
}

impl fmt::Debug for NonceDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonceDigest")
            .field("algorithm", &self.algorithm)
            .field("entropy", &"<redacted>")
            .finish()
    }
}

impl HashDigestProvider for NonceDigest {
    fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn leaf_nonce(&self, index: u32) -> Option<Vec<u8>> {
        Some(self.derive_nonce(index).as_bytes().to_vec())
    }

    // The entropy holder never trusts a supplied nonce.
    fn leaf_hash(&self, index: u32, _nonce: Option<&[u8]>, data: &[u8]) -> Result<Hash> {
        let nonce = self.derive_nonce(index);
        Ok(hash_parts(
            self.algorithm,
            &[&[LEAF_PREFIX], nonce.as_bytes(), data],
        ))
    }

    fn node_hash(&self, left: &Hash, right: &Hash) -> Hash {
        prefixed_node_hash(self.algorithm, &[NODE_PREFIX], left, right)
    }
}

/// Verifies nonce-salted leaves using the nonces disclosed in a proof
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceVerifyDigest {
    algorithm: DigestAlgorithm,
}

impl NonceVerifyDigest {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl HashDigestProvider for NonceVerifyDigest {
    fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn leaf_hash(&self, index: u32, nonce: Option<&[u8]>, data: &[u8]) -> Result<Hash> {
        let nonce = nonce.ok_or_else(|| {
            DisclosureError::invalid_argument(format!("leaf {} carries no nonce", index))
        })?;
        Ok(hash_parts(self.algorithm, &[&[LEAF_PREFIX], nonce, data]))
    }

    fn node_hash(&self, left: &Hash, right: &Hash) -> Hash {
        prefixed_node_hash(self.algorithm, &[NODE_PREFIX], left, right)
    }
}

/// Verifies size-only proofs, where no leaf content is ever hashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceSizeOnlyVerifyDigest {
    algorithm: DigestAlgorithm,
}

impl NonceSizeOnlyVerifyDigest {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl HashDigestProvider for NonceSizeOnlyVerifyDigest {
    fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn leaf_hash(&self, index: u32, _nonce: Option<&[u8]>, _data: &[u8]) -> Result<Hash> {
        Err(DisclosureError::invalid_argument(format!(
            "size-only digest cannot hash content of leaf {}",
            index
        )))
    }

    fn node_hash(&self, left: &Hash, right: &Hash) -> Hash {
        prefixed_node_hash(self.algorithm, &[NODE_PREFIX], left, right)
    }
}

/// Default layout with caller supplied leaf and node discriminators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweakableDigest {
    algorithm: DigestAlgorithm,
    leaf_prefix: Vec<u8>,
    node_prefix: Vec<u8>,
}

impl TweakableDigest {
    /// Both prefixes must be non-empty
    pub fn new(
        algorithm: DigestAlgorithm,
        leaf_prefix: impl Into<Vec<u8>>,
        node_prefix: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        let leaf_prefix = leaf_prefix.into();
        let node_prefix = node_prefix.into();
        if leaf_prefix.is_empty() {
            return Err(DisclosureError::invalid_argument("leafPrefix must not be empty"));
        }
        if node_prefix.is_empty() {
            return Err(DisclosureError::invalid_argument("nodePrefix must not be empty"));
        }
        Ok(Self {
            algorithm,
            leaf_prefix,
            node_prefix,
        })
    }

    pub fn leaf_prefix(&self) -> &[u8] {
        &self.leaf_prefix
    }

    pub fn node_prefix(&self) -> &[u8] {
        &self.node_prefix
    }
}

impl HashDigestProvider for TweakableDigest {
    fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn leaf_hash(&self, index: u32, _nonce: Option<&[u8]>, data: &[u8]) -> Result<Hash> {
        Ok(hash_parts(
            self.algorithm,
            &[&self.leaf_prefix, &index.to_be_bytes(), data],
        ))
    }

    fn node_hash(&self, left: &Hash, right: &Hash) -> Hash {
        prefixed_node_hash(self.algorithm, &self.node_prefix, left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::sha256;

    const ALG: DigestAlgorithm = DigestAlgorithm::Sha256;

    #[test]
    fn test_default_leaf_layout() {
        let digest = DefaultDigest::new(ALG);
        let leaf = digest.leaf_hash(3, None, b"data").unwrap();
        let mut preimage = vec![0x00u8, 0, 0, 0, 3];
        preimage.extend_from_slice(b"data");
        let expected = sha256(&preimage);
        assert_eq!(leaf, expected);
    }

    #[test]
    fn test_leaf_and_node_hashes_are_separated() {
        let digest = DefaultDigest::new(ALG);
        let a = sha256(b"a");
        let b = sha256(b"b");
        let node = digest.node_hash(&a, &b);
        let mut forged = Vec::new();
        forged.extend_from_slice(a.as_bytes());
        forged.extend_from_slice(b.as_bytes());
        // Same bytes as a leaf never produce the node hash
        assert_ne!(digest.leaf_hash(0, None, &forged).unwrap(), node);
    }

    #[test]
    fn test_nonce_digest_rejects_short_entropy() {
        let err = NonceDigest::new(ALG, &[1u8; 16]).unwrap_err();
        assert!(matches!(err, DisclosureError::InvalidArgument { .. }));
    }

    #[test]
    fn test_nonce_verify_matches_nonce_digest() {
        let digest = NonceDigest::with_entropy(ALG, [9u8; 32]);
        let verifier = NonceVerifyDigest::new(ALG);
        let nonce = digest.leaf_nonce(4).unwrap();
        assert_eq!(
            digest.leaf_hash(4, None, b"x").unwrap(),
            verifier.leaf_hash(4, Some(&nonce), b"x").unwrap()
        );
        assert!(verifier.leaf_hash(4, None, b"x").is_err());
    }

    #[test]
    fn test_nonce_digest_ignores_supplied_nonce() {
        let digest = NonceDigest::with_entropy(ALG, [9u8; 32]);
        assert_eq!(
            digest.leaf_hash(1, Some(b"forged"), b"x").unwrap(),
            digest.leaf_hash(1, None, b"x").unwrap()
        );
    }

    #[test]
    fn test_size_only_digest_hashes_no_leaves() {
        let digest = NonceSizeOnlyVerifyDigest::new(ALG);
        assert!(digest.leaf_hash(0, Some(b"n"), b"x").is_err());
    }

    #[test]
    fn test_tweakable_requires_prefixes() {
        assert!(TweakableDigest::new(ALG, Vec::new(), b"node".to_vec()).is_err());
        assert!(TweakableDigest::new(ALG, b"leaf".to_vec(), Vec::new()).is_err());

        let tweaked = TweakableDigest::new(ALG, vec![0x00], vec![0x01]).unwrap();
        let default = DefaultDigest::new(ALG);
        assert_eq!(
            tweaked.leaf_hash(2, None, b"z").unwrap(),
            default.leaf_hash(2, None, b"z").unwrap()
        );
    }
}

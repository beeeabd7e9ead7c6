//! merkle-disclosure - Merkle proofs with selective disclosure
//!
//! The crate builds tamper-evident hash trees over ordered data blocks under a
//! pluggable hashing strategy, extracts proofs that reveal chosen leaves or only
//! the leaf count, and verifies them against a published root. On top of that
//! it models ledger records whose component groups can be removed, reduced to a
//! size, or partially audited without changing the record identifier.
//!
//! # Core Features
//!
//! - **Hash Digests**: plain, nonce-salted and domain-separated leaf/node hashing
//! - **Audit Proofs**: disclose any subset of leaves with the minimal sibling set
//! - **Size-Only Proofs**: attest to a leaf count without revealing content
//! - **Filtered Records**: per-group disclosure that still verifies against the id
//!
//! # Example Usage
//!
//! ```rust
//! use merkle_disclosure::{create_tree, DigestAlgorithm, HashDigest};
//!
//! let digest = HashDigest::default_digest(DigestAlgorithm::Sha256);
//! let tree = create_tree(vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()], digest.clone())?;
//!
//! let proof = tree.create_audit_proof([1])?;
//! assert!(proof.verify(tree.root(), &digest)?);
//! # Ok::<(), merkle_disclosure::DisclosureError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod filtered;
pub mod proofs;

// Re-export commonly used types
pub use self::core::{
    error::{DisclosureError, Result},
    types::{DigestAlgorithm, Hash},
};

pub use self::crypto::{create_hash_digest, DigestOption, HashDigest, HashDigestProvider};

pub use self::proofs::{create_tree, IndexedMerkleLeaf, MerkleProof, MerkleProofType, MerkleTree};

pub use self::filtered::{
    ComponentGroup, FilteredData, FilteredRecord, FilteredRecordBuilder, LedgerRecord,
};

/// Current version of merkle-disclosure
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

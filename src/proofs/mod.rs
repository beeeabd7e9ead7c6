//! Merkle proof system
//!
//! This module builds hash trees over ordered data blocks and produces proofs
//! that disclose some leaves, or only the leaf count, to a verifier holding
//! nothing but the published root.

pub mod merkle;
pub mod proof;
pub(crate) mod shape;

// Re-export commonly used items
pub use merkle::{create_tree, MerkleTree};
pub use proof::{IndexedMerkleLeaf, MerkleProof, MerkleProofType};

//! Merkle tree implementation

use crate::core::{error::*, types::*};
use crate::crypto::{HashDigest, HashDigestProvider};
use crate::proofs::proof::{IndexedMerkleLeaf, MerkleProof, MerkleProofType};
use crate::proofs::shape::collect_siblings;
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Trees with at least this many leaves hash them in parallel
const PARALLEL_LEAF_THRESHOLD: usize = 1024;

/// Binary hash tree over an ordered list of data blocks
#[derive(Debug, Clone)]
pub struct MerkleTree {
    leaves: Vec<Vec<u8>>,
    digest: HashDigest,
    /// All levels of the tree (leaves at index 0, root level last)
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a tree over `leaves`; an empty leaf list is rejected
    pub fn new(leaves: Vec<Vec<u8>>, digest: HashDigest) -> Result<Self> {
        if leaves.is_empty() {
            return Err(DisclosureError::invalid_argument(
                "a merkle tree needs at least one leaf",
            ));
        }
        if u32::try_from(leaves.len()).is_err() {
            return Err(DisclosureError::invalid_argument(format!(
                "{} leaves exceed the maximum tree size",
                leaves.len()
            )));
        }

        let leaf_hashes = Self::hash_leaves(&leaves, &digest)?;
        let mut levels = vec![leaf_hashes];
        while levels[levels.len() - 1].len() > 1 {
            let next = levels[levels.len() - 1]
                .chunks(2)
                .map(|pair| {
                    let right = pair.get(1).unwrap_or(&pair[0]);
                    digest.node_hash(&pair[0], right)
                })
                .collect();
            levels.push(next);
        }

        debug!(
            leaves = leaves.len(),
            depth = levels.len() - 1,
            provider = digest.provider_name(),
            "built merkle tree"
        );

        Ok(Self {
            leaves,
            digest,
            levels,
        })
    }

    fn hash_leaves(leaves: &[Vec<u8>], digest: &HashDigest) -> Result<Vec<Hash>> {
        let hash_leaf = |(index, data): (usize, &Vec<u8>)| {
            let index = index as u32;
            let nonce = digest.leaf_nonce(index);
            digest.leaf_hash(index, nonce.as_deref(), data)
        };

        if leaves.len() >= PARALLEL_LEAF_THRESHOLD {
            leaves.par_iter().enumerate().map(hash_leaf).collect()
        } else {
            leaves.iter().enumerate().map(hash_leaf).collect()
        }
    }

    /// Root hash of the tree
    pub fn root(&self) -> &Hash {
        &self.levels[self.levels.len() - 1][0]
    }

    pub fn leaves(&self) -> &[Vec<u8>] {
        &self.leaves
    }

    pub fn digest(&self) -> &HashDigest {
        &self.digest
    }

    /// Number of leaves
    pub fn size(&self) -> u32 {
        self.leaves.len() as u32
    }

    /// Hashes of the leaf level, in leaf order
    pub fn leaf_hashes(&self) -> &[Hash] {
        &self.levels[0]
    }

    /// Produce a proof disclosing the leaves at `indices`
    pub fn create_audit_proof<I>(&self, indices: I) -> Result<MerkleProof>
    where
        I: IntoIterator<Item = u32>,
    {
        let indices: BTreeSet<u32> = indices.into_iter().collect();
        if indices.is_empty() {
            return Err(DisclosureError::invalid_argument(
                "an audit proof needs at least one leaf index",
            ));
        }
        if let Some(&out_of_range) = indices.iter().find(|&&index| index >= self.size()) {
            return Err(DisclosureError::invalid_argument(format!(
                "leaf index {} is out of range for a tree of {} leaves",
                out_of_range,
                self.size()
            )));
        }

        let hashes = collect_siblings(self.size(), &indices, |level, pos| {
            self.levels
                .get(level)
                .and_then(|nodes| nodes.get(pos as usize))
                .cloned()
        })?;

        let leaves = indices
            .iter()
            .map(|&index| IndexedMerkleLeaf {
                index,
                nonce: self.digest.leaf_nonce(index),
                leaf_data: self.leaves[index as usize].clone(),
            })
            .collect();

        debug!(
            disclosed = indices.len(),
            hashes = hashes.len(),
            tree_size = self.size(),
            "created audit proof"
        );

        Ok(MerkleProof::new(
            MerkleProofType::Audit,
            self.size(),
            leaves,
            hashes,
        ))
    }

    /// Produce a proof of the leaf count that discloses no leaf content.
    ///
    /// The proof carries the leaf-level hashes, which under a nonce digest are
    /// blinded by the per-leaf nonces.
    pub fn create_size_only_proof(&self) -> MerkleProof {
        MerkleProof::new(
            MerkleProofType::SizeOnly,
            self.size(),
            Vec::new(),
            self.leaf_hashes().to_vec(),
        )
    }
}

/// Build a tree over `leaves` using `digest`
pub fn create_tree(leaves: Vec<Vec<u8>>, digest: HashDigest) -> Result<MerkleTree> {
    MerkleTree::new(leaves, digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::sha256;

    fn abc() -> Vec<Vec<u8>> {
        vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]
    }

    fn default_digest() -> HashDigest {
        HashDigest::default_digest(DigestAlgorithm::Sha256)
    }

    #[test]
    fn test_empty_tree_is_rejected() {
        let err = MerkleTree::new(Vec::new(), default_digest()).unwrap_err();
        assert!(matches!(err, DisclosureError::InvalidArgument { .. }));
    }

    #[test]
    fn test_single_leaf_root_is_leaf_hash() {
        let digest = default_digest();
        let tree = MerkleTree::new(vec![b"only".to_vec()], digest.clone()).unwrap();
        assert_eq!(tree.root(), &digest.leaf_hash(0, None, b"only").unwrap());
    }

    #[test]
    fn test_odd_level_duplicates_last_hash() {
        let digest = default_digest();
        let tree = MerkleTree::new(abc(), digest.clone()).unwrap();

        let leaf = |i: u32, data: &[u8]| digest.leaf_hash(i, None, data).unwrap();
        let left = digest.node_hash(&leaf(0, b"a"), &leaf(1, b"b"));
        let right = digest.node_hash(&leaf(2, b"c"), &leaf(2, b"c"));
        assert_eq!(tree.root(), &digest.node_hash(&left, &right));
    }

    #[test]
    fn test_audit_proof_for_middle_leaf() {
        let tree = MerkleTree::new(abc(), default_digest()).unwrap();
        let proof = tree.create_audit_proof([1]).unwrap();

        assert_eq!(proof.leaves().len(), 1);
        assert_eq!(proof.leaves()[0].index, 1);
        assert_eq!(proof.leaves()[0].leaf_data, b"b".to_vec());
        assert_eq!(proof.hashes().len(), 2);
        assert!(proof.verify(tree.root(), tree.digest()).unwrap());
    }

    #[test]
    fn test_audit_proof_rejects_bad_indices() {
        let tree = MerkleTree::new(abc(), default_digest()).unwrap();
        assert!(matches!(
            tree.create_audit_proof([3]),
            Err(DisclosureError::InvalidArgument { .. })
        ));
        assert!(matches!(
            tree.create_audit_proof(Vec::<u32>::new()),
            Err(DisclosureError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_nonce_tree_discloses_nonces() {
        let digest = HashDigest::nonce(DigestAlgorithm::Sha256, [5u8; 32]);
        let tree = MerkleTree::new(abc(), digest.clone()).unwrap();
        let proof = tree.create_audit_proof([0, 2]).unwrap();
        assert!(proof.leaves().iter().all(|leaf| leaf.nonce.is_some()));
        assert!(proof.verify(tree.root(), &digest.verifier()).unwrap());
    }

    #[test]
    fn test_parallel_and_sequential_hashing_agree() {
        let leaves: Vec<Vec<u8>> = (0..PARALLEL_LEAF_THRESHOLD as u32 + 3)
            .map(|i| i.to_be_bytes().to_vec())
            .collect();
        let digest = default_digest();
        let tree = MerkleTree::new(leaves.clone(), digest.clone()).unwrap();
        for (i, data) in leaves.iter().enumerate() {
            assert_eq!(
                tree.leaf_hashes()[i],
                digest.leaf_hash(i as u32, None, data).unwrap()
            );
        }
    }

    #[test]
    fn test_leaf_data_is_not_the_leaf_hash() {
        let tree = MerkleTree::new(vec![b"x".to_vec()], default_digest()).unwrap();
        assert_ne!(tree.root(), &sha256(b"x"));
    }
}

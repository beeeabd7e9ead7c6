//! Proof replay, verification and recombination

use crate::core::{error::*, types::*};
use crate::crypto::HashDigestProvider;
use crate::proofs::shape::{collect_siblings, PartialTree};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// What a proof discloses about the tree it was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MerkleProofType {
    /// Discloses leaf data for a set of indices
    Audit,
    /// Discloses only the number of leaves
    SizeOnly,
}

/// A disclosed leaf, addressed by its position in the original sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedMerkleLeaf {
    pub index: u32,
    /// Present only for leaves of nonce-salted trees
    #[serde(default, with = "crate::core::types::hex_option")]
    pub nonce: Option<Vec<u8>>,
    #[serde(with = "hex")]
    pub leaf_data: Vec<u8>,
}

/// Self-contained claim that a set of leaves completes a path to some root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    proof_type: MerkleProofType,
    tree_size: u32,
    leaves: Vec<IndexedMerkleLeaf>,
    /// Sibling hashes, bottom-up by level and left to right within a level
    hashes: Vec<Hash>,
}

impl MerkleProof {
    /// Assemble a proof; its shape is only checked when it is replayed
    pub fn new(
        proof_type: MerkleProofType,
        tree_size: u32,
        leaves: Vec<IndexedMerkleLeaf>,
        hashes: Vec<Hash>,
    ) -> Self {
        Self {
            proof_type,
            tree_size,
            leaves,
            hashes,
        }
    }

    pub fn proof_type(&self) -> MerkleProofType {
        self.proof_type
    }

    pub fn tree_size(&self) -> u32 {
        self.tree_size
    }

    pub fn leaves(&self) -> &[IndexedMerkleLeaf] {
        &self.leaves
    }

    pub fn hashes(&self) -> &[Hash] {
        &self.hashes
    }

    /// Disclosed leaf at `index`, if any
    pub fn leaf(&self, index: u32) -> Option<&IndexedMerkleLeaf> {
        self.leaves.iter().find(|leaf| leaf.index == index)
    }

    pub fn disclosed_indices(&self) -> BTreeSet<u32> {
        self.leaves.iter().map(|leaf| leaf.index).collect()
    }

    /// Recompute the root this proof claims
    pub fn calculate_root<D>(&self, digest: &D) -> Result<Hash>
    where
        D: HashDigestProvider + ?Sized,
    {
        Ok(self.rebuild(digest)?.root().clone())
    }

    /// Check the proof against `root`.
    ///
    /// A root mismatch is `Ok(false)`; an internally inconsistent proof is a
    /// `MerkleProofRebuildFailure`.
    pub fn verify<D>(&self, root: &Hash, digest: &D) -> Result<bool>
    where
        D: HashDigestProvider + ?Sized,
    {
        let computed = self.calculate_root(digest)?;
        let verified = computed == *root;
        if !verified {
            debug!(expected = %root, computed = %computed, "merkle proof does not match root");
        }
        Ok(verified)
    }

    /// Derive a proof disclosing only `indices`, which must already be disclosed
    pub fn subset<I, D>(&self, indices: I, digest: &D) -> Result<MerkleProof>
    where
        I: IntoIterator<Item = u32>,
        D: HashDigestProvider + ?Sized,
    {
        if self.proof_type != MerkleProofType::Audit {
            return Err(DisclosureError::invalid_argument(
                "a size-only proof has no leaves to take a subset of",
            ));
        }
        let wanted: BTreeSet<u32> = indices.into_iter().collect();
        if wanted.is_empty() {
            return Err(DisclosureError::invalid_argument(
                "a proof subset needs at least one leaf index",
            ));
        }
        let disclosed = self.disclosed_indices();
        if let Some(missing) = wanted.difference(&disclosed).next() {
            return Err(DisclosureError::invalid_argument(format!(
                "leaf {} is not disclosed by this proof",
                missing
            )));
        }

        let partial = self.rebuild(digest)?;
        let hashes = collect_siblings(self.tree_size, &wanted, |level, pos| {
            partial.node(level, pos).cloned()
        })?;
        let mut leaves: Vec<IndexedMerkleLeaf> = self
            .leaves
            .iter()
            .filter(|leaf| wanted.contains(&leaf.index))
            .cloned()
            .collect();
        leaves.sort_by_key(|leaf| leaf.index);

        Ok(MerkleProof::new(
            MerkleProofType::Audit,
            self.tree_size,
            leaves,
            hashes,
        ))
    }

    /// Combine two audit proofs of the same tree into one disclosing both leaf sets
    pub fn merge<D>(&self, other: &MerkleProof, digest: &D) -> Result<MerkleProof>
    where
        D: HashDigestProvider + ?Sized,
    {
        if self.proof_type != MerkleProofType::Audit || other.proof_type != MerkleProofType::Audit
        {
            return Err(DisclosureError::invalid_argument(
                "only audit proofs can be merged",
            ));
        }
        if self.tree_size != other.tree_size {
            return Err(DisclosureError::invalid_argument(format!(
                "cannot merge proofs of trees with {} and {} leaves",
                self.tree_size, other.tree_size
            )));
        }

        let mut partial = self.rebuild(digest)?;
        let theirs = other.rebuild(digest)?;
        if partial.root() != theirs.root() {
            return Err(DisclosureError::invalid_argument(
                "cannot merge proofs with different roots",
            ));
        }
        partial.absorb(theirs);

        let mut leaves: BTreeMap<u32, IndexedMerkleLeaf> = BTreeMap::new();
        for leaf in other.leaves.iter().chain(self.leaves.iter()) {
            leaves.insert(leaf.index, leaf.clone());
        }
        let indices: BTreeSet<u32> = leaves.keys().copied().collect();
        let hashes = collect_siblings(self.tree_size, &indices, |level, pos| {
            partial.node(level, pos).cloned()
        })?;

        Ok(MerkleProof::new(
            MerkleProofType::Audit,
            self.tree_size,
            leaves.into_values().collect(),
            hashes,
        ))
    }

    /// Compact binary encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    fn rebuild<D>(&self, digest: &D) -> Result<PartialTree>
    where
        D: HashDigestProvider + ?Sized,
    {
        self.rebuild_unlogged(digest).map_err(|err| {
            warn!(
                proof_type = ?self.proof_type,
                tree_size = self.tree_size,
                error = %err,
                "merkle proof rebuild failed"
            );
            err
        })
    }

    fn rebuild_unlogged<D>(&self, digest: &D) -> Result<PartialTree>
    where
        D: HashDigestProvider + ?Sized,
    {
        if self.tree_size == 0 {
            return Err(DisclosureError::rebuild_failure("tree size is zero"));
        }
        if let Some(foreign) = self
            .hashes
            .iter()
            .find(|hash| hash.algorithm() != digest.algorithm())
        {
            return Err(DisclosureError::rebuild_failure(format!(
                "supplied hash uses {} but the digest uses {}",
                foreign.algorithm(),
                digest.algorithm()
            )));
        }

        match self.proof_type {
            MerkleProofType::Audit => {
                if self.leaves.is_empty() {
                    return Err(DisclosureError::rebuild_failure(
                        "audit proof discloses no leaves",
                    ));
                }
                let mut known = BTreeMap::new();
                for leaf in &self.leaves {
                    if leaf.index >= self.tree_size {
                        return Err(DisclosureError::rebuild_failure(format!(
                            "leaf index {} is out of range for a tree of {} leaves",
                            leaf.index, self.tree_size
                        )));
                    }
                    let hash = digest
                        .leaf_hash(leaf.index, leaf.nonce.as_deref(), &leaf.leaf_data)
                        .map_err(|err| {
                            DisclosureError::rebuild_failure(format!(
                                "cannot hash leaf {}: {}",
                                leaf.index, err
                            ))
                        })?;
                    if known.insert(leaf.index, hash).is_some() {
                        return Err(DisclosureError::rebuild_failure(format!(
                            "leaf {} is disclosed twice",
                            leaf.index
                        )));
                    }
                }
                PartialTree::rebuild(self.tree_size, known, &self.hashes, digest)
            },
            MerkleProofType::SizeOnly => {
                if !self.leaves.is_empty() {
                    return Err(DisclosureError::rebuild_failure(
                        "size-only proof discloses leaves",
                    ));
                }
                if self.hashes.len() != self.tree_size as usize {
                    return Err(DisclosureError::rebuild_failure(format!(
                        "size-only proof for {} leaves carries {} hashes",
                        self.tree_size,
                        self.hashes.len()
                    )));
                }
                let known = self
                    .hashes
                    .iter()
                    .enumerate()
                    .map(|(index, hash)| (index as u32, hash.clone()))
                    .collect();
                PartialTree::rebuild(self.tree_size, known, &[], digest)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::HashDigest;
    use crate::proofs::merkle::MerkleTree;

    fn tree(size: u8) -> MerkleTree {
        let leaves = (0..size).map(|i| vec![i; 3]).collect();
        MerkleTree::new(leaves, HashDigest::default_digest(DigestAlgorithm::Sha256)).unwrap()
    }

    #[test]
    fn test_missing_hash_is_rebuild_failure() {
        let tree = tree(5);
        let proof = tree.create_audit_proof([1]).unwrap();
        let truncated = MerkleProof::new(
            proof.proof_type(),
            proof.tree_size(),
            proof.leaves().to_vec(),
            proof.hashes()[1..].to_vec(),
        );
        let err = truncated.calculate_root(tree.digest()).unwrap_err();
        assert!(matches!(err, DisclosureError::MerkleProofRebuildFailure { .. }));
    }

    #[test]
    fn test_extra_hash_is_rebuild_failure() {
        let tree = tree(4);
        let proof = tree.create_audit_proof([0]).unwrap();
        let mut hashes = proof.hashes().to_vec();
        hashes.push(tree.root().clone());
        let padded = MerkleProof::new(proof.proof_type(), 4, proof.leaves().to_vec(), hashes);
        assert!(padded.verify(tree.root(), tree.digest()).is_err());
    }

    #[test]
    fn test_out_of_range_leaf_is_rebuild_failure() {
        let tree = tree(4);
        let proof = tree.create_audit_proof([3]).unwrap();
        let shrunk = MerkleProof::new(
            proof.proof_type(),
            3,
            proof.leaves().to_vec(),
            proof.hashes().to_vec(),
        );
        assert!(matches!(
            shrunk.calculate_root(tree.digest()),
            Err(DisclosureError::MerkleProofRebuildFailure { .. })
        ));
    }

    #[test]
    fn test_duplicate_leaf_is_rebuild_failure() {
        let tree = tree(4);
        let proof = tree.create_audit_proof([0, 1]).unwrap();
        let mut leaves = proof.leaves().to_vec();
        leaves[1] = leaves[0].clone();
        let doubled = MerkleProof::new(proof.proof_type(), 4, leaves, proof.hashes().to_vec());
        assert!(doubled.calculate_root(tree.digest()).is_err());
    }

    #[test]
    fn test_wrong_data_verifies_false() {
        let tree = tree(6);
        let proof = tree.create_audit_proof([2]).unwrap();
        let mut leaves = proof.leaves().to_vec();
        leaves[0].leaf_data = b"forged".to_vec();
        let forged = MerkleProof::new(proof.proof_type(), 6, leaves, proof.hashes().to_vec());
        assert!(!forged.verify(tree.root(), tree.digest()).unwrap());
    }

    #[test]
    fn test_size_only_proof_shape() {
        let tree = tree(5);
        let proof = tree.create_size_only_proof();
        assert!(proof.leaves().is_empty());
        assert_eq!(proof.calculate_root(tree.digest()).unwrap(), *tree.root());

        let lying = MerkleProof::new(MerkleProofType::SizeOnly, 6, Vec::new(), proof.hashes().to_vec());
        assert!(lying.calculate_root(tree.digest()).is_err());
    }

    #[test]
    fn test_foreign_algorithm_hash_is_rebuild_failure() {
        let tree = tree(4);
        let proof = tree.create_audit_proof([0]).unwrap();
        let digest = HashDigest::default_digest(DigestAlgorithm::Sha512);
        assert!(matches!(
            proof.calculate_root(&digest),
            Err(DisclosureError::MerkleProofRebuildFailure { .. })
        ));
    }

    #[test]
    fn test_subset_matches_fresh_proof() {
        let tree = tree(7);
        let wide = tree.create_audit_proof([1, 4, 6]).unwrap();
        let narrow = wide.subset([4], tree.digest()).unwrap();
        assert_eq!(narrow, tree.create_audit_proof([4]).unwrap());
        assert!(wide.subset([2], tree.digest()).is_err());
    }

    #[test]
    fn test_merge_matches_fresh_proof() {
        let tree = tree(9);
        let left = tree.create_audit_proof([0, 3]).unwrap();
        let right = tree.create_audit_proof([3, 8]).unwrap();
        let merged = left.merge(&right, tree.digest()).unwrap();
        assert_eq!(merged, tree.create_audit_proof([0, 3, 8]).unwrap());
    }

    #[test]
    fn test_merge_rejects_other_tree() {
        let first = tree(4).create_audit_proof([0]).unwrap();
        let other_tree = MerkleTree::new(
            vec![b"p".to_vec(), b"q".to_vec(), b"r".to_vec(), b"s".to_vec()],
            HashDigest::default_digest(DigestAlgorithm::Sha256),
        )
        .unwrap();
        let second = other_tree.create_audit_proof([1]).unwrap();
        assert!(first.merge(&second, other_tree.digest()).is_err());
    }

    #[test]
    fn test_binary_and_json_encoding() {
        let digest = HashDigest::nonce(DigestAlgorithm::Sha256, [1u8; 32]);
        let tree = MerkleTree::new(vec![b"a".to_vec(), b"b".to_vec()], digest).unwrap();
        let proof = tree.create_audit_proof([1]).unwrap();

        let decoded = MerkleProof::from_bytes(&proof.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, proof);

        let json = serde_json::to_value(&proof).unwrap();
        assert_eq!(json["proof_type"], "Audit");
        assert_eq!(json["leaves"][0]["leaf_data"], "62");
        let parsed: MerkleProof = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, proof);
    }
}

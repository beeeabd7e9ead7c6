//! The unfiltered record and the trees its identifier is derived from

use crate::core::{error::*, hash::hash_bytes, types::*};
use crate::crypto::HashDigest;
use crate::filtered::builder::FilteredRecordBuilder;
use crate::filtered::model::*;
use crate::proofs::MerkleTree;
use serde::de::DeserializeOwned;
use tracing::debug;

const TOP_LEVEL_LEAF_PREFIX: &[u8] = b"LEDGER_LEAF";
const TOP_LEVEL_NODE_PREFIX: &[u8] = b"LEDGER_NODE";

/// Digest of the tree whose leaves are the group commitments
pub(crate) fn top_level_digest(algorithm: DigestAlgorithm) -> Result<HashDigest> {
    HashDigest::tweakable(algorithm, TOP_LEVEL_LEAF_PREFIX, TOP_LEVEL_NODE_PREFIX)
}

/// Root standing in for a group with no elements
pub(crate) fn empty_group_root(algorithm: DigestAlgorithm) -> Hash {
    hash_bytes(algorithm, b"")
}

/// Top-level leaf of a group: its element count (be32) followed by its root
pub(crate) fn group_commitment(size: u32, root: &Hash) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(4 + root.as_bytes().len());
    bytes.extend_from_slice(&size.to_be_bytes());
    bytes.extend_from_slice(root.as_bytes());
    bytes
}

/// Split a top-level leaf back into element count and group root
pub(crate) fn open_group_commitment(algorithm: DigestAlgorithm, bytes: &[u8]) -> Result<(u32, Hash)> {
    if bytes.len() < 4 {
        return Err(DisclosureError::invalid_argument(format!(
            "group commitment is {} bytes",
            bytes.len()
        )));
    }
    let (size, root) = bytes.split_at(4);
    let size = u32::from_be_bytes([size[0], size[1], size[2], size[3]]);
    let root = Hash::new(algorithm, root.to_vec())
        .map_err(|err| DisclosureError::invalid_argument(err.to_string()))?;
    Ok((size, root))
}

/// A fully known record: every component group plus the trees over them
#[derive(Debug, Clone)]
pub struct LedgerRecord {
    id: Hash,
    metadata: RecordMetadata,
    privacy_salt: PrivacySalt,
    /// One entry per group in ordinal order; `None` for empty groups
    group_trees: Vec<Option<MerkleTree>>,
    top_level: MerkleTree,
}

impl LedgerRecord {
    pub fn new(
        metadata: RecordMetadata,
        privacy_salt: PrivacySalt,
        components: &RecordComponents,
    ) -> Result<Self> {
        let groups = vec![
            vec![encode(&metadata)?],
            vec![
                encode(&components.notary_name)?,
                encode(&components.time_window)?,
            ],
            encode_all(&components.signatories)?,
            encode_all(&components.commands)?,
            encode_all(&components.inputs)?,
            encode_all(&components.references)?,
            encode_all(&components.outputs)?,
        ];
        Self::from_encoded_groups(metadata, privacy_salt, groups)
    }

    fn from_encoded_groups(
        metadata: RecordMetadata,
        privacy_salt: PrivacySalt,
        groups: Vec<Vec<Vec<u8>>>,
    ) -> Result<Self> {
        let algorithm = metadata.digest_algorithm;

        let mut group_trees = Vec::with_capacity(groups.len());
        let mut commitments = Vec::with_capacity(groups.len());
        for (group, elements) in ComponentGroup::ALL.iter().zip(groups) {
            if elements.is_empty() {
                commitments.push(group_commitment(0, &empty_group_root(algorithm)));
                group_trees.push(None);
                continue;
            }
            let tree = MerkleTree::new(elements, privacy_salt.group_digest(algorithm, *group))?;
            commitments.push(group_commitment(tree.size(), tree.root()));
            group_trees.push(Some(tree));
        }

        let top_level = MerkleTree::new(commitments, top_level_digest(algorithm)?)?;
        let id = top_level.root().clone();
        debug!(id = %id, "built ledger record");

        Ok(Self {
            id,
            metadata,
            privacy_salt,
            group_trees,
            top_level,
        })
    }

    /// Identifier: root of the tree over the group sizes and roots
    pub fn id(&self) -> &Hash {
        &self.id
    }

    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }

    pub fn privacy_salt(&self) -> &PrivacySalt {
        &self.privacy_salt
    }

    /// Tree over a group's elements, `None` when the group is empty
    pub fn group_tree(&self, group: ComponentGroup) -> Option<&MerkleTree> {
        self.group_trees
            .get(group.ordinal() as usize)
            .and_then(Option::as_ref)
    }

    pub fn group_root(&self, group: ComponentGroup) -> Hash {
        self.group_tree(group)
            .map(|tree| tree.root().clone())
            .unwrap_or_else(|| empty_group_root(self.metadata.digest_algorithm))
    }

    pub fn group_size(&self, group: ComponentGroup) -> u32 {
        self.group_tree(group).map_or(0, MerkleTree::size)
    }

    pub(crate) fn top_level_tree(&self) -> &MerkleTree {
        &self.top_level
    }

    /// Decode every element of a group
    pub fn group_elements<T: DeserializeOwned>(&self, group: ComponentGroup) -> Result<Vec<T>> {
        self.group_tree(group)
            .map_or(&[][..], MerkleTree::leaves)
            .iter()
            .map(|bytes| decode(bytes))
            .collect()
    }

    pub fn notary_name(&self) -> Result<String> {
        self.singular(NOTARY_NAME_INDEX)
    }

    pub fn time_window(&self) -> Result<TimeWindow> {
        self.singular(TIME_WINDOW_INDEX)
    }

    pub fn signatories(&self) -> Result<Vec<SignatoryKey>> {
        self.group_elements(ComponentGroup::Signatories)
    }

    pub fn commands(&self) -> Result<Vec<Command>> {
        self.group_elements(ComponentGroup::Commands)
    }

    pub fn inputs(&self) -> Result<Vec<StateRef>> {
        self.group_elements(ComponentGroup::Inputs)
    }

    pub fn references(&self) -> Result<Vec<StateRef>> {
        self.group_elements(ComponentGroup::References)
    }

    pub fn outputs(&self) -> Result<Vec<OutputState>> {
        self.group_elements(ComponentGroup::Outputs)
    }

    fn singular<T: DeserializeOwned>(&self, index: u32) -> Result<T> {
        let bytes = self
            .group_tree(ComponentGroup::Notary)
            .and_then(|tree| tree.leaves().get(index as usize))
            .ok_or_else(|| {
                DisclosureError::invalid_argument(format!("notary group has no element {}", index))
            })?;
        decode(bytes)
    }

    /// Start choosing what a filtered copy of this record discloses
    pub fn filter(&self) -> FilteredRecordBuilder<'_> {
        FilteredRecordBuilder::new(self)
    }
}

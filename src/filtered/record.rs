//! Filtered records and their verification

use crate::core::{error::*, types::*};
use crate::crypto::HashDigest;
use crate::filtered::data::FilteredData;
use crate::filtered::ledger::{empty_group_root, open_group_commitment, top_level_digest};
use crate::filtered::model::*;
use crate::proofs::{MerkleProof, MerkleProofType};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// How much of a group survived filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisclosureMode {
    SizeOnly,
    Audit,
}

/// The surviving fragment of one component group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredComponentGroup {
    pub mode: DisclosureMode,
    /// `None` when the original group had no elements
    pub proof: Option<MerkleProof>,
}

impl FilteredComponentGroup {
    pub fn new(mode: DisclosureMode, proof: Option<MerkleProof>) -> Self {
        Self { mode, proof }
    }

    /// Element count of the original group
    pub fn size(&self) -> u32 {
        self.proof.as_ref().map_or(0, MerkleProof::tree_size)
    }
}

/// A record reduced to the groups its holder chose to disclose.
///
/// The identifier is the one of the unfiltered record. [`FilteredRecord::verify`]
/// checks that the surviving fragments still lead back to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredRecord {
    id: Hash,
    metadata: RecordMetadata,
    top_level_proof: MerkleProof,
    groups: BTreeMap<ComponentGroup, FilteredComponentGroup>,
}

impl FilteredRecord {
    pub(crate) fn new(
        id: Hash,
        metadata: RecordMetadata,
        top_level_proof: MerkleProof,
        groups: BTreeMap<ComponentGroup, FilteredComponentGroup>,
    ) -> Self {
        Self {
            id,
            metadata,
            top_level_proof,
            groups,
        }
    }

    pub fn id(&self) -> &Hash {
        &self.id
    }

    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }

    /// Proof of the disclosed group roots against the identifier
    pub fn top_level_proof(&self) -> &MerkleProof {
        &self.top_level_proof
    }

    /// Fragment of `group`, `None` when the group was removed
    pub fn group(&self, group: ComponentGroup) -> Option<&FilteredComponentGroup> {
        self.groups.get(&group)
    }

    pub fn groups(&self) -> impl Iterator<Item = (ComponentGroup, &FilteredComponentGroup)> {
        self.groups.iter().map(|(group, fragment)| (*group, fragment))
    }

    /// Check that every surviving fragment reconstructs the identifier.
    ///
    /// Any discrepancy is reported as `InconsistentFilteredData`.
    pub fn verify(&self) -> Result<()> {
        self.check().map_err(|err| {
            warn!(id = %self.id, error = %err, "filtered record failed verification");
            err
        })?;
        debug!(id = %self.id, groups = self.groups.len(), "filtered record verified");
        Ok(())
    }

    fn check(&self) -> Result<()> {
        let algorithm = self.metadata.digest_algorithm;
        if self.id.algorithm() != algorithm {
            return Err(DisclosureError::inconsistent(format!(
                "identifier uses {} but the metadata names {}",
                self.id.algorithm(),
                algorithm
            )));
        }

        let proof = &self.top_level_proof;
        if proof.proof_type() != MerkleProofType::Audit
            || proof.tree_size() != ComponentGroup::ALL.len() as u32
        {
            return Err(DisclosureError::inconsistent(
                "top-level proof does not cover every component group",
            ));
        }
        let digest = top_level_digest(algorithm)?;
        match proof.verify(&self.id, &digest) {
            Ok(true) => {},
            Ok(false) => {
                return Err(DisclosureError::inconsistent(
                    "group roots do not reconstruct the identifier",
                ))
            },
            Err(err) => {
                return Err(DisclosureError::inconsistent(format!(
                    "top-level proof is malformed: {}",
                    err
                )))
            },
        }

        let present: BTreeSet<u32> = self.groups.keys().map(|group| group.ordinal()).collect();
        if proof.disclosed_indices() != present {
            return Err(DisclosureError::inconsistent(
                "top-level proof and group fragments disagree on which groups are present",
            ));
        }
        if !self.groups.contains_key(&ComponentGroup::Metadata) {
            return Err(DisclosureError::inconsistent("metadata group is missing"));
        }

        for (group, fragment) in &self.groups {
            let commitment = proof.leaf(group.ordinal()).ok_or_else(|| {
                DisclosureError::inconsistent(format!("no root disclosed for {}", group))
            })?;
            let (size, root) = open_group_commitment(algorithm, &commitment.leaf_data).map_err(|err| {
                DisclosureError::inconsistent(format!("commitment of {} is malformed: {}", group, err))
            })?;
            Self::check_group(*group, fragment, size, &root, algorithm)?;
        }

        let metadata_leaf = self
            .groups
            .get(&ComponentGroup::Metadata)
            .and_then(|fragment| fragment.proof.as_ref())
            .and_then(|proof| proof.leaf(0))
            .ok_or_else(|| DisclosureError::inconsistent("metadata element is not disclosed"))?;
        let disclosed: RecordMetadata = decode(&metadata_leaf.leaf_data)
            .map_err(|err| DisclosureError::inconsistent(format!("metadata is malformed: {}", err)))?;
        if disclosed != self.metadata {
            return Err(DisclosureError::inconsistent(
                "disclosed metadata differs from the record metadata",
            ));
        }

        Ok(())
    }

    fn check_group(
        group: ComponentGroup,
        fragment: &FilteredComponentGroup,
        size: u32,
        root: &Hash,
        algorithm: DigestAlgorithm,
    ) -> Result<()> {
        let proof = match &fragment.proof {
            Some(proof) => proof,
            None => {
                if size != 0 || *root != empty_group_root(algorithm) {
                    return Err(DisclosureError::inconsistent(format!(
                        "{} claims to be empty but its root says otherwise",
                        group
                    )));
                }
                return Ok(());
            },
        };

        if fragment.mode == DisclosureMode::SizeOnly && proof.proof_type() != MerkleProofType::SizeOnly {
            return Err(DisclosureError::inconsistent(format!(
                "{} is marked size-only but discloses elements",
                group
            )));
        }
        let expected_size = match group {
            ComponentGroup::Metadata => Some(1),
            ComponentGroup::Notary => Some(2),
            _ => None,
        };
        if expected_size.map_or(false, |expected| expected != size) {
            return Err(DisclosureError::inconsistent(format!(
                "{} has {} elements",
                group, size
            )));
        }
        // The replay alone does not pin the leaf count
        if proof.tree_size() != size {
            return Err(DisclosureError::inconsistent(format!(
                "{} proof claims {} elements but {} are committed",
                group,
                proof.tree_size(),
                size
            )));
        }

        let digest = match proof.proof_type() {
            MerkleProofType::Audit => HashDigest::nonce_verify(algorithm),
            MerkleProofType::SizeOnly => HashDigest::nonce_size_only_verify(algorithm),
        };
        match proof.verify(root, &digest) {
            Ok(true) => Ok(()),
            Ok(false) => Err(DisclosureError::inconsistent(format!(
                "{} does not match its root",
                group
            ))),
            Err(err) => Err(DisclosureError::inconsistent(format!(
                "{} proof is malformed: {}",
                group, err
            ))),
        }
    }

    /// Typed view of a list group
    pub fn group_data<T: DeserializeOwned>(&self, group: ComponentGroup) -> Result<FilteredData<T>> {
        let fragment = match self.groups.get(&group) {
            Some(fragment) => fragment,
            None => return Ok(FilteredData::Removed),
        };
        let size = fragment.size();
        match fragment.mode {
            DisclosureMode::SizeOnly => Ok(FilteredData::SizeOnly { size }),
            DisclosureMode::Audit => {
                let mut values = BTreeMap::new();
                if let Some(proof) = &fragment.proof {
                    for leaf in proof.leaves() {
                        values.insert(leaf.index, decode(&leaf.leaf_data)?);
                    }
                }
                Ok(FilteredData::Audit { size, values })
            },
        }
    }

    pub fn signatories(&self) -> Result<FilteredData<SignatoryKey>> {
        self.group_data(ComponentGroup::Signatories)
    }

    pub fn commands(&self) -> Result<FilteredData<Command>> {
        self.group_data(ComponentGroup::Commands)
    }

    pub fn inputs(&self) -> Result<FilteredData<StateRef>> {
        self.group_data(ComponentGroup::Inputs)
    }

    pub fn references(&self) -> Result<FilteredData<StateRef>> {
        self.group_data(ComponentGroup::References)
    }

    pub fn outputs(&self) -> Result<FilteredData<OutputState>> {
        self.group_data(ComponentGroup::Outputs)
    }

    /// Notary name, if it was revealed
    pub fn notary_name(&self) -> Result<Option<String>> {
        self.notary_field(NOTARY_NAME_INDEX)
    }

    /// Time window, if it was revealed
    pub fn time_window(&self) -> Result<Option<TimeWindow>> {
        self.notary_field(TIME_WINDOW_INDEX)
    }

    fn notary_field<T: DeserializeOwned>(&self, index: u32) -> Result<Option<T>> {
        self.groups
            .get(&ComponentGroup::Notary)
            .and_then(|fragment| fragment.proof.as_ref())
            .and_then(|proof| proof.leaf(index))
            .map(|leaf| decode(&leaf.leaf_data))
            .transpose()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }
}

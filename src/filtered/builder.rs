//! Fluent selection of what a filtered record discloses
//!
//! Every group starts out removed. List groups can be reduced to their size
//! or audited, optionally through a predicate; the two notary fields are
//! either revealed or left out. The metadata group is always disclosed.

use crate::core::error::*;
use crate::filtered::ledger::LedgerRecord;
use crate::filtered::model::*;
use crate::filtered::record::{DisclosureMode, FilteredComponentGroup, FilteredRecord};
use crate::proofs::{MerkleProof, MerkleTree};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

type ElementPredicate<'a> = Box<dyn Fn(&[u8]) -> Result<bool> + 'a>;

enum Selection<'a> {
    SizeOnly,
    Audit(Option<ElementPredicate<'a>>),
    Indices(BTreeSet<u32>),
}

/// Builder returned by [`LedgerRecord::filter`]
pub struct FilteredRecordBuilder<'a> {
    record: &'a LedgerRecord,
    selections: BTreeMap<ComponentGroup, Selection<'a>>,
}

impl<'a> FilteredRecordBuilder<'a> {
    pub(crate) fn new(record: &'a LedgerRecord) -> Self {
        Self {
            record,
            selections: BTreeMap::new(),
        }
    }

    pub fn with_notary(self) -> Self {
        self.reveal(NOTARY_NAME_INDEX)
    }

    pub fn with_time_window(self) -> Self {
        self.reveal(TIME_WINDOW_INDEX)
    }

    pub fn with_signatories(self) -> Self {
        self.audit(ComponentGroup::Signatories, None)
    }

    pub fn with_signatories_matching<F>(self, predicate: F) -> Self
    where
        F: Fn(&SignatoryKey) -> bool + 'a,
    {
        self.audit_matching(ComponentGroup::Signatories, predicate)
    }

    pub fn with_signatories_size(self) -> Self {
        self.size_only(ComponentGroup::Signatories)
    }

    pub fn with_commands(self) -> Self {
        self.audit(ComponentGroup::Commands, None)
    }

    pub fn with_commands_matching<F>(self, predicate: F) -> Self
    where
        F: Fn(&Command) -> bool + 'a,
    {
        self.audit_matching(ComponentGroup::Commands, predicate)
    }

    pub fn with_commands_size(self) -> Self {
        self.size_only(ComponentGroup::Commands)
    }

    pub fn with_inputs(self) -> Self {
        self.audit(ComponentGroup::Inputs, None)
    }

    pub fn with_inputs_matching<F>(self, predicate: F) -> Self
    where
        F: Fn(&StateRef) -> bool + 'a,
    {
        self.audit_matching(ComponentGroup::Inputs, predicate)
    }

    pub fn with_inputs_size(self) -> Self {
        self.size_only(ComponentGroup::Inputs)
    }

    pub fn with_references(self) -> Self {
        self.audit(ComponentGroup::References, None)
    }

    pub fn with_references_matching<F>(self, predicate: F) -> Self
    where
        F: Fn(&StateRef) -> bool + 'a,
    {
        self.audit_matching(ComponentGroup::References, predicate)
    }

    pub fn with_references_size(self) -> Self {
        self.size_only(ComponentGroup::References)
    }

    pub fn with_outputs(self) -> Self {
        self.audit(ComponentGroup::Outputs, None)
    }

    pub fn with_outputs_matching<F>(self, predicate: F) -> Self
    where
        F: Fn(&OutputState) -> bool + 'a,
    {
        self.audit_matching(ComponentGroup::Outputs, predicate)
    }

    pub fn with_outputs_size(self) -> Self {
        self.size_only(ComponentGroup::Outputs)
    }

    /// Disclose only the element count of a list group
    pub fn size_only(mut self, group: ComponentGroup) -> Self {
        if Self::is_list_group(group) {
            self.selections.insert(group, Selection::SizeOnly);
        }
        self
    }

    /// Disclose every element of a list group
    pub fn audit_all(self, group: ComponentGroup) -> Self {
        self.audit(group, None)
    }

    /// Disclose the elements of a list group that satisfy `predicate`
    pub fn audit_matching<T, F>(self, group: ComponentGroup, predicate: F) -> Self
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool + 'a,
    {
        let predicate: ElementPredicate<'a> =
            Box::new(move |bytes| Ok(predicate(&decode::<T>(bytes)?)));
        self.audit(group, Some(predicate))
    }

    /// Disclose the elements of a list group at `indices`.
    ///
    /// An index past the end of the group makes [`build`](Self::build) fail.
    pub fn audit_indices<I>(mut self, group: ComponentGroup, indices: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        if Self::is_list_group(group) {
            self.selections
                .insert(group, Selection::Indices(indices.into_iter().collect()));
        }
        self
    }

    fn audit(mut self, group: ComponentGroup, predicate: Option<ElementPredicate<'a>>) -> Self {
        if Self::is_list_group(group) {
            self.selections.insert(group, Selection::Audit(predicate));
        }
        self
    }

    fn reveal(mut self, index: u32) -> Self {
        let selection = self
            .selections
            .entry(ComponentGroup::Notary)
            .or_insert_with(|| Selection::Indices(BTreeSet::new()));
        if let Selection::Indices(indices) = selection {
            indices.insert(index);
        }
        self
    }

    fn is_list_group(group: ComponentGroup) -> bool {
        !matches!(group, ComponentGroup::Metadata | ComponentGroup::Notary)
    }

    /// Assemble the filtered record; its identifier is copied from the original
    pub fn build(self) -> Result<FilteredRecord> {
        let record = self.record;
        let mut groups = BTreeMap::new();

        let metadata_tree = record
            .group_tree(ComponentGroup::Metadata)
            .ok_or_else(|| DisclosureError::invalid_argument("record has no metadata group"))?;
        groups.insert(
            ComponentGroup::Metadata,
            FilteredComponentGroup::new(
                DisclosureMode::Audit,
                Some(metadata_tree.create_audit_proof([0])?),
            ),
        );

        for (group, selection) in self.selections {
            let tree = record.group_tree(group);
            let entry = match selection {
                Selection::SizeOnly => FilteredComponentGroup::new(
                    DisclosureMode::SizeOnly,
                    tree.map(MerkleTree::create_size_only_proof),
                ),
                Selection::Audit(predicate) => {
                    let proof = match tree {
                        Some(tree) => Some(Self::audit_proof(tree, predicate.as_deref())?),
                        None => None,
                    };
                    FilteredComponentGroup::new(DisclosureMode::Audit, proof)
                },
                Selection::Indices(indices) => {
                    let proof = match tree {
                        Some(tree) => Some(Self::indices_proof(tree, &indices)?),
                        None if indices.is_empty() => None,
                        None => {
                            return Err(DisclosureError::invalid_argument(format!(
                                "{} is empty but elements were requested",
                                group
                            )))
                        },
                    };
                    FilteredComponentGroup::new(DisclosureMode::Audit, proof)
                },
            };
            groups.insert(group, entry);
        }

        let top_level_proof = record
            .top_level_tree()
            .create_audit_proof(groups.keys().map(|group| group.ordinal()))?;

        debug!(
            id = %record.id(),
            disclosed_groups = groups.len(),
            "built filtered record"
        );

        Ok(FilteredRecord::new(
            record.id().clone(),
            record.metadata().clone(),
            top_level_proof,
            groups,
        ))
    }

    fn audit_proof(
        tree: &MerkleTree,
        predicate: Option<&(dyn Fn(&[u8]) -> Result<bool> + 'a)>,
    ) -> Result<MerkleProof> {
        let mut indices = Vec::new();
        for (index, element) in tree.leaves().iter().enumerate() {
            let selected = match predicate {
                Some(predicate) => predicate(element)?,
                None => true,
            };
            if selected {
                indices.push(index as u32);
            }
        }
        if indices.is_empty() {
            return Ok(tree.create_size_only_proof());
        }
        tree.create_audit_proof(indices)
    }

    fn indices_proof(tree: &MerkleTree, indices: &BTreeSet<u32>) -> Result<MerkleProof> {
        if indices.is_empty() {
            return Ok(tree.create_size_only_proof());
        }
        tree.create_audit_proof(indices.iter().copied())
    }
}

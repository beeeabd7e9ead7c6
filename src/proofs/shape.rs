//! Tree shape shared by construction, proof extraction and proof replay
//!
//! Levels are numbered from the leaves (level 0) up to the root. On a level
//! with an odd number of nodes the last node is paired with itself.

use crate::core::{error::*, types::*};
use crate::crypto::provider::HashDigestProvider;
use std::collections::{BTreeMap, BTreeSet};

/// Number of nodes on each level, leaves first and root last
pub(crate) fn level_widths(tree_size: u32) -> Vec<u32> {
    let mut widths = vec![tree_size];
    let mut width = tree_size;
    while width > 1 {
        width = width / 2 + width % 2;
        widths.push(width);
    }
    widths
}

/// Node paired with `pos`, or `None` when `pos` is an odd last node
pub(crate) fn sibling(pos: u32, width: u32) -> Option<u32> {
    let other = pos ^ 1;
    (other < width).then_some(other)
}

/// Nodes whose hashes an audit proof for `indices` has to carry.
///
/// Ordered bottom-up by level and left to right within a level; proof replay
/// consumes supplied hashes in exactly this order.
pub(crate) fn required_siblings(tree_size: u32, indices: &BTreeSet<u32>) -> Vec<(usize, u32)> {
    let mut known = indices.clone();
    let mut required = Vec::new();
    for (level, &width) in level_widths(tree_size).iter().enumerate() {
        if width == 1 {
            break;
        }
        for &pos in &known {
            if let Some(other) = sibling(pos, width) {
                if !known.contains(&other) {
                    required.push((level, other));
                }
            }
        }
        known = known.iter().map(|pos| pos / 2).collect();
    }
    required
}

/// Look up the hashes of every required sibling
pub(crate) fn collect_siblings<F>(
    tree_size: u32,
    indices: &BTreeSet<u32>,
    mut lookup: F,
) -> Result<Vec<Hash>>
where
    F: FnMut(usize, u32) -> Option<Hash>,
{
    required_siblings(tree_size, indices)
        .into_iter()
        .map(|(level, pos)| {
            lookup(level, pos).ok_or_else(|| {
                DisclosureError::rebuild_failure(format!(
                    "no hash known for node {} on level {}",
                    pos, level
                ))
            })
        })
        .collect()
}

/// Every node hash known after replaying a proof
#[derive(Debug, Clone)]
pub(crate) struct PartialTree {
    levels: Vec<BTreeMap<u32, Hash>>,
}

impl PartialTree {
    /// Fold `known` leaf-level hashes up to the root, filling gaps from `supplied`
    pub(crate) fn rebuild<D>(
        tree_size: u32,
        known: BTreeMap<u32, Hash>,
        supplied: &[Hash],
        digest: &D,
    ) -> Result<Self>
    where
        D: HashDigestProvider + ?Sized,
    {
        let widths = level_widths(tree_size);
        let mut supplied = supplied.iter();
        let mut levels = Vec::with_capacity(widths.len());
        let mut current = known;

        for (level, &width) in widths.iter().enumerate() {
            if width == 1 {
                break;
            }

            let positions: Vec<u32> = current.keys().copied().collect();
            for pos in positions {
                if let Some(other) = sibling(pos, width) {
                    if !current.contains_key(&other) {
                        let hash = supplied.next().ok_or_else(|| {
                            DisclosureError::rebuild_failure(format!(
                                "ran out of hashes on level {}",
                                level
                            ))
                        })?;
                        current.insert(other, hash.clone());
                    }
                }
            }

            let mut parents = BTreeMap::new();
            for (&pos, left) in current.range(..).filter(|(pos, _)| *pos % 2 == 0) {
                let right = match sibling(pos, width) {
                    Some(other) => current.get(&other).unwrap_or(left),
                    None => left,
                };
                parents.insert(pos / 2, digest.node_hash(left, right));
            }

            levels.push(current);
            current = parents;
        }

        let unused = supplied.count();
        if unused > 0 {
            return Err(DisclosureError::rebuild_failure(format!(
                "{} supplied hashes were not needed",
                unused
            )));
        }
        if current.len() != 1 || !current.contains_key(&0) {
            return Err(DisclosureError::rebuild_failure(
                "proof does not reach a single root",
            ));
        }
        levels.push(current);

        Ok(PartialTree { levels })
    }

    pub(crate) fn root(&self) -> &Hash {
        // rebuild guarantees the top level holds exactly node 0
        &self.levels[self.levels.len() - 1][&0]
    }

    pub(crate) fn node(&self, level: usize, pos: u32) -> Option<&Hash> {
        self.levels.get(level).and_then(|nodes| nodes.get(&pos))
    }

    /// Add the nodes of another replay of the same tree
    pub(crate) fn absorb(&mut self, other: PartialTree) {
        for (mine, theirs) in self.levels.iter_mut().zip(other.levels) {
            for (pos, hash) in theirs {
                mine.entry(pos).or_insert(hash);
            }
        }
    }
}

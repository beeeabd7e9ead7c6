//! Per-group view of a filtered record

use std::collections::BTreeMap;

/// What a filtered record reveals about one component group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilteredData<T> {
    /// Nothing, not even the element count
    Removed,
    /// Only the number of elements
    SizeOnly { size: u32 },
    /// The original element count and the disclosed elements by original index
    Audit { size: u32, values: BTreeMap<u32, T> },
}

impl<T> FilteredData<T> {
    /// Original element count, unless the group was removed
    pub fn size(&self) -> Option<u32> {
        match self {
            FilteredData::Removed => None,
            FilteredData::SizeOnly { size } | FilteredData::Audit { size, .. } => Some(*size),
        }
    }

    pub fn values(&self) -> Option<&BTreeMap<u32, T>> {
        match self {
            FilteredData::Audit { values, .. } => Some(values),
            _ => None,
        }
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, FilteredData::Removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(FilteredData::<u8>::Removed.size(), None);
        assert_eq!(FilteredData::<u8>::SizeOnly { size: 4 }.size(), Some(4));

        let audit = FilteredData::Audit {
            size: 5,
            values: BTreeMap::from([(3, "x")]),
        };
        assert_eq!(audit.size(), Some(5));
        assert_eq!(audit.values().map(|values| values.len()), Some(1));
    }
}

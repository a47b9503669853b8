//! Utility types.

use crate::grammar::SymbolID;

type BuildHasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasher>;
pub type Set<T> = indexmap::IndexSet<T, BuildHasher>;

/// A dense set of symbols, indexed by their raw id.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SymbolSet {
    inner: bit_set::BitSet,
}

impl SymbolSet {
    pub fn contains(&self, id: SymbolID) -> bool {
        self.inner.contains(id.index())
    }

    pub fn insert(&mut self, id: SymbolID) -> bool {
        self.inner.insert(id.index())
    }

    /// Add all elements of `other`, returning whether this set grew.
    pub fn union_with(&mut self, other: &Self) -> bool {
        let before = self.inner.len();
        self.inner.union_with(&other.inner);
        self.inner.len() != before
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SymbolID> + '_ {
        self.inner.iter().map(SymbolID::from_index)
    }
}

impl FromIterator<SymbolID> for SymbolSet {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = SymbolID>,
    {
        Self {
            inner: iter.into_iter().map(SymbolID::index).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_reports_growth() {
        let mut a: SymbolSet = [SymbolID::from_raw(1), SymbolID::from_raw(3)]
            .into_iter()
            .collect();
        let b: SymbolSet = Some(SymbolID::from_raw(3)).into_iter().collect();
        assert!(!a.union_with(&b));

        let c: SymbolSet = Some(SymbolID::from_raw(7)).into_iter().collect();
        assert!(a.union_with(&c));
        assert_eq!(
            a.iter().map(SymbolID::into_raw).collect::<Vec<_>>(),
            [1, 3, 7]
        );
    }
}

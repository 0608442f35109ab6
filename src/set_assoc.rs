/*!
set_assoc.rs - Set-associative LRU table.

Overview
========
`SetAssocTable<V>` is `n_sets` independent `AssocTable<V>`s. A key (always
an integer signature in this crate) is split into an index
(`h(key) mod n_sets`) selecting the set and a tag (`h(key) / n_sets`)
looked up within that set's fully-associative table. Since signatures are
already small integers, `h` is the identity function: the modulo/divide
split is the only hashing this crate needs. The signature bit-width vs.
`n_sets * 2^tag_bits` relationship is a storage-budget concern, not a
correctness one, which is why `insert`/`contains` never check it.
*/

use crate::lru::AssocTable;

/// Set-associative signature -> value map with per-set LRU replacement.
#[derive(Debug, Clone)]
pub struct SetAssocTable<V> {
    n_sets: u64,
    sets: Vec<AssocTable<V>>,
}

impl<V> SetAssocTable<V> {
    pub fn new(n_sets: usize, n_ways: usize) -> Self {
        assert!(n_sets > 0, "SetAssocTable requires at least one set");
        Self {
            n_sets: n_sets as u64,
            sets: (0..n_sets).map(|_| AssocTable::new(n_ways)).collect(),
        }
    }

    fn split(&self, key: u64) -> (usize, u64) {
        let index = (key % self.n_sets) as usize;
        let tag = key / self.n_sets;
        (index, tag)
    }

    pub fn contains(&self, key: u64) -> bool {
        let (index, tag) = self.split(key);
        self.sets[index].contains(tag)
    }

    pub fn touch(&mut self, key: u64) {
        let (index, tag) = self.split(key);
        self.sets[index].touch(tag);
    }

    pub fn get(&self, key: u64) -> &V {
        let (index, tag) = self.split(key);
        self.sets[index].get(tag)
    }

    pub fn get_mut(&mut self, key: u64) -> &mut V {
        let (index, tag) = self.split(key);
        self.sets[index].get_mut(tag)
    }

    pub fn insert(&mut self, key: u64, value: V) {
        let (index, tag) = self.split(key);
        self.sets[index].insert(tag, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexing_is_deterministic() {
        let t: SetAssocTable<u32> = SetAssocTable::new(8, 4);
        let (i1, tag1) = t.split(37);
        let (i2, tag2) = t.split(37);
        assert_eq!((i1, tag1), (i2, tag2));
    }

    #[test]
    fn colliding_sets_dont_clobber_distinct_tags() {
        // With 8 sets: keys 3 and 11 share index 3, tags 0 and 1.
        let mut t: SetAssocTable<u32> = SetAssocTable::new(8, 4);
        t.insert(3, 100);
        t.insert(11, 200);
        assert!(t.contains(3));
        assert!(t.contains(11));
        assert_eq!(*t.get(3), 100);
        assert_eq!(*t.get(11), 200);
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let mut t: SetAssocTable<u32> = SetAssocTable::new(128, 4);
        t.insert(4242, 7);
        assert_eq!(*t.get(4242), 7);
    }
}

/*!
lru.rs - Rank-vector LRU ordering and the fully-associative LRU table built
on top of it.

Overview
========
`LruOrder` is the shared substrate described as component 1 in the system
overview: a fixed-width permutation of ranks, one per slot, where rank 0 is
the most recently used slot and rank `N-1` (`N` = the number of slots) is
the eviction victim. `AssocTable` is a small `N_Ways`-slot tag/value store
built directly on `LruOrder` (component 2).

Both types are sized at construction and never resized; `N_Ways` is small
in every caller (3 or 4), so the O(N_Ways) linear scan on every `touch`
beats a linked-list LRU on real cache behavior, per the design notes.
*/

/// A permutation of `0..len` where `order[i]` is the age of slot `i`
/// (0 = most recently used, `len - 1` = oldest / next victim).
#[derive(Debug, Clone)]
pub struct LruOrder {
    rank: Vec<usize>,
}

impl LruOrder {
    /// Build a fresh order over `len` slots, ranked `0, 1, .., len-1` by
    /// slot index (slot 0 initially "most recently used").
    pub fn new(len: usize) -> Self {
        Self {
            rank: (0..len).collect(),
        }
    }

    /// Mark slot `k` as most recently used, aging every slot that was more
    /// recent than it.
    pub fn touch(&mut self, k: usize) {
        let rank_k = self.rank[k];
        for r in self.rank.iter_mut() {
            if *r < rank_k {
                *r += 1;
            }
        }
        self.rank[k] = 0;
    }

    /// The slot with the maximum rank: the next eviction victim.
    pub fn victim(&self) -> usize {
        self.rank
            .iter()
            .enumerate()
            .max_by_key(|&(_, &r)| r)
            .map(|(i, _)| i)
            .expect("LruOrder is never empty")
    }

    #[cfg(test)]
    fn is_permutation(&self) -> bool {
        let mut seen = vec![false; self.rank.len()];
        for &r in &self.rank {
            if r >= seen.len() || seen[r] {
                return false;
            }
            seen[r] = true;
        }
        true
    }
}

/// Fixed `n_ways`-slot, fully-associative tag-to-value store with LRU
/// replacement. A slot is `None` until first written, so `V` needs no
/// placeholder/default value.
#[derive(Debug, Clone)]
pub struct AssocTable<V> {
    slots: Vec<Option<(u64, V)>>,
    order: LruOrder,
}

impl<V> AssocTable<V> {
    pub fn new(n_ways: usize) -> Self {
        Self {
            slots: (0..n_ways).map(|_| None).collect(),
            order: LruOrder::new(n_ways),
        }
    }

    fn find(&self, tag: u64) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| matches!(s, Some((t, _)) if *t == tag))
    }

    /// True iff a valid slot carries `tag`.
    pub fn contains(&self, tag: u64) -> bool {
        self.find(tag).is_some()
    }

    /// Touch the slot holding `tag`. Precondition: `contains(tag)`.
    pub fn touch(&mut self, tag: u64) {
        let idx = self
            .find(tag)
            .expect("touch() precondition: contains(tag) must hold");
        self.order.touch(idx);
    }

    /// Read-only access to the value stored under `tag`. Precondition:
    /// `contains(tag)`.
    pub fn get(&self, tag: u64) -> &V {
        let idx = self
            .find(tag)
            .expect("get() precondition: contains(tag) must hold");
        &self.slots[idx].as_ref().unwrap().1
    }

    /// Mutable access to the value stored under `tag`. Precondition:
    /// `contains(tag)`.
    pub fn get_mut(&mut self, tag: u64) -> &mut V {
        let idx = self
            .find(tag)
            .expect("get_mut() precondition: contains(tag) must hold");
        &mut self.slots[idx].as_mut().unwrap().1
    }

    /// Insert or overwrite `tag -> value`, touching the slot either way.
    /// On a fresh tag this evicts the current max-rank slot regardless of
    /// its validity.
    pub fn insert(&mut self, tag: u64, value: V) {
        if let Some(idx) = self.find(tag) {
            self.slots[idx] = Some((tag, value));
            self.order.touch(idx);
            return;
        }
        let victim = self.order.victim();
        if let Some((old_tag, _)) = &self.slots[victim] {
            log::trace!("AssocTable: evicting tag {old_tag:#x} for tag {tag:#x}");
        }
        self.slots[victim] = Some((tag, value));
        self.order.touch(victim);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lru_order_starts_as_identity() {
        let o = LruOrder::new(4);
        assert!(o.is_permutation());
        assert_eq!(o.victim(), 3);
    }

    #[test]
    fn touch_moves_slot_to_rank_zero_and_stays_a_permutation() {
        let mut o = LruOrder::new(4);
        o.touch(2);
        assert!(o.is_permutation());
        assert_eq!(o.rank[2], 0);
        assert_eq!(o.victim(), 3); // slot 3 untouched, still oldest
    }

    #[test]
    fn repeated_touch_sequence_keeps_valid_order() {
        let mut o = LruOrder::new(4);
        for k in [0, 1, 2, 3, 0, 2, 1, 3, 3, 0] {
            o.touch(k);
            assert!(o.is_permutation());
        }
        // last touched was 0, so it must be rank 0
        assert_eq!(o.rank[0], 0);
    }

    #[test]
    fn assoc_table_insert_then_get_roundtrips() {
        let mut t: AssocTable<u32> = AssocTable::new(4);
        t.insert(10, 100);
        assert!(t.contains(10));
        assert_eq!(*t.get(10), 100);
    }

    #[test]
    fn assoc_table_evicts_max_rank_slot_on_capacity() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut t: AssocTable<u32> = AssocTable::new(2);
        t.insert(1, 10);
        t.insert(2, 20);
        // touching 1 makes 2 the oldest
        t.touch(1);
        t.insert(3, 30);
        assert!(!t.contains(2));
        assert!(t.contains(1));
        assert!(t.contains(3));
    }

    #[test]
    fn victim_after_inserts_and_touches_has_max_rank() {
        let mut t: AssocTable<u32> = AssocTable::new(3);
        t.insert(1, 1);
        t.insert(2, 2);
        t.insert(3, 3);
        t.touch(1);
        assert_eq!(t.order.victim(), t.find(2).unwrap());
    }
}

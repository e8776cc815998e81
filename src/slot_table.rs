//! SlotTable: structural layer mapping string keys to slots with stable
//! generational handles.
//!
//! The index is a `hashbrown::HashTable` of slot handles and the store is a
//! `slotmap::SlotMap`, so lookups are O(1) average and iteration follows the
//! slot order, which is repeatable for a table that receives no mutation
//! between passes. Each slot carries its precomputed `u64` hash; keys are
//! never re-hashed after insertion, and `rekey` swaps a slot's key in place
//! so the slot keeps its iteration position.

use core::hash::BuildHasher;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

#[derive(Clone, Debug)]
struct Slot<T> {
    key: String,
    item: T,
    hash: u64,
}

#[derive(Clone)]
pub(crate) struct SlotTable<T, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Slot<T>>, // storage using generational keys
}

impl<T, S> SlotTable<T, S> {
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn get(&self, h: DefaultKey) -> Option<(&str, &T)> {
        self.slots.get(h).map(|s| (s.key.as_str(), &s.item))
    }

    pub(crate) fn get_mut(&mut self, h: DefaultKey) -> Option<&mut T> {
        self.slots.get_mut(h).map(|s| &mut s.item)
    }

    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            it: self.slots.iter(),
        }
    }

    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            it: self.slots.iter_mut(),
        }
    }

    /// Snapshot of the live slot handles in iteration order.
    pub(crate) fn handles(&self) -> Vec<DefaultKey> {
        self.slots.keys().collect()
    }
}

/// Iterator over immutable slots in `SlotTable`.
pub(crate) struct Iter<'a, T> {
    it: slotmap::basic::Iter<'a, DefaultKey, Slot<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (DefaultKey, &'a str, &'a T);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(h, s)| (h, s.key.as_str(), &s.item))
    }
}

/// Iterator over mutable slots in `SlotTable`.
pub(crate) struct IterMut<'a, T> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Slot<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = (&'a str, &'a mut T);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_h, s)| (s.key.as_str(), &mut s.item))
    }
}

impl<T, S> SlotTable<T, S>
where
    S: BuildHasher + Clone + Default,
{
    pub(crate) fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::new(),
            slots: SlotMap::with_key(),
        }
    }

    fn make_hash(&self, key: &str) -> u64 {
        self.hasher.hash_one(key)
    }

    pub(crate) fn find(&self, key: &str) -> Option<DefaultKey> {
        let hash = self.make_hash(key);
        self.index
            .find(hash, |&h| {
                self.slots.get(h).map(|s| s.key == key).unwrap_or(false)
            })
            .copied()
    }

    /// Insert under a fresh key. On a duplicate the table is left unchanged
    /// and the item is handed back to the caller.
    pub(crate) fn insert(&mut self, key: &str, item: T) -> Result<DefaultKey, T> {
        let hash = self.make_hash(key);
        match self.index.entry(
            hash,
            |&h| self.slots.get(h).map(|s| s.key == key).unwrap_or(false),
            |&h| self.slots.get(h).map(|s| s.hash).unwrap_or(0),
        ) {
            hashbrown::hash_table::Entry::Occupied(_) => Err(item),
            hashbrown::hash_table::Entry::Vacant(v) => {
                let h = self.slots.insert(Slot {
                    key: key.to_string(),
                    item,
                    hash,
                });
                let _ = v.insert(h);
                Ok(h)
            }
        }
    }

    pub(crate) fn remove(&mut self, h: DefaultKey) -> Option<T> {
        let slot = self.slots.remove(h)?;

        // Unlink from index via occupied entry removal.
        self.index
            .find_entry(slot.hash, |&hh| hh == h)
            .unwrap()
            .remove();

        Some(slot.item)
    }

    /// Replace a slot's key in place. The slot keeps its handle, item, and
    /// iteration position. The caller has already ruled out collisions.
    pub(crate) fn rekey(&mut self, h: DefaultKey, new_key: &str) {
        let old_hash = self.slots[h].hash;
        self.index
            .find_entry(old_hash, |&hh| hh == h)
            .unwrap()
            .remove();

        let new_hash = self.make_hash(new_key);
        let slot = &mut self.slots[h];
        slot.key = new_key.to_string();
        slot.hash = new_hash;

        let slots = &self.slots;
        let _ = self
            .index
            .insert_unique(new_hash, h, |&hh| slots.get(hh).map(|s| s.hash).unwrap_or(0));
    }
}

impl<T, S> Default for SlotTable<T, S>
where
    S: BuildHasher + Clone + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: Duplicate keys are rejected, the table is unchanged, and
    /// the rejected item comes back to the caller.
    #[test]
    fn duplicate_insert_rejected() {
        let mut t: SlotTable<i32> = SlotTable::default();
        let h = t.insert("dup", 1).unwrap();
        match t.insert("dup", 2) {
            Err(item) => assert_eq!(item, 2),
            Ok(_) => panic!("duplicate insert must fail"),
        }
        assert_eq!(t.get(h), Some(("dup", &1)));
        assert_eq!(t.len(), 1);
    }

    /// Invariant: `find` resolves present keys and misses absent ones.
    #[test]
    fn find_present_and_absent() {
        let mut t: SlotTable<i32> = SlotTable::default();
        for (i, k) in ["a", "b", "c"].iter().enumerate() {
            t.insert(k, i as i32).unwrap();
        }
        for k in ["a", "b", "c"] {
            assert!(t.find(k).is_some());
        }
        for k in ["x", "y", "z"] {
            assert!(t.find(k).is_none());
        }
    }

    /// Invariant: Removing a slot invalidates its handle and does not alias
    /// a slot inserted afterward, even if the physical slot is reused
    /// (generational keys).
    #[test]
    fn stale_handle_does_not_alias_new_slot() {
        let mut t: SlotTable<i32> = SlotTable::default();
        let h1 = t.insert("old", 1).unwrap();
        assert_eq!(t.remove(h1), Some(1));
        let h2 = t.insert("new", 2).unwrap();
        assert_ne!(h1, h2, "handles must differ across generations");
        assert!(t.get(h1).is_none(), "stale handle must not resolve");
        assert!(t.find("new").is_some());
        assert!(t.find("old").is_none());
    }

    /// Invariant: `rekey` relocates the mapping without moving the slot:
    /// same handle, same item, old key gone.
    #[test]
    fn rekey_preserves_slot_and_item() {
        let mut t: SlotTable<i32> = SlotTable::default();
        t.insert("first", 10).unwrap();
        let h = t.insert("second", 20).unwrap();
        t.insert("third", 30).unwrap();

        t.rekey(h, "renamed");
        assert!(t.find("second").is_none());
        assert_eq!(t.find("renamed"), Some(h));
        assert_eq!(t.get(h), Some(("renamed", &20)));

        // Iteration position is the slot position, which rekey never moves.
        let order: Vec<&str> = t.iter().map(|(_h, k, _v)| k).collect();
        assert_eq!(order, ["first", "renamed", "third"]);
    }

    /// Invariant: Lookups work under heavy hash collisions; equality
    /// resolves to the correct slot. This also exercises collision probing.
    #[test]
    fn collision_handling_with_const_hasher() {
        use core::hash::{BuildHasher, Hasher};

        #[derive(Clone, Default)]
        struct ConstBuildHasher;
        struct ConstHasher;
        impl BuildHasher for ConstBuildHasher {
            type Hasher = ConstHasher;
            fn build_hasher(&self) -> Self::Hasher {
                ConstHasher
            }
        }
        impl Hasher for ConstHasher {
            fn write(&mut self, _bytes: &[u8]) {}
            fn finish(&self) -> u64 {
                0
            } // force all keys into the same hash bucket
        }

        let mut t: SlotTable<i32, ConstBuildHasher> =
            SlotTable::with_hasher(ConstBuildHasher);
        t.insert("a", 1).unwrap();
        t.insert("b", 2).unwrap();

        let ha = t.find("a").expect("find a");
        let hb = t.find("b").expect("find b");
        assert_ne!(ha, hb);
        assert_eq!(t.get(ha), Some(("a", &1)));
        assert_eq!(t.get(hb), Some(("b", &2)));

        // Removal must unlink the right index entry despite shared hash.
        t.remove(ha).unwrap();
        assert!(t.find("a").is_none());
        assert_eq!(t.get(hb), Some(("b", &2)));
    }

    /// Invariant: `len`/`is_empty` reflect live slots, unaffected by failed
    /// duplicate inserts, updated after removals.
    #[test]
    fn len_and_is_empty_behaviors() {
        let mut t: SlotTable<i32> = SlotTable::default();
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());

        let h1 = t.insert("a", 1).unwrap();
        assert!(t.insert("a", 2).is_err());
        assert_eq!(t.len(), 1);

        let h2 = t.insert("b", 2).unwrap();
        assert_eq!(t.len(), 2);

        t.remove(h1).unwrap();
        t.remove(h2).unwrap();
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
    }
}

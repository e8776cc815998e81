//! Dict: public facade over the structural slot table.
//!
//! Adds the ownership policy (per-entry drop hooks with a table-wide
//! default), comment metadata for the file store, the embedded cursor, and
//! file provenance consulted by `refresh`. All structural work is delegated
//! to `SlotTable`; this layer never touches the index or slots directly.

use crate::error::{Error, Result};
use crate::slot_table::{self, SlotTable};
use crate::store::FileSource;
use crate::value::DropFn;
use core::hash::BuildHasher;
use slotmap::DefaultKey;
use std::collections::hash_map::RandomState;

/// One stored entry: the value plus its optional drop hook. The hook is
/// slot-owned; the value is table-owned and dropped with the slot.
pub(crate) struct Item<V> {
    pub(crate) value: V,
    pub(crate) drop_fn: Option<DropFn<V>>,
}

impl<V: Clone> Clone for Item<V> {
    fn clone(&self) -> Self {
        Item {
            value: self.value.clone(),
            drop_fn: self.drop_fn.clone(),
        }
    }
}

/// Embedded iteration position. `first` snapshots the live slot handles;
/// `next` walks the snapshot, skipping handles that went stale. Generational
/// handles guarantee a stale position can never resolve to a reused slot.
#[derive(Default)]
struct Cursor {
    snapshot: Vec<DefaultKey>,
    pos: usize,
    current: Option<DefaultKey>,
}

/// A string-keyed dictionary with drop-hook ownership policy, an embedded
/// cursor, binary wire packing, and `name=value` file persistence.
///
/// Single-threaded by design: no internal locking, and callers must not
/// mutate the dict while iterating with the cursor.
pub struct Dict<V, S = RandomState> {
    table: SlotTable<Item<V>, S>,
    default_drop: Option<DropFn<V>>,
    comments: Vec<String>,
    cursor: Cursor,
    pub(crate) source: Option<FileSource>,
}

impl<V> Dict<V> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::default())
    }
}

impl<V> Default for Dict<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> Dict<V, S>
where
    S: BuildHasher + Clone + Default,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            table: SlotTable::with_hasher(hasher),
            default_drop: None,
            comments: Vec::new(),
            cursor: Cursor::default(),
            source: None,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.table.find(key).is_some()
    }

    /// Insert a value under a fresh key. Fails with [`Error::DuplicateKey`]
    /// if the key is already present, leaving the dict unchanged. The new
    /// entry starts with no drop hook.
    pub fn insert(&mut self, key: &str, value: V) -> Result<()> {
        self.table
            .insert(
                key,
                Item {
                    value,
                    drop_fn: None,
                },
            )
            .map(|_| ())
            .map_err(|_| Error::DuplicateKey(key.to_string()))
    }

    /// Insert or overwrite. When the key is present, the old value's
    /// effective drop hook runs first and the entry's hook policy persists
    /// across the overwrite; when absent, behaves like `insert`.
    pub fn update(&mut self, key: &str, value: V) {
        match self.table.find(key) {
            Some(h) => {
                let default_drop = self.default_drop.clone();
                if let Some(item) = self.table.get_mut(h) {
                    if let Some(hook) = item.drop_fn.clone().or(default_drop) {
                        hook(&mut item.value);
                    }
                    item.value = value;
                }
            }
            None => {
                let _ = self.table.insert(
                    key,
                    Item {
                        value,
                        drop_fn: None,
                    },
                );
            }
        }
    }

    /// Remove an entry, running its effective drop hook. Removing an absent
    /// key is a benign no-op.
    pub fn delete(&mut self, key: &str) {
        let Some(h) = self.table.find(key) else {
            return;
        };
        if let Some(mut item) = self.table.remove(h) {
            if let Some(hook) = item.drop_fn.clone().or_else(|| self.default_drop.clone()) {
                hook(&mut item.value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let h = self.table.find(key)?;
        self.table.get(h).map(|(_k, item)| &item.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let h = self.table.find(key)?;
        self.table.get_mut(h).map(|item| &mut item.value)
    }

    /// Move an entry from `old_key` to `new_key`, preserving its value, drop
    /// hook, and iteration position. An absent `old_key` is a benign no-op;
    /// renaming an entry onto its own key is too. Fails with
    /// [`Error::KeyCollision`] when `new_key` maps to a different entry,
    /// leaving both entries unchanged.
    pub fn rename(&mut self, old_key: &str, new_key: &str) -> Result<()> {
        let Some(h) = self.table.find(old_key) else {
            return Ok(());
        };
        match self.table.find(new_key) {
            Some(existing) if existing == h => Ok(()),
            Some(_) => Err(Error::KeyCollision(new_key.to_string())),
            None => {
                self.table.rekey(h, new_key);
                Ok(())
            }
        }
    }

    /// Attach, replace, or clear (`None`) the drop hook for one entry.
    /// Returns a borrow of the stored value, or `None` if the key is absent.
    pub fn set_drop_fn(&mut self, key: &str, hook: Option<DropFn<V>>) -> Option<&V> {
        let h = self.table.find(key)?;
        let item = self.table.get_mut(h)?;
        item.drop_fn = hook;
        Some(&item.value)
    }

    /// Set or clear the table-wide default drop hook. The policy is
    /// evaluated when an entry is discarded, not when it is inserted: while
    /// set, it applies to every entry without an explicit hook of its own,
    /// and clearing it (`None`) disarms those same entries, including ones
    /// inserted while it was set. Entries with an explicit hook are
    /// unaffected either way.
    pub fn set_default_drop(&mut self, hook: Option<DropFn<V>>) {
        self.default_drop = hook;
    }

    /// Freshly allocated list of all keys, in native iteration order.
    pub fn keys(&self) -> Vec<String> {
        self.table.iter().map(|(_h, k, _item)| k.to_string()).collect()
    }

    /// Append a pre-formatted comment line. Comments are write-only
    /// metadata: `save` emits them, `load` discards them, and the wire
    /// codec never sees them.
    pub fn comment(&mut self, line: impl Into<String>) {
        self.comments.push(line.into());
    }

    pub fn clear_comments(&mut self) {
        self.comments.clear();
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Reset the cursor and return the first value in native order, or
    /// `None` for an empty dict.
    pub fn first(&mut self) -> Option<&V> {
        self.cursor.snapshot = self.table.handles();
        self.cursor.pos = 0;
        self.advance()
    }

    /// Advance the cursor and return the next value, or `None` once every
    /// slot live at `first` time has been visited. Do not mutate the dict
    /// mid-iteration: removed entries are skipped, but entries inserted
    /// after `first` are not picked up.
    pub fn next(&mut self) -> Option<&V> {
        self.advance()
    }

    /// Key of the entry last returned by `first`/`next`, or `None` before
    /// the first call, after exhaustion, or if that entry was deleted.
    pub fn cursor_key(&self) -> Option<&str> {
        let h = self.cursor.current?;
        self.table.get(h).map(|(k, _item)| k)
    }

    fn advance(&mut self) -> Option<&V> {
        while self.cursor.pos < self.cursor.snapshot.len() {
            let h = self.cursor.snapshot[self.cursor.pos];
            self.cursor.pos += 1;
            // Stale handles (slots removed since the snapshot) are skipped.
            if self.table.get(h).is_some() {
                self.cursor.current = Some(h);
                return self.table.get(h).map(|(_k, item)| &item.value);
            }
        }
        self.cursor.current = None;
        None
    }

    /// Borrowing iterator over `(key, value)` pairs in native order. Unlike
    /// the embedded cursor, any number may run at once, and the borrow
    /// prevents mutation for the iterator's lifetime.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            it: self.table.iter(),
        }
    }
}

/// Deep copy: fresh key and value storage, shared drop hooks, copied
/// comments. The clone starts with a reset cursor and no file provenance.
impl<V, S> Clone for Dict<V, S>
where
    V: Clone,
    S: BuildHasher + Clone + Default,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            default_drop: self.default_drop.clone(),
            comments: self.comments.clone(),
            cursor: Cursor::default(),
            source: None,
        }
    }
}

impl<V, S> Drop for Dict<V, S> {
    fn drop(&mut self) {
        // Run each live entry's effective hook exactly once; the values and
        // keys are then released by the table's own drop.
        let default_drop = self.default_drop.take();
        for (_key, item) in self.table.iter_mut() {
            if let Some(hook) = item.drop_fn.clone().or_else(|| default_drop.clone()) {
                hook(&mut item.value);
            }
        }
    }
}

/// Iterator over `(key, value)` pairs of a [`Dict`].
pub struct Iter<'a, V> {
    it: slot_table::Iter<'a, Item<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_h, k, item)| (k, &item.value))
    }
}

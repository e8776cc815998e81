//! wiredict: a string-keyed dictionary for message-oriented software, with
//! a binary wire codec and `name=value` flat-file persistence.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: build `Dict` in safe, verifiable layers so each piece can be
//!   reasoned about independently.
//! - Layers:
//!   - SlotTable<T, S>: structural map from string keys to slots with
//!     stable generational handles; O(1) average access without
//!     re-hashing, in-place rekeying, and a repeatable iteration order.
//!   - Dict<V, S>: public API that adds drop-hook policy (per-slot hook
//!     plus a table-wide default), comment metadata, the embedded
//!     cursor, and file provenance for `refresh`.
//!   - wire / store: pure transformation layers over `Dict` state; they
//!     own no table state of their own.
//!
//! Constraints
//! - Single-threaded: no internal locking; callers serialize access.
//! - Keys are unique, case-sensitive strings; `len()` is always exact.
//! - Duplicate inserts fail and leave the table unchanged; failed pack,
//!   unpack, rename, and load calls never leave a partial mutation
//!   behind.
//! - The cursor walks a snapshot of generational handles, so a slot
//!   removed mid-iteration is skipped rather than resolved to a stale
//!   entry; mutation mid-iteration degrades the traversal, never the
//!   table.
//!
//! Wire format
//! - `pack` emits the ZeroMQ "dictionary" layout: a 4-byte big-endian
//!   entry count, then per entry a 1-byte key length, the key bytes, a
//!   4-byte big-endian value length, and the value bytes. Keys longer
//!   than 255 bytes fail the whole pack. Comments are never packed.
//! - `unpack` builds a brand-new dict or reports `CorruptWireData`;
//!   an empty input buffer is a valid empty dict.
//!
//! File format
//! - `save` writes `#`-prefixed comment lines followed by one
//!   `key=value` line per entry. `load` applies update semantics line
//!   by line and records the file's modification time; `refresh`
//!   reloads only when the file has changed *and* looks stable across
//!   two observations.
//!
//! Notes and non-goals
//! - No query language, no multi-key indices, no transactions.
//! - No callback-style `foreach`; use the cursor or `iter()`.
//! - `Clone` requires `V: Clone` and deep-copies keys and values; the
//!   clone starts with a reset cursor and no file provenance.
//! - Values are owned by the dict. Drop hooks exist for callers that
//!   track external resources per entry; a value without a hook is
//!   still released normally by Rust's own drop.

mod dict;
mod error;
mod slot_table;
mod store;
mod value;
mod wire;

// Public surface
pub use dict::{Dict, Iter};
pub use error::{Error, Result};
pub use value::{DropFn, TextValue, WireValue};

//! duomap: associative maps with two interchangeable storage engines
//! behind the same contract.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one map abstraction, two engines with different guarantees,
//!   each simple enough to be reasoned about (and tested) independently.
//! - Engines:
//!   - HashMap<K, V, S>: array of buckets, each an ordered sequence of
//!     entries; doubles when an insert pushes the load factor to 10/9,
//!     relocating entries by their cached hash. O(1) expected lookup,
//!     unspecified order.
//!   - TreeMap<K, V>: AVL-balanced binary search tree in a slotmap
//!     arena; parent back-links thread in-order traversal without a
//!     stack. O(log n) lookup, ascending key order.
//!
//! Cursors
//! - Each engine pairs with a small `Copy` Cursor: a position resolved
//!   against a borrow of the map on every access (`c.value(&map)`,
//!   `c.next(&map)`), never a stored reference. The borrow checker
//!   therefore rules out holding an entry borrow across mutation; a
//!   saved cursor itself can at worst go stale, not dangle.
//! - Hash cursors are (bucket, offset) positions: growth reshuffles
//!   them, which the contract permits because bucket order is
//!   unspecified. Tree cursors are generational arena keys: a removed
//!   node's cursor stops resolving instead of aliasing a reused slot.
//!
//! Errors
//! - One `Error` enum for both engines: `NotFound` (keyed removal of an
//!   absent key), `InvalidIterator` (remove-at-end, stale cursor),
//!   `OutOfRange` (stepping past begin/end). All failures leave the map
//!   unchanged.
//!
//! Equality (deliberately asymmetric)
//! - HashMap: order-independent; same size, every pair present with an
//!   equal value on the other side.
//! - TreeMap: positional over the in-order sequence plus equal sizes.
//!
//! Constraints
//! - Single-threaded, synchronous; callers wanting shared access bring
//!   their own synchronization.
//! - Keys are immutable once stored; values are mutable through
//!   `get_mut`, `iter_mut`, and cursor `value_mut`.
//! - No persistence, no multimap semantics, no range queries.

mod error;
pub mod hash_map;
mod hash_map_proptest;
pub mod tree_map;
mod tree_map_proptest;

// Public surface
pub use error::Error;
pub use hash_map::HashMap;
pub use tree_map::TreeMap;

//! Shared error kinds for both map engines.

use core::fmt;

/// Failure kinds surfaced by map operations. All are local, synchronous
/// failures; a failed operation leaves the map unchanged.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Keyed removal or lookup named a key that is not in the map.
    NotFound,
    /// `remove_at` was given the end cursor, or a cursor that no longer
    /// designates a live entry.
    InvalidIterator,
    /// A cursor was stepped past the end position or before the first
    /// entry. This is caller misuse, not a state the cursor can be in.
    OutOfRange,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound => f.write_str("key not found"),
            Error::InvalidIterator => f.write_str("cursor does not designate an entry"),
            Error::OutOfRange => f.write_str("cursor stepped out of range"),
        }
    }
}

impl std::error::Error for Error {}

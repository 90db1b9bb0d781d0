//! Chained-bucket hash map with doubling growth and bidirectional cursors.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

use crate::error::Error;

/// Bucket count used by `new()`; growth doubles from here.
const INITIAL_BUCKETS: usize = 8;

/// Position of an entry inside a [`HashMap`]: owning bucket plus offset
/// within that bucket's entry sequence.
///
/// A cursor is a plain position, not a borrow; it is resolved against the
/// map at every access, so the borrow checker rules out reads through a
/// cursor that race with mutation. Any mutating call (growth in
/// particular reshuffles every bucket) may silently repoint a saved
/// cursor at a different entry; callers should re-`find` after mutating.
///
/// The end position is canonical: last bucket, one past its final entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Cursor {
    bucket: usize,
    pos: usize,
}

impl Cursor {
    /// Borrow the key of the designated entry, or `None` at end.
    pub fn key<'a, K, V, S>(&self, map: &'a HashMap<K, V, S>) -> Option<&'a K>
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        map.cursor_entry(*self).map(|e| &e.key)
    }

    /// Borrow the value of the designated entry, or `None` at end.
    pub fn value<'a, K, V, S>(&self, map: &'a HashMap<K, V, S>) -> Option<&'a V>
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        map.cursor_entry(*self).map(|e| &e.value)
    }

    /// Mutably borrow the value of the designated entry, or `None` at end.
    pub fn value_mut<'a, K, V, S>(&self, map: &'a mut HashMap<K, V, S>) -> Option<&'a mut V>
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        map.cursor_entry_mut(*self).map(|e| &mut e.value)
    }

    /// Step to the next entry in bucket order; the position after the
    /// final entry is the end cursor. Stepping from end fails with
    /// [`Error::OutOfRange`].
    pub fn next<K, V, S>(self, map: &HashMap<K, V, S>) -> Result<Cursor, Error>
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        map.cursor_next(self)
    }

    /// Step to the previous entry in bucket order. Stepping back from the
    /// end cursor lands on the final entry; stepping back from the first
    /// entry (or anywhere on an empty map) fails with
    /// [`Error::OutOfRange`].
    pub fn prev<K, V, S>(self, map: &HashMap<K, V, S>) -> Result<Cursor, Error>
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        map.cursor_prev(self)
    }
}

#[derive(Clone, Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    // Cached so growth relocates entries without re-invoking `K: Hash`.
    hash: u64,
}

/// Hash map storing entries in an array of buckets, each an ordered
/// sequence of `(key, value)` pairs.
///
/// The bucket array starts at 8 slots and doubles whenever an insertion
/// pushes `len` to `bucket_count * 10 / 9` or beyond; every entry is then
/// moved (not copied) to the bucket selected by its cached hash modulo
/// the new bucket count. Bucket order, and therefore cursor order, is an
/// implementation artifact: it is only guaranteed that a full walk visits
/// each entry exactly once.
#[derive(Clone)]
pub struct HashMap<K, V, S = RandomState> {
    hasher: S,
    buckets: Vec<Vec<Entry<K, V>>>,
    len: usize,
}

impl<K, V> HashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for HashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            buckets: (0..INITIAL_BUCKETS).map(|_| Vec::new()).collect(),
            len: 0,
        }
    }

    /// Build a map from a literal list of pairs, pre-sizing the bucket
    /// array to `max(8, pairs.len())`.
    ///
    /// Repeated keys are NOT deduplicated: each occurrence lands in the
    /// owning bucket as its own entry and counts toward `len`, and lookup
    /// finds whichever occurrence sits first in the bucket. This diverges
    /// from [`get_or_insert_default`](Self::get_or_insert_default), which
    /// always updates an existing key in place.
    pub fn from_pairs(pairs: Vec<(K, V)>) -> Self
    where
        S: Default,
    {
        let hasher = S::default();
        let bucket_count = pairs.len().max(INITIAL_BUCKETS);
        let mut buckets: Vec<Vec<Entry<K, V>>> = (0..bucket_count).map(|_| Vec::new()).collect();
        let mut len = 0;
        for (key, value) in pairs {
            let hash = hasher.hash_one(&key);
            buckets[(hash as usize) % bucket_count].push(Entry { key, value, hash });
            len += 1;
        }
        Self {
            hasher,
            buckets,
            len,
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn bucket_of(&self, hash: u64) -> usize {
        (hash as usize) % self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let b = self.bucket_of(self.make_hash(q));
        self.buckets[b]
            .iter()
            .find(|e| e.key.borrow() == q)
            .map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let b = self.bucket_of(self.make_hash(q));
        self.buckets[b]
            .iter_mut()
            .find(|e| e.key.borrow() == q)
            .map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).is_some()
    }

    /// Return the value for `key`, inserting `(key, V::default())` first
    /// when the key is absent.
    ///
    /// An inserting call may grow the bucket array; the returned borrow
    /// points into the post-growth layout, and any cursors or positions
    /// saved before the call must be considered repositioned.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let hash = self.make_hash(&key);
        let b = self.bucket_of(hash);
        if let Some(i) = self.buckets[b].iter().position(|e| e.key == key) {
            return &mut self.buckets[b][i].value;
        }

        // Grow before attaching so the fresh entry's borrow survives the
        // relocation. `len + 1 >= buckets * 10 / 9` (integer division) is
        // the load-factor trigger.
        if self.len + 1 >= self.buckets.len() * 10 / 9 {
            self.grow();
        }
        let b = self.bucket_of(hash);
        self.buckets[b].push(Entry {
            key,
            value: V::default(),
            hash,
        });
        self.len += 1;
        let last = self.buckets[b].len() - 1;
        &mut self.buckets[b][last].value
    }

    /// Remove the first entry matching `q` from its owning bucket and
    /// return the owned pair. Fails with [`Error::NotFound`] when absent,
    /// leaving the map unchanged.
    pub fn remove<Q>(&mut self, q: &Q) -> Result<(K, V), Error>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let b = self.bucket_of(self.make_hash(q));
        let i = self.buckets[b]
            .iter()
            .position(|e| e.key.borrow() == q)
            .ok_or(Error::NotFound)?;
        let entry = self.buckets[b].remove(i);
        self.len -= 1;
        Ok((entry.key, entry.value))
    }

    /// Remove the entry the cursor designates. Fails with
    /// [`Error::InvalidIterator`] for the end cursor or any position that
    /// does not hold a live entry.
    pub fn remove_at(&mut self, cursor: Cursor) -> Result<(K, V), Error> {
        if self.is_end(cursor) {
            return Err(Error::InvalidIterator);
        }
        let bucket = self
            .buckets
            .get_mut(cursor.bucket)
            .ok_or(Error::InvalidIterator)?;
        if cursor.pos >= bucket.len() {
            return Err(Error::InvalidIterator);
        }
        let entry = bucket.remove(cursor.pos);
        self.len -= 1;
        Ok((entry.key, entry.value))
    }

    /// Cursor to the entry for `q`, or the end cursor when absent.
    pub fn find<Q>(&self, q: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let b = self.bucket_of(self.make_hash(q));
        match self.buckets[b].iter().position(|e| e.key.borrow() == q) {
            Some(pos) => Cursor { bucket: b, pos },
            None => self.end(),
        }
    }

    /// Cursor to the first entry in bucket order; equals `end()` on an
    /// empty map.
    pub fn begin(&self) -> Cursor {
        if self.len == 0 {
            return self.end();
        }
        let bucket = self
            .buckets
            .iter()
            .position(|b| !b.is_empty())
            .unwrap_or(self.buckets.len() - 1);
        Cursor { bucket, pos: 0 }
    }

    /// The canonical one-past-the-last position.
    pub fn end(&self) -> Cursor {
        Cursor {
            bucket: self.buckets.len() - 1,
            pos: self.buckets[self.buckets.len() - 1].len(),
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut buckets = self.buckets.iter();
        let current = buckets.next().map(|b| b.iter()).unwrap_or_default();
        Iter { buckets, current }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let mut buckets = self.buckets.iter_mut();
        let current = buckets.next().map(|b| b.iter_mut()).unwrap_or_default();
        IterMut { buckets, current }
    }

    fn is_end(&self, c: Cursor) -> bool {
        c == self.end()
    }

    fn cursor_entry(&self, c: Cursor) -> Option<&Entry<K, V>> {
        self.buckets.get(c.bucket).and_then(|b| b.get(c.pos))
    }

    fn cursor_entry_mut(&mut self, c: Cursor) -> Option<&mut Entry<K, V>> {
        self.buckets.get_mut(c.bucket).and_then(|b| b.get_mut(c.pos))
    }

    fn cursor_next(&self, c: Cursor) -> Result<Cursor, Error> {
        if self.is_end(c) {
            return Err(Error::OutOfRange);
        }
        let bucket = self.buckets.get(c.bucket).ok_or(Error::InvalidIterator)?;
        if c.pos >= bucket.len() {
            return Err(Error::InvalidIterator);
        }
        if c.pos + 1 < bucket.len() {
            return Ok(Cursor {
                bucket: c.bucket,
                pos: c.pos + 1,
            });
        }
        for b in c.bucket + 1..self.buckets.len() {
            if !self.buckets[b].is_empty() {
                return Ok(Cursor { bucket: b, pos: 0 });
            }
        }
        Ok(self.end())
    }

    fn cursor_prev(&self, c: Cursor) -> Result<Cursor, Error> {
        // The end cursor falls through naturally: its pos is one past the
        // last bucket's final entry, so either we step onto that entry or
        // (last bucket empty, pos 0) we scan backward.
        if c.bucket >= self.buckets.len() {
            return Err(Error::InvalidIterator);
        }
        if c.pos > self.buckets[c.bucket].len() {
            return Err(Error::InvalidIterator);
        }
        if c.pos > 0 {
            return Ok(Cursor {
                bucket: c.bucket,
                pos: c.pos - 1,
            });
        }
        for b in (0..c.bucket).rev() {
            if !self.buckets[b].is_empty() {
                return Ok(Cursor {
                    bucket: b,
                    pos: self.buckets[b].len() - 1,
                });
            }
        }
        Err(Error::OutOfRange)
    }

    /// Double the bucket array and relocate every entry to the bucket
    /// selected by its cached hash modulo the new count.
    fn grow(&mut self) {
        let new_count = self.buckets.len() * 2;
        let mut new_buckets: Vec<Vec<Entry<K, V>>> = (0..new_count).map(|_| Vec::new()).collect();
        for bucket in self.buckets.drain(..) {
            for entry in bucket {
                new_buckets[(entry.hash as usize) % new_count].push(entry);
            }
        }
        self.buckets = new_buckets;
    }
}

/// Entries of one map versus another, order-independently: equal iff the
/// sizes match and every pair of `other` is present in `self` with an
/// equal value. Contrast with `TreeMap`, whose equality is positional.
impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        other
            .iter()
            .all(|(k, v)| self.get(k).map_or(false, |mine| mine == v))
    }
}

/// Entries rendered in bucket order with the standard map formatting.
impl<K, V, S> fmt::Debug for HashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.buckets.iter().flatten().map(|e| (&e.key, &e.value)))
            .finish()
    }
}

/// Iterator over `(&K, &V)` in bucket order.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Vec<Entry<K, V>>>,
    current: core::slice::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.current.next() {
                return Some((&e.key, &e.value));
            }
            self.current = self.buckets.next()?.iter();
        }
    }
}

/// Iterator over `(&K, &mut V)` in bucket order.
pub struct IterMut<'a, K, V> {
    buckets: core::slice::IterMut<'a, Vec<Entry<K, V>>>,
    current: core::slice::IterMut<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.current.next() {
                return Some((&e.key, &mut e.value));
            }
            self.current = self.buckets.next()?.iter_mut();
        }
    }
}

impl<K, V, S, const N: usize> From<[(K, V); N]> for HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_pairs(pairs.into())
    }
}

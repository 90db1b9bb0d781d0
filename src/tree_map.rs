//! AVL-balanced tree map over a slotmap node arena.
//!
//! Nodes live in a `SlotMap`; child links and the navigational parent
//! back-link are `Option<DefaultKey>`. Ownership stays root-to-leaf: a
//! node leaves the arena only through the tree's own detach path, never
//! through its parent link, so rotations are pure link reassignment.
//! Generational keys double as stale-cursor detection: a cursor whose
//! node was removed stops resolving instead of dangling.

use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::mem;
use slotmap::{DefaultKey, SlotMap};

use crate::error::Error;

#[derive(Clone, Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Option<DefaultKey>,
    right: Option<DefaultKey>,
    parent: Option<DefaultKey>,
    height: usize,
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V, parent: Option<DefaultKey>) -> Self {
        Node {
            key,
            value,
            left: None,
            right: None,
            parent,
            height: 1,
        }
    }
}

/// Position of an entry inside a [`TreeMap`]; `Cursor::default()` and
/// [`TreeMap::end`] are the one-past-the-maximum sentinel.
///
/// A cursor is generation-checked: once its node is removed it no longer
/// resolves, and stepping it fails with [`Error::InvalidIterator`]
/// rather than landing on whatever reuses the slot.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Cursor(Option<DefaultKey>);

impl Cursor {
    /// Borrow the key of the designated entry, or `None` at end / stale.
    pub fn key<'a, K: Ord, V>(&self, map: &'a TreeMap<K, V>) -> Option<&'a K> {
        self.0.and_then(|n| map.nodes.get(n)).map(|node| &node.key)
    }

    /// Borrow the value of the designated entry, or `None` at end / stale.
    pub fn value<'a, K: Ord, V>(&self, map: &'a TreeMap<K, V>) -> Option<&'a V> {
        self.0.and_then(|n| map.nodes.get(n)).map(|node| &node.value)
    }

    /// Mutably borrow the value of the designated entry.
    pub fn value_mut<'a, K: Ord, V>(&self, map: &'a mut TreeMap<K, V>) -> Option<&'a mut V> {
        self.0
            .and_then(|n| map.nodes.get_mut(n))
            .map(|node| &mut node.value)
    }

    /// Step to the in-order successor; past the maximum the cursor
    /// becomes end. Stepping from end fails with [`Error::OutOfRange`].
    pub fn next<K: Ord, V>(self, map: &TreeMap<K, V>) -> Result<Cursor, Error> {
        match self.0 {
            None => Err(Error::OutOfRange),
            Some(n) => {
                if !map.nodes.contains_key(n) {
                    return Err(Error::InvalidIterator);
                }
                Ok(Cursor(map.successor(n)))
            }
        }
    }

    /// Step to the in-order predecessor. From end this lands on the
    /// maximum entry (or fails with [`Error::OutOfRange`] on an empty
    /// map); from the minimum entry it fails with `OutOfRange`.
    pub fn prev<K: Ord, V>(self, map: &TreeMap<K, V>) -> Result<Cursor, Error> {
        match self.0 {
            None => match map.root {
                Some(root) => Ok(Cursor(Some(map.max_in(root)))),
                None => Err(Error::OutOfRange),
            },
            Some(n) => {
                if !map.nodes.contains_key(n) {
                    return Err(Error::InvalidIterator);
                }
                map.predecessor(n)
                    .map(|p| Cursor(Some(p)))
                    .ok_or(Error::OutOfRange)
            }
        }
    }
}

/// Ordered map keeping keys sorted in an AVL-balanced binary search
/// tree.
///
/// After every public operation the tree satisfies the BST order
/// invariant (strictly increasing in-order keys), the AVL balance
/// invariant (sibling subtree heights differ by at most one) and the
/// height cache invariant (`height = 1 + max(children)`, absent child
/// counting as zero).
#[derive(Clone)]
pub struct TreeMap<K, V> {
    nodes: SlotMap<DefaultKey, Node<K, V>>,
    root: Option<DefaultKey>,
}

impl<K: Ord, V> Default for TreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> TreeMap<K, V> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
        }
    }

    /// Build a map from a literal list of pairs, inserted in list order
    /// with repeated keys updating the earlier entry in place.
    pub fn from_pairs(pairs: Vec<(K, V)>) -> Self {
        let mut map = Self::new();
        for (key, value) in pairs {
            map.insert_pair(key, value);
        }
        map
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find_node(q).map(|n| &self.nodes[n].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let n = self.find_node(q)?;
        Some(&mut self.nodes[n].value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find_node(q).is_some()
    }

    /// Return the value for `key`, inserting `(key, V::default())` as a
    /// new leaf at the BST-correct position first when the key is
    /// absent. An inserting call rebalances from the new leaf up to the
    /// root.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let n = self.insert_with(key, V::default);
        &mut self.nodes[n].value
    }

    /// Remove the entry for `q` and return the owned pair. Fails with
    /// [`Error::NotFound`] when absent, leaving the map unchanged.
    pub fn remove<Q>(&mut self, q: &Q) -> Result<(K, V), Error>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let n = self.find_node(q).ok_or(Error::NotFound)?;
        Ok(self.remove_node(n))
    }

    /// Remove the entry the cursor designates. Fails with
    /// [`Error::InvalidIterator`] for the end cursor and for stale
    /// cursors whose node is already gone.
    pub fn remove_at(&mut self, cursor: Cursor) -> Result<(K, V), Error> {
        let n = cursor.0.ok_or(Error::InvalidIterator)?;
        if !self.nodes.contains_key(n) {
            return Err(Error::InvalidIterator);
        }
        Ok(self.remove_node(n))
    }

    /// Cursor to the entry for `q`, or the end cursor when absent.
    pub fn find<Q>(&self, q: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor(self.find_node(q))
    }

    /// Cursor to the minimum entry; equals `end()` on an empty map.
    pub fn begin(&self) -> Cursor {
        Cursor(self.root.map(|r| self.min_in(r)))
    }

    /// The one-past-the-maximum sentinel.
    pub fn end(&self) -> Cursor {
        Cursor(None)
    }

    /// Iterate `(&K, &V)` in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            map: self,
            next: self.root.map(|r| self.min_in(r)),
        }
    }

    /// Iterate `(&K, &mut V)` in ascending key order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        // Successor threading needs shared access to the links, so take a
        // sorted snapshot of the node borrows instead.
        let mut items: Vec<&mut Node<K, V>> = self.nodes.iter_mut().map(|(_, n)| n).collect();
        items.sort_by(|a, b| a.key.cmp(&b.key));
        IterMut {
            inner: items.into_iter(),
        }
    }

    fn find_node<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut cur = self.root;
        while let Some(n) = cur {
            let node = &self.nodes[n];
            match q.cmp(node.key.borrow()) {
                Ordering::Less => cur = node.left,
                Ordering::Greater => cur = node.right,
                Ordering::Equal => return Some(n),
            }
        }
        None
    }

    /// Binary-search insert; on a fresh key the default is constructed
    /// and the new leaf's ancestor chain rebalanced. On an existing key
    /// the default is never run.
    fn insert_with<F: FnOnce() -> V>(&mut self, key: K, default: F) -> DefaultKey {
        let mut cur = match self.root {
            Some(root) => root,
            None => {
                let n = self.nodes.insert(Node::leaf(key, default(), None));
                self.root = Some(n);
                return n;
            }
        };
        loop {
            match key.cmp(&self.nodes[cur].key) {
                Ordering::Equal => return cur,
                Ordering::Less => match self.nodes[cur].left {
                    Some(l) => cur = l,
                    None => {
                        let n = self.nodes.insert(Node::leaf(key, default(), Some(cur)));
                        self.nodes[cur].left = Some(n);
                        self.rebalance_from(Some(cur));
                        return n;
                    }
                },
                Ordering::Greater => match self.nodes[cur].right {
                    Some(r) => cur = r,
                    None => {
                        let n = self.nodes.insert(Node::leaf(key, default(), Some(cur)));
                        self.nodes[cur].right = Some(n);
                        self.rebalance_from(Some(cur));
                        return n;
                    }
                },
            }
        }
    }

    fn insert_pair(&mut self, key: K, value: V) {
        let mut value = Some(value);
        let n = self.insert_with(key, || value.take().expect("default runs at most once"));
        if let Some(value) = value.take() {
            // Key already present: update in place.
            self.nodes[n].value = value;
        }
    }

    fn remove_node(&mut self, n: DefaultKey) -> (K, V) {
        let detached = self.detach(n);
        let parent = self.nodes[detached].parent;
        let node = self
            .nodes
            .remove(detached)
            .expect("detached node is still in the arena");
        self.rebalance_from(parent);
        (node.key, node.value)
    }

    /// Unlink one physical node and return its arena key, by child count
    /// of `n`:
    /// two children: detach the in-order successor (which has no left
    /// child) and swap its payload into `n`, so `n` survives with the
    /// successor's pair and the successor's slot dies. One child: splice
    /// the child into the parent's place. Leaf: clear the parent link.
    /// A detached root hands its place to its single child, if any.
    fn detach(&mut self, n: DefaultKey) -> DefaultKey {
        let (left, right) = {
            let node = &self.nodes[n];
            (node.left, node.right)
        };
        match (left, right) {
            (Some(_), Some(right)) => {
                let succ = self.min_in(right);
                let detached = self.detach(succ);
                let [target, succ] = self
                    .nodes
                    .get_disjoint_mut([n, detached])
                    .expect("target and successor are distinct live nodes");
                mem::swap(&mut target.key, &mut succ.key);
                mem::swap(&mut target.value, &mut succ.value);
                detached
            }
            (Some(child), None) | (None, Some(child)) => {
                let parent = self.nodes[n].parent;
                self.nodes[child].parent = parent;
                self.relink(parent, n, Some(child));
                n
            }
            (None, None) => {
                let parent = self.nodes[n].parent;
                self.relink(parent, n, None);
                n
            }
        }
    }

    /// Point `parent`'s link that held `old` at `new`; with no parent,
    /// `new` becomes the root.
    fn relink(&mut self, parent: Option<DefaultKey>, old: DefaultKey, new: Option<DefaultKey>) {
        match parent {
            Some(p) => {
                if self.nodes[p].left == Some(old) {
                    self.nodes[p].left = new;
                } else {
                    self.nodes[p].right = new;
                }
            }
            None => self.root = new,
        }
    }

    fn height(&self, n: Option<DefaultKey>) -> usize {
        n.map_or(0, |n| self.nodes[n].height)
    }

    fn update_height(&mut self, n: DefaultKey) {
        let h = 1 + self.height(self.nodes[n].left).max(self.height(self.nodes[n].right));
        self.nodes[n].height = h;
    }

    /// Walk the ancestor chain from `start` to the root, recomputing
    /// heights and rotating wherever one subtree outgrows its sibling by
    /// two. A left-heavy node whose left child leans right takes the
    /// double (left-right) rotation; mirrored for right-heavy.
    fn rebalance_from(&mut self, start: Option<DefaultKey>) {
        let mut cur = start;
        while let Some(n) = cur {
            self.update_height(n);
            let (left, right) = {
                let node = &self.nodes[n];
                (node.left, node.right)
            };
            if self.height(left) >= 2 + self.height(right) {
                let l = left.expect("left-heavy node has a left child");
                let (ll, lr) = {
                    let lnode = &self.nodes[l];
                    (lnode.left, lnode.right)
                };
                if self.height(lr) > self.height(ll) {
                    self.rotate_left(l);
                }
                self.rotate_right(n);
            } else if self.height(right) >= 2 + self.height(left) {
                let r = right.expect("right-heavy node has a right child");
                let (rl, rr) = {
                    let rnode = &self.nodes[r];
                    (rnode.left, rnode.right)
                };
                if self.height(rl) > self.height(rr) {
                    self.rotate_right(r);
                }
                self.rotate_left(n);
            }
            // After a rotation the parent link already points at the new
            // subtree root, so the walk passes through it on the way up.
            cur = self.nodes[n].parent;
        }
    }

    fn rotate_right(&mut self, n: DefaultKey) {
        let pivot = self.nodes[n].left.expect("right rotation needs a left child");
        let moved = self.nodes[pivot].right;
        let parent = self.nodes[n].parent;

        self.nodes[n].left = moved;
        if let Some(m) = moved {
            self.nodes[m].parent = Some(n);
        }
        self.nodes[pivot].right = Some(n);
        self.nodes[pivot].parent = parent;
        self.relink(parent, n, Some(pivot));
        self.nodes[n].parent = Some(pivot);

        self.update_height(n);
        self.update_height(pivot);
    }

    fn rotate_left(&mut self, n: DefaultKey) {
        let pivot = self.nodes[n].right.expect("left rotation needs a right child");
        let moved = self.nodes[pivot].left;
        let parent = self.nodes[n].parent;

        self.nodes[n].right = moved;
        if let Some(m) = moved {
            self.nodes[m].parent = Some(n);
        }
        self.nodes[pivot].left = Some(n);
        self.nodes[pivot].parent = parent;
        self.relink(parent, n, Some(pivot));
        self.nodes[n].parent = Some(pivot);

        self.update_height(n);
        self.update_height(pivot);
    }

    fn min_in(&self, mut n: DefaultKey) -> DefaultKey {
        while let Some(l) = self.nodes[n].left {
            n = l;
        }
        n
    }

    fn max_in(&self, mut n: DefaultKey) -> DefaultKey {
        while let Some(r) = self.nodes[n].right {
            n = r;
        }
        n
    }

    /// In-order successor: the right subtree's minimum, else the first
    /// ancestor reached by crossing a left link.
    fn successor(&self, n: DefaultKey) -> Option<DefaultKey> {
        if let Some(r) = self.nodes[n].right {
            return Some(self.min_in(r));
        }
        let mut cur = n;
        while let Some(p) = self.nodes[cur].parent {
            if self.nodes[p].right == Some(cur) {
                cur = p;
            } else {
                return Some(p);
            }
        }
        None
    }

    fn predecessor(&self, n: DefaultKey) -> Option<DefaultKey> {
        if let Some(l) = self.nodes[n].left {
            return Some(self.max_in(l));
        }
        let mut cur = n;
        while let Some(p) = self.nodes[cur].parent {
            if self.nodes[p].left == Some(cur) {
                cur = p;
            } else {
                return Some(p);
            }
        }
        None
    }
}

/// Positional equality: the in-order `(key, value)` sequences must match
/// pairwise and the sizes must agree. Insertion order is irrelevant
/// because both sides are compared in sorted order, but this is a
/// deliberately different contract from `HashMap`'s order-independent
/// membership equality.
impl<K, V> PartialEq for TreeMap<K, V>
where
    K: Ord,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
    }
}

/// Entries rendered in ascending key order with the standard map
/// formatting.
impl<K, V> fmt::Debug for TreeMap<K, V>
where
    K: Ord + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(&K, &V)` in ascending key order, threaded through the
/// parent links with no auxiliary stack.
pub struct Iter<'a, K, V> {
    map: &'a TreeMap<K, V>,
    next: Option<DefaultKey>,
}

impl<'a, K, V: 'a> Iterator for Iter<'a, K, V>
where
    K: Ord,
{
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        let n = self.next?;
        self.next = self.map.successor(n);
        let node = &self.map.nodes[n];
        Some((&node.key, &node.value))
    }
}

/// Iterator over `(&K, &mut V)` in ascending key order.
pub struct IterMut<'a, K, V> {
    inner: std::vec::IntoIter<&'a mut Node<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|n| (&n.key, &mut n.value))
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for TreeMap<K, V>
where
    K: Ord,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_pairs(pairs.into())
    }
}

#[cfg(test)]
impl<K: Ord, V> TreeMap<K, V> {
    /// Walk the whole tree asserting the structural invariants: parent
    /// back-links mirror child links, every height cache is exact, every
    /// node is AVL-balanced, the arena holds no orphans, and the
    /// in-order key sequence is strictly increasing.
    pub(crate) fn check_invariants(&self) {
        if let Some(root) = self.root {
            assert!(self.nodes[root].parent.is_none(), "root has a parent");
        }
        let mut visited = 0;
        self.check_subtree(self.root, None, &mut visited);
        assert_eq!(visited, self.nodes.len(), "arena holds orphaned nodes");

        let keys: Vec<&K> = self.iter().map(|(k, _)| k).collect();
        assert!(
            keys.windows(2).all(|w| w[0] < w[1]),
            "in-order keys not strictly increasing"
        );
    }

    fn check_subtree(
        &self,
        n: Option<DefaultKey>,
        parent: Option<DefaultKey>,
        visited: &mut usize,
    ) -> usize {
        let Some(n) = n else { return 0 };
        *visited += 1;
        let node = &self.nodes[n];
        assert_eq!(node.parent, parent, "parent back-link out of sync");
        let hl = self.check_subtree(node.left, Some(n), visited);
        let hr = self.check_subtree(node.right, Some(n), visited);
        assert!(hl.abs_diff(hr) <= 1, "AVL balance violated");
        assert_eq!(node.height, 1 + hl.max(hr), "height cache out of date");
        node.height
    }
}

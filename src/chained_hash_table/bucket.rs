use std::fmt;
use std::iter::FusedIterator;

use crate::Equivalent;

/// An owned link to the next [`Node`] in a chain.
pub(crate) type Link<K, V> = Option<Box<Node<K, V>>>;

/// [`Node`] holds a single key-value pair and exclusively owns the rest of the chain.
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) val: V,
    next: Link<K, V>,
}

impl<K, V> Node<K, V> {
    #[inline]
    pub(crate) fn new(key: K, val: V) -> Box<Self> {
        Box::new(Self {
            key,
            val,
            next: None,
        })
    }
}

/// [`Bucket`] is the head of a singly linked chain of entries.
///
/// New entries are pushed at the front, therefore a chain lists entries in reverse insertion
/// order.
pub(crate) struct Bucket<K, V> {
    head: Link<K, V>,
    len: usize,
}

impl<K, V> Bucket<K, V> {
    /// Returns the number of entries in the chain.
    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Finds the entry associated with the key.
    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: Equivalent<K> + ?Sized,
    {
        self.iter().find(|(k, _)| key.equivalent(k))
    }

    /// Finds the entry associated with the key for modification.
    #[inline]
    pub(crate) fn search_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: Equivalent<K> + ?Sized,
    {
        let mut link = self.head.as_deref_mut();
        while let Some(node) = link {
            if key.equivalent(&node.key) {
                return Some(&mut node.val);
            }
            link = node.next.as_deref_mut();
        }
        None
    }

    /// Pushes a node at the front of the chain.
    #[inline]
    pub(crate) fn push_front(&mut self, mut node: Box<Node<K, V>>) {
        node.next = self.head.take();
        self.head = Some(node);
        self.len += 1;
    }

    /// Detaches the first node of the chain.
    #[inline]
    pub(crate) fn pop_front(&mut self) -> Option<Box<Node<K, V>>> {
        let mut node = self.head.take()?;
        self.head = node.next.take();
        self.len -= 1;
        Some(node)
    }

    /// Unlinks the node associated with the key and returns its key-value pair.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: Equivalent<K> + ?Sized,
    {
        let mut link = &mut self.head;
        while link.as_ref().is_some_and(|node| !key.equivalent(&node.key)) {
            if let Some(node) = link {
                link = &mut node.next;
            }
        }
        let mut node = link.take()?;
        *link = node.next.take();
        self.len -= 1;
        Some((node.key, node.val))
    }

    /// Removes every entry that does not satisfy the predicate.
    ///
    /// Returns the number of removed entries.
    pub(crate) fn retain<F: FnMut(&K, &mut V) -> bool>(&mut self, pred: &mut F) -> usize {
        let mut kept = Bucket::default();
        let mut removed = 0;
        while let Some(mut node) = self.pop_front() {
            if pred(&node.key, &mut node.val) {
                kept.push_front(node);
            } else {
                removed += 1;
            }
        }
        // Restore the chain order.
        while let Some(node) = kept.pop_front() {
            self.push_front(node);
        }
        removed
    }

    /// Returns an iterator over the entries from the head of the chain.
    #[inline]
    pub(crate) fn iter(&self) -> Chain<'_, K, V> {
        Chain {
            link: self.head.as_deref(),
            remaining: self.len(),
        }
    }
}

impl<K, V> Default for Bucket<K, V> {
    #[inline]
    fn default() -> Self {
        Self { head: None, len: 0 }
    }
}

impl<K: Clone, V: Clone> Clone for Bucket<K, V> {
    /// Clones every node while preserving the order of the chain.
    #[inline]
    fn clone(&self) -> Self {
        let entries: Vec<(&K, &V)> = self.iter().collect();
        let mut bucket = Bucket::default();
        for (k, v) in entries.into_iter().rev() {
            bucket.push_front(Node::new(k.clone(), v.clone()));
        }
        bucket
    }
}

impl<K, V> Drop for Bucket<K, V> {
    #[inline]
    fn drop(&mut self) {
        // Unlink nodes one by one; dropping the head recursively could exhaust the stack.
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Bucket<K, V> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// [`Chain`] iterates over the entries of a single [`Bucket`] from head to tail.
pub struct Chain<'b, K, V> {
    link: Option<&'b Node<K, V>>,
    remaining: usize,
}

impl<'b, K, V> Iterator for Chain<'b, K, V> {
    type Item = (&'b K, &'b V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.link?;
        self.link = node.next.as_deref();
        self.remaining -= 1;
        Some((&node.key, &node.val))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Chain<'_, K, V> {}

impl<K, V> FusedIterator for Chain<'_, K, V> {}

impl<K, V> Clone for Chain<'_, K, V> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            link: self.link,
            remaining: self.remaining,
        }
    }
}

impl<K, V> fmt::Debug for Chain<'_, K, V> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

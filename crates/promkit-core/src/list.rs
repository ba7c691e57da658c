//! Singly-linked ordered container.
//!
//! Nodes live in a slot arena and link to each other by index, so `append`
//! stays O(1) without raw tail pointers. Freed slots are recycled. Equality
//! used by [`OrderedList::remove`] is pluggable: hash-bucket chains compare
//! entries by key, the map's key index compares shared keys by identity.

/// Equality used by `remove`.
pub type Comparator<T> = fn(&T, &T) -> bool;

#[derive(Debug)]
struct Node<T> {
    item: T,
    next: Option<usize>,
}

#[derive(Debug)]
pub struct OrderedList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    compare: Comparator<T>,
}

impl<T: PartialEq> OrderedList<T> {
    /// List comparing items with `PartialEq`.
    pub fn new() -> Self {
        Self::with_comparator(|a, b| a == b)
    }
}

impl<T: PartialEq> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedList<T> {
    pub fn with_comparator(compare: Comparator<T>) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            compare,
        }
    }

    pub fn set_comparator(&mut self, compare: Comparator<T>) {
        self.compare = compare;
    }

    fn alloc(&mut self, node: Node<T>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn node(&self, idx: usize) -> Option<&Node<T>> {
        self.slots.get(idx).and_then(|s| s.as_ref())
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<T>> {
        self.slots.get_mut(idx).and_then(|s| s.as_mut())
    }

    fn release(&mut self, idx: usize) -> Option<T> {
        let node = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        self.len -= 1;
        Some(node.item)
    }

    /// Prepend.
    pub fn push(&mut self, item: T) {
        let idx = self.alloc(Node {
            item,
            next: self.head,
        });
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
        self.len += 1;
    }

    pub fn append(&mut self, item: T) {
        let idx = self.alloc(Node { item, next: None });
        let tail = self.tail;
        match tail.and_then(|t| self.node_mut(t)) {
            Some(node) => node.next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
    }

    /// Remove and return the head.
    pub fn pop(&mut self) -> Option<T> {
        let idx = self.head?;
        self.head = self.node(idx).and_then(|n| n.next);
        if self.head.is_none() {
            self.tail = None;
        }
        self.release(idx)
    }

    /// Remove the first item equal to `item` under the list's comparator.
    pub fn remove(&mut self, item: &T) -> Option<T> {
        let compare = self.compare;
        self.remove_where(|candidate| compare(candidate, item))
    }

    /// Remove the first item matching `pred`.
    pub fn remove_where<F>(&mut self, mut pred: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut prev: Option<usize> = None;
        let mut cur = self.head;
        while let Some(idx) = cur {
            let node = self.node(idx)?;
            let next = node.next;
            let hit = pred(&node.item);
            if hit {
                match prev.and_then(|p| self.node_mut(p)) {
                    Some(p) => p.next = next,
                    None => self.head = next,
                }
                if self.tail == Some(idx) {
                    self.tail = prev;
                }
                return self.release(idx);
            }
            prev = Some(idx);
            cur = next;
        }
        None
    }

    pub fn first(&self) -> Option<&T> {
        self.head.and_then(|i| self.node(i)).map(|n| &n.item)
    }

    pub fn last(&self) -> Option<&T> {
        self.tail.and_then(|i| self.node(i)).map(|n| &n.item)
    }

    pub fn find<F>(&self, mut pred: F) -> Option<&T>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().find(|item| pred(item))
    }

    pub fn find_mut<F>(&mut self, mut pred: F) -> Option<&mut T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut cur = self.head;
        let mut hit = None;
        while let Some(idx) = cur {
            let node = self.node(idx)?;
            if pred(&node.item) {
                hit = Some(idx);
                break;
            }
            cur = node.next;
        }
        self.node_mut(hit?).map(|n| &mut n.item)
    }

    pub fn size(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cur: self.head,
        }
    }
}

pub struct Iter<'a, T> {
    list: &'a OrderedList<T>,
    cur: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cur?)?;
        self.cur = node.next;
        Some(&node.item)
    }
}

impl<'a, T> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_append_pop_keep_order() {
        let mut l = OrderedList::new();
        l.append(2);
        l.append(3);
        l.push(1);
        assert_eq!(l.size(), 3);
        assert_eq!(l.first(), Some(&1));
        assert_eq!(l.last(), Some(&3));
        assert_eq!(l.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(l.pop(), Some(1));
        assert_eq!(l.pop(), Some(2));
        assert_eq!(l.pop(), Some(3));
        assert_eq!(l.pop(), None);
        assert!(l.last().is_none());
    }

    #[test]
    fn remove_tail_then_append() {
        let mut l = OrderedList::new();
        for i in 0..4 {
            l.append(i);
        }
        assert_eq!(l.remove(&3), Some(3));
        assert_eq!(l.last(), Some(&2));
        assert_eq!(l.remove(&0), Some(0));
        assert_eq!(l.first(), Some(&1));
        assert_eq!(l.remove(&9), None);
        l.append(7);
        assert_eq!(l.iter().copied().collect::<Vec<_>>(), vec![1, 2, 7]);
        assert_eq!(l.size(), 3);
    }

    #[test]
    fn comparator_is_pluggable() {
        let mut l: OrderedList<(u8, &str)> = OrderedList::with_comparator(|a, b| a.0 == b.0);
        l.append((1, "a"));
        l.append((2, "b"));
        assert_eq!(l.remove(&(2, "ignored")), Some((2, "b")));
        assert_eq!(l.size(), 1);
    }
}

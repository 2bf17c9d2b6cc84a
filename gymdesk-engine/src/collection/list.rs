//! Ordered doubly-linked list of owned records
//!
//! The list keeps its records sorted by a comparator chosen at insertion
//! time and tracks whether it changed since the owner last persisted it.
//! Nodes are addressed through generation-checked [`Handle`]s, so removal
//! and replacement work by node identity rather than by key.

use std::cmp::Ordering;
use std::io::{self, Write};

use super::arena::{Arena, Handle, Link, Node};
use super::behavior::{Compare, Direction, InsertFlags, Printer, Record};
use crate::error::{DeskError, StatusCode};

/// A record the list refused because its key is already present
#[derive(Debug)]
pub struct Rejected<T> {
    record: T,
}

impl<T> Rejected<T> {
    /// Hand the refused record back
    pub fn into_inner(self) -> T {
        self.record
    }
}

impl<T> From<Rejected<T>> for DeskError {
    fn from(_: Rejected<T>) -> Self {
        DeskError::Status(StatusCode::DuplicateKey)
    }
}

/// Sorted, change-tracked container of records
pub struct OrderedList<T: Record> {
    nodes: Arena<T>,
    /// Head
    first: Link,
    /// Tail
    last: Link,
    /// Drain cursor used by `rewind`/`pop`
    it: Link,
    count: usize,
    dirty: bool,
    /// Direction used by the last insertion
    direction: Direction,
}

impl<T: Record> OrderedList<T> {
    /// Create an empty, clean list
    pub fn new() -> Self {
        OrderedList {
            nodes: Arena::new(),
            first: None,
            last: None,
            it: None,
            count: 0,
            dirty: false,
            direction: Direction::Ascending,
        }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if list is empty
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Whether the list changed since the flag was last cleared
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Ordering direction used by the last insertion
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Insert `record` at its sorted position.
    ///
    /// Walks from the head and links the record before the first node that
    /// ranks after it, or appends it at the tail. When an equal key is met
    /// first, the record is refused unless [`InsertFlags::DUPLICATES`] is
    /// set, in which case it replaces that node's record in place.
    pub fn insert_sorted(
        &mut self,
        record: T,
        flags: InsertFlags,
        cmp: Option<Compare<T>>,
    ) -> Result<Handle, Rejected<T>> {
        let cmp: Compare<T> = match cmp {
            Some(cmp) => cmp,
            None => T::compare,
        };
        let direction = Direction::from(flags);
        self.direction = direction;

        let Some(mut cur) = self.first else {
            let index = self.nodes.alloc(Node {
                record,
                prev: None,
                next: None,
            });
            self.first = Some(index);
            self.last = Some(index);
            self.count = 1;
            self.dirty = true;
            return Ok(self.nodes.handle(index));
        };

        loop {
            let node = self.nodes.node(cur);
            match direction.apply(cmp(&record, &node.record)) {
                Ordering::Equal => {
                    if !flags.contains(InsertFlags::DUPLICATES) {
                        return Err(Rejected { record });
                    }
                    let old = std::mem::replace(&mut self.nodes.node_mut(cur).record, record);
                    old.destroy();
                    self.dirty = true;
                    return Ok(self.nodes.handle(cur));
                }
                Ordering::Less => {
                    let index = self.link_before(cur, record);
                    return Ok(self.nodes.handle(index));
                }
                Ordering::Greater => {}
            }

            match node.next {
                Some(next) => cur = next,
                None => break,
            }
        }

        let index = self.link_after(cur, record);
        Ok(self.nodes.handle(index))
    }

    fn link_before(&mut self, at: usize, record: T) -> usize {
        let prev = self.nodes.node(at).prev;
        let index = self.nodes.alloc(Node {
            record,
            prev,
            next: Some(at),
        });
        self.nodes.node_mut(at).prev = Some(index);
        match prev {
            Some(p) => self.nodes.node_mut(p).next = Some(index),
            None => self.first = Some(index),
        }
        self.count += 1;
        self.dirty = true;
        index
    }

    fn link_after(&mut self, at: usize, record: T) -> usize {
        let next = self.nodes.node(at).next;
        let index = self.nodes.alloc(Node {
            record,
            prev: Some(at),
            next,
        });
        self.nodes.node_mut(at).next = Some(index);
        match next {
            Some(n) => self.nodes.node_mut(n).prev = Some(index),
            None => self.last = Some(index),
        }
        self.count += 1;
        self.dirty = true;
        index
    }

    fn unlink(&mut self, index: usize) -> Option<T> {
        let (prev, next) = {
            let node = self.nodes.get(index)?;
            (node.prev, node.next)
        };

        match prev {
            Some(p) => self.nodes.node_mut(p).next = next,
            None => self.first = next,
        }
        match next {
            Some(n) => self.nodes.node_mut(n).prev = prev,
            None => self.last = prev,
        }
        if self.it == Some(index) {
            self.it = next;
        }

        self.count -= 1;
        self.dirty = true;
        self.nodes.free(index).map(|node| node.record)
    }

    /// Find the first record equal to `probe`.
    ///
    /// The scan stops early once it meets a record that ranks after the
    /// probe in the list's current direction, so `cmp` must order the
    /// records the same way the list is sorted. Use [`find`](Self::find)
    /// for comparators unrelated to the sort order.
    pub fn search(&self, probe: &T, cmp: Option<Compare<T>>) -> Option<&T> {
        self.search_index(probe, cmp)
            .map(|index| &self.nodes.node(index).record)
    }

    /// Like [`search`](Self::search) but returns the node's handle
    pub fn search_handle(&self, probe: &T, cmp: Option<Compare<T>>) -> Option<Handle> {
        self.search_index(probe, cmp)
            .map(|index| self.nodes.handle(index))
    }

    fn search_index(&self, probe: &T, cmp: Option<Compare<T>>) -> Option<usize> {
        let cmp: Compare<T> = match cmp {
            Some(cmp) => cmp,
            None => T::compare,
        };

        let mut cur = self.first;
        while let Some(index) = cur {
            let node = self.nodes.node(index);
            match self.direction.apply(cmp(probe, &node.record)) {
                Ordering::Equal => return Some(index),
                // Sorted: every later record ranks after the probe too
                Ordering::Less => return None,
                Ordering::Greater => {}
            }
            cur = node.next;
        }
        None
    }

    /// Full scan for the first record equal to `probe` under `cmp`
    pub fn find(&self, probe: &T, cmp: Compare<T>) -> Option<Handle> {
        let mut cur = self.first;
        while let Some(index) = cur {
            let node = self.nodes.node(index);
            if cmp(probe, &node.record) == Ordering::Equal {
                return Some(self.nodes.handle(index));
            }
            cur = node.next;
        }
        None
    }

    /// Collect every record equal to `probe` under `cmp` into a new list,
    /// sorted ascending by the natural ordering.
    pub fn search_all(&self, probe: &T, cmp: Option<Compare<T>>) -> OrderedList<T>
    where
        T: Clone,
    {
        let cmp: Compare<T> = match cmp {
            Some(cmp) => cmp,
            None => T::compare,
        };

        let mut matches = OrderedList::new();
        for record in self.iter().filter(|r| cmp(probe, r) == Ordering::Equal) {
            if let Err(rejected) = matches.insert_sorted(record.clone(), InsertFlags::empty(), None)
            {
                rejected.into_inner().destroy();
            }
        }
        matches.dirty = false;
        matches
    }

    /// Remove and destroy the record behind `handle`
    pub fn remove(&mut self, handle: Handle) -> bool {
        match self.take(handle) {
            Some(record) => {
                record.destroy();
                true
            }
            None => false,
        }
    }

    /// Remove the record behind `handle` and hand it back
    pub fn take(&mut self, handle: Handle) -> Option<T> {
        let index = self.nodes.resolve(handle)?;
        self.unlink(index)
    }

    /// Swap the record behind `handle` for `record` and return the old one.
    ///
    /// Neither re-sorts nor marks the list dirty; call [`sort`](Self::sort)
    /// if the key changed.
    pub fn replace(&mut self, handle: Handle, record: T) -> Option<T> {
        let index = self.nodes.resolve(handle)?;
        Some(std::mem::replace(
            &mut self.nodes.node_mut(index).record,
            record,
        ))
    }

    /// Re-sort the list in its current direction.
    ///
    /// The sort is stable and relinks nodes in place, so every handle stays
    /// valid. Nearly sorted input (one edited key) costs a single pass.
    pub fn sort(&mut self, cmp: Option<Compare<T>>) {
        let cmp: Compare<T> = match cmp {
            Some(cmp) => cmp,
            None => T::compare,
        };
        if self.count < 2 {
            return;
        }

        let mut order = Vec::with_capacity(self.count);
        let mut cur = self.first;
        while let Some(index) = cur {
            order.push(index);
            cur = self.nodes.node(index).next;
        }

        let direction = self.direction;
        let nodes = &self.nodes;
        order.sort_by(|&a, &b| {
            direction.apply(cmp(&nodes.node(a).record, &nodes.node(b).record))
        });

        for (pos, &index) in order.iter().enumerate() {
            let prev = pos.checked_sub(1).map(|p| order[p]);
            let next = order.get(pos + 1).copied();
            let node = self.nodes.node_mut(index);
            node.prev = prev;
            node.next = next;
        }
        self.first = order.first().copied();
        self.last = order.last().copied();
    }

    /// Reset the drain cursor to the head
    pub fn rewind(&mut self) {
        self.it = self.first;
    }

    /// Return the record under the drain cursor and advance it
    pub fn pop(&mut self) -> Option<&T> {
        let index = self.it?;
        self.it = self.nodes.node(index).next;
        Some(&self.nodes.node(index).record)
    }

    /// Like [`pop`](Self::pop) but returns the node's handle
    pub fn pop_handle(&mut self) -> Option<Handle> {
        let index = self.it?;
        self.it = self.nodes.node(index).next;
        Some(self.nodes.handle(index))
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        let index = self.nodes.resolve(handle)?;
        Some(&self.nodes.node(index).record)
    }

    /// Mutable access for field edits. Key edits need a [`sort`](Self::sort)
    /// afterwards; the dirty flag is left to the caller.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let index = self.nodes.resolve(handle)?;
        Some(&mut self.nodes.node_mut(index).record)
    }

    pub fn first(&self) -> Option<&T> {
        self.first.map(|index| &self.nodes.node(index).record)
    }

    pub fn last(&self) -> Option<&T> {
        self.last.map(|index| &self.nodes.node(index).record)
    }

    /// Iterate head to tail
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.first,
            back: self.last,
            remaining: self.count,
        }
    }

    /// Destroy every record. Handles issued before stay stale even once
    /// their slots are reused.
    pub fn clear(&mut self) {
        if self.count > 0 {
            self.dirty = true;
        }
        let mut cur = self.first;
        while let Some(index) = cur {
            cur = self.nodes.node(index).next;
            if let Some(node) = self.nodes.free(index) {
                node.record.destroy();
            }
        }
        self.first = None;
        self.last = None;
        self.it = None;
        self.count = 0;
    }

    /// Print the element count, an optional header, then every record
    pub fn print_all(
        &self,
        out: &mut dyn Write,
        printer: Option<Printer<T>>,
        numbered: bool,
        header: Option<&str>,
    ) -> io::Result<()> {
        let printer: Printer<T> = match printer {
            Some(printer) => printer,
            None => T::print,
        };

        writeln!(out, "\n\t\tTotal: {}\n", self.count)?;
        if let Some(header) = header {
            print_header(out, header)?;
        }
        for (i, record) in self.iter().enumerate() {
            if numbered {
                write!(out, "{:02}, ", i + 1)?;
            }
            printer(record, out)?;
        }
        Ok(())
    }
}

/// Header framed by dashed lines of the same width
pub fn print_header(out: &mut dyn Write, header: &str) -> io::Result<()> {
    let rule = "-".repeat(header.chars().count());
    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", header)?;
    writeln!(out, "{}", rule)
}

impl<T: Record> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Drop for OrderedList<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Record + std::fmt::Debug> std::fmt::Debug for OrderedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderedList")
            .field("count", &self.count)
            .field("dirty", &self.dirty)
            .field("direction", &self.direction)
            .field("records", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Iterator over the records of an [`OrderedList`]
pub struct Iter<'a, T: Record> {
    list: &'a OrderedList<T>,
    front: Link,
    back: Link,
    remaining: usize,
}

impl<'a, T: Record> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front?;
        let node = self.list.nodes.node(index);
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: Record> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back?;
        let node = self.list.nodes.node(index);
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.record)
    }
}

impl<'a, T: Record> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T: Record> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        key: i32,
        group: u8,
        payload: &'static str,
    }

    fn entry(key: i32, payload: &'static str) -> Entry {
        Entry { key, group: 0, payload }
    }

    impl Record for Entry {
        fn construct() -> Self {
            entry(0, "")
        }

        fn compare(&self, other: &Self) -> Ordering {
            self.key.cmp(&other.key)
        }

        fn print(&self, out: &mut dyn Write) -> io::Result<()> {
            writeln!(out, "{}:{}", self.key, self.payload)
        }
    }

    fn by_group(a: &Entry, b: &Entry) -> Ordering {
        a.group.cmp(&b.group)
    }

    fn keys(list: &OrderedList<Entry>) -> Vec<i32> {
        list.iter().map(|e| e.key).collect()
    }

    fn assert_links(list: &OrderedList<Entry>) {
        let forward: Vec<i32> = list.iter().map(|e| e.key).collect();
        let mut backward: Vec<i32> = list.iter().rev().map(|e| e.key).collect();
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), list.len());
        assert_eq!(list.is_empty(), list.len() == 0);
        assert_eq!(list.first().is_none(), list.last().is_none());
    }

    fn probe(key: i32) -> Entry {
        let mut e = Entry::construct();
        e.key = key;
        e
    }

    #[test]
    fn test_insert_search_remove_scenario() {
        let mut list = OrderedList::new();
        assert!(!list.is_dirty());

        let mut handles = Vec::new();
        for (k, p) in [(5, "five"), (1, "one"), (3, "three")] {
            handles.push(list.insert_sorted(entry(k, p), InsertFlags::empty(), None).unwrap());
        }
        assert_eq!(keys(&list), vec![1, 3, 5]);
        assert_eq!(list.len(), 3);
        assert!(list.is_dirty());

        list.set_dirty(false);
        let rejected = list
            .insert_sorted(entry(3, "again"), InsertFlags::empty(), None)
            .unwrap_err();
        assert_eq!(rejected.into_inner().payload, "again");
        assert_eq!(keys(&list), vec![1, 3, 5]);
        assert!(!list.is_dirty());

        list.insert_sorted(entry(3, "new"), InsertFlags::DUPLICATES, None).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.search(&probe(3), None).unwrap().payload, "new");
        assert!(list.is_dirty());

        assert!(list.remove(handles[1]));
        assert_eq!(keys(&list), vec![3, 5]);
        assert_eq!(list.len(), 2);
        assert!(list.search(&probe(1), None).is_none());
        assert_links(&list);
    }

    #[test]
    fn test_sorted_after_every_insert() {
        let mut list = OrderedList::new();
        let input = [42, 7, 19, 7, -3, 100, 0, 19, 55];
        let mut inserted = 0;
        for k in input {
            if list.insert_sorted(probe(k), InsertFlags::empty(), None).is_ok() {
                inserted += 1;
            }
            let ks = keys(&list);
            assert!(ks.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(list.len(), inserted);
            assert_links(&list);
        }
        assert_eq!(inserted, 7);
    }

    #[test]
    fn test_descending_insert_and_search() {
        let mut list = OrderedList::new();
        for k in [2, 9, 4, 7] {
            list.insert_sorted(probe(k), InsertFlags::DESCENDING, None).unwrap();
        }
        assert_eq!(keys(&list), vec![9, 7, 4, 2]);
        assert_eq!(list.direction(), Direction::Descending);

        for k in [9, 7, 4, 2] {
            assert_eq!(list.search(&probe(k), None).map(|e| e.key), Some(k));
        }
        assert!(list.search(&probe(8), None).is_none());
        assert!(list.search(&probe(1), None).is_none());
    }

    #[test]
    fn test_insert_at_head_and_tail() {
        let mut list = OrderedList::new();
        list.insert_sorted(probe(5), InsertFlags::empty(), None).unwrap();
        list.insert_sorted(probe(1), InsertFlags::empty(), None).unwrap();
        list.insert_sorted(probe(9), InsertFlags::empty(), None).unwrap();
        assert_eq!(list.first().unwrap().key, 1);
        assert_eq!(list.last().unwrap().key, 9);
        assert_links(&list);
    }

    #[test]
    fn test_comparator_override() {
        let mut list = OrderedList::new();
        let mut a = entry(1, "a");
        a.group = 2;
        let mut b = entry(2, "b");
        b.group = 1;
        list.insert_sorted(a, InsertFlags::empty(), Some(by_group)).unwrap();
        list.insert_sorted(b, InsertFlags::empty(), Some(by_group)).unwrap();
        assert_eq!(keys(&list), vec![2, 1]);
    }

    #[test]
    fn test_search_early_exit() {
        let mut list = OrderedList::new();
        for k in [1, 3, 5] {
            list.insert_sorted(probe(k), InsertFlags::empty(), None).unwrap();
        }
        assert!(list.search(&probe(2), None).is_none());
        assert!(list.search(&probe(6), None).is_none());
        assert!(list.search_handle(&probe(5), None).is_some());
    }

    #[test]
    fn test_find_ignores_sort_order() {
        let mut list = OrderedList::new();
        for (k, g) in [(1, 3u8), (2, 1), (3, 2)] {
            let mut e = probe(k);
            e.group = g;
            list.insert_sorted(e, InsertFlags::empty(), None).unwrap();
        }
        let mut wanted = probe(0);
        wanted.group = 1;
        let handle = list.find(&wanted, by_group).unwrap();
        assert_eq!(list.get(handle).unwrap().key, 2);
    }

    #[test]
    fn test_search_all_groups_by_secondary_key() {
        let mut list = OrderedList::new();
        for (k, g) in [(4, 1u8), (1, 2), (3, 1), (2, 1), (5, 2)] {
            let mut e = probe(k);
            e.group = g;
            list.insert_sorted(e, InsertFlags::empty(), None).unwrap();
        }

        let mut wanted = probe(0);
        wanted.group = 1;
        let group = list.search_all(&wanted, Some(by_group));
        assert_eq!(keys(&group), vec![2, 3, 4]);
        assert!(!group.is_dirty());
        assert_eq!(list.len(), 5);

        wanted.group = 9;
        assert!(list.search_all(&wanted, Some(by_group)).is_empty());
    }

    #[test]
    fn test_remove_by_identity_and_stale_handles() {
        let mut list = OrderedList::new();
        let h1 = list.insert_sorted(probe(1), InsertFlags::empty(), None).unwrap();
        let h2 = list.insert_sorted(probe(2), InsertFlags::empty(), None).unwrap();

        assert!(list.remove(h1));
        assert!(!list.remove(h1));

        // Reuses h1's slot
        let h3 = list.insert_sorted(probe(3), InsertFlags::empty(), None).unwrap();
        assert!(list.get(h1).is_none());
        assert!(list.replace(h1, probe(9)).is_none());
        assert_eq!(keys(&list), vec![2, 3]);

        assert!(list.remove(h2));
        assert!(list.remove(h3));
        assert!(list.is_empty());
        assert!(list.first().is_none() && list.last().is_none());
        assert!(!list.remove(h3));
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut list = OrderedList::new();
        let old = list.insert_sorted(probe(1), InsertFlags::empty(), None).unwrap();
        list.clear();
        assert!(list.is_empty());

        let new = list.insert_sorted(probe(42), InsertFlags::empty(), None).unwrap();
        assert!(list.get(old).is_none());
        assert!(!list.remove(old));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(new).unwrap().key, 42);
    }

    #[test]
    fn test_handle_of_other_list_is_rejected() {
        let mut left = OrderedList::new();
        let mut right = OrderedList::new();
        let hl = left.insert_sorted(probe(1), InsertFlags::empty(), None).unwrap();
        let hr = right.insert_sorted(probe(2), InsertFlags::empty(), None).unwrap();

        assert!(left.get(hr).is_none());
        assert!(!left.remove(hr));
        assert!(right.take(hl).is_none());
        assert_eq!(keys(&left), vec![1]);
        assert_eq!(keys(&right), vec![2]);

        let copy = left.search_all(&probe(1), None);
        assert!(left.get(copy.search_handle(&probe(1), None).unwrap()).is_none());
    }

    #[test]
    fn test_take_returns_record() {
        let mut list = OrderedList::new();
        let h = list.insert_sorted(entry(7, "seven"), InsertFlags::empty(), None).unwrap();
        list.set_dirty(false);
        let e = list.take(h).unwrap();
        assert_eq!(e.payload, "seven");
        assert!(list.is_dirty());
        assert!(list.is_empty());
    }

    #[test]
    fn test_replace_keeps_position_and_flags() {
        let mut list = OrderedList::new();
        let h = list.insert_sorted(probe(1), InsertFlags::empty(), None).unwrap();
        list.insert_sorted(probe(5), InsertFlags::empty(), None).unwrap();
        list.set_dirty(false);

        let old = list.replace(h, probe(9)).unwrap();
        assert_eq!(old.key, 1);
        assert_eq!(keys(&list), vec![9, 5]);
        assert_eq!(list.len(), 2);
        assert!(!list.is_dirty());

        list.sort(None);
        assert_eq!(keys(&list), vec![5, 9]);
        assert_eq!(list.get(h).unwrap().key, 9);
        assert_links(&list);
    }

    #[test]
    fn test_sort_fully_orders_shuffled_input() {
        let mut list = OrderedList::new();
        let handles: Vec<_> = (0..8)
            .map(|k| list.insert_sorted(probe(k), InsertFlags::empty(), None).unwrap())
            .collect();
        for (h, k) in handles.iter().zip([6, 2, 7, 0, 5, 1, 4, 3]) {
            list.replace(*h, probe(k));
        }
        list.sort(None);
        assert_eq!(keys(&list), (0..8).collect::<Vec<_>>());
        assert_links(&list);
    }

    #[test]
    fn test_sort_descending_list() {
        let mut list = OrderedList::new();
        let h = list.insert_sorted(probe(1), InsertFlags::DESCENDING, None).unwrap();
        for k in [5, 3] {
            list.insert_sorted(probe(k), InsertFlags::DESCENDING, None).unwrap();
        }
        list.get_mut(h).unwrap().key = 10;
        list.sort(None);
        assert_eq!(keys(&list), vec![10, 5, 3]);
    }

    #[test]
    fn test_rewind_and_pop() {
        let mut list = OrderedList::new();
        assert!(list.pop().is_none());
        for k in [2, 1, 3] {
            list.insert_sorted(probe(k), InsertFlags::empty(), None).unwrap();
        }
        assert!(list.pop().is_none());

        list.rewind();
        let mut drained = Vec::new();
        while let Some(e) = list.pop() {
            drained.push(e.key);
        }
        assert_eq!(drained, vec![1, 2, 3]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_pop_then_remove_drain() {
        let mut list = OrderedList::new();
        for k in [2, 1, 3] {
            list.insert_sorted(probe(k), InsertFlags::empty(), None).unwrap();
        }
        let mut seen = Vec::new();
        list.rewind();
        while let Some(h) = list.pop_handle() {
            seen.push(list.get(h).unwrap().key);
            assert!(list.remove(h));
            list.rewind();
        }
        assert_eq!(seen, vec![1, 2, 3]);
        assert!(list.is_empty());
    }

    #[test]
    fn test_cursor_skips_removed_node() {
        let mut list = OrderedList::new();
        for k in [1, 2, 3] {
            list.insert_sorted(probe(k), InsertFlags::empty(), None).unwrap();
        }
        list.rewind();
        list.pop();
        let h2 = list.search_handle(&probe(2), None).unwrap();
        list.remove(h2);
        assert_eq!(list.pop().map(|e| e.key), Some(3));
        assert!(list.pop().is_none());
    }

    #[test]
    fn test_print_all() {
        let mut list = OrderedList::new();
        list.insert_sorted(entry(2, "b"), InsertFlags::empty(), None).unwrap();
        list.insert_sorted(entry(1, "a"), InsertFlags::empty(), None).unwrap();

        let mut out = Vec::new();
        list.print_all(&mut out, None, true, Some("KEY, PAYLOAD")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Total: 2"));
        assert!(text.contains("------------\nKEY, PAYLOAD\n------------\n"));
        assert!(text.ends_with("01, 1:a\n02, 2:b\n"));
    }

    #[derive(Debug, Clone)]
    struct Counted {
        key: i32,
        destroyed: Rc<Cell<usize>>,
    }

    impl Record for Counted {
        fn construct() -> Self {
            Counted {
                key: 0,
                destroyed: Rc::new(Cell::new(0)),
            }
        }

        fn compare(&self, other: &Self) -> Ordering {
            self.key.cmp(&other.key)
        }

        fn destroy(self) {
            self.destroyed.set(self.destroyed.get() + 1);
        }

        fn print(&self, out: &mut dyn Write) -> io::Result<()> {
            writeln!(out, "{}", self.key)
        }
    }

    #[test]
    fn test_destroy_discipline() {
        let counter = Rc::new(Cell::new(0));
        let make = |key| Counted {
            key,
            destroyed: counter.clone(),
        };

        let mut list = OrderedList::new();
        let h1 = list.insert_sorted(make(1), InsertFlags::empty(), None).unwrap();
        let h2 = list.insert_sorted(make(2), InsertFlags::empty(), None).unwrap();
        list.insert_sorted(make(3), InsertFlags::empty(), None).unwrap();

        // Refused records come back untouched
        let back = list.insert_sorted(make(3), InsertFlags::empty(), None).unwrap_err();
        drop(back);
        assert_eq!(counter.get(), 0);

        // Duplicate update destroys the old record
        list.insert_sorted(make(3), InsertFlags::DUPLICATES, None).unwrap();
        assert_eq!(counter.get(), 1);

        assert!(list.remove(h1));
        assert_eq!(counter.get(), 2);

        let taken = list.take(h2).unwrap();
        assert_eq!(counter.get(), 2);
        drop(taken);

        drop(list);
        assert_eq!(counter.get(), 3);
    }

    fn equal_keys_last(a: &Counted, b: &Counted) -> Ordering {
        a.key.cmp(&b.key).then(Ordering::Greater)
    }

    fn anything(_: &Counted, _: &Counted) -> Ordering {
        Ordering::Equal
    }

    #[test]
    fn test_search_all_destroys_refused_copies() {
        let counter = Rc::new(Cell::new(0));
        let make = |key| Counted {
            key,
            destroyed: counter.clone(),
        };

        let mut list = OrderedList::new();
        for key in [1, 1, 2] {
            list.insert_sorted(make(key), InsertFlags::empty(), Some(equal_keys_last))
                .unwrap();
        }
        assert_eq!(list.len(), 3);

        let matches = list.search_all(&make(0), Some(anything));
        assert_eq!(matches.len(), 2);
        assert_eq!(counter.get(), 1);

        drop(matches);
        assert_eq!(counter.get(), 3);
    }
}

//! Slot arena for list nodes
//!
//! Nodes live in a `Vec` of slots addressed by index. Freed slots are kept
//! on a free list and reused; each slot carries a generation that is bumped
//! on free, so a [`Handle`] to a removed node never resolves to whatever
//! reuses its slot. Every arena also gets a process-unique id stamped into
//! its handles, so a handle only resolves in the list that issued it.

use std::sync::atomic::{AtomicU64, Ordering};

static ARENA_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Index of a node inside the arena
pub(crate) type Link = Option<usize>;

/// Stable reference to one element of an [`OrderedList`](super::OrderedList)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    arena: u64,
    index: u32,
    generation: u32,
}

impl Handle {
    pub(crate) fn index(&self) -> usize {
        self.index as usize
    }
}

/// A linked node holding one record
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub record: T,
    pub prev: Link,
    pub next: Link,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

#[derive(Debug)]
pub(crate) struct Arena<T> {
    id: u64,
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena {
            id: ARENA_COUNTER.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Store a node, reusing a freed slot when one exists
    pub fn alloc(&mut self, node: Node<T>) -> usize {
        if let Some(index) = self.free.pop() {
            self.slots[index].node = Some(node);
            index
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            self.slots.len() - 1
        }
    }

    /// Release a slot and return its node
    pub fn free(&mut self, index: usize) -> Option<Node<T>> {
        let slot = self.slots.get_mut(index)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        Some(node)
    }

    pub fn handle(&self, index: usize) -> Handle {
        Handle {
            arena: self.id,
            index: index as u32,
            generation: self.slots[index].generation,
        }
    }

    /// Resolve a handle to a live slot index
    pub fn resolve(&self, handle: Handle) -> Option<usize> {
        if handle.arena != self.id {
            return None;
        }
        let slot = self.slots.get(handle.index())?;
        if slot.generation == handle.generation && slot.node.is_some() {
            Some(handle.index())
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&Node<T>> {
        self.slots.get(index)?.node.as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node<T>> {
        self.slots.get_mut(index)?.node.as_mut()
    }

    /// Node at an index known to be live
    pub fn node(&self, index: usize) -> &Node<T> {
        match self.get(index) {
            Some(node) => node,
            None => unreachable!("dangling list link {}", index),
        }
    }

    pub fn node_mut(&mut self, index: usize) -> &mut Node<T> {
        match self.get_mut(index) {
            Some(node) => node,
            None => unreachable!("dangling list link {}", index),
        }
    }
}

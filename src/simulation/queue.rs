//! FIFO queues and LIFO stacks of transit entities
//!
//! Popping hands the value back to the caller; the container keeps nothing.

use std::collections::VecDeque;

/// First-in, first-out queue
#[derive(Debug, Clone, PartialEq)]
pub struct TransitQueue<T> {
    entries: VecDeque<T>,
}

impl<T> Default for TransitQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TransitQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Append at the tail
    pub fn push(&mut self, value: T) {
        self.entries.push_back(value);
    }

    /// Take the head entry
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop_front()
    }

    pub fn peek(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Head to tail
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Take every entry in FIFO order
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.entries.drain(..)
    }

    /// Keep only the entries matching `keep`, in their current order
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.entries.retain(keep);
    }
}

/// Last-in, first-out stack
#[derive(Debug, Clone, PartialEq)]
pub struct TransitStack<T> {
    entries: Vec<T>,
}

impl<T> Default for TransitStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TransitStack<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, value: T) {
        self.entries.push(value);
    }

    /// Take the most recently pushed entry
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&T> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().rev()
    }

    /// Take every entry, most recent first
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.entries.drain(..).rev()
    }
}

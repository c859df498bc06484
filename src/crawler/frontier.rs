//! Breadth-first crawl frontier
//!
//! This module handles:
//! - FIFO queue of ids waiting to be processed, each tagged with its depth
//! - The run's visited set, which guarantees no id is processed twice

use crate::ids::StrongsId;
use std::collections::{HashSet, VecDeque};

/// An id waiting in the frontier
///
/// Created when the id is discovered and consumed when it is dequeued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueItem {
    pub id: StrongsId,
    /// Hops from the seed; the seed is depth 0
    pub depth: u32,
}

/// FIFO queue plus visited set for one crawl run
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<QueueItem>,
    visited: HashSet<StrongsId>,
}

impl Frontier {
    /// Creates a frontier holding only the seed at depth 0
    pub fn with_seed(seed: StrongsId) -> Self {
        let mut frontier = Self::default();
        frontier.push(seed, 0);
        frontier
    }

    pub fn push(&mut self, id: StrongsId, depth: u32) {
        self.queue.push_back(QueueItem { id, depth });
    }

    /// Removes and returns the oldest queued item
    pub fn pop(&mut self) -> Option<QueueItem> {
        self.queue.pop_front()
    }

    /// Marks an id visited; returns false if it already was
    pub fn visit(&mut self, id: StrongsId) -> bool {
        self.visited.insert(id)
    }

    pub fn is_visited(&self, id: &StrongsId) -> bool {
        self.visited.contains(id)
    }

    /// Enqueues every target that has not been visited, at `depth`
    ///
    /// An id may still be queued more than once when two nodes discover it
    /// before it is processed; the duplicate is discarded at dequeue time.
    ///
    /// # Returns
    ///
    /// The number of items enqueued
    pub fn enqueue_unvisited(
        &mut self,
        targets: impl IntoIterator<Item = StrongsId>,
        depth: u32,
    ) -> usize {
        let mut added = 0;
        for id in targets {
            if !self.is_visited(&id) {
                self.push(id, depth);
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

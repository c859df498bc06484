//! Run result accumulation and display
//!
//! This module provides the aggregate result of one crawl run and a formatted
//! printout of it.

use crate::ids::StrongsId;
use crate::state::NodeState;

/// Aggregate outcome of one crawl run
///
/// Counts are accumulated as nodes finish; errors are kept in the order they
/// happened and never truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
    /// `(id, message)` for every node that failed, in processing order
    pub errors: Vec<(StrongsId, String)>,
    /// Every id that reached a terminal state, in processing order
    pub processed: Vec<StrongsId>,
    /// True if the run stopped because it was cancelled
    pub cancelled: bool,
}

impl CrawlResult {
    /// Records a node's terminal state
    ///
    /// Errored nodes should go through [`CrawlResult::record_error`] so that
    /// their message is kept.
    pub fn record(&mut self, id: StrongsId, state: NodeState) {
        debug_assert!(
            NodeState::Processing.can_transition_to(state),
            "recorded non-terminal state {}",
            state
        );
        match state {
            NodeState::Created => self.created += 1,
            NodeState::Updated => self.updated += 1,
            NodeState::Skipped => self.skipped += 1,
            NodeState::Errored => self.errors.push((id, "unknown error".to_string())),
            NodeState::Pending | NodeState::Processing => return,
        }
        self.processed.push(id);
    }

    /// Records a failed node with its error message
    pub fn record_error(&mut self, id: StrongsId, message: impl Into<String>) {
        let mut message = message.into();
        if message.is_empty() {
            message = "unknown error".to_string();
        }
        self.errors.push((id, message));
        self.processed.push(id);
    }

    /// Number of nodes that reached a terminal state
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Prints a run result to stdout in a formatted manner
///
/// # Arguments
///
/// * `result` - The result to display
pub fn print_result(result: &CrawlResult) {
    println!("=== Import Summary ===\n");

    println!("Overview:");
    println!("  Processed: {}", result.processed_count());
    println!("  Created:   {}", result.created);
    println!("  Updated:   {}", result.updated);
    println!("  Skipped:   {}", result.skipped);
    println!("  Errors:    {}", result.errors.len());
    if result.cancelled {
        println!("  Run was cancelled before the queue was exhausted");
    }
    println!();

    if result.has_errors() {
        println!("Errors ({}):", result.errors.len());
        for (id, message) in &result.errors {
            println!("  - {}: {}", id, message);
        }
        println!();
    }
}

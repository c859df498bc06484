/// Node state definitions for tracking crawl progress
///
/// This module defines all states a queued entry id can pass through during one run.
use std::fmt;

/// Represents the current state of one queued id in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    // ===== Active States =====
    /// Id has been discovered and is waiting in the queue
    Pending,

    /// Id has been dequeued and is being fetched, parsed, and written
    Processing,

    // ===== Terminal States =====
    /// A new document was created for the entry
    Created,

    /// An existing document was merged with fresh section content
    Updated,

    /// An existing document was found and the recipe skips existing entries
    Skipped,

    /// Fetching or writing failed; the error is recorded in the run result
    Errored,
}

impl NodeState {
    /// Returns true if no further processing happens for this id
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Processing)
    }

    /// Checks whether moving from `self` to `next` is a legal transition
    ///
    /// Pending can only move to Processing; Processing can move to any terminal
    /// state; terminal states never change.
    pub fn can_transition_to(&self, next: NodeState) -> bool {
        match self {
            Self::Pending => next == Self::Processing,
            Self::Processing => next.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [NodeState; 6] = [
        NodeState::Pending,
        NodeState::Processing,
        NodeState::Created,
        NodeState::Updated,
        NodeState::Skipped,
        NodeState::Errored,
    ];

    #[test]
    fn test_is_terminal() {
        assert!(!NodeState::Pending.is_terminal());
        assert!(!NodeState::Processing.is_terminal());

        assert!(NodeState::Created.is_terminal());
        assert!(NodeState::Updated.is_terminal());
        assert!(NodeState::Skipped.is_terminal());
        assert!(NodeState::Errored.is_terminal());
    }

    #[test]
    fn test_transitions() {
        assert!(NodeState::Pending.can_transition_to(NodeState::Processing));
        assert!(!NodeState::Pending.can_transition_to(NodeState::Created));

        for next in [
            NodeState::Created,
            NodeState::Updated,
            NodeState::Skipped,
            NodeState::Errored,
        ] {
            assert!(NodeState::Processing.can_transition_to(next));
        }
        assert!(!NodeState::Processing.can_transition_to(NodeState::Pending));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for from in ALL.iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", NodeState::Pending), "pending");
        assert_eq!(format!("{}", NodeState::Errored), "errored");
    }
}
